//! # spectrum-runner
//!
//! Terminal front-end for the Spectrum telemetry monitor.
//!
//! Loads an optional JSON configuration file, starts the monitor engine, and
//! reads operator commands from stdin while redrawing the dashboard
//! periodically.
//!
//! # Usage
//!
//! ```bash
//! spectrum-runner config.json --log-level info
//! ```

mod command;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use spectrum_core::config::AppConfig;
use spectrum_feed::{Engine, EngineDeps, EngineHandle};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use command::{HELP, OperatorCommand};

/// Spacecraft telemetry monitor.
#[derive(Parser)]
#[command(name = "spectrum-runner", about = "Spacecraft Telemetry Monitor")]
struct Cli {
    /// Configuration file path (JSON). Built-in defaults when omitted.
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Optional log directory for file output.
    #[arg(long)]
    log_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load configuration
    let config = match &cli.config {
        Some(path) => spectrum_core::config::load_config(path)?,
        None => AppConfig::default(),
    };

    // 2. Initialize logging
    let log_dir = cli.log_dir.clone().or_else(|| config.log_path());
    spectrum_core::logging::init_logging(&cli.log_level, log_dir.as_deref(), &config.module_name());

    info!(
        "spectrum-runner starting (config={}, log_level={})",
        cli.config.as_ref().map(|p| p.display().to_string()).unwrap_or_else(|| "<defaults>".into()),
        cli.log_level,
    );

    // 3. Start the engine
    let deps = EngineDeps::from_config(&config)?;
    let mut engine = Engine::start(&config, deps)?;
    let handle = engine.handle();

    println!("{HELP}");

    // 4. Operator loop until quit, EOF or Ctrl+C
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut render = tokio::time::interval(Duration::from_millis(config.display.render_interval_ms.max(100)));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("stdin closed");
                    break;
                };
                match OperatorCommand::parse(&line) {
                    Ok(Some(OperatorCommand::Quit)) => break,
                    Ok(Some(cmd)) => {
                        if let Err(e) = execute(&handle, cmd).await {
                            error!("{e:#}");
                        }
                    }
                    Ok(None) => {}
                    Err(msg) => println!("{msg}\n{HELP}"),
                }
            }
            _ = render.tick() => {
                if let Ok(view) = handle.view().await {
                    println!("{}", view.render());
                }
            }
            _ = &mut ctrl_c => {
                info!("shutdown signal received");
                break;
            }
        }
    }

    // 5. Stop gracefully
    engine.shutdown().await;
    info!("engine stopped, goodbye");
    Ok(())
}

async fn execute(handle: &EngineHandle, cmd: OperatorCommand) -> Result<()> {
    match cmd {
        OperatorCommand::Update => handle.poll()?,
        OperatorCommand::Stream => handle.set_streaming(true)?,
        OperatorCommand::Stop => handle.set_streaming(false)?,
        OperatorCommand::Ack => {
            if let Err(e) = handle.acknowledge().await {
                warn!("{e:#}");
            }
        }
        OperatorCommand::Export(path) => {
            let csv = handle.export_csv().await?;
            tokio::fs::write(&path, csv).await?;
            info!("exported telemetry to {}", path.display());
        }
        OperatorCommand::Status => println!("{}", handle.view().await?.render()),
        OperatorCommand::Quit => {}
    }
    Ok(())
}
