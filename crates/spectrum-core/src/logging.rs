//! Diagnostics for the monitor.
//!
//! The runner owns stdout for its dashboard, so every log line goes to
//! stderr. When a log directory is configured (`--log-dir` or
//! `Monitor.log_path`) the same events are also written to a daily file named
//! after the module (`spectrum.YYYY-MM-DD`). Components tag their messages
//! with a bracketed prefix such as `[ws-2]`, `[engine]` or `[action]`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber. Call once, before the engine starts.
///
/// `RUST_LOG` overrides `log_level` when set.
pub fn init_logging(log_level: &str, log_dir: Option<&str>, module_name: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(true);

    if let Some(dir) = log_dir {
        let file_appender = tracing_appender::rolling::daily(dir, module_name);
        let file_layer = fmt::layer()
            .with_writer(file_appender)
            .with_ansi(false)
            .with_target(true);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();
    }
}
