//! The monitor engine: one task, one owner of all telemetry state.
//!
//! ```text
//! EngineHandle ──Command──┐
//! ConnectionManager ──────┤
//! poll tasks ─────────────┼──► select! loop ──► IngestionCoordinator
//! acknowledgement task ───┤                     MissionClock
//! clock interval ─────────┘
//! ```
//!
//! Everything that mutates state arrives as a message on this loop, so no
//! locks are needed and pushed frames are applied in arrival order.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow};
use spectrum_action::{
    ActionEvent, ActionEventReceiver, ActionEventSender, ActionWorkflow, Acknowledger,
    HttpAcknowledger, spawn_acknowledgement,
};
use spectrum_core::config::{AppConfig, WindowConfig};
use spectrum_core::error::SpectrumError;
use spectrum_core::normalize::RawPayload;
use spectrum_core::time_util::MissionClock;
use spectrum_core::ws::{
    ConnectionManager, FixedDelay, ReconnectPolicy, StreamEvent, StreamEventReceiver, WsConnConfig,
};
use spectrum_core::ConnectionState;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::StatusSource;
use crate::coordinator::{FrameOutcome, IngestionCoordinator};
use crate::export;
use crate::poll::HttpStatusSource;
use crate::view::DashboardView;

enum Command {
    Poll,
    SetStreaming(bool),
    Acknowledge(oneshot::Sender<Result<(), SpectrumError>>),
    View(oneshot::Sender<DashboardView>),
    ExportCsv(oneshot::Sender<String>),
}

/// External collaborators of the engine.
pub struct EngineDeps {
    pub source: Arc<dyn StatusSource>,
    pub acknowledger: Arc<dyn Acknowledger>,
    pub policy: Arc<dyn ReconnectPolicy>,
}

impl EngineDeps {
    /// HTTP poll/acknowledge clients and a fixed-delay reconnect policy, all
    /// taken from `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let timeout = config.endpoints.request_timeout();
        Ok(Self {
            source: Arc::new(HttpStatusSource::new(&config.endpoints.status_url, timeout)?),
            acknowledger: Arc::new(HttpAcknowledger::new(&config.endpoints.action_url, timeout)?),
            policy: Arc::new(FixedDelay::from_config(&config.reconnect)),
        })
    }
}

/// Cloneable front door to a running engine.
///
/// Every method fails once the engine has shut down.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl EngineHandle {
    /// Request one poll. The result is ingested when it arrives; failures are
    /// logged and dropped.
    pub fn poll(&self) -> Result<()> {
        self.send(Command::Poll)
    }

    /// Enable or disable applying pushed frames.
    pub fn set_streaming(&self, enabled: bool) -> Result<()> {
        self.send(Command::SetStreaming(enabled))
    }

    /// Start acknowledging the current action prompt.
    ///
    /// Errors if no prompt is waiting for acknowledgement.
    pub async fn acknowledge(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Acknowledge(tx))?;
        Ok(rx.await.map_err(|_| stopped())??)
    }

    pub async fn view(&self) -> Result<DashboardView> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::View(tx))?;
        rx.await.map_err(|_| stopped())
    }

    /// All retained samples as CSV text.
    pub async fn export_csv(&self) -> Result<String> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::ExportCsv(tx))?;
        rx.await.map_err(|_| stopped())
    }

    fn send(&self, cmd: Command) -> Result<()> {
        self.tx.send(cmd).map_err(|_| stopped())
    }
}

fn stopped() -> anyhow::Error {
    anyhow!("engine stopped")
}

/// Running engine. Dropping it stops the loop without waiting.
pub struct Engine {
    handle: EngineHandle,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl Engine {
    /// Build all state from `config` and spawn the loop.
    ///
    /// The push subscription starts connecting immediately; pushed frames are
    /// applied only once streaming is enabled.
    pub fn start(config: &AppConfig, deps: EngineDeps) -> Result<Self> {
        let clock = MissionClock::starting_now(config.clock.epoch()?, config.clock.mode);
        let workflow = ActionWorkflow::new(config.action.labels.clone());
        let mut coordinator =
            IngestionCoordinator::new(workflow, config.display.timestamp_format.clone());
        coordinator.set_streaming(config.stream_on_start);

        let (stream_tx, stream_rx) = mpsc::unbounded_channel();
        let ws_config = WsConnConfig {
            url: config.endpoints.stream_url.clone(),
            ping_interval: config.reconnect.ping_interval(),
        };
        let manager = ConnectionManager::start(ws_config, deps.policy, stream_tx);

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (poll_tx, poll_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let ctx = EngineContext {
            coordinator,
            clock,
            mission_time: String::new(),
            connection: ConnectionState::Closed,
            windows: config.display.window,
            source: deps.source,
            acknowledger: deps.acknowledger,
            ack_delay: config.action.ack_delay(),
            poll_tx,
            action_tx,
        };
        let channels = EngineChannels { cmd_rx, stream_rx, poll_rx, action_rx, shutdown_rx };
        let tick = config.clock.tick();

        info!(
            "[engine] starting (stream={}, streaming={})",
            config.endpoints.stream_url, config.stream_on_start
        );
        let task = tokio::spawn(run(ctx, channels, manager, tick));

        Ok(Self {
            handle: EngineHandle { tx: cmd_tx },
            shutdown_tx: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn handle(&self) -> EngineHandle {
        self.handle.clone()
    }

    /// Stop the loop, close the push subscription, and wait for both.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

struct EngineChannels {
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    stream_rx: StreamEventReceiver,
    poll_rx: mpsc::UnboundedReceiver<Result<RawPayload>>,
    action_rx: ActionEventReceiver,
    shutdown_rx: oneshot::Receiver<()>,
}

struct EngineContext {
    coordinator: IngestionCoordinator,
    clock: MissionClock,
    mission_time: String,
    connection: ConnectionState,
    windows: WindowConfig,
    source: Arc<dyn StatusSource>,
    acknowledger: Arc<dyn Acknowledger>,
    ack_delay: Duration,
    poll_tx: mpsc::UnboundedSender<Result<RawPayload>>,
    action_tx: ActionEventSender,
}

async fn run(
    mut ctx: EngineContext,
    mut ch: EngineChannels,
    mut manager: ConnectionManager,
    tick: Duration,
) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = &mut ch.shutdown_rx => break,
            Some(cmd) = ch.cmd_rx.recv() => ctx.on_command(cmd),
            Some(event) = ch.stream_rx.recv() => ctx.on_stream(event),
            Some(result) = ch.poll_rx.recv() => ctx.on_poll(result),
            Some(event) = ch.action_rx.recv() => ctx.on_action(event),
            _ = ticker.tick() => { ctx.mission_time = ctx.clock.render_now(); }
        }
    }

    manager.shutdown().await;
    info!("[engine] stopped");
}

impl EngineContext {
    fn on_command(&mut self, cmd: Command) {
        match cmd {
            Command::Poll => {
                let source = self.source.clone();
                let tx = self.poll_tx.clone();
                tokio::spawn(async move {
                    let _ = tx.send(source.fetch().await);
                });
            }
            Command::SetStreaming(enabled) => {
                info!("[engine] streaming {}", if enabled { "enabled" } else { "disabled" });
                self.coordinator.set_streaming(enabled);
            }
            Command::Acknowledge(reply) => {
                let result = self.coordinator.action_mut().begin_acknowledge();
                if result.is_ok() {
                    spawn_acknowledgement(
                        self.acknowledger.clone(),
                        self.ack_delay,
                        self.action_tx.clone(),
                    );
                }
                let _ = reply.send(result);
            }
            Command::View(reply) => {
                let view = DashboardView::build(
                    &self.coordinator,
                    &self.mission_time,
                    self.connection,
                    &self.windows,
                );
                let _ = reply.send(view);
            }
            Command::ExportCsv(reply) => {
                let _ = reply.send(export::to_csv(self.coordinator.store()));
            }
        }
    }

    fn on_stream(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::State { conn_id, state } => {
                debug!("[engine] connection #{conn_id} {state}");
                self.connection = state;
            }
            StreamEvent::Frame { conn_id, text } => {
                if self.coordinator.handle_frame(&text) == FrameOutcome::Discarded {
                    debug!("[engine] frame on #{conn_id} discarded, streaming off");
                }
            }
        }
    }

    fn on_poll(&mut self, result: Result<RawPayload>) {
        match result {
            Ok(raw) => {
                self.coordinator.ingest(&raw);
            }
            Err(e) => warn!("[engine] poll failed: {e:#}"),
        }
    }

    fn on_action(&mut self, event: ActionEvent) {
        let action = self.coordinator.action_mut();
        match event {
            ActionEvent::Completed => {
                action.complete();
            }
            ActionEvent::Failed { message } => {
                warn!("[engine] acknowledgement failed, prompt stays up: {message}");
                action.acknowledge_failed();
            }
        }
    }
}
