//! Push-subscription connection manager.
//!
//! A [`ConnectionManager`] runs as one tokio task that:
//! 1. Opens a fresh [`WsConnection`] to the push endpoint.
//! 2. Forwards every text frame to its single event subscriber.
//! 3. Answers pings and optionally sends keep-alive pings.
//! 4. On close or error, asks its [`ReconnectPolicy`] for a delay, waits, and
//!    opens a brand-new connection. The old connection object is consumed by
//!    [`WsConnection::run`] and dropped.
//! 5. On shutdown, closes the active connection and schedules nothing more.
//!
//! State transitions and frames share one ordered event stream, so the
//! subscriber sees them exactly in the order they happened.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use super::reconnect::ReconnectPolicy;
use crate::error::SpectrumError;
use crate::types::ConnectionState;

/// Event emitted by the manager to its subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Lifecycle transition of connection `conn_id`.
    State { conn_id: u64, state: ConnectionState },
    /// A text frame received on connection `conn_id`.
    Frame { conn_id: u64, text: String },
}

pub type StreamEventSender = mpsc::UnboundedSender<StreamEvent>;
pub type StreamEventReceiver = mpsc::UnboundedReceiver<StreamEvent>;

/// Configuration for the push subscription.
#[derive(Debug, Clone)]
pub struct WsConnConfig {
    /// Full WebSocket URL (e.g. `wss://example.net/api/SpectrumWS`).
    pub url: String,
    /// Interval between keep-alive ping frames; `None` disables pinging.
    pub ping_interval: Option<Duration>,
}

impl WsConnConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ping_interval: None }
    }
}

/// Why [`WsConnection::run`] returned.
#[derive(Debug)]
pub enum ConnectionExit {
    /// Shutdown was requested or the subscriber went away.
    Shutdown,
    /// Remote close or transport error.
    Lost(String),
}

/// One established WebSocket connection. Never reused after it ends.
pub struct WsConnection {
    id: u64,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsConnection {
    /// Perform the handshake with `url`.
    pub async fn open(url: &str, id: u64) -> Result<Self, SpectrumError> {
        let request = url
            .into_client_request()
            .map_err(|e| SpectrumError::WebSocket(format!("bad request for {url}: {e}")))?;
        let (stream, _response) = tokio_tungstenite::connect_async(request)
            .await
            .map_err(|e| SpectrumError::WebSocket(e.to_string()))?;
        Ok(Self { id, stream })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Read frames until the connection ends or shutdown is signalled.
    ///
    /// Consumes the connection: a lost connection is dropped here and the
    /// caller must open a new one.
    pub async fn run(
        self,
        events: &StreamEventSender,
        ping_interval: Option<Duration>,
        shutdown_rx: &mut watch::Receiver<bool>,
    ) -> ConnectionExit {
        let conn_id = self.id;
        let (mut ws_write, mut ws_read) = self.stream.split();
        let mut ping = ping_interval.map(|d| {
            let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + d, d);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            interval
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("[ws-{conn_id}] shutdown signal received");
                    let _ = ws_write.close().await;
                    return ConnectionExit::Shutdown;
                }

                msg = ws_read.next() => {
                    let text = match msg {
                        Some(Ok(Message::Text(text))) => text.to_string(),
                        Some(Ok(Message::Binary(data))) => match String::from_utf8(data.to_vec()) {
                            Ok(text) => text,
                            Err(_) => {
                                warn!("[ws-{conn_id}] dropping non UTF-8 binary frame ({} bytes)", data.len());
                                continue;
                            }
                        },
                        Some(Ok(Message::Ping(data))) => {
                            let _ = ws_write.send(Message::Pong(data)).await;
                            continue;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            return ConnectionExit::Lost(format!("close frame: {frame:?}"));
                        }
                        Some(Err(e)) => return ConnectionExit::Lost(format!("read error: {e}")),
                        None => return ConnectionExit::Lost("stream ended".into()),
                        _ => continue, // Pong, Frame
                    };
                    if events.send(StreamEvent::Frame { conn_id, text }).is_err() {
                        debug!("[ws-{conn_id}] subscriber gone, closing");
                        let _ = ws_write.close().await;
                        return ConnectionExit::Shutdown;
                    }
                }

                _ = next_ping(&mut ping) => {
                    if let Err(e) = ws_write.send(Message::Ping(Default::default())).await {
                        return ConnectionExit::Lost(format!("ping send error: {e}"));
                    }
                }
            }
        }
    }
}

async fn next_ping(ping: &mut Option<tokio::time::Interval>) {
    match ping {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Publishes state both to the ordered event stream and a watch channel.
struct StateReporter {
    state_tx: watch::Sender<ConnectionState>,
    events: StreamEventSender,
}

impl StateReporter {
    fn set(&self, conn_id: u64, state: ConnectionState) {
        debug!("[ws-{conn_id}] state -> {state}");
        self.state_tx.send_replace(state);
        let _ = self.events.send(StreamEvent::State { conn_id, state });
    }
}

/// Owns the push-subscription lifecycle. One instance per engine.
pub struct ConnectionManager {
    config: WsConnConfig,
    state_rx: watch::Receiver<ConnectionState>,
    shutdown_tx: Option<watch::Sender<bool>>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl ConnectionManager {
    /// Create the manager and start connecting immediately.
    ///
    /// Every frame and state change is delivered on `events`; this is the
    /// only subscription and it lives as long as the manager.
    pub fn start(
        config: WsConnConfig,
        policy: Arc<dyn ReconnectPolicy>,
        events: StreamEventSender,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (state_tx, state_rx) = watch::channel(ConnectionState::Closed);
        let reporter = StateReporter { state_tx, events };
        let task_config = config.clone();

        let task = tokio::spawn(async move {
            manager_loop(task_config, policy, reporter, shutdown_rx).await;
        });

        Self { config, state_rx, shutdown_tx: Some(shutdown_tx), task: Some(task) }
    }

    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Close the active connection and stop reconnecting.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        // Unawaited teardown: the task still observes the signal and exits.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
    }
}

/// Connect, read, and reconnect until shutdown or the policy gives up.
async fn manager_loop(
    config: WsConnConfig,
    policy: Arc<dyn ReconnectPolicy>,
    reporter: StateReporter,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    let mut conn_id = 0u64;
    let mut failures = 0u32;

    loop {
        if *shutdown_rx.borrow() {
            info!("[ws] shutdown requested");
            break;
        }

        conn_id += 1;
        reporter.set(conn_id, ConnectionState::Connecting);
        info!("[ws-{conn_id}] connecting to {}", config.url);

        let opened = tokio::select! {
            r = WsConnection::open(&config.url, conn_id) => r,
            _ = shutdown_rx.changed() => break,
        };

        match opened {
            Ok(conn) => {
                failures = 0;
                info!("[ws-{conn_id}] connected");
                reporter.set(conn_id, ConnectionState::Open);
                match conn.run(&reporter.events, config.ping_interval, &mut shutdown_rx).await {
                    ConnectionExit::Shutdown => break,
                    ConnectionExit::Lost(reason) => warn!("[ws-{conn_id}] connection lost: {reason}"),
                }
            }
            Err(e) => error!("[ws-{conn_id}] connection failed: {e}"),
        }

        failures = failures.saturating_add(1);
        let Some(delay) = policy.next_delay(failures) else {
            error!("[ws-{conn_id}] giving up after {failures} consecutive failure(s)");
            break;
        };

        reporter.set(conn_id, ConnectionState::Reconnecting);
        warn!("[ws-{conn_id}] reconnecting in {delay:?}");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {},
            _ = shutdown_rx.changed() => break,
        }
    }

    reporter.set(conn_id, ConnectionState::Closed);
    info!("[ws] manager closed");
}
