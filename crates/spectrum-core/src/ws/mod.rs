//! WebSocket push subscription with automatic recovery.

pub mod client;
pub mod reconnect;

pub use client::{
    ConnectionExit, ConnectionManager, StreamEvent, StreamEventReceiver, StreamEventSender,
    WsConnConfig, WsConnection,
};
pub use reconnect::{FixedDelay, ReconnectPolicy};
