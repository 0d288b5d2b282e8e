//! Typed error definitions for the Spectrum telemetry monitor.
//!
//! Provides [`SpectrumError`] for domain-specific errors that are more
//! informative than plain `anyhow::Error` strings. All variants implement
//! `std::error::Error` via `thiserror`, so they integrate seamlessly with
//! `anyhow::Result`.

use thiserror::Error;

/// Domain-specific errors for the telemetry monitor.
#[derive(Debug, Error)]
pub enum SpectrumError {
    /// Configuration parsing or validation error.
    #[error("config error: {0}")]
    Config(String),

    /// WebSocket connection, handshake, or communication error.
    #[error("websocket error: {0}")]
    WebSocket(String),

    /// Payload deserialization error (not a JSON object, invalid JSON).
    #[error("parse error: {0}")]
    Parse(String),

    /// Poll or acknowledge request failure.
    #[error("http error: {0}")]
    Http(String),

    /// Action workflow rejected an operation in its current state.
    #[error("action error: {0}")]
    Action(String),
}
