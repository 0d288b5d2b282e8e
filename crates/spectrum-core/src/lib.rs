//! # spectrum-core
//!
//! Core crate for the Spectrum telemetry monitor, providing:
//!
//! - **Types** (`types`) — channels, samples, status snapshot, connection state
//! - **Configuration** (`config`) — JSON config deserialization with defaults
//! - **Error types** (`error`) — domain-specific `SpectrumError` via thiserror
//! - **Normalization** (`normalize`) — case-insensitive payload field access
//! - **Series store** (`series`) — per-channel sample history and summaries
//! - **Time utilities** (`time_util`) — timestamp labels and the mission clock
//! - **WebSocket** (`ws`) — push subscription with auto-reconnect
//! - **Logging** (`logging`) — tracing-based structured logging

pub mod config;
pub mod error;
pub mod logging;
pub mod normalize;
pub mod series;
pub mod time_util;
pub mod types;
pub mod ws;

// Re-export types at crate root for convenience.
pub use types::*;
