//! Derived status flags and connection lifecycle state.

use serde::Serialize;

/// Status text shown before any payload has been ingested.
pub const INITIAL_STATUS_TEXT: &str = "Nothing to report.";

/// The most recent non-series status reported by the spacecraft.
///
/// Replaced wholesale on every ingested payload. A payload that lacks a field
/// leaves that field `None` in the new snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub is_ascending: Option<bool>,
    pub status_text: Option<String>,
    pub action_required: Option<bool>,
}

impl TelemetrySnapshot {
    /// `"ascending"` / `"not ascending"`, or an empty string when the last
    /// payload did not carry the flag.
    pub fn ascending_text(&self) -> &'static str {
        match self.is_ascending {
            Some(true) => "ascending",
            Some(false) => "not ascending",
            None => "",
        }
    }
}

impl Default for TelemetrySnapshot {
    fn default() -> Self {
        Self {
            is_ascending: Some(false),
            status_text: Some(INITIAL_STATUS_TEXT.to_string()),
            action_required: Some(false),
        }
    }
}

/// Lifecycle state of the push subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum ConnectionState {
    #[default]
    Closed,
    Connecting,
    Open,
    Reconnecting,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "closed"),
            Self::Connecting => write!(f, "connecting"),
            Self::Open => write!(f, "open"),
            Self::Reconnecting => write!(f, "reconnecting"),
        }
    }
}
