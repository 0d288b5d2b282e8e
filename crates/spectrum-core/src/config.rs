//! Configuration parsing for the telemetry monitor.
//!
//! All settings come from a single JSON file. Every field has a default, so an
//! empty object `{}` yields a working configuration pointed at the public
//! Spectrum endpoints.
//!
//! # Example config
//!
//! ```json
//! {
//!   "Monitor": { "module_name": "spectrum", "log_path": "/tmp/log" },
//!   "endpoints": {
//!     "status_url": "https://example.net/api/SpectrumStatus",
//!     "stream_url": "wss://example.net/api/SpectrumWS",
//!     "action_url": "https://example.net/api/ActOnSpectrum"
//!   },
//!   "reconnect": { "delay_ms": 1000, "max_attempts": null },
//!   "action": { "ack_delay_ms": 1500 },
//!   "clock": { "epoch": "yesterday", "tick_ms": 1000, "mode": "field_wise" },
//!   "display": { "window": { "velocity": 30, "altitude": 30, "temperature": 20 } },
//!   "stream_on_start": false
//! }
//! ```

use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::error::SpectrumError;
use crate::time_util::{ClockMode, DEFAULT_TIMESTAMP_FORMAT, MissionEpoch};
use crate::types::Channel;

/// Prompt labels offered for the acknowledgement button.
pub const DEFAULT_ACTION_LABELS: [&str; 5] = [
    "Correct steering",
    "Update sensor position",
    "Restablish communication",
    "Check unexpected altitude",
    "Decode broken message bytes",
];

/// Top-level application config, deserialized from a JSON file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Module metadata (name, log path).
    #[serde(rename = "Monitor")]
    pub monitor: Option<ModuleMeta>,

    pub endpoints: EndpointConfig,
    pub reconnect: ReconnectConfig,
    pub action: ActionConfig,
    pub clock: ClockConfig,
    pub display: DisplayConfig,

    /// Enable applying pushed frames immediately at startup.
    pub stream_on_start: bool,
}

impl AppConfig {
    /// Returns the module name, defaulting to `"spectrum"`.
    pub fn module_name(&self) -> String {
        self.monitor
            .as_ref()
            .and_then(|m| m.module_name.clone())
            .unwrap_or_else(|| "spectrum".to_string())
    }

    /// Returns the log path.
    pub fn log_path(&self) -> Option<String> {
        self.monitor.as_ref().and_then(|m| m.log_path.clone())
    }

    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> Result<(), SpectrumError> {
        for (name, url) in [
            ("status_url", &self.endpoints.status_url),
            ("stream_url", &self.endpoints.stream_url),
            ("action_url", &self.endpoints.action_url),
        ] {
            url::Url::parse(url)
                .map_err(|e| SpectrumError::Config(format!("{name} '{url}': {e}")))?;
        }
        if self.clock.tick_ms == 0 {
            return Err(SpectrumError::Config("clock.tick_ms must be > 0".into()));
        }
        if self.action.labels.is_empty() {
            return Err(SpectrumError::Config("action.labels must not be empty".into()));
        }
        self.clock.epoch()?;
        Ok(())
    }
}

/// Module metadata block.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleMeta {
    pub module_name: Option<String>,
    pub log_path: Option<String>,
}

/// Remote endpoints of the spacecraft simulator.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Poll endpoint (`GET`, JSON object).
    pub status_url: String,
    /// Push endpoint (WebSocket, JSON object frames).
    pub stream_url: String,
    /// Acknowledge endpoint (`GET`, body ignored).
    pub action_url: String,
    /// Per-request timeout for poll and acknowledge calls, in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            status_url: "https://webfrontendassignment-isaraerospace.azurewebsites.net/api/SpectrumStatus".into(),
            stream_url: "wss://webfrontendassignment-isaraerospace.azurewebsites.net/api/SpectrumWS".into(),
            action_url: "https://webfrontendassignment-isaraerospace.azurewebsites.net/api/ActOnSpectrum".into(),
            request_timeout_ms: 10_000,
        }
    }
}

impl EndpointConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Push-subscription recovery settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    /// Fixed delay before each reconnection attempt.
    pub delay_ms: u64,
    /// Consecutive failed attempts before giving up; `null` retries forever.
    pub max_attempts: Option<u32>,
    /// Keep-alive ping interval; `null` disables pinging.
    pub ping_interval_sec: Option<u64>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self { delay_ms: 1000, max_attempts: None, ping_interval_sec: None }
    }
}

impl ReconnectConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn ping_interval(&self) -> Option<Duration> {
        self.ping_interval_sec.map(Duration::from_secs)
    }
}

/// Action workflow settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Pause between the acknowledgement response and dismissing the prompt.
    pub ack_delay_ms: u64,
    /// Candidate prompt labels; the first is shown initially.
    pub labels: Vec<String>,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            ack_delay_ms: 1500,
            labels: DEFAULT_ACTION_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ActionConfig {
    pub fn ack_delay(&self) -> Duration {
        Duration::from_millis(self.ack_delay_ms)
    }
}

/// Mission clock settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// `"yesterday"` or an RFC 3339 instant.
    pub epoch: String,
    /// Recompute interval.
    pub tick_ms: u64,
    pub mode: ClockMode,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { epoch: "yesterday".into(), tick_ms: 1000, mode: ClockMode::FieldWise }
    }
}

impl ClockConfig {
    pub fn epoch(&self) -> Result<MissionEpoch, SpectrumError> {
        MissionEpoch::parse(&self.epoch)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

/// Presentation settings consumed by the dashboard view.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// `chrono` format for sample timestamp labels.
    pub timestamp_format: String,
    pub window: WindowConfig,
    /// How often the runner redraws its summary table.
    pub render_interval_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.into(),
            window: WindowConfig::default(),
            render_interval_ms: 5000,
        }
    }
}

/// Number of most recent samples shown per channel.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub velocity: usize,
    pub altitude: usize,
    pub temperature: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self { velocity: 30, altitude: 30, temperature: 20 }
    }
}

impl WindowConfig {
    pub fn for_channel(&self, channel: Channel) -> usize {
        match channel {
            Channel::Velocity => self.velocity,
            Channel::Altitude => self.altitude,
            Channel::Temperature => self.temperature,
        }
    }
}

/// Load, parse and validate a JSON config file.
pub fn load_config(path: &std::path::Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = parse_config(&content)?;
    Ok(config)
}

/// Parse and validate config text.
pub fn parse_config(content: &str) -> anyhow::Result<AppConfig> {
    let config: AppConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}
