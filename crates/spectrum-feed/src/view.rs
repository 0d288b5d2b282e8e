//! Read-only projection of engine state for presentation.

use std::fmt::Write as _;

use spectrum_action::ActionState;
use spectrum_core::config::WindowConfig;
use spectrum_core::series::SeriesSummary;
use spectrum_core::types::to_fixed_2;
use spectrum_core::{Channel, ConnectionState, Sample, TelemetrySnapshot};

use crate::coordinator::IngestionCoordinator;

/// One channel as the dashboard shows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelView {
    pub channel: Channel,
    pub summary: SeriesSummary,
    /// Trailing display window, oldest first.
    pub window: Vec<Sample>,
}

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub mission_time: String,
    pub last_update: String,
    pub snapshot: TelemetrySnapshot,
    pub connection: ConnectionState,
    pub streaming: bool,
    pub action_state: ActionState,
    /// `Some(label)` while the action prompt is on screen.
    pub prompt: Option<String>,
    pub discarded_frames: u64,
    pub channels: Vec<ChannelView>,
}

impl DashboardView {
    pub fn build(
        coordinator: &IngestionCoordinator,
        mission_time: &str,
        connection: ConnectionState,
        windows: &WindowConfig,
    ) -> Self {
        let store = coordinator.store();
        let action = coordinator.action();
        let channels = Channel::ALL
            .iter()
            .map(|&channel| ChannelView {
                channel,
                summary: store.summary(channel),
                window: store.windowed(channel, windows.for_channel(channel)).to_vec(),
            })
            .collect();

        Self {
            mission_time: mission_time.to_string(),
            last_update: coordinator.last_update().to_string(),
            snapshot: coordinator.snapshot().clone(),
            connection,
            streaming: coordinator.streaming_enabled(),
            action_state: action.state(),
            prompt: action.is_prompt_visible().then(|| action.prompt_label().to_string()),
            discarded_frames: coordinator.discarded_frames(),
            channels,
        }
    }

    pub fn channel(&self, channel: Channel) -> Option<&ChannelView> {
        self.channels.iter().find(|c| c.channel == channel)
    }

    /// Plain-text dashboard for terminal output.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Mission time {}   Last update {}", self.mission_time, self.last_update);
        let _ = writeln!(
            out,
            "Stream {} ({})   Status: {}",
            if self.streaming { "on" } else { "off" },
            self.connection,
            self.snapshot.status_text.as_deref().unwrap_or(""),
        );
        let _ = writeln!(out, "Trajectory: {}", self.snapshot.ascending_text());
        let _ = writeln!(out, "{:<12} {:>10} {:>10} {:>10} {:>6}", "Channel", "Current", "Min", "Max", "N");
        for c in &self.channels {
            let _ = writeln!(
                out,
                "{:<12} {:>10} {:>10} {:>10} {:>6}",
                format!("{} ({})", c.channel.label(), c.channel.unit()),
                c.summary.current,
                c.summary.min,
                c.summary.max,
                c.summary.count,
            );
            let trail: Vec<String> = c.window.iter().map(|s| to_fixed_2(s.value)).collect();
            if !trail.is_empty() {
                let _ = writeln!(out, "  {}", trail.join(" "));
            }
        }
        if let Some(label) = &self.prompt {
            let _ = writeln!(out, "ACTION REQUIRED [{}]: type `ack` ({})", label, self.action_state);
        }
        out
    }
}
