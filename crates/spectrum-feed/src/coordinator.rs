//! Ingestion coordinator: the only writer of telemetry state.
//!
//! Both the poll path and the push subscription hand payloads to
//! [`IngestionCoordinator`]. Each payload:
//!
//! 1. is normalized to lower-case keys,
//! 2. gets one timestamp label,
//! 3. appends one sample to **every** channel (NaN when the field is missing,
//!    which keeps the three series the same length),
//! 4. replaces the status snapshot wholesale,
//! 5. raises the action prompt if the payload asks for it **and** streaming
//!    is enabled.
//!
//! Pushed frames are discarded unparsed while streaming is disabled.

use spectrum_action::ActionWorkflow;
use spectrum_core::normalize::{RawPayload, normalize, parse_payload};
use spectrum_core::series::SeriesStore;
use spectrum_core::time_util::{NO_UPDATE_LABEL, timestamp_label};
use spectrum_core::{Channel, Sample, TelemetrySnapshot};
use tracing::{debug, warn};

/// What happened to a pushed frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Ingested; `prompt_raised` tells whether the action prompt surfaced.
    Applied { prompt_raised: bool },
    /// Streaming disabled, frame dropped.
    Discarded,
    /// Not a JSON object, frame dropped.
    Malformed(String),
}

#[derive(Debug)]
pub struct IngestionCoordinator {
    store: SeriesStore,
    snapshot: TelemetrySnapshot,
    last_update: String,
    streaming_enabled: bool,
    action: ActionWorkflow,
    timestamp_format: String,
    discarded_frames: u64,
}

impl IngestionCoordinator {
    pub fn new(action: ActionWorkflow, timestamp_format: impl Into<String>) -> Self {
        Self {
            store: SeriesStore::new(),
            snapshot: TelemetrySnapshot::default(),
            last_update: NO_UPDATE_LABEL.to_string(),
            streaming_enabled: false,
            action,
            timestamp_format: timestamp_format.into(),
            discarded_frames: 0,
        }
    }

    /// Ingest a payload stamped with the current local time.
    ///
    /// Returns `true` if this payload surfaced the action prompt.
    pub fn ingest(&mut self, raw: &RawPayload) -> bool {
        let timestamp = timestamp_label(&self.timestamp_format);
        self.ingest_at(raw, timestamp)
    }

    /// Ingest a payload with an explicit timestamp label.
    pub fn ingest_at(&mut self, raw: &RawPayload, timestamp: String) -> bool {
        let payload = normalize(raw);

        for channel in Channel::ALL {
            let value = payload.channel_value(channel);
            if value.is_nan() {
                debug!("[ingest] payload has no numeric '{channel}'");
            }
            self.store.append(channel, Sample::rounded(timestamp.clone(), value));
        }

        self.snapshot = TelemetrySnapshot {
            is_ascending: payload.is_ascending(),
            status_text: payload.status_message(),
            action_required: payload.action_required_flag(),
        };
        self.last_update = timestamp;

        payload.is_action_required() && self.streaming_enabled && self.action.raise()
    }

    /// Apply or discard one pushed text frame.
    pub fn handle_frame(&mut self, text: &str) -> FrameOutcome {
        if !self.streaming_enabled {
            self.discarded_frames += 1;
            return FrameOutcome::Discarded;
        }
        match parse_payload(text) {
            Ok(raw) => FrameOutcome::Applied { prompt_raised: self.ingest(&raw) },
            Err(e) => {
                warn!("[ingest] dropping malformed frame: {e}");
                FrameOutcome::Malformed(e.to_string())
            }
        }
    }

    pub fn set_streaming(&mut self, enabled: bool) {
        self.streaming_enabled = enabled;
    }

    pub fn streaming_enabled(&self) -> bool {
        self.streaming_enabled
    }

    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    pub fn snapshot(&self) -> &TelemetrySnapshot {
        &self.snapshot
    }

    /// Timestamp label of the latest ingest, `--:--:--` before the first.
    pub fn last_update(&self) -> &str {
        &self.last_update
    }

    pub fn action(&self) -> &ActionWorkflow {
        &self.action
    }

    pub fn action_mut(&mut self) -> &mut ActionWorkflow {
        &mut self.action
    }

    /// Frames dropped because streaming was disabled.
    pub fn discarded_frames(&self) -> u64 {
        self.discarded_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::{Value, json};
    use spectrum_action::ActionState;
    use spectrum_core::normalize::payload_from_value;

    fn coordinator() -> IngestionCoordinator {
        let wf = ActionWorkflow::with_rng(Vec::new(), StdRng::seed_from_u64(3));
        IngestionCoordinator::new(wf, "%H:%M:%S")
    }

    fn raw(v: Value) -> RawPayload {
        payload_from_value(v).unwrap()
    }

    fn reading(velocity: f64, action: bool) -> RawPayload {
        raw(json!({
            "velocity": velocity,
            "altitude": 2,
            "temperature": 3,
            "isascending": false,
            "statusmessage": "ok",
            "isactionrequired": action
        }))
    }

    #[test]
    fn three_payloads_in_order() {
        let mut c = coordinator();
        for (i, v) in [1.0, 2.0, 1.5].into_iter().enumerate() {
            c.ingest_at(&reading(v, false), format!("10:00:0{i}"));
        }
        let values: Vec<f64> =
            c.store().samples(Channel::Velocity).iter().map(|s| s.value).collect();
        assert_eq!(values, [1.0, 2.0, 1.5]);
        assert_eq!(c.store().last_value(Channel::Velocity), "1.50");
        assert_eq!(c.last_update(), "10:00:02");
        assert!(c.store().is_aligned());
    }

    #[test]
    fn action_requires_streaming() {
        let mut c = coordinator();
        assert!(!c.ingest(&reading(1.0, true)));
        assert_eq!(c.action().state(), ActionState::Idle);
        assert_eq!(c.snapshot().action_required, Some(true));

        c.set_streaming(true);
        assert!(c.ingest(&reading(1.0, true)));
        assert_eq!(c.action().state(), ActionState::Required);
    }

    #[test]
    fn repeated_trigger_while_prompted_only_updates_snapshot() {
        let mut c = coordinator();
        c.set_streaming(true);
        assert!(c.ingest(&reading(1.0, true)));
        c.action_mut().begin_acknowledge().unwrap();

        let mut next = reading(4.0, true);
        next.insert("statusMessage".into(), json!("still bad"));
        next.remove("statusmessage");
        assert!(!c.ingest(&next));
        assert_eq!(c.action().state(), ActionState::Acknowledging);
        assert_eq!(c.snapshot().status_text.as_deref(), Some("still bad"));
    }

    #[test]
    fn snapshot_replaced_wholesale() {
        let mut c = coordinator();
        assert_eq!(c.snapshot().status_text.as_deref(), Some("Nothing to report."));
        assert_eq!(c.last_update(), "--:--:--");

        c.ingest(&raw(json!({"IsAscending": true, "StatusMessage": "climbing"})));
        assert_eq!(c.snapshot().is_ascending, Some(true));

        c.ingest(&raw(json!({"velocity": 1})));
        assert_eq!(c.snapshot(), &TelemetrySnapshot {
            is_ascending: None,
            status_text: None,
            action_required: None,
        });
    }

    #[test]
    fn missing_channel_keeps_series_aligned() {
        let mut c = coordinator();
        c.ingest(&raw(json!({"Velocity": 5.555, "Altitude": "120.5"})));
        assert_eq!(c.store().len(Channel::Temperature), 1);
        assert!(c.store().is_aligned());
        assert_eq!(c.store().last_value(Channel::Velocity), "5.55");
        assert_eq!(c.store().last_value(Channel::Altitude), "120.50");
        assert_eq!(c.store().last_value(Channel::Temperature), "NaN");
    }

    #[test]
    fn frames_gated_by_streaming_flag() {
        let mut c = coordinator();
        let frame = r#"{"Velocity": 7, "IsActionRequired": true}"#;

        assert_eq!(c.handle_frame(frame), FrameOutcome::Discarded);
        assert_eq!(c.discarded_frames(), 1);
        assert_eq!(c.store().len(Channel::Velocity), 0);

        c.set_streaming(true);
        assert_eq!(c.handle_frame(frame), FrameOutcome::Applied { prompt_raised: true });
        assert_eq!(c.store().len(Channel::Velocity), 1);

        assert!(matches!(c.handle_frame("[1,2,3]"), FrameOutcome::Malformed(_)));
        assert_eq!(c.store().len(Channel::Velocity), 1);
    }

    #[test]
    fn numeric_action_flag_agrees_with_trigger() {
        let mut c = coordinator();
        c.set_streaming(true);
        assert!(c.ingest(&raw(json!({"IsActionRequired": 1}))));
        assert_eq!(c.snapshot().action_required, Some(true));
        assert_eq!(c.action().state(), ActionState::Required);

        c.ingest(&raw(json!({"IsActionRequired": 0})));
        assert_eq!(c.snapshot().action_required, Some(false));
    }
}
