//! "Spacecraft requires action" prompt state machine.
//!
//! ```text
//! Idle ──raise──► Required ──begin_acknowledge──► Acknowledging ──complete──► Idle
//!                    ▲                                  │
//!                    └────────acknowledge_failed────────┘
//! ```
//!
//! `raise` outside `Idle` is ignored. There is no cancel transition out of
//! `Acknowledging`.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use spectrum_core::config::DEFAULT_ACTION_LABELS;
use spectrum_core::error::SpectrumError;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ActionState {
    #[default]
    Idle,
    Required,
    Acknowledging,
}

impl std::fmt::Display for ActionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Required => write!(f, "required"),
            Self::Acknowledging => write!(f, "acknowledging"),
        }
    }
}

pub struct ActionWorkflow {
    state: ActionState,
    label: String,
    labels: Vec<String>,
    rng: StdRng,
}

impl ActionWorkflow {
    /// Create an idle workflow showing the first of `labels`.
    pub fn new(labels: Vec<String>) -> Self {
        Self::with_rng(labels, StdRng::from_entropy())
    }

    /// Same as [`new`](Self::new) with a caller-supplied generator.
    pub fn with_rng(labels: Vec<String>, rng: StdRng) -> Self {
        let labels = if labels.is_empty() {
            DEFAULT_ACTION_LABELS.iter().map(|s| s.to_string()).collect()
        } else {
            labels
        };
        let label = labels[0].clone();
        Self { state: ActionState::Idle, label, labels, rng }
    }

    pub fn state(&self) -> ActionState {
        self.state
    }

    /// Label on the acknowledgement button.
    pub fn prompt_label(&self) -> &str {
        &self.label
    }

    /// The prompt stays on screen from `Required` until `complete`.
    pub fn is_prompt_visible(&self) -> bool {
        self.state != ActionState::Idle
    }

    /// `Idle → Required`. Returns `true` if the prompt was surfaced.
    pub fn raise(&mut self) -> bool {
        if self.state != ActionState::Idle {
            debug!("[action] trigger ignored while {}", self.state);
            return false;
        }
        self.state = ActionState::Required;
        info!("[action] spacecraft requires action: '{}'", self.label);
        true
    }

    /// `Required → Acknowledging`. The caller issues the outbound request.
    pub fn begin_acknowledge(&mut self) -> Result<(), SpectrumError> {
        if self.state != ActionState::Required {
            return Err(SpectrumError::Action(format!(
                "cannot acknowledge while {}",
                self.state
            )));
        }
        self.state = ActionState::Acknowledging;
        info!("[action] acknowledging '{}'", self.label);
        Ok(())
    }

    /// `Acknowledging → Required` after the request failed.
    pub fn acknowledge_failed(&mut self) {
        if self.state == ActionState::Acknowledging {
            self.state = ActionState::Required;
        }
    }

    /// `Acknowledging → Idle`: dismiss the prompt and draw the next label.
    ///
    /// Returns `false` (no-op) when not acknowledging.
    pub fn complete(&mut self) -> bool {
        if self.state != ActionState::Acknowledging {
            return false;
        }
        self.state = ActionState::Idle;
        if let Some(next) = self.labels.choose(&mut self.rng) {
            self.label = next.clone();
        }
        info!("[action] action taken, next prompt '{}'", self.label);
        true
    }
}

impl std::fmt::Debug for ActionWorkflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionWorkflow")
            .field("state", &self.state)
            .field("label", &self.label)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow() -> ActionWorkflow {
        let labels = DEFAULT_ACTION_LABELS.iter().map(|s| s.to_string()).collect();
        ActionWorkflow::with_rng(labels, StdRng::seed_from_u64(7))
    }

    #[test]
    fn full_round_trip() {
        let mut wf = workflow();
        assert_eq!(wf.state(), ActionState::Idle);
        assert_eq!(wf.prompt_label(), "Correct steering");
        assert!(!wf.is_prompt_visible());

        assert!(wf.raise());
        assert_eq!(wf.state(), ActionState::Required);
        assert!(wf.is_prompt_visible());

        wf.begin_acknowledge().unwrap();
        assert_eq!(wf.state(), ActionState::Acknowledging);
        assert!(wf.is_prompt_visible());

        assert!(wf.complete());
        assert_eq!(wf.state(), ActionState::Idle);
        assert!(DEFAULT_ACTION_LABELS.contains(&wf.prompt_label()));
    }

    #[test]
    fn raise_ignored_unless_idle() {
        let mut wf = workflow();
        assert!(wf.raise());
        assert!(!wf.raise());
        wf.begin_acknowledge().unwrap();
        assert!(!wf.raise());
        assert_eq!(wf.state(), ActionState::Acknowledging);
    }

    #[test]
    fn acknowledge_requires_prompt() {
        let mut wf = workflow();
        assert!(matches!(wf.begin_acknowledge(), Err(SpectrumError::Action(_))));
        assert!(!wf.complete());
        assert_eq!(wf.state(), ActionState::Idle);
    }

    #[test]
    fn failed_acknowledge_returns_to_required() {
        let mut wf = workflow();
        wf.raise();
        wf.begin_acknowledge().unwrap();
        wf.acknowledge_failed();
        assert_eq!(wf.state(), ActionState::Required);
        assert_eq!(wf.prompt_label(), "Correct steering");
    }

    #[test]
    fn empty_label_set_falls_back() {
        let wf = ActionWorkflow::with_rng(Vec::new(), StdRng::seed_from_u64(1));
        assert_eq!(wf.prompt_label(), DEFAULT_ACTION_LABELS[0]);
    }
}
