//! Reconnection strategy for the push subscription.
//!
//! The connection manager asks the policy for a delay after every close or
//! error. Returning `None` ends the retry loop; the default policy never does.

use std::time::Duration;

use crate::config::ReconnectConfig;

/// Decides whether and when to attempt the next connection.
pub trait ReconnectPolicy: Send + Sync + std::fmt::Debug {
    /// Delay before the next attempt, given the number of consecutive failed
    /// or lost connections so far (starting at 1). `None` means give up.
    fn next_delay(&self, failures: u32) -> Option<Duration>;
}

/// Fixed delay between attempts, optionally bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay {
    pub delay: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl FixedDelay {
    pub fn forever(delay: Duration) -> Self {
        Self { delay, max_attempts: None }
    }

    pub fn bounded(delay: Duration, max_attempts: u32) -> Self {
        Self { delay, max_attempts: Some(max_attempts) }
    }

    pub fn from_config(cfg: &ReconnectConfig) -> Self {
        Self { delay: cfg.delay(), max_attempts: cfg.max_attempts }
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        Self::forever(Duration::from_millis(1000))
    }
}

impl ReconnectPolicy for FixedDelay {
    fn next_delay(&self, failures: u32) -> Option<Duration> {
        match self.max_attempts {
            Some(max) if failures > max => None,
            _ => Some(self.delay),
        }
    }
}
