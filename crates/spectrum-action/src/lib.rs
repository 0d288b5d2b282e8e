//! # spectrum-action
//!
//! Operator action workflow for the Spectrum telemetry monitor.
//!
//! When the spacecraft reports that intervention is required, the engine
//! raises a prompt through [`ActionWorkflow`]. The operator's
//! acknowledgement issues one request through an [`Acknowledger`], waits a
//! fixed delay, and posts an [`ActionEvent`] back to the engine.
//!
//! ## Lifecycle
//!
//! 1. [`ActionWorkflow::raise`] on an action-required payload.
//! 2. [`ActionWorkflow::begin_acknowledge`], then [`spawn_acknowledgement`].
//! 3. On [`ActionEvent::Completed`] call [`ActionWorkflow::complete`]; on
//!    [`ActionEvent::Failed`] call [`ActionWorkflow::acknowledge_failed`].

pub mod client;
pub mod event;
pub mod workflow;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

pub use client::HttpAcknowledger;
pub use event::{ActionEvent, ActionEventReceiver, ActionEventSender};
pub use workflow::{ActionState, ActionWorkflow};

/// Sends the one-shot acknowledgement to the remote system.
///
/// Implementations only report whether a response arrived; its content is
/// never inspected.
#[async_trait]
pub trait Acknowledger: Send + Sync {
    async fn acknowledge(&self) -> Result<()>;
}

/// Run one acknowledgement round-trip on a background task.
///
/// The result is posted to `events`. If the receiver is gone by then (engine
/// torn down) the event is silently dropped.
pub fn spawn_acknowledgement(
    acknowledger: Arc<dyn Acknowledger>,
    delay: Duration,
    events: ActionEventSender,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let event = match acknowledger.acknowledge().await {
            Ok(()) => {
                tokio::time::sleep(delay).await;
                ActionEvent::Completed
            }
            Err(e) => {
                warn!("[action] acknowledge failed: {e:#}");
                ActionEvent::Failed { message: format!("{e:#}") }
            }
        };
        let _ = events.send(event);
    })
}
