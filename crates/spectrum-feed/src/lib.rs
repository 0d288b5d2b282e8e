//! # spectrum-feed
//!
//! Telemetry ingestion for the Spectrum monitor.
//!
//! ## Architecture
//!
//! Payloads arrive two ways: an operator-triggered HTTP poll
//! ([`poll::HttpStatusSource`]) and the WebSocket push subscription owned by
//! the [`engine::Engine`]. Both paths converge on the
//! [`coordinator::IngestionCoordinator`], which appends samples, replaces the
//! status snapshot, and raises the action prompt.
//!
//! - [`engine`] — single-task event loop and its [`engine::EngineHandle`]
//! - [`coordinator`] — normalization, series append, snapshot, action trigger
//! - [`view`] — read-only dashboard projection
//! - [`export`] — CSV download of retained samples

pub mod coordinator;
pub mod engine;
pub mod export;
pub mod poll;
pub mod view;

use anyhow::Result;
use async_trait::async_trait;
use spectrum_core::normalize::RawPayload;

pub use engine::{Engine, EngineDeps, EngineHandle};

/// One-shot source of a full status payload.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch(&self) -> Result<RawPayload>;
}
