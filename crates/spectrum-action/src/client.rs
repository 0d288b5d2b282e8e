//! HTTP acknowledgement client.
//!
//! The acknowledge endpoint returns nothing meaningful; any HTTP response,
//! whatever its status, counts as the completion signal. Only transport
//! failures (DNS, connect, timeout) are errors.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use spectrum_core::error::SpectrumError;
use tracing::debug;

use crate::Acknowledger;

pub struct HttpAcknowledger {
    /// Shared HTTP client.
    http: reqwest::Client,
    /// Full acknowledge URL.
    url: String,
}

impl HttpAcknowledger {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building acknowledge HTTP client")?;
        Ok(Self { http, url: url.into() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Acknowledger for HttpAcknowledger {
    async fn acknowledge(&self) -> Result<()> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .map_err(|e| SpectrumError::Http(format!("acknowledge request to {}: {e}", self.url)))?;
        debug!("[action] acknowledge response: {}", resp.status());
        Ok(())
    }
}
