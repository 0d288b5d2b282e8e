//! One-shot status poll over HTTP.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use spectrum_core::error::SpectrumError;
use spectrum_core::normalize::{RawPayload, payload_from_value};

use crate::StatusSource;

/// `GET`s the status endpoint and returns the JSON object it answers with.
pub struct HttpStatusSource {
    /// Shared HTTP client.
    http: reqwest::Client,
    /// Full status URL.
    url: String,
}

impl HttpStatusSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("building status HTTP client")?;
        Ok(Self { http, url: url.into() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch(&self) -> Result<RawPayload> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| SpectrumError::Http(format!("status request to {}: {e}", self.url)))?;
        let value: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| SpectrumError::Parse(format!("status response: {e}")))?;
        Ok(payload_from_value(value)?)
    }
}
