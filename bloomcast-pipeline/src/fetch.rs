//! Download of URL-mode inputs
//!
//! URL inputs are fetched before signature verification because the
//! signed payload hash covers the downloaded bytes. The fetcher enforces
//! the configured timeout and size cap so an unauthenticated request can
//! only cost one bounded download.

use crate::error::{PipelineError, Result};
use bloomcast_core::{BloomcastConfig, RequestError, UrlInput};
use std::time::Duration;
use tracing::debug;

/// HTTP client for URL-mode inputs
#[derive(Debug, Clone)]
pub struct InputFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: usize,
}

impl InputFetcher {
    /// Build a fetcher from the process configuration
    pub fn new(config: &BloomcastConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.download_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| PipelineError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            timeout: config.download_timeout,
            max_bytes: config.max_input_bytes,
        })
    }

    /// Download a URL input, returning the raw bytes
    pub async fn fetch(&self, input: &UrlInput) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(&input.url)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::DownloadFailed(format!("HTTP {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        if bytes.len() > self.max_bytes {
            return Err(RequestError::InputTooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            }
            .into());
        }

        debug!(url = %input.url, bytes = bytes.len(), "downloaded url input");
        Ok(bytes.to_vec())
    }

    fn map_reqwest_error(&self, err: reqwest::Error) -> PipelineError {
        if err.is_timeout() {
            PipelineError::DownloadTimeout(self.timeout.as_secs())
        } else {
            PipelineError::DownloadFailed(err.to_string())
        }
    }
}
