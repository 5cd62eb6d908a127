//! Configuration for the BloomCast pipeline
//!
//! All tunables are carried in one explicit struct constructed at process
//! start and threaded through constructors. Components never read ambient
//! environment state themselves.

use crate::error::RequestError;
use std::time::Duration;

/// Process-wide configuration for the BloomCast pipeline
#[derive(Debug, Clone)]
pub struct BloomcastConfig {
    /// Shared secret used to sign and verify Taskyard requests
    pub secret: String,

    /// Allowed clock skew between the signed timestamp and local time
    pub timestamp_skew: Duration,

    /// Retention window for idempotency-cache entries
    pub idempotency_ttl: Duration,

    /// Timeout for downloading URL-mode inputs
    pub download_timeout: Duration,

    /// Maximum accepted input payload size in bytes
    pub max_input_bytes: usize,

    /// User-Agent header for outgoing download requests
    pub user_agent: String,
}

impl Default for BloomcastConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            timestamp_skew: Duration::from_secs(300), // 5 minutes
            idempotency_ttl: Duration::from_secs(3600), // 1 hour
            download_timeout: Duration::from_secs(30),
            max_input_bytes: 25 * 1024 * 1024, // 25 MiB
            user_agent: format!("BloomCast/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl BloomcastConfig {
    /// Create a builder for custom configuration
    pub fn builder() -> BloomcastConfigBuilder {
        BloomcastConfigBuilder::new()
    }
}

/// Builder for [`BloomcastConfig`]
#[derive(Debug, Clone, Default)]
pub struct BloomcastConfigBuilder {
    config: BloomcastConfig,
}

impl BloomcastConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: BloomcastConfig::default(),
        }
    }

    /// Set the shared signing secret
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.config.secret = secret.into();
        self
    }

    /// Set the timestamp skew tolerance
    pub fn timestamp_skew(mut self, skew: Duration) -> Self {
        self.config.timestamp_skew = skew;
        self
    }

    /// Set the timestamp skew tolerance in seconds
    pub fn timestamp_skew_secs(mut self, secs: u64) -> Self {
        self.config.timestamp_skew = Duration::from_secs(secs);
        self
    }

    /// Set the idempotency-cache retention window
    pub fn idempotency_ttl(mut self, ttl: Duration) -> Self {
        self.config.idempotency_ttl = ttl;
        self
    }

    /// Set the URL-input download timeout
    pub fn download_timeout(mut self, timeout: Duration) -> Self {
        self.config.download_timeout = timeout;
        self
    }

    /// Set the maximum accepted input size in bytes
    pub fn max_input_bytes(mut self, max: usize) -> Self {
        self.config.max_input_bytes = max;
        self
    }

    /// Set the User-Agent for outgoing download requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Build the configuration, rejecting an empty secret
    pub fn build(self) -> crate::Result<BloomcastConfig> {
        if self.config.secret.is_empty() {
            return Err(RequestError::Config(
                "signing secret must not be empty".to_string(),
            ));
        }
        Ok(self.config)
    }
}
