//! Pipeline error taxonomy and its HTTP mapping
//!
//! Every failure a job can hit funnels into [`PipelineError`], and
//! [`PipelineError::http_status`] is the single place that decides the
//! response code. Authentication failures share one display string so
//! the response never reveals which check rejected the request.

use bloomcast_core::RequestError;
use bloomcast_engine::EngineError;
use bloomcast_idempotency::IdempotencyError;
use bloomcast_schema::ResolutionError;
use bloomcast_signing::SignatureError;
use thiserror::Error;

/// Errors raised while running a job through the pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The request failed structural validation
    #[error("{0}")]
    Request(#[from] RequestError),

    /// Signature or timestamp verification failed
    ///
    /// The display string is the same for every authentication failure.
    #[error("Authentication failed")]
    Auth(#[source] SignatureError),

    /// A URL-mode input could not be downloaded
    #[error("Download failed: {0}")]
    DownloadFailed(String),

    /// A URL-mode download exceeded the configured timeout
    #[error("Download timed out after {0}s")]
    DownloadTimeout(u64),

    /// The input bytes could not be decoded into a workbook
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// The workbook could not be mapped onto the canonical model
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Proposal computation failed
    #[error("Computation failed: {0}")]
    Compute(#[from] EngineError),

    /// The idempotency store failed
    #[error("Idempotency store failed: {0}")]
    Cache(#[from] IdempotencyError),

    /// Catch-all for internal failures (response serialization and the like)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// HTTP status code this error maps to
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Request(RequestError::InvalidField(_)) => 400,
            Self::Request(RequestError::InputTooLarge { .. }) => 413,
            Self::Request(RequestError::UnsupportedInput(_)) => 415,
            Self::Request(RequestError::Config(_)) => 500,
            Self::Request(_) => 422,
            Self::Auth(_) => 401,
            Self::DownloadFailed(_) | Self::DownloadTimeout(_) => 502,
            Self::UnsupportedFormat(_) => 415,
            Self::Resolution(_) => 422,
            Self::Compute(_) | Self::Cache(_) | Self::Internal(_) => 500,
        }
    }
}

/// Convenience alias used across the pipeline crate
pub type Result<T> = std::result::Result<T, PipelineError>;
