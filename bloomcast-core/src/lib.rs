//! Shared Job Model for BloomCast
//!
//! This crate carries the types that cross every component boundary in the
//! BloomCast pipeline: the inbound [`JobRequest`], its input variants, the
//! Taskyard header names, and the process-wide [`BloomcastConfig`].
//!
//! # Example
//!
//! ```rust
//! use bloomcast_core::{BloomcastConfig, JobInput, JobRequest};
//!
//! let config = BloomcastConfig::builder()
//!     .secret("replace_me")
//!     .timestamp_skew_secs(300)
//!     .build()
//!     .unwrap();
//!
//! let request = JobRequest::new(
//!     "job-0042",
//!     1_700_000_000,
//!     "idem-key-1",
//!     "v1=abc123",
//!     JobInput::Text("product_id,qty\nP-1,4".to_string()),
//! );
//! assert!(request.validate().is_ok());
//! assert_eq!(config.timestamp_skew.as_secs(), 300);
//! ```

mod config;
mod error;
mod request;

pub use config::{BloomcastConfig, BloomcastConfigBuilder};
pub use error::RequestError;
pub use request::{JobInput, JobRequest, UrlInput};

/// Result type for job-model operations
pub type Result<T> = std::result::Result<T, RequestError>;

/// Header names for the Taskyard webhook protocol
pub mod headers {
    /// Unix-seconds timestamp of the signed request
    pub const TIMESTAMP: &str = "X-Taskyard-Timestamp";

    /// Client-supplied key guaranteeing at-most-one effective execution
    pub const IDEMPOTENCY_KEY: &str = "X-Taskyard-Idempotency-Key";

    /// Request signature, `v1=<hex>`
    pub const SIGNATURE: &str = "X-Taskyard-Signature";

    /// Set on responses served from the idempotency cache
    pub const IDEMPOTENT_REPLAY: &str = "X-Taskyard-Idempotent-Replay";
}
