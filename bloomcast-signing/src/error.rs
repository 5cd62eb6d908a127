//! Error types for signature verification

use thiserror::Error;

/// Errors raised while verifying a Taskyard signature
///
/// The distinction between variants exists for logging and metrics only;
/// callers must map all of them to one generic authentication failure so
/// the response never reveals which check failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// The signed timestamp is outside the allowed skew window
    #[error("Timestamp outside allowed skew window")]
    ExpiredTimestamp,

    /// The supplied signature does not match the recomputed one, is
    /// malformed, or carries an unknown scheme version
    #[error("Signature verification failed")]
    BadSignature,
}
