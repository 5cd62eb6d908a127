//! Error types for idempotency storage

use thiserror::Error;

/// Errors raised by idempotency-store backends
#[derive(Error, Debug)]
pub enum IdempotencyError {
    /// Backend connection failure (persistent stores)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Stored entry could not be decoded
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Generic backend error
    #[error("Idempotency store error: {0}")]
    Other(String),
}
