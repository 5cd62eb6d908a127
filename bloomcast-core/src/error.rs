//! Error types for job-model validation

use thiserror::Error;

/// Errors raised while validating an inbound job request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// A required field is empty or missing
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// A field was present but could not be parsed
    #[error("Invalid field: {0}")]
    InvalidField(&'static str),

    /// The input payload exceeds the configured size cap
    #[error("Input too large: {size} bytes (max: {max})")]
    InputTooLarge { size: usize, max: usize },

    /// The request carried an input the service does not accept
    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    /// Configuration was rejected at construction time
    #[error("Configuration error: {0}")]
    Config(String),
}
