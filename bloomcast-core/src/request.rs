//! Inbound job request model
//!
//! A [`JobRequest`] is created once per inbound call, consumed once by the
//! pipeline, and never mutated after construction.

use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The single input of a job; exactly one variant is populated per request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobInput {
    /// Inline text payload (normalized before hashing)
    Text(String),

    /// Uploaded file payload (hashed as raw bytes, unmodified)
    File {
        /// Original filename, if supplied
        name: Option<String>,
        /// Raw file bytes
        #[serde(with = "serde_bytes_vec")]
        bytes: Vec<u8>,
    },

    /// Remote file to be downloaded before processing
    Url(UrlInput),
}

/// Descriptor for a URL-mode input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlInput {
    /// Location of the remote file
    pub url: String,
    /// Declared filename
    pub name: String,
    /// Declared MIME type
    pub mime: String,
    /// Declared size in bytes
    pub size: u64,
}

/// A signed Taskyard job request
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Taskyard job identifier (part of the signed message)
    pub job_id: String,

    /// Signed unix-seconds timestamp
    pub timestamp: i64,

    /// Client-supplied idempotency key, stable per logical job
    pub idempotency_key: String,

    /// Supplied signature header value, `v1=<hex>`
    pub signature: String,

    /// The job input; exactly one variant
    pub input: JobInput,

    /// Free-form per-job options, e.g. schema overrides
    pub options: HashMap<String, String>,

    /// Taskyard completion mode (`review` or `completed`)
    pub completion_mode: String,
}

impl JobRequest {
    /// Create a request with default options and `review` completion mode
    pub fn new(
        job_id: impl Into<String>,
        timestamp: i64,
        idempotency_key: impl Into<String>,
        signature: impl Into<String>,
        input: JobInput,
    ) -> Self {
        Self {
            job_id: job_id.into(),
            timestamp,
            idempotency_key: idempotency_key.into(),
            signature: signature.into(),
            input,
            options: HashMap::new(),
            completion_mode: "review".to_string(),
        }
    }

    /// Attach per-job options (schema overrides and the like)
    pub fn with_options(mut self, options: HashMap<String, String>) -> Self {
        self.options = options;
        self
    }

    /// Set the completion mode
    pub fn with_completion_mode(mut self, mode: impl Into<String>) -> Self {
        self.completion_mode = mode.into();
        self
    }

    /// Check the structural invariants of the request
    ///
    /// Timestamp skew and signature validity are checked by the verifier,
    /// not here.
    pub fn validate(&self) -> crate::Result<()> {
        if self.job_id.trim().is_empty() {
            return Err(RequestError::MissingField("job_id"));
        }
        if self.idempotency_key.trim().is_empty() {
            return Err(RequestError::MissingField("idempotency_key"));
        }
        if self.signature.trim().is_empty() {
            return Err(RequestError::MissingField("signature"));
        }
        if let JobInput::Url(url) = &self.input {
            if url.url.trim().is_empty() {
                return Err(RequestError::MissingField("input_url"));
            }
        }
        Ok(())
    }

    /// Check the input size against the configured cap, where it is known
    /// up front (file bytes or the declared URL size)
    pub fn check_size(&self, max_bytes: usize) -> crate::Result<()> {
        let size = match &self.input {
            JobInput::Text(text) => text.len(),
            JobInput::File { bytes, .. } => bytes.len(),
            JobInput::Url(url) => url.size as usize,
        };
        if size > max_bytes {
            return Err(RequestError::InputTooLarge {
                size,
                max: max_bytes,
            });
        }
        Ok(())
    }
}

/// Compact serde representation for raw byte payloads
mod serde_bytes_vec {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(bytes)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        Vec::<u8>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> JobRequest {
        JobRequest::new(
            "job-0042",
            1_700_000_000,
            "idem-1",
            "v1=deadbeef",
            JobInput::Text("a,b\n1,2".to_string()),
        )
    }

    #[test]
    fn test_validate_ok() {
        assert!(sample_request().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_job_id() {
        let mut request = sample_request();
        request.job_id = "  ".to_string();
        assert_eq!(
            request.validate(),
            Err(RequestError::MissingField("job_id"))
        );
    }

    #[test]
    fn test_validate_empty_idempotency_key() {
        let mut request = sample_request();
        request.idempotency_key = String::new();
        assert_eq!(
            request.validate(),
            Err(RequestError::MissingField("idempotency_key"))
        );
    }

    #[test]
    fn test_validate_empty_url() {
        let request = JobRequest::new(
            "job-1",
            0,
            "idem-1",
            "v1=00",
            JobInput::Url(UrlInput {
                url: String::new(),
                name: "input.xlsx".to_string(),
                mime: "application/vnd.ms-excel".to_string(),
                size: 10,
            }),
        );
        assert_eq!(
            request.validate(),
            Err(RequestError::MissingField("input_url"))
        );
    }

    #[test]
    fn test_check_size() {
        let request = sample_request();
        assert!(request.check_size(1024).is_ok());
        assert!(matches!(
            request.check_size(3),
            Err(RequestError::InputTooLarge { .. })
        ));
    }
}
