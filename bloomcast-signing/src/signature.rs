//! Taskyard signature generation and verification

use crate::{Result, SignatureError};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The HTTP method baked into the signed message
const SIGNED_METHOD: &str = "POST";

/// The request path baked into the signed message
const SIGNED_PATH: &str = "/run";

/// Taskyard request signature utility
///
/// The signed message is
/// `"{ts}.POST./run.{job_id}.{payload_sha256}"` and the signature is the
/// lowercase-hex HMAC-SHA256 of that message under the shared secret,
/// carried as `v1=<hex>`.
#[derive(Debug, Clone)]
pub struct TaskyardSignature {
    secret: String,
    timestamp_tolerance: u64,
}

impl TaskyardSignature {
    /// Create a new signature utility with the given secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            timestamp_tolerance: 300, // 5 minutes default
        }
    }

    /// Set the timestamp tolerance in seconds
    pub fn with_tolerance(mut self, seconds: u64) -> Self {
        self.timestamp_tolerance = seconds;
        self
    }

    /// Build the message string that is signed
    pub fn message(ts: i64, job_id: &str, payload_sha256: &str) -> String {
        format!("{ts}.{SIGNED_METHOD}.{SIGNED_PATH}.{job_id}.{payload_sha256}")
    }

    /// Generate a `v1=<hex>` signature for the given material
    pub fn sign(&self, ts: i64, job_id: &str, payload_sha256: &str) -> String {
        let msg = Self::message(ts, job_id, payload_sha256);
        format!("v1={}", self.compute_hmac_sha256(msg.as_bytes()))
    }

    /// Verify a supplied signature against the current clock
    ///
    /// Rejects with [`SignatureError::ExpiredTimestamp`] when the signed
    /// timestamp is outside the skew tolerance, with
    /// [`SignatureError::BadSignature`] on any mismatch. Nothing in the
    /// error reveals which part of the comparison failed.
    pub fn verify(
        &self,
        ts: i64,
        job_id: &str,
        payload_sha256: &str,
        supplied: &str,
    ) -> Result<()> {
        self.verify_at(chrono::Utc::now().timestamp(), ts, job_id, payload_sha256, supplied)
    }

    /// Verify against an explicit "now", for deterministic tests
    pub fn verify_at(
        &self,
        now: i64,
        ts: i64,
        job_id: &str,
        payload_sha256: &str,
        supplied: &str,
    ) -> Result<()> {
        if ts.abs_diff(now) > self.timestamp_tolerance {
            return Err(SignatureError::ExpiredTimestamp);
        }

        let supplied_hex = parse_signature_header(supplied)?;
        let msg = Self::message(ts, job_id, payload_sha256);
        let expected = self.compute_hmac_sha256(msg.as_bytes());

        // Hex digits compare case-insensitively; lowercase before the
        // constant-time comparison.
        if constant_time_compare(&supplied_hex.to_ascii_lowercase(), &expected) {
            Ok(())
        } else {
            Err(SignatureError::BadSignature)
        }
    }

    /// Compute the lowercase-hex HMAC-SHA256 of raw message bytes
    fn compute_hmac_sha256(&self, data: &[u8]) -> String {
        let mut mac =
            HmacSha256::new_from_slice(self.secret.as_bytes()).expect("HMAC can take any size key");
        mac.update(data);
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Extract the hex digest from a `v1=<hex>` header value
fn parse_signature_header(value: &str) -> Result<&str> {
    let mut parts = value.splitn(2, '=');
    match (parts.next(), parts.next()) {
        (Some(version), Some(sig)) if version.trim() == "v1" && !sig.trim().is_empty() => {
            Ok(sig.trim())
        }
        _ => Err(SignatureError::BadSignature),
    }
}

/// Constant-time string comparison to prevent timing attacks
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}
