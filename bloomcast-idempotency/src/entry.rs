//! Cached response entry

use serde::{Deserialize, Serialize};

/// A completed job response held for replay
///
/// The body is kept as the exact bytes that were first sent, so a replay
/// is byte-identical to the original response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheEntry {
    /// Exact response body bytes
    pub body: Vec<u8>,

    /// Content type of the stored body
    pub content_type: String,

    /// Unix seconds at which the entry was created
    pub created_at: i64,
}

impl CacheEntry {
    /// Create an entry stamped with the current clock
    pub fn new(body: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self::at(body, content_type, chrono::Utc::now().timestamp())
    }

    /// Create an entry with an explicit creation time
    pub fn at(body: Vec<u8>, content_type: impl Into<String>, created_at: i64) -> Self {
        Self {
            body,
            content_type: content_type.into(),
            created_at,
        }
    }

    /// Whether the entry has outlived the retention window
    pub fn is_expired(&self, now: i64, ttl_secs: u64) -> bool {
        now.saturating_sub(self.created_at) > ttl_secs as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_window() {
        let entry = CacheEntry::at(b"{}".to_vec(), "application/json", 1_000);
        assert!(!entry.is_expired(1_000, 3600));
        assert!(!entry.is_expired(4_600, 3600)); // exactly at the boundary
        assert!(entry.is_expired(4_601, 3600));
    }
}
