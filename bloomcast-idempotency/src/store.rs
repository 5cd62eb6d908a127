//! Idempotency store trait definition

use crate::entry::CacheEntry;
use crate::Result;
use async_trait::async_trait;

/// Storage backend for completed job responses, keyed by idempotency key
///
/// This is the only mutable shared state in the pipeline core; every
/// access goes through this contract.
#[async_trait]
pub trait IdempotencyStore: Send + Sync {
    /// Retrieve the stored response for a key
    ///
    /// Returns `Ok(None)` when the key was never seen or its entry has
    /// outlived the retention window; an entry is never served after it
    /// expires.
    async fn lookup(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Store a completed response for a key
    ///
    /// A second store for the same key within the retention window
    /// overwrites (last-writer-wins); job execution is deterministic for
    /// identical verified input, so divergent bodies are not expected.
    async fn store(&self, key: &str, entry: CacheEntry) -> Result<()>;
}
