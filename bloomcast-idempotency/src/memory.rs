//! In-memory idempotency store
//!
//! Process-lifetime storage with lazy TTL expiry: entries are checked at
//! lookup time and dropped once past the retention window. All state is
//! lost on restart.

use crate::entry::CacheEntry;
use crate::store::IdempotencyStore;
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Clock source, injectable for deterministic expiry tests
type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// In-memory, TTL-bounded idempotency store
#[derive(Clone)]
pub struct MemoryIdempotencyStore {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
    clock: Clock,
}

impl MemoryIdempotencyStore {
    /// Create a store with the given retention window
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock: Arc::new(|| chrono::Utc::now().timestamp()),
        }
    }

    /// Create a store with an explicit clock, for tests that simulate the
    /// passage of time
    pub fn with_clock(ttl: Duration, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock: Arc::new(clock),
        }
    }

    /// Number of live (possibly expired but unswept) entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every entry past the retention window
    ///
    /// Expiry is lazy at lookup; this sweep exists for callers that want
    /// to bound memory between lookups.
    pub async fn sweep(&self) {
        let now = (self.clock)();
        let ttl_secs = self.ttl.as_secs();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now, ttl_secs));
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "swept expired idempotency entries");
        }
    }
}

impl std::fmt::Debug for MemoryIdempotencyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryIdempotencyStore")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl IdempotencyStore for MemoryIdempotencyStore {
    async fn lookup(&self, key: &str) -> Result<Option<CacheEntry>> {
        let now = (self.clock)();
        let ttl_secs = self.ttl.as_secs();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now, ttl_secs) => {
                    return Ok(Some(entry.clone()));
                }
                Some(_) => {} // expired, fall through to remove
                None => return Ok(None),
            }
        }

        // Lazy expiry: drop the stale entry under the write lock.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if entry.is_expired(now, ttl_secs) {
                entries.remove(key);
                debug!(key, "evicted expired idempotency entry");
            } else {
                return Ok(Some(entry.clone()));
            }
        }
        Ok(None)
    }

    async fn store(&self, key: &str, entry: CacheEntry) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn entry_at(body: &[u8], created_at: i64) -> CacheEntry {
        CacheEntry::at(body.to_vec(), "application/json", created_at)
    }

    #[tokio::test]
    async fn test_lookup_absent() {
        let store = MemoryIdempotencyStore::new(Duration::from_secs(3600));
        assert!(store.lookup("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_store_and_lookup() {
        let store = MemoryIdempotencyStore::with_clock(Duration::from_secs(3600), || 1_000);
        store.store("k", entry_at(b"body", 1_000)).await.unwrap();

        let hit = store.lookup("k").await.unwrap().unwrap();
        assert_eq!(hit.body, b"body");
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let store = MemoryIdempotencyStore::with_clock(Duration::from_secs(3600), || 1_000);
        store.store("k", entry_at(b"first", 1_000)).await.unwrap();
        store.store("k", entry_at(b"second", 1_001)).await.unwrap();

        let hit = store.lookup("k").await.unwrap().unwrap();
        assert_eq!(hit.body, b"second");
    }

    #[tokio::test]
    async fn test_entry_expires_after_ttl() {
        let now = Arc::new(AtomicI64::new(1_000));
        let clock = {
            let now = now.clone();
            move || now.load(Ordering::SeqCst)
        };
        let store = MemoryIdempotencyStore::with_clock(Duration::from_secs(3600), clock);
        store.store("k", entry_at(b"body", 1_000)).await.unwrap();

        // Within the window the entry is served.
        now.store(4_000, Ordering::SeqCst);
        assert!(store.lookup("k").await.unwrap().is_some());

        // One hour plus a second later it is gone, and lazily evicted.
        now.store(1_000 + 3601, Ordering::SeqCst);
        assert!(store.lookup("k").await.unwrap().is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_sweep_evicts_expired() {
        let store = MemoryIdempotencyStore::with_clock(Duration::from_secs(60), || 10_000);
        store.store("old", entry_at(b"a", 1_000)).await.unwrap();
        store.store("new", entry_at(b"b", 9_990)).await.unwrap();

        store.sweep().await;
        assert_eq!(store.len().await, 1);
        assert!(store.lookup("new").await.unwrap().is_some());
    }
}
