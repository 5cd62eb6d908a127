//! Per-key single-flight locks
//!
//! Concurrent requests carrying the same idempotency key must not run the
//! compute stage twice. Each key maps to one async mutex; the pipeline
//! holds the guard from cache lookup through store, so a duplicate request
//! waits for the first and then observes its cached response.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-key async mutexes
///
/// Lock entries are garbage-collected on release once no other task holds
/// or awaits them, so the map does not grow with key cardinality.
#[derive(Debug, Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

/// Guard for one key's critical section; releasing it drops the map entry
/// when the lock is no longer contended
pub struct KeyGuard {
    key: String,
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    // Declared before `lock` so the guard releases before the Arc drops.
    guard: Option<OwnedMutexGuard<()>>,
    lock: Arc<Mutex<()>>,
}

impl KeyedLocks {
    /// Create an empty lock registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a key, waiting if another task holds it
    pub async fn acquire(&self, key: &str) -> KeyGuard {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };

        let guard = lock.clone().lock_owned().await;
        KeyGuard {
            key: key.to_string(),
            locks: self.locks.clone(),
            guard: Some(guard),
            lock,
        }
    }

    /// Number of keys currently tracked
    pub async fn len(&self) -> usize {
        self.locks.lock().await.len()
    }

    /// Whether no keys are tracked
    pub async fn is_empty(&self) -> bool {
        self.locks.lock().await.is_empty()
    }
}

impl Drop for KeyGuard {
    fn drop(&mut self) {
        // Release the key's mutex first, then drop the registry entry if
        // nobody else holds a reference to it. try_lock on the registry is
        // best-effort; a missed cleanup is retried by the next acquire.
        self.guard.take();
        if let Ok(mut locks) = self.locks.try_lock() {
            // Two strong refs remain when uncontended: the map's and ours.
            if Arc::strong_count(&self.lock) <= 2 {
                locks.remove(&self.key);
            }
        }
    }
}
