//! Idempotent Replay for BloomCast
//!
//! A completed job response is stored once per idempotency key and replayed
//! byte-identically for the retention window (one hour by default).
//! Storage sits behind the [`IdempotencyStore`] trait so the in-memory
//! default can be swapped for a persistent backend without touching
//! callers. The in-memory store loses all entries on process restart; that
//! is a documented configuration choice, not an architectural given.
//!
//! [`KeyedLocks`] provides the single-flight discipline: concurrent
//! requests carrying the same key serialize so that at most one underlying
//! computation runs, and late arrivals observe the first request's cached
//! response.
//!
//! # Example
//!
//! ```rust
//! use bloomcast_idempotency::{CacheEntry, IdempotencyStore, MemoryIdempotencyStore};
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = MemoryIdempotencyStore::new(Duration::from_secs(3600));
//! let entry = CacheEntry::new(b"{\"ok\":true}".to_vec(), "application/json");
//!
//! store.store("idem-1", entry).await.unwrap();
//! let hit = store.lookup("idem-1").await.unwrap();
//! assert!(hit.is_some());
//! # }
//! ```

mod entry;
mod error;
mod memory;
mod singleflight;
mod store;

pub use entry::CacheEntry;
pub use error::IdempotencyError;
pub use memory::MemoryIdempotencyStore;
pub use singleflight::KeyedLocks;
pub use store::IdempotencyStore;

/// Result type for idempotency operations
pub type Result<T> = std::result::Result<T, IdempotencyError>;
