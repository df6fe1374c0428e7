//! Cache storage abstraction
//!
//! A storage holds named buckets; each bucket maps a request identity to a
//! response snapshot. One bucket exists per deployed worker version.
//!
//! # Backends
//!
//! | Backend | Use |
//! |---------|-----|
//! | `MemoryStorage` | Tests and single-process hosts |
//! | `DiskStorage` | CLI host; survives across runs |
//!
//! Writes are last-writer-wins per request identity. There is no locking
//! across operations.

mod disk;
mod memory;

pub use disk::DiskStorage;
pub use memory::MemoryStorage;

use crate::error::SwcacheResult;
use crate::http::{RequestKey, Response};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A stored request/response pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedEntry {
    pub key: RequestKey,
    pub response: Response,
    pub stored_at: DateTime<Utc>,
}

impl CachedEntry {
    /// Snapshot `response` under `key`, timestamped now
    pub fn new(key: RequestKey, response: Response) -> Self {
        Self {
            key,
            response,
            stored_at: Utc::now(),
        }
    }
}

/// Named-bucket cache storage
///
/// `put` and `put_all` create the bucket when it does not exist, matching
/// `caches.open(name).then(c => c.put(..))`.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a bucket, creating it if absent
    async fn open(&self, bucket: &str) -> SwcacheResult<()>;

    /// Whether a bucket exists
    async fn has(&self, bucket: &str) -> SwcacheResult<bool>;

    /// Names of all existing buckets
    async fn keys(&self) -> SwcacheResult<Vec<String>>;

    /// Delete a bucket and everything in it. Returns whether it existed.
    async fn delete(&self, bucket: &str) -> SwcacheResult<bool>;

    /// Look up an exact request identity in one bucket
    async fn get(&self, bucket: &str, key: &RequestKey) -> SwcacheResult<Option<CachedEntry>>;

    /// Store one entry, replacing any previous entry for the same identity
    async fn put(&self, bucket: &str, entry: CachedEntry) -> SwcacheResult<()>;

    /// Store a batch: either every entry lands or none does
    async fn put_all(&self, bucket: &str, entries: Vec<CachedEntry>) -> SwcacheResult<()>;

    /// Request identities stored in a bucket
    async fn entries(&self, bucket: &str) -> SwcacheResult<Vec<RequestKey>>;

    /// Search every bucket, in `keys()` order, for a request identity
    async fn match_any(&self, key: &RequestKey) -> SwcacheResult<Option<CachedEntry>> {
        for bucket in self.keys().await? {
            if let Some(entry) = self.get(&bucket, key).await? {
                return Ok(Some(entry));
            }
        }
        Ok(None)
    }
}
