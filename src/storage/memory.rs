//! In-memory cache storage

use crate::error::{SwcacheError, SwcacheResult};
use crate::http::RequestKey;
use crate::storage::{CacheStorage, CachedEntry};
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

type Bucket = BTreeMap<RequestKey, CachedEntry>;

/// Cache storage held in process memory
///
/// Buckets are kept in creation order so `keys()` and `match_any` behave
/// like the browser's `CacheStorage`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    buckets: RwLock<Vec<(String, Bucket)>>,
}

impl MemoryStorage {
    /// Create an empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

fn bucket_mut<'a>(buckets: &'a mut Vec<(String, Bucket)>, name: &str) -> &'a mut Bucket {
    let idx = match buckets.iter().position(|(n, _)| n == name) {
        Some(idx) => idx,
        None => {
            buckets.push((name.to_string(), Bucket::new()));
            buckets.len() - 1
        }
    };
    &mut buckets[idx].1
}

#[async_trait]
impl CacheStorage for MemoryStorage {
    async fn open(&self, bucket: &str) -> SwcacheResult<()> {
        let mut buckets = self.buckets.write().await;
        bucket_mut(&mut buckets, bucket);
        Ok(())
    }

    async fn has(&self, bucket: &str) -> SwcacheResult<bool> {
        let buckets = self.buckets.read().await;
        Ok(buckets.iter().any(|(n, _)| n == bucket))
    }

    async fn keys(&self) -> SwcacheResult<Vec<String>> {
        let buckets = self.buckets.read().await;
        Ok(buckets.iter().map(|(n, _)| n.clone()).collect())
    }

    async fn delete(&self, bucket: &str) -> SwcacheResult<bool> {
        let mut buckets = self.buckets.write().await;
        let before = buckets.len();
        buckets.retain(|(n, _)| n != bucket);
        Ok(buckets.len() != before)
    }

    async fn get(&self, bucket: &str, key: &RequestKey) -> SwcacheResult<Option<CachedEntry>> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .iter()
            .find(|(n, _)| n == bucket)
            .and_then(|(_, entries)| entries.get(key).cloned()))
    }

    async fn put(&self, bucket: &str, entry: CachedEntry) -> SwcacheResult<()> {
        let mut buckets = self.buckets.write().await;
        bucket_mut(&mut buckets, bucket).insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn put_all(&self, bucket: &str, entries: Vec<CachedEntry>) -> SwcacheResult<()> {
        // One write guard for the whole batch
        let mut buckets = self.buckets.write().await;
        let target = bucket_mut(&mut buckets, bucket);
        for entry in entries {
            target.insert(entry.key.clone(), entry);
        }
        Ok(())
    }

    async fn entries(&self, bucket: &str) -> SwcacheResult<Vec<RequestKey>> {
        let buckets = self.buckets.read().await;
        buckets
            .iter()
            .find(|(n, _)| n == bucket)
            .map(|(_, entries)| entries.keys().cloned().collect())
            .ok_or_else(|| SwcacheError::BucketNotFound(bucket.to_string()))
    }
}
