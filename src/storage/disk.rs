//! On-disk cache storage
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/<hex(bucket name)>/<sha256(identity)>.json   entry metadata
//! <root>/<hex(bucket name)>/<sha256(identity)>.body   raw response body
//! <root>/.staging-*/                                  in-flight batches
//! <root>/.staging-*.old/                              bucket being replaced
//! ```
//!
//! Entry files are content-addressed by the request identity, so a second
//! put for the same identity replaces the first.

use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{RequestKey, Response, ResponseType};
use crate::storage::{CacheStorage, CachedEntry};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;
use tracing::{debug, warn};

const STAGING_PREFIX: &str = ".staging-";

/// Metadata persisted next to each body file
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    key: RequestKey,
    status: u16,
    headers: Vec<(String, String)>,
    kind: ResponseType,
    url: Option<String>,
    stored_at: DateTime<Utc>,
}

/// Cache storage persisted in a directory tree
#[derive(Debug, Clone)]
pub struct DiskStorage {
    root: PathBuf,
}

impl DiskStorage {
    /// Use `root` as the storage directory (created lazily)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.root.join(hex::encode(bucket.as_bytes()))
    }

    /// File stem for a request identity
    fn entry_stem(key: &RequestKey) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.method.as_str().as_bytes());
        hasher.update(b" ");
        hasher.update(key.url.as_bytes());
        hex::encode(hasher.finalize())
    }

    async fn ensure_dir(path: &Path) -> SwcacheResult<()> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| SwcacheError::io(format!("creating directory {}", path.display()), e))
    }

    /// Write an entry's two files into `dir`
    async fn write_entry(dir: &Path, entry: &CachedEntry) -> SwcacheResult<()> {
        let stem = Self::entry_stem(&entry.key);
        let meta = EntryMeta {
            key: entry.key.clone(),
            status: entry.response.status,
            headers: entry.response.headers.clone(),
            kind: entry.response.kind,
            url: entry.response.url.clone(),
            stored_at: entry.stored_at,
        };

        let body_path = dir.join(format!("{}.body", stem));
        fs::write(&body_path, &entry.response.body)
            .await
            .map_err(|e| SwcacheError::io(format!("writing {}", body_path.display()), e))?;

        // Metadata last: an entry is only visible once its .json exists
        let meta_path = dir.join(format!("{}.json", stem));
        let content = serde_json::to_vec_pretty(&meta)?;
        fs::write(&meta_path, content)
            .await
            .map_err(|e| SwcacheError::io(format!("writing {}", meta_path.display()), e))?;

        Ok(())
    }

    async fn read_meta(path: &Path) -> SwcacheResult<EntryMeta> {
        let content = fs::read(path)
            .await
            .map_err(|e| SwcacheError::io(format!("reading {}", path.display()), e))?;
        Ok(serde_json::from_slice(&content)?)
    }

    fn staging_dir(&self) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        self.root
            .join(format!("{}{}-{}", STAGING_PREFIX, std::process::id(), nanos))
    }

    /// Build the full post-batch bucket in `staging`: current files first,
    /// then the batch on top
    async fn stage_batch(
        staging: &Path,
        target: &Path,
        entries: &[CachedEntry],
    ) -> SwcacheResult<()> {
        Self::ensure_dir(staging).await?;

        if fs::metadata(target).await.is_ok_and(|m| m.is_dir()) {
            let mut dir = fs::read_dir(target)
                .await
                .map_err(|e| SwcacheError::io(format!("reading {}", target.display()), e))?;
            while let Some(item) = dir
                .next_entry()
                .await
                .map_err(|e| SwcacheError::io("reading bucket entry", e))?
            {
                let dest = staging.join(item.file_name());
                fs::copy(item.path(), &dest).await.map_err(|e| {
                    SwcacheError::io(format!("copying {}", item.path().display()), e)
                })?;
            }
        }

        for entry in entries {
            Self::write_entry(staging, entry).await?;
        }
        Ok(())
    }

    /// Swap the staged directory in for the bucket.
    ///
    /// The old bucket is moved aside first and moved back if the swap fails,
    /// so readers see either the old bucket or the new one.
    async fn commit_batch(staging: &Path, target: &Path) -> SwcacheResult<()> {
        let mut retired = staging.as_os_str().to_owned();
        retired.push(".old");
        let retired = PathBuf::from(retired);

        let had_target = fs::metadata(target).await.is_ok_and(|m| m.is_dir());
        if had_target {
            fs::rename(target, &retired)
                .await
                .map_err(|e| SwcacheError::io(format!("moving {}", target.display()), e))?;
        }

        if let Err(e) = fs::rename(staging, target).await {
            if had_target {
                if let Err(restore) = fs::rename(&retired, target).await {
                    warn!(
                        "Failed to restore bucket {}: {}",
                        target.display(),
                        restore
                    );
                }
            }
            return Err(SwcacheError::io(
                format!("committing {}", target.display()),
                e,
            ));
        }

        if had_target {
            if let Err(e) = fs::remove_dir_all(&retired).await {
                debug!("Failed to remove {}: {}", retired.display(), e);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStorage for DiskStorage {
    async fn open(&self, bucket: &str) -> SwcacheResult<()> {
        Self::ensure_dir(&self.bucket_dir(bucket)).await
    }

    async fn has(&self, bucket: &str) -> SwcacheResult<bool> {
        Ok(fs::metadata(self.bucket_dir(bucket))
            .await
            .is_ok_and(|m| m.is_dir()))
    }

    async fn keys(&self) -> SwcacheResult<Vec<String>> {
        if fs::metadata(&self.root).await.is_err() {
            return Ok(vec![]);
        }

        let mut names = Vec::new();
        let mut dir = fs::read_dir(&self.root)
            .await
            .map_err(|e| SwcacheError::io(format!("reading {}", self.root.display()), e))?;

        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| SwcacheError::io("reading storage entry", e))?
        {
            let file_name = item.file_name();
            let Some(encoded) = file_name.to_str() else {
                continue;
            };
            if encoded.starts_with('.') {
                continue;
            }
            let decoded = hex::decode(encoded)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok());
            match decoded {
                Some(name) => names.push(name),
                None => debug!("Ignoring foreign directory in cache storage: {}", encoded),
            }
        }

        names.sort();
        Ok(names)
    }

    async fn delete(&self, bucket: &str) -> SwcacheResult<bool> {
        let dir = self.bucket_dir(bucket);
        if !self.has(bucket).await? {
            return Ok(false);
        }
        fs::remove_dir_all(&dir)
            .await
            .map_err(|e| SwcacheError::io(format!("deleting bucket {}", bucket), e))?;
        Ok(true)
    }

    async fn get(&self, bucket: &str, key: &RequestKey) -> SwcacheResult<Option<CachedEntry>> {
        let dir = self.bucket_dir(bucket);
        let stem = Self::entry_stem(key);
        let meta_path = dir.join(format!("{}.json", stem));

        if fs::metadata(&meta_path).await.is_err() {
            return Ok(None);
        }

        let meta = Self::read_meta(&meta_path).await?;
        let body_path = dir.join(format!("{}.body", stem));
        let body = fs::read(&body_path)
            .await
            .map_err(|e| SwcacheError::io(format!("reading {}", body_path.display()), e))?;

        Ok(Some(CachedEntry {
            key: meta.key,
            response: Response {
                status: meta.status,
                headers: meta.headers,
                body,
                kind: meta.kind,
                url: meta.url,
            },
            stored_at: meta.stored_at,
        }))
    }

    async fn put(&self, bucket: &str, entry: CachedEntry) -> SwcacheResult<()> {
        let dir = self.bucket_dir(bucket);
        Self::ensure_dir(&dir).await?;
        Self::write_entry(&dir, &entry).await
    }

    async fn put_all(&self, bucket: &str, entries: Vec<CachedEntry>) -> SwcacheResult<()> {
        let target = self.bucket_dir(bucket);
        let staging = self.staging_dir();

        let result = match Self::stage_batch(&staging, &target, &entries).await {
            Ok(()) => Self::commit_batch(&staging, &target).await,
            Err(e) => Err(e),
        };

        if result.is_err() && fs::metadata(&staging).await.is_ok() {
            if let Err(e) = fs::remove_dir_all(&staging).await {
                debug!("Failed to remove staging dir {}: {}", staging.display(), e);
            }
        }
        result
    }

    async fn entries(&self, bucket: &str) -> SwcacheResult<Vec<RequestKey>> {
        let dir = self.bucket_dir(bucket);
        if !self.has(bucket).await? {
            return Err(SwcacheError::BucketNotFound(bucket.to_string()));
        }

        let mut keys = Vec::new();
        let mut listing = fs::read_dir(&dir)
            .await
            .map_err(|e| SwcacheError::io(format!("reading {}", dir.display()), e))?;

        while let Some(item) = listing
            .next_entry()
            .await
            .map_err(|e| SwcacheError::io("reading bucket entry", e))?
        {
            let path = item.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                keys.push(Self::read_meta(&path).await?.key);
            }
        }

        keys.sort();
        Ok(keys)
    }
}
