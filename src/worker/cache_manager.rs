//! Cache manager: populates the current bucket at install time and evicts
//! stale buckets at activation time.
//!
//! Install is all-or-nothing. Every manifest entry is fetched first; only
//! when all of them came back 2xx is the batch committed to storage.

use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{Origin, Request, RequestKey};
use crate::network::Network;
use crate::storage::{CacheStorage, CachedEntry};
use crate::worker::manifest::PrecacheManifest;
use futures_util::future::{join_all, try_join_all};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called once per manifest entry as it finishes downloading
pub type ProgressHook = Arc<dyn Fn(&RequestKey) + Send + Sync>;

/// Result of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Bucket the manifest was committed to
    pub bucket: String,
    /// Number of entries committed
    pub entries: usize,
}

/// Result of an activation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivateReport {
    /// Current bucket
    pub bucket: String,
    /// Stale buckets removed
    pub deleted: Vec<String>,
    /// Stale buckets that could not be removed
    pub failed: Vec<String>,
}

/// Owns the bucket for one version identifier
pub struct CacheManager {
    version: String,
    origin: Origin,
    manifest: PrecacheManifest,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    progress: Option<ProgressHook>,
}

impl CacheManager {
    pub fn new(
        version: impl Into<String>,
        origin: Origin,
        manifest: PrecacheManifest,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            version: version.into(),
            origin,
            manifest,
            storage,
            network,
            progress: None,
        }
    }

    /// Report each fetched manifest entry to `hook`
    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.progress = Some(hook);
        self
    }

    /// Name of the bucket this manager owns
    pub fn bucket(&self) -> &str {
        &self.version
    }

    pub fn manifest(&self) -> &PrecacheManifest {
        &self.manifest
    }

    /// Fetch every manifest entry, then commit them as one batch.
    ///
    /// The bucket is created by the commit, so a failed install leaves no
    /// bucket behind for the version.
    pub async fn install(&self) -> SwcacheResult<InstallReport> {
        let requests = self.manifest.requests(&self.origin);
        info!(
            "Caching {} assets during install of {}",
            requests.len(),
            self.version
        );

        let entries = try_join_all(requests.iter().map(|r| self.fetch_entry(r))).await?;
        let count = entries.len();

        self.storage.put_all(&self.version, entries).await?;

        Ok(InstallReport {
            bucket: self.version.clone(),
            entries: count,
        })
    }

    async fn fetch_entry(&self, request: &Request) -> SwcacheResult<CachedEntry> {
        let install_error = |reason: String| SwcacheError::InstallFailed {
            url: request.url.clone(),
            reason,
        };

        let response = self
            .network
            .fetch(request)
            .await
            .map_err(|e| install_error(e.to_string()))?;

        if !response.is_success() {
            return Err(install_error(format!("HTTP {}", response.status)));
        }

        let key = request.key();
        debug!("Precached {}", key);
        if let Some(ref hook) = self.progress {
            hook(&key);
        }
        Ok(CachedEntry::new(key, response))
    }

    /// Delete every bucket other than the current one
    pub async fn activate(&self) -> SwcacheResult<ActivateReport> {
        let stale: Vec<String> = self
            .storage
            .keys()
            .await?
            .into_iter()
            .filter(|name| name != &self.version)
            .collect();

        let results = join_all(stale.iter().map(|name| async move {
            info!("Clearing old cache {}", name);
            (name.clone(), self.storage.delete(name).await)
        }))
        .await;

        let mut report = ActivateReport {
            bucket: self.version.clone(),
            ..ActivateReport::default()
        };
        for (name, result) in results {
            match result {
                Ok(_) => report.deleted.push(name),
                Err(e) => {
                    warn!("Failed to delete stale cache {}: {}", name, e);
                    report.failed.push(name);
                }
            }
        }
        Ok(report)
    }

    /// Manifest entries not present in the current bucket
    pub async fn missing(&self) -> SwcacheResult<Vec<RequestKey>> {
        let mut missing = Vec::new();
        for request in self.manifest.requests(&self.origin) {
            let key = request.key();
            if self.storage.get(&self.version, &key).await?.is_none() {
                missing.push(key);
            }
        }
        Ok(missing)
    }

    /// Whether the current bucket exists
    pub async fn is_installed(&self) -> SwcacheResult<bool> {
        self.storage.has(&self.version).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Response;
    use crate::storage::MemoryStorage;
    use crate::test_helpers::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manager(
        version: &str,
        assets: &[&str],
        storage: Arc<MemoryStorage>,
        network: Arc<MockNetwork>,
    ) -> CacheManager {
        CacheManager::new(
            version,
            Origin::parse(ORIGIN).unwrap(),
            PrecacheManifest::new(assets).unwrap(),
            storage,
            network,
        )
    }

    #[tokio::test]
    async fn install_caches_every_manifest_path() {
        let storage = Arc::new(MemoryStorage::new());
        let network = Arc::new(site_network());
        let assets = ["/", "/index.html", "/assets/css/style.css"];
        let manager = manager("site-v1", &assets, storage.clone(), network.clone());

        let report = manager.install().await.unwrap();
        assert_eq!(report.entries, 3);

        // Served from storage with the network gone
        network.go_offline();
        for path in assets {
            let entry = storage
                .get("site-v1", &RequestKey::get(&url(path)))
                .await
                .unwrap();
            assert!(entry.is_some(), "{} not cached", path);
        }
        assert!(manager.missing().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn install_is_atomic_on_http_error() {
        let storage = Arc::new(MemoryStorage::new());
        let network = Arc::new(site_network());
        let manager = manager(
            "site-v1",
            &["/", "/missing.png", "/assets/css/style.css"],
            storage.clone(),
            network,
        );

        let err = manager.install().await.unwrap_err();
        match err {
            SwcacheError::InstallFailed { url: u, reason } => {
                assert_eq!(u, url("/missing.png"));
                assert_eq!(reason, "HTTP 404");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!storage.has("site-v1").await.unwrap());
    }

    #[tokio::test]
    async fn install_is_atomic_on_network_error() {
        let storage = Arc::new(MemoryStorage::new());
        let network = Arc::new(site_network());
        network.go_offline();
        let manager = manager("site-v1", &["/"], storage.clone(), network);

        assert!(matches!(
            manager.install().await,
            Err(SwcacheError::InstallFailed { .. })
        ));
        assert!(!storage.has("site-v1").await.unwrap());
        assert!(!manager.is_installed().await.unwrap());
    }

    #[tokio::test]
    async fn empty_manifest_still_creates_bucket() {
        let storage = Arc::new(MemoryStorage::new());
        let manager = manager("site-v1", &[], storage.clone(), Arc::new(MockNetwork::new()));

        let report = manager.install().await.unwrap();
        assert_eq!(report.entries, 0);
        assert!(manager.is_installed().await.unwrap());
    }

    #[tokio::test]
    async fn reinstall_is_idempotent() {
        let storage = Arc::new(MemoryStorage::new());
        let network = Arc::new(site_network());
        let manager = manager(
            "site-v1",
            &["/", "/assets/js/script.js"],
            storage.clone(),
            network,
        );

        manager.install().await.unwrap();
        let first = storage.entries("site-v1").await.unwrap();
        let first_body = storage
            .get("site-v1", &RequestKey::get(&url("/assets/js/script.js")))
            .await
            .unwrap()
            .unwrap()
            .response;

        manager.install().await.unwrap();
        let second = storage.entries("site-v1").await.unwrap();
        let second_body = storage
            .get("site-v1", &RequestKey::get(&url("/assets/js/script.js")))
            .await
            .unwrap()
            .unwrap()
            .response;

        assert_eq!(first, second);
        assert_eq!(first_body, second_body);
    }

    #[tokio::test]
    async fn install_reports_progress() {
        let storage = Arc::new(MemoryStorage::new());
        let network = Arc::new(site_network());
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = seen.clone();
        let manager = manager("site-v1", &["/", "/index.html"], storage, network)
            .with_progress(Arc::new(move |_: &RequestKey| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        manager.install().await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn activate_removes_all_other_buckets() {
        let storage = Arc::new(MemoryStorage::new());
        storage.open("site-v0").await.unwrap();
        storage
            .put(
                "legacy",
                CachedEntry::new(RequestKey::get(&url("/")), Response::new(200)),
            )
            .await
            .unwrap();
        storage.open("site-v1").await.unwrap();

        let manager = manager("site-v1", &[], storage.clone(), Arc::new(MockNetwork::new()));
        let report = manager.activate().await.unwrap();

        assert_eq!(report.deleted.len(), 2);
        assert!(report.failed.is_empty());
        assert_eq!(storage.keys().await.unwrap(), vec!["site-v1".to_string()]);
    }

    #[tokio::test]
    async fn activate_without_stale_buckets_is_noop() {
        let storage = Arc::new(MemoryStorage::new());
        storage.open("site-v1").await.unwrap();
        let manager = manager("site-v1", &[], storage.clone(), Arc::new(MockNetwork::new()));

        let report = manager.activate().await.unwrap();
        assert!(report.deleted.is_empty());
        assert!(storage.has("site-v1").await.unwrap());
    }
}
