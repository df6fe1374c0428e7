//! Offline fallback for failed navigations

use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{Origin, Request, RequestKey, Response};
use crate::storage::CacheStorage;
use std::sync::Arc;
use tracing::{info, warn};

/// Resolves a navigation that could not reach the network.
///
/// Tries the cached offline page, then the cached home page. When neither
/// is cached the navigation fails for good.
pub struct OfflineFallback {
    offline_url: String,
    home_url: String,
    storage: Arc<dyn CacheStorage>,
}

impl OfflineFallback {
    pub fn new(
        origin: &Origin,
        offline_path: &str,
        home_path: &str,
        storage: Arc<dyn CacheStorage>,
    ) -> Self {
        Self {
            offline_url: origin.resolve(offline_path),
            home_url: origin.resolve(home_path),
            storage,
        }
    }

    /// Fallback response for a failed navigation to `request`
    pub async fn resolve(&self, request: &Request) -> SwcacheResult<Response> {
        for candidate in [&self.offline_url, &self.home_url] {
            match self.storage.match_any(&RequestKey::get(candidate)).await {
                Ok(Some(entry)) => {
                    info!("Serving {} in place of {}", candidate, request.url);
                    return Ok(entry.response);
                }
                Ok(None) => {}
                Err(e) => warn!("Cache lookup for {} failed: {}", candidate, e),
            }
        }

        Err(SwcacheError::FallbackExhausted {
            url: request.url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{CachedEntry, MemoryStorage};
    use crate::test_helpers::*;

    async fn storage_with(paths: &[&str]) -> Arc<MemoryStorage> {
        let storage = Arc::new(MemoryStorage::new());
        for path in paths {
            storage
                .put(
                    "site-v1",
                    CachedEntry::new(RequestKey::get(&url(path)), html(path)),
                )
                .await
                .unwrap();
        }
        storage
    }

    fn fallback(storage: Arc<MemoryStorage>) -> OfflineFallback {
        OfflineFallback::new(
            &Origin::parse(ORIGIN).unwrap(),
            "/offline.html",
            "/index.html",
            storage,
        )
    }

    #[tokio::test]
    async fn prefers_offline_page() {
        let storage = storage_with(&["/offline.html", "/index.html"]).await;
        let response = fallback(storage)
            .resolve(&Request::navigate(url("/about")))
            .await
            .unwrap();
        assert_eq!(response.body, b"/offline.html");
    }

    #[tokio::test]
    async fn falls_back_to_home_page() {
        let storage = storage_with(&["/index.html"]).await;
        let response = fallback(storage)
            .resolve(&Request::navigate(url("/about")))
            .await
            .unwrap();
        assert_eq!(response.body, b"/index.html");
    }

    #[tokio::test]
    async fn exhausted_without_either_page() {
        let storage = storage_with(&["/assets/css/style.css"]).await;
        let err = fallback(storage)
            .resolve(&Request::navigate(url("/about")))
            .await
            .unwrap_err();
        assert!(matches!(err, SwcacheError::FallbackExhausted { ref url } if url.ends_with("/about")));
    }
}
