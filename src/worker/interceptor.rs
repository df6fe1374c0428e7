//! Fetch interception
//!
//! | Request | Policy |
//! |---------|--------|
//! | Cross-origin | Not intercepted |
//! | Navigation | Network first, offline fallback on failure |
//! | Sub-resource | Cache first, network on miss |
//!
//! Cache writes never delay the response: they are spawned onto the
//! worker's background set and a failed write is logged and dropped.

use crate::config::schema::{FetchConfig, NavigationStore};
use crate::error::SwcacheResult;
use crate::http::{Method, Origin, Request, RequestKey, Response, ResponseType};
use crate::network::Network;
use crate::storage::{CacheStorage, CachedEntry};
use crate::worker::background::BackgroundTasks;
use crate::worker::fallback::OfflineFallback;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Network,
    Cache,
    Fallback,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Cache => write!(f, "cache"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

/// What the worker did with a fetch event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the host performs the request itself
    Passthrough,
    /// The worker answered
    Respond {
        response: Response,
        source: ResponseSource,
    },
}

impl FetchOutcome {
    /// Response, if the worker answered
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Passthrough => None,
            Self::Respond { response, .. } => Some(response),
        }
    }

    /// Source, if the worker answered
    pub fn source(&self) -> Option<ResponseSource> {
        match self {
            Self::Passthrough => None,
            Self::Respond { source, .. } => Some(*source),
        }
    }
}

/// Applies the per-class resolution policy to intercepted requests
pub struct RequestInterceptor {
    bucket: String,
    origin: Origin,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    fallback: OfflineFallback,
    policy: FetchConfig,
    background: Arc<BackgroundTasks>,
}

impl RequestInterceptor {
    pub fn new(
        bucket: impl Into<String>,
        origin: Origin,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        fallback: OfflineFallback,
        policy: FetchConfig,
        background: Arc<BackgroundTasks>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            origin,
            storage,
            network,
            fallback,
            policy,
            background,
        }
    }

    /// Resolve one intercepted request
    pub async fn handle(&self, request: &Request) -> SwcacheResult<FetchOutcome> {
        if !self.origin.is_same_origin(&request.url) {
            debug!("Not intercepting cross-origin request {}", request.key());
            return Ok(FetchOutcome::Passthrough);
        }

        if request.is_navigation() {
            self.handle_navigation(request).await
        } else {
            self.handle_subresource(request).await
        }
    }

    async fn handle_navigation(&self, request: &Request) -> SwcacheResult<FetchOutcome> {
        match self.network.fetch(request).await {
            Ok(response) => {
                if self.should_store_navigation(request, &response) {
                    self.store_detached(request.key(), response.clone());
                }
                Ok(FetchOutcome::Respond {
                    response,
                    source: ResponseSource::Network,
                })
            }
            Err(e) => {
                info!("Navigation to {} failed: {}", request.url, e);
                let response = self.fallback.resolve(request).await?;
                Ok(FetchOutcome::Respond {
                    response,
                    source: ResponseSource::Fallback,
                })
            }
        }
    }

    async fn handle_subresource(&self, request: &Request) -> SwcacheResult<FetchOutcome> {
        let key = request.key();

        if request.method == Method::Get {
            match self.storage.match_any(&key).await {
                Ok(Some(entry)) => {
                    debug!("Cache hit: {}", key);
                    return Ok(FetchOutcome::Respond {
                        response: entry.response,
                        source: ResponseSource::Cache,
                    });
                }
                Ok(None) => debug!("Cache miss: {}", key),
                Err(e) => warn!("Cache lookup for {} failed, using network: {}", key, e),
            }
        }

        let response = self.network.fetch(request).await?;
        if self.should_store_subresource(request, &response) {
            self.store_detached(key, response.clone());
        }

        Ok(FetchOutcome::Respond {
            response,
            source: ResponseSource::Network,
        })
    }

    fn should_store_navigation(&self, request: &Request, response: &Response) -> bool {
        if request.method != Method::Get || response.kind == ResponseType::Error {
            return false;
        }
        match self.policy.store_navigations {
            NavigationStore::Any => true,
            NavigationStore::Ok => response.status == 200,
        }
    }

    fn should_store_subresource(&self, request: &Request, response: &Response) -> bool {
        if request.method != Method::Get {
            return false;
        }
        match response.kind {
            ResponseType::Basic => response.status == 200,
            ResponseType::Opaque => self.policy.cache_opaque,
            ResponseType::Cors | ResponseType::Error => false,
        }
    }

    /// Store a snapshot without holding up the caller
    fn store_detached(&self, key: RequestKey, response: Response) {
        let storage = Arc::clone(&self.storage);
        let bucket = self.bucket.clone();

        self.background.spawn(async move {
            let label = key.to_string();
            match storage.put(&bucket, CachedEntry::new(key, response)).await {
                Ok(()) => debug!("Stored {} in {}", label, bucket),
                Err(e) => warn!("Dropping cache write for {}: {}", label, e),
            }
        });
    }
}
