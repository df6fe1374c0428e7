//! Shared test utilities for the swcache test suite.
//!
//! Provides a scripted `MockNetwork` that records every request it sees, plus
//! builders for a worker wired to in-memory storage.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let network = Arc::new(MockNetwork::new().route(ORIGIN, "/", html("home")));
//! let storage = Arc::new(MemoryStorage::new());
//! let worker = worker(&config(&["/"]), storage, network.clone());
//!
//! worker.dispatch(Event::Install).await.unwrap();
//! assert_eq!(network.call_count(), 1);
//! ```

use crate::config::Config;
use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{Request, RequestKey, Response};
use crate::network::Network;
use crate::storage::CacheStorage;
use crate::worker::ServiceWorker;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Origin every test worker is served from
pub const ORIGIN: &str = "https://example.com";

// =========================================================================
// Network double
// =========================================================================

/// Network that answers from a route table and records calls.
///
/// Unrouted URLs answer `404`. `go_offline` makes every call fail.
#[derive(Debug, Default)]
pub struct MockNetwork {
    routes: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    calls: Mutex<Vec<RequestKey>>,
}

impl MockNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route for `origin + path` (builder form)
    pub fn route(self, origin: &str, path: &str, response: Response) -> Self {
        self.set_route(&format!("{}{}", origin, path), response);
        self
    }

    /// Add or replace a route for an absolute URL
    pub fn set_route(&self, url: &str, response: Response) {
        self.routes
            .lock()
            .unwrap()
            .insert(url.to_string(), response.with_url(url));
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response> {
        self.calls.lock().unwrap().push(request.key());

        if self.offline.load(Ordering::SeqCst) {
            return Err(SwcacheError::network(&request.url, "mock offline"));
        }

        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(&request.url)
            .cloned()
            .unwrap_or_else(|| Response::new(404).with_url(&request.url)))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

// =========================================================================
// Fixtures
// =========================================================================

/// A 200 HTML response
pub fn html(body: &str) -> Response {
    Response::new(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(body.as_bytes().to_vec())
}

/// A 200 response with an arbitrary content type
pub fn asset(content_type: &str, body: &[u8]) -> Response {
    Response::new(200)
        .with_header("content-type", content_type)
        .with_body(body.to_vec())
}

/// Absolute URL on the test origin
pub fn url(path: &str) -> String {
    format!("{}{}", ORIGIN, path)
}

/// Default config pointed at the test origin with the given manifest
pub fn config(assets: &[&str]) -> Config {
    let mut config = Config::default();
    config.worker.origin = ORIGIN.to_string();
    config.worker.version = "site-v1".to_string();
    config.precache.assets = assets.iter().map(|s| s.to_string()).collect();
    config
}

/// Same as [`config`] with a different version identifier
pub fn config_version(version: &str, assets: &[&str]) -> Config {
    let mut config = config(assets);
    config.worker.version = version.to_string();
    config
}

/// A network serving the usual marketing-site assets
pub fn site_network() -> MockNetwork {
    MockNetwork::new()
        .route(ORIGIN, "/", html("<h1>home</h1>"))
        .route(ORIGIN, "/index.html", html("<h1>home</h1>"))
        .route(ORIGIN, "/offline.html", html("<h1>offline</h1>"))
        .route(ORIGIN, "/assets/css/style.css", asset("text/css", b"body{}"))
        .route(
            ORIGIN,
            "/assets/js/script.js",
            asset("application/javascript", b"console.log(1)"),
        )
}

/// Build a worker over the given storage and network
pub fn worker(
    config: &Config,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
) -> ServiceWorker {
    ServiceWorker::from_config(config, storage, network).unwrap()
}
