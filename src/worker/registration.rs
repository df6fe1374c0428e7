//! Worker registration
//!
//! Tracks which worker controls the origin and swaps in new versions.
//! Subscribers are told about every controller change, the way a page
//! reloads itself when a new worker takes over.

use crate::error::SwcacheResult;
use crate::http::Request;
use crate::worker::interceptor::FetchOutcome;
use crate::worker::service_worker::ServiceWorker;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{info, warn};

pub struct Registration {
    active: RwLock<Option<Arc<ServiceWorker>>>,
    controller: watch::Sender<Option<String>>,
}

impl Default for Registration {
    fn default() -> Self {
        Self::new()
    }
}

impl Registration {
    pub fn new() -> Self {
        let (controller, _) = watch::channel(None);
        Self {
            active: RwLock::new(None),
            controller,
        }
    }

    /// Receive the controlling version each time it changes
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.controller.subscribe()
    }

    /// Worker currently controlling the origin
    pub async fn active(&self) -> Option<Arc<ServiceWorker>> {
        self.active.read().await.clone()
    }

    pub fn controller_version(&self) -> Option<String> {
        self.controller.borrow().clone()
    }

    /// Install `worker` and hand it control.
    ///
    /// If install fails the previous controller stays in place. Registering
    /// the version that is already active returns the existing worker.
    pub async fn register(&self, worker: ServiceWorker) -> SwcacheResult<Arc<ServiceWorker>> {
        let mut active = self.active.write().await;

        if let Some(current) = active.as_ref() {
            if current.version() == worker.version() {
                info!("Worker {} already active", current.version());
                return Ok(Arc::clone(current));
            }
        }

        worker.install().await?;

        if let Some(previous) = active.take() {
            info!(
                "Worker {} replaced by {}",
                previous.version(),
                worker.version()
            );
            previous.mark_redundant();
        }

        if let Err(e) = worker.activate().await {
            warn!("No worker controls the origin: {}", e);
            self.controller.send_replace(None);
            return Err(e);
        }

        let worker = Arc::new(worker);
        *active = Some(Arc::clone(&worker));
        self.controller
            .send_replace(Some(worker.version().to_string()));
        Ok(worker)
    }

    /// Route a fetch to the controlling worker
    pub async fn fetch(&self, request: &Request) -> SwcacheResult<FetchOutcome> {
        match self.active().await {
            Some(worker) => worker.fetch(request).await,
            None => Ok(FetchOutcome::Passthrough),
        }
    }
}
