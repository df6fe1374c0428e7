//! The service worker: one instance per deployed version
//!
//! Owns the lifecycle state, the version's cache bucket and the fetch
//! interceptor, and routes [`Event`]s to them. Lifecycle events must arrive
//! in order (`install` before `activate`); fetches reaching a worker that is
//! not yet activated are not intercepted.

use crate::config::schema::PushConfig;
use crate::config::Config;
use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{Origin, Request, RequestKey};
use crate::network::Network;
use crate::storage::CacheStorage;
use crate::worker::background::BackgroundTasks;
use crate::worker::cache_manager::{ActivateReport, CacheManager, InstallReport, ProgressHook};
use crate::worker::events::{Event, EventOutcome};
use crate::worker::fallback::OfflineFallback;
use crate::worker::interceptor::{FetchOutcome, RequestInterceptor};
use crate::worker::manifest::PrecacheManifest;
use crate::worker::notify::{Notification, Notifier, TracingNotifier};
use crate::worker::state::{Lifecycle, WorkerState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct ServiceWorker {
    version: String,
    origin: Origin,
    lifecycle: Lifecycle,
    cache: CacheManager,
    interceptor: RequestInterceptor,
    notifier: Arc<dyn Notifier>,
    sync_tags: Vec<String>,
    push: PushConfig,
    background: Arc<BackgroundTasks>,
    skip_waiting: AtomicBool,
    controlling: AtomicBool,
}

impl ServiceWorker {
    /// Build a worker for the configured version
    pub fn from_config(
        config: &Config,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> SwcacheResult<Self> {
        let version = config.worker.version.trim().to_string();
        if version.is_empty() {
            return Err(SwcacheError::User(
                "worker.version must not be empty".to_string(),
            ));
        }

        let origin = Origin::parse(&config.worker.origin)?;
        let manifest = PrecacheManifest::new(&config.precache.assets)?;
        // Fallback pages follow the same rules as manifest entries
        PrecacheManifest::new([&config.worker.offline_url, &config.worker.home_url])?;

        let background = Arc::new(BackgroundTasks::new());
        let fallback = OfflineFallback::new(
            &origin,
            &config.worker.offline_url,
            &config.worker.home_url,
            Arc::clone(&storage),
        );
        let interceptor = RequestInterceptor::new(
            version.clone(),
            origin.clone(),
            Arc::clone(&storage),
            Arc::clone(&network),
            fallback,
            config.fetch.clone(),
            Arc::clone(&background),
        );
        let cache = CacheManager::new(version.clone(), origin.clone(), manifest, storage, network);

        Ok(Self {
            lifecycle: Lifecycle::new(version.clone()),
            version,
            origin,
            cache,
            interceptor,
            notifier: Arc::new(TracingNotifier),
            sync_tags: config.sync.tags.clone(),
            push: config.push.clone(),
            background,
            skip_waiting: AtomicBool::new(false),
            controlling: AtomicBool::new(false),
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Report precache downloads to `hook` during install
    pub fn with_progress(mut self, hook: ProgressHook) -> Self {
        self.cache = self.cache.with_progress(hook);
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    pub fn state(&self) -> WorkerState {
        self.lifecycle.current()
    }

    pub fn manifest(&self) -> &PrecacheManifest {
        self.cache.manifest()
    }

    /// Whether this worker currently intercepts fetches
    pub fn is_controlling(&self) -> bool {
        self.controlling.load(Ordering::SeqCst)
    }

    /// Set once install succeeds: the worker asks to activate without
    /// waiting for older pages to close
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Route an event to its handler and wait until the event is complete.
    ///
    /// A fetch event completes once its detached cache writes have finished;
    /// call [`ServiceWorker::fetch`] directly to get the response first.
    pub async fn dispatch(&self, event: Event) -> SwcacheResult<EventOutcome> {
        debug!("Worker {} received {} event", self.version, event.name());
        match event {
            Event::Install => self.install().await.map(EventOutcome::Installed),
            Event::Activate => self.activate().await.map(EventOutcome::Activated),
            Event::Fetch(request) => {
                let outcome = self.fetch(&request).await;
                self.settle().await;
                outcome.map(EventOutcome::Fetch)
            }
            Event::Sync { tag } => self.sync(&tag).await.map(|_| EventOutcome::Handled),
            Event::Push { data } => self
                .push(data.as_deref())
                .await
                .map(|_| EventOutcome::Handled),
        }
    }

    /// Precache the manifest. Any failure leaves the worker redundant.
    pub async fn install(&self) -> SwcacheResult<InstallReport> {
        self.lifecycle.transition(WorkerState::Installing)?;

        match self.cache.install().await {
            Ok(report) => {
                self.lifecycle.transition(WorkerState::Installed)?;
                self.skip_waiting.store(true, Ordering::SeqCst);
                info!(
                    "Installed {} ({} entries cached)",
                    self.version, report.entries
                );
                Ok(report)
            }
            Err(e) => {
                warn!("Install of {} failed: {}", self.version, e);
                self.mark_redundant();
                Err(e)
            }
        }
    }

    /// Purge stale buckets and take control of fetches
    pub async fn activate(&self) -> SwcacheResult<ActivateReport> {
        self.lifecycle.transition(WorkerState::Activating)?;

        match self.cache.activate().await {
            Ok(report) => {
                self.lifecycle.transition(WorkerState::Activated)?;
                self.controlling.store(true, Ordering::SeqCst);
                info!(
                    "Activated {} ({} stale caches removed)",
                    self.version,
                    report.deleted.len()
                );
                Ok(report)
            }
            Err(e) => {
                warn!("Activation of {} failed: {}", self.version, e);
                self.mark_redundant();
                Err(e)
            }
        }
    }

    /// Handle a fetch event
    pub async fn fetch(&self, request: &Request) -> SwcacheResult<FetchOutcome> {
        if self.state() != WorkerState::Activated {
            debug!(
                "Worker {} is {}; not intercepting {}",
                self.version,
                self.state(),
                request.key()
            );
            return Ok(FetchOutcome::Passthrough);
        }
        self.interceptor.handle(request).await
    }

    /// Handle a background sync event
    pub async fn sync(&self, tag: &str) -> SwcacheResult<()> {
        if self.sync_tags.iter().any(|t| t == tag) {
            info!("Background sync for {}", tag);
        } else {
            debug!("Ignoring unknown sync tag {}", tag);
        }
        Ok(())
    }

    /// Handle a push event by showing a notification
    pub async fn push(&self, data: Option<&[u8]>) -> SwcacheResult<()> {
        let notification = Notification::from_push(&self.push, data);
        self.notifier.show(&notification).await
    }

    /// Wait for every detached cache write to finish
    pub async fn settle(&self) -> usize {
        self.background.settle().await
    }

    /// Pick up a version installed and activated by an earlier process
    pub async fn resume(&self) -> SwcacheResult<()> {
        self.restore(WorkerState::Activated).await?;
        self.controlling.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Pick up a version installed by an earlier process, ready to activate
    pub async fn resume_installed(&self) -> SwcacheResult<()> {
        self.restore(WorkerState::Installed).await
    }

    async fn restore(&self, state: WorkerState) -> SwcacheResult<()> {
        if !self.cache.is_installed().await? {
            return Err(SwcacheError::NotInstalled(self.version.clone()));
        }
        self.lifecycle.restore(state)?;
        debug!("Resumed worker {} as {}", self.version, state);
        Ok(())
    }

    /// Retire the worker. No-op once already redundant.
    pub fn mark_redundant(&self) {
        self.controlling.store(false, Ordering::SeqCst);
        if !self.state().is_terminal() {
            if let Err(e) = self.lifecycle.transition(WorkerState::Redundant) {
                debug!("{}", e);
            }
        }
    }

    /// Manifest entries missing from this version's bucket
    pub async fn missing(&self) -> SwcacheResult<Vec<RequestKey>> {
        self.cache.missing().await
    }

    pub async fn is_installed(&self) -> SwcacheResult<bool> {
        self.cache.is_installed().await
    }
}
