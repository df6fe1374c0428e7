//! CLI command implementations

pub mod activate;
pub mod cache;
pub mod config;
pub mod fetch;
pub mod install;
pub mod status;

pub use activate::execute as activate;
pub use cache::execute as cache;
pub use config::execute as config;
pub use fetch::execute as fetch;
pub use install::execute as install;
pub use status::execute as status;

use crate::config::{Config, ConfigManager};
use crate::error::SwcacheResult;
use crate::http::Origin;
use crate::network::{HttpNetwork, Network, OfflineNetwork};
use crate::storage::{CacheStorage, DiskStorage};
use crate::worker::ServiceWorker;
use std::sync::Arc;
use tracing::debug;

/// Disk storage at the configured location
pub(crate) fn open_storage(config: &Config) -> Arc<DiskStorage> {
    let dir = ConfigManager::storage_dir(config);
    debug!("Cache storage: {}", dir.display());
    Arc::new(DiskStorage::new(dir))
}

/// Worker for the configured version over disk storage
pub(crate) fn build_worker(
    config: &Config,
    storage: Arc<dyn CacheStorage>,
    offline: bool,
) -> SwcacheResult<ServiceWorker> {
    let network: Arc<dyn Network> = if offline {
        Arc::new(OfflineNetwork)
    } else {
        let origin = Origin::parse(&config.worker.origin)?;
        Arc::new(HttpNetwork::new(origin, &config.network))
    };
    debug!("Network: {}", network.name());
    ServiceWorker::from_config(config, storage, network)
}
