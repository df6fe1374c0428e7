//! Configuration schema for swcache
//!
//! Configuration is stored at `~/.config/swcache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Worker identity
    pub worker: WorkerConfig,

    /// Precache manifest
    pub precache: PrecacheConfig,

    /// Fetch interception policy
    pub fetch: FetchConfig,

    /// Network client settings
    pub network: NetworkConfig,

    /// Cache storage location
    pub storage: StorageConfig,

    /// Background sync
    pub sync: SyncConfig,

    /// Push notifications
    pub push: PushConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Worker identity and fallback pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Version identifier; doubles as the cache bucket name
    pub version: String,

    /// Origin the worker is served from
    pub origin: String,

    /// Page served when a navigation fails offline
    pub offline_url: String,

    /// Second-choice fallback page
    pub home_url: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            version: "7fdesign-v1".to_string(),
            origin: "http://localhost:8080".to_string(),
            offline_url: "/offline.html".to_string(),
            home_url: "/index.html".to_string(),
        }
    }
}

/// Paths fetched and stored at install time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecacheConfig {
    /// Root-relative asset paths, in fetch order
    pub assets: Vec<String>,
}

impl Default for PrecacheConfig {
    fn default() -> Self {
        Self {
            assets: [
                "/",
                "/index.html",
                "/assets/css/style.css",
                "/assets/css/responsive.css",
                "/assets/js/script.js",
                "/assets/images/logo.jpg",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Which navigation responses get stored
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationStore {
    /// Every response the network returns
    #[default]
    Any,
    /// Only `200 OK`
    Ok,
}

/// Fetch interception policy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Navigation responses to store in the current bucket
    pub store_navigations: NavigationStore,

    /// Store opaque sub-resource responses (status cannot be checked)
    pub cache_opaque: bool,
}

/// Network client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("swcache/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Cache storage settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage directory (defaults to the state dir)
    pub dir: Option<PathBuf>,
}

/// Background sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Sync tags the worker recognizes
    pub tags: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tags: vec!["sync-form-data".to_string()],
        }
    }
}

/// Push notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PushConfig {
    /// Notification title
    pub title: String,

    /// Notification icon path
    pub icon: String,

    /// Badge icon path
    pub badge: String,

    /// Vibration pattern in milliseconds
    pub vibrate: Vec<u32>,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            title: "7F Design".to_string(),
            icon: "/assets/images/logo.jpg".to_string(),
            badge: "/assets/images/logo.jpg".to_string(),
            vibrate: vec![100, 50, 100],
        }
    }
}
