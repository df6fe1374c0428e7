//! Error types for swcache
//!
//! All modules use `SwcacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for swcache operations
pub type SwcacheResult<T> = Result<T, SwcacheError>;

/// All errors that can occur in swcache
#[derive(Error, Debug)]
pub enum SwcacheError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Request model errors
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid precache entry '{entry}': {reason}")]
    InvalidManifest { entry: String, reason: String },

    // Network errors
    #[error("Network request failed for {url}: {reason}")]
    Network { url: String, reason: String },

    // Lifecycle errors
    #[error("Install failed for {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("Worker {version} cannot move from {from} to {to}")]
    InvalidTransition {
        version: String,
        from: String,
        to: String,
    },

    #[error("Worker {0} is not installed")]
    NotInstalled(String),

    #[error("Offline fallback exhausted for {url}: no offline page or home page cached")]
    FallbackExhausted { url: String },

    // Storage errors
    #[error("Cache bucket not found: {0}")]
    BucketNotFound(String),

    #[error("Cache storage error: {0}")]
    Storage(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl SwcacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network failure error
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error means the network could not be reached at all
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NotInstalled(_) => Some("Run: swcache install"),
            Self::FallbackExhausted { .. } => {
                Some("Add the offline page or home page to [precache] assets and reinstall")
            }
            Self::InstallFailed { .. } => {
                Some("Check that every [precache] asset is reachable and returns 2xx")
            }
            Self::ConfigInvalid { .. } => Some("Run: swcache config init --force"),
            _ => None,
        }
    }
}
