//! Precache manifest

use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{Origin, Request, RequestMode};
use tracing::warn;

/// Ordered list of root-relative paths cached at install time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrecacheManifest {
    paths: Vec<String>,
}

impl PrecacheManifest {
    /// Validate and build a manifest.
    ///
    /// Every entry must be root-relative (`/…`). Duplicates keep their first
    /// position.
    pub fn new<I, S>(paths: I) -> SwcacheResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut manifest = Vec::new();
        for raw in paths {
            let path = raw.as_ref().trim();
            if path.is_empty() {
                return Err(SwcacheError::InvalidManifest {
                    entry: raw.as_ref().to_string(),
                    reason: "empty path".to_string(),
                });
            }
            if !path.starts_with('/') || path.starts_with("//") {
                return Err(SwcacheError::InvalidManifest {
                    entry: path.to_string(),
                    reason: "must be a root-relative path starting with '/'".to_string(),
                });
            }
            if manifest.iter().any(|p: &String| p == path) {
                warn!("Duplicate precache entry ignored: {}", path);
                continue;
            }
            manifest.push(path.to_string());
        }
        Ok(Self { paths: manifest })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Install-time requests, in manifest order
    pub fn requests(&self, origin: &Origin) -> Vec<Request> {
        self.paths
            .iter()
            .map(|path| Request::get(origin.resolve(path)).with_mode(RequestMode::SameOrigin))
            .collect()
    }
}
