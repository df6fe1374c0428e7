//! Events delivered to a worker

use crate::http::Request;
use crate::worker::cache_manager::{ActivateReport, InstallReport};
use crate::worker::interceptor::FetchOutcome;

/// A lifecycle, fetch, or messaging event
#[derive(Debug, Clone)]
pub enum Event {
    Install,
    Activate,
    Fetch(Request),
    Sync { tag: String },
    Push { data: Option<Vec<u8>> },
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Fetch(_) => "fetch",
            Self::Sync { .. } => "sync",
            Self::Push { .. } => "push",
        }
    }
}

/// Result of dispatching an [`Event`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivateReport),
    Fetch(FetchOutcome),
    /// Sync and push have no result beyond their side effects
    Handled,
}
