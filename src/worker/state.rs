//! Worker lifecycle state machine
//!
//! | From | To |
//! |------|----|
//! | parsed | installing |
//! | installing | installed |
//! | installed | activating |
//! | activating | activated |
//! | any but redundant | redundant |
//!
//! A worker instance is bound to one version identifier, so it can never
//! re-enter `installing`; a new version means a new instance.

use crate::error::{SwcacheError, SwcacheResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;
use tracing::debug;

/// Worker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl WorkerState {
    /// Whether `self → next` is a legal transition
    pub fn can_transition_to(self, next: WorkerState) -> bool {
        use WorkerState::*;
        match (self, next) {
            (Redundant, _) => false,
            (_, Redundant) => true,
            (Parsed, Installing)
            | (Installing, Installed)
            | (Installed, Activating)
            | (Activating, Activated) => true,
            _ => false,
        }
    }

    /// No further transitions possible
    pub fn is_terminal(self) -> bool {
        self == Self::Redundant
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Parsed => "parsed",
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
            Self::Redundant => "redundant",
        };
        f.write_str(name)
    }
}

/// Thread-safe holder for a worker's current state
#[derive(Debug)]
pub struct Lifecycle {
    version: String,
    state: Mutex<WorkerState>,
}

impl Lifecycle {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            state: Mutex::new(WorkerState::Parsed),
        }
    }

    /// Current state
    pub fn current(&self) -> WorkerState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Move to `next`, returning the previous state
    pub fn transition(&self, next: WorkerState) -> SwcacheResult<WorkerState> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let previous = *state;

        if !previous.can_transition_to(next) {
            return Err(SwcacheError::InvalidTransition {
                version: self.version.clone(),
                from: previous.to_string(),
                to: next.to_string(),
            });
        }

        *state = next;
        debug!("Worker {}: {} -> {}", self.version, previous, next);
        Ok(previous)
    }

    /// Jump straight to `installed` or `activated` for a worker whose
    /// earlier lifecycle steps ran in another process
    pub fn restore(&self, to: WorkerState) -> SwcacheResult<()> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let restorable = matches!(to, WorkerState::Installed | WorkerState::Activated);
        if *state != WorkerState::Parsed || !restorable {
            return Err(SwcacheError::InvalidTransition {
                version: self.version.clone(),
                from: state.to_string(),
                to: to.to_string(),
            });
        }
        *state = to;
        debug!("Worker {}: restored as {}", self.version, to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let lifecycle = Lifecycle::new("v1");
        for next in [
            WorkerState::Installing,
            WorkerState::Installed,
            WorkerState::Activating,
            WorkerState::Activated,
        ] {
            lifecycle.transition(next).unwrap();
        }
        assert_eq!(lifecycle.current(), WorkerState::Activated);
    }

    #[test]
    fn cannot_reenter_installing() {
        let lifecycle = Lifecycle::new("v1");
        lifecycle.transition(WorkerState::Installing).unwrap();
        lifecycle.transition(WorkerState::Installed).unwrap();

        let err = lifecycle.transition(WorkerState::Installing).unwrap_err();
        assert!(err.to_string().contains("installed to installing"));
    }

    #[test]
    fn cannot_skip_install() {
        let lifecycle = Lifecycle::new("v1");
        assert!(lifecycle.transition(WorkerState::Activating).is_err());
        assert_eq!(lifecycle.current(), WorkerState::Parsed);
    }

    #[test]
    fn redundant_is_terminal() {
        let lifecycle = Lifecycle::new("v1");
        lifecycle.transition(WorkerState::Installing).unwrap();
        lifecycle.transition(WorkerState::Redundant).unwrap();

        assert!(lifecycle.current().is_terminal());
        assert!(lifecycle.transition(WorkerState::Installed).is_err());
        assert!(lifecycle.transition(WorkerState::Redundant).is_err());
    }

    #[test]
    fn restore_only_from_parsed() {
        let lifecycle = Lifecycle::new("v1");
        lifecycle.restore(WorkerState::Activated).unwrap();
        assert_eq!(lifecycle.current(), WorkerState::Activated);
        assert!(lifecycle.restore(WorkerState::Activated).is_err());

        let lifecycle = Lifecycle::new("v2");
        assert!(lifecycle.restore(WorkerState::Installing).is_err());
        lifecycle.restore(WorkerState::Installed).unwrap();
        lifecycle.transition(WorkerState::Activating).unwrap();
    }

    #[test]
    fn state_serializes_lowercase() {
        let json = serde_json::to_string(&WorkerState::Activating).unwrap();
        assert_eq!(json, "\"activating\"");
    }
}
