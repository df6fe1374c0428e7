//! Service worker runtime
//!
//! - `state`: lifecycle state machine
//! - `manifest`: precache manifest
//! - `cache_manager`: install-time precache and activation-time purge
//! - `interceptor`: fetch resolution policy
//! - `fallback`: offline fallback chain for navigations
//! - `background`: detached cache writes
//! - `events`, `notify`: event model and push notifications
//! - `service_worker`, `registration`: the worker and its controller slot

pub mod background;
pub mod cache_manager;
pub mod events;
pub mod fallback;
pub mod interceptor;
pub mod manifest;
pub mod notify;
pub mod registration;
pub mod service_worker;
pub mod state;

pub use cache_manager::{ActivateReport, InstallReport, ProgressHook};
pub use events::{Event, EventOutcome};
pub use interceptor::{FetchOutcome, ResponseSource};
pub use manifest::PrecacheManifest;
pub use notify::{Notification, Notifier, TracingNotifier};
pub use registration::Registration;
pub use service_worker::ServiceWorker;
pub use state::WorkerState;
