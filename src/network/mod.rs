//! Network access for the worker
//!
//! The worker never talks to the network directly; it goes through the
//! `Network` trait so hosts can plug in a real HTTP client, a simulated
//! offline link, or a test double.

mod http;
mod offline;

pub use self::http::HttpNetwork;
pub use offline::OfflineNetwork;

use crate::error::SwcacheResult;
use crate::http::{Request, Response};
use async_trait::async_trait;

/// Abstract network interface
///
/// `Ok` carries whatever the server answered, including 4xx/5xx.
/// `Err` means no response was obtained at all (DNS, refused, timeout,
/// offline).
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform a request
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response>;

    /// Human-readable backend name
    fn name(&self) -> &'static str;
}
