//! A network link that is always down

use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{Request, Response};
use crate::network::Network;
use async_trait::async_trait;
use tracing::debug;

/// Network that fails every request, for exercising offline behavior
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNetwork;

#[async_trait]
impl Network for OfflineNetwork {
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response> {
        debug!("Offline: refusing {}", request.key());
        Err(SwcacheError::network(&request.url, "network is offline"))
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
