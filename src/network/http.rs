//! HTTP network backed by ureq
//!
//! ureq is blocking, so each request runs on tokio's blocking pool.

use crate::config::schema::NetworkConfig;
use crate::error::{SwcacheError, SwcacheResult};
use crate::http::{Method, Origin, Request, RequestMode, Response, ResponseType};
use crate::network::Network;
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;
use ureq::ResponseExt;

/// Real network access
#[derive(Clone)]
pub struct HttpNetwork {
    agent: ureq::Agent,
    origin: Origin,
    user_agent: String,
}

impl HttpNetwork {
    /// Create a client for a worker served from `origin`
    pub fn new(origin: Origin, config: &NetworkConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            origin,
            user_agent: config.user_agent.clone(),
        }
    }

    /// Classify a response the way a browser exposes it to the worker
    fn response_type(origin: &Origin, mode: RequestMode, final_url: &str) -> ResponseType {
        if mode == RequestMode::Navigate || origin.is_same_origin(final_url) {
            return ResponseType::Basic;
        }
        match mode {
            RequestMode::Cors => ResponseType::Cors,
            _ => ResponseType::Opaque,
        }
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
    user_agent: &str,
) -> ureq::RequestBuilder<B> {
    builder = builder.header("user-agent", user_agent);
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn call_blocking(
    agent: &ureq::Agent,
    request: &Request,
    user_agent: &str,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    let url = request.url.as_str();
    let headers = request.headers.as_slice();
    let body = request.body.as_deref().unwrap_or_default();

    match request.method {
        Method::Get => with_headers(agent.get(url), headers, user_agent).call(),
        Method::Head => with_headers(agent.head(url), headers, user_agent).call(),
        Method::Delete => with_headers(agent.delete(url), headers, user_agent).call(),
        Method::Options => with_headers(agent.options(url), headers, user_agent).call(),
        Method::Post => with_headers(agent.post(url), headers, user_agent).send(body),
        Method::Put => with_headers(agent.put(url), headers, user_agent).send(body),
        Method::Patch => with_headers(agent.patch(url), headers, user_agent).send(body),
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> SwcacheResult<Response> {
        let agent = self.agent.clone();
        let origin = self.origin.clone();
        let user_agent = self.user_agent.clone();
        let request = request.clone();

        tokio::task::spawn_blocking(move || {
            debug!("Network fetch: {}", request.key());

            let mut response = call_blocking(&agent, &request, &user_agent)
                .map_err(|e| SwcacheError::network(&request.url, e.to_string()))?;

            let status = response.status().as_u16();
            let final_url = response.get_uri().to_string();
            let headers = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), v.to_string()))
                })
                .collect();

            let body = response
                .body_mut()
                .read_to_vec()
                .map_err(|e| SwcacheError::network(&request.url, e.to_string()))?;

            Ok(Response {
                status,
                headers,
                body,
                kind: HttpNetwork::response_type(&origin, request.mode, &final_url),
                url: Some(final_url),
            })
        })
        .await
        .map_err(|e| SwcacheError::Internal(format!("Network task failed: {}", e)))?
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Origin {
        Origin::parse("https://example.com").unwrap()
    }

    #[test]
    fn same_origin_is_basic() {
        let kind = HttpNetwork::response_type(
            &origin(),
            RequestMode::NoCors,
            "https://example.com/assets/js/script.js",
        );
        assert_eq!(kind, ResponseType::Basic);
    }

    #[test]
    fn cross_origin_redirect_no_cors_is_opaque() {
        let kind =
            HttpNetwork::response_type(&origin(), RequestMode::NoCors, "https://cdn.net/x.js");
        assert_eq!(kind, ResponseType::Opaque);
    }

    #[test]
    fn cross_origin_cors_is_cors() {
        let kind = HttpNetwork::response_type(&origin(), RequestMode::Cors, "https://api.net/");
        assert_eq!(kind, ResponseType::Cors);
    }

    #[test]
    fn navigation_is_always_basic() {
        let kind =
            HttpNetwork::response_type(&origin(), RequestMode::Navigate, "https://login.net/");
        assert_eq!(kind, ResponseType::Basic);
    }

    #[tokio::test]
    async fn unreachable_host_is_network_error() {
        let network = HttpNetwork::new(
            Origin::parse("http://127.0.0.1:9").unwrap(),
            &NetworkConfig {
                timeout_secs: 2,
                ..NetworkConfig::default()
            },
        );
        let err = network
            .fetch(&Request::get("http://127.0.0.1:9/index.html"))
            .await
            .unwrap_err();
        assert!(err.is_offline());
    }
}
