// src/upstream/client.rs
use super::error::UpstreamError;
use async_trait::async_trait;
use hyper::StatusCode;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;
use url::Url;

/// One outbound GET per call, no retries. Every failure comes back as a
/// typed [`UpstreamError`] instead of escaping as a fault.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// GET `url` and decode a JSON body. Non-2xx answers become
    /// [`UpstreamError::Http`].
    async fn fetch_json(&self, url: &Url, limit: Duration) -> Result<Value, UpstreamError>;

    /// GET `url` and report the status code. Only 2xx is `Ok`.
    async fn probe(&self, url: &Url, limit: Duration) -> Result<StatusCode, UpstreamError>;
}

#[derive(Clone)]
pub struct ReqwestUpstream {
    client: Client,
}

impl ReqwestUpstream {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("distro-proxy/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    async fn get_json(&self, url: &Url) -> Result<Value, UpstreamError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(UpstreamError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            // Kept for the logs only.
            let body = response.json::<Value>().await.ok();
            return Err(UpstreamError::Http { status, body });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(UpstreamError::from_transport)?;

        serde_json::from_slice(&bytes).map_err(|e| {
            UpstreamError::Unexpected(format!("invalid JSON in upstream response: {}", e))
        })
    }
}

#[async_trait]
impl Upstream for ReqwestUpstream {
    async fn fetch_json(&self, url: &Url, limit: Duration) -> Result<Value, UpstreamError> {
        debug!("GET {} (timeout {:?})", url, limit);

        match timeout(limit, self.get_json(url)).await {
            Ok(result) => result,
            Err(_) => Err(UpstreamError::Timeout),
        }
    }

    async fn probe(&self, url: &Url, limit: Duration) -> Result<StatusCode, UpstreamError> {
        debug!("Probing {} (timeout {:?})", url, limit);

        let response = match timeout(limit, self.client.get(url.clone()).send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(UpstreamError::from_transport(e)),
            Err(_) => return Err(UpstreamError::Timeout),
        };

        let status = response.status();
        if status.is_success() {
            Ok(status)
        } else {
            Err(UpstreamError::Http { status, body: None })
        }
    }
}
