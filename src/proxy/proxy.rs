// ────────────────────────────────
// src/proxy/proxy.rs
// Forwards client operations to the WordPress REST API and normalizes
// whatever comes back into an ApiResponse.
// ────────────────────────────────

use std::sync::Arc;
use std::time::Duration;

use hyper::StatusCode;
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

use super::operation::OperationRequest;
use super::response::{messages, ApiResponse};
use crate::config::Config;
use crate::metrics::MetricsCollector;
use crate::monitor::SiteMonitor;
use crate::upstream::{Upstream, UpstreamError};

pub struct DistroProxy {
    base_url: Url,
    content_timeout: Duration,
    upstream: Arc<dyn Upstream>,
    monitor: SiteMonitor,
    metrics: Option<Arc<MetricsCollector>>,
}

/// `{base}/posts`, with `search` attached only when non-empty.
pub fn posts_url(base: &Url, search: &str) -> Result<Url, UpstreamError> {
    let mut url = join_segments(base, &["posts"])?;
    if !search.is_empty() {
        url.query_pairs_mut().append_pair("search", search);
    }
    Ok(url)
}

/// `{base}/posts/{post_id}`.
pub fn post_url(base: &Url, post_id: u64) -> Result<Url, UpstreamError> {
    join_segments(base, &["posts", &post_id.to_string()])
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, UpstreamError> {
    let mut url = base.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| UpstreamError::Unexpected(format!("'{}' cannot be a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

impl DistroProxy {
    pub fn new(
        config: &Config,
        upstream: Arc<dyn Upstream>,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        let monitor = SiteMonitor::new(
            config.monitor_site.clone(),
            config.monitor_site_url.clone(),
            config.monitor_timeout,
            upstream.clone(),
            metrics.clone(),
        );

        Self {
            base_url: config.wordpress_api_base_url.clone(),
            content_timeout: config.content_timeout,
            upstream,
            monitor,
            metrics,
        }
    }

    pub async fn execute(&self, operation: OperationRequest) -> ApiResponse {
        match operation {
            OperationRequest::ListPosts { search } => self.list_posts(&search).await,
            OperationRequest::GetPost { post_id } => self.get_post(post_id).await,
            OperationRequest::MonitorSite => self.monitor_site().await,
        }
    }

    pub async fn list_posts(&self, search: &str) -> ApiResponse {
        let result = match posts_url(&self.base_url, search) {
            Ok(url) => self.upstream.fetch_json(&url, self.content_timeout).await,
            Err(e) => Err(e),
        };
        self.record("list_posts", &result);

        match result {
            Ok(payload) => {
                debug!("Listed posts (search: {:?})", search);
                ApiResponse::ok(payload)
            }
            Err(e) => self.failure_response("list_posts", None, e),
        }
    }

    pub async fn get_post(&self, post_id: u64) -> ApiResponse {
        let result = match post_url(&self.base_url, post_id) {
            Ok(url) => self.upstream.fetch_json(&url, self.content_timeout).await,
            Err(e) => Err(e),
        };
        self.record("get_post", &result);

        match result {
            Ok(payload) => {
                debug!("Fetched post {}", post_id);
                ApiResponse::ok(payload)
            }
            Err(UpstreamError::Http {
                status: StatusCode::NOT_FOUND,
                body,
            }) => {
                warn!(post_id, upstream_body = ?body, "WordPress post not found");
                ApiResponse::message(StatusCode::NOT_FOUND, messages::POST_NOT_FOUND)
            }
            Err(e) => self.failure_response("get_post", Some(post_id), e),
        }
    }

    /// Always 200: the status describes whether the check ran, the body
    /// describes the site.
    pub async fn monitor_site(&self) -> ApiResponse {
        let report = self.monitor.check().await;
        ApiResponse::json(StatusCode::OK, &report)
    }

    /// Shared failure mapping for the content endpoints. Full detail goes
    /// to the log, the client only ever sees a fixed message.
    fn failure_response(
        &self,
        operation: &'static str,
        post_id: Option<u64>,
        err: UpstreamError,
    ) -> ApiResponse {
        match err {
            UpstreamError::Timeout => {
                error!(
                    operation,
                    ?post_id,
                    timeout = ?self.content_timeout,
                    "WordPress API request timed out"
                );
                ApiResponse::message(StatusCode::GATEWAY_TIMEOUT, messages::TIMEOUT)
            }
            UpstreamError::Http { status, body } => {
                error!(
                    operation,
                    ?post_id,
                    upstream_status = status.as_u16(),
                    upstream_body = ?body,
                    "WordPress API returned an error status"
                );
                ApiResponse::message(StatusCode::INTERNAL_SERVER_ERROR, messages::RETRIEVAL_FAILED)
            }
            UpstreamError::Connection(detail) => {
                error!(
                    operation,
                    ?post_id,
                    error = %detail,
                    "Could not reach the WordPress API"
                );
                ApiResponse::message(StatusCode::INTERNAL_SERVER_ERROR, messages::RETRIEVAL_FAILED)
            }
            UpstreamError::Unexpected(detail) => {
                error!(
                    operation,
                    ?post_id,
                    error = %detail,
                    "Unexpected failure while calling the WordPress API"
                );
                ApiResponse::message(StatusCode::INTERNAL_SERVER_ERROR, messages::UNEXPECTED)
            }
        }
    }

    fn record(&self, operation: &str, result: &Result<Value, UpstreamError>) {
        if let Some(metrics) = &self.metrics {
            let outcome = result.as_ref().map_or_else(|e| e.kind(), |_| "success");
            metrics.record_upstream(operation, outcome);
        }
    }
}
