// src/monitor/checker.rs
use crate::metrics::MetricsCollector;
use crate::upstream::{Upstream, UpstreamError};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SiteStatus {
    Online,
    Offline,
    Errore,
}

/// Body of `GET /api/monitor`.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReport {
    pub site: String,
    pub status: SiteStatus,
    pub last_checked: String,
    pub message: String,
}

/// Single-shot liveness probe against the configured site.
pub struct SiteMonitor {
    site: String,
    site_url: Url,
    timeout: Duration,
    upstream: Arc<dyn Upstream>,
    metrics: Option<Arc<MetricsCollector>>,
}

impl SiteMonitor {
    /// `site` is reported verbatim; `site_url` is what gets probed.
    pub fn new(
        site: String,
        site_url: Url,
        timeout: Duration,
        upstream: Arc<dyn Upstream>,
        metrics: Option<Arc<MetricsCollector>>,
    ) -> Self {
        Self {
            site,
            site_url,
            timeout,
            upstream,
            metrics,
        }
    }

    /// Probe the site once. Never fails: every outcome is folded into the
    /// report's `status` and `message`.
    pub async fn check(&self) -> MonitorReport {
        let result = self.upstream.probe(&self.site_url, self.timeout).await;

        let (status, message) = match &result {
            Ok(code) => {
                debug!("Site {} is online (HTTP {})", self.site_url, code.as_u16());
                (
                    SiteStatus::Online,
                    format!("Sito raggiungibile. Codice HTTP: {}", code.as_u16()),
                )
            }
            Err(UpstreamError::Http { status, .. }) => {
                warn!("Site {} answered HTTP {}", self.site_url, status);
                (
                    SiteStatus::Offline,
                    format!("Sito raggiunto ma in errore. Codice HTTP: {}", status.as_u16()),
                )
            }
            Err(UpstreamError::Timeout) => {
                warn!(
                    "Site {} did not answer within {:?}",
                    self.site_url, self.timeout
                );
                (
                    SiteStatus::Offline,
                    "Impossibile raggiungere il sito: timeout.".to_string(),
                )
            }
            Err(UpstreamError::Connection(detail)) => {
                warn!("Site {} is unreachable: {}", self.site_url, detail);
                (
                    SiteStatus::Offline,
                    "Impossibile raggiungere il sito.".to_string(),
                )
            }
            Err(UpstreamError::Unexpected(detail)) => {
                error!("Monitoring {} failed unexpectedly: {}", self.site_url, detail);
                (
                    SiteStatus::Errore,
                    "Errore generico nel monitoraggio.".to_string(),
                )
            }
        };

        if let Some(metrics) = &self.metrics {
            let outcome = result.as_ref().map_or_else(|e| e.kind(), |_| "success");
            metrics.record_upstream("monitor_site", outcome);
            metrics.update_site_up(status == SiteStatus::Online);
        }

        MonitorReport {
            site: self.site.clone(),
            status,
            last_checked: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true),
            message,
        }
    }
}
