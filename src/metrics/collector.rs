// src/metrics/collector.rs
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Instant;
use anyhow::Result;

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);
        
        Ok(Self {
            registry,
            collector,
        })
    }
    
    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }
    
    /// Text exposition of everything registered so far.
    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    // Client-facing requests
    pub requests_total: IntCounterVec,
    pub request_duration_seconds: HistogramVec,
    
    // Outbound calls
    pub upstream_requests_total: IntCounterVec,
    
    // Monitor
    pub monitored_site_up: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let requests_total = IntCounterVec::new(
            Opts::new("distro_proxy_requests_total", "Total number of requests"),
            &["route", "status_code"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;
        
        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "distro_proxy_request_duration_seconds",
                "Request duration in seconds",
            ),
            &["route"],
        )?;
        registry.register(Box::new(request_duration_seconds.clone()))?;
        
        let upstream_requests_total = IntCounterVec::new(
            Opts::new(
                "distro_proxy_upstream_requests_total",
                "Outbound calls by operation and outcome",
            ),
            &["operation", "outcome"],
        )?;
        registry.register(Box::new(upstream_requests_total.clone()))?;
        
        let monitored_site_up = IntGauge::new(
            "distro_proxy_monitored_site_up",
            "Last monitor result (1=online, 0=offline or error)",
        )?;
        registry.register(Box::new(monitored_site_up.clone()))?;
        
        Ok(Self {
            requests_total,
            request_duration_seconds,
            upstream_requests_total,
            monitored_site_up,
        })
    }
    
    pub fn record_request(&self, route: &str, status_code: u16, duration: std::time::Duration) {
        let status = status_code.to_string();
        self.requests_total
            .with_label_values(&[route, &status])
            .inc();
        
        self.request_duration_seconds
            .with_label_values(&[route])
            .observe(duration.as_secs_f64());
    }
    
    pub fn record_upstream(&self, operation: &str, outcome: &str) {
        self.upstream_requests_total
            .with_label_values(&[operation, outcome])
            .inc();
    }
    
    pub fn update_site_up(&self, up: bool) {
        self.monitored_site_up.set(if up { 1 } else { 0 });
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
    
    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
