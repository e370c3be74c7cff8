// src/monitor/mod.rs
mod checker;

pub use checker::{MonitorReport, SiteMonitor, SiteStatus};
