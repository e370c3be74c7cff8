// src/lib.rs
pub mod config;
pub mod metrics;
pub mod monitor;
pub mod proxy;
pub mod server;
pub mod upstream;
