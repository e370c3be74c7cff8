// src/upstream/mod.rs
mod client;
mod error;

pub use client::{ReqwestUpstream, Upstream};
pub use error::UpstreamError;
