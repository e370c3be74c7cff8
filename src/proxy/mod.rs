// src/proxy/mod.rs
mod operation;
mod proxy;
mod response;

pub use operation::OperationRequest;
pub use proxy::{post_url, posts_url, DistroProxy};
pub use response::{messages, ApiResponse};
