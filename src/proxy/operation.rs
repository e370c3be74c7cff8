// src/proxy/operation.rs

/// What a client asked for, independent of how it arrived over HTTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    ListPosts { search: String },
    GetPost { post_id: u64 },
    MonitorSite,
}

impl OperationRequest {
    /// Stable label for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            OperationRequest::ListPosts { .. } => "list_posts",
            OperationRequest::GetPost { .. } => "get_post",
            OperationRequest::MonitorSite => "monitor_site",
        }
    }
}
