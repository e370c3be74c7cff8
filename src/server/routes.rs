// src/server/routes.rs
// Maps method + path onto an OperationRequest.
use hyper::{Method, StatusCode, Uri};

use crate::proxy::{messages, ApiResponse, OperationRequest};

const POSTS_PATH: &str = "/api/distro-posts";
const MONITOR_PATH: &str = "/api/monitor";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("No route for {0}")]
    NotFound(String),

    #[error("Method {method} not allowed on {path}")]
    MethodNotAllowed { method: Method, path: String },
}

impl From<RouteError> for ApiResponse {
    fn from(err: RouteError) -> Self {
        match err {
            RouteError::NotFound(_) => ApiResponse::message(StatusCode::NOT_FOUND, messages::NOT_FOUND),
            RouteError::MethodNotAllowed { .. } => {
                ApiResponse::message(StatusCode::METHOD_NOT_ALLOWED, messages::METHOD_NOT_ALLOWED)
            }
        }
    }
}

/// Label used for metrics on a resolved (or rejected) request.
pub fn route_label(result: &Result<OperationRequest, RouteError>) -> &'static str {
    match result {
        Ok(OperationRequest::ListPosts { .. }) => "distro_posts",
        Ok(OperationRequest::GetPost { .. }) => "distro_post",
        Ok(OperationRequest::MonitorSite) => "monitor",
        Err(_) => "unmatched",
    }
}

pub fn resolve(method: &Method, uri: &Uri) -> Result<OperationRequest, RouteError> {
    let path = uri.path();

    let operation = if path == POSTS_PATH {
        OperationRequest::ListPosts {
            search: query_param(uri, "search").unwrap_or_default(),
        }
    } else if path == MONITOR_PATH {
        OperationRequest::MonitorSite
    } else if let Some(id) = path
        .strip_prefix(POSTS_PATH)
        .and_then(|rest| rest.strip_prefix('/'))
    {
        match parse_post_id(id) {
            Some(post_id) => OperationRequest::GetPost { post_id },
            None => return Err(RouteError::NotFound(path.to_string())),
        }
    } else {
        return Err(RouteError::NotFound(path.to_string()));
    };

    if *method != Method::GET && *method != Method::HEAD {
        return Err(RouteError::MethodNotAllowed {
            method: method.clone(),
            path: path.to_string(),
        });
    }

    Ok(operation)
}

/// Plain decimal digits only; signs, blanks and overflow are rejected.
fn parse_post_id(segment: &str) -> Option<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// First value of `name`, form-decoded.
fn query_param(uri: &Uri, name: &str) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
