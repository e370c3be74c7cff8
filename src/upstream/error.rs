// src/upstream/error.rs
use hyper::StatusCode;
use serde_json::Value;

/// Why a single outbound call did not produce a usable result.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Upstream request timed out")]
    Timeout,

    #[error("Upstream returned HTTP {status}")]
    Http {
        status: StatusCode,
        body: Option<Value>,
    },

    #[error("Upstream connection failed: {0}")]
    Connection(String),

    #[error("Unexpected upstream failure: {0}")]
    Unexpected(String),
}

impl UpstreamError {
    /// Short label used for log fields and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            UpstreamError::Timeout => "timeout",
            UpstreamError::Http { .. } => "http_error",
            UpstreamError::Connection(_) => "connection_failure",
            UpstreamError::Unexpected(_) => "unexpected",
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify a transport-level reqwest failure.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout
        } else if err.is_builder() || err.is_decode() {
            UpstreamError::Unexpected(error_chain(&err))
        } else {
            UpstreamError::Connection(error_chain(&err))
        }
    }
}

/// Render an error with all of its sources, e.g.
/// `error sending request: tcp connect error: Connection refused`.
pub(crate) fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_error_chain_includes_sources() {
        let err = Outer(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert_eq!(error_chain(&err), "outer: refused");
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(UpstreamError::Timeout.kind(), "timeout");
        assert_eq!(
            UpstreamError::Http {
                status: StatusCode::BAD_GATEWAY,
                body: None
            }
            .kind(),
            "http_error"
        );
        assert_eq!(UpstreamError::Connection("x".into()).kind(), "connection_failure");
        assert_eq!(UpstreamError::Unexpected("x".into()).kind(), "unexpected");
    }

    #[test]
    fn test_status_only_for_http_errors() {
        let err = UpstreamError::Http {
            status: StatusCode::NOT_FOUND,
            body: None,
        };
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(UpstreamError::Timeout.status(), None);
    }
}
