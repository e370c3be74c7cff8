// src/proxy/response.rs
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::{Body, Response, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};

/// Client-facing texts. Upstream detail never ends up in these.
pub mod messages {
    pub const TIMEOUT: &str = "Errore: Timeout della richiesta all'API di WordPress.";
    pub const POST_NOT_FOUND: &str = "Post WordPress non trovato.";
    pub const RETRIEVAL_FAILED: &str =
        "Errore nel recupero dei contenuti da WordPress. Riprova più tardi.";
    pub const UNEXPECTED: &str = "Errore inatteso. Contatta l'amministratore.";
    pub const NOT_FOUND: &str = "Risorsa non trovata.";
    pub const METHOD_NOT_ALLOWED: &str = "Metodo non consentito.";
}

/// JSON body plus status, ready to be written to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    pub fn message(status: StatusCode, message: &str) -> Self {
        Self {
            status,
            body: json!({ "message": message }),
        }
    }

    /// Serialize `value` as the body; falls back to the generic 500.
    pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(body) => Self { status, body },
            Err(e) => {
                tracing::error!("Failed to serialize response body: {}", e);
                Self::message(StatusCode::INTERNAL_SERVER_ERROR, messages::UNEXPECTED)
            }
        }
    }

    pub fn message_text(&self) -> Option<&str> {
        self.body.get("message").and_then(Value::as_str)
    }
}

impl From<ApiResponse> for Response<Body> {
    fn from(api: ApiResponse) -> Self {
        let mut response = Response::new(Body::from(api.body.to_string()));
        *response.status_mut() = api.status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_into_hyper_response() {
        let response: Response<Body> =
            ApiResponse::message(StatusCode::GATEWAY_TIMEOUT, messages::TIMEOUT).into();

        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "message": messages::TIMEOUT }));
    }

    #[test]
    fn test_message_text() {
        let api = ApiResponse::message(StatusCode::NOT_FOUND, messages::POST_NOT_FOUND);
        assert_eq!(api.message_text(), Some("Post WordPress non trovato."));
        assert_eq!(ApiResponse::ok(json!([1, 2])).message_text(), None);
    }
}
