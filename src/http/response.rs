//! Response helpers and request-time errors.
//!
//! Every error leaves the proxy as a JSON object with a `message` field, the
//! same shape the backend uses, so the dashboard has one error path.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

/// Failures a handler can hit while serving one request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Neither backend URL is configured.
    #[error("backend URL is not configured")]
    Misconfigured,

    /// Backend unreachable, or its response could not be read.
    #[error("backend request failed: {0}")]
    Upstream(#[from] reqwest::Error),

    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Misconfigured => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::RequestBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::Misconfigured => "Server misconfiguration: backend URL is not set",
            ProxyError::Upstream(_) => "Backend request failed",
            ProxyError::RequestBody(_) => "Failed to read request body",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            ProxyError::Misconfigured => {
                tracing::error!("Backend URL missing; set BACKEND_URL or PUBLIC_BACKEND_URL")
            }
            ProxyError::Upstream(e) => tracing::error!(error = %e, "Upstream error"),
            ProxyError::RequestBody(e) => tracing::warn!(error = %e, "Unreadable request body"),
        }
        message_response(self.status(), self.public_message())
    }
}

/// `{"message": ...}` with the given status.
pub fn message_response(status: StatusCode, message: &str) -> Response {
    json_response(status, json!({ "message": message }))
}

pub fn json_response(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

/// Parse a backend body as JSON, substituting `{}` for anything unparseable.
pub fn json_or_empty(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|_| json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_or_empty() {
        assert_eq!(json_or_empty(br#"{"ok":true}"#), json!({"ok": true}));
        assert_eq!(json_or_empty(b"[1,2]"), json!([1, 2]));
        assert_eq!(json_or_empty(b""), json!({}));
        assert_eq!(json_or_empty(b"<html>oops</html>"), json!({}));
    }

    #[tokio::test]
    async fn test_misconfigured_response() {
        let response = ProxyError::Misconfigured.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            value["message"],
            "Server misconfiguration: backend URL is not set"
        );
    }
}
