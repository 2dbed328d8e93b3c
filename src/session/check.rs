//! Session validity passthrough.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header::CONTENT_TYPE, HeaderMap, HeaderValue};
use axum::response::{IntoResponse, Response};

use crate::http::request::{forward_headers, request_id};
use crate::http::response::ProxyError;
use crate::http::server::AppState;

pub const CHECK_PATH: &str = "/api/session/check";

/// Forward the session check and stream the backend answer through untouched.
pub async fn check_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let base = state.locator.require()?;

    let backend = forward_headers(state.client.get(format!("{base}{CHECK_PATH}")), &headers)
        .send()
        .await?;

    let status = backend.status();
    let content_type = backend
        .headers()
        .get(CONTENT_TYPE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("application/json"));

    tracing::debug!(request_id = %request_id(&headers), status = %status, "Session check");

    Ok((
        status,
        [(CONTENT_TYPE, content_type)],
        Body::from_stream(backend.bytes_stream()),
    )
        .into_response())
}
