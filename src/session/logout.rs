//! Logout with unconditional client-side cookie teardown.

use axum::extract::State;
use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderMap, HeaderValue, StatusCode,
};
use axum::response::Response;
use serde_json::json;

use crate::http::request::{forward_headers, request_id};
use crate::http::response::{json_response, message_response, ProxyError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::session::cookies::{cookie_names, expire_cookie};

pub const LOGOUT_PATH: &str = "/api/session/logout";

/// Forward the logout, then expire every cookie the browser sent.
///
/// Backend failure, including an unreachable backend, only changes the body;
/// the cookies are cleared either way.
pub async fn logout_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ProxyError> {
    let base = state.locator.require()?;
    let request_id = request_id(&headers);

    let outcome = forward_headers(state.client.post(format!("{base}{LOGOUT_PATH}")), &headers)
        .send()
        .await;

    let mut response = match outcome {
        Ok(backend) if backend.status().is_success() => json_response(backend.status(), json!({})),
        Ok(backend) => {
            tracing::warn!(request_id = %request_id, status = %backend.status(), "Backend rejected logout");
            message_response(backend.status(), "Logout failed")
        }
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e, "Backend logout unreachable");
            message_response(StatusCode::BAD_GATEWAY, "Logout failed")
        }
    };

    // Cookie values may carry non-ASCII bytes; only the names matter here.
    let incoming = headers
        .get(COOKIE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .unwrap_or_default();
    let names = cookie_names(&incoming);
    for name in &names {
        if let Ok(value) = HeaderValue::from_str(&expire_cookie(name)) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }

    tracing::info!(request_id = %request_id, cleared = names.len(), "Session cookies cleared");
    metrics::record_cleared_cookies(names.len());

    Ok(response)
}
