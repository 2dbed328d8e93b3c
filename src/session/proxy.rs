//! Generic backend proxy.
//!
//! Relays any verb on `/api/backend/*` to the backend, answering with the
//! backend status and its body re-encoded as JSON. A successful login call
//! additionally mirrors the backend's session cookies onto the serving origin.

use axum::body::Body;
use axum::extract::State;
use axum::http::{
    header::{CONTENT_TYPE, SET_COOKIE},
    HeaderValue, Method, Request,
};
use axum::response::Response;

use crate::http::request::{forward_headers, method_has_body, request_id};
use crate::http::response::{json_or_empty, json_response, ProxyError};
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::session::cookies::{mirror, RawSetCookie};

/// Mount point of the generic proxy.
pub const BACKEND_PREFIX: &str = "/api/backend";

/// The backend-relative part of an inbound path, without leading slash.
///
/// `/api/backend` and `/api/backend/` both yield `""`.
pub fn api_path(path: &str) -> &str {
    let rest = path.strip_prefix(BACKEND_PREFIX).unwrap_or(path);
    rest.strip_prefix('/').unwrap_or(rest)
}

/// `{base}/{api_path}`, plus `?{query}` when the inbound request had one.
pub fn target_url(base: &str, api_path: &str, query: Option<&str>) -> String {
    match query.filter(|q| !q.is_empty()) {
        Some(query) => format!("{base}/{api_path}?{query}"),
        None => format!("{base}/{api_path}"),
    }
}

/// A login call is a POST whose last two path segments are `session/login`.
///
/// Evaluated on the raw path: `session/login/` ends in an empty segment and
/// does not match.
pub fn is_login_request(method: &Method, api_path: &str) -> bool {
    if *method != Method::POST {
        return false;
    }
    let mut segments = api_path.rsplit('/');
    matches!(
        (segments.next(), segments.next()),
        (Some("login"), Some("session"))
    )
}

pub async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let base = state.locator.require()?;

    let (parts, body) = request.into_parts();
    let api_path = api_path(parts.uri.path());
    let url = target_url(&base, api_path, parts.uri.query());
    let login = is_login_request(&parts.method, api_path);

    tracing::debug!(
        request_id = %request_id(&parts.headers),
        method = %parts.method,
        api_path = %api_path,
        login,
        "Proxying request"
    );

    let mut outbound = forward_headers(
        state.client.request(parts.method.clone(), &url),
        &parts.headers,
    );
    if let Some(content_type) = parts.headers.get(CONTENT_TYPE) {
        outbound = outbound.header(CONTENT_TYPE, content_type.clone());
    }
    if method_has_body(&parts.method) {
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(ProxyError::RequestBody)?;
        outbound = outbound.body(bytes);
    }

    let backend = outbound.send().await?;
    let status = backend.status();

    // Headers are inspected before the body is consumed; both come from the
    // one buffered response.
    let set_cookie = if login && status.is_success() {
        RawSetCookie::from_headers(backend.headers())
    } else {
        RawSetCookie::Absent
    };
    let payload = json_or_empty(&backend.bytes().await?);

    let mut response = json_response(status, payload);

    let mirrored = mirror(set_cookie, state.cookie_policy);
    if !mirrored.is_empty() {
        tracing::info!(
            request_id = %request_id(&parts.headers),
            cookies = mirrored.len(),
            "Mirroring login cookies"
        );
        metrics::record_mirrored_cookies(mirrored.len());
    }
    for cookie in mirrored {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "Dropping unrepresentable cookie"),
        }
    }

    Ok(response)
}
