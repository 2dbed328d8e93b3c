//! Request identification and forwarding helpers.
//!
//! # Responsibilities
//! - Generate a UUID v4 `x-request-id` for every inbound request
//! - Echo the id on the response
//! - Copy the id and the session cookie onto outbound backend calls

use axum::http::{header::COOKIE, HeaderMap, HeaderName, HeaderValue, Method, Request};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates UUID v4 request ids. Ids sent by the client are kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuidV4;

impl MakeRequestId for MakeRequestUuidV4 {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuidV4> {
    SetRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID), MakeRequestUuidV4)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(HeaderName::from_static(X_REQUEST_ID))
}

/// The request id of an inbound request, for logs.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// The inbound `cookie` header, or an empty value when absent.
///
/// The header is always forwarded, even empty.
pub fn forwarded_cookie(headers: &HeaderMap) -> HeaderValue {
    headers
        .get(COOKIE)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static(""))
}

/// Attach the forwarding headers every backend call carries.
pub fn forward_headers(
    builder: reqwest::RequestBuilder,
    inbound: &HeaderMap,
) -> reqwest::RequestBuilder {
    let builder = builder.header(COOKIE, forwarded_cookie(inbound));
    match inbound.get(X_REQUEST_ID) {
        Some(id) => builder.header(X_REQUEST_ID, id.clone()),
        None => builder,
    }
}

/// GET and HEAD carry no body.
pub fn method_has_body(method: &Method) -> bool {
    *method != Method::GET && *method != Method::HEAD
}
