//! Metrics collection and exposition.
//!
//! # Metrics
//! - `session_proxy_requests_total` (counter): requests by route, status
//! - `session_proxy_request_duration_seconds` (histogram): latency by route
//! - `session_proxy_mirrored_cookies_total` (counter): login cookies re-issued
//! - `session_proxy_cleared_cookies_total` (counter): cookies expired on logout

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(route: &str, status: u16, start: Instant) {
    counter!(
        "session_proxy_requests_total",
        "route" => route.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("session_proxy_request_duration_seconds", "route" => route.to_string())
        .record(start.elapsed().as_secs_f64());
}

pub fn record_mirrored_cookies(count: usize) {
    counter!("session_proxy_mirrored_cookies_total").increment(count as u64);
}

pub fn record_cleared_cookies(count: usize) {
    counter!("session_proxy_cleared_cookies_total").increment(count as u64);
}

/// Route-level middleware recording status and latency per matched route.
pub async fn track_requests(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());

    let response = next.run(request).await;
    record_request(&route, response.status().as_u16(), start);
    response
}
