//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, body limits, request ID, metrics)
//! - Build the shared backend client
//! - Bind server to listener and drain on shutdown

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, on, post, MethodFilter},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

use crate::config::ProxyConfig;
use crate::http::health::health_handler;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, X_REQUEST_ID};
use crate::observability::metrics;
use crate::session::check::{check_handler, CHECK_PATH};
use crate::session::logout::{logout_handler, LOGOUT_PATH};
use crate::session::proxy::{proxy_handler, BACKEND_PREFIX};
use crate::session::{BackendLocator, CookiePolicy};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub locator: Arc<BackendLocator>,
    pub client: reqwest::Client,
    pub cookie_policy: CookiePolicy,
}

impl AppState {
    pub fn from_config(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            locator: Arc::new(BackendLocator::new(&config.backend)),
            client: build_backend_client(config)?,
            cookie_policy: CookiePolicy::new(config.deployment.environment.is_production()),
        })
    }
}

/// The shared backend client.
///
/// No cookie jar and no response cache: every call reaches the backend and
/// carries only the cookie header forwarded from the browser.
pub fn build_backend_client(config: &ProxyConfig) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder();
    if let Some(secs) = config.timeouts.backend_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder.build()
}

/// HTTP server for the session proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let state = AppState::from_config(&config)?;

        if !state.locator.is_configured() {
            tracing::warn!("No backend URL configured; every proxied request will answer 500");
        }

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    pub fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let proxy_methods = MethodFilter::GET
            .or(MethodFilter::POST)
            .or(MethodFilter::PUT)
            .or(MethodFilter::PATCH)
            .or(MethodFilter::DELETE)
            .or(MethodFilter::HEAD);

        Router::new()
            .route(BACKEND_PREFIX, on(proxy_methods, proxy_handler))
            .route(&format!("{BACKEND_PREFIX}/"), on(proxy_methods, proxy_handler))
            .route(&format!("{BACKEND_PREFIX}/{{*path}}"), on(proxy_methods, proxy_handler))
            .route(CHECK_PATH, get(check_handler))
            .route(LOGOUT_PATH, post(logout_handler))
            .route("/healthz", get(health_handler))
            .route_layer(middleware::from_fn(metrics::track_requests))
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get(X_REQUEST_ID)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            production = self.config.deployment.environment.is_production(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The router, for driving the proxy without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}
