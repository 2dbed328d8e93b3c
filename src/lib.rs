//! Same-Origin Session Proxy Library
//!
//! Sits between the admin dashboard and the booking backend, forwarding API
//! calls and re-issuing the backend's session cookies as first-party cookies.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod session;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
