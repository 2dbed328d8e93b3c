//! Same-origin session proxy.
//!
//! # Data Flow
//! ```text
//! browser ─▶ /api/backend/*       ─▶ proxy.rs  ─┐
//!         ─▶ /api/session/check   ─▶ check.rs  ─┼─▶ locator.rs ─▶ backend
//!         ─▶ /api/session/logout  ─▶ logout.rs ─┘
//!
//! login response (POST .../session/login, 2xx)
//!     → cookies.rs::mirror (name=value kept, attributes replaced)
//!     → one Set-Cookie per cookie on the browser response
//!
//! logout
//!     → cookies.rs::cookie_names (from the inbound Cookie header)
//!     → one expiring Set-Cookie per name, whatever the backend said
//! ```
//!
//! # Design Decisions
//! - Stateless: nothing survives a request
//! - One backend call per request, no retries
//! - Backend status is always passed through

pub mod check;
pub mod cookies;
pub mod locator;
pub mod logout;
pub mod proxy;

pub use cookies::{CookiePolicy, RawSetCookie};
pub use locator::BackendLocator;
