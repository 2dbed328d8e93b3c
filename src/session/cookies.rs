//! Cookie mirroring and expiry.
//!
//! Backend session cookies are re-issued by the serving origin: only the
//! `name=value` pair survives, every attribute is replaced by a fixed policy.

use axum::http::{header::SET_COOKIE, HeaderMap};

/// `Set-Cookie` values as received from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RawSetCookie {
    #[default]
    Absent,
    /// One header value, possibly a combined string.
    Single(String),
    Many(Vec<String>),
}

impl RawSetCookie {
    /// Collect every `Set-Cookie` value from a response header map.
    ///
    /// Values are decoded lossily; only their `name=value` pair is used later.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut values: Vec<String> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();

        match values.len() {
            0 => RawSetCookie::Absent,
            1 => RawSetCookie::Single(values.remove(0)),
            _ => RawSetCookie::Many(values),
        }
    }

    fn into_vec(self) -> Vec<String> {
        match self {
            RawSetCookie::Absent => Vec::new(),
            RawSetCookie::Single(value) => vec![value],
            RawSetCookie::Many(values) => values,
        }
    }
}

/// Attributes applied to every mirrored cookie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookiePolicy {
    /// Append `Secure`. Only set in production.
    pub secure: bool,
}

impl CookiePolicy {
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    fn render(&self, pair: &str) -> String {
        let mut cookie = format!("{pair}; Path=/; HttpOnly; SameSite=Lax");
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

/// Rewrite backend cookies as same-origin cookies, preserving input order.
pub fn mirror(raw: RawSetCookie, policy: CookiePolicy) -> Vec<String> {
    raw.into_vec()
        .iter()
        .filter_map(|cookie| {
            let pair = cookie.split_once(';').map_or(cookie.as_str(), |(pair, _)| pair).trim();
            (!pair.is_empty()).then(|| policy.render(pair))
        })
        .collect()
}

/// Names of the cookies in a `Cookie` request header, first occurrence order.
pub fn cookie_names(header: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for part in header.split(';') {
        let name = part.split_once('=').map_or(part, |(name, _)| name).trim();
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// A `Set-Cookie` value that deletes `name` immediately.
pub fn expire_cookie(name: &str) -> String {
    format!("{name}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax")
}
