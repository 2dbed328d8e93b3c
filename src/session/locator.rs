//! Backend base URL resolution.

use crate::config::BackendConfig;
use crate::http::response::ProxyError;

/// Resolves the backend base URL from configuration.
///
/// Resolution is a pure function of the loaded config, so it is evaluated on
/// every request without caching.
#[derive(Debug, Clone, Default)]
pub struct BackendLocator {
    server_url: Option<String>,
    public_url: Option<String>,
}

impl BackendLocator {
    pub fn new(config: &BackendConfig) -> Self {
        Self {
            server_url: config.url.clone(),
            public_url: config.public_url.clone(),
        }
    }

    /// Server-side URL first, public URL as fallback; trailing slashes stripped.
    pub fn resolve(&self) -> Option<String> {
        normalize(self.server_url.as_deref()).or_else(|| normalize(self.public_url.as_deref()))
    }

    /// Like [`resolve`](Self::resolve), but maps absence to [`ProxyError::Misconfigured`].
    pub fn require(&self) -> Result<String, ProxyError> {
        self.resolve().ok_or(ProxyError::Misconfigured)
    }

    pub fn is_configured(&self) -> bool {
        self.resolve().is_some()
    }
}

fn normalize(url: Option<&str>) -> Option<String> {
    let url = url?.trim().trim_end_matches('/');
    if url.is_empty() {
        None
    } else {
        Some(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator(url: Option<&str>, public_url: Option<&str>) -> BackendLocator {
        BackendLocator::new(&BackendConfig {
            url: url.map(String::from),
            public_url: public_url.map(String::from),
        })
    }

    #[test]
    fn test_server_url_preferred() {
        let l = locator(Some("http://internal:4000"), Some("https://public.example"));
        assert_eq!(l.resolve().as_deref(), Some("http://internal:4000"));
    }

    #[test]
    fn test_public_url_fallback() {
        let l = locator(None, Some("https://public.example/"));
        assert_eq!(l.resolve().as_deref(), Some("https://public.example"));

        let l = locator(Some("   "), Some("https://public.example"));
        assert_eq!(l.resolve().as_deref(), Some("https://public.example"));
    }

    #[test]
    fn test_trailing_slashes_stripped() {
        let l = locator(Some("https://api.example.com/v1//"), None);
        assert_eq!(l.resolve().as_deref(), Some("https://api.example.com/v1"));
    }

    #[test]
    fn test_absent_is_misconfigured() {
        let l = locator(None, None);
        assert!(l.resolve().is_none());
        assert!(!l.is_configured());
        assert!(matches!(l.require(), Err(ProxyError::Misconfigured)));

        let l = locator(Some("/"), None);
        assert!(l.resolve().is_none());
    }
}
