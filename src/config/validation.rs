//! Configuration validation.
//!
//! Serde handles syntax; this checks values. Every problem is reported,
//! not just the first one.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    BindAddress(String),

    #[error("{field} `{value}` is not an absolute http(s) URL")]
    BackendUrl { field: &'static str, value: String },

    #[error("security.max_body_size must be greater than zero")]
    MaxBodySize,

    #[error("timeouts.backend_secs must be greater than zero when set")]
    BackendTimeout,

    #[error("observability.metrics_address `{0}` is not a socket address")]
    MetricsAddress(String),
}

/// Validate a configuration, collecting all errors.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    let urls = [
        ("backend.url", config.backend.url.as_deref()),
        ("backend.public_url", config.backend.public_url.as_deref()),
    ];
    for (field, value) in urls {
        let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
            continue;
        };
        if !is_http_url(value) {
            errors.push(ValidationError::BackendUrl {
                field,
                value: value.to_string(),
            });
        }
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::MaxBodySize);
    }

    if config.timeouts.backend_secs == Some(0) {
        errors.push(ValidationError::BackendTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_http_url(value: &str) -> bool {
    match Url::parse(value.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&ProxyConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ProxyConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.backend.url = Some("ftp://files.example".into());
        config.backend.public_url = Some("/relative".into());
        config.security.max_body_size = 0;
        config.timeouts.backend_secs = Some(0);
        config.observability.metrics_enabled = true;
        config.observability.metrics_address = "nowhere".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 6);
        assert!(errors.contains(&ValidationError::MaxBodySize));
        assert!(errors.contains(&ValidationError::BackendUrl {
            field: "backend.public_url",
            value: "/relative".into(),
        }));
    }

    #[test]
    fn test_missing_backend_url_is_not_an_error() {
        let mut config = ProxyConfig::default();
        config.backend.url = None;
        config.backend.public_url = Some("   ".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_trailing_slash_backend_url_accepted() {
        let mut config = ProxyConfig::default();
        config.backend.url = Some("https://api.example.com/v1/".into());
        assert!(validate_config(&config).is_ok());
    }
}
