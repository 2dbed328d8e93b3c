//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Environment, ProxyConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Server-side backend URL (preferred).
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";
/// Public backend URL (fallback).
pub const ENV_PUBLIC_BACKEND_URL: &str = "PUBLIC_BACKEND_URL";
pub const ENV_APP_ENV: &str = "APP_ENV";
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overlay, then validation.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config: ProxyConfig = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto `config`.
///
/// `lookup` abstracts `std::env::var` so tests need not mutate the process
/// environment. Blank values are ignored.
pub fn apply_env_overrides<F>(config: &mut ProxyConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = get(ENV_BACKEND_URL) {
        config.backend.url = Some(url);
    }
    if let Some(url) = get(ENV_PUBLIC_BACKEND_URL) {
        config.backend.public_url = Some(url);
    }
    if let Some(env) = get(ENV_APP_ENV) {
        config.deployment.environment = Environment::from_env_value(&env);
    }
    if let Some(addr) = get(ENV_BIND_ADDRESS) {
        config.listener.bind_address = addr;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = ProxyConfig::default();
        config.backend.url = Some("http://from-file".into());

        apply_env_overrides(
            &mut config,
            lookup(&[
                (ENV_BACKEND_URL, "http://from-env"),
                (ENV_PUBLIC_BACKEND_URL, "http://public-env"),
                (ENV_APP_ENV, "production"),
                (ENV_BIND_ADDRESS, "127.0.0.1:8000"),
            ]),
        );

        assert_eq!(config.backend.url.as_deref(), Some("http://from-env"));
        assert_eq!(config.backend.public_url.as_deref(), Some("http://public-env"));
        assert!(config.deployment.environment.is_production());
        assert_eq!(config.listener.bind_address, "127.0.0.1:8000");
    }

    #[test]
    fn test_blank_env_values_ignored() {
        let mut config = ProxyConfig::default();
        config.backend.url = Some("http://from-file".into());

        apply_env_overrides(&mut config, lookup(&[(ENV_BACKEND_URL, "  ")]));

        assert_eq!(config.backend.url.as_deref(), Some("http://from-file"));
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("session-proxy-{}.toml", std::process::id()));
        fs::write(
            &path,
            r#"
            [listener]
            bind_address = "127.0.0.1:3999"

            [backend]
            public_url = "https://api.example.com/"
            "#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:3999");

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_invalid_file_reports_parse_error() {
        let path = std::env::temp_dir().join(format!("session-proxy-bad-{}.toml", std::process::id()));
        fs::write(&path, "[listener\nbind_address = ").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        fs::remove_file(&path).unwrap_or_default();
    }
}
