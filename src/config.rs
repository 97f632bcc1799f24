//! Environment-driven server configuration.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Server configuration.
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | `DRAFTBRIDGE_PORT` | `3000` | HTTP listen port |
/// | `DRAFTBRIDGE_UPSTREAM_URL` | — (required) | design-file API base URL |
/// | `DRAFTBRIDGE_API_TOKEN` | — (required) | upstream API token |
/// | `DRAFTBRIDGE_CACHE_TTL_SECS` | `300` | upstream response cache TTL |
/// | `DRAFTBRIDGE_UPSTREAM_TIMEOUT_SECS` | `15` | upstream request timeout |
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub port: u16,
    pub upstream_base_url: String,
    pub api_token: String,
    pub cache_ttl: Duration,
    pub upstream_timeout: Duration,
}

impl BridgeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from a lookup function; tests inject their own.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_or(&lookup, "DRAFTBRIDGE_PORT", 3000u16)?;
        let upstream_base_url = lookup("DRAFTBRIDGE_UPSTREAM_URL")
            .ok_or(ConfigError::Missing("DRAFTBRIDGE_UPSTREAM_URL"))?;
        let api_token = lookup("DRAFTBRIDGE_API_TOKEN")
            .ok_or(ConfigError::Missing("DRAFTBRIDGE_API_TOKEN"))?;
        let cache_ttl_secs = parse_or(&lookup, "DRAFTBRIDGE_CACHE_TTL_SECS", 300u64)?;
        let timeout_secs = parse_or(&lookup, "DRAFTBRIDGE_UPSTREAM_TIMEOUT_SECS", 15u64)?;

        Ok(Self {
            port,
            upstream_base_url,
            api_token,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            upstream_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = vars.iter().copied().collect();
        move |name| map.get(name).map(|v| v.to_string())
    }

    #[test]
    fn defaults_apply() {
        let cfg = BridgeConfig::from_lookup(lookup(&[
            ("DRAFTBRIDGE_UPSTREAM_URL", "https://api.example.test/v1"),
            ("DRAFTBRIDGE_API_TOKEN", "tok"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.cache_ttl, Duration::from_secs(300));
        assert_eq!(cfg.upstream_timeout, Duration::from_secs(15));
    }

    #[test]
    fn missing_required_vars_fail() {
        let err = BridgeConfig::from_lookup(lookup(&[("DRAFTBRIDGE_API_TOKEN", "t")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DRAFTBRIDGE_UPSTREAM_URL")));
    }

    #[test]
    fn invalid_port_reported_with_value() {
        let err = BridgeConfig::from_lookup(lookup(&[
            ("DRAFTBRIDGE_UPSTREAM_URL", "u"),
            ("DRAFTBRIDGE_API_TOKEN", "t"),
            ("DRAFTBRIDGE_PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("not-a-port"));
    }
}
