//! Centralized configuration (environment variables + defaults).
//!
//! Credentials are deliberately absent: the Cosmos client authenticates with
//! whatever identity the platform provides (see `infra::credential`).

use crate::infra::cosmos::CosmosSettings;
use std::net::SocketAddr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_DATABASE: &str = "cosmicworks";
pub const DEFAULT_CONTAINER: &str = "certifications";
pub const DEFAULT_PARTITION_KEY: &str = "certification";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub cosmos: CosmosSettings,
    /// Partition every query is scoped to.
    pub partition_key: String,
    pub bind_addr: SocketAddr,
    pub request_timeout: Duration,
}

impl ServiceConfig {
    /// Reads the process environment, after loading `.env` if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        // Cosmos account endpoint (required), e.g. https://myaccount.documents.azure.com:443/
        let endpoint = get("COSMOS_DB_ENDPOINT").ok_or(ConfigError::Missing("COSMOS_DB_ENDPOINT"))?;

        let page_size = match get("COSMOS_DB_PAGE_SIZE") {
            Some(raw) => Some(parse_positive("COSMOS_DB_PAGE_SIZE", &raw)?),
            None => None,
        };

        let bind_raw = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "BIND_ADDR",
            value: bind_raw.clone(),
            reason: format!("{}", e),
        })?;

        let request_timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("REQUEST_TIMEOUT_SECS", &raw)?.into()),
            None => Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        Ok(Self {
            cosmos: CosmosSettings {
                endpoint,
                database: get("COSMOS_DB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
                container: get("COSMOS_DB_CONTAINER")
                    .unwrap_or_else(|| DEFAULT_CONTAINER.to_string()),
                page_size,
            },
            partition_key: get("COSMOS_DB_PARTITION_KEY")
                .unwrap_or_else(|| DEFAULT_PARTITION_KEY.to_string()),
            bind_addr,
            request_timeout,
        })
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u32, ConfigError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Invalid {
            var,
            value: raw.to_string(),
            reason: "expected a positive integer".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn endpoint_is_required() {
        let err = ServiceConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("COSMOS_DB_ENDPOINT"));

        let err = ServiceConfig::from_lookup(lookup(&[("COSMOS_DB_ENDPOINT", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("COSMOS_DB_ENDPOINT"));
    }

    #[test]
    fn defaults_match_the_deployed_layout() {
        let cfg = ServiceConfig::from_lookup(lookup(&[(
            "COSMOS_DB_ENDPOINT",
            "https://acct.documents.azure.com:443/",
        )]))
        .unwrap();

        assert_eq!(cfg.cosmos.database, "cosmicworks");
        assert_eq!(cfg.cosmos.container, "certifications");
        assert_eq!(cfg.cosmos.page_size, None);
        assert_eq!(cfg.partition_key, "certification");
        assert_eq!(cfg.bind_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = ServiceConfig::from_lookup(lookup(&[
            ("COSMOS_DB_ENDPOINT", "https://acct.documents.azure.com/"),
            ("COSMOS_DB_DATABASE", "prod"),
            ("COSMOS_DB_CONTAINER", "certs"),
            ("COSMOS_DB_PARTITION_KEY", "cert"),
            ("COSMOS_DB_PAGE_SIZE", "25"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert_eq!(cfg.cosmos.database, "prod");
        assert_eq!(cfg.cosmos.container, "certs");
        assert_eq!(cfg.cosmos.page_size, Some(25));
        assert_eq!(cfg.partition_key, "cert");
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn invalid_numbers_are_errors() {
        for (var, value) in [
            ("COSMOS_DB_PAGE_SIZE", "0"),
            ("COSMOS_DB_PAGE_SIZE", "many"),
            ("REQUEST_TIMEOUT_SECS", "-3"),
            ("BIND_ADDR", "localhost"),
        ] {
            let err = ServiceConfig::from_lookup(lookup(&[
                ("COSMOS_DB_ENDPOINT", "https://acct.documents.azure.com/"),
                (var, value),
            ]))
            .unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { var: v, .. } if v == var));
        }
    }
}
