//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable             | Default        |
//! |----------------------|----------------|
//! | `VENTAS_HOST`        | `0.0.0.0`      |
//! | `VENTAS_PORT`        | `8000`         |
//! | `DATABASE_PATH`      | `./ventas.db`  |
//! | `DB_MAX_CONNECTIONS` | `5`            |
//! | `DEFAULT_PAGE_LIMIT` | `100`          |
//! | `MAX_PAGE_LIMIT`     | `1000`         |

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use ventas_core::DEFAULT_PAGE_LIMIT;
use ventas_db::DbConfig;

/// API configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Interface to bind
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: String,

    /// Connection pool size
    pub db_max_connections: u32,

    /// Page size when a list request names none
    pub default_page_limit: u32,

    /// Upper bound for any requested page or report size
    pub max_page_limit: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "0.0.0.0".to_string(),
            port: 8000,
            database_path: "./ventas.db".to_string(),
            db_max_connections: 5,
            default_page_limit: DEFAULT_PAGE_LIMIT,
            max_page_limit: 1000,
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from any key lookup (environment, map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ApiConfig::default();

        let config = ApiConfig {
            host: lookup("VENTAS_HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "VENTAS_PORT", defaults.port)?,
            database_path: lookup("DATABASE_PATH").unwrap_or(defaults.database_path),
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.db_max_connections)?,
            default_page_limit: parse_or(&lookup, "DEFAULT_PAGE_LIMIT", defaults.default_page_limit)?,
            max_page_limit: parse_or(&lookup, "MAX_PAGE_LIMIT", defaults.max_page_limit)?,
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        if config.default_page_limit > config.max_page_limit {
            return Err(ConfigError::InvalidValue("DEFAULT_PAGE_LIMIT".to_string()));
        }

        Ok(config)
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).max_connections(self.db_max_connections)
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_map(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = from_map(&[]).unwrap();
        assert_eq!(config, ApiConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
        assert_eq!(config.default_page_limit, 100);
    }

    #[test]
    fn test_overrides() {
        let config = from_map(&[
            ("VENTAS_PORT", "9090"),
            ("DATABASE_PATH", "/tmp/v.db"),
            ("MAX_PAGE_LIMIT", "50"),
            ("DEFAULT_PAGE_LIMIT", "20"),
        ])
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.database_path, "/tmp/v.db");
        assert_eq!(config.max_page_limit, 50);
        assert_eq!(config.db_config().max_connections, 5);
    }

    #[test]
    fn test_invalid_values() {
        let err = from_map(&[("VENTAS_PORT", "not-a-port")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for VENTAS_PORT");

        assert!(from_map(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(from_map(&[("DEFAULT_PAGE_LIMIT", "500"), ("MAX_PAGE_LIMIT", "100")]).is_err());
    }
}
