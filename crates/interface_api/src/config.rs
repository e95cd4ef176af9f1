//! API configuration

use serde::Deserialize;

use domain_credit::NumberingFormat;
use infra_db::DatabaseConfig;

/// API configuration
///
/// Every field can be set through a `CREDIT_`-prefixed environment variable,
/// e.g. `CREDIT_PORT=9090` or `CREDIT_DATABASE_URL=postgres://...`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database URL
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Log level, used when `RUST_LOG` is unset
    pub log_level: String,
    /// Separator between the parts of an allocated number
    pub numbering_separator: String,
    /// Zero-padded width of the sequence part
    pub numbering_pad_width: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_url: "postgres://localhost/credit_ledger".to_string(),
            max_connections: 10,
            min_connections: 2,
            log_level: "info".to_string(),
            numbering_separator: "/".to_string(),
            numbering_pad_width: 3,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from the environment on top of the defaults
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();

        config::Config::builder()
            .set_default("host", defaults.host)?
            .set_default("port", i64::from(defaults.port))?
            .set_default("database_url", defaults.database_url)?
            .set_default("max_connections", i64::from(defaults.max_connections))?
            .set_default("min_connections", i64::from(defaults.min_connections))?
            .set_default("log_level", defaults.log_level)?
            .set_default("numbering_separator", defaults.numbering_separator)?
            .set_default("numbering_pad_width", defaults.numbering_pad_width as i64)?
            .add_source(config::Environment::with_prefix("CREDIT").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Pool settings derived from this configuration
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig::new(self.database_url.clone())
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
    }

    /// Format passed to every sequence allocation
    pub fn numbering(&self) -> NumberingFormat {
        NumberingFormat {
            separator: self.numbering_separator.clone(),
            pad_width: self.numbering_pad_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_numbering() {
        let config = ApiConfig::default();
        assert_eq!(config.numbering(), NumberingFormat::default());
        assert_eq!(config.server_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_database_config_uses_pool_sizes() {
        let config = ApiConfig {
            max_connections: 32,
            ..ApiConfig::default()
        };
        assert_eq!(config.database().max_connections, 32);
    }
}
