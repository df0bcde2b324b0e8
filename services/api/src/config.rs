//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where persisted students and results live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    /// Nothing survives a restart.
    Memory,
    Sqlite(String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub store: StoreBackend,
    pub log_level: Level,
    pub model_api_url: String,
    pub model_api_key: Option<String>,
    pub model_name: String,
    pub model_max_tokens: u32,
    pub teacher_passphrase: String,
    pub allowed_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());
        let required = |name: &str| lookup(name).ok_or_else(|| ConfigError::MissingVar(name.to_string()));

        // --- Server and Storage Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:3000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url = required("DATABASE_URL")?;
        let store = if database_url.eq_ignore_ascii_case("memory") {
            StoreBackend::Memory
        } else if database_url.starts_with("sqlite:") {
            StoreBackend::Sqlite(database_url)
        } else {
            return Err(ConfigError::InvalidValue(
                "DATABASE_URL".to_string(),
                format!("'{}' is neither 'memory' nor a sqlite: URL", database_url),
            ));
        };

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Model Endpoint Settings ---
        let model_api_url = var_or("MODEL_API_URL", "https://api.anthropic.com/v1/messages");
        let model_api_key = lookup("MODEL_API_KEY").filter(|k| !k.is_empty());
        let model_name = var_or("MODEL_NAME", "claude-sonnet-4-20250514");
        let max_tokens_str = var_or("MODEL_MAX_TOKENS", "2000");
        let model_max_tokens = max_tokens_str
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                ConfigError::InvalidValue(
                    "MODEL_MAX_TOKENS".to_string(),
                    format!("'{}' is not a positive integer", max_tokens_str),
                )
            })?;

        // --- Access Settings ---
        let teacher_passphrase = required("TEACHER_PASSPHRASE")?;
        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:3000");

        Ok(Self {
            bind_address,
            store,
            log_level,
            model_api_url,
            model_api_key,
            model_name,
            model_max_tokens,
            teacher_passphrase,
            allowed_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_fill_optional_settings() {
        let config = load(&[("DATABASE_URL", "memory"), ("TEACHER_PASSPHRASE", "pw")]).unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.model_max_tokens, 2000);
        assert_eq!(config.model_name, "claude-sonnet-4-20250514");
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.model_api_key.is_none());
    }

    #[test]
    fn sqlite_url_selects_sqlite_store() {
        let config = load(&[
            ("DATABASE_URL", "sqlite://tutor.db?mode=rwc"),
            ("TEACHER_PASSPHRASE", "pw"),
        ])
        .unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Sqlite("sqlite://tutor.db?mode=rwc".to_string())
        );
    }

    #[test]
    fn missing_passphrase_is_reported() {
        let err = load(&[("DATABASE_URL", "memory")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(v) if v == "TEACHER_PASSPHRASE"));
    }

    #[test]
    fn invalid_token_cap_is_reported() {
        let err = load(&[
            ("DATABASE_URL", "memory"),
            ("TEACHER_PASSPHRASE", "pw"),
            ("MODEL_MAX_TOKENS", "lots"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(v, _) if v == "MODEL_MAX_TOKENS"));
    }

    #[test]
    fn unsupported_database_url_is_rejected() {
        let err = load(&[
            ("DATABASE_URL", "postgres://localhost/tutor"),
            ("TEACHER_PASSPHRASE", "pw"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(v, _) if v == "DATABASE_URL"));
    }
}
