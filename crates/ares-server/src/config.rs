//! Server configuration.

use std::path::Path;

use ares_engine::{EngineError, EngineSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are out of range
    #[error("invalid config: {0}")]
    Invalid(#[from] EngineError),
}

/// Server configuration.
///
/// Engine settings sit at the top level of the file (`benchmark`,
/// `history_years_floor`, `max_concurrent_optimizations`, ...) with the
/// analytics configuration in an `[engine]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `<TICKER>.csv` price files
    #[serde(default = "default_price_data_dir")]
    pub price_data_dir: String,

    /// Engine settings
    #[serde(flatten, default)]
    pub settings: EngineSettings,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_price_data_dir() -> String {
    "./data/prices".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            price_data_dir: default_price_data_dir(),
            settings: EngineSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or the engine settings
    /// are out of range.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.settings.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.settings.benchmark, "SPY");
        assert_eq!(config.settings.history_years_floor, 3);
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ServerConfig::from_toml("").unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.price_data_dir, "./data/prices");
        assert_eq!(config.settings.frontier_endpoint_points, 50);
    }

    #[test]
    fn test_engine_table() {
        let toml = r#"
            port = 9000
            price_data_dir = "/srv/prices"
            benchmark = "QQQ"
            history_years_floor = 5
            max_concurrent_optimizations = 2

            [engine]
            risk_free_rate = 0.03
            frontier_points = 20
        "#;
        let config = ServerConfig::from_toml(toml).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.price_data_dir, "/srv/prices");
        assert_eq!(config.settings.benchmark, "QQQ");
        assert_eq!(config.settings.history_years_floor, 5);
        assert_eq!(config.settings.max_concurrent_optimizations, Some(2));
        assert!((config.settings.engine.risk_free_rate - 0.03).abs() < 1e-12);
        assert_eq!(config.settings.engine.frontier_points, 20);
    }

    #[test]
    fn test_shipped_config_parses() {
        let config = ServerConfig::from_toml(include_str!("../../../config/ares.toml")).unwrap();
        assert_eq!(config.port, 8000);
        assert_eq!(config.settings.engine.solver.max_iterations, 500);
        assert_eq!(config.settings.max_concurrent_optimizations, None);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let toml = r#"
            [engine]
            var_confidence = 1.5
        "#;
        assert!(matches!(
            ServerConfig::from_toml(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            ServerConfig::from_toml("port = \"eighty\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
