//! CLI configuration with TOML file support.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error from loading or parsing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Invalid(String),
}

/// Configuration for the coffer client.
///
/// Can be loaded from a TOML file via [`CliConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CliConfig {
    /// JSON-RPC endpoint of the ledger node.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Address of the bank contract.
    #[serde(default)]
    pub contract: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Give up waiting for a confirmation after this many seconds.
    /// The transaction keeps running on the network. 0 waits forever.
    #[serde(default)]
    pub confirmation_timeout_secs: u64,

    /// Interval between confirmation status polls, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_endpoint() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("CliConfig is always serializable to TOML")
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            contract: String::new(),
            log_format: default_log_format(),
            log_level: default_log_level(),
            confirmation_timeout_secs: 0,
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = CliConfig::default();
        let toml_str = config.to_toml_string();
        let parsed = CliConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.endpoint, config.endpoint);
        assert_eq!(parsed.poll_interval_ms, config.poll_interval_ms);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = CliConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.endpoint, "http://127.0.0.1:8545");
        assert_eq!(config.log_format, "human");
        assert_eq!(config.confirmation_timeout_secs, 0);
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = r#"
            endpoint = "http://10.0.0.5:8545"
            confirmation_timeout_secs = 120
        "#;
        let config = CliConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.endpoint, "http://10.0.0.5:8545");
        assert_eq!(config.confirmation_timeout_secs, 120);
        assert_eq!(config.log_format, "human"); // default
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = CliConfig::from_toml_file("/nonexistent/coffer.toml");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
