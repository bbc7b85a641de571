//! Engine configuration
//!
//! Every field has a default, so an empty TOML document is a valid config.
//!
//! ```toml
//! profit_rate = "0.90"
//!
//! [retry]
//! max_attempts = 5
//! base_delay_ms = 10
//! max_delay_ms = 200
//! jitter_pct = 0.0
//!
//! [store]
//! max_internal_retries = 3
//! ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use types::money::ProfitRate;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Caller-side retry policy for whole engine operations
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// Fraction of each delay randomised in both directions, `0.0..=1.0`
    pub jitter_pct: f64,
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 10,
            max_delay_ms: 200,
            jitter_pct: 0.0,
        }
    }
}

/// In-memory ledger settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Body re-runs after a commit conflict before the store gives up
    pub max_internal_retries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_internal_retries: 3,
        }
    }
}

/// Stake engine configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub profit_rate: ProfitRate,
    pub retry: RetryConfig,
    pub store: StoreConfig,
}

impl EngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".to_string()));
        }
        if self.retry.max_delay_ms < self.retry.base_delay_ms {
            return Err(ConfigError::Invalid(
                "retry.max_delay_ms must not be below retry.base_delay_ms".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.retry.jitter_pct) {
            return Err(ConfigError::Invalid("retry.jitter_pct must be within 0.0..=1.0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.profit_rate.as_decimal(), Decimal::new(90, 2));
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.store.max_internal_retries, 3);
    }

    #[test]
    fn test_overrides() {
        let raw = r#"
            profit_rate = "0.75"

            [retry]
            max_attempts = 2
            base_delay_ms = 1
            max_delay_ms = 4
        "#;
        let config = EngineConfig::from_toml_str(raw).unwrap();
        assert_eq!(config.profit_rate.as_decimal(), Decimal::new(75, 2));
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.retry.max_delay(), Duration::from_millis(4));
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_negative_profit_rate_rejected() {
        let err = EngineConfig::from_toml_str("profit_rate = \"-0.1\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = EngineConfig::from_toml_str("[retry]\nmax_attempts = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        std::fs::write(&path, "[store]\nmax_internal_retries = 7\n").unwrap();
        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config.store.max_internal_retries, 7);
    }
}
