//! Coordinator configuration.
//!
//! Timeouts and identifiers that vary by deployment live here; everything
//! loads from a TOML file with validated defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Tunable parameters of the session coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Bounded wait for the open/close exclusion lock, in milliseconds.
    pub lock_timeout_ms: u64,
    /// Bounded wait for a still capture to deliver, in milliseconds.
    pub capture_timeout_ms: u64,
    /// Page id allowed to read the live light-intensity diagnostic.
    pub diagnostic_page: String,
    /// Directory name under the platform pictures location.
    pub storage_dir: String,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: 2500,
            capture_timeout_ms: 10_000,
            diagnostic_page: "center_align_page".into(),
            storage_dir: "SmartScope".into(),
        }
    }
}

impl CoordinatorConfig {
    /// The open/close lock wait as a `Duration`.
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }

    /// The still-capture wait as a `Duration`.
    pub fn capture_timeout(&self) -> Duration {
        Duration::from_millis(self.capture_timeout_ms)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lock_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout("lock_timeout_ms"));
        }
        if self.capture_timeout_ms == 0 {
            return Err(ConfigError::InvalidTimeout("capture_timeout_ms"));
        }
        if self.diagnostic_page.is_empty() {
            return Err(ConfigError::EmptyDiagnosticPage);
        }
        Ok(())
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: CoordinatorConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("timeout {0} must be non-zero")]
    InvalidTimeout(&'static str),
    #[error("diagnostic page id must not be empty")]
    EmptyDiagnosticPage,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(CoordinatorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let mut config = CoordinatorConfig::default();
        config.lock_timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidTimeout(_))
        ));
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = CoordinatorConfig::default();
        let text = toml::to_string(&config).unwrap();
        let parsed: CoordinatorConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.diagnostic_page, config.diagnostic_page);
        assert_eq!(parsed.lock_timeout_ms, config.lock_timeout_ms);
    }
}
