//! Loading emitter configuration from TOML or JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::debug::DebugConfig;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML could not be parsed into a config
    #[cfg(feature = "toml")]
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON could not be parsed into a config
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The config parsed but failed validation
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Specialized Result type for config loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level emitter configuration.
///
/// ```toml
/// [debug]
/// name = "ui-events"
/// enabled = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeraldConfig {
    /// Debug logging settings applied to emitters built from this config
    pub debug: DebugConfig,
}

impl HeraldConfig {
    /// Parse and validate a TOML document.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(source: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.debug.name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "debug.name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
