//! Configuration file support.
//!
//! ```toml
//! [reseed]
//! min_pool_size = 64
//! min_interval_ms = 100
//!
//! [seed_file]
//! path = "seed_file"
//! ```

use crate::accumulator::ReseedPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
    #[error("invalid reseed policy: {0}")]
    InvalidPolicy(String),
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct FortunaConfig {
    #[serde(default)]
    pub reseed: ReseedPolicy,
    #[serde(default)]
    pub seed_file: SeedFileConfig,
}

/// Seed-file location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeedFileConfig {
    /// Path of the seed file; created on first use.
    pub path: PathBuf,
}

impl Default for SeedFileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("seed_file"),
        }
    }
}

impl FortunaConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FortunaConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the reseed thresholds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reseed.min_pool_size == 0 {
            return Err(ConfigError::InvalidPolicy(
                "min_pool_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
