//! Configuration for the rotation engine.
//!
//! Load engine tuning from TOML files to adjust the history window, the
//! recency decay and tie-breaking reproducibility without code changes.
//!
//! # Examples
//!
//! ```
//! use rotapair_config::EngineConfig;
//!
//! let config = EngineConfig::from_toml_str(r#"
//!     max_history_entries = 50
//!     bucket_lookback = 3
//!     decay_horizon = 32
//! "#).unwrap();
//!
//! assert_eq!(config.max_history_entries, 50);
//! assert_eq!(config.decay_horizon, 32);
//! ```
//!
//! Use defaults when no file is present:
//!
//! ```
//! use rotapair_config::EngineConfig;
//!
//! let config = EngineConfig::load("engine.toml").unwrap_or_default();
//! assert_eq!(config.max_history_entries, 100);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Engine tuning knobs.
///
/// The defaults mirror the observed behavior of the system the engine was
/// extracted from: a history subscription capped at 100 entries, a
/// three-bucket staleness cutoff, and a steep exponential recency decay.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct EngineConfig {
    /// Most recent history entries the scorer may consider.
    #[serde(default = "default_max_history_entries")]
    pub max_history_entries: usize,

    /// Buckets of history kept when scoring relative to a current bucket.
    #[serde(default = "default_bucket_lookback")]
    pub bucket_lookback: i64,

    /// Exponent ceiling of the recency weight: a co-location `age` buckets
    /// ago weighs `2^(decay_horizon - age)`, saturating to 1 past the
    /// horizon. Must stay below 63 to fit an `i64`.
    #[serde(default = "default_decay_horizon")]
    pub decay_horizon: u32,

    /// Fixed seed for tie-breaking. Leave unset for an independent draw
    /// per call.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

fn default_max_history_entries() -> usize {
    100
}

fn default_bucket_lookback() -> i64 {
    3
}

fn default_decay_horizon() -> u32 {
    40
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_history_entries: default_max_history_entries(),
            bucket_lookback: default_bucket_lookback(),
            decay_horizon: default_decay_horizon(),
            random_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file doesn't exist, contains invalid TOML,
    /// or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for values the engine cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_history_entries == 0 {
            return Err(ConfigError::Invalid(
                "max_history_entries must be at least 1".to_owned(),
            ));
        }
        if self.decay_horizon > 62 {
            return Err(ConfigError::Invalid(format!(
                "decay_horizon {} overflows the repetition score (max 62)",
                self.decay_horizon
            )));
        }
        if self.bucket_lookback < 0 {
            return Err(ConfigError::Invalid(
                "bucket_lookback must not be negative".to_owned(),
            ));
        }
        Ok(())
    }
}
