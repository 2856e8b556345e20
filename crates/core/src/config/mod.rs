//! Policy configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (QGATE_*)
//! 2. TOML config file (explicit path, or QGATE_CONFIG_FILE)
//! 3. Built-in defaults

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::analyzer::DEFAULT_MAX_DEPTH;

mod validation;

pub use validation::ConfigError;

/// Admission policy configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (QGATE_*)
/// 2. TOML config file
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Number of recent query uses remembered by the usage tracker.
    ///
    /// Set via QGATE_HISTORY_SIZE environment variable.
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Baseline threshold for costly (multi-term and point) queries.
    ///
    /// Set via QGATE_COSTLY_MIN_FREQUENCY environment variable.
    #[serde(default = "default_costly_min_frequency")]
    pub costly_min_frequency: u32,

    /// Baseline threshold for every other query.
    ///
    /// Set via QGATE_DEFAULT_MIN_FREQUENCY environment variable.
    #[serde(default = "default_min_frequency")]
    pub default_min_frequency: u32,

    /// Subtracted from the default threshold for boolean and disjunction queries.
    ///
    /// Set via QGATE_COMPOUND_DISCOUNT environment variable.
    #[serde(default = "default_compound_discount")]
    pub compound_discount: u32,

    /// Depth ceiling for query shape analysis.
    ///
    /// Set via QGATE_MAX_DEPTH environment variable.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Raise thresholds with query complexity. When false the baseline is used as is.
    ///
    /// Set via QGATE_ADAPTIVE environment variable.
    #[serde(default = "default_true")]
    pub adaptive: bool,
}

fn default_history_size() -> usize {
    256
}

fn default_costly_min_frequency() -> u32 {
    2
}

fn default_min_frequency() -> u32 {
    5
}

fn default_compound_discount() -> u32 {
    1
}

fn default_max_depth() -> u32 {
    DEFAULT_MAX_DEPTH
}

fn default_true() -> bool {
    true
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            costly_min_frequency: default_costly_min_frequency(),
            default_min_frequency: default_min_frequency(),
            compound_discount: default_compound_discount(),
            max_depth: default_max_depth(),
            adaptive: true,
        }
    }
}

impl PolicyConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `QGATE_`
    /// 2. TOML file from `config_file`, or from `QGATE_CONFIG_FILE` when no path is given
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be parsed
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::LoadFailed(format!("config file not found: {}", path.display())));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Ok(config_path) = std::env::var("QGATE_CONFIG_FILE") {
                    figment = figment.merge(Toml::file(&config_path));
                }
            }
        }

        figment = figment.merge(
            Env::prefixed("QGATE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
