//! Configuration validation rules.
//!
//! This module provides validation logic for `PolicyConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::PolicyConfig;
use thiserror::Error;

const MAX_HISTORY_SIZE: usize = 65_536;
const MAX_DEPTH_LIMIT: u32 = 1024;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl PolicyConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `history_size` is 0 or exceeds 65536
    /// - either minimum frequency is 0
    /// - `compound_discount` would bring the default threshold to 0
    /// - `max_depth` is 0 or exceeds 1024
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_size == 0 {
            return Err(ConfigError::Invalid { field: "history_size".into(), reason: "must be greater than 0".into() });
        }
        if self.history_size > MAX_HISTORY_SIZE {
            return Err(ConfigError::Invalid {
                field: "history_size".into(),
                reason: format!("must not exceed {MAX_HISTORY_SIZE}"),
            });
        }

        if self.costly_min_frequency == 0 {
            return Err(ConfigError::Invalid {
                field: "costly_min_frequency".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.default_min_frequency == 0 {
            return Err(ConfigError::Invalid {
                field: "default_min_frequency".into(),
                reason: "must be at least 1".into(),
            });
        }

        if self.compound_discount >= self.default_min_frequency {
            return Err(ConfigError::Invalid {
                field: "compound_discount".into(),
                reason: "must be smaller than default_min_frequency".into(),
            });
        }

        if self.max_depth == 0 {
            return Err(ConfigError::Invalid { field: "max_depth".into(), reason: "must be greater than 0".into() });
        }
        if self.max_depth > MAX_DEPTH_LIMIT {
            return Err(ConfigError::Invalid {
                field: "max_depth".into(),
                reason: format!("must not exceed {MAX_DEPTH_LIMIT}"),
            });
        }

        if self.costly_min_frequency > self.default_min_frequency {
            tracing::warn!(
                costly_min_frequency = self.costly_min_frequency,
                default_min_frequency = self.default_min_frequency,
                "costly queries need more uses than cheap ones before caching"
            );
        }

        Ok(())
    }
}
