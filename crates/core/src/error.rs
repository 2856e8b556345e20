//! Unified error types for qgate.
//!
//! Display strings carry a stable code prefix so callers can match on the
//! failure class without parsing the message.

use crate::config::ConfigError;

/// Unified error types for the admission policy.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input could not be understood (e.g., a malformed query log line).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// A baseline threshold collaborator failed.
    #[error("THRESHOLD_FAILED: {0}")]
    ThresholdFailed(String),

    /// Configuration could not be loaded or is invalid.
    #[error("CONFIG_ERROR: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Stable machine-readable code for the error class.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::ThresholdFailed(_) => "THRESHOLD_FAILED",
            Error::Config(_) => "CONFIG_ERROR",
        }
    }
}
