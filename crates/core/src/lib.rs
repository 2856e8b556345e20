//! Core types for qgate, an adaptive query-cache admission policy.
//!
//! This crate provides:
//! - Query expression trees and shape analysis
//! - Baseline and complexity-adaptive admission thresholds
//! - A usage-frequency tracker that makes the admission decision
//! - Unified error types
//! - Configuration structures

pub mod analyzer;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod policy;
pub mod query;
pub mod tracker;

pub use analyzer::{leaf_count, leaf_count_with_limit};
pub use config::{ConfigError, PolicyConfig};
pub use error::Error;
pub use fingerprint::QueryFingerprint;
pub use policy::{
    AdaptiveThreshold, BaselineThreshold, FrequencyThreshold, QueryCachingPolicy, policy_from_config, threshold_fn,
};
pub use query::{BooleanQuery, Leaf, Occur, Query};
pub use tracker::{Decision, UsageTrackingPolicy};
