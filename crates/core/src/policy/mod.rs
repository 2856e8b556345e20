//! Cache-admission thresholds and policies.
//!
//! A [`FrequencyThreshold`] answers one question: how many times must a query
//! shape be seen before its results may be cached. [`BaselineThreshold`] is
//! the un-adapted answer; [`AdaptiveThreshold`] wraps any threshold and raises
//! it with query complexity. A [`QueryCachingPolicy`] combines a threshold with
//! observed usage to make the admission decision.

pub mod adaptive;
pub mod baseline;

use std::sync::Arc;

use crate::Error;
use crate::config::PolicyConfig;
use crate::query::Query;
use crate::tracker::UsageTrackingPolicy;

pub use adaptive::{AdaptiveThreshold, complexity_bonus};
pub use baseline::{BaselineThreshold, is_costly, should_never_cache};

/// Minimum number of observed uses before a query may be cached.
pub trait FrequencyThreshold: Send + Sync {
    /// Returns a threshold of at least 1.
    ///
    /// # Errors
    ///
    /// Implementations backed by external state may fail; callers propagate the error.
    fn min_frequency_to_cache(&self, query: &Query) -> Result<u32, Error>;
}

/// Decides whether a query's results should enter the cache.
pub trait QueryCachingPolicy: Send + Sync {
    /// Record that `query` was executed.
    fn on_use(&self, query: &Query);

    /// Whether `query` has been used often enough to be cached.
    fn should_cache(&self, query: &Query) -> Result<bool, Error>;
}

impl<T: FrequencyThreshold + ?Sized> FrequencyThreshold for Box<T> {
    fn min_frequency_to_cache(&self, query: &Query) -> Result<u32, Error> {
        (**self).min_frequency_to_cache(query)
    }
}

impl<T: FrequencyThreshold + ?Sized> FrequencyThreshold for Arc<T> {
    fn min_frequency_to_cache(&self, query: &Query) -> Result<u32, Error> {
        (**self).min_frequency_to_cache(query)
    }
}

/// Threshold backed by a closure. See [`threshold_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnThreshold<F>(F);

/// Use a closure as a [`FrequencyThreshold`].
pub fn threshold_fn<F>(f: F) -> FnThreshold<F>
where
    F: Fn(&Query) -> Result<u32, Error> + Send + Sync,
{
    FnThreshold(f)
}

impl<F> FrequencyThreshold for FnThreshold<F>
where
    F: Fn(&Query) -> Result<u32, Error> + Send + Sync,
{
    fn min_frequency_to_cache(&self, query: &Query) -> Result<u32, Error> {
        (self.0)(query)
    }
}

/// Build the usage-tracking policy described by `config`.
pub fn policy_from_config(config: &PolicyConfig) -> UsageTrackingPolicy<Box<dyn FrequencyThreshold>> {
    let baseline = BaselineThreshold::from_config(config);
    let threshold: Box<dyn FrequencyThreshold> = if config.adaptive {
        Box::new(AdaptiveThreshold::new(baseline).with_max_depth(config.max_depth))
    } else {
        Box::new(baseline)
    };
    UsageTrackingPolicy::new(threshold, config.history_size).with_max_depth(config.max_depth)
}
