//! Complexity-adaptive admission threshold.
//!
//! Wraps a baseline threshold and adds one required use per doubling of the
//! query's leaf count. A single-leaf query keeps its baseline threshold
//! exactly; large boolean and disjunction trees must recur more often before
//! their results are cached.

use crate::Error;
use crate::analyzer::{DEFAULT_MAX_DEPTH, leaf_count_with_limit};
use crate::policy::FrequencyThreshold;
use crate::query::Query;

/// Extra required uses for a query with `leaves` leaves: `floor(log2(leaves))`.
pub fn complexity_bonus(leaves: u32) -> u32 {
    leaves.max(1).ilog2()
}

/// Baseline threshold raised by query complexity.
///
/// The result is never below the baseline, and never decreases as clauses
/// are added to a query.
#[derive(Debug, Clone)]
pub struct AdaptiveThreshold<B> {
    baseline: B,
    max_depth: u32,
}

impl<B: FrequencyThreshold> AdaptiveThreshold<B> {
    pub fn new(baseline: B) -> Self {
        Self { baseline, max_depth: DEFAULT_MAX_DEPTH }
    }

    /// Depth ceiling for leaf counting.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn baseline(&self) -> &B {
        &self.baseline
    }
}

impl<B: FrequencyThreshold> FrequencyThreshold for AdaptiveThreshold<B> {
    fn min_frequency_to_cache(&self, query: &Query) -> Result<u32, Error> {
        let mut base = self.baseline.min_frequency_to_cache(query)?;
        let leaves = leaf_count_with_limit(query, self.max_depth);
        if base == 0 {
            tracing::warn!(leaves, "baseline threshold returned 0, using 1");
            base = 1;
        }

        let bonus = complexity_bonus(leaves);
        tracing::debug!(leaves, base, bonus, "adaptive cache threshold");

        Ok(base.saturating_add(bonus))
    }
}
