//! Baseline admission thresholds.
//!
//! Costly multi-term and point queries are cached after a couple of uses.
//! Everything else waits a little longer, except compound queries, which are
//! cached slightly earlier so that a recurring "A OR B" gets cached as a whole
//! instead of as its parts.

use crate::Error;
use crate::config::PolicyConfig;
use crate::policy::FrequencyThreshold;
use crate::query::Query;

/// The un-adapted threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaselineThreshold {
    pub costly_min_frequency: u32,
    pub default_min_frequency: u32,
    pub compound_discount: u32,
}

impl Default for BaselineThreshold {
    fn default() -> Self {
        Self { costly_min_frequency: 2, default_min_frequency: 5, compound_discount: 1 }
    }
}

impl BaselineThreshold {
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            costly_min_frequency: config.costly_min_frequency,
            default_min_frequency: config.default_min_frequency,
            compound_discount: config.compound_discount,
        }
    }
}

impl FrequencyThreshold for BaselineThreshold {
    fn min_frequency_to_cache(&self, query: &Query) -> Result<u32, Error> {
        let query = query.unwrap_scoring();
        if is_costly(query) {
            return Ok(self.costly_min_frequency.max(1));
        }

        let mut min_frequency = self.default_min_frequency;
        if matches!(query, Query::Boolean(_) | Query::DisjunctionMax(_)) {
            min_frequency = min_frequency.saturating_sub(self.compound_discount);
        }
        Ok(min_frequency.max(1))
    }
}

/// Queries whose execution expands to many postings.
pub fn is_costly(query: &Query) -> bool {
    matches!(query.unwrap_scoring(), Query::Leaf(leaf) if leaf.is_costly())
}

/// Queries that are cheap enough to never be worth caching.
pub fn should_never_cache(query: &Query) -> bool {
    match query.unwrap_scoring() {
        Query::Leaf(leaf) => leaf.is_cheap(),
        Query::Boolean(bq) => bq.clauses.is_empty(),
        Query::DisjunctionMax(dq) => dq.disjuncts.is_empty(),
        Query::Boost { .. } | Query::ConstantScore(_) | Query::Opaque(_) => false,
    }
}
