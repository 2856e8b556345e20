//! Usage-frequency tracking and the admission decision.
//!
//! The tracker remembers the fingerprints of recently used query shapes in a
//! bounded window and admits a query to the cache once its shape has been
//! seen at least as often as its threshold requires. Scoring wrappers are
//! stripped first, so a boosted query shares a history with its plain form.
//! Fingerprints stop at the same depth ceiling as the analyzer, so deep
//! trees are tracked without unbounded recursion.

mod ring;

use parking_lot::Mutex;
use serde::Serialize;

use crate::Error;
use crate::analyzer::DEFAULT_MAX_DEPTH;
use crate::fingerprint::QueryFingerprint;
use crate::policy::{FrequencyThreshold, QueryCachingPolicy, should_never_cache};
use crate::query::Query;

pub use ring::FrequencyRingBuffer;

/// Outcome of evaluating one query against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Uses of the query shape in the current window.
    pub frequency: u32,
    /// Required uses, or `None` for queries that are never cached.
    pub min_frequency: Option<u32>,
    pub admitted: bool,
}

/// Query caching policy that admits query shapes once they recur often enough.
pub struct UsageTrackingPolicy<T> {
    threshold: T,
    max_depth: u32,
    history: Mutex<FrequencyRingBuffer>,
}

impl<T: FrequencyThreshold> UsageTrackingPolicy<T> {
    pub fn new(threshold: T, history_size: usize) -> Self {
        Self {
            threshold,
            max_depth: DEFAULT_MAX_DEPTH,
            history: Mutex::new(FrequencyRingBuffer::new(history_size)),
        }
    }

    /// Depth ceiling for fingerprinting.
    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn threshold(&self) -> &T {
        &self.threshold
    }

    /// Identity under which uses of `query` are recorded.
    pub fn fingerprint(&self, query: &Query) -> QueryFingerprint {
        QueryFingerprint::with_limit(query.unwrap_scoring(), self.max_depth)
    }

    /// Uses of the query's shape in the current window.
    pub fn frequency(&self, query: &Query) -> u32 {
        let key = self.fingerprint(query).short();
        self.history.lock().frequency(key)
    }

    /// Evaluate `query` without recording a use.
    ///
    /// # Errors
    ///
    /// Propagates failures of the threshold.
    pub fn evaluate(&self, query: &Query) -> Result<Decision, Error> {
        let query = query.unwrap_scoring();
        if should_never_cache(query) {
            return Ok(Decision { frequency: 0, min_frequency: None, admitted: false });
        }

        let frequency = self.frequency(query);
        let min_frequency = self.threshold.min_frequency_to_cache(query)?;
        let admitted = frequency >= min_frequency;
        tracing::debug!(frequency, min_frequency, admitted, "cache admission");

        Ok(Decision { frequency, min_frequency: Some(min_frequency), admitted })
    }

    /// Forget all recorded uses.
    pub fn clear(&self) {
        self.history.lock().clear();
    }
}

impl<T: FrequencyThreshold> QueryCachingPolicy for UsageTrackingPolicy<T> {
    fn on_use(&self, query: &Query) {
        let query = query.unwrap_scoring();
        if should_never_cache(query) {
            return;
        }
        let key = self.fingerprint(query).short();
        self.history.lock().add(key);
    }

    fn should_cache(&self, query: &Query) -> Result<bool, Error> {
        self.evaluate(query).map(|decision| decision.admitted)
    }
}

impl<T> std::fmt::Debug for UsageTrackingPolicy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let history = self.history.lock();
        f.debug_struct("UsageTrackingPolicy")
            .field("max_depth", &self.max_depth)
            .field("capacity", &history.capacity())
            .field("recorded", &history.len())
            .field("distinct", &history.distinct())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AdaptiveThreshold, BaselineThreshold, threshold_fn};
    use crate::query::{BooleanQuery, Occur};

    fn adaptive_policy(history_size: usize) -> UsageTrackingPolicy<AdaptiveThreshold<BaselineThreshold>> {
        UsageTrackingPolicy::new(AdaptiveThreshold::new(BaselineThreshold::default()), history_size)
    }

    fn boolean(prefix: &str, n: usize) -> Query {
        (0..n).fold(BooleanQuery::builder(), |b, i| b.add(Query::term("name", format!("{prefix}{i}")), Occur::Filter)).build()
    }

    #[test]
    fn test_admitted_after_enough_uses() {
        let policy = adaptive_policy(256);
        let query = boolean("a", 2);
        // Baseline 4 for a compound query, plus 1 for two leaves.
        for _ in 0..4 {
            policy.on_use(&query);
            assert!(!policy.should_cache(&query).unwrap());
        }
        policy.on_use(&query);
        assert!(policy.should_cache(&query).unwrap());
        assert_eq!(policy.frequency(&query), 5);
    }

    #[test]
    fn test_larger_queries_wait_longer() {
        let policy = adaptive_policy(256);
        let small = boolean("s", 2);
        let large = boolean("l", 8);
        for _ in 0..5 {
            policy.on_use(&small);
            policy.on_use(&large);
        }
        assert!(policy.should_cache(&small).unwrap());
        assert!(!policy.should_cache(&large).unwrap());

        for _ in 0..2 {
            policy.on_use(&large);
        }
        assert!(policy.should_cache(&large).unwrap());
    }

    #[test]
    fn test_never_cache_queries_are_not_tracked() {
        let policy = adaptive_policy(256);
        let term = Query::term("name", "a");
        for _ in 0..10 {
            policy.on_use(&term);
        }
        assert_eq!(policy.frequency(&term), 0);
        assert!(!policy.should_cache(&term).unwrap());
        let decision = policy.evaluate(&term).unwrap();
        assert_eq!(decision.min_frequency, None);
    }

    #[test]
    fn test_reordered_and_boosted_queries_share_history() {
        let policy = adaptive_policy(256);
        let ab = BooleanQuery::builder()
            .add(Query::prefix("name", "a"), Occur::Must)
            .add(Query::prefix("name", "b"), Occur::Must)
            .build();
        let ba = BooleanQuery::builder()
            .add(Query::prefix("name", "b"), Occur::Must)
            .add(Query::prefix("name", "a"), Occur::Must)
            .build();
        policy.on_use(&ab);
        policy.on_use(&ba.clone().boosted(2.0));
        policy.on_use(&ab.clone().constant_score());
        assert_eq!(policy.frequency(&ab), 3);
        assert_eq!(policy.frequency(&ba), 3);
    }

    #[test]
    fn test_window_forgets_old_uses() {
        let policy = adaptive_policy(4);
        let costly = Query::prefix("name", "ab");
        policy.on_use(&costly);
        policy.on_use(&costly);
        assert!(policy.should_cache(&costly).unwrap());

        for i in 0..4 {
            policy.on_use(&Query::prefix("name", format!("other{i}")));
        }
        assert_eq!(policy.frequency(&costly), 0);
        assert!(!policy.should_cache(&costly).unwrap());
    }

    #[test]
    fn test_threshold_errors_propagate() {
        let policy = UsageTrackingPolicy::new(
            threshold_fn(|_: &Query| Err(Error::ThresholdFailed("no stats".into()))),
            16,
        );
        let query = Query::prefix("name", "a");
        policy.on_use(&query);
        assert!(matches!(policy.should_cache(&query), Err(Error::ThresholdFailed(_))));
        // Never-cache queries short-circuit before the threshold is consulted.
        assert!(!policy.should_cache(&Query::term("name", "a")).unwrap());
    }

    #[test]
    fn test_clear() {
        let policy = adaptive_policy(16);
        let query = Query::prefix("name", "a");
        policy.on_use(&query);
        policy.clear();
        assert_eq!(policy.frequency(&query), 0);
    }

    #[test]
    fn test_concurrent_use() {
        let policy = adaptive_policy(1024);
        let query = boolean("c", 4);
        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..50 {
                        policy.on_use(&query);
                        let _ = policy.should_cache(&query).unwrap();
                    }
                });
            }
        });
        assert_eq!(policy.frequency(&query), 400);
        assert!(policy.should_cache(&query).unwrap());
    }

    #[test]
    fn test_deep_chain_is_tracked() {
        let mut query = Query::prefix("name", "deep");
        for _ in 0..20_000 {
            query = BooleanQuery::builder().add(query, Occur::Must).build();
        }

        let policy = adaptive_policy(16).with_max_depth(32);
        policy.on_use(&query);
        policy.on_use(&query);
        assert_eq!(policy.frequency(&query), 2);
        let decision = policy.evaluate(&query).unwrap();
        // Baseline 4 for a compound query; the chain has a single leaf.
        assert_eq!(decision.min_frequency, Some(4));
        assert!(!decision.admitted);

        // Take the chain apart iteratively so dropping it stays shallow.
        while let Query::Boolean(mut bq) = query {
            let Some(clause) = bq.clauses.pop() else { break };
            query = clause.query;
        }
    }

    #[test]
    fn test_debug_reports_window() {
        let policy = adaptive_policy(8);
        policy.on_use(&Query::prefix("name", "a"));
        policy.on_use(&Query::prefix("name", "a"));
        policy.on_use(&Query::prefix("name", "b"));
        let debug = format!("{policy:?}");
        assert!(debug.contains("recorded: 3"), "{debug}");
        assert!(debug.contains("distinct: 2"), "{debug}");
    }

    #[test]
    fn test_policy_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<UsageTrackingPolicy<AdaptiveThreshold<BaselineThreshold>>>();
        assert_send_sync::<UsageTrackingPolicy<Box<dyn FrequencyThreshold>>>();
    }
}
