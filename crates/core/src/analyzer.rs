//! Query shape analysis.
//!
//! The leaf count of a query tree is the complexity proxy that the adaptive
//! threshold grows with. Counting is total: every tree yields at least 1, and
//! recursion is bounded by a depth ceiling so pathological trees cannot
//! exhaust the stack.

use crate::query::Query;

/// Depth ceiling used by [`leaf_count`].
pub const DEFAULT_MAX_DEPTH: u32 = 64;

/// Number of terminal conditions reachable from `query`.
pub fn leaf_count(query: &Query) -> u32 {
    leaf_count_with_limit(query, DEFAULT_MAX_DEPTH)
}

/// Like [`leaf_count`], with an explicit depth ceiling.
///
/// A node reached at the ceiling contributes 1 instead of being expanded.
pub fn leaf_count_with_limit(query: &Query, max_depth: u32) -> u32 {
    count(query, 0, max_depth.max(1))
}

fn count(query: &Query, depth: u32, max_depth: u32) -> u32 {
    if depth >= max_depth {
        return 1;
    }

    match query {
        Query::Leaf(_) => 1,
        Query::Boolean(bq) => sum(bq.clauses.iter().map(|clause| &clause.query), depth, max_depth),
        Query::DisjunctionMax(dq) => sum(dq.disjuncts.iter(), depth, max_depth),
        // Scoring wrappers do not use up depth.
        Query::Boost { .. } | Query::ConstantScore(_) => count(query.unwrap_scoring(), depth, max_depth),
        // Children of unknown node kinds are counted, not descended into.
        Query::Opaque(op) => u32::try_from(op.children.len()).unwrap_or(u32::MAX).max(1),
    }
}

fn sum<'a>(children: impl Iterator<Item = &'a Query>, depth: u32, max_depth: u32) -> u32 {
    children.fold(0u32, |acc, child| acc.saturating_add(count(child, depth + 1, max_depth))).max(1)
}
