//! Content-addressed query shape identity.
//!
//! Two queries that match the same documents in the same way share a
//! fingerprint: boolean clauses and disjuncts are hashed as multisets, so
//! their order does not matter. Opaque children keep their order since their
//! semantics are unknown. Hashing stops at the analyzer's depth ceiling; a
//! subtree reached there is hashed as a fixed marker.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::analyzer::DEFAULT_MAX_DEPTH;
use crate::query::{Occur, Query};

/// SHA-256 digest of a canonical query shape encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryFingerprint([u8; 32]);

impl QueryFingerprint {
    /// Compute the fingerprint of `query` down to [`DEFAULT_MAX_DEPTH`].
    pub fn of(query: &Query) -> Self {
        Self::with_limit(query, DEFAULT_MAX_DEPTH)
    }

    /// Like [`QueryFingerprint::of`], with an explicit depth ceiling.
    pub fn with_limit(query: &Query, max_depth: u32) -> Self {
        Self(digest(query, 0, max_depth.max(1)))
    }

    /// 64 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// First eight bytes, used as the usage tracker key.
    pub fn short(&self) -> u64 {
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&self.0[..8]);
        u64::from_be_bytes(prefix)
    }
}

impl fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn digest(query: &Query, depth: u32, max_depth: u32) -> [u8; 32] {
    let mut hasher = Sha256::new();
    if depth >= max_depth {
        hasher.update(b"ceiling\n");
        return finish(hasher);
    }

    let depth = depth + 1;
    match query {
        Query::Leaf(leaf) => {
            hasher.update(b"leaf\n");
            hasher.update(leaf.kind_name().as_bytes());
            hasher.update(b"\n");
            hasher.update(leaf.to_string().as_bytes());
        }
        Query::Boolean(bq) => {
            hasher.update(b"bool\n");
            hasher.update(bq.minimum_should_match.to_be_bytes());
            let mut clauses: Vec<[u8; 32]> = bq
                .clauses
                .iter()
                .map(|clause| {
                    let mut clause_hasher = Sha256::new();
                    clause_hasher.update([occur_tag(clause.occur)]);
                    clause_hasher.update(digest(&clause.query, depth, max_depth));
                    finish(clause_hasher)
                })
                .collect();
            clauses.sort_unstable();
            for clause in &clauses {
                hasher.update(clause);
            }
        }
        Query::DisjunctionMax(dq) => {
            hasher.update(b"dismax\n");
            hasher.update(dq.tie_breaker.to_bits().to_be_bytes());
            let mut disjuncts: Vec<[u8; 32]> =
                dq.disjuncts.iter().map(|disjunct| digest(disjunct, depth, max_depth)).collect();
            disjuncts.sort_unstable();
            for disjunct in &disjuncts {
                hasher.update(disjunct);
            }
        }
        Query::Boost { query, boost } => {
            hasher.update(b"boost\n");
            hasher.update(boost.to_bits().to_be_bytes());
            hasher.update(digest(query, depth, max_depth));
        }
        Query::ConstantScore(query) => {
            hasher.update(b"const\n");
            hasher.update(digest(query, depth, max_depth));
        }
        Query::Opaque(op) => {
            hasher.update(b"opaque\n");
            hasher.update(op.name.as_bytes());
            hasher.update(b"\n");
            for child in &op.children {
                hasher.update(digest(child, depth, max_depth));
            }
        }
    }
    finish(hasher)
}

fn finish(hasher: Sha256) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&hasher.finalize());
    out
}

fn occur_tag(occur: Occur) -> u8 {
    match occur {
        Occur::Must => 0,
        Occur::MustNot => 1,
        Occur::Should => 2,
        Occur::Filter => 3,
    }
}
