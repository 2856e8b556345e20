//! Query expression trees.
//!
//! Queries form a closed set of node kinds: terminal [`Leaf`] conditions,
//! boolean and disjunction composites, scoring wrappers, and an opaque node
//! for kinds owned by the host query layer. Trees are immutable once built and
//! (de)serialize to JSON so query logs can be replayed.

mod leaf;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use leaf::Leaf;

/// How a boolean clause participates in matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Occur {
    Must,
    MustNot,
    Should,
    Filter,
}

impl Occur {
    fn prefix(self) -> &'static str {
        match self {
            Occur::Must => "+",
            Occur::MustNot => "-",
            Occur::Should => "",
            Occur::Filter => "#",
        }
    }
}

/// A node of a query expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Leaf(Leaf),
    Boolean(BooleanQuery),
    DisjunctionMax(DisjunctionMaxQuery),
    /// Scales the score of the wrapped query.
    Boost { query: Box<Query>, boost: f32 },
    /// Replaces the score of the wrapped query with a constant.
    ConstantScore(Box<Query>),
    Opaque(OpaqueQuery),
}

/// One clause of a [`BooleanQuery`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BooleanClause {
    pub query: Query,
    pub occur: Occur,
}

/// Boolean combination of clauses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BooleanQuery {
    #[serde(default)]
    pub clauses: Vec<BooleanClause>,
    #[serde(default)]
    pub minimum_should_match: u32,
}

/// "Best of" alternation over disjuncts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DisjunctionMaxQuery {
    #[serde(default)]
    pub disjuncts: Vec<Query>,
    #[serde(default)]
    pub tie_breaker: f32,
}

/// A node kind this crate does not model.
///
/// Only its immediately declared sub-queries are visible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpaqueQuery {
    pub name: String,
    #[serde(default)]
    pub children: Vec<Query>,
}

/// Builder for [`BooleanQuery`].
#[derive(Debug, Default)]
pub struct BooleanQueryBuilder {
    clauses: Vec<BooleanClause>,
    minimum_should_match: u32,
}

impl BooleanQueryBuilder {
    pub fn add(mut self, query: Query, occur: Occur) -> Self {
        self.clauses.push(BooleanClause { query, occur });
        self
    }

    pub fn minimum_should_match(mut self, minimum_should_match: u32) -> Self {
        self.minimum_should_match = minimum_should_match;
        self
    }

    pub fn build(self) -> Query {
        Query::Boolean(BooleanQuery { clauses: self.clauses, minimum_should_match: self.minimum_should_match })
    }
}

impl BooleanQuery {
    pub fn builder() -> BooleanQueryBuilder {
        BooleanQueryBuilder::default()
    }
}

impl Query {
    pub fn term(field: impl Into<String>, text: impl Into<String>) -> Self {
        Query::Leaf(Leaf::Term { field: field.into(), text: text.into() })
    }

    pub fn prefix(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Query::Leaf(Leaf::Prefix { field: field.into(), prefix: prefix.into() })
    }

    pub fn wildcard(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Query::Leaf(Leaf::Wildcard { field: field.into(), pattern: pattern.into() })
    }

    pub fn term_in_set<I, S>(field: impl Into<String>, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Query::Leaf(Leaf::TermInSet { field: field.into(), terms: terms.into_iter().map(Into::into).collect() })
    }

    pub fn point_range(field: impl Into<String>, lower: i64, upper: i64) -> Self {
        Query::Leaf(Leaf::PointRange { field: field.into(), lower, upper })
    }

    pub fn match_all() -> Self {
        Query::Leaf(Leaf::MatchAll)
    }

    /// Disjunction over `disjuncts`, scored by the best match plus `tie_breaker` times the rest.
    pub fn dis_max(disjuncts: Vec<Query>, tie_breaker: f32) -> Self {
        Query::DisjunctionMax(DisjunctionMaxQuery { disjuncts, tie_breaker })
    }

    pub fn opaque(name: impl Into<String>, children: Vec<Query>) -> Self {
        Query::Opaque(OpaqueQuery { name: name.into(), children })
    }

    pub fn boosted(self, boost: f32) -> Self {
        Query::Boost { query: Box::new(self), boost }
    }

    pub fn constant_score(self) -> Self {
        Query::ConstantScore(Box::new(self))
    }

    /// Strip scoring wrappers, which do not change which documents match.
    pub fn unwrap_scoring(&self) -> &Query {
        let mut query = self;
        while let Query::Boost { query: inner, .. } | Query::ConstantScore(inner) = query {
            query = &**inner;
        }
        query
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Query::Leaf(_))
    }
}

impl From<Leaf> for Query {
    fn from(leaf: Leaf) -> Self {
        Query::Leaf(leaf)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Leaf(leaf) => fmt::Display::fmt(leaf, f),
            Query::Boolean(bq) => {
                for (i, clause) in bq.clauses.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    f.write_str(clause.occur.prefix())?;
                    if matches!(clause.query, Query::Boolean(_)) {
                        write!(f, "({})", clause.query)?;
                    } else {
                        write!(f, "{}", clause.query)?;
                    }
                }
                if bq.minimum_should_match > 0 {
                    write!(f, "~{}", bq.minimum_should_match)?;
                }
                Ok(())
            }
            Query::DisjunctionMax(dq) => {
                f.write_str("(")?;
                for (i, disjunct) in dq.disjuncts.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{disjunct}")?;
                }
                f.write_str(")")?;
                if dq.tie_breaker != 0.0 {
                    write!(f, "~{}", dq.tie_breaker)?;
                }
                Ok(())
            }
            Query::Boost { query, boost } => write!(f, "({query})^{boost}"),
            Query::ConstantScore(query) => write!(f, "ConstantScore({query})"),
            Query::Opaque(op) => {
                write!(f, "{}(", op.name)?;
                for (i, child) in op.children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{child}")?;
                }
                f.write_str(")")
            }
        }
    }
}
