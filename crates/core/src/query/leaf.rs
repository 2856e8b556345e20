//! Terminal query conditions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A terminal condition in a query tree.
///
/// The kind matters only to the baseline threshold: multi-term and point
/// leaves are costly to evaluate, while term and match-all style leaves are
/// cheap enough that caching them is never worth it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Leaf {
    /// Exact term match.
    Term { field: String, text: String },

    /// Documents that have any value for the field.
    FieldExists { field: String },

    /// Matches every document.
    MatchAll,

    /// Matches no document.
    MatchNone,

    /// Lexicographic term range. Open bounds are `None`.
    TermRange {
        field: String,
        #[serde(default)]
        lower: Option<String>,
        #[serde(default)]
        upper: Option<String>,
        #[serde(default = "default_true")]
        include_lower: bool,
        #[serde(default = "default_true")]
        include_upper: bool,
    },

    Prefix { field: String, prefix: String },

    Wildcard { field: String, pattern: String },

    Regexp { field: String, pattern: String },

    Fuzzy {
        field: String,
        text: String,
        #[serde(default = "default_max_edits")]
        max_edits: u8,
    },

    /// Any of a set of terms on one field.
    TermInSet { field: String, terms: Vec<String> },

    /// Inclusive numeric range over indexed points.
    PointRange { field: String, lower: i64, upper: i64 },

    PointInSet { field: String, points: Vec<i64> },
}

fn default_true() -> bool {
    true
}

fn default_max_edits() -> u8 {
    2
}

impl Leaf {
    /// Stable lowercase name of the leaf kind, matching its serialized tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Leaf::Term { .. } => "term",
            Leaf::FieldExists { .. } => "field_exists",
            Leaf::MatchAll => "match_all",
            Leaf::MatchNone => "match_none",
            Leaf::TermRange { .. } => "term_range",
            Leaf::Prefix { .. } => "prefix",
            Leaf::Wildcard { .. } => "wildcard",
            Leaf::Regexp { .. } => "regexp",
            Leaf::Fuzzy { .. } => "fuzzy",
            Leaf::TermInSet { .. } => "term_in_set",
            Leaf::PointRange { .. } => "point_range",
            Leaf::PointInSet { .. } => "point_in_set",
        }
    }

    /// Multi-term and point leaves, which expand to many postings at execution time.
    pub fn is_costly(&self) -> bool {
        matches!(
            self,
            Leaf::TermRange { .. }
                | Leaf::Prefix { .. }
                | Leaf::Wildcard { .. }
                | Leaf::Regexp { .. }
                | Leaf::Fuzzy { .. }
                | Leaf::TermInSet { .. }
                | Leaf::PointRange { .. }
                | Leaf::PointInSet { .. }
        )
    }

    /// Leaves that are already fast enough to never be worth caching.
    pub fn is_cheap(&self) -> bool {
        matches!(self, Leaf::Term { .. } | Leaf::FieldExists { .. } | Leaf::MatchAll | Leaf::MatchNone)
    }
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Term { field, text } => write!(f, "{field}:{text}"),
            Leaf::FieldExists { field } => write!(f, "_exists_:{field}"),
            Leaf::MatchAll => f.write_str("*:*"),
            Leaf::MatchNone => f.write_str("-*:*"),
            Leaf::TermRange { field, lower, upper, include_lower, include_upper } => {
                let open = if *include_lower { '[' } else { '{' };
                let close = if *include_upper { ']' } else { '}' };
                write!(
                    f,
                    "{field}:{open}{} TO {}{close}",
                    lower.as_deref().unwrap_or("*"),
                    upper.as_deref().unwrap_or("*")
                )
            }
            Leaf::Prefix { field, prefix } => write!(f, "{field}:{prefix}*"),
            Leaf::Wildcard { field, pattern } => write!(f, "{field}:{pattern}"),
            Leaf::Regexp { field, pattern } => write!(f, "{field}:/{pattern}/"),
            Leaf::Fuzzy { field, text, max_edits } => write!(f, "{field}:{text}~{max_edits}"),
            Leaf::TermInSet { field, terms } => write!(f, "{field}:({})", terms.join(" ")),
            Leaf::PointRange { field, lower, upper } => write!(f, "{field}:[{lower} TO {upper}]"),
            Leaf::PointInSet { field, points } => {
                let points: Vec<String> = points.iter().map(i64::to_string).collect();
                write!(f, "{field}:{{{}}}", points.join(" "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_costly_and_cheap_are_disjoint() {
        let leaves = [
            Leaf::Term { field: "name".into(), text: "a".into() },
            Leaf::FieldExists { field: "name".into() },
            Leaf::MatchAll,
            Leaf::MatchNone,
            Leaf::Prefix { field: "name".into(), prefix: "ab".into() },
            Leaf::TermInSet { field: "name".into(), terms: vec!["a".into(), "b".into()] },
            Leaf::PointRange { field: "age".into(), lower: 1, upper: 9 },
        ];
        for leaf in &leaves {
            assert!(!(leaf.is_costly() && leaf.is_cheap()), "{leaf} is both costly and cheap");
        }
    }

    #[test]
    fn test_display() {
        let range = Leaf::TermRange {
            field: "name".into(),
            lower: Some("a".into()),
            upper: None,
            include_lower: true,
            include_upper: false,
        };
        assert_eq!(range.to_string(), "name:[a TO *}");
        assert_eq!(Leaf::PointInSet { field: "n".into(), points: vec![1, 2] }.to_string(), "n:{1 2}");
        assert_eq!(Leaf::Prefix { field: "name".into(), prefix: "ab".into() }.to_string(), "name:ab*");
    }

    #[test]
    fn test_deserialize_defaults() {
        let leaf: Leaf = serde_json::from_str(r#"{"kind":"fuzzy","field":"name","text":"abc"}"#).unwrap();
        assert_eq!(leaf, Leaf::Fuzzy { field: "name".into(), text: "abc".into(), max_edits: 2 });

        let leaf: Leaf = serde_json::from_str(r#"{"kind":"match_all"}"#).unwrap();
        assert_eq!(leaf, Leaf::MatchAll);
    }
}
