//! Condition operation tables and the constants shared by the condition validators

use std::fmt;

/// Fan-out limit of an `and`/`or` node
pub const MAX_SUB_CONDITIONS: usize = 10;

/// Document metadata fields that may never be filtered on
pub const FORBIDDEN_FILTER_FIELDS: [&str; 2] = ["__id", "__routing"];

/// Placeholder naming the aggregated value in a having clause
pub const HAVING_VALUE_FIELD: &str = "__value";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    And,
    Or,
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
    NotIn,
    Like,
    NotLike,
    Prefix,
    NotPrefix,
    Regex,
    Match,
    MatchPhrase,
    Current,
    Range,
    OutRange,
    Between,
    Before,
    Exists,
    NotExists,
    Empty,
    NotEmpty,
}

impl Operation {
    pub const ALL: [Operation; 26] = [
        Self::And,
        Self::Or,
        Self::Eq,
        Self::Neq,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::In,
        Self::NotIn,
        Self::Like,
        Self::NotLike,
        Self::Prefix,
        Self::NotPrefix,
        Self::Regex,
        Self::Match,
        Self::MatchPhrase,
        Self::Current,
        Self::Range,
        Self::OutRange,
        Self::Between,
        Self::Before,
        Self::Exists,
        Self::NotExists,
        Self::Empty,
        Self::NotEmpty,
    ];

    /// Look an operation up in the filter table
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == name)
    }

    /// Look an operation up in the having table, a strict subset of the filter table
    pub fn parse_having(name: &str) -> Option<Self> {
        Self::parse(name).filter(Self::is_having)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::In => "in",
            Self::NotIn => "not_in",
            Self::Like => "like",
            Self::NotLike => "not_like",
            Self::Prefix => "prefix",
            Self::NotPrefix => "not_prefix",
            Self::Regex => "regex",
            Self::Match => "match",
            Self::MatchPhrase => "match_phrase",
            Self::Current => "current",
            Self::Range => "range",
            Self::OutRange => "out_range",
            Self::Between => "between",
            Self::Before => "before",
            Self::Exists => "exists",
            Self::NotExists => "not_exists",
            Self::Empty => "empty",
            Self::NotEmpty => "not_empty",
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    /// Operations whose right-hand side is ignored, so `value_from` is not checked
    pub fn is_value_optional(&self) -> bool {
        matches!(self, Self::Exists | Self::NotExists | Self::Empty | Self::NotEmpty)
    }

    pub fn is_single_value(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::Neq
                | Self::Gt
                | Self::Gte
                | Self::Lt
                | Self::Lte
                | Self::Like
                | Self::NotLike
                | Self::Prefix
                | Self::NotPrefix
                | Self::Regex
                | Self::Match
                | Self::MatchPhrase
                | Self::Current
        )
    }

    pub fn requires_string(&self) -> bool {
        matches!(self, Self::Like | Self::NotLike | Self::Prefix | Self::NotPrefix | Self::Regex)
    }

    pub fn is_having(&self) -> bool {
        matches!(
            self,
            Self::Eq
                | Self::Neq
                | Self::Gt
                | Self::Gte
                | Self::Lt
                | Self::Lte
                | Self::In
                | Self::NotIn
                | Self::Range
                | Self::OutRange
        )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the right-hand side of a comparison comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValueOrigin {
    #[default]
    Const,
    Field,
    User,
}

impl ValueOrigin {
    /// An unset or empty `value_from` means a constant
    pub fn parse(value_from: Option<&str>) -> Option<Self> {
        match value_from.unwrap_or_default() {
            "" | "const" => Some(Self::Const),
            "field" => Some(Self::Field),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}
