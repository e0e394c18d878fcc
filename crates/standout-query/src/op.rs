//! Comparison operators for field clauses.
//!
//! The [`Op`] enum defines the operators a [`FieldClause`](crate::FieldClause)
//! can apply to a JSON field. Not all operators are valid for all value types.

use std::cmp::Ordering;

/// Comparison operator for a field clause.
///
/// Operators are grouped by the values they support:
/// - **Universal**: `Eq`, `Ne`, `Exists`
/// - **String**: `StartsWith`, `EndsWith`, `Contains`, `Regex`
/// - **Ordered scalars**: `Gt`, `Gte`, `Lt`, `Lte`
/// - **Set**: `In`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    // Universal operators
    /// Equal. Scalars compare by value, composites structurally.
    Eq,
    /// Not equal.
    Ne,
    /// Field is present (may be `null`).
    Exists,

    // String operators
    /// String starts with prefix.
    StartsWith,
    /// String ends with suffix.
    EndsWith,
    /// String contains substring.
    Contains,
    /// String matches regular expression.
    Regex,

    // Ordering operators
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lte,

    // Set operators
    /// Value is one of the given set.
    In,
}

impl Op {
    /// Returns `true` if this operator only applies to strings.
    pub fn is_string_op(self) -> bool {
        matches!(
            self,
            Op::StartsWith | Op::EndsWith | Op::Contains | Op::Regex
        )
    }

    /// Returns `true` if this operator is evaluated from an [`Ordering`].
    pub fn is_ordering_op(self) -> bool {
        matches!(self, Op::Eq | Op::Ne | Op::Gt | Op::Gte | Op::Lt | Op::Lte)
    }

    /// Evaluates a comparison given an ordering result.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Ne => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
            _ => false,
        }
    }

    /// Returns the display name of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Exists => "exists",
            Op::StartsWith => "startswith",
            Op::EndsWith => "endswith",
            Op::Contains => "contains",
            Op::Regex => "regex",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::In => "in",
        }
    }
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
