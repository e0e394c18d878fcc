//! Field clauses: ready-made predicates over dotted field paths.
//!
//! A [`FieldClause`] is a field path, an operator, and a comparison value. It
//! implements [`Predicate`] so it can be passed to `filter`/`filter_any`
//! alongside ordinary closures.

use std::cmp::Ordering;

use regex::Regex;
use serde_json::Value;

use crate::error::Result;
use crate::op::Op;
use crate::ordering::compare_values;
use crate::predicate::Predicate;
use crate::value::lookup;

/// A single field predicate.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use standout_query::{Field, Predicate};
///
/// let adult = Field::new("age").gte(18);
/// assert!(adult.test(&json!({ "age": 20 })));
/// assert!(!adult.test(&json!({ "age": 12 })));
/// assert!(!adult.test(&json!({ "name": "no age" })));
/// ```
#[derive(Debug, Clone)]
pub struct FieldClause {
    /// The dotted field path to compare.
    pub path: String,
    /// The comparison operator.
    pub op: Op,
    /// The value to compare against.
    pub value: ClauseValue,
}

impl FieldClause {
    /// Creates a new clause comparing against a JSON value.
    pub fn new(path: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        FieldClause {
            path: path.into(),
            op,
            value: ClauseValue::Json(value.into()),
        }
    }

    /// Evaluates this clause against an item.
    ///
    /// A missing field never matches, except under [`Op::Exists`] which tests
    /// presence alone. Type mismatches never match.
    pub fn matches(&self, item: &Value) -> bool {
        let field = lookup(item, &self.path);
        if self.op == Op::Exists {
            return field.is_some();
        }
        let Some(field) = field else {
            return false;
        };

        match (&self.value, field) {
            (ClauseValue::Regex(regex), Value::String(s)) => regex.is_match(s),
            (ClauseValue::Set(set), field) => {
                self.op == Op::In && set.iter().any(|candidate| values_equal(field, candidate))
            }
            (ClauseValue::Json(Value::String(pattern)), Value::String(s))
                if self.op.is_string_op() =>
            {
                self.match_string(s, pattern)
            }
            (ClauseValue::Json(expected), field) => self.match_json(field, expected),
            _ => false,
        }
    }

    fn match_string(&self, field: &str, pattern: &str) -> bool {
        match self.op {
            Op::StartsWith => field.starts_with(pattern),
            Op::EndsWith => field.ends_with(pattern),
            Op::Contains => field.contains(pattern),
            _ => false,
        }
    }

    fn match_json(&self, field: &Value, expected: &Value) -> bool {
        match self.op {
            Op::Eq => values_equal(field, expected),
            Op::Ne => !values_equal(field, expected),
            op if op.is_ordering_op() => {
                if field.is_null() || expected.is_null() {
                    return false;
                }
                compare_values(field, expected).is_some_and(|ordering| op.eval_ordering(ordering))
            }
            _ => false,
        }
    }
}

impl Predicate<Value> for FieldClause {
    fn test(&self, item: &Value) -> bool {
        self.matches(item)
    }
}

/// Owned comparison operand stored in a clause.
#[derive(Debug, Clone)]
pub enum ClauseValue {
    /// Single JSON value.
    Json(Value),
    /// Candidate set (for `In` operator).
    Set(Vec<Value>),
    /// Compiled regular expression.
    Regex(Regex),
    /// No operand (for `Exists`).
    None,
}

/// Scalars compare by value (so `3 == 3.0`); composites compare structurally.
fn values_equal(a: &Value, b: &Value) -> bool {
    match compare_values(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => a == b,
    }
}

/// Builder for [`FieldClause`]s on one field path.
///
/// ```
/// use standout_query::Field;
///
/// let clause = Field::new("address.city").starts_with("Lis");
/// assert_eq!(clause.path, "address.city");
/// ```
#[derive(Debug, Clone)]
pub struct Field {
    path: String,
}

impl Field {
    /// Starts a clause on the given dotted path.
    pub fn new(path: impl Into<String>) -> Self {
        Field { path: path.into() }
    }

    fn clause(self, op: Op, value: ClauseValue) -> FieldClause {
        FieldClause {
            path: self.path,
            op,
            value,
        }
    }

    /// Field equals the value.
    pub fn eq(self, value: impl Into<Value>) -> FieldClause {
        self.clause(Op::Eq, ClauseValue::Json(value.into()))
    }

    /// Field does not equal the value.
    pub fn ne(self, value: impl Into<Value>) -> FieldClause {
        self.clause(Op::Ne, ClauseValue::Json(value.into()))
    }

    /// Field is greater than the value.
    pub fn gt(self, value: impl Into<Value>) -> FieldClause {
        self.clause(Op::Gt, ClauseValue::Json(value.into()))
    }

    /// Field is greater than or equal to the value.
    pub fn gte(self, value: impl Into<Value>) -> FieldClause {
        self.clause(Op::Gte, ClauseValue::Json(value.into()))
    }

    /// Field is less than the value.
    pub fn lt(self, value: impl Into<Value>) -> FieldClause {
        self.clause(Op::Lt, ClauseValue::Json(value.into()))
    }

    /// Field is less than or equal to the value.
    pub fn lte(self, value: impl Into<Value>) -> FieldClause {
        self.clause(Op::Lte, ClauseValue::Json(value.into()))
    }

    /// String field starts with the prefix.
    pub fn starts_with(self, prefix: &str) -> FieldClause {
        self.clause(Op::StartsWith, ClauseValue::Json(prefix.into()))
    }

    /// String field ends with the suffix.
    pub fn ends_with(self, suffix: &str) -> FieldClause {
        self.clause(Op::EndsWith, ClauseValue::Json(suffix.into()))
    }

    /// String field contains the substring.
    pub fn contains(self, needle: &str) -> FieldClause {
        self.clause(Op::Contains, ClauseValue::Json(needle.into()))
    }

    /// String field matches the regular expression.
    pub fn regex(self, pattern: &str) -> Result<FieldClause> {
        let regex = Regex::new(pattern)?;
        Ok(self.clause(Op::Regex, ClauseValue::Regex(regex)))
    }

    /// Field equals one of the candidates.
    pub fn in_set<I, V>(self, candidates: I) -> FieldClause
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let set = candidates.into_iter().map(Into::into).collect();
        self.clause(Op::In, ClauseValue::Set(set))
    }

    /// Field is present.
    pub fn exists(self) -> FieldClause {
        self.clause(Op::Exists, ClauseValue::None)
    }
}
