//! Ordering helpers for ORDER BY comparators and group-key tie-breaks.
//!
//! Provides [`Dir`] for sort direction, [`compare_values`] for scalar JSON
//! values, and ready-made comparators such as [`by_field`].

use std::cmp::Ordering;

use serde_json::{Number, Value};

use crate::value::lookup;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dir {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Dir {
    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Dir::Asc => ordering,
            Dir::Desc => ordering.reverse(),
        }
    }

    /// Returns the display name of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Dir::Asc => "asc",
            Dir::Desc => "desc",
        }
    }
}

impl std::fmt::Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compares two JSON numbers, handling mixed integer and float storage.
pub fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return Some(a.cmp(&b));
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return Some(a.cmp(&b));
    }
    a.as_f64()?.partial_cmp(&b.as_f64()?)
}

/// Compares two scalar values of the same type.
///
/// Returns `None` if the types don't match or either side is an array or an
/// object.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),

        // Null values sort last
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) => Some(Ordering::Greater),
        (_, Value::Null) => Some(Ordering::Less),

        // Type mismatch or composite - cannot compare
        _ => None,
    }
}

/// Compares two group keys for the grouped ORDER BY tie-break.
///
/// Keys of different types are ranked by type first:
/// bool < number < string < array/object < null. Keys of the same type
/// compare by value. Composite keys are `Equal` to each other and keep their
/// grouping order.
pub fn compare_keys(a: &Value, b: &Value) -> Ordering {
    key_rank(a)
        .cmp(&key_rank(b))
        .then_with(|| compare_values(a, b).unwrap_or(Ordering::Equal))
}

fn key_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) | Value::Object(_) => 3,
        Value::Null => 4,
    }
}

/// Returns a comparator ordering items by a dotted field path.
///
/// Missing fields compare like `null` and sort last; incomparable values keep
/// their relative order.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use standout_query::{by_field, Dir, Query};
///
/// let people = vec![json!({ "age": 50 }), json!({ "age": 20 })];
/// let rows = Query::new()
///     .from(people)?
///     .order_by(by_field("age", Dir::Asc))?
///     .execute();
/// assert_eq!(rows, vec![json!({ "age": 20 }), json!({ "age": 50 })]);
/// # Ok::<(), standout_query::QueryError>(())
/// ```
pub fn by_field(path: &str, dir: Dir) -> impl Fn(&Value, &Value) -> Ordering + '_ {
    move |a: &Value, b: &Value| {
        let val_a = lookup(a, path).unwrap_or(&Value::Null);
        let val_b = lookup(b, path).unwrap_or(&Value::Null);
        compare_values(val_a, val_b).map_or(Ordering::Equal, |ordering| dir.apply(ordering))
    }
}

/// Returns a comparator ordering arrays by length.
///
/// Under GROUP BY the comparator receives each group's members as an array,
/// so this orders groups by size. Non-array values count as empty.
pub fn by_count(dir: Dir) -> impl Fn(&Value, &Value) -> Ordering {
    move |a: &Value, b: &Value| dir.apply(array_len(a).cmp(&array_len(b)))
}

fn array_len(value: &Value) -> usize {
    value.as_array().map_or(0, Vec::len)
}
