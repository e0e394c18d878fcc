//! Grouping engine.
//!
//! [`group_items`] partitions a flat item list by the first selector, then
//! recurses into every group's members with the remaining selectors. The
//! result depth equals the number of selectors.
//!
//! Groups appear in first-occurrence order of their key. Keys are compared
//! with [`same_key`], a strict equality: scalars compare by value, while
//! arrays and objects are distinct identities and never merge.

use serde_json::Value;

use crate::ordering::compare_numbers;
use crate::value::{Group, Row};

/// Boxed grouping selector stored by a query.
pub type Selector<'q> = Box<dyn Fn(&Value) -> Value + 'q>;

/// Strict key equality used by grouping.
///
/// `null`, booleans, numbers and strings are equal when their values are.
/// Arrays and objects are never equal to anything, so two structurally equal
/// composite keys still form separate groups.
pub fn same_key(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => {
            compare_numbers(a, b) == Some(std::cmp::Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}

/// Recursively groups items by the given selectors.
///
/// With no selectors the items are returned as plain [`Row::Item`]s.
///
/// # Example
///
/// ```
/// use serde_json::{json, Value};
/// use standout_query::group_items;
///
/// let identity = |v: &Value| v.clone();
/// let rows = group_items(vec![json!(1), json!(2), json!(1)], &[identity]);
///
/// assert_eq!(rows.len(), 2);
/// assert_eq!(rows[0].to_value(), json!([1, [1, 1]]));
/// assert_eq!(rows[1].to_value(), json!([2, [2]]));
/// ```
pub fn group_items<S>(items: Vec<Value>, selectors: &[S]) -> Vec<Row>
where
    S: Fn(&Value) -> Value,
{
    let Some((selector, rest)) = selectors.split_first() else {
        return items.into_iter().map(Row::Item).collect();
    };

    let mut buckets: Vec<(Value, Vec<Value>)> = Vec::new();
    for item in items {
        let key = selector(&item);
        match buckets.iter_mut().find(|(existing, _)| same_key(existing, &key)) {
            Some((_, members)) => members.push(item),
            None => buckets.push((key, vec![item])),
        }
    }

    buckets
        .into_iter()
        .map(|(key, members)| Row::Group(Group::new(key, group_items(members, rest))))
        .collect()
}
