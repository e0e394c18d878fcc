//! Result rows and field access.
//!
//! Items flowing through a query are plain [`serde_json::Value`]s. Once
//! grouping runs, the pipeline works on [`Row`]s: either an item, or a
//! [`Group`] whose members are rows themselves.

use serde_json::Value;

/// A top-level element of a query result before projection.
///
/// Grouping turns a flat list of items into a tree. `Row` is that tree's node
/// type; projection receives one `Row` per top-level element.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use standout_query::{Group, Row};
///
/// let group = Row::Group(Group::new(json!(1), vec![Row::Item(json!(1)), Row::Item(json!(1))]));
/// assert_eq!(group.to_value(), json!([1, [1, 1]]));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// A source item that was not grouped.
    Item(Value),
    /// A group produced by GROUP BY.
    Group(Group),
}

impl Row {
    /// Returns `true` if this row is a group.
    pub fn is_group(&self) -> bool {
        matches!(self, Row::Group(_))
    }

    /// Extracts the item, if this row is one.
    pub fn as_item(&self) -> Option<&Value> {
        match self {
            Row::Item(value) => Some(value),
            Row::Group(_) => None,
        }
    }

    /// Extracts the group, if this row is one.
    pub fn as_group(&self) -> Option<&Group> {
        match self {
            Row::Group(group) => Some(group),
            Row::Item(_) => None,
        }
    }

    /// Returns the group key, if this row is a group.
    pub fn key(&self) -> Option<&Value> {
        self.as_group().map(|group| &group.key)
    }

    /// Renders the row as a JSON value.
    ///
    /// Items render as themselves; groups render as `[key, [member, ...]]`.
    pub fn to_value(&self) -> Value {
        match self {
            Row::Item(value) => value.clone(),
            Row::Group(group) => group.to_value(),
        }
    }

    /// Consumes the row and renders it as a JSON value.
    pub fn into_value(self) -> Value {
        match self {
            Row::Item(value) => value,
            Row::Group(group) => group.into_value(),
        }
    }
}

impl From<Row> for Value {
    fn from(row: Row) -> Self {
        row.into_value()
    }
}

/// A `(key, members)` pair produced by grouping.
///
/// At the deepest grouping level members are [`Row::Item`]s; above it they
/// are nested [`Row::Group`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    /// The grouping key shared by every member.
    pub key: Value,
    /// Members in first-occurrence order.
    pub members: Vec<Row>,
}

impl Group {
    /// Creates a new group.
    pub fn new(key: Value, members: Vec<Row>) -> Self {
        Group { key, members }
    }

    /// Number of direct members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Returns every leaf item under this group, depth first.
    pub fn leaves(&self) -> Vec<&Value> {
        let mut leaves = Vec::new();
        collect_leaves(&self.members, &mut leaves);
        leaves
    }

    /// Renders the members as a JSON array.
    pub fn members_value(&self) -> Value {
        Value::Array(self.members.iter().map(Row::to_value).collect())
    }

    /// Renders the group as `[key, [member, ...]]`.
    pub fn to_value(&self) -> Value {
        Value::Array(vec![self.key.clone(), self.members_value()])
    }

    /// Consumes the group and renders it as `[key, [member, ...]]`.
    pub fn into_value(self) -> Value {
        let members = self.members.into_iter().map(Row::into_value).collect();
        Value::Array(vec![self.key, Value::Array(members)])
    }
}

impl From<Group> for Value {
    fn from(group: Group) -> Self {
        group.into_value()
    }
}

fn collect_leaves<'a>(rows: &'a [Row], out: &mut Vec<&'a Value>) {
    for row in rows {
        match row {
            Row::Item(value) => out.push(value),
            Row::Group(group) => collect_leaves(&group.members, out),
        }
    }
}

/// Looks up a dotted field path inside a value.
///
/// Object segments are matched by key and array segments by index, so
/// `"0.name"` reaches the `name` of the first element of a join pair. An
/// empty path returns the value itself.
///
/// # Example
///
/// ```
/// use serde_json::json;
/// use standout_query::lookup;
///
/// let pair = json!([{ "id": "1" }, { "tutor": "1" }]);
/// assert_eq!(lookup(&pair, "1.tutor"), Some(&json!("1")));
/// assert_eq!(lookup(&pair, "2.tutor"), None);
/// ```
pub fn lookup<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return Some(value);
    }

    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Returns a selector extracting a dotted field path, or `null` when absent.
pub fn field(path: &str) -> impl Fn(&Value) -> Value + '_ {
    move |value: &Value| lookup(value, path).cloned().unwrap_or(Value::Null)
}
