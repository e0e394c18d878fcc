//! Query builder and executor.
//!
//! The [`Query`] struct collects SQL-style clauses through a chained builder
//! API and runs them with [`Query::execute`].

use std::cmp::Ordering;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, debug_span, trace};

use crate::clause::Clause;
use crate::error::{QueryError, Result};
use crate::group::{group_items, Selector};
use crate::ordering::compare_keys;
use crate::predicate::{Predicate, PredicateGroups};
use crate::value::{Group, Row};

/// Boxed SELECT projector stored by a query.
pub type Projector<'q> = Box<dyn Fn(&Row) -> Value + 'q>;

/// Boxed ORDER BY comparator stored by a query.
pub type Comparator<'q> = Box<dyn Fn(&Value, &Value) -> Ordering + 'q>;

/// The data a query reads from.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// A single ordered sequence of items.
    Rows(Vec<Value>),
    /// Two sequences joined by cartesian product.
    Join(Vec<Value>, Vec<Value>),
}

impl Source {
    /// Number of items the source resolves to.
    pub fn len(&self) -> usize {
        match self {
            Source::Rows(rows) => rows.len(),
            Source::Join(left, right) => left.len() * right.len(),
        }
    }

    /// Returns `true` if the source resolves to no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Materializes the source.
    ///
    /// A join yields `[left, right]` pairs in row-major order: the left
    /// sequence is the outer loop.
    pub fn resolve(self) -> Vec<Value> {
        match self {
            Source::Rows(rows) => rows,
            Source::Join(left, right) => left
                .iter()
                .flat_map(|l| {
                    right
                        .iter()
                        .map(move |r| Value::Array(vec![l.clone(), r.clone()]))
                })
                .collect(),
        }
    }
}

/// A SQL-style query over an in-memory collection.
///
/// Clauses may be configured in any order. SELECT, FROM, GROUP BY and
/// ORDER BY may each be set once; setting one again returns
/// [`QueryError::ClauseMisuse`]. WHERE and HAVING accumulate: predicates
/// passed in one call are OR-combined, separate calls are AND-combined.
///
/// Execution runs the stages in a fixed order:
///
/// ```text
/// FROM (join) → WHERE → GROUP BY → HAVING → ORDER BY → SELECT
/// ```
///
/// # Example
///
/// ```
/// use serde_json::{json, Value};
/// use standout_query::{Field, Query, Row};
///
/// let persons = vec![
///     json!({ "name": "Peter", "profession": "teacher" }),
///     json!({ "name": "Anna", "profession": "scientific" }),
///     json!({ "name": "Rose", "profession": "teacher" }),
/// ];
///
/// let names = Query::new()
///     .select(|row: &Row| row.to_value()["name"].clone())?
///     .from(persons)?
///     .filter(Field::new("profession").eq("teacher"))
///     .execute();
///
/// assert_eq!(names, vec![json!("Peter"), json!("Rose")]);
/// # Ok::<(), standout_query::QueryError>(())
/// ```
pub struct Query<'q> {
    select_set: bool,
    projector: Option<Projector<'q>>,
    source: Option<Source>,
    filters: PredicateGroups<'q, Value>,
    grouping: Option<Vec<Selector<'q>>>,
    having: PredicateGroups<'q, Group>,
    comparator: Option<Comparator<'q>>,
}

/// Creates a new empty query.
///
/// Shorthand for [`Query::new`].
pub fn query<'q>() -> Query<'q> {
    Query::new()
}

impl<'q> Query<'q> {
    /// Creates a new empty query.
    ///
    /// An empty query has no source and so yields no rows.
    pub fn new() -> Self {
        Query {
            select_set: false,
            projector: None,
            source: None,
            filters: PredicateGroups::new(),
            grouping: None,
            having: PredicateGroups::new(),
            comparator: None,
        }
    }

    fn claim(&self, clause: Clause) -> Result<()> {
        if clause.is_single_use() && self.is_set(clause) {
            debug!(%clause, "clause configured twice");
            return Err(QueryError::ClauseMisuse(clause));
        }
        Ok(())
    }

    // ========================================================================
    // SELECT
    // ========================================================================

    /// Sets the projection applied to every top-level row.
    ///
    /// Under GROUP BY the projector receives [`Row::Group`]s; otherwise it
    /// receives [`Row::Item`]s.
    pub fn select<F>(mut self, projector: F) -> Result<Self>
    where
        F: Fn(&Row) -> Value + 'q,
    {
        self.claim(Clause::Select)?;
        self.select_set = true;
        self.projector = Some(Box::new(projector));
        Ok(self)
    }

    /// Marks SELECT as set without a projector (`SELECT *`).
    ///
    /// Rows are returned as-is: items unchanged, groups rendered as
    /// `[key, [member, ...]]`.
    pub fn select_all(mut self) -> Result<Self> {
        self.claim(Clause::Select)?;
        self.select_set = true;
        Ok(self)
    }

    // ========================================================================
    // FROM
    // ========================================================================

    /// Sets a single source sequence.
    pub fn from<I>(self, source: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.claim(Clause::From)?;
        Ok(self.with_source(Source::Rows(collect_values(source))))
    }

    /// Sets the cartesian product of two sequences as the source.
    ///
    /// Each item is the pair `[left, right]`; pairs are enumerated with
    /// `left` as the outer loop.
    pub fn from_join<L, R>(self, left: L, right: R) -> Result<Self>
    where
        L: IntoIterator,
        L::Item: Into<Value>,
        R: IntoIterator,
        R::Item: Into<Value>,
    {
        self.claim(Clause::From)?;
        let source = Source::Join(collect_values(left), collect_values(right));
        Ok(self.with_source(source))
    }

    /// Sets the source from a JSON array.
    ///
    /// Returns [`QueryError::ArgumentType`] if `value` is not an array. The
    /// duplicate-clause check runs first.
    pub fn from_value(self, value: Value) -> Result<Self> {
        self.claim(Clause::From)?;
        match value {
            Value::Array(items) => Ok(self.with_source(Source::Rows(items))),
            _ => Err(QueryError::ArgumentType {
                clause: Clause::From,
                reason: "expected an array of items",
            }),
        }
    }

    /// Sets the source from serializable records.
    pub fn from_serialize<S: Serialize>(self, records: &[S]) -> Result<Self> {
        self.claim(Clause::From)?;
        let items = records
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        Ok(self.with_source(Source::Rows(items)))
    }

    fn with_source(mut self, source: Source) -> Self {
        trace!(items = source.len(), "source configured");
        self.source = Some(source);
        self
    }

    // ========================================================================
    // WHERE
    // ========================================================================

    /// Adds a WHERE predicate, AND-combined with earlier ones.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Predicate<Value> + 'q,
    {
        self.filter_any(Some(predicate))
    }

    /// Adds a group of WHERE predicates combined with OR.
    ///
    /// An empty group (including `None`) is silently ignored.
    pub fn filter_any<I, P>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Predicate<Value> + 'q,
    {
        if !self.filters.push_any(predicates) {
            trace!("empty WHERE group ignored");
        }
        self
    }

    // ========================================================================
    // GROUP BY
    // ========================================================================

    /// Sets the grouping selectors, outermost first.
    ///
    /// Returns [`QueryError::ArgumentType`] if `selectors` is empty.
    pub fn group_by<I, S>(mut self, selectors: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Fn(&Value) -> Value + 'q,
    {
        self.claim(Clause::GroupBy)?;
        let selectors: Vec<Selector<'q>> = selectors
            .into_iter()
            .map(|s| Box::new(s) as Selector<'q>)
            .collect();

        if selectors.is_empty() {
            return Err(QueryError::ArgumentType {
                clause: Clause::GroupBy,
                reason: "at least one grouping selector is required",
            });
        }
        self.grouping = Some(selectors);
        Ok(self)
    }

    // ========================================================================
    // HAVING
    // ========================================================================

    /// Adds a HAVING predicate, AND-combined with earlier ones.
    ///
    /// Only top-level groups are tested; nested groups are never filtered.
    pub fn having<P>(self, predicate: P) -> Self
    where
        P: Predicate<Group> + 'q,
    {
        self.having_any(Some(predicate))
    }

    /// Adds a group of HAVING predicates combined with OR.
    ///
    /// An empty group (including `None`) is silently ignored.
    pub fn having_any<I, P>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Predicate<Group> + 'q,
    {
        if !self.having.push_any(predicates) {
            trace!("empty HAVING group ignored");
        }
        self
    }

    // ========================================================================
    // ORDER BY
    // ========================================================================

    /// Sets the sort comparator.
    ///
    /// Without GROUP BY the comparator receives items. With GROUP BY it
    /// receives the members of two top-level groups as JSON arrays; when it
    /// returns `Equal` the groups are ordered by ascending key.
    pub fn order_by<F>(mut self, comparator: F) -> Result<Self>
    where
        F: Fn(&Value, &Value) -> Ordering + 'q,
    {
        self.claim(Clause::OrderBy)?;
        self.comparator = Some(Box::new(comparator));
        Ok(self)
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns `true` if the clause has been configured.
    ///
    /// WHERE and HAVING count as set once they hold a predicate group.
    pub fn is_set(&self, clause: Clause) -> bool {
        match clause {
            Clause::Select => self.select_set,
            Clause::From => self.source.is_some(),
            Clause::Where => !self.filters.is_empty(),
            Clause::GroupBy => self.grouping.is_some(),
            Clause::Having => !self.having.is_empty(),
            Clause::OrderBy => self.comparator.is_some(),
        }
    }

    /// Returns the configured source, if any.
    pub fn source(&self) -> Option<&Source> {
        self.source.as_ref()
    }

    /// Returns the WHERE predicate groups.
    pub fn filter_groups(&self) -> &PredicateGroups<'q, Value> {
        &self.filters
    }

    /// Returns the HAVING predicate groups.
    pub fn having_groups(&self) -> &PredicateGroups<'q, Group> {
        &self.having
    }

    /// Number of grouping levels (0 without GROUP BY).
    pub fn grouping_depth(&self) -> usize {
        self.grouping.as_ref().map_or(0, Vec::len)
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Runs the query and returns the projected rows.
    ///
    /// Consumes the query. A panic in a caller-supplied function propagates
    /// and no result is produced.
    pub fn execute(self) -> Vec<Value> {
        let Query {
            projector,
            source,
            filters,
            grouping,
            having,
            comparator,
            ..
        } = self;

        let span = debug_span!("query.execute", grouped = grouping.is_some());
        let _enter = span.enter();

        let items = source.map(Source::resolve).unwrap_or_default();
        debug!(rows = items.len(), "source resolved");

        let mut items: Vec<Value> = items
            .into_iter()
            .filter(|item| filters.matches(item))
            .collect();
        debug!(rows = items.len(), "where applied");

        let rows: Vec<Row> = match grouping {
            Some(selectors) => {
                let mut groups = top_level_groups(group_items(items, selectors.as_slice()));
                debug!(groups = groups.len(), depth = selectors.len(), "grouped");

                if !having.is_empty() {
                    groups.retain(|group| having.matches(group));
                    debug!(groups = groups.len(), "having applied");
                }
                if let Some(comparator) = &comparator {
                    groups = order_groups(groups, comparator);
                }
                groups.into_iter().map(Row::Group).collect()
            }
            None => {
                if let Some(comparator) = &comparator {
                    items.sort_by(|a, b| comparator(a, b));
                }
                items.into_iter().map(Row::Item).collect()
            }
        };

        let result: Vec<Value> = match projector {
            Some(projector) => rows.iter().map(projector).collect(),
            None => rows.into_iter().map(Row::into_value).collect(),
        };
        debug!(rows = result.len(), "projected");
        result
    }

    /// Runs the query and deserializes every projected row into `T`.
    pub fn execute_as<T: DeserializeOwned>(self) -> Result<Vec<T>> {
        let rows = self
            .execute()
            .into_iter()
            .map(serde_json::from_value)
            .collect::<serde_json::Result<Vec<T>>>()?;
        Ok(rows)
    }
}

impl Default for Query<'_> {
    fn default() -> Self {
        Query::new()
    }
}

impl std::fmt::Debug for Query<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("select", &self.select_set)
            .field("projector", &self.projector.is_some())
            .field("source", &self.source.as_ref().map(Source::len))
            .field("filters", &self.filters)
            .field("group_by", &self.grouping.as_ref().map(Vec::len))
            .field("having", &self.having)
            .field("order_by", &self.comparator.is_some())
            .finish()
    }
}

fn collect_values<I>(source: I) -> Vec<Value>
where
    I: IntoIterator,
    I::Item: Into<Value>,
{
    source.into_iter().map(Into::into).collect()
}

// Grouping with at least one selector only yields groups at the top level.
fn top_level_groups(rows: Vec<Row>) -> Vec<Group> {
    rows.into_iter()
        .filter_map(|row| match row {
            Row::Group(group) => Some(group),
            Row::Item(_) => None,
        })
        .collect()
}

fn order_groups(groups: Vec<Group>, comparator: &Comparator<'_>) -> Vec<Group> {
    let mut keyed: Vec<(Value, Group)> = groups
        .into_iter()
        .map(|group| (group.members_value(), group))
        .collect();

    keyed.sort_by(|(members_a, a), (members_b, b)| {
        comparator(members_a, members_b).then_with(|| compare_keys(&a.key, &b.key))
    });

    keyed.into_iter().map(|(_, group)| group).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Field;
    use crate::ordering::{by_count, by_field, Dir};
    use serde_json::json;

    fn persons() -> Vec<Value> {
        vec![
            json!({ "name": "Peter", "profession": "teacher", "age": 20, "maritalStatus": "married" }),
            json!({ "name": "Michael", "profession": "teacher", "age": 50, "maritalStatus": "single" }),
            json!({ "name": "Peter", "profession": "teacher", "age": 20, "maritalStatus": "married" }),
            json!({ "name": "Anna", "profession": "scientific", "age": 20, "maritalStatus": "married" }),
            json!({ "name": "Rose", "profession": "scientific", "age": 50, "maritalStatus": "married" }),
            json!({ "name": "Anna", "profession": "scientific", "age": 20, "maritalStatus": "single" }),
            json!({ "name": "Anna", "profession": "politician", "age": 50, "maritalStatus": "married" }),
        ]
    }

    fn profession(row: &Row) -> Value {
        row.to_value()["profession"].clone()
    }

    fn is_teacher(person: &Value) -> bool {
        person["profession"] == "teacher"
    }

    fn identity(value: &Value) -> Value {
        value.clone()
    }

    #[test]
    fn empty_query_returns_nothing() {
        assert!(Query::new().execute().is_empty());
        assert!(query().select_all().unwrap().execute().is_empty());
    }

    #[test]
    fn from_without_select_is_identity() {
        assert_eq!(Query::new().from(persons()).unwrap().execute(), persons());
    }

    #[test]
    fn select_and_from_in_any_order() {
        let a = Query::new()
            .select_all()
            .unwrap()
            .from([1, 2, 3])
            .unwrap()
            .execute();
        let b = Query::new()
            .from([1, 2, 3])
            .unwrap()
            .select_all()
            .unwrap()
            .execute();

        assert_eq!(a, vec![json!(1), json!(2), json!(3)]);
        assert_eq!(a, b);
    }

    #[test]
    fn select_projects_each_item() {
        let result = Query::new()
            .from(persons())
            .unwrap()
            .select(profession)
            .unwrap()
            .execute();

        assert_eq!(
            result,
            vec![
                json!("teacher"),
                json!("teacher"),
                json!("teacher"),
                json!("scientific"),
                json!("scientific"),
                json!("scientific"),
                json!("politician"),
            ]
        );
    }

    #[test]
    fn where_filters_items() {
        let result = Query::new()
            .select(profession)
            .unwrap()
            .from(persons())
            .unwrap()
            .filter(is_teacher)
            .execute();

        assert_eq!(result, vec![json!("teacher"); 3]);
    }

    #[test]
    fn duplicate_single_use_clauses() {
        let err = Query::new().select_all().unwrap().select_all().unwrap_err();
        assert!(matches!(err, QueryError::ClauseMisuse(Clause::Select)));
        assert_eq!(err.to_string(), "Duplicate SELECT");

        let err = Query::new()
            .select_all()
            .unwrap()
            .from(Vec::<Value>::new())
            .unwrap()
            .select(profession)
            .unwrap_err();
        assert!(matches!(err, QueryError::ClauseMisuse(Clause::Select)));

        let err = Query::new()
            .from([1])
            .unwrap()
            .from_join([1], [2])
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate FROM");

        let err = Query::new()
            .group_by([identity])
            .unwrap()
            .group_by([identity])
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate GROUP BY");

        let err = Query::new()
            .order_by(by_field("age", Dir::Asc))
            .unwrap()
            .order_by(by_count(Dir::Asc))
            .unwrap_err();
        assert_eq!(err.to_string(), "Duplicate ORDER BY");
    }

    #[test]
    fn repeated_where_and_having_never_fail() {
        let q = Query::new()
            .filter(is_teacher)
            .filter(is_teacher)
            .having(|g: &Group| g.len() > 1)
            .having(|g: &Group| g.len() > 2);

        assert_eq!(q.filter_groups().len(), 2);
        assert_eq!(q.having_groups().len(), 2);
    }

    #[test]
    fn empty_predicate_groups_are_ignored() {
        let q = Query::new()
            .filter_any(None::<fn(&Value) -> bool>)
            .having_any(Vec::<fn(&Group) -> bool>::new());

        assert!(!q.is_set(Clause::Where));
        assert!(!q.is_set(Clause::Having));
    }

    #[test]
    fn group_by_requires_a_selector() {
        let err = Query::new()
            .group_by(Vec::<fn(&Value) -> Value>::new())
            .unwrap_err();
        assert!(matches!(
            err,
            QueryError::ArgumentType {
                clause: Clause::GroupBy,
                ..
            }
        ));
    }

    #[test]
    fn from_value_rejects_non_arrays() {
        let err = Query::new().from_value(json!({ "a": 1 })).unwrap_err();
        assert!(matches!(
            err,
            QueryError::ArgumentType {
                clause: Clause::From,
                ..
            }
        ));

        let rows = Query::new().from_value(json!([1, 2])).unwrap().execute();
        assert_eq!(rows, vec![json!(1), json!(2)]);
    }

    #[test]
    fn duplicate_check_runs_before_argument_check() {
        let err = Query::new()
            .from([1])
            .unwrap()
            .from_value(json!("not an array"))
            .unwrap_err();
        assert!(matches!(err, QueryError::ClauseMisuse(Clause::From)));
    }

    #[test]
    fn cartesian_join_is_row_major() {
        let rows = Query::new().from_join([1, 2], [4, 5]).unwrap().execute();
        assert_eq!(rows, vec![json!([1, 4]), json!([1, 5]), json!([2, 4]), json!([2, 5])]);
    }

    #[test]
    fn join_with_empty_side_is_empty() {
        let q = Query::new().from_join([1, 2], Vec::<Value>::new()).unwrap();
        assert_eq!(q.source().map(Source::len), Some(0));
        assert!(q.execute().is_empty());
    }

    #[test]
    fn order_without_grouping_is_stable() {
        let rows = Query::new()
            .from(persons())
            .unwrap()
            .order_by(by_field("age", Dir::Desc))
            .unwrap()
            .select(|row: &Row| row.to_value()["name"].clone())
            .unwrap()
            .execute();

        assert_eq!(
            rows,
            vec![
                json!("Michael"),
                json!("Rose"),
                json!("Anna"),
                json!("Peter"),
                json!("Peter"),
                json!("Anna"),
                json!("Anna"),
            ]
        );
    }

    #[test]
    fn grouped_order_breaks_ties_by_key() {
        let rows = Query::new()
            .from([3, 1, 2, 1, 3])
            .unwrap()
            .group_by([identity])
            .unwrap()
            .order_by(by_count(Dir::Desc))
            .unwrap()
            .execute();

        assert_eq!(rows, vec![json!([1, [1, 1]]), json!([3, [3, 3]]), json!([2, [2]])]);
    }

    #[test]
    fn having_without_group_by_is_ignored() {
        let rows = Query::new()
            .from([1, 2])
            .unwrap()
            .having(|_: &Group| false)
            .execute();
        assert_eq!(rows, vec![json!(1), json!(2)]);
    }

    #[test]
    fn select_receives_groups() {
        let rows = Query::new()
            .from(persons())
            .unwrap()
            .group_by([|p: &Value| p["profession"].clone()])
            .unwrap()
            .select(|row: &Row| {
                let group = row.as_group().unwrap();
                json!({ "profession": group.key, "count": group.len() })
            })
            .unwrap()
            .execute();

        assert_eq!(
            rows,
            vec![
                json!({ "profession": "teacher", "count": 3 }),
                json!({ "profession": "scientific", "count": 3 }),
                json!({ "profession": "politician", "count": 1 }),
            ]
        );
    }

    #[test]
    fn field_clauses_mix_with_closures() {
        let rows = Query::new()
            .from(persons())
            .unwrap()
            .filter(Field::new("age").gte(50))
            .filter_any([Field::new("name").eq("Rose"), Field::new("name").eq("Michael")])
            .select(|row: &Row| row.to_value()["name"].clone())
            .unwrap()
            .execute();

        assert_eq!(rows, vec![json!("Michael"), json!("Rose")]);
    }

    #[test]
    fn execute_as_deserializes_rows() {
        #[derive(Debug, serde::Deserialize, PartialEq)]
        struct Person {
            name: String,
            age: u32,
        }

        let people: Vec<Person> = Query::new()
            .from(persons())
            .unwrap()
            .filter(Field::new("name").eq("Rose"))
            .execute_as()
            .unwrap();

        assert_eq!(
            people,
            vec![Person {
                name: "Rose".to_string(),
                age: 50
            }]
        );
    }

    #[test]
    fn execute_as_reports_shape_mismatch() {
        let result: Result<Vec<String>> = Query::new().from([1, 2]).unwrap().execute_as();
        assert!(matches!(result, Err(QueryError::Serialization(_))));
    }

    #[test]
    fn introspection() {
        let q = Query::new()
            .from([1, 2, 3])
            .unwrap()
            .group_by([identity, identity])
            .unwrap();

        assert!(q.is_set(Clause::From));
        assert!(q.is_set(Clause::GroupBy));
        assert!(!q.is_set(Clause::Select));
        assert!(!q.is_set(Clause::OrderBy));
        assert_eq!(q.grouping_depth(), 2);
        assert_eq!(q.source(), Some(&Source::Rows(vec![json!(1), json!(2), json!(3)])));

        let debug = format!("{q:?}");
        assert!(debug.contains("group_by: Some(2)"));
    }
}
