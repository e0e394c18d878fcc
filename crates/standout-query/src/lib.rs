//! Query - SQL-style query builder for in-memory collections.
//!
//! Query provides a chainable API mirroring SQL clauses over in-memory
//! sequences of [`serde_json::Value`]s, for ad-hoc querying without a
//! database engine. It supports:
//!
//! - SELECT projection, with an identity default
//! - FROM over one sequence, or the cartesian join of two
//! - WHERE and HAVING with OR-within-call, AND-across-calls composition
//! - Multi-level GROUP BY producing nested groups
//! - ORDER BY with a caller comparator and group-key tie-break
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::{json, Value};
//! use standout_query::{Query, Row};
//!
//! let teachers = vec![
//!     json!({ "id": "1", "name": "Peter" }),
//!     json!({ "id": "2", "name": "Anna" }),
//! ];
//! let students = vec![
//!     json!({ "name": "Michael", "tutor": "1" }),
//!     json!({ "name": "Rose", "tutor": "2" }),
//! ];
//!
//! let rows = Query::new()
//!     .select(|row: &Row| {
//!         let pair = row.to_value();
//!         json!({ "studentName": pair[1]["name"], "teacherName": pair[0]["name"] })
//!     })?
//!     .from_join(teachers, students)?
//!     .filter(|pair: &Value| pair[0]["id"] == pair[1]["tutor"])
//!     .execute();
//!
//! assert_eq!(rows, vec![
//!     json!({ "studentName": "Michael", "teacherName": "Peter" }),
//!     json!({ "studentName": "Rose", "teacherName": "Anna" }),
//! ]);
//! # Ok::<(), standout_query::QueryError>(())
//! ```
//!
//! # Query Semantics
//!
//! `execute` runs the configured stages in a fixed order; unconfigured
//! stages are skipped:
//!
//! ```text
//! FROM (join) → WHERE → GROUP BY → HAVING → ORDER BY → SELECT
//! ```
//!
//! - **FROM** omitted: the result is empty.
//! - **WHERE/HAVING**: `filter_any([a, b])` keeps an item iff `a || b`;
//!   `filter(a).filter(b)` keeps it iff `a && b`. HAVING only tests
//!   top-level groups.
//! - **GROUP BY**: groups keep first-occurrence order. Scalar keys compare by
//!   value, composite keys never merge.
//! - **ORDER BY** under grouping: the comparator sees each group's members;
//!   ties fall back to ascending key order.
//! - **SELECT** omitted: rows are returned as-is, groups rendered as
//!   `[key, [member, ...]]`.
//!
//! SELECT, FROM, GROUP BY and ORDER BY may each be set once per query.
//!
//! # Field Clauses
//!
//! | Builder | Matches when the field |
//! |---------|------------------------|
//! | `eq`, `ne` | equals / differs (numbers compare by value) |
//! | `gt`, `gte`, `lt`, `lte` | orders against a scalar of the same type |
//! | `starts_with`, `ends_with`, `contains`, `regex` | is a matching string |
//! | `in_set` | equals one of the candidates |
//! | `exists` | is present |

mod clause;
mod error;
mod field;
mod group;
mod op;
mod ordering;
mod predicate;
mod query;
mod value;

// Re-export public API
pub use clause::Clause;
pub use error::{QueryError, Result};
pub use field::{ClauseValue, Field, FieldClause};
pub use group::{group_items, same_key, Selector};
pub use op::Op;
pub use ordering::{by_count, by_field, compare_keys, compare_numbers, compare_values, Dir};
pub use predicate::{BoxPredicate, Predicate, PredicateGroups};
pub use query::{query, Comparator, Projector, Query, Source};
pub use value::{field, lookup, Group, Row};
