//! SQL clause kinds.
//!
//! A [`Clause`] names one stage-configuring builder call. It is used to track
//! which single-use clauses have been set and to label builder errors.

/// One of the SQL-style clauses a [`Query`](crate::Query) can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Clause {
    /// Projection. Settable once.
    Select,
    /// Data source. Settable once.
    From,
    /// Item filter. Repeatable.
    Where,
    /// Grouping selectors. Settable once.
    GroupBy,
    /// Group filter. Repeatable.
    Having,
    /// Sort comparator. Settable once.
    OrderBy,
}

impl Clause {
    /// Returns `true` if the clause may only be configured once per query.
    pub fn is_single_use(self) -> bool {
        matches!(
            self,
            Clause::Select | Clause::From | Clause::GroupBy | Clause::OrderBy
        )
    }

    /// Returns the SQL keyword for this clause.
    pub fn as_str(self) -> &'static str {
        match self {
            Clause::Select => "SELECT",
            Clause::From => "FROM",
            Clause::Where => "WHERE",
            Clause::GroupBy => "GROUP BY",
            Clause::Having => "HAVING",
            Clause::OrderBy => "ORDER BY",
        }
    }
}

impl std::fmt::Display for Clause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
