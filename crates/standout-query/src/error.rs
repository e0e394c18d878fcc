//! Error types for the query crate.

use thiserror::Error;

use crate::clause::Clause;

/// Errors raised while building or materializing a query.
///
/// Builder errors are returned from the offending clause call itself, never
/// deferred to [`Query::execute`](crate::Query::execute).
#[derive(Debug, Error)]
pub enum QueryError {
    /// A single-use clause (SELECT, FROM, GROUP BY, ORDER BY) was set twice.
    #[error("Duplicate {0}")]
    ClauseMisuse(Clause),

    /// A clause received an argument it cannot use.
    #[error("invalid argument for {clause}: {reason}")]
    ArgumentType {
        clause: Clause,
        reason: &'static str,
    },

    /// Invalid regular expression pattern in a field clause.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// Records could not be converted to or from JSON values.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
