//! Error types for the query crate.
//!
//! Evaluating a query never fails; these errors only come from building one.

use thiserror::Error;

/// Errors that can occur when building a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// Operator name or symbol not recognised.
    #[error("unknown comparison operator '{0}'")]
    UnknownOperator(String),
}

/// Result type for query building.
pub type Result<T> = std::result::Result<T, QueryError>;
