//! Errors raised while building or validating a query tree.

use thiserror::Error;

/// Errors detected in a query before it is sent to the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// A range has conflicting or missing bounds.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// The query tree is structurally malformed.
    #[error("Query syntax error: {0}")]
    Syntax(String),
}

impl QueryError {
    /// Create an invalid range error.
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }

    /// Create a syntax error.
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::Syntax(msg.into())
    }
}
