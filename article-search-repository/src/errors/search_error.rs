//! Search error types.
//!
//! This module defines the error types that can occur while talking to the
//! search engine or preparing a request for it.

use article_search_shared::QueryError;
use thiserror::Error;

/// Errors that can occur during search engine operations.
///
/// A missing document is not an error: lookups and deletes report it through
/// `GetOutcome::NotFound` and `DeleteOutcome::NotFound`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    /// Failed to set up the connection to the search engine.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// The request did not complete or the engine answered with a failure status.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The query tree is structurally malformed.
    #[error("Query syntax error: {0}")]
    QuerySyntaxError(String),

    /// A range query has conflicting or missing bounds.
    #[error("Invalid range: {0}")]
    InvalidRangeError(String),

    /// A stored document does not match the expected shape.
    #[error("Malformed document: {0}")]
    MalformedDocumentError(String),

    /// The request was rejected before being sent (e.g. empty index or id).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },

    /// The addressed index does not exist.
    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// Failed to create the search index.
    #[error("Index creation error: {0}")]
    IndexCreationError(String),

    /// Failed to serialize data for the search engine.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Failed to parse response from search engine.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl SearchError {
    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a transport error for a non-success engine status.
    pub fn engine_status(operation: &str, status: u16, body: &str) -> Self {
        Self::TransportError(format!(
            "{} failed with status {}: {}",
            operation, status, body
        ))
    }

    /// Create a query syntax error.
    pub fn query_syntax(msg: impl Into<String>) -> Self {
        Self::QuerySyntaxError(msg.into())
    }

    /// Create a malformed document error naming the offending document.
    pub fn malformed_document(index: &str, id: &str, reason: impl std::fmt::Display) -> Self {
        Self::MalformedDocumentError(format!("index={}, id={}: {}", index, id, reason))
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Create an index creation error.
    pub fn index_creation(msg: impl Into<String>) -> Self {
        Self::IndexCreationError(msg.into())
    }

    /// Create a serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Whether the error was raised before anything was sent to the engine.
    pub fn is_pre_flight(&self) -> bool {
        matches!(
            self,
            Self::QuerySyntaxError(_)
                | Self::InvalidRangeError(_)
                | Self::ValidationError(_)
                | Self::BatchSizeExceeded { .. }
                | Self::SerializationError(_)
        )
    }
}

impl From<QueryError> for SearchError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidRange(msg) => Self::InvalidRangeError(msg),
            QueryError::Syntax(msg) => Self::QuerySyntaxError(msg),
        }
    }
}

impl From<opensearch::Error> for SearchError {
    fn from(err: opensearch::Error) -> Self {
        Self::TransportError(err.to_string())
    }
}
