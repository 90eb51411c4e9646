//! Request and response types for index and bulk operations.

use serde_json::Value;

use crate::errors::{BulkItemError, SearchError};
use crate::mapper;
use article_search_shared::SearchDocument;

/// Result of a single-document lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum GetOutcome<D> {
    /// The document exists.
    Found(D),
    /// No document with that id exists in the index.
    NotFound,
}

impl<D> GetOutcome<D> {
    /// Whether the document was found.
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    /// Convert into an `Option`.
    pub fn into_option(self) -> Option<D> {
        match self {
            Self::Found(document) => Some(document),
            Self::NotFound => None,
        }
    }
}

/// Result of an index (upsert) request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// A new document was stored.
    Created,
    /// An existing document was overwritten.
    Updated,
}

/// Result of a delete request. Deleting something that does not exist is
/// reported, not treated as a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// Kind of a bulk write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Index,
    Delete,
}

impl WriteKind {
    /// Action name used on the bulk action line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Delete => "delete",
        }
    }
}

/// A single write submitted through the bulk API.
///
/// Index operations overwrite any document with the same id.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOperation {
    /// Store `document` under `id`.
    Index {
        index: String,
        id: String,
        document: Value,
    },
    /// Remove the document stored under `id`.
    Delete { index: String, id: String },
}

impl WriteOperation {
    /// Index a raw JSON document.
    pub fn index(index: impl Into<String>, id: impl Into<String>, document: Value) -> Self {
        Self::Index {
            index: index.into(),
            id: id.into(),
            document,
        }
    }

    /// Index a typed document under its own id.
    pub fn index_document<D: SearchDocument>(
        index: impl Into<String>,
        document: &D,
    ) -> Result<Self, SearchError> {
        Ok(Self::Index {
            index: index.into(),
            id: document.document_id(),
            document: mapper::document_to_value(document)?,
        })
    }

    /// Delete the document stored under `id`.
    pub fn delete(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Delete {
            index: index.into(),
            id: id.into(),
        }
    }

    /// The operation kind.
    pub fn kind(&self) -> WriteKind {
        match self {
            Self::Index { .. } => WriteKind::Index,
            Self::Delete { .. } => WriteKind::Delete,
        }
    }

    /// Target index.
    pub fn index_name(&self) -> &str {
        match self {
            Self::Index { index, .. } | Self::Delete { index, .. } => index,
        }
    }

    /// Target document id.
    pub fn id(&self) -> &str {
        match self {
            Self::Index { id, .. } | Self::Delete { id, .. } => id,
        }
    }
}

/// Result of a bulk operation for a single item.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemResult {
    /// Target index.
    pub index: String,
    /// Document id.
    pub id: String,
    /// Operation kind.
    pub kind: WriteKind,
    /// Item status reported by the engine.
    pub status: u16,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Engine result such as `created`, `updated`, `deleted` or `not_found`.
    pub result: Option<String>,
    /// Error if the operation failed.
    pub error: Option<BulkItemError>,
}

/// Summary of a bulk operation with per-item results in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkSummary {
    /// Total number of items in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each item.
    pub results: Vec<BulkItemResult>,
}

impl BulkSummary {
    /// Summary of a batch with no operations.
    pub fn empty() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: 0,
            results: Vec::new(),
        }
    }

    /// Build a summary from item results, counting successes and failures.
    pub fn from_results(results: Vec<BulkItemResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Whether every item succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Whether at least one item failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Errors of the failed items.
    pub fn errors(&self) -> impl Iterator<Item = &BulkItemError> {
        self.results.iter().filter_map(|r| r.error.as_ref())
    }

    /// The submitted operations whose items failed, for a targeted retry.
    ///
    /// `operations` must be the slice that produced this summary; results are
    /// matched by position.
    pub fn failed_operations<'a>(
        &self,
        operations: &'a [WriteOperation],
    ) -> Vec<&'a WriteOperation> {
        self.results
            .iter()
            .zip(operations)
            .filter(|(result, _)| !result.success)
            .map(|(_, operation)| operation)
            .collect()
    }
}

/// Cluster health as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterHealth {
    pub cluster_name: String,
    /// `green`, `yellow` or `red`.
    pub status: String,
}

impl ClusterHealth {
    /// Green and yellow clusters serve reads and writes.
    pub fn is_healthy(&self) -> bool {
        matches!(self.status.as_str(), "green" | "yellow")
    }
}
