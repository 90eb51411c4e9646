//! Search index provider trait definition.
//!
//! This module defines the abstract interface over the engine's REST API,
//! allowing for different backend implementations (OpenSearch, Elasticsearch,
//! in-memory test doubles).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchError;
use crate::types::{ClusterHealth, DeleteOutcome, WriteOutcome};

/// Abstracts the underlying search engine transport.
///
/// Implementations are injected into `SearchIndexClient`. They speak raw JSON
/// in the engine's wire format: request bodies are built by the `dsl` module
/// and responses are mapped by the `mapper` module, so a provider only moves
/// requests and responses and classifies statuses.
///
/// All methods return `Result<T, SearchError>`. Network failures and
/// non-success statuses are reported as `SearchError::TransportError`; a
/// missing document is a value (`None`, `DeleteOutcome::NotFound`), not an
/// error.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Create `index`, optionally with settings and mappings.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchError::IndexCreationError)` - If the engine refused (e.g. it already exists)
    async fn create_index(&self, index: &str, body: Option<&Value>) -> Result<(), SearchError>;

    /// Check whether `index` exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError>;

    /// Add field mappings to an existing index.
    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), SearchError>;

    /// Delete `index` and all of its documents.
    ///
    /// A missing index yields `Ok(DeleteOutcome::NotFound)`.
    async fn delete_index(&self, index: &str) -> Result<DeleteOutcome, SearchError>;

    /// Make recent writes to `index` visible to search.
    async fn refresh(&self, index: &str) -> Result<(), SearchError>;

    /// Store `document` under `id`, replacing any existing document.
    ///
    /// # Returns
    ///
    /// * `Ok(WriteOutcome::Created)` - If no document existed under `id`
    /// * `Ok(WriteOutcome::Updated)` - If an existing document was replaced
    /// * `Err(SearchError)` - If the engine rejected the document or the request failed
    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
    ) -> Result<WriteOutcome, SearchError>;

    /// Fetch the `_source` of the document stored under `id`.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(source))` - If the document exists
    /// * `Ok(None)` - If the index has no such document
    /// * `Err(SearchError::IndexNotFound)` - If the index itself is missing
    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Value>, SearchError>;

    /// Delete the document stored under `id`.
    ///
    /// A missing document yields `Ok(DeleteOutcome::NotFound)`.
    async fn delete_document(&self, index: &str, id: &str) -> Result<DeleteOutcome, SearchError>;

    /// Submit pre-framed bulk lines in one request and return the raw response.
    ///
    /// Item-level failures are part of the response; only a failure of the
    /// exchange itself is an error.
    async fn bulk(&self, lines: Vec<Value>) -> Result<Value, SearchError>;

    /// Run a search with a pre-built body and return the raw response.
    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchError>;

    /// Report cluster name and health status.
    async fn health_check(&self) -> Result<ClusterHealth, SearchError>;
}
