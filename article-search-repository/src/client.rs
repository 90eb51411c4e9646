//! Search index client implementation.
//!
//! This module provides the main client for interacting with the search index.
//! Application code uses this to read, write and delete documents, submit
//! bulk batches and run searches.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::config::{ConnectionConfig, SearchIndexConfig};
use crate::dsl::{build_bulk_body, build_search_body, parse_bulk_response};
use crate::errors::SearchError;
use crate::interfaces::SearchIndexProvider;
use crate::mapper::{document_from_source, document_to_value, map_search_response};
use crate::opensearch::OpenSearchClient;
use crate::types::{
    BulkSummary, ClusterHealth, DeleteOutcome, GetOutcome, WriteOperation, WriteOutcome,
};
use article_search_shared::{SearchDocument, SearchPage, SearchRequest};

/// The main client for interacting with the search index.
/// Application code uses this to read, write, bulk-load and search documents.
///
/// The client holds no mutable state; share it behind an `Arc` to use it from
/// several tasks.
pub struct SearchIndexClient {
    provider: Box<dyn SearchIndexProvider>,
    config: SearchIndexConfig,
}

impl SearchIndexClient {
    /// Create a new SearchIndexClient with default configuration.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexConfig::default(),
        }
    }

    /// Create a new SearchIndexClient with custom configuration.
    pub fn with_config(provider: Box<dyn SearchIndexProvider>, config: SearchIndexConfig) -> Self {
        Self { provider, config }
    }

    /// Connect to the engine described by `connection` and verify it answers.
    ///
    /// A cluster name different from the configured one is logged but not
    /// rejected.
    ///
    /// # Returns
    ///
    /// * `Ok(SearchIndexClient)` - A client backed by OpenSearch
    /// * `Err(SearchError::ConnectionError)` - If the engine is unreachable or its cluster is red
    #[instrument(skip_all, fields(host = %connection.host, port = connection.port))]
    pub async fn open(
        connection: &ConnectionConfig,
        config: SearchIndexConfig,
    ) -> Result<Self, SearchError> {
        let provider = OpenSearchClient::new(connection)?;
        let health = provider
            .health_check()
            .await
            .map_err(|e| SearchError::connection(format!("Health check failed: {}", e)))?;

        if health.cluster_name != connection.cluster_name {
            warn!(
                expected = %connection.cluster_name,
                actual = %health.cluster_name,
                "Connected to a cluster with an unexpected name"
            );
        }
        if !health.is_healthy() {
            return Err(SearchError::connection(format!(
                "Cluster {} is {}",
                health.cluster_name, health.status
            )));
        }

        info!(
            cluster_name = %health.cluster_name,
            status = %health.status,
            "Connected to search engine"
        );
        Ok(Self::with_config(Box::new(provider), config))
    }

    /// Release the client and its connections.
    pub fn close(self) {
        info!("Search index client closed");
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Report cluster name and health status.
    pub async fn health_check(&self) -> Result<ClusterHealth, SearchError> {
        self.provider.health_check().await
    }

    /// Create an index, optionally with settings and mappings.
    ///
    /// Input: index name, optional body such as `IndexConfig::article_index_body()`
    /// Output: Result<(), SearchError>
    #[instrument(skip(self, body))]
    pub async fn create_index(&self, index: &str, body: Option<&Value>) -> Result<(), SearchError> {
        validate_index(index)?;
        self.provider.create_index(index, body).await
    }

    /// Create an index unless it already exists.
    ///
    /// Returns `true` when the index was created by this call.
    #[instrument(skip(self, body))]
    pub async fn ensure_index(
        &self,
        index: &str,
        body: Option<&Value>,
    ) -> Result<bool, SearchError> {
        validate_index(index)?;
        if self.provider.index_exists(index).await? {
            debug!(index = %index, "Index already exists");
            return Ok(false);
        }
        self.provider.create_index(index, body).await?;
        Ok(true)
    }

    /// Add field mappings to an existing index.
    pub async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), SearchError> {
        validate_index(index)?;
        self.provider.put_mapping(index, mapping).await
    }

    /// Delete an index and all of its documents.
    pub async fn delete_index(&self, index: &str) -> Result<DeleteOutcome, SearchError> {
        validate_index(index)?;
        self.provider.delete_index(index).await
    }

    /// Make recent writes visible to search.
    pub async fn refresh(&self, index: &str) -> Result<(), SearchError> {
        validate_index(index)?;
        self.provider.refresh(index).await
    }

    /// Store a document under its own id, replacing any previous version.
    /// Input: index name, document
    /// Output: Result<WriteOutcome, SearchError>
    #[instrument(skip(self, document), fields(id = tracing::field::Empty))]
    pub async fn put<D: SearchDocument>(
        &self,
        index: &str,
        document: &D,
    ) -> Result<WriteOutcome, SearchError> {
        let id = document.document_id();
        tracing::Span::current().record("id", id.as_str());
        validate_index(index)?;
        validate_id(&id)?;

        let body = document_to_value(document)?;
        self.provider.index_document(index, &id, &body).await
    }

    /// Fetch the document stored under `id`.
    /// Input: index name, document id
    /// Output: Result<GetOutcome<D>, SearchError>
    #[instrument(skip(self))]
    pub async fn get<D: SearchDocument>(
        &self,
        index: &str,
        id: &str,
    ) -> Result<GetOutcome<D>, SearchError> {
        validate_index(index)?;
        validate_id(id)?;

        match self.provider.get_document(index, id).await? {
            Some(source) => Ok(GetOutcome::Found(document_from_source(&source, index, id)?)),
            None => {
                debug!(index = %index, id = %id, "Document not found");
                Ok(GetOutcome::NotFound)
            }
        }
    }

    /// Delete the document stored under `id`.
    /// Input: index name, document id
    /// Output: Result<DeleteOutcome, SearchError>
    ///
    /// Deleting a missing document is reported as `DeleteOutcome::NotFound`.
    #[instrument(skip(self))]
    pub async fn delete(&self, index: &str, id: &str) -> Result<DeleteOutcome, SearchError> {
        validate_index(index)?;
        validate_id(id)?;
        self.provider.delete_document(index, id).await
    }

    /// Submit a batch of writes in a single bulk request.
    /// Input: operations in submission order
    /// Output: Result<BulkSummary, SearchError>
    ///
    /// Individual failures are reported in the summary and are not retried;
    /// pass the same slice to `BulkSummary::failed_operations` to collect them.
    ///
    /// The batch size is limited by the configured max_batch_size (default: 1000).
    #[instrument(skip(self, operations), fields(total = operations.len()))]
    pub async fn bulk(&self, operations: &[WriteOperation]) -> Result<BulkSummary, SearchError> {
        if operations.is_empty() {
            return Ok(BulkSummary::empty());
        }

        self.validate_batch_size(operations.len())?;

        // Validate all operations
        for operation in operations {
            validate_index(operation.index_name())?;
            validate_id(operation.id())?;
        }

        let response = self.provider.bulk(build_bulk_body(operations)).await?;
        let summary = parse_bulk_response(operations, &response)?;

        for error in summary.errors() {
            warn!(
                index = %error.index,
                id = %error.id,
                status = error.status,
                error_type = %error.error_type,
                reason = %error.reason,
                "Bulk item failed"
            );
        }
        info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk request completed"
        );

        Ok(summary)
    }

    /// Index many documents under their own ids in one bulk request.
    pub async fn bulk_index<D: SearchDocument>(
        &self,
        index: &str,
        documents: &[D],
    ) -> Result<BulkSummary, SearchError> {
        validate_index(index)?;
        let operations = documents
            .iter()
            .map(|document| WriteOperation::index_document(index, document))
            .collect::<Result<Vec<_>, _>>()?;
        self.bulk(&operations).await
    }

    /// Run a search and map the hits into typed documents.
    /// Input: SearchRequest (index, query, sort, paging, projection, highlight)
    /// Output: Result<SearchPage<D>, SearchError>
    ///
    /// Query and request errors are raised before anything is sent.
    #[instrument(skip(self, request), fields(index = %request.index))]
    pub async fn search<D: SearchDocument>(
        &self,
        request: &SearchRequest,
    ) -> Result<SearchPage<D>, SearchError> {
        validate_index(&request.index)?;
        let body = build_search_body(request)?;

        let response = self.provider.search(&request.index, &body).await?;
        let page = map_search_response(&response)?;

        debug!(
            total = page.total,
            hits = page.hits.len(),
            failures = page.failures.len(),
            "Search completed"
        );
        Ok(page)
    }
}

fn validate_index(index: &str) -> Result<(), SearchError> {
    if index.trim().is_empty() {
        return Err(SearchError::validation("index is required"));
    }
    Ok(())
}

fn validate_id(id: &str) -> Result<(), SearchError> {
    if id.is_empty() {
        return Err(SearchError::validation("id is required"));
    }
    Ok(())
}
