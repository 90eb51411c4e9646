//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client. The same REST contract is served by
//! Elasticsearch 7.x, so the provider works against either engine.

use std::fmt;

use async_trait::async_trait;
use opensearch::{
    auth::Credentials as AuthCredentials,
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::response::Response,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{
        IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts, IndicesPutMappingParts,
        IndicesRefreshParts,
    },
    BulkParts, DeleteParts, GetParts, IndexParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};

use crate::config::ConnectionConfig;
use crate::errors::SearchError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{ClusterHealth, DeleteOutcome, WriteOutcome};

const INDEX_NOT_FOUND: &str = "index_not_found_exception";

/// OpenSearch client implementation.
///
/// Holds a single-node connection pool; the transport applies the configured
/// per-request timeout and credentials.
///
/// # Example
///
/// ```ignore
/// use article_search_repository::config::ConnectionConfig;
/// let provider = OpenSearchClient::new(&ConnectionConfig::new("127.0.0.1", 9200))?;
/// let source = provider.get_document("article_index", "1").await?;
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client for the configured engine.
    ///
    /// No request is sent; use `health_check` to verify the connection.
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchError::ConnectionError)` - If the address is invalid or the transport
    ///   cannot be built
    pub fn new(config: &ConnectionConfig) -> Result<Self, SearchError> {
        let url = config.url()?;

        let conn_pool = SingleNodeConnectionPool::new(url.clone());
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.request_timeout);
        if let Some(credentials) = &config.credentials {
            builder = builder.auth(AuthCredentials::Basic(
                credentials.username.clone(),
                credentials.password.clone(),
            ));
        }
        let transport = builder
            .build()
            .map_err(|e| SearchError::connection(e.to_string()))?;

        info!(
            url = %url,
            cluster_name = %config.cluster_name,
            timeout_ms = config.request_timeout.as_millis() as u64,
            "Created OpenSearch client"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }
}

/// Read status and body. A body that cannot be read is a transport error.
async fn read_response(response: Response) -> Result<(u16, Value), SearchError> {
    let status = response.status_code().as_u16();
    decode_body(status, response.text().await)
}

/// Non-JSON bodies are kept as a string.
fn decode_body<E: fmt::Display>(
    status: u16,
    text: Result<String, E>,
) -> Result<(u16, Value), SearchError> {
    let text = text.map_err(|e| {
        error!(status = status, error = %e, "Failed to read response body");
        SearchError::transport(format!("Failed to read response body: {}", e))
    })?;
    let body = serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text));
    Ok((status, body))
}

fn error_type(body: &Value) -> Option<&str> {
    body.get("error")
        .and_then(|e| e.get("type"))
        .and_then(Value::as_str)
}

fn is_index_not_found(body: &Value) -> bool {
    error_type(body) == Some(INDEX_NOT_FOUND)
}

fn engine_failure(operation: &str, status: u16, body: &Value) -> SearchError {
    error!(operation = %operation, status = status, body = %body, "Request failed");
    SearchError::engine_status(operation, status, &body.to_string())
}

fn classify_get(index: &str, status: u16, body: Value) -> Result<Option<Value>, SearchError> {
    match status {
        200 => body
            .get("_source")
            .cloned()
            .map(Some)
            .ok_or_else(|| SearchError::parse("get response has no _source")),
        404 if is_index_not_found(&body) => Err(SearchError::IndexNotFound(index.to_string())),
        404 => Ok(None),
        _ => Err(engine_failure("Get", status, &body)),
    }
}

fn classify_write(status: u16, body: &Value) -> Result<WriteOutcome, SearchError> {
    match status {
        200 | 201 => match body.get("result").and_then(Value::as_str) {
            Some("created") => Ok(WriteOutcome::Created),
            Some(_) => Ok(WriteOutcome::Updated),
            None if status == 201 => Ok(WriteOutcome::Created),
            None => Ok(WriteOutcome::Updated),
        },
        _ => Err(engine_failure("Index", status, body)),
    }
}

fn classify_delete(index: &str, status: u16, body: &Value) -> Result<DeleteOutcome, SearchError> {
    match status {
        200 => Ok(DeleteOutcome::Deleted),
        404 if is_index_not_found(body) => Err(SearchError::IndexNotFound(index.to_string())),
        404 => Ok(DeleteOutcome::NotFound),
        _ => Err(engine_failure("Delete", status, body)),
    }
}

fn parse_health(body: &Value) -> Result<ClusterHealth, SearchError> {
    let field = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| SearchError::parse(format!("health response has no {}", key)))
    };
    Ok(ClusterHealth {
        cluster_name: field("cluster_name")?,
        status: field("status")?,
    })
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    #[instrument(skip(self, body))]
    async fn create_index(&self, index: &str, body: Option<&Value>) -> Result<(), SearchError> {
        let body = body.cloned().unwrap_or_else(|| json!({}));
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(body)
            .send()
            .await?;

        let (status, body) = read_response(response).await?;
        if !(200..300).contains(&status) {
            error!(status = status, body = %body, "Create index request failed");
            return Err(SearchError::index_creation(format!(
                "Create index {} failed with status {}: {}",
                index, status, body
            )));
        }

        info!(index = %index, "Index created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchError::engine_status(
                "Index exists",
                status,
                &response.text().await.unwrap_or_default(),
            )),
        }
    }

    #[instrument(skip(self, mapping))]
    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .put_mapping(IndicesPutMappingParts::Index(&[index]))
            .body(mapping)
            .send()
            .await?;

        let (status, body) = read_response(response).await?;
        match status {
            200..=299 => {
                debug!(index = %index, "Mapping updated");
                Ok(())
            }
            404 if is_index_not_found(&body) => Err(SearchError::IndexNotFound(index.to_string())),
            _ => Err(engine_failure("Put mapping", status, &body)),
        }
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<DeleteOutcome, SearchError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await?;

        let (status, body) = read_response(response).await?;
        match status {
            200 => {
                info!(index = %index, "Index deleted");
                Ok(DeleteOutcome::Deleted)
            }
            404 => Ok(DeleteOutcome::NotFound),
            _ => Err(engine_failure("Delete index", status, &body)),
        }
    }

    #[instrument(skip(self))]
    async fn refresh(&self, index: &str) -> Result<(), SearchError> {
        let response = self
            .client
            .indices()
            .refresh(IndicesRefreshParts::Index(&[index]))
            .send()
            .await?;

        let (status, body) = read_response(response).await?;
        match status {
            200..=299 => Ok(()),
            404 if is_index_not_found(&body) => Err(SearchError::IndexNotFound(index.to_string())),
            _ => Err(engine_failure("Refresh", status, &body)),
        }
    }

    #[instrument(skip(self, document))]
    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
    ) -> Result<WriteOutcome, SearchError> {
        let response = self
            .client
            .index(IndexParts::IndexId(index, id))
            .body(document)
            .send()
            .await?;

        let (status, body) = read_response(response).await?;
        let outcome = classify_write(status, &body)?;

        debug!(index = %index, id = %id, outcome = ?outcome, "Document indexed");
        Ok(outcome)
    }

    #[instrument(skip(self))]
    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Value>, SearchError> {
        let response = self
            .client
            .get(GetParts::IndexId(index, id))
            .send()
            .await?;

        let (status, body) = read_response(response).await?;
        classify_get(index, status, body)
    }

    #[instrument(skip(self))]
    async fn delete_document(&self, index: &str, id: &str) -> Result<DeleteOutcome, SearchError> {
        let response = self
            .client
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await?;

        let (status, body) = read_response(response).await?;
        let outcome = classify_delete(index, status, &body)?;

        debug!(index = %index, id = %id, outcome = ?outcome, "Document delete completed");
        Ok(outcome)
    }

    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    async fn bulk(&self, lines: Vec<Value>) -> Result<Value, SearchError> {
        let body: Vec<JsonBody<Value>> = lines.into_iter().map(JsonBody::from).collect();

        let response = self.client.bulk(BulkParts::None).body(body).send().await?;

        let (status, body) = read_response(response).await?;
        if !(200..300).contains(&status) {
            return Err(engine_failure("Bulk", status, &body));
        }
        Ok(body)
    }

    #[instrument(skip(self, body))]
    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchError> {
        let response = self
            .client
            .search(SearchParts::Index(&[index]))
            .body(body)
            .send()
            .await?;

        let (status, body) = read_response(response).await?;
        match status {
            200..=299 => Ok(body),
            404 if is_index_not_found(&body) => Err(SearchError::IndexNotFound(index.to_string())),
            _ => Err(engine_failure("Search", status, &body)),
        }
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<ClusterHealth, SearchError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await?;

        let (status, body) = read_response(response).await?;
        if !(200..300).contains(&status) {
            return Err(engine_failure("Cluster health", status, &body));
        }
        parse_health(&body)
    }
}
