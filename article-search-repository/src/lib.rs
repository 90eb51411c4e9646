//! # Article Search Repository
//!
//! This crate provides the client side of an article search service: typed
//! single-document CRUD, bulk writes with per-item outcomes, and paginated
//! searches over an OpenSearch/Elasticsearch index.
//!
//! - [`client`]: `SearchIndexClient`, the entry point for application code
//! - [`interfaces`]: the `SearchIndexProvider` transport trait
//! - [`opensearch`]: the OpenSearch-backed provider and index layout
//! - [`dsl`]: engine request bodies (queries, searches, bulk framing)
//! - [`mapper`]: engine responses back into typed documents

pub mod client;
pub mod config;
pub mod dsl;
pub mod errors;
pub mod interfaces;
pub mod mapper;
pub mod opensearch;
pub mod types;

pub use client::SearchIndexClient;
pub use config::{ConnectionConfig, Credentials, SearchIndexConfig};
pub use errors::{BulkItemError, SearchError};
pub use interfaces::SearchIndexProvider;
pub use opensearch::{article_mappings, IndexConfig, OpenSearchClient, DEFAULT_INDEX_NAME};
pub use types::{
    BulkItemResult, BulkSummary, ClusterHealth, DeleteOutcome, GetOutcome, WriteKind,
    WriteOperation, WriteOutcome,
};
