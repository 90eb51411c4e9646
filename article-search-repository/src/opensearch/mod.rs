//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend, plus the article index layout.

mod client;
mod index_config;

pub use client::OpenSearchClient;
pub use index_config::{article_mappings, IndexConfig, DEFAULT_INDEX_NAME};
