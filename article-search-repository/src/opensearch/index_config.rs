//! OpenSearch index configuration and mappings.
//!
//! This module defines the index settings and mappings for the article index.

use serde_json::{json, Value};

/// The default name of the article index.
pub const DEFAULT_INDEX_NAME: &str = "article_index";

/// Shard layout of an index.
#[derive(Debug, Clone, Copy)]
pub struct IndexConfig {
    pub number_of_shards: u32,
    pub number_of_replicas: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            number_of_shards: 1,
            number_of_replicas: 1,
        }
    }
}

impl IndexConfig {
    /// Settings and mappings for the article index.
    ///
    /// The configuration includes:
    /// - **id**: `long`, so range queries and numeric sorting work
    /// - **title**/**content**: analyzed `text` with a `keyword` sub-field for
    ///   exact `term`/`terms` lookups (`title.keyword`, `content.keyword`)
    pub fn article_index_body(&self) -> Value {
        json!({
            "settings": {
                "number_of_shards": self.number_of_shards,
                "number_of_replicas": self.number_of_replicas
            },
            "mappings": article_mappings()
        })
    }
}

/// Field mappings for articles.
pub fn article_mappings() -> Value {
    json!({
        "properties": {
            "id": {
                "type": "long"
            },
            "title": {
                "type": "text",
                "fields": {
                    "keyword": {
                        "type": "keyword",
                        "ignore_above": 256
                    }
                }
            },
            "content": {
                "type": "text",
                "fields": {
                    "keyword": {
                        "type": "keyword",
                        "ignore_above": 256
                    }
                }
            }
        }
    })
}
