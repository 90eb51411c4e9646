//! Document types stored in the search index.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A typed record that can be stored in and read back from an index.
///
/// The engine stores documents as schemaless JSON; implementors decide their
/// own shape through serde. `document_id` is the only addressing key used for
/// single-document operations and bulk action lines.
pub trait SearchDocument: Serialize + DeserializeOwned + Send + Sync {
    /// The engine `_id` of this document.
    fn document_id(&self) -> String;
}

/// An article with a numeric identifier, a title and a body.
///
/// Optional fields are omitted from the stored document when `None` and
/// default to `None` when missing on read (e.g. excluded by a source filter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Unique identifier within the index.
    pub id: i64,
    /// Article title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Article body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Article {
    /// Create an article with a title and body.
    pub fn new(id: i64, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }

    /// Create an article with only an identifier.
    pub fn with_id(id: i64) -> Self {
        Self {
            id,
            title: None,
            content: None,
        }
    }

    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the body.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }
}

impl SearchDocument for Article {
    fn document_id(&self) -> String {
        self.id.to_string()
    }
}
