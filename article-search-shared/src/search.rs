//! Search request and result types.

use std::collections::BTreeMap;

use crate::query::QueryNode;

/// Default page size when none is given.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default highlight markers.
pub const DEFAULT_PRE_TAG: &str = "<em>";
pub const DEFAULT_POST_TAG: &str = "</em>";

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Wire name of the direction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// One sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

/// Which stored fields to return with each hit.
///
/// An include list takes precedence over a conflicting exclude; an empty
/// exclude list excludes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFilter {
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
}

impl SourceFilter {
    /// Whether the filter changes nothing.
    pub fn is_empty(&self) -> bool {
        self.includes.is_empty() && self.excludes.is_empty()
    }
}

/// Highlighting options. Tags are opaque strings passed through to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightOptions {
    pub fields: Vec<String>,
    pub pre_tag: String,
    pub post_tag: String,
}

impl HighlightOptions {
    /// Highlight `fields` with the default `<em>` markers.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            pre_tag: DEFAULT_PRE_TAG.to_string(),
            post_tag: DEFAULT_POST_TAG.to_string(),
        }
    }

    /// Use custom markers around matched text.
    pub fn with_tags(mut self, pre_tag: impl Into<String>, post_tag: impl Into<String>) -> Self {
        self.pre_tag = pre_tag.into();
        self.post_tag = post_tag.into();
        self
    }
}

/// A search against a single index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub index: String,
    pub query: QueryNode,
    pub sort: Vec<SortField>,
    pub from: usize,
    pub size: usize,
    pub source: SourceFilter,
    pub highlight: Option<HighlightOptions>,
}

impl SearchRequest {
    /// Search `index` with `query`, first page of default size.
    pub fn new(index: impl Into<String>, query: QueryNode) -> Self {
        Self {
            index: index.into(),
            query,
            sort: Vec::new(),
            from: 0,
            size: DEFAULT_PAGE_SIZE,
            source: SourceFilter::default(),
            highlight: None,
        }
    }

    /// Match every document in `index`.
    pub fn match_all(index: impl Into<String>) -> Self {
        Self::new(index, QueryNode::MatchAll)
    }

    /// Append a sort key. Keys apply in the order they are added.
    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort.push(SortField {
            field: field.into(),
            order,
        });
        self
    }

    /// Zero-based offset of the first hit.
    pub fn from(mut self, from: usize) -> Self {
        self.from = from;
        self
    }

    /// Maximum number of hits; zero returns only the total.
    pub fn size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Restrict returned fields.
    pub fn include_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source.includes = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Drop fields from returned documents.
    pub fn exclude_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.source.excludes = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Request highlighted fragments.
    pub fn highlight(mut self, highlight: HighlightOptions) -> Self {
        self.highlight = Some(highlight);
        self
    }
}

/// A hit mapped back into a typed document.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit<D> {
    /// Index the hit came from.
    pub index: String,
    /// Engine document id.
    pub id: String,
    /// Relevance score, absent when sorting without scores.
    pub score: Option<f64>,
    /// The mapped document.
    pub document: D,
    /// Highlighted fragments per field, in engine order. Fields without a
    /// match have no entry.
    pub highlights: BTreeMap<String, Vec<String>>,
}

/// A hit that could not be mapped into the document type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitFailure {
    pub index: String,
    pub id: String,
    pub reason: String,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage<D> {
    /// Total number of matching documents, independent of pagination.
    pub total: u64,
    /// Mapped hits in engine order.
    pub hits: Vec<SearchHit<D>>,
    /// Hits dropped because their document was malformed.
    pub failures: Vec<HitFailure>,
}

impl<D> SearchPage<D> {
    /// The mapped documents, dropping hit metadata.
    pub fn documents(&self) -> impl Iterator<Item = &D> {
        self.hits.iter().map(|hit| &hit.document)
    }

    /// Ids of the mapped hits.
    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.id.as_str()).collect()
    }
}
