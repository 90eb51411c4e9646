//! # Article Search Shared
//!
//! Types shared between the search repository and its callers:
//!
//! - [`document`]: the `Article` record and the `SearchDocument` trait
//! - [`query`]: the composable query tree (`QueryNode`)
//! - [`search`]: search requests, hits and result pages
//! - [`errors`]: query construction errors

pub mod document;
pub mod errors;
pub mod query;
pub mod search;

pub use document::{Article, SearchDocument};
pub use errors::QueryError;
pub use query::{BoolQuery, QueryNode, RangeBounds, RangeBuilder};
pub use search::{
    HighlightOptions, HitFailure, SearchHit, SearchPage, SearchRequest, SortField, SortOrder,
    SourceFilter,
};
