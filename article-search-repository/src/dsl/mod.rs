//! Engine query DSL.
//!
//! Translates the engine-neutral request types into the JSON bodies of the
//! Elasticsearch/OpenSearch REST API and parses the bulk response back.

pub mod bulk;
pub mod query;
pub mod search;

pub use bulk::{build_bulk_body, parse_bulk_response};
pub use query::to_dsl;
pub use search::build_search_body;
