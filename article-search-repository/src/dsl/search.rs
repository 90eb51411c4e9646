//! Search request body.

use serde_json::{json, Map, Value};

use crate::dsl::query::to_dsl;
use crate::errors::SearchError;
use article_search_shared::{HighlightOptions, SearchRequest, SortField, SourceFilter};

/// Build the body of a `_search` request.
///
/// The body always asks for an exact hit total so `total` is reliable even
/// for pages of size zero.
pub fn build_search_body(request: &SearchRequest) -> Result<Value, SearchError> {
    let mut body = Map::new();
    body.insert("query".to_string(), to_dsl(&request.query)?);
    body.insert("from".to_string(), json!(request.from));
    body.insert("size".to_string(), json!(request.size));
    body.insert("track_total_hits".to_string(), json!(true));

    if !request.sort.is_empty() {
        body.insert("sort".to_string(), build_sort(&request.sort)?);
    }
    if let Some(source) = build_source_filter(&request.source) {
        body.insert("_source".to_string(), source);
    }
    if let Some(highlight) = &request.highlight {
        body.insert("highlight".to_string(), build_highlight(highlight)?);
    }

    Ok(Value::Object(body))
}

fn build_sort(sort: &[SortField]) -> Result<Value, SearchError> {
    sort.iter()
        .map(|key| {
            if key.field.trim().is_empty() {
                return Err(SearchError::query_syntax("sort key requires a field name"));
            }
            Ok(json!({ key.field.as_str(): { "order": key.order.as_str() } }))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

/// Includes win over a conflicting exclude; an empty exclude list is omitted.
fn build_source_filter(filter: &SourceFilter) -> Option<Value> {
    if filter.is_empty() {
        return None;
    }

    let excludes: Vec<&String> = filter
        .excludes
        .iter()
        .filter(|field| !filter.includes.contains(field))
        .collect();

    let mut source = Map::new();
    if !filter.includes.is_empty() {
        source.insert("includes".to_string(), json!(filter.includes));
    }
    if !excludes.is_empty() {
        source.insert("excludes".to_string(), json!(excludes));
    }
    (!source.is_empty()).then_some(Value::Object(source))
}

fn build_highlight(highlight: &HighlightOptions) -> Result<Value, SearchError> {
    if highlight.fields.is_empty() {
        return Err(SearchError::query_syntax(
            "highlight requires at least one field",
        ));
    }

    let fields: Map<String, Value> = highlight
        .fields
        .iter()
        .map(|field| (field.clone(), json!({})))
        .collect();

    Ok(json!({
        "pre_tags": [highlight.pre_tag],
        "post_tags": [highlight.post_tag],
        "fields": fields
    }))
}
