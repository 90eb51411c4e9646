//! Mapping between typed documents and engine JSON.
//!
//! Writes serialize a [`SearchDocument`] into a JSON object. Reads map raw
//! hits back: unknown fields are ignored, missing optional fields take their
//! defaults, and a source that does not fit the document type is reported as
//! [`SearchError::MalformedDocumentError`].

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::SearchError;
use article_search_shared::{HitFailure, SearchDocument, SearchHit, SearchPage};

/// Serialize a document to JSON bytes.
pub fn serialize_document<D: SearchDocument>(document: &D) -> Result<Vec<u8>, SearchError> {
    let value = document_to_value(document)?;
    serde_json::to_vec(&value).map_err(|e| SearchError::serialization(e.to_string()))
}

/// Deserialize a document from JSON bytes.
pub fn deserialize_document<D: SearchDocument>(bytes: &[u8]) -> Result<D, SearchError> {
    serde_json::from_slice(bytes).map_err(|e| SearchError::MalformedDocumentError(e.to_string()))
}

/// Convert a document into the JSON object stored by the engine.
pub fn document_to_value<D: SearchDocument>(document: &D) -> Result<Value, SearchError> {
    let value =
        serde_json::to_value(document).map_err(|e| SearchError::serialization(e.to_string()))?;
    if !value.is_object() {
        return Err(SearchError::serialization(format!(
            "document {} does not serialize to a JSON object",
            document.document_id()
        )));
    }
    Ok(value)
}

/// Convert a stored `_source` into a typed document.
pub fn document_from_source<D: SearchDocument>(
    source: &Value,
    index: &str,
    id: &str,
) -> Result<D, SearchError> {
    D::deserialize(source).map_err(|e| SearchError::malformed_document(index, id, e))
}

/// Map a single raw hit into a typed hit with its highlight fragments.
pub fn map_hit<D: SearchDocument>(hit: &Value) -> Result<SearchHit<D>, SearchError> {
    let index = hit.get("_index").and_then(Value::as_str).unwrap_or_default();
    let id = hit.get("_id").and_then(Value::as_str).unwrap_or_default();

    let source = hit
        .get("_source")
        .ok_or_else(|| SearchError::malformed_document(index, id, "hit has no _source"))?;
    let document = document_from_source(source, index, id)?;

    Ok(SearchHit {
        index: index.to_string(),
        id: id.to_string(),
        score: hit.get("_score").and_then(Value::as_f64),
        document,
        highlights: parse_highlights(hit.get("highlight")),
    })
}

/// Map a raw search response into a page.
///
/// Hits that cannot be mapped are dropped from `hits` and reported in
/// `failures`; only a response without a `hits` section fails as a whole.
pub fn map_search_response<D: SearchDocument>(
    response: &Value,
) -> Result<SearchPage<D>, SearchError> {
    let hits_section = response
        .get("hits")
        .ok_or_else(|| SearchError::parse("search response has no hits section"))?;
    let raw_hits = hits_section
        .get("hits")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::parse("search response has no hits array"))?;

    let mut page = SearchPage {
        total: parse_total(hits_section.get("total")),
        hits: Vec::with_capacity(raw_hits.len()),
        failures: Vec::new(),
    };

    for raw_hit in raw_hits {
        match map_hit(raw_hit) {
            Ok(hit) => page.hits.push(hit),
            Err(e) => {
                let failure = HitFailure {
                    index: string_field(raw_hit, "_index"),
                    id: string_field(raw_hit, "_id"),
                    reason: e.to_string(),
                };
                warn!(
                    index = %failure.index,
                    id = %failure.id,
                    error = %e,
                    "Dropping malformed hit"
                );
                page.failures.push(failure);
            }
        }
    }

    Ok(page)
}

/// Read `hits.total` in both the `{"value": n}` and the legacy numeric form.
fn parse_total(total: Option<&Value>) -> u64 {
    match total {
        Some(Value::Number(n)) => n.as_u64().unwrap_or_default(),
        Some(Value::Object(obj)) => obj.get("value").and_then(Value::as_u64).unwrap_or_default(),
        _ => 0,
    }
}

fn parse_highlights(highlight: Option<&Value>) -> BTreeMap<String, Vec<String>> {
    let Some(Value::Object(fields)) = highlight else {
        return BTreeMap::new();
    };

    fields
        .iter()
        .filter_map(|(field, fragments)| {
            let fragments: Vec<String> = fragments
                .as_array()?
                .iter()
                .filter_map(|f| f.as_str().map(str::to_string))
                .collect();
            (!fragments.is_empty()).then(|| (field.clone(), fragments))
        })
        .collect()
}

fn string_field(hit: &Value, key: &str) -> String {
    hit.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
