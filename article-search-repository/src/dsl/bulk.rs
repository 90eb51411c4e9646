//! Bulk request framing and response parsing.
//!
//! A bulk body is newline-delimited JSON: every operation contributes an
//! action line naming the kind, index and id, and index operations add the
//! document as a second line. The engine answers with one item per
//! operation, in submission order.

use serde_json::{json, Value};

use crate::errors::{BulkItemError, SearchError};
use crate::types::{BulkItemResult, BulkSummary, WriteKind, WriteOperation};

/// Frame operations as bulk body lines.
pub fn build_bulk_body(operations: &[WriteOperation]) -> Vec<Value> {
    let mut lines = Vec::with_capacity(operations.len() * 2);
    for operation in operations {
        lines.push(json!({
            operation.kind().as_str(): {
                "_index": operation.index_name(),
                "_id": operation.id()
            }
        }));
        if let WriteOperation::Index { document, .. } = operation {
            lines.push(document.clone());
        }
    }
    lines
}

/// Match the engine's `items` array to the submitted operations.
///
/// Fails with a parse error when the response has no `items` array or its
/// length differs from the number of operations.
pub fn parse_bulk_response(
    operations: &[WriteOperation],
    response: &Value,
) -> Result<BulkSummary, SearchError> {
    let items = response
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchError::parse("bulk response has no items array"))?;

    if items.len() != operations.len() {
        return Err(SearchError::parse(format!(
            "bulk response has {} items for {} operations",
            items.len(),
            operations.len()
        )));
    }

    let results = operations
        .iter()
        .zip(items)
        .map(|(operation, item)| parse_item(operation, item))
        .collect();

    Ok(BulkSummary::from_results(results))
}

fn parse_item(operation: &WriteOperation, item: &Value) -> BulkItemResult {
    let kind = operation.kind();
    // Items are keyed by action name; fall back to the first entry.
    let body = item
        .get(kind.as_str())
        .or_else(|| item.as_object().and_then(|obj| obj.values().next()));
    let field = |key: &str| body.and_then(|b| b.get(key));

    let status = field("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or_default();
    let result = field("result")
        .and_then(Value::as_str)
        .map(str::to_string);

    let not_found_delete = kind == WriteKind::Delete
        && status == 404
        && result.as_deref() == Some("not_found");
    let success = field("error").is_none()
        && ((200..300).contains(&status) || not_found_delete);

    let error = (!success).then(|| {
        let (error_type, reason) = describe_error(field("error"));
        BulkItemError {
            index: operation.index_name().to_string(),
            id: operation.id().to_string(),
            status,
            error_type,
            reason,
        }
    });

    BulkItemResult {
        index: operation.index_name().to_string(),
        id: operation.id().to_string(),
        kind,
        status,
        success,
        result,
        error,
    }
}

fn describe_error(error: Option<&Value>) -> (String, String) {
    match error {
        Some(Value::Object(obj)) => (
            obj.get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string(),
            obj.get("reason")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        Some(Value::String(reason)) => ("unknown".to_string(), reason.clone()),
        _ => (
            "unknown".to_string(),
            "item failed without an error description".to_string(),
        ),
    }
}
