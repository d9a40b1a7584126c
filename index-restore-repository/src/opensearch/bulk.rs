//! Bulk request encoding and response decoding.
//!
//! The bulk API takes newline-delimited JSON: one action line per operation
//! followed by the document source. Documents are passed through as raw bytes.

use bytes::Bytes;
use serde_json::{json, Value};

use crate::errors::SearchIndexError;
use crate::types::{BatchOperationResult, BatchOperationSummary, BulkItemFailure, IndexOperation};

/// Encode operations as bulk body lines (action, source, action, source, ...).
pub fn encode_bulk_body(operations: &[IndexOperation]) -> Result<Vec<Bytes>, SearchIndexError> {
    let mut body = Vec::with_capacity(operations.len() * 2);

    for op in operations {
        let action = match op.id {
            Some(ref id) => json!({"index": {"_index": op.index, "_id": id}}),
            None => json!({"index": {"_index": op.index}}),
        };
        let action = serde_json::to_vec(&action)
            .map_err(|e| SearchIndexError::parse(format!("Failed to encode bulk action: {}", e)))?;
        body.push(Bytes::from(action));
        body.push(op.document.clone());
    }

    Ok(body)
}

/// Decode a bulk response into per-item results.
///
/// # Arguments
///
/// * `response` - The parsed JSON body of the bulk response
/// * `expected` - Number of operations that were submitted
pub fn parse_bulk_response(
    response: &Value,
    expected: usize,
) -> Result<BatchOperationSummary, SearchIndexError> {
    let items = response
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| SearchIndexError::parse("Bulk response has no items array"))?;

    if items.len() != expected {
        return Err(SearchIndexError::parse(format!(
            "Bulk response has {} items, expected {}",
            items.len(),
            expected
        )));
    }

    let results = items
        .iter()
        .enumerate()
        .map(|(position, item)| parse_item(position, item))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BatchOperationSummary::from_results(results))
}

fn parse_item(position: usize, item: &Value) -> Result<BatchOperationResult, SearchIndexError> {
    // Each item is keyed by its action type: {"index": {...}}
    let outcome = item
        .as_object()
        .and_then(|obj| obj.values().next())
        .ok_or_else(|| {
            SearchIndexError::parse(format!("Bulk response item {} is malformed", position))
        })?;

    let status = outcome
        .get("status")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(0);
    let error = outcome.get("error");

    if error.is_none() && (200..300).contains(&status) {
        return Ok(BatchOperationResult::succeeded(position));
    }

    let raw = error.cloned().unwrap_or(Value::Null);
    let failure = BulkItemFailure {
        index: outcome.get("_index").and_then(Value::as_str).map(str::to_string),
        id: outcome.get("_id").and_then(Value::as_str).map(str::to_string),
        status,
        error_type: raw.get("type").and_then(Value::as_str).map(str::to_string),
        reason: match raw {
            Value::String(ref s) => Some(s.clone()),
            _ => raw.get("reason").and_then(Value::as_str).map(str::to_string),
        },
        raw,
    };

    Ok(BatchOperationResult::failed(position, failure))
}
