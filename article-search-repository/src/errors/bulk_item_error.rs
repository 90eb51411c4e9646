//! Per-item bulk failures.

use thiserror::Error;

/// One failed item of a bulk request.
///
/// Carries enough detail to retry just this item: the target index and id,
/// the status the engine assigned to it and the engine's reason.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("bulk item index={index}, id={id} failed with status {status} ({error_type}): {reason}")]
pub struct BulkItemError {
    /// Target index of the failed operation.
    pub index: String,
    /// Document id of the failed operation.
    pub id: String,
    /// Item status reported by the engine.
    pub status: u16,
    /// Engine error type, e.g. `mapper_parsing_exception`.
    pub error_type: String,
    /// Human-readable reason.
    pub reason: String,
}
