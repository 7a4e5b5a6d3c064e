//! Reading and writing the history document.

use serde_json::Value;

use crate::{HistoryError, HistoryItem, validate_items};

/// Content written when a fresh history file is created.
pub const EMPTY_DOCUMENT: &str = "[]";

/// Encode items as a pretty-printed JSON array (2-space indent).
pub fn encode(items: &[HistoryItem]) -> Result<String, HistoryError> {
    Ok(serde_json::to_string_pretty(items)?)
}

/// Decode and validate a history document.
///
/// The first invalid item aborts decoding; nothing is returned partially.
pub fn decode(document: &str) -> Result<Vec<HistoryItem>, HistoryError> {
    let value: Value = serde_json::from_str(document)?;
    let items = validate_items(value)?;
    tracing::debug!(count = items.len(), "History document decoded");
    Ok(items)
}
