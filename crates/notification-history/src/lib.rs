//! Persisted notification history: the on-disk model, item validation and
//! the JSON document format of `history.json`.

pub mod format;
pub mod validation;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use format::{EMPTY_DOCUMENT, decode, encode};
pub use validation::validate_items;

/// Display time meaning "never dismiss automatically".
pub const NEVER_DISMISS: i64 = -1;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Urgent,
    Normal,
    Low,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Urgent, Level::Normal, Level::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Normal => "normal",
            Self::Low => "low",
        }
    }

    /// Parse a persisted level name. Matching is exact.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == name)
    }

    /// Display time in milliseconds used when a notification does not set one.
    pub fn default_time_ms(&self) -> i64 {
        match self {
            Self::Urgent => NEVER_DISMISS,
            Self::Normal => 5000,
            Self::Low => 2500,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Icon of a stored notification. `element` is serialized markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryIcon {
    pub name: String,
    pub element: String,
}

/// One archived notification as written to the history file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub level: Level,
    pub text: String,
    pub title: String,
    /// Creation time in epoch milliseconds. Identity of the item.
    pub snapshot: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<HistoryIcon>,
}

/// History document error type.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("History document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("History document must be a JSON array")]
    NotAnArray,

    #[error("The notification [{index}] {reason}")]
    Validation { index: usize, reason: String },
}

#[cfg(test)]
mod tests;
