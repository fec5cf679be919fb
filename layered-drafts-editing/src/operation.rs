//! Edit operations recorded in a draft's history.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// How a value reached the working draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditType {
    /// A token picked from another draft at the same aligned position.
    AlternativeSelection,
    /// A value typed by the reviewer.
    ManualEdit,
}

/// A requested change, before it is validated and recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    /// Index of the block in the draft.
    pub block_index: usize,
    /// Aligned column when the block has alignment data, whitespace-word
    /// index otherwise.
    pub token_index: usize,
    /// Replacement value. Empty or `-` deletes the token.
    pub new_value: String,
    pub edit_type: EditType,
    /// Confidence of the position the value was picked at, if known.
    pub confidence: Option<f64>,
    /// The other values offered at this position.
    pub alternatives: Option<Vec<String>>,
}

impl Edit {
    /// A value typed by the reviewer.
    pub fn manual(block_index: usize, token_index: usize, new_value: &str) -> Self {
        Self {
            block_index,
            token_index,
            new_value: new_value.to_string(),
            edit_type: EditType::ManualEdit,
            confidence: None,
            alternatives: None,
        }
    }

    /// A value picked from the alternatives at an aligned position.
    pub fn alternative(
        block_index: usize,
        token_index: usize,
        new_value: &str,
        alternatives: Vec<String>,
    ) -> Self {
        Self {
            block_index,
            token_index,
            new_value: new_value.to_string(),
            edit_type: EditType::AlternativeSelection,
            confidence: None,
            alternatives: Some(alternatives),
        }
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }
}

/// One recorded entry of an edit history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditOperation {
    /// Unique within one draft's history.
    pub id: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub edit_type: EditType,
    pub block_index: usize,
    pub token_index: usize,
    /// Value at the position before this edit (`-` for an empty gap).
    pub original_value: String,
    pub new_value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<String>>,
}

impl EditOperation {
    pub(crate) fn record(id: u64, edit: Edit, original_value: String) -> Self {
        Self {
            id,
            timestamp: now_millis(),
            edit_type: edit.edit_type,
            block_index: edit.block_index,
            token_index: edit.token_index,
            original_value,
            new_value: edit.new_value,
            confidence: edit.confidence,
            alternatives: edit.alternatives,
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
