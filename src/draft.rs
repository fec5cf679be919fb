//! Drafts: independently produced transcriptions of one source document.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::errors::{DraftError, DraftResult};

/// Marker placed in an aligned column where a draft has no token.
pub const GAP: &str = "-";

/// Draft id reserved for the synthetic consensus sequence.
pub const CONSENSUS_DRAFT_ID: &str = "consensus";

/// A named sub-unit of a draft, aligned independently of other blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftBlock {
    pub id: String,
    pub text: String,
}

impl DraftBlock {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// One candidate transcription, split into ordered blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub draft_id: String,
    pub blocks: Vec<DraftBlock>,
}

impl Draft {
    pub fn new(draft_id: impl Into<String>, blocks: Vec<DraftBlock>) -> Self {
        Self {
            draft_id: draft_id.into(),
            blocks,
        }
    }

    /// A draft holding a single block.
    pub fn single_block(
        draft_id: impl Into<String>,
        block_id: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self::new(draft_id, vec![DraftBlock::new(block_id, text)])
    }

    /// Find a block by id.
    pub fn block(&self, block_id: &str) -> Option<&DraftBlock> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    /// Whether any block carries non-whitespace text.
    pub fn has_text(&self) -> bool {
        self.blocks.iter().any(|b| !b.text.trim().is_empty())
    }

    /// Validate ids at the system boundary.
    ///
    /// Draft ids must be non-empty and must not use the reserved consensus id.
    /// Block ids must be non-empty and unique within the draft.
    pub fn validate(&self) -> DraftResult<()> {
        if self.draft_id.trim().is_empty() {
            return Err(DraftError::invalid_draft("draft_id must not be empty"));
        }
        if self.draft_id == CONSENSUS_DRAFT_ID {
            return Err(DraftError::invalid_draft(format!(
                "draft_id '{}' is reserved",
                CONSENSUS_DRAFT_ID
            )));
        }
        let mut seen = HashSet::new();
        for (idx, block) in self.blocks.iter().enumerate() {
            if block.id.trim().is_empty() {
                return Err(DraftError::invalid_draft(format!(
                    "draft '{}', block {} has an empty id",
                    self.draft_id, idx
                )));
            }
            if !seen.insert(block.id.as_str()) {
                return Err(DraftError::invalid_draft(format!(
                    "draft '{}' repeats block id '{}'",
                    self.draft_id, block.id
                )));
            }
        }
        Ok(())
    }
}

/// Validate a set of drafts intended for alignment.
///
/// Every draft must pass [`Draft::validate`] and carry some text.
pub fn validate_drafts(drafts: &[Draft]) -> DraftResult<()> {
    if drafts.len() < crate::errors::MIN_ALIGNABLE_DRAFTS {
        return Err(DraftError::InsufficientDrafts {
            found: drafts.len(),
        });
    }
    let mut ids = HashSet::new();
    for draft in drafts {
        draft.validate()?;
        if !draft.has_text() {
            return Err(DraftError::invalid_draft(format!(
                "draft '{}' has no text",
                draft.draft_id
            )));
        }
        if !ids.insert(draft.draft_id.as_str()) {
            return Err(DraftError::invalid_draft(format!(
                "duplicate draft_id '{}'",
                draft.draft_id
            )));
        }
    }
    Ok(())
}

/// Output of one OCR/LLM draft-generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftGeneration {
    pub success: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub tokens_used: Option<u64>,
}

impl DraftGeneration {
    /// Whether this generation can take part in alignment.
    pub fn is_usable(&self) -> bool {
        self.success && !self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(id: &str) -> Draft {
        Draft::single_block(id, "legal_text", "4 00 N")
    }

    #[test]
    fn requires_two_drafts() {
        let err = validate_drafts(&[draft("a")]).unwrap_err();
        assert!(matches!(err, DraftError::InsufficientDrafts { found: 1 }));
        assert!(validate_drafts(&[draft("a"), draft("b")]).is_ok());
    }

    #[test]
    fn rejects_duplicate_draft_ids() {
        let err = validate_drafts(&[draft("a"), draft("a")]).unwrap_err();
        assert!(err.to_string().contains("duplicate draft_id"));
    }

    #[test]
    fn rejects_drafts_without_text() {
        let blank = Draft::new(
            "b",
            vec![DraftBlock::new("legal_text", ""), DraftBlock::new("notes", " \n\t")],
        );
        assert!(!blank.has_text());
        let err = validate_drafts(&[draft("a"), blank]).unwrap_err();
        assert_eq!(err.to_string(), "invalid draft: draft 'b' has no text");
    }

    #[test]
    fn rejects_reserved_and_empty_ids() {
        assert!(draft(CONSENSUS_DRAFT_ID).validate().is_err());
        assert!(draft("  ").validate().is_err());
        let bad_block = Draft::single_block("a", "", "text");
        assert!(bad_block.validate().is_err());
    }

    #[test]
    fn rejects_repeated_block_ids() {
        let d = Draft::new(
            "a",
            vec![DraftBlock::new("b", "x"), DraftBlock::new("b", "y")],
        );
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("repeats block id 'b'"));
    }

    #[test]
    fn generation_deserializes_with_missing_fields() {
        let generation: DraftGeneration =
            serde_json::from_str(r#"{"success": true, "text": "4 00 N"}"#).unwrap();
        assert!(generation.is_usable());
        assert_eq!(generation.model, None);

        let failed: DraftGeneration = serde_json::from_str(r#"{"success": false}"#).unwrap();
        assert!(!failed.is_usable());
    }
}
