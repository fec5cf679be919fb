//! Request/response shapes exchanged with an alignment backend.
//!
//! These types serialize to the JSON contract consumed by the presentation
//! layer, so field names and optionality must not drift:
//!
//! ```text
//! Request:  { drafts: [{draft_id, blocks: [{id, text}]}], consensus_strategy, generate_visualization }
//! Response: { success, processing_time, alignment_results?: { blocks: { <id>: { aligned_sequences } } },
//!             summary: { total_positions_analyzed, total_differences_found, average_confidence_score,
//!                        quality_assessment, confidence_distribution: { high, medium, low } },
//!             error? }
//! ```

use std::fmt;

use layered_drafts::{Draft, CONSENSUS_DRAFT_ID, DEFAULT_CONSENSUS_STRATEGY, GAP};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Label used when a summary covers no columns.
pub const NO_DATA_QUALITY: &str = "No data";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentRequest {
    pub drafts: Vec<Draft>,
    #[serde(default = "default_strategy")]
    pub consensus_strategy: String,
    #[serde(default)]
    pub generate_visualization: bool,
}

fn default_strategy() -> String {
    DEFAULT_CONSENSUS_STRATEGY.to_string()
}

impl AlignmentRequest {
    pub fn new(drafts: Vec<Draft>) -> Self {
        Self {
            drafts,
            consensus_strategy: default_strategy(),
            generate_visualization: true,
        }
    }

    pub fn with_strategy(mut self, strategy: impl Into<String>) -> Self {
        self.consensus_strategy = strategy.into();
        self
    }

    pub fn with_visualization(mut self, generate_visualization: bool) -> Self {
        self.generate_visualization = generate_visualization;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResponse {
    pub success: bool,
    /// Wall-clock seconds spent producing the response.
    pub processing_time: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment_results: Option<AlignmentResults>,
    pub summary: ConfidenceSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AlignmentResponse {
    /// Zero-filled failure shape. Callers can render it without null checks.
    pub fn failure(error: impl Into<String>, processing_time: f64) -> Self {
        Self {
            success: false,
            processing_time,
            alignment_results: None,
            summary: ConfidenceSummary::empty(),
            error: Some(error.into()),
        }
    }

    pub fn blocks(&self) -> Option<&AlignmentBlocks> {
        self.alignment_results.as_ref().map(|r| &r.blocks)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentResults {
    pub blocks: AlignmentBlocks,
}

/// Alignment blocks keyed by block id, in first-seen order.
///
/// Serialized as a JSON object. Insertion order is kept on both sides of the
/// wire so exports and displays list blocks the way the drafts did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AlignmentBlocks {
    entries: Vec<(String, AlignmentBlock)>,
}

impl AlignmentBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, block_id: &str) -> Option<&AlignmentBlock> {
        self.entries
            .iter()
            .find(|(id, _)| id == block_id)
            .map(|(_, block)| block)
    }

    pub fn get_mut(&mut self, block_id: &str) -> Option<&mut AlignmentBlock> {
        self.entries
            .iter_mut()
            .find(|(id, _)| id == block_id)
            .map(|(_, block)| block)
    }

    /// Insert or replace, keeping the original position on replace.
    pub fn insert(&mut self, block_id: impl Into<String>, block: AlignmentBlock) {
        let block_id = block_id.into();
        match self.get_mut(&block_id) {
            Some(existing) => *existing = block,
            None => self.entries.push((block_id, block)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AlignmentBlock)> {
        self.entries.iter().map(|(id, block)| (id.as_str(), block))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut AlignmentBlock)> {
        self.entries
            .iter_mut()
            .map(|(id, block)| (id.as_str(), block))
    }

    pub fn block_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }
}

impl Serialize for AlignmentBlocks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (id, block) in &self.entries {
            map.serialize_entry(id, block)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for AlignmentBlocks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BlocksVisitor;

        impl<'de> Visitor<'de> for BlocksVisitor {
            type Value = AlignmentBlocks;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of block id to alignment block")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut blocks = AlignmentBlocks::new();
                while let Some((id, block)) = access.next_entry::<String, AlignmentBlock>()? {
                    blocks.insert(id, block);
                }
                Ok(blocks)
            }
        }

        deserializer.deserialize_map(BlocksVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentBlock {
    pub aligned_sequences: Vec<AlignedSequence>,
}

impl AlignmentBlock {
    /// Alignment width. Every sequence of a well-formed block has this length.
    pub fn width(&self) -> usize {
        self.aligned_sequences
            .first()
            .map_or(0, |s| s.tokens.len())
    }

    pub fn sequence(&self, draft_id: &str) -> Option<&AlignedSequence> {
        self.aligned_sequences.iter().find(|s| s.draft_id == draft_id)
    }

    /// Sequences from real drafts, excluding any synthetic consensus.
    pub fn draft_sequences(&self) -> impl Iterator<Item = &AlignedSequence> {
        self.aligned_sequences.iter().filter(|s| !s.is_consensus())
    }

    /// Every sequence has the same number of columns.
    pub fn is_rectangular(&self) -> bool {
        let width = self.width();
        self.aligned_sequences.iter().all(|s| s.tokens.len() == width)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSequence {
    pub draft_id: String,
    /// Cleaned token per column, [`GAP`] where the draft has none.
    pub tokens: Vec<String>,
    /// Column of each of the draft's tokens, in token order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_to_alignment: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exact_text: Option<String>,
    /// Formatted original token per column, [`GAP`] where the draft has none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_tokens: Option<Vec<String>>,
}

impl AlignedSequence {
    pub fn is_consensus(&self) -> bool {
        self.draft_id == CONSENSUS_DRAFT_ID
    }

    pub fn is_gap(&self, column: usize) -> bool {
        self.tokens.get(column).map_or(true, |t| t == GAP)
    }

    /// Non-gap tokens in column order.
    pub fn non_gap_tokens(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| t.as_str() != GAP)
            .map(String::as_str)
            .collect()
    }

    /// Formatted token at `column`, falling back to the cleaned token.
    pub fn display_token(&self, column: usize) -> Option<&str> {
        self.display_tokens
            .as_ref()
            .and_then(|d| d.get(column))
            .or_else(|| self.tokens.get(column))
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceSummary {
    pub total_positions_analyzed: usize,
    pub total_differences_found: usize,
    pub average_confidence_score: f64,
    pub quality_assessment: String,
    pub confidence_distribution: ConfidenceDistribution,
}

impl ConfidenceSummary {
    pub fn empty() -> Self {
        Self {
            total_positions_analyzed: 0,
            total_differences_found: 0,
            average_confidence_score: 0.0,
            quality_assessment: NO_DATA_QUALITY.to_string(),
            confidence_distribution: ConfidenceDistribution::default(),
        }
    }
}

impl Default for ConfidenceSummary {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceDistribution {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl ConfidenceDistribution {
    pub fn total(&self) -> usize {
        self.high + self.medium + self.low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failure_serializes_zero_filled() {
        let response = AlignmentResponse::failure("backend unreachable", 0.0);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "processing_time": 0.0,
                "summary": {
                    "total_positions_analyzed": 0,
                    "total_differences_found": 0,
                    "average_confidence_score": 0.0,
                    "quality_assessment": "No data",
                    "confidence_distribution": {"high": 0, "medium": 0, "low": 0}
                },
                "error": "backend unreachable"
            })
        );
    }

    #[test]
    fn blocks_keep_wire_order() {
        let raw = r#"{"blocks": {
            "zeta": {"aligned_sequences": []},
            "alpha": {"aligned_sequences": [{"draft_id": "a", "tokens": ["x", "-"]}]}
        }}"#;
        let results: AlignmentResults = serde_json::from_str(raw).unwrap();
        assert_eq!(results.blocks.block_ids().collect::<Vec<_>>(), vec!["zeta", "alpha"]);

        let alpha = results.blocks.get("alpha").unwrap();
        assert_eq!(alpha.width(), 2);
        assert!(alpha.aligned_sequences[0].is_gap(1));
        assert_eq!(alpha.aligned_sequences[0].original_to_alignment, None);

        let back = serde_json::to_string(&results).unwrap();
        assert!(back.find("zeta").unwrap() < back.find("alpha").unwrap());
    }

    #[test]
    fn request_defaults() {
        let request: AlignmentRequest = serde_json::from_str(
            r#"{"drafts": [{"draft_id": "a", "blocks": [{"id": "legal_text", "text": "4 00 N"}]}]}"#,
        )
        .unwrap();
        assert_eq!(request.consensus_strategy, "highest_confidence");
        assert!(!request.generate_visualization);
        assert_eq!(request.drafts[0].blocks[0].id, "legal_text");
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut blocks = AlignmentBlocks::new();
        blocks.insert("a", AlignmentBlock::default());
        blocks.insert("b", AlignmentBlock::default());
        blocks.insert(
            "a",
            AlignmentBlock {
                aligned_sequences: vec![AlignedSequence {
                    draft_id: "d".into(),
                    tokens: vec![],
                    original_to_alignment: None,
                    exact_text: None,
                    display_tokens: None,
                }],
            },
        );
        assert_eq!(blocks.block_ids().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(blocks.get("a").unwrap().aligned_sequences.len(), 1);
    }
}
