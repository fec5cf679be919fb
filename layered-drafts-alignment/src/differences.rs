//! Difference listing, categorisation and reference-vs-alternative suggestions.

use layered_drafts::{tokens_equal, GAP};
use serde::{Deserialize, Serialize};

use crate::confidence::ConfidenceAnalyzer;
use crate::wire::{AlignmentBlock, AlignmentBlocks};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifferenceCategory {
    /// Bearings, degree/minute marks and directional abbreviations.
    Coordinate,
    Word,
    Punctuation,
    Other,
}

/// A token one draft placed at a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftToken {
    pub draft_id: String,
    pub token: String,
}

/// One differing column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Difference {
    pub block_id: String,
    pub column: usize,
    pub category: DifferenceCategory,
    pub confidence: f64,
    /// Every draft's formatted token at the column, gaps included.
    pub tokens: Vec<DraftToken>,
}

/// Reference token (first draft) and the differing alternatives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub block_id: String,
    pub column: usize,
    pub reference_draft: String,
    pub reference_token: String,
    pub alternatives: Vec<DraftToken>,
    pub confidence: f64,
}

const DIRECTIONS: &[&str] = &[
    "n", "s", "e", "w", "ne", "nw", "se", "sw", "nly", "sly", "ely", "wly", "north", "south",
    "east", "west",
];

/// Categorise a differing column by its non-gap tokens.
pub fn categorize<S: AsRef<str>>(tokens: &[S]) -> DifferenceCategory {
    let present: Vec<&str> = tokens
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| *t != GAP)
        .collect();
    if present.is_empty() {
        return DifferenceCategory::Other;
    }
    if present.iter().any(|t| is_coordinate(t)) {
        return DifferenceCategory::Coordinate;
    }
    if present
        .iter()
        .all(|t| t.chars().count() == 1 && !t.chars().all(char::is_alphanumeric))
    {
        return DifferenceCategory::Punctuation;
    }
    if present.iter().all(|t| t.chars().all(char::is_alphabetic)) {
        return DifferenceCategory::Word;
    }
    DifferenceCategory::Other
}

fn is_coordinate(token: &str) -> bool {
    if token.contains(&['°', '′', '″'][..]) {
        return true;
    }
    let core: String = token
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();
    DIRECTIONS.contains(&core.as_str())
}

/// List every differing column of every block, in block and column order.
pub fn find_differences(blocks: &AlignmentBlocks, analyzer: &ConfidenceAnalyzer) -> Vec<Difference> {
    blocks
        .iter()
        .flat_map(|(block_id, block)| block_differences(block_id, block, analyzer))
        .collect()
}

fn block_differences(
    block_id: &str,
    block: &AlignmentBlock,
    analyzer: &ConfidenceAnalyzer,
) -> Vec<Difference> {
    let sequences: Vec<_> = block.draft_sequences().collect();
    analyzer
        .analyze_block(block)
        .into_iter()
        .filter(|c| c.is_difference())
        .map(|c| {
            let tokens: Vec<DraftToken> = sequences
                .iter()
                .map(|s| DraftToken {
                    draft_id: s.draft_id.clone(),
                    token: s.display_token(c.column).unwrap_or(GAP).to_string(),
                })
                .collect();
            let shown: Vec<&str> = tokens.iter().map(|t| t.token.as_str()).collect();
            Difference {
                block_id: block_id.to_string(),
                column: c.column,
                category: categorize(&shown),
                confidence: c.confidence,
                tokens,
            }
        })
        .collect()
}

/// Pair each difference's first-draft token with the tokens that differ from it.
/// Differences without alternatives are dropped.
pub fn suggestions(differences: &[Difference]) -> Vec<Suggestion> {
    differences
        .iter()
        .filter_map(|diff| {
            let (reference, others) = diff.tokens.split_first()?;
            let alternatives: Vec<DraftToken> = others
                .iter()
                .filter(|t| !tokens_equal(&t.token, &reference.token))
                .cloned()
                .collect();
            if alternatives.is_empty() {
                return None;
            }
            Some(Suggestion {
                block_id: diff.block_id.clone(),
                column: diff.column,
                reference_draft: reference.draft_id.clone(),
                reference_token: reference.token.clone(),
                alternatives,
                confidence: diff.confidence,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(categorize(&["N.", "S."]), DifferenceCategory::Coordinate);
        assert_eq!(categorize(&["4°", "6°"]), DifferenceCategory::Coordinate);
        assert_eq!(categorize(&["Nly", "-"]), DifferenceCategory::Coordinate);
        assert_eq!(categorize(&["corner", "comer"]), DifferenceCategory::Word);
        assert_eq!(categorize(&[";", ","]), DifferenceCategory::Punctuation);
        assert_eq!(categorize(&["1638", "1683"]), DifferenceCategory::Other);
        assert_eq!(categorize(&["-", "-"]), DifferenceCategory::Other);
    }

    fn diff(tokens: &[(&str, &str)]) -> Difference {
        Difference {
            block_id: "legal_text".into(),
            column: 2,
            category: DifferenceCategory::Other,
            confidence: 0.3,
            tokens: tokens
                .iter()
                .map(|(d, t)| DraftToken {
                    draft_id: d.to_string(),
                    token: t.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn suggestions_skip_reference_matches() {
        let out = suggestions(&[diff(&[("a", "North"), ("b", "north"), ("c", "South")])]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].reference_draft, "a");
        assert_eq!(out[0].reference_token, "North");
        assert_eq!(
            out[0].alternatives,
            vec![DraftToken {
                draft_id: "c".into(),
                token: "South".into()
            }]
        );
    }

    #[test]
    fn gap_reference_is_a_suggestion() {
        let out = suggestions(&[diff(&[("a", "-"), ("b", "thence")])]);
        assert_eq!(out[0].reference_token, "-");
        assert_eq!(out[0].alternatives[0].token, "thence");
    }

    #[test]
    fn no_alternatives_no_suggestion() {
        assert!(suggestions(&[diff(&[("a", "lot"), ("b", "LOT")])]).is_empty());
    }
}
