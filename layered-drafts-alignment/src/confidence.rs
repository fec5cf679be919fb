//! Per-column agreement, confidence classification and summaries.

use std::collections::HashSet;

use layered_drafts::{fold_case, ConfidenceConfig, GAP};
use serde::{Deserialize, Serialize};

use crate::wire::{
    AlignmentBlock, AlignmentBlocks, ConfidenceDistribution, ConfidenceSummary, NO_DATA_QUALITY,
};

/// Confidence bucket of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

/// Analysis of one aligned column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnAnalysis {
    pub column: usize,
    /// Token of each draft sequence at this column (consensus excluded).
    pub tokens: Vec<String>,
    /// All non-gap tokens are equal ignoring case.
    pub agreed: bool,
    /// Some drafts have a gap here while others have a token.
    pub has_gaps: bool,
    pub confidence: f64,
    pub level: ConfidenceLevel,
}

impl ColumnAnalysis {
    /// Differing tokens, or a token some drafts lack.
    ///
    /// A column whose tokens all agree but which some drafts skip scores as
    /// agreed (high confidence) and still counts as a difference.
    pub fn is_difference(&self) -> bool {
        !self.agreed || self.has_gaps
    }

    pub fn non_gap_tokens(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str).filter(|t| *t != GAP)
    }
}

/// Scores columns with the agreed/mismatched rule.
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceAnalyzer {
    config: ConfidenceConfig,
}

impl Default for ConfidenceAnalyzer {
    fn default() -> Self {
        Self::new(ConfidenceConfig::default())
    }
}

impl ConfidenceAnalyzer {
    pub fn new(config: ConfidenceConfig) -> Self {
        Self { config }
    }

    pub fn level(&self, confidence: f64) -> ConfidenceLevel {
        if confidence >= self.config.high_threshold {
            ConfidenceLevel::High
        } else if confidence >= self.config.medium_threshold {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    /// Analyze every column that holds at least one token.
    pub fn analyze_block(&self, block: &AlignmentBlock) -> Vec<ColumnAnalysis> {
        let sequences: Vec<_> = block.draft_sequences().collect();
        let width = sequences.iter().map(|s| s.tokens.len()).max().unwrap_or(0);

        (0..width)
            .filter_map(|column| {
                let tokens: Vec<String> = sequences
                    .iter()
                    .map(|s| s.tokens.get(column).cloned().unwrap_or_else(|| GAP.to_string()))
                    .collect();
                let distinct: HashSet<String> = tokens
                    .iter()
                    .filter(|t| t.as_str() != GAP)
                    .map(|t| fold_case(t))
                    .collect();
                if distinct.is_empty() {
                    return None;
                }
                let agreed = distinct.len() == 1;
                let has_gaps = tokens.iter().any(|t| t == GAP);
                let confidence = if agreed {
                    self.config.agreed
                } else {
                    self.config.mismatched
                };
                Some(ColumnAnalysis {
                    column,
                    tokens,
                    agreed,
                    has_gaps,
                    confidence,
                    level: self.level(confidence),
                })
            })
            .collect()
    }

    /// Summary of one block.
    pub fn summarize_block(&self, block: &AlignmentBlock) -> ConfidenceSummary {
        summarize(&self.analyze_block(block))
    }

    /// Summary over all blocks; the average is taken over every column.
    pub fn summarize_blocks(&self, blocks: &AlignmentBlocks) -> ConfidenceSummary {
        let columns: Vec<ColumnAnalysis> = blocks
            .iter()
            .flat_map(|(_, block)| self.analyze_block(block))
            .collect();
        summarize(&columns)
    }
}

/// Fold column analyses into a summary. Zero columns give a zero summary.
pub fn summarize(columns: &[ColumnAnalysis]) -> ConfidenceSummary {
    if columns.is_empty() {
        return ConfidenceSummary::empty();
    }

    let mut distribution = ConfidenceDistribution::default();
    for column in columns {
        match column.level {
            ConfidenceLevel::High => distribution.high += 1,
            ConfidenceLevel::Medium => distribution.medium += 1,
            ConfidenceLevel::Low => distribution.low += 1,
        }
    }
    let total = columns.len();
    let average = columns.iter().map(|c| c.confidence).sum::<f64>() / total as f64;

    ConfidenceSummary {
        total_positions_analyzed: total,
        total_differences_found: columns.iter().filter(|c| c.is_difference()).count(),
        average_confidence_score: average.clamp(0.0, 1.0),
        quality_assessment: quality_label(average, total).to_string(),
        confidence_distribution: distribution,
    }
}

/// Quality label, monotonic in the average confidence.
pub fn quality_label(average: f64, total_positions: usize) -> &'static str {
    if total_positions == 0 {
        return NO_DATA_QUALITY;
    }
    match average {
        a if a >= 0.9 => "Excellent",
        a if a >= 0.8 => "Very Good",
        a if a >= 0.7 => "Good",
        a if a >= 0.6 => "Fair",
        _ => "Poor",
    }
}
