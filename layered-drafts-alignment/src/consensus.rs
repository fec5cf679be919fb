//! Consensus sequences voted from an alignment grid.
//!
//! A consensus is an ordinary [`AlignedSequence`] with draft id
//! [`CONSENSUS_DRAFT_ID`], so downstream code can treat it like any draft.

use std::fmt;
use std::str::FromStr;

use layered_drafts::{fold_case, Draft, DraftBlock, CONSENSUS_DRAFT_ID, GAP};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::wire::{AlignedSequence, AlignmentBlock, AlignmentBlocks};

/// Name that disables consensus generation for a request.
pub const NO_CONSENSUS: &str = "none";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusStrategy {
    /// Most frequent non-gap token per column.
    #[default]
    HighestConfidence,
    /// Like `HighestConfidence`, but gaps vote and can win the column.
    Majority,
}

impl ConsensusStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            ConsensusStrategy::HighestConfidence => "highest_confidence",
            ConsensusStrategy::Majority => "majority",
        }
    }

    /// Resolve a request's strategy name.
    ///
    /// `"none"` and the empty string disable consensus. Unknown names fall
    /// back to the default strategy.
    pub fn resolve(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() || name == NO_CONSENSUS {
            return None;
        }
        match name.parse() {
            Ok(strategy) => Some(strategy),
            Err(unknown) => {
                warn!(strategy = %unknown, "unknown consensus strategy, using highest_confidence");
                Some(ConsensusStrategy::default())
            }
        }
    }
}

impl FromStr for ConsensusStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "highest_confidence" => Ok(ConsensusStrategy::HighestConfidence),
            "majority" => Ok(ConsensusStrategy::Majority),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for ConsensusStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Consensus sequences of every block that had at least two drafts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsensusDraft {
    pub strategy: ConsensusStrategy,
    pub blocks: Vec<ConsensusBlock>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusBlock {
    pub block_id: String,
    pub sequence: AlignedSequence,
}

impl ConsensusDraft {
    pub fn block(&self, block_id: &str) -> Option<&AlignedSequence> {
        self.blocks
            .iter()
            .find(|b| b.block_id == block_id)
            .map(|b| &b.sequence)
    }

    /// The consensus as a plain draft, one block per consensus block.
    pub fn to_draft(&self) -> Draft {
        Draft::new(
            CONSENSUS_DRAFT_ID,
            self.blocks
                .iter()
                .map(|b| {
                    DraftBlock::new(
                        b.block_id.clone(),
                        b.sequence.exact_text.clone().unwrap_or_default(),
                    )
                })
                .collect(),
        )
    }
}

/// Vote a consensus for every block. Blocks with fewer than two drafts are
/// skipped.
pub fn generate_consensus(blocks: &AlignmentBlocks, strategy: ConsensusStrategy) -> ConsensusDraft {
    let mut consensus = ConsensusDraft {
        strategy,
        blocks: Vec::new(),
    };
    for (block_id, block) in blocks.iter() {
        match consensus_sequence(block, strategy) {
            Some(sequence) => consensus.blocks.push(ConsensusBlock {
                block_id: block_id.to_string(),
                sequence,
            }),
            None => debug!(block_id = %block_id, "skipping consensus for block with fewer than 2 drafts"),
        }
    }
    consensus
}

/// Place (or replace) the consensus sequence in every block of `blocks`.
/// Returns the number of blocks that received one.
pub fn insert_consensus(blocks: &mut AlignmentBlocks, strategy: ConsensusStrategy) -> usize {
    let consensus = generate_consensus(blocks, strategy);
    for ConsensusBlock { block_id, sequence } in &consensus.blocks {
        if let Some(block) = blocks.get_mut(block_id) {
            block.aligned_sequences.retain(|s| !s.is_consensus());
            block.aligned_sequences.push(sequence.clone());
        }
    }
    consensus.blocks.len()
}

/// Vote one block's consensus, or `None` if it has fewer than two drafts.
pub fn consensus_sequence(block: &AlignmentBlock, strategy: ConsensusStrategy) -> Option<AlignedSequence> {
    let sequences: Vec<&AlignedSequence> = block.draft_sequences().collect();
    if sequences.len() < 2 {
        return None;
    }
    let width = sequences.iter().map(|s| s.tokens.len()).max().unwrap_or(0);

    let mut tokens = Vec::with_capacity(width);
    let mut display = Vec::with_capacity(width);
    for column in 0..width {
        match vote(&sequences, column, strategy) {
            Some(winner) => {
                tokens.push(winner.tokens[column].clone());
                display.push(winner.display_token(column).unwrap_or(GAP).to_string());
            }
            None => {
                tokens.push(GAP.to_string());
                display.push(GAP.to_string());
            }
        }
    }

    let original_to_alignment = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| t.as_str() != GAP)
        .map(|(c, _)| c)
        .collect();
    let exact_text = display
        .iter()
        .filter(|t| t.as_str() != GAP)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    Some(AlignedSequence {
        draft_id: CONSENSUS_DRAFT_ID.to_string(),
        tokens,
        original_to_alignment: Some(original_to_alignment),
        exact_text: Some(exact_text),
        display_tokens: Some(display),
    })
}

/// The sequence whose token wins `column`, or `None` for a gap.
fn vote<'a>(
    sequences: &[&'a AlignedSequence],
    column: usize,
    strategy: ConsensusStrategy,
) -> Option<&'a AlignedSequence> {
    // (folded token, first sequence holding it, votes), in first-seen order.
    let mut groups: Vec<(String, &AlignedSequence, usize)> = Vec::new();
    let mut gaps = 0;
    for sequence in sequences {
        if sequence.is_gap(column) {
            gaps += 1;
            continue;
        }
        let key = fold_case(&sequence.tokens[column]);
        match groups.iter_mut().find(|(k, _, _)| *k == key) {
            Some(group) => group.2 += 1,
            None => groups.push((key, *sequence, 1)),
        }
    }

    let mut best: Option<(&AlignedSequence, usize)> = None;
    for (_, first, votes) in &groups {
        if best.map_or(true, |(_, top)| *votes > top) {
            best = Some((*first, *votes));
        }
    }
    let (winner, votes) = best?;
    if strategy == ConsensusStrategy::Majority && gaps > votes {
        return None;
    }
    Some(winner)
}
