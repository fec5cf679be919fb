//! Request-level alignment: drafts in, wire response out.

use std::time::Instant;

use layered_drafts::{
    tokenize, validate_drafts, AlignmentConfig, Draft, DraftBlock, DraftResult, TokenizedText, GAP,
};
use tracing::{debug, info, warn};

use crate::aligner::ProfileAligner;
use crate::confidence::ConfidenceAnalyzer;
use crate::consensus::{insert_consensus, ConsensusStrategy};
use crate::wire::{
    AlignedSequence, AlignmentBlock, AlignmentBlocks, AlignmentRequest, AlignmentResponse,
    AlignmentResults,
};

/// Align a request. Never fails: every error becomes a `success: false`
/// response with a zero-filled summary.
pub fn align(request: &AlignmentRequest, config: &AlignmentConfig) -> AlignmentResponse {
    let started = Instant::now();
    match try_align(request, config) {
        Ok(mut response) => {
            response.processing_time = started.elapsed().as_secs_f64();
            response
        }
        Err(err) => {
            warn!(error = %err, draft_count = request.drafts.len(), "alignment failed");
            AlignmentResponse::failure(err.to_string(), started.elapsed().as_secs_f64())
        }
    }
}

fn try_align(request: &AlignmentRequest, config: &AlignmentConfig) -> DraftResult<AlignmentResponse> {
    let mut blocks = align_drafts(&request.drafts, config)?;

    if let Some(strategy) = ConsensusStrategy::resolve(&request.consensus_strategy) {
        let inserted = insert_consensus(&mut blocks, strategy);
        debug!(strategy = %strategy, blocks = inserted, "inserted consensus");
    }
    if !request.generate_visualization {
        for (_, block) in blocks.iter_mut() {
            for sequence in &mut block.aligned_sequences {
                sequence.display_tokens = None;
            }
        }
    }

    let summary = ConfidenceAnalyzer::new(config.confidence).summarize_blocks(&blocks);
    info!(
        blocks = blocks.len(),
        positions = summary.total_positions_analyzed,
        differences = summary.total_differences_found,
        "alignment complete"
    );
    Ok(AlignmentResponse {
        success: true,
        processing_time: 0.0,
        alignment_results: Some(AlignmentResults { blocks }),
        summary,
        error: None,
    })
}

/// Validate drafts and align each block across the drafts that contain it.
///
/// Blocks are returned in first-seen order. A block only one draft carries is
/// returned as a single-sequence block.
pub fn align_drafts(drafts: &[Draft], config: &AlignmentConfig) -> DraftResult<AlignmentBlocks> {
    validate_drafts(drafts)?;
    let aligner = ProfileAligner::new(config.scoring);

    let mut block_ids: Vec<&str> = Vec::new();
    for draft in drafts {
        for block in &draft.blocks {
            if !block_ids.contains(&block.id.as_str()) {
                block_ids.push(&block.id);
            }
        }
    }

    let mut blocks = AlignmentBlocks::new();
    for block_id in block_ids {
        let members: Vec<(&str, &DraftBlock)> = drafts
            .iter()
            .filter_map(|d| d.block(block_id).map(|b| (d.draft_id.as_str(), b)))
            .collect();
        if members.len() < 2 {
            warn!(block_id = %block_id, "block present in a single draft, left unaligned");
        }
        blocks.insert(block_id, align_block(&aligner, &members));
    }
    Ok(blocks)
}

/// Align one block's texts, one `(draft_id, block)` per member.
pub fn align_block(aligner: &ProfileAligner, members: &[(&str, &DraftBlock)]) -> AlignmentBlock {
    let tokenized: Vec<TokenizedText> = members.iter().map(|(_, b)| tokenize(&b.text)).collect();
    let cleaned: Vec<Vec<&str>> = tokenized.iter().map(TokenizedText::cleaned).collect();
    let grid = aligner.align(&cleaned);

    let aligned_sequences = members
        .iter()
        .zip(&tokenized)
        .enumerate()
        .map(|(s, ((draft_id, block), tokens))| {
            let mut cleaned_row = Vec::with_capacity(grid.width());
            let mut display_row = Vec::with_capacity(grid.width());
            for cell in grid.row(s) {
                match cell.and_then(|t| tokens.get(t)) {
                    Some(token) => {
                        cleaned_row.push(token.cleaned.clone());
                        display_row.push(token.original.clone());
                    }
                    None => {
                        cleaned_row.push(GAP.to_string());
                        display_row.push(GAP.to_string());
                    }
                }
            }
            AlignedSequence {
                draft_id: draft_id.to_string(),
                tokens: cleaned_row,
                original_to_alignment: Some(grid.original_to_alignment(s)),
                exact_text: Some(block.text.trim().to_string()),
                display_tokens: Some(display_row),
            }
        })
        .collect();

    AlignmentBlock { aligned_sequences }
}
