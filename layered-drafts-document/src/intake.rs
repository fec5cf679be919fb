//! Turning draft-generation output into alignable drafts.

use layered_drafts::{Draft, DraftBlock, DraftGeneration};
use tracing::debug;

use crate::document::extract_blocks;
use crate::normalize::normalize_documents;

/// Id of the block at `index` in a draft built from a document.
pub fn block_id(index: usize) -> String {
    format!("block_{}", index)
}

/// Build a draft whose blocks are the document's sections or paragraphs.
pub fn draft_from_document(draft_id: impl Into<String>, content: &str) -> Draft {
    let blocks = extract_blocks(content)
        .into_iter()
        .enumerate()
        .map(|(i, text)| DraftBlock::new(block_id(i), text))
        .collect();
    Draft::new(draft_id, blocks)
}

/// Drafts from the usable generations, named `draft_<n>` after their 1-based
/// position in `generations`.
///
/// Sectioned outputs are first split to agree on section count so that
/// blocks pair up across drafts.
pub fn drafts_from_generations(generations: &[DraftGeneration]) -> Vec<Draft> {
    documents_from_generations(generations)
        .into_iter()
        .map(|(draft, _)| draft)
        .collect()
}

/// Like [`drafts_from_generations`], paired with the document text each draft
/// was read from, after section normalization.
pub fn documents_from_generations(generations: &[DraftGeneration]) -> Vec<(Draft, String)> {
    let (ids, texts): (Vec<String>, Vec<String>) = generations
        .iter()
        .enumerate()
        .filter(|(i, generation)| {
            let usable = generation.is_usable();
            if !usable {
                debug!(generation = i + 1, model = ?generation.model, "skipping unusable generation");
            }
            usable
        })
        .map(|(i, generation)| (format!("draft_{}", i + 1), generation.text.clone()))
        .unzip();

    normalize_documents(&texts)
        .into_iter()
        .zip(ids)
        .map(|(text, id)| (draft_from_document(id, &text), text))
        .collect()
}
