//! The working draft: an original draft plus a replayable edit history.
//!
//! `edited_blocks` is always the fold of `history[0..=current_history_index]`
//! over `original_blocks`. Undo and redo move the index and replay from the
//! original; nothing is patched incrementally. Replay renders one block per
//! layout and layouts are built one per original block, so a replay cannot
//! change the block count; operations that address a missing block or
//! position are skipped with a warning.
//!
//! The draft also keeps the document it came from (sectioned JSON or plain
//! text). [`EditableDraft::edited_content`] is that document with its blocks
//! replaced by the edited blocks, so headers and other fields survive edits
//! and saves.

use layered_drafts::{tokenize, Draft, DraftBlock};
use layered_drafts_alignment::AlignmentBlocks;
use layered_drafts_document::{draft_from_document, extract_blocks, reconstruct, PARAGRAPH_BREAK};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{EditError, EditResult};
use crate::layout::{BlockLayout, Overrides};
use crate::operation::{Edit, EditOperation};

/// Serializable snapshot of an [`EditableDraft`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditableDraftState {
    pub draft_id: String,
    pub block_ids: Vec<String>,
    /// Document the original blocks were taken from.
    #[serde(default)]
    pub original_content: String,
    /// `original_content` with the edited blocks in place.
    #[serde(default)]
    pub edited_content: String,
    pub original_blocks: Vec<String>,
    pub edited_blocks: Vec<String>,
    pub edit_history: Vec<EditOperation>,
    /// Index of the last applied operation, `-1` when none is applied.
    pub current_history_index: isize,
    pub has_unsaved_changes: bool,
}

#[derive(Debug, Clone)]
pub struct EditableDraft {
    draft_id: String,
    block_ids: Vec<String>,
    original_content: String,
    original: Vec<String>,
    layouts: Vec<BlockLayout>,
    edited: Vec<String>,
    history: Vec<EditOperation>,
    current: isize,
    has_unsaved_changes: bool,
    next_operation_id: u64,
}

impl EditableDraft {
    /// Start editing `draft`. Blocks with a usable aligned sequence for this
    /// draft in `alignment` are edited by column, the rest by whitespace word.
    ///
    /// The draft's document is its blocks as plain-text paragraphs.
    pub fn new(draft: &Draft, alignment: Option<&AlignmentBlocks>) -> Self {
        let original: Vec<String> = draft.blocks.iter().map(|b| b.text.clone()).collect();
        Self::seeded(draft, original.join(PARAGRAPH_BREAK), original, alignment)
    }

    /// Start editing the draft read from `content`, a sectioned JSON or
    /// plain-text document. Block ids follow [`draft_from_document`].
    pub fn from_document(
        draft_id: impl Into<String>,
        content: &str,
        alignment: Option<&AlignmentBlocks>,
    ) -> Self {
        let draft = draft_from_document(draft_id, content);
        let original = draft.blocks.iter().map(|b| b.text.clone()).collect();
        Self::seeded(&draft, content.to_string(), original, alignment)
    }

    fn seeded(
        draft: &Draft,
        original_content: String,
        original: Vec<String>,
        alignment: Option<&AlignmentBlocks>,
    ) -> Self {
        let block_ids: Vec<String> = draft.blocks.iter().map(|b| b.id.clone()).collect();
        let layouts = build_layouts(&draft.draft_id, &block_ids, &original, alignment);
        Self {
            draft_id: draft.draft_id.clone(),
            block_ids,
            original_content,
            edited: original.clone(),
            original,
            layouts,
            history: Vec::new(),
            current: -1,
            has_unsaved_changes: false,
            next_operation_id: 1,
        }
    }

    /// Restore from a persisted state.
    ///
    /// The stored `edited_blocks` and `edited_content` are not trusted: the
    /// history is replayed against `original_blocks`, skipping operations that
    /// no longer apply. An `original_content` that does not hold one block per
    /// original block is rebuilt from the blocks as plain text.
    pub fn from_history(state: EditableDraftState, alignment: Option<&AlignmentBlocks>) -> Self {
        let EditableDraftState {
            draft_id,
            mut block_ids,
            mut original_content,
            original_blocks: original,
            edit_history: history,
            current_history_index,
            ..
        } = state;

        if block_ids.len() != original.len() {
            warn!(
                draft_id = %draft_id,
                ids = block_ids.len(),
                blocks = original.len(),
                "block ids do not match blocks, renumbering"
            );
            block_ids = (0..original.len()).map(|i| format!("block_{}", i)).collect();
        }

        let content_blocks = extract_blocks(&original_content).len();
        if content_blocks != original.len() {
            warn!(
                draft_id = %draft_id,
                content_blocks,
                blocks = original.len(),
                "stored content does not match the blocks, rebuilding it as plain text"
            );
            original_content = original.join(PARAGRAPH_BREAK);
        }

        let layouts = build_layouts(&draft_id, &block_ids, &original, alignment);
        let current = current_history_index.clamp(-1, history.len() as isize - 1);
        let next_operation_id = history.iter().map(|op| op.id).max().unwrap_or(0) + 1;

        let mut draft = Self {
            draft_id,
            block_ids,
            original_content,
            edited: original.clone(),
            original,
            layouts,
            history,
            current,
            has_unsaved_changes: current >= 0,
            next_operation_id,
        };
        draft.edited = draft.replay();
        draft
    }

    /// Record and apply an edit.
    ///
    /// Operations after the current history index are discarded. Only the
    /// edited block is rebuilt.
    pub fn apply_edit(&mut self, edit: Edit) -> EditResult<&EditOperation> {
        let block_index = edit.block_index;
        let layout = self
            .layouts
            .get(block_index)
            .ok_or(EditError::BlockOutOfRange {
                index: block_index,
                count: self.layouts.len(),
            })?;
        let slot = layout.slot(edit.token_index).ok_or(EditError::TokenOutOfRange {
            block_index,
            index: edit.token_index,
            count: layout.positions(),
        })?;

        let overrides = self.block_overrides(block_index);
        let original_value = layout.value_at(&self.original[block_index], &overrides, slot);

        self.history.truncate(self.applied_len());
        let operation = EditOperation::record(self.next_operation_id, edit, original_value);
        self.next_operation_id += 1;
        debug!(
            draft_id = %self.draft_id,
            block_index,
            token_index = operation.token_index,
            new_value = %operation.new_value,
            "applying edit"
        );
        self.history.push(operation);
        self.current = self.history.len() as isize - 1;

        self.edited[block_index] = self.render_block(block_index);
        self.has_unsaved_changes = true;
        Ok(&self.history[self.history.len() - 1])
    }

    /// Step back one operation. Returns `false` when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.current < 0 {
            return false;
        }
        self.current -= 1;
        self.edited = self.replay();
        self.has_unsaved_changes = self.current >= 0;
        true
    }

    /// Re-apply the next undone operation. Returns `false` when there is
    /// nothing to redo.
    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        self.current += 1;
        self.edited = self.replay();
        self.has_unsaved_changes = self.current >= 0;
        true
    }

    pub fn reset_to_original(&mut self) {
        self.history.clear();
        self.current = -1;
        self.edited = self.original.clone();
        self.has_unsaved_changes = false;
    }

    /// Make the edited text the new original and clear the history.
    ///
    /// This cannot be undone. A block keeps column editing only when its new
    /// text has one token per column still holding a word.
    pub fn save_as_original(&mut self) {
        let mut layouts = Vec::with_capacity(self.layouts.len());
        for (index, layout) in self.layouts.iter().enumerate() {
            let text = &self.edited[index];
            let next = match (layout, layout.live_columns(&self.block_overrides(index))) {
                (BlockLayout::Aligned { width, .. }, Some(columns)) => {
                    let spans: Vec<_> = tokenize(text)
                        .tokens()
                        .iter()
                        .map(|t| t.start..t.end)
                        .collect();
                    if spans.len() == columns.len() {
                        BlockLayout::Aligned {
                            spans,
                            columns,
                            width: *width,
                        }
                    } else {
                        warn!(
                            draft_id = %self.draft_id,
                            block_id = %self.block_ids[index],
                            tokens = spans.len(),
                            columns = columns.len(),
                            "saved text no longer matches its columns, editing by whitespace words"
                        );
                        BlockLayout::naive(text)
                    }
                }
                _ => BlockLayout::naive(text),
            };
            layouts.push(next);
        }

        self.original_content = self.edited_content();
        self.layouts = layouts;
        self.original = self.edited.clone();
        self.history.clear();
        self.current = -1;
        self.has_unsaved_changes = false;
    }

    pub fn draft_id(&self) -> &str {
        &self.draft_id
    }

    pub fn block_ids(&self) -> &[String] {
        &self.block_ids
    }

    pub fn original_content(&self) -> &str {
        &self.original_content
    }

    /// The original document with its blocks replaced by the edited blocks.
    pub fn edited_content(&self) -> String {
        reconstruct(&self.original_content, &self.edited)
    }

    pub fn original_blocks(&self) -> &[String] {
        &self.original
    }

    pub fn edited_blocks(&self) -> &[String] {
        &self.edited
    }

    pub fn history(&self) -> &[EditOperation] {
        &self.history
    }

    pub fn current_history_index(&self) -> isize {
        self.current
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.has_unsaved_changes
    }

    pub fn can_undo(&self) -> bool {
        self.current >= 0
    }

    pub fn can_redo(&self) -> bool {
        self.current + 1 < self.history.len() as isize
    }

    pub fn layout(&self, block_index: usize) -> Option<&BlockLayout> {
        self.layouts.get(block_index)
    }

    /// Value currently shown at a position, `None` when it does not exist.
    pub fn value_at(&self, block_index: usize, token_index: usize) -> Option<String> {
        let layout = self.layouts.get(block_index)?;
        let slot = layout.slot(token_index)?;
        Some(layout.value_at(&self.original[block_index], &self.block_overrides(block_index), slot))
    }

    /// The edited text as a draft with the same id and block ids.
    pub fn to_draft(&self) -> Draft {
        Draft::new(
            self.draft_id.clone(),
            self.block_ids
                .iter()
                .zip(&self.edited)
                .map(|(id, text)| DraftBlock::new(id.clone(), text.clone()))
                .collect(),
        )
    }

    pub fn state(&self) -> EditableDraftState {
        EditableDraftState {
            draft_id: self.draft_id.clone(),
            block_ids: self.block_ids.clone(),
            original_content: self.original_content.clone(),
            edited_content: self.edited_content(),
            original_blocks: self.original.clone(),
            edited_blocks: self.edited.clone(),
            edit_history: self.history.clone(),
            current_history_index: self.current,
            has_unsaved_changes: self.has_unsaved_changes,
        }
    }

    fn applied_len(&self) -> usize {
        (self.current + 1).max(0) as usize
    }

    fn applied(&self) -> &[EditOperation] {
        &self.history[..self.applied_len()]
    }

    fn block_overrides(&self, block_index: usize) -> Overrides {
        let Some(layout) = self.layouts.get(block_index) else {
            return Overrides::new();
        };
        self.applied()
            .iter()
            .filter(|op| op.block_index == block_index)
            .filter_map(|op| layout.slot(op.token_index).map(|slot| (slot, op.new_value.clone())))
            .collect()
    }

    fn render_block(&self, block_index: usize) -> String {
        self.layouts[block_index].render(&self.original[block_index], &self.block_overrides(block_index))
    }

    fn replay(&self) -> Vec<String> {
        let overrides = fold(&self.layouts, self.applied());
        self.original
            .iter()
            .zip(&self.layouts)
            .zip(&overrides)
            .map(|((text, layout), overrides)| layout.render(text, overrides))
            .collect()
    }
}

fn build_layouts(
    draft_id: &str,
    block_ids: &[String],
    texts: &[String],
    alignment: Option<&AlignmentBlocks>,
) -> Vec<BlockLayout> {
    block_ids
        .iter()
        .zip(texts)
        .map(|(block_id, text)| {
            let sequence = alignment
                .and_then(|blocks| blocks.get(block_id))
                .and_then(|block| block.sequence(draft_id));
            BlockLayout::for_block(block_id, text, sequence)
        })
        .collect()
}

/// Per-block overrides after applying `operations` in order. Operations that
/// address a missing block or position are skipped.
fn fold(layouts: &[BlockLayout], operations: &[EditOperation]) -> Vec<Overrides> {
    let mut overrides = vec![Overrides::new(); layouts.len()];
    for operation in operations {
        let slot = layouts
            .get(operation.block_index)
            .and_then(|layout| layout.slot(operation.token_index));
        match slot {
            Some(slot) => {
                overrides[operation.block_index].insert(slot, operation.new_value.clone());
            }
            None => warn!(
                operation_id = operation.id,
                block_index = operation.block_index,
                token_index = operation.token_index,
                "skipping edit that does not address an existing position"
            ),
        }
    }
    overrides
}
