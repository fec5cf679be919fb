//! Per-document session: drafts, their alignment, and the draft being edited.
//!
//! One session owns everything the reconciliation view needs for a single
//! document. Alignment is started with [`DraftSession::begin_alignment`],
//! which hands out a ticket; a response is only applied when its ticket still
//! belongs to the session's current document. Observers subscribe to
//! [`SessionEvent`]s instead of reading session internals.

use std::sync::mpsc::{channel, Receiver, Sender};

use layered_drafts::{AlignmentConfig, Draft, DraftGeneration, CONSENSUS_DRAFT_ID, GAP};
use layered_drafts_alignment::{
    generate_consensus, insert_consensus, request_alignment, AlignmentBlocks, AlignmentRequest,
    AlignmentResponse, AlignmentTransport, ConfidenceAnalyzer, ConsensusStrategy,
};
use layered_drafts_document::documents_from_generations;
use tracing::{debug, info};

use crate::editable::EditableDraft;
use crate::errors::{EditError, EditResult};
use crate::operation::Edit;

/// Notifications sent to session subscribers.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The session now holds a different document's drafts.
    DocumentChanged { generation: u64, draft_count: usize },
    AlignmentStarted { generation: u64 },
    AlignmentCompleted { generation: u64, success: bool },
    /// A response arrived for a document the session no longer holds.
    AlignmentDiscarded { generation: u64 },
    DraftSelected { draft_id: String },
    /// The working draft changed through an edit, undo, redo, reset or save.
    DraftEdited {
        draft_id: String,
        current_history_index: isize,
        has_unsaved_changes: bool,
    },
}

/// Proof that an alignment was started, carrying the request to send.
#[derive(Debug, Clone)]
pub struct AlignmentTicket {
    generation: u64,
    pub request: AlignmentRequest,
}

impl AlignmentTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Search direction for [`DraftSession::navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

pub struct DraftSession {
    config: AlignmentConfig,
    drafts: Vec<Draft>,
    /// Source document of each draft, when the drafts came from documents.
    documents: Vec<Option<String>>,
    generation: u64,
    in_flight: Option<u64>,
    response: Option<AlignmentResponse>,
    editable: Option<EditableDraft>,
    subscribers: Vec<Sender<SessionEvent>>,
}

impl DraftSession {
    pub fn new(config: AlignmentConfig) -> Self {
        Self {
            config,
            drafts: Vec::new(),
            documents: Vec::new(),
            generation: 0,
            in_flight: None,
            response: None,
            editable: None,
            subscribers: Vec::new(),
        }
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&mut self) -> Receiver<SessionEvent> {
        let (sender, receiver) = channel();
        self.subscribers.push(sender);
        receiver
    }

    /// Replace the session's document. Any alignment in flight becomes stale.
    pub fn load_drafts(&mut self, drafts: Vec<Draft>) {
        let documents = vec![None; drafts.len()];
        self.load(drafts, documents);
    }

    /// Load the usable outputs of the draft-generation service. Working
    /// drafts keep the generated document around their blocks.
    pub fn load_generations(&mut self, generations: &[DraftGeneration]) {
        let (drafts, documents): (Vec<Draft>, Vec<Option<String>>) = documents_from_generations(generations)
            .into_iter()
            .map(|(draft, content)| (draft, Some(content)))
            .unzip();
        self.load(drafts, documents);
    }

    fn load(&mut self, drafts: Vec<Draft>, documents: Vec<Option<String>>) {
        self.generation += 1;
        self.in_flight = None;
        self.response = None;
        self.editable = None;
        self.drafts = drafts;
        self.documents = documents;
        debug!(generation = self.generation, drafts = self.drafts.len(), "document loaded");
        self.emit(SessionEvent::DocumentChanged {
            generation: self.generation,
            draft_count: self.drafts.len(),
        });
    }

    pub fn drafts(&self) -> &[Draft] {
        &self.drafts
    }

    pub fn is_aligning(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start an alignment of the current drafts.
    ///
    /// Returns `None` while another alignment is in flight.
    pub fn begin_alignment(&mut self) -> Option<AlignmentTicket> {
        if self.in_flight.is_some() {
            debug!(generation = self.generation, "alignment already in flight, ignoring");
            return None;
        }
        self.in_flight = Some(self.generation);
        self.emit(SessionEvent::AlignmentStarted {
            generation: self.generation,
        });
        Some(AlignmentTicket {
            generation: self.generation,
            request: AlignmentRequest::new(self.drafts.clone())
                .with_strategy(self.config.consensus_strategy.clone()),
        })
    }

    /// Apply the response for `ticket`. Returns `false` when the ticket is
    /// stale and the response was discarded.
    pub fn complete_alignment(&mut self, ticket: AlignmentTicket, response: AlignmentResponse) -> bool {
        if self.in_flight == Some(ticket.generation) {
            self.in_flight = None;
        }
        if ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale alignment response"
            );
            self.emit(SessionEvent::AlignmentDiscarded {
                generation: ticket.generation,
            });
            return false;
        }

        info!(
            generation = self.generation,
            success = response.success,
            processing_time = response.processing_time,
            "alignment applied"
        );
        let success = response.success;
        self.response = Some(response);
        self.emit(SessionEvent::AlignmentCompleted {
            generation: self.generation,
            success,
        });

        // Re-seed an untouched working draft so it picks up column editing.
        let reseed = self
            .editable
            .as_ref()
            .filter(|draft| !draft.has_unsaved_changes())
            .map(|draft| draft.draft_id().to_string());
        if let Some(draft_id) = reseed {
            if let Err(err) = self.select_draft(&draft_id) {
                debug!(draft_id = %draft_id, error = %err, "could not re-select draft after alignment");
            }
        }
        true
    }

    /// Align through `transport`, with the configured retry policy.
    pub fn align_with(&mut self, transport: &dyn AlignmentTransport) -> Option<&AlignmentResponse> {
        let ticket = self.begin_alignment()?;
        let response = request_alignment(transport, &ticket.request, &self.config.transport);
        if self.complete_alignment(ticket, response) {
            self.response.as_ref()
        } else {
            None
        }
    }

    pub fn response(&self) -> Option<&AlignmentResponse> {
        self.response.as_ref()
    }

    pub fn alignment_blocks(&self) -> Option<&AlignmentBlocks> {
        self.response.as_ref().and_then(AlignmentResponse::blocks)
    }

    /// Make `draft_id` the working draft. `"consensus"` selects the consensus
    /// of the current alignment.
    pub fn select_draft(&mut self, draft_id: &str) -> EditResult<()> {
        let editable = if draft_id == CONSENSUS_DRAFT_ID {
            self.consensus_editable()?
        } else {
            let index = self
                .drafts
                .iter()
                .position(|d| d.draft_id == draft_id)
                .ok_or_else(|| EditError::UnknownDraft(draft_id.to_string()))?;
            match self.documents.get(index).and_then(Option::as_deref) {
                Some(content) => EditableDraft::from_document(draft_id, content, self.alignment_blocks()),
                None => EditableDraft::new(&self.drafts[index], self.alignment_blocks()),
            }
        };
        self.editable = Some(editable);
        self.emit(SessionEvent::DraftSelected {
            draft_id: draft_id.to_string(),
        });
        Ok(())
    }

    fn consensus_editable(&self) -> EditResult<EditableDraft> {
        let unknown = || EditError::UnknownDraft(CONSENSUS_DRAFT_ID.to_string());
        let blocks = self.alignment_blocks().ok_or_else(unknown)?;
        let strategy = ConsensusStrategy::resolve(&self.config.consensus_strategy).unwrap_or_default();

        let consensus = generate_consensus(blocks, strategy);
        if consensus.blocks.is_empty() {
            return Err(unknown());
        }
        let mut with_consensus = blocks.clone();
        insert_consensus(&mut with_consensus, strategy);
        Ok(EditableDraft::new(&consensus.to_draft(), Some(&with_consensus)))
    }

    pub fn editable(&self) -> Option<&EditableDraft> {
        self.editable.as_ref()
    }

    pub fn apply_edit(&mut self, edit: Edit) -> EditResult<()> {
        self.editable_mut()?.apply_edit(edit)?;
        self.emit_edited();
        Ok(())
    }

    pub fn undo(&mut self) -> EditResult<bool> {
        let changed = self.editable_mut()?.undo();
        if changed {
            self.emit_edited();
        }
        Ok(changed)
    }

    pub fn redo(&mut self) -> EditResult<bool> {
        let changed = self.editable_mut()?.redo();
        if changed {
            self.emit_edited();
        }
        Ok(changed)
    }

    pub fn reset_to_original(&mut self) -> EditResult<()> {
        self.editable_mut()?.reset_to_original();
        self.emit_edited();
        Ok(())
    }

    pub fn save_as_original(&mut self) -> EditResult<()> {
        self.editable_mut()?.save_as_original();
        self.emit_edited();
        Ok(())
    }

    /// Distinct non-gap display tokens the drafts hold at `column` of
    /// `block_id`, in draft order.
    pub fn alternatives(&self, block_id: &str, column: usize) -> Vec<String> {
        let Some(block) = self.alignment_blocks().and_then(|blocks| blocks.get(block_id)) else {
            return Vec::new();
        };
        let mut values: Vec<String> = Vec::new();
        for sequence in block.draft_sequences() {
            if let Some(token) = sequence.display_token(column) {
                if token != GAP && !values.iter().any(|v| v == token) {
                    values.push(token.to_string());
                }
            }
        }
        values
    }

    /// Nearest differing column of `block_id` strictly after (or before)
    /// `from`. `from = None` starts at the corresponding end of the block.
    pub fn navigate(&self, block_id: &str, from: Option<usize>, direction: Direction) -> Option<usize> {
        let block = self.alignment_blocks()?.get(block_id)?;
        let analyzer = ConfidenceAnalyzer::new(self.config.confidence);
        let differing: Vec<usize> = analyzer
            .analyze_block(block)
            .into_iter()
            .filter(|c| c.is_difference())
            .map(|c| c.column)
            .collect();
        match (direction, from) {
            (Direction::Next, None) => differing.first().copied(),
            (Direction::Next, Some(from)) => differing.into_iter().find(|&c| c > from),
            (Direction::Previous, None) => differing.last().copied(),
            (Direction::Previous, Some(from)) => differing.into_iter().rev().find(|&c| c < from),
        }
    }

    fn editable_mut(&mut self) -> EditResult<&mut EditableDraft> {
        self.editable.as_mut().ok_or(EditError::NoDraftSelected)
    }

    fn emit_edited(&mut self) {
        if let Some(draft) = &self.editable {
            let event = SessionEvent::DraftEdited {
                draft_id: draft.draft_id().to_string(),
                current_history_index: draft.current_history_index(),
                has_unsaved_changes: draft.has_unsaved_changes(),
            };
            self.emit(event);
        }
    }

    fn emit(&mut self, event: SessionEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }
}

impl Default for DraftSession {
    fn default() -> Self {
        Self::new(AlignmentConfig::default())
    }
}
