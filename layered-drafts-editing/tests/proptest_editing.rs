//! Property-based tests for the editable draft state machine.
//!
//! Verifies:
//! 1. Replay determinism: after any mix of edits, undos and redos the edited
//!    blocks equal a fresh replay of the recorded history
//! 2. Undo/redo symmetry: redo right after undo restores the exact text
//! 3. Structure: the block count never changes and rejected edits leave the
//!    state untouched

use layered_drafts::{AlignmentConfig, Draft, DraftBlock};
use layered_drafts_alignment::{align, AlignmentBlocks, AlignmentRequest};
use layered_drafts_editing::{Edit, EditableDraft};
use proptest::prelude::*;

// ── Strategy helpers ──────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum Command {
    Apply { block: usize, token: usize, value: String },
    Undo,
    Redo,
}

fn arb_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("6".to_string()),
        Just("-".to_string()),
        Just(String::new()),
        Just("North".to_string()),
        Just("1738".to_string()),
        Just("(40)".to_string()),
        "[a-z]{1,5}",
    ]
}

fn arb_command() -> impl Strategy<Value = Command> {
    prop_oneof![
        3 => (0..3usize, 0..8usize, arb_value())
            .prop_map(|(block, token, value)| Command::Apply { block, token, value }),
        1 => Just(Command::Undo),
        1 => Just(Command::Redo),
    ]
}

fn fixture() -> (Draft, AlignmentBlocks) {
    let a = Draft::new(
        "a",
        vec![
            DraftBlock::new("legal_text", "N.4°00'W. 1,638.5 feet"),
            DraftBlock::new("notes", "thence 40 feet"),
        ],
    );
    let b = Draft::new(
        "b",
        vec![
            DraftBlock::new("legal_text", "N 4 00 W 1638.5 ft to"),
            DraftBlock::new("notes", "thence North 40 feet"),
        ],
    );
    let response = align(&AlignmentRequest::new(vec![a.clone(), b]), &AlignmentConfig::default());
    let blocks = response.blocks().cloned().unwrap_or_default();
    (a, blocks)
}

fn run(editable: &mut EditableDraft, command: &Command) {
    match command {
        Command::Apply { block, token, value } => {
            let _ = editable.apply_edit(Edit::manual(*block, *token, value));
        }
        Command::Undo => {
            editable.undo();
        }
        Command::Redo => {
            editable.redo();
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// Properties
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn edited_text_is_a_replay_of_history(
        commands in prop::collection::vec(arb_command(), 0..20),
        use_alignment in any::<bool>(),
    ) {
        let (draft, blocks) = fixture();
        let alignment = use_alignment.then_some(&blocks);
        let mut editable = EditableDraft::new(&draft, alignment);

        for command in &commands {
            run(&mut editable, command);
            let replayed = EditableDraft::from_history(editable.state(), alignment);
            prop_assert_eq!(replayed.edited_blocks(), editable.edited_blocks());
            prop_assert_eq!(replayed.current_history_index(), editable.current_history_index());
            prop_assert_eq!(editable.edited_blocks().len(), 2);
        }
    }

    #[test]
    fn redo_after_undo_restores_text(
        commands in prop::collection::vec(arb_command(), 1..20),
        use_alignment in any::<bool>(),
    ) {
        let (draft, blocks) = fixture();
        let mut editable = EditableDraft::new(&draft, use_alignment.then_some(&blocks));
        for command in &commands {
            run(&mut editable, command);
        }

        let before = editable.edited_blocks().to_vec();
        let index = editable.current_history_index();
        if editable.undo() {
            prop_assert_eq!(editable.current_history_index(), index - 1);
            prop_assert!(editable.redo());
        }
        prop_assert_eq!(editable.edited_blocks(), before.as_slice());
        prop_assert_eq!(editable.current_history_index(), index);
    }

    #[test]
    fn rejected_edits_change_nothing(
        commands in prop::collection::vec(arb_command(), 0..10),
        token in 0..40usize,
    ) {
        let (draft, blocks) = fixture();
        let mut editable = EditableDraft::new(&draft, Some(&blocks));
        for command in &commands {
            run(&mut editable, command);
        }

        let before = editable.state();
        prop_assert!(editable.apply_edit(Edit::manual(2, 0, "x")).is_err());
        let positions = editable.layout(0).unwrap().positions();
        if editable.apply_edit(Edit::manual(0, positions + token, "x")).is_ok() {
            prop_assert!(false, "edit past the last position was accepted");
        }
        prop_assert_eq!(editable.state(), before);
    }
}
