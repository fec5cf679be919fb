use layered_drafts::{AlignmentConfig, Draft};
use layered_drafts_alignment::{align, AlignmentBlocks, AlignmentRequest};
use layered_drafts_document::draft_from_document;

use crate::{Edit, EditError, EditableDraft, EditableDraftState};

fn aligned(a: &str, b: &str) -> (Draft, AlignmentBlocks) {
    let drafts = vec![
        Draft::single_block("a", "legal_text", a),
        Draft::single_block("b", "legal_text", b),
    ];
    let response = align(&AlignmentRequest::new(drafts.clone()), &AlignmentConfig::default());
    (drafts[0].clone(), response.blocks().unwrap().clone())
}

#[test]
fn apply_then_undo_restores_text() {
    let draft = Draft::single_block("a", "legal_text", "4 00 N");
    let mut editable = EditableDraft::new(&draft, None);
    assert_eq!(editable.current_history_index(), -1);
    assert!(!editable.has_unsaved_changes());

    editable.apply_edit(Edit::manual(0, 0, "6")).unwrap();
    assert_eq!(editable.edited_blocks(), ["6 00 N"]);
    assert_eq!(editable.current_history_index(), 0);
    assert!(editable.has_unsaved_changes());

    assert!(editable.undo());
    assert_eq!(editable.edited_blocks(), ["4 00 N"]);
    assert!(!editable.has_unsaved_changes());
    assert!(!editable.undo());

    assert!(editable.redo());
    assert_eq!(editable.edited_blocks(), ["6 00 N"]);
    assert!(!editable.redo());
}

#[test]
fn aligned_columns_keep_formatting() {
    let (draft, blocks) = aligned("N.4°00'W. 40 feet", "N 4 00 W 40 ft");
    let mut editable = EditableDraft::new(&draft, Some(&blocks));
    assert!(editable.layout(0).unwrap().is_aligned());

    editable.apply_edit(Edit::manual(0, 1, "6")).unwrap();
    editable
        .apply_edit(Edit::alternative(0, 5, "ft", vec!["feet".into(), "ft".into()]).with_confidence(0.3))
        .unwrap();
    assert_eq!(editable.edited_blocks(), ["N.6°00'W. 40 ft"]);

    let history: Vec<String> = editable
        .history()
        .iter()
        .map(|op| {
            format!(
                "{} {:?} {}:{} {:?} -> {:?}",
                op.id, op.edit_type, op.block_index, op.token_index, op.original_value, op.new_value
            )
        })
        .collect();
    insta::assert_snapshot!(history.join("\n"), @r#"
    1 ManualEdit 0:1 "4°" -> "6"
    2 AlternativeSelection 0:5 "feet" -> "ft"
    "#);

    editable.undo();
    assert_eq!(editable.edited_blocks(), ["N.6°00'W. 40 feet"]);
}

#[test]
fn gap_columns_accept_insertions() {
    let (draft, blocks) = aligned("thence 40 feet", "thence North 40 feet");
    let mut editable = EditableDraft::new(&draft, Some(&blocks));
    assert_eq!(editable.value_at(0, 1).as_deref(), Some("-"));

    editable
        .apply_edit(Edit::alternative(0, 1, "North", vec!["North".into()]))
        .unwrap();
    assert_eq!(editable.edited_blocks(), ["thence North 40 feet"]);
    assert_eq!(editable.value_at(0, 1).as_deref(), Some("North"));

    editable.apply_edit(Edit::manual(0, 1, "-")).unwrap();
    assert_eq!(editable.edited_blocks(), ["thence 40 feet"]);
}

#[test]
fn new_edit_discards_redo_branch() {
    let draft = Draft::single_block("a", "legal_text", "4 00 N");
    let mut editable = EditableDraft::new(&draft, None);
    editable.apply_edit(Edit::manual(0, 0, "6")).unwrap();
    editable.apply_edit(Edit::manual(0, 1, "08")).unwrap();
    editable.undo();
    editable.apply_edit(Edit::manual(0, 2, "E")).unwrap();

    assert_eq!(editable.history().len(), 2);
    assert!(!editable.can_redo());
    assert_eq!(editable.edited_blocks(), ["6 00 E"]);
    assert_eq!(editable.history()[1].id, 3);
}

#[test]
fn invalid_edits_are_rejected_without_change() {
    let draft = Draft::single_block("a", "legal_text", "4 00 N");
    let mut editable = EditableDraft::new(&draft, None);

    assert_eq!(
        editable.apply_edit(Edit::manual(3, 0, "x")).unwrap_err(),
        EditError::BlockOutOfRange { index: 3, count: 1 }
    );
    assert_eq!(
        editable.apply_edit(Edit::manual(0, 3, "x")).unwrap_err(),
        EditError::TokenOutOfRange { block_index: 0, index: 3, count: 3 }
    );
    assert!(editable.history().is_empty());
    assert!(!editable.has_unsaved_changes());
    assert_eq!(editable.edited_blocks(), ["4 00 N"]);
}

#[test]
fn edits_touch_only_their_block() {
    let content = "Lot 3, Block 7\n\n\nthence North 40 feet\n";
    let mut editable = EditableDraft::from_document("a", content, None);
    assert_eq!(editable.to_draft(), draft_from_document("a", content));
    editable.apply_edit(Edit::manual(1, 1, "South")).unwrap();
    assert_eq!(editable.edited_blocks(), ["Lot 3, Block 7", "thence South 40 feet"]);
    assert_eq!(editable.original_content(), content);
    assert_eq!(editable.edited_content(), "Lot 3, Block 7\n\n\nthence South 40 feet\n");
    assert_eq!(editable.to_draft().blocks[1].text, "thence South 40 feet");
}

#[test]
fn reset_and_save() {
    let (draft, blocks) = aligned("thence 40 feet", "thence North 40 feet");
    let mut editable = EditableDraft::new(&draft, Some(&blocks));

    editable.apply_edit(Edit::manual(0, 2, "45")).unwrap();
    editable.reset_to_original();
    assert_eq!(editable.edited_blocks(), ["thence 40 feet"]);
    assert_eq!(editable.current_history_index(), -1);
    assert!(editable.history().is_empty());

    editable.apply_edit(Edit::manual(0, 2, "45")).unwrap();
    editable.save_as_original();
    assert_eq!(editable.original_blocks(), ["thence 45 feet"]);
    assert!(editable.history().is_empty());
    assert!(!editable.has_unsaved_changes());
    assert!(!editable.undo());
    assert!(editable.layout(0).unwrap().is_aligned());

    // Two words in one column no longer fit the column mapping.
    editable.apply_edit(Edit::manual(0, 1, "North 10")).unwrap();
    editable.save_as_original();
    assert_eq!(editable.original_blocks(), ["thence North 10 45 feet"]);
    assert!(!editable.layout(0).unwrap().is_aligned());
}

#[test]
fn sectioned_document_survives_save() {
    let content = r#"{"title":"Deed","sections":[{"id":1,"header":"LEGAL","body":"Lot 3 Blk 7"},{"id":2,"header":"CALLS","body":"thence North 10 feet"}]}"#;
    let mut editable = EditableDraft::from_document("a", content, None);
    assert_eq!(editable.block_ids(), ["block_0", "block_1"]);

    editable.apply_edit(Edit::manual(1, 2, "12")).unwrap();
    editable.save_as_original();
    editable.apply_edit(Edit::manual(0, 3, "8")).unwrap();

    let saved: serde_json::Value = serde_json::from_str(editable.original_content()).unwrap();
    assert_eq!(saved["sections"][1]["body"], "thence North 12 feet");
    assert_eq!(saved["sections"][0]["body"], "Lot 3 Blk 7");

    let edited: serde_json::Value = serde_json::from_str(&editable.edited_content()).unwrap();
    assert_eq!(edited["title"], "Deed");
    assert_eq!(edited["sections"][0]["header"], "LEGAL");
    assert_eq!(edited["sections"][1]["header"], "CALLS");
    assert_eq!(edited["sections"][0]["body"], "Lot 3 Blk 8");
    assert_eq!(edited["sections"][1]["body"], "thence North 12 feet");

    // The persisted state rebuilds the document without the caller's copy.
    let restored = EditableDraft::from_history(editable.state(), None);
    assert_eq!(restored.edited_content(), editable.edited_content());
    assert_eq!(editable.state().edited_content, editable.edited_content());
}

#[test]
fn state_restores_by_replay() {
    let draft = Draft::single_block("a", "legal_text", "4 00 N");
    let mut editable = EditableDraft::new(&draft, None);
    editable.apply_edit(Edit::manual(0, 0, "6")).unwrap();
    editable.apply_edit(Edit::manual(0, 2, "E")).unwrap();

    assert_eq!(editable.state().edited_content, "6 00 E");
    let json = serde_json::to_string(&editable.state()).unwrap();
    let state: EditableDraftState = serde_json::from_str(&json).unwrap();
    assert_eq!(state, editable.state());
    let restored = EditableDraft::from_history(state.clone(), None);
    assert_eq!(restored.edited_blocks(), ["6 00 E"]);

    let mut corrupt = state.clone();
    corrupt.edit_history[0].block_index = 9;
    corrupt.edited_blocks = vec!["garbage".to_string()];
    let restored = EditableDraft::from_history(corrupt, None);
    assert_eq!(restored.edited_blocks(), ["4 00 E"]);

    let mut stale_content = state.clone();
    stale_content.original_content = "4 00 N\n\nthence".to_string();
    let restored = EditableDraft::from_history(stale_content, None);
    assert_eq!(restored.original_content(), "4 00 N");
    assert_eq!(restored.edited_content(), "6 00 E");

    let mut ahead = state;
    ahead.current_history_index = 10;
    let mut restored = EditableDraft::from_history(ahead, None);
    assert_eq!(restored.current_history_index(), 1);
    restored.apply_edit(Edit::manual(0, 1, "08")).unwrap();
    assert_eq!(restored.history()[2].id, 3);
}
