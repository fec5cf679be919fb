use serde_json::json;

use crate::{
    drafts_from_generations, extract_blocks, normalize_documents, DocumentShape, SectionNormalizer,
    SectionedDocument,
};
use layered_drafts::DraftGeneration;

fn two_sections() -> String {
    json!({
        "sections": [
            {"id": 1, "header": "LEGAL", "body": "Lot 3 Block 7"},
            {"id": 2, "header": "EXCEPT", "body": "the North 10 feet"}
        ]
    })
    .to_string()
}

fn merged(body: &str) -> String {
    json!({"title": "Deed", "sections": [{"id": "s1", "header": "LEGAL", "body": body}]}).to_string()
}

#[test]
fn merged_section_is_split_at_the_aligned_boundary() {
    let documents = vec![two_sections(), merged("Lot 3 Blk 7\nthence North 10 feet")];
    let normalized = normalize_documents(&documents);

    assert_eq!(normalized[0], documents[0]);
    assert_eq!(
        extract_blocks(&normalized[1]),
        vec!["Lot 3 Blk 7", "thence North 10 feet"]
    );

    let shape = DocumentShape::parse(&normalized[1]);
    assert_eq!(shape.headers(), vec![Some("LEGAL".to_string()), None]);
    let value: serde_json::Value = serde_json::from_str(&normalized[1]).unwrap();
    assert_eq!(value["title"], "Deed");
    assert_eq!(value["sections"][0]["id"], 1);
    assert_eq!(value["sections"][1]["id"], 2);
}

#[test]
fn most_granular_draft_wins_regardless_of_order() {
    let merged_doc = SectionedDocument::parse(&merged("Lot 3 Block 7 the North 10 feet")).unwrap();
    let split_doc = SectionedDocument::parse(&two_sections()).unwrap();
    let normalized = SectionNormalizer::default().normalize(&[merged_doc, split_doc.clone()]);
    assert_eq!(normalized[0].bodies(), vec!["Lot 3 Block 7", "the North 10 feet"]);
    assert_eq!(normalized[1], split_doc);
}

#[test]
fn plain_text_and_equal_counts_are_untouched() {
    let plain = vec!["Lot 3\n\nBlock 7".to_string(), merged("Lot 3 Block 7")];
    assert_eq!(normalize_documents(&plain), plain);

    let equal = vec![merged("Lot 3"), merged("Lot 8")];
    assert_eq!(normalize_documents(&equal), equal);
}

#[test]
fn generations_are_normalized_before_blocking() {
    let generation = |text: String| DraftGeneration {
        success: true,
        text,
        model: None,
        confidence: Some(0.9),
        tokens_used: Some(120),
    };
    let drafts = drafts_from_generations(&[
        generation(two_sections()),
        generation(merged("Lot 3 Block 7 the North 10 feet")),
    ]);
    assert_eq!(drafts.len(), 2);
    for draft in &drafts {
        let ids: Vec<&str> = draft.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["block_0", "block_1"]);
    }
    assert_eq!(drafts[1].blocks[1].text, "the North 10 feet");
}
