use crate::{tokenize, validate_drafts, Draft, DraftBlock, DraftError, TokenizedText};

fn render(tokens: &TokenizedText) -> String {
    tokens
        .tokens()
        .iter()
        .map(|t| format!("{} -> {} [{}..{}]", t.original, t.cleaned, t.start, t.end))
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn legal_call_tokens() {
    let tokens = tokenize("Lot 3, N.4°00'W. 1,638.5 ft");
    insta::assert_snapshot!(render(&tokens), @r"
    Lot -> Lot [0..3]
    3, -> 3 [4..6]
    N. -> N [7..9]
    4° -> 4 [9..12]
    00' -> 00 [12..15]
    W. -> W [15..17]
    1,638.5 -> 1638.5 [18..25]
    ft -> ft [26..28]
    ");
}

#[test]
fn paragraphs_tokenize_across_blank_lines() {
    let tokens = tokenize("Beginning at a point;\n\nthence South 40 feet.");
    assert_eq!(
        tokens.cleaned(),
        vec!["Beginning", "at", "a", "point", "thence", "South", "40", "feet"]
    );
    assert_eq!(tokens.original()[3], "point;");
    assert_eq!(tokens.original()[7], "feet.");
}

#[test]
fn cleaned_and_original_stay_parallel() {
    for text in ["", "&", "(a) [b] \"c\"", "37°15'30\"", "1,2,3.4.5"] {
        let tokens = tokenize(text);
        assert_eq!(tokens.cleaned().len(), tokens.original().len(), "{text:?}");
    }
}

#[test]
fn multi_block_drafts_validate() {
    let drafts = vec![
        Draft::new(
            "gpt",
            vec![
                DraftBlock::new("legal_text", "Lot 3"),
                DraftBlock::new("notes", "none"),
            ],
        ),
        Draft::single_block("claude", "legal_text", "Lot 8"),
    ];
    assert!(validate_drafts(&drafts).is_ok());
    assert_eq!(drafts[0].block("notes").map(|b| b.text.as_str()), Some("none"));

    let err = validate_drafts(&drafts[..1]).unwrap_err();
    assert!(matches!(err, DraftError::InsufficientDrafts { found: 1 }));
}
