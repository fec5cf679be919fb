//! Where each editable position of a block lives in its text.
//!
//! A block is edited in one of two ways:
//!
//! - **Aligned**: the block's draft has an aligned sequence with a valid
//!   `original_to_alignment`. Positions are aligned columns; a column holding
//!   one of the draft's tokens addresses that token's slice, a gap column
//!   addresses an insertion point.
//! - **Naive**: no usable alignment data. Positions are whitespace-delimited
//!   words.
//!
//! Either way the text of a block is rebuilt from its original text plus a
//! set of per-slot overrides, never patched in place.

use std::collections::BTreeMap;
use std::ops::Range;

use layered_drafts::{tokenize, whitespace_words, GAP};
use layered_drafts_alignment::AlignedSequence;
use layered_drafts_document::replace_preserving_format;
use tracing::warn;

/// An editable position of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Slot {
    /// The n-th token (aligned) or word (naive) of the original text.
    Token(usize),
    /// A word added at a column where the draft has a gap.
    Insert { column: usize },
}

/// Latest value per slot.
pub type Overrides = BTreeMap<Slot, String>;

/// Whether `value` removes the token it is applied to.
pub fn is_deletion(value: &str) -> bool {
    value.trim().is_empty() || value == GAP
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockLayout {
    Aligned {
        spans: Vec<Range<usize>>,
        /// Column of each span, strictly increasing.
        columns: Vec<usize>,
        width: usize,
    },
    Naive {
        spans: Vec<Range<usize>>,
    },
}

impl BlockLayout {
    pub fn naive(text: &str) -> Self {
        BlockLayout::Naive {
            spans: whitespace_words(text)
                .into_iter()
                .map(|(start, end)| start..end)
                .collect(),
        }
    }

    /// Layout from an aligned sequence of `text`, if its mapping is usable.
    pub fn aligned(text: &str, sequence: &AlignedSequence) -> Result<Self, String> {
        let columns = sequence
            .original_to_alignment
            .as_ref()
            .ok_or_else(|| "sequence has no original_to_alignment".to_string())?;
        let width = sequence.tokens.len();
        let tokens = tokenize(text);

        if columns.len() != tokens.len() {
            return Err(format!(
                "{} mapped positions for {} tokens",
                columns.len(),
                tokens.len()
            ));
        }
        if columns.windows(2).any(|w| w[0] >= w[1]) {
            return Err("mapping is not strictly increasing".to_string());
        }
        if let Some(column) = columns.iter().find(|&&c| c >= width) {
            return Err(format!("column {} is outside width {}", column, width));
        }

        Ok(BlockLayout::Aligned {
            spans: tokens.tokens().iter().map(|t| t.start..t.end).collect(),
            columns: columns.clone(),
            width,
        })
    }

    /// Aligned layout when `sequence` allows it, naive otherwise.
    pub fn for_block(block_id: &str, text: &str, sequence: Option<&AlignedSequence>) -> Self {
        let Some(sequence) = sequence else {
            return Self::naive(text);
        };
        match Self::aligned(text, sequence) {
            Ok(layout) => layout,
            Err(reason) => {
                warn!(
                    block_id,
                    draft_id = %sequence.draft_id,
                    %reason,
                    "alignment data rejected, editing by whitespace words"
                );
                Self::naive(text)
            }
        }
    }

    pub fn is_aligned(&self) -> bool {
        matches!(self, BlockLayout::Aligned { .. })
    }

    pub fn spans(&self) -> &[Range<usize>] {
        match self {
            BlockLayout::Aligned { spans, .. } | BlockLayout::Naive { spans } => spans,
        }
    }

    /// Number of addressable positions.
    pub fn positions(&self) -> usize {
        match self {
            BlockLayout::Aligned { width, .. } => *width,
            BlockLayout::Naive { spans } => spans.len(),
        }
    }

    pub fn slot(&self, index: usize) -> Option<Slot> {
        match self {
            BlockLayout::Aligned { columns, width, .. } => {
                if index >= *width {
                    return None;
                }
                Some(match columns.binary_search(&index) {
                    Ok(token) => Slot::Token(token),
                    Err(_) => Slot::Insert { column: index },
                })
            }
            BlockLayout::Naive { spans } => (index < spans.len()).then_some(Slot::Token(index)),
        }
    }

    /// Value shown at `slot`: its override, the original slice, or the gap
    /// marker for an empty insertion point.
    pub fn value_at(&self, text: &str, overrides: &Overrides, slot: Slot) -> String {
        if let Some(value) = overrides.get(&slot) {
            return value.clone();
        }
        match slot {
            Slot::Token(i) => self
                .spans()
                .get(i)
                .map_or_else(|| GAP.to_string(), |span| text[span.clone()].to_string()),
            Slot::Insert { .. } => GAP.to_string(),
        }
    }

    /// Columns holding a word once `overrides` are applied. `None` for naive
    /// layouts.
    pub fn live_columns(&self, overrides: &Overrides) -> Option<Vec<usize>> {
        let BlockLayout::Aligned { columns, .. } = self else {
            return None;
        };
        let mut live: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(i, _)| {
                overrides
                    .get(&Slot::Token(*i))
                    .map_or(true, |value| !is_deletion(value))
            })
            .map(|(_, &column)| column)
            .collect();
        for (slot, value) in overrides {
            if let Slot::Insert { column } = slot {
                if !is_deletion(value) {
                    live.push(*column);
                }
            }
        }
        live.sort_unstable();
        Some(live)
    }

    /// Rebuild `text` with `overrides` applied.
    ///
    /// Replacements keep the formatting markers of the slice they replace.
    /// A deleted token takes one adjacent whitespace run with it. Inserted
    /// words go before the next token of the draft, or after the last one.
    pub fn render(&self, text: &str, overrides: &Overrides) -> String {
        if overrides.is_empty() {
            return text.to_string();
        }
        let spans = self.spans();
        let mut inserts = self.insertions(overrides).into_iter().peekable();
        let mut pieces = Vec::with_capacity(spans.len() * 2 + 2);
        let mut cursor = 0;

        for (i, span) in spans.iter().enumerate() {
            pieces.push(Piece::Text(text[cursor..span.start].to_string()));
            while let Some((_, value)) = inserts.next_if(|(anchor, _)| *anchor == i) {
                pieces.push(Piece::Word(value));
                pieces.push(Piece::Text(" ".to_string()));
            }
            let original = &text[span.clone()];
            pieces.push(match overrides.get(&Slot::Token(i)) {
                None => Piece::Word(original.to_string()),
                Some(value) if is_deletion(value) => Piece::Deleted,
                Some(value) => Piece::Word(replace_preserving_format(original, value)),
            });
            cursor = span.end;
        }

        let mut has_words = !spans.is_empty();
        for (_, value) in inserts {
            if has_words {
                pieces.push(Piece::Text(" ".to_string()));
            }
            pieces.push(Piece::Word(value));
            has_words = true;
        }
        pieces.push(Piece::Text(text[cursor..].to_string()));

        join(pieces)
    }

    /// `(index of the token it precedes, value)` per non-empty insertion, in
    /// column order. Trailing insertions precede `spans().len()`.
    fn insertions(&self, overrides: &Overrides) -> Vec<(usize, String)> {
        let BlockLayout::Aligned { columns, .. } = self else {
            return Vec::new();
        };
        overrides
            .iter()
            .filter_map(|(slot, value)| match slot {
                Slot::Insert { column } if !is_deletion(value) => Some((
                    columns.partition_point(|&c| c < *column),
                    value.trim().to_string(),
                )),
                _ => None,
            })
            .collect()
    }
}

enum Piece {
    Text(String),
    Word(String),
    Deleted,
}

fn join(mut pieces: Vec<Piece>) -> String {
    for k in 0..pieces.len() {
        if !matches!(pieces[k], Piece::Deleted) {
            continue;
        }
        let words_follow = pieces[k + 1..].iter().any(|p| matches!(p, Piece::Word(_)));
        if words_follow {
            if let Some(Piece::Text(next)) = pieces.get_mut(k + 1) {
                *next = next.trim_start().to_string();
            }
        } else if k > 0 {
            if let Some(Piece::Text(previous)) = pieces.get_mut(k - 1) {
                *previous = previous.trim_end().to_string();
            }
        }
    }

    pieces
        .into_iter()
        .map(|piece| match piece {
            Piece::Text(s) | Piece::Word(s) => s,
            Piece::Deleted => String::new(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides(entries: &[(Slot, &str)]) -> Overrides {
        entries
            .iter()
            .map(|(slot, value)| (*slot, value.to_string()))
            .collect()
    }

    fn sequence(tokens: &[&str], mapping: Vec<usize>) -> AlignedSequence {
        AlignedSequence {
            draft_id: "a".to_string(),
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            original_to_alignment: Some(mapping),
            exact_text: None,
            display_tokens: None,
        }
    }

    #[test]
    fn naive_replace_and_delete() {
        let layout = BlockLayout::naive("4 00 N");
        assert_eq!(layout.render("4 00 N", &overrides(&[(Slot::Token(0), "6")])), "6 00 N");
        assert_eq!(layout.render("4 00 N", &overrides(&[(Slot::Token(1), "")])), "4 N");
        assert_eq!(layout.render("4 00 N", &overrides(&[(Slot::Token(2), "-")])), "4 00");
        assert_eq!(
            layout.render("4 00 N", &overrides(&[(Slot::Token(1), "-"), (Slot::Token(2), "-")])),
            "4"
        );
        assert_eq!(layout.slot(3), None);
    }

    #[test]
    fn aligned_replacement_keeps_markers() {
        let text = "N.4°00'W. 40 feet";
        let layout =
            BlockLayout::aligned(text, &sequence(&["N", "4", "00", "W", "40", "feet"], vec![0, 1, 2, 3, 4, 5]))
                .unwrap();
        assert_eq!(
            layout.render(text, &overrides(&[(Slot::Token(1), "6"), (Slot::Token(3), "E")])),
            "N.6°00'E. 40 feet"
        );
        assert_eq!(layout.render(text, &overrides(&[(Slot::Token(1), "-")])), "N.00'W. 40 feet");
    }

    #[test]
    fn gap_columns_insert_words() {
        let text = "thence 40 feet";
        let layout =
            BlockLayout::aligned(text, &sequence(&["thence", "-", "40", "feet", "-"], vec![0, 2, 3])).unwrap();
        assert_eq!(layout.slot(1), Some(Slot::Insert { column: 1 }));
        assert_eq!(layout.slot(2), Some(Slot::Token(1)));
        assert_eq!(
            layout.render(text, &overrides(&[(Slot::Insert { column: 1 }, "North")])),
            "thence North 40 feet"
        );
        assert_eq!(
            layout.render(text, &overrides(&[(Slot::Insert { column: 4 }, "more")])),
            "thence 40 feet more"
        );
        assert_eq!(
            layout.render(text, &overrides(&[(Slot::Insert { column: 1 }, "-")])),
            text
        );
        assert_eq!(
            layout.live_columns(&overrides(&[(Slot::Insert { column: 1 }, "North"), (Slot::Token(2), "")])),
            Some(vec![0, 1, 2])
        );
    }

    #[test]
    fn inserts_into_empty_text() {
        let layout = BlockLayout::aligned("", &sequence(&["-", "-"], vec![])).unwrap();
        assert_eq!(
            layout.render("", &overrides(&[(Slot::Insert { column: 0 }, "Lot"), (Slot::Insert { column: 1 }, "3")])),
            "Lot 3"
        );
    }

    #[test]
    fn bad_mappings_are_rejected() {
        let text = "4 00 N";
        let tokens = ["4", "00", "N"];
        assert!(BlockLayout::aligned(text, &sequence(&tokens, vec![0, 1])).is_err());
        assert!(BlockLayout::aligned(text, &sequence(&tokens, vec![0, 2, 1])).is_err());
        assert!(BlockLayout::aligned(text, &sequence(&tokens, vec![0, 1, 3])).is_err());
        assert!(!BlockLayout::for_block("legal_text", text, Some(&sequence(&tokens, vec![0, 1]))).is_aligned());
        assert!(BlockLayout::for_block("legal_text", text, Some(&sequence(&tokens, vec![0, 1, 2]))).is_aligned());
    }
}
