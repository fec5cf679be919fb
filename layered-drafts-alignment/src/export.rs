//! CSV export of the alignment table.
//!
//! Per block: a header row naming the block and the drafts, then one row per
//! column with the 1-based position and each draft's token. Every field is
//! quoted with embedded quotes doubled; blocks are separated by an empty row.

use crate::wire::AlignmentBlocks;

/// Which token rendering to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvTokens {
    /// Formatted original tokens where available.
    #[default]
    Display,
    Cleaned,
}

pub fn to_csv(blocks: &AlignmentBlocks, tokens: CsvTokens) -> String {
    let mut rows: Vec<String> = Vec::new();
    for (i, (block_id, block)) in blocks.iter().enumerate() {
        if i > 0 {
            rows.push(String::new());
        }

        let header = std::iter::once(format!("Block: {}", block_id))
            .chain(block.aligned_sequences.iter().map(|s| s.draft_id.clone()));
        rows.push(csv_row(header));

        for column in 0..block.width() {
            let cells = block.aligned_sequences.iter().map(|s| {
                let token = match tokens {
                    CsvTokens::Display => s.display_token(column),
                    CsvTokens::Cleaned => s.tokens.get(column).map(String::as_str),
                };
                token.unwrap_or(layered_drafts::GAP).to_string()
            });
            rows.push(csv_row(std::iter::once((column + 1).to_string()).chain(cells)));
        }
    }
    rows.join("\n")
}

fn csv_row(fields: impl Iterator<Item = String>) -> String {
    fields.map(|f| quote(&f)).collect::<Vec<_>>().join(",")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
