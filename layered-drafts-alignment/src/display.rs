use std::fmt::{self, Write};

use unicode_width::UnicodeWidthStr;

use crate::confidence::ConfidenceAnalyzer;
use crate::wire::{AlignmentBlock, AlignmentBlocks};

const SPACE_PADDING: usize = 2;

/// Column-padded text rendering of an alignment block.
///
/// ```text
/// a          N.  4°  00'  W.  40  feet
/// b          N   4   00   W   40  ft
/// consensus  N.  4°  00'  W.  40  feet
///                                 ^
/// ```
///
/// One line per sequence. The optional marker line points at differing
/// columns.
pub struct BlockDisplay<'a> {
    block: &'a AlignmentBlock,
    cleaned: bool,
    analyzer: Option<ConfidenceAnalyzer>,
}

impl<'a> BlockDisplay<'a> {
    pub fn new(block: &'a AlignmentBlock) -> Self {
        BlockDisplay {
            block,
            cleaned: false,
            analyzer: None,
        }
    }

    /// Show cleaned tokens instead of formatted originals.
    pub fn cleaned(mut self) -> Self {
        self.cleaned = true;
        self
    }

    /// Add a marker line under columns the analyzer reports as differences.
    pub fn mark_differences(mut self, analyzer: ConfidenceAnalyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    fn cell(&self, row: usize, column: usize) -> &'a str {
        let sequence = &self.block.aligned_sequences[row];
        let token = if self.cleaned {
            sequence.tokens.get(column).map(String::as_str)
        } else {
            sequence.display_token(column)
        };
        token.unwrap_or(layered_drafts::GAP)
    }
}

impl<'a> fmt::Display for BlockDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rows = self.block.aligned_sequences.len();
        let width = self
            .block
            .aligned_sequences
            .iter()
            .map(|s| s.tokens.len())
            .max()
            .unwrap_or(0);

        let label_width = self
            .block
            .aligned_sequences
            .iter()
            .map(|s| UnicodeWidthStr::width(s.draft_id.as_str()))
            .max()
            .unwrap_or(0);
        let column_widths: Vec<usize> = (0..width)
            .map(|c| {
                (0..rows)
                    .map(|r| UnicodeWidthStr::width(self.cell(r, c)))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(rows + 1);
        for (r, sequence) in self.block.aligned_sequences.iter().enumerate() {
            let mut line = String::new();
            pad_into(&mut line, &sequence.draft_id, label_width)?;
            for (c, column_width) in column_widths.iter().enumerate() {
                line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
                pad_into(&mut line, self.cell(r, c), *column_width)?;
            }
            lines.push(line);
        }

        if let Some(analyzer) = &self.analyzer {
            let differing: Vec<usize> = analyzer
                .analyze_block(self.block)
                .into_iter()
                .filter(|c| c.is_difference())
                .map(|c| c.column)
                .collect();
            if !differing.is_empty() {
                let mut line = " ".repeat(label_width);
                for (c, column_width) in column_widths.iter().enumerate() {
                    line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
                    let marker = if differing.contains(&c) { "^" } else { "" };
                    pad_into(&mut line, marker, *column_width)?;
                }
                lines.push(line);
            }
        }

        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            f.write_str(line.trim_end())?;
        }
        Ok(())
    }
}

fn pad_into(line: &mut String, text: &str, width: usize) -> fmt::Result {
    line.write_str(text)?;
    let used = UnicodeWidthStr::width(text);
    line.extend(std::iter::repeat(' ').take(width.saturating_sub(used)));
    Ok(())
}

/// Render every block under a `[block_id]` heading, blank line between blocks.
pub fn display_blocks(blocks: &AlignmentBlocks, analyzer: Option<ConfidenceAnalyzer>) -> String {
    let mut out = String::new();
    for (i, (block_id, block)) in blocks.iter().enumerate() {
        if i > 0 {
            out.push_str("\n\n");
        }
        out.push('[');
        out.push_str(block_id);
        out.push_str("]\n");
        let display = match analyzer {
            Some(analyzer) => BlockDisplay::new(block).mark_differences(analyzer),
            None => BlockDisplay::new(block),
        };
        out.push_str(&display.to_string());
    }
    out
}
