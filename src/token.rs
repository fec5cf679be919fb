//! Tokenization of draft text into comparable tokens.
//!
//! Every token carries two renderings:
//!
//! - `cleaned`: the alphanumeric core used for alignment (`4°` -> `4`,
//!   `1,638` -> `1638`, `(30)` -> `30`)
//! - `original`: the literal slice of the source text, with the punctuation and
//!   unit markers that surround the core
//!
//! ```text
//! N.4°00'W.  ->  cleaned:  N    4   00   W
//!                original: N.   4°  00'  W.
//! ```
//!
//! The originals of one whitespace-delimited word concatenate back to that
//! word. Words without any alphanumeric character (a lone `&` or `—`) produce
//! no token and stay untouched in the source text.
//!
//! Cleaned tokens keep their case; comparisons go through [`tokens_equal`],
//! which is case-insensitive.

use serde::{Deserialize, Serialize};

/// One comparable token and its location in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Alphanumeric core used for alignment.
    pub cleaned: String,
    /// Literal source slice, including attached punctuation.
    pub original: String,
    /// Byte position where the original slice starts (inclusive).
    pub start: usize,
    /// Byte position where the original slice ends (exclusive).
    pub end: usize,
}

/// Tokens of one text, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizedText {
    tokens: Vec<Token>,
}

impl TokenizedText {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Cleaned tokens, parallel to [`original`](Self::original).
    pub fn cleaned(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.cleaned.as_str()).collect()
    }

    /// Original (formatted) tokens, parallel to [`cleaned`](Self::cleaned).
    pub fn original(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.original.as_str()).collect()
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }
}

/// Split `text` into tokens. Empty or blank text yields no tokens.
pub fn tokenize(text: &str) -> TokenizedText {
    let mut tokens = Vec::new();
    for (word_start, word_end) in whitespace_words(text) {
        tokenize_word(text, word_start, word_end, &mut tokens);
    }
    TokenizedText { tokens }
}

/// Case-insensitive token comparison.
pub fn tokens_equal(a: &str, b: &str) -> bool {
    a == b || fold_case(a) == fold_case(b)
}

/// Case-folded form used as a comparison key.
pub fn fold_case(token: &str) -> String {
    token.to_lowercase()
}

/// Byte spans `(start, end)` of every maximal non-whitespace run in `text`.
pub fn whitespace_words(text: &str) -> Vec<(usize, usize)> {
    let mut words = Vec::new();
    let mut start = None;
    for (idx, ch) in text.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                words.push((s, idx));
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    if let Some(s) = start {
        words.push((s, text.len()));
    }
    words
}

/// An alphanumeric run inside one word, as byte offsets into the full text.
struct Run {
    start: usize,
    end: usize,
    cleaned: String,
}

fn tokenize_word(text: &str, word_start: usize, word_end: usize, out: &mut Vec<Token>) {
    let word = &text[word_start..word_end];
    let chars: Vec<(usize, char)> = word.char_indices().collect();

    let mut runs: Vec<Run> = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let (offset, ch) = chars[i];
        if !ch.is_alphanumeric() {
            i += 1;
            continue;
        }

        let mut cleaned = String::new();
        let mut j = i;
        while j < chars.len() {
            let c = chars[j].1;
            if c.is_alphanumeric() {
                cleaned.push(c);
            } else if is_numeric_joiner(&chars, j) {
                // Thousands separators vanish, decimal points survive.
                if c == '.' {
                    cleaned.push(c);
                }
            } else {
                break;
            }
            j += 1;
        }

        let run_end = chars.get(j).map_or(word.len(), |(o, _)| *o);
        runs.push(Run {
            start: word_start + offset,
            end: word_start + run_end,
            cleaned,
        });
        i = j;
    }

    let last = runs.len().saturating_sub(1);
    for (k, run) in runs.iter().enumerate() {
        let start = if k == 0 { word_start } else { run.start };
        let end = if k == last {
            word_end
        } else {
            runs[k + 1].start
        };
        debug_assert!(start <= run.start && run.end <= end);
        out.push(Token {
            cleaned: run.cleaned.clone(),
            original: text[start..end].to_string(),
            start,
            end,
        });
    }
}

/// `,` or `.` sitting between two ASCII digits.
fn is_numeric_joiner(chars: &[(usize, char)], idx: usize) -> bool {
    let c = chars[idx].1;
    if c != ',' && c != '.' {
        return false;
    }
    let before = idx
        .checked_sub(1)
        .and_then(|p| chars.get(p))
        .map_or(false, |(_, ch)| ch.is_ascii_digit());
    let after = chars
        .get(idx + 1)
        .map_or(false, |(_, ch)| ch.is_ascii_digit());
    before && after
}
