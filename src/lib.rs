#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Draft model and tokenizer for multi-draft transcription.
//!
//! A scanned legal land description is transcribed several times by
//! independent OCR/LLM passes. Each pass produces a [`Draft`] split into named
//! [`DraftBlock`]s. This crate holds what every later stage shares:
//!
//! - [`Draft`] / [`DraftBlock`] / [`DraftGeneration`] - inputs to alignment
//! - [`tokenize`] - splits block text into [`Token`]s with a cleaned core
//!   for comparison and the literal original slice for re-display
//! - [`AlignmentConfig`] - TOML-loadable scoring, confidence and retry settings
//! - [`DraftError`] - the shared error type
//!
//! Alignment lives in `layered-drafts-alignment`, document formatting in
//! `layered-drafts-document` and the editable working draft in
//! `layered-drafts-editing`.
//!
//! ## Example
//!
//! ```
//! use layered_drafts::tokenize;
//!
//! let tokens = tokenize("thence N.4°00'W. 1,638.5 feet");
//! assert_eq!(tokens.cleaned(), vec!["thence", "N", "4", "00", "W", "1638.5", "feet"]);
//! assert_eq!(tokens.original()[1..5], ["N.", "4°", "00'", "W."]);
//! ```

mod config;
mod draft;
mod errors;
mod token;

pub use config::{
    AlignmentConfig, ConfidenceConfig, ScoringConfig, TransportConfig, DEFAULT_CONSENSUS_STRATEGY,
};
pub use draft::{
    validate_drafts, Draft, DraftBlock, DraftGeneration, CONSENSUS_DRAFT_ID, GAP,
};
pub use errors::{DraftError, DraftResult, MIN_ALIGNABLE_DRAFTS};
pub use token::{fold_case, tokenize, tokens_equal, whitespace_words, Token, TokenizedText};

#[cfg(test)]
mod tests {
    mod tokenize_drafts;
}
