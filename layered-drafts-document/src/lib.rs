//! Document formatting for layered-drafts.
//!
//! Drafts come back from transcription either as a JSON object with a
//! `sections` array or as plain text. This crate moves between a document and
//! its blocks, keeps formatting intact when tokens are replaced, and makes
//! sectioned drafts agree on their section count.
//!
//! ## Core Types
//!
//! - [`DocumentShape`] - [`SectionedDocument`] or [`FlatTextDocument`]
//! - [`extract_blocks`] / [`reconstruct`] - never fail; malformed JSON is
//!   treated as plain text
//! - [`replace_preserving_format`] - token replacement keeping `°`, `'`,
//!   brackets, quotes and thousands separators
//! - [`SectionNormalizer`] - splits under-sectioned drafts
//! - [`drafts_from_generations`] - OCR/LLM output to [`Draft`]s
//!
//! ## Example
//!
//! ```
//! use layered_drafts_document::{extract_blocks, reconstruct};
//!
//! let text = "Lot 3, Block 7\n\nthence N.4°00'W. 40 feet";
//! let mut blocks = extract_blocks(text);
//! blocks[1] = blocks[1].replace("40", "45");
//! assert_eq!(reconstruct(text, &blocks), "Lot 3, Block 7\n\nthence N.4°00'W. 45 feet");
//! ```
//!
//! [`Draft`]: layered_drafts::Draft

mod document;
mod intake;
mod normalize;
mod reformat;

pub use document::{
    extract_blocks, reconstruct, DocumentError, DocumentShape, FlatTextDocument, Section,
    SectionedDocument, PARAGRAPH_BREAK,
};
pub use intake::{block_id, documents_from_generations, draft_from_document, drafts_from_generations};
pub use normalize::{normalize_documents, SectionNormalizer};
pub use reformat::replace_preserving_format;
