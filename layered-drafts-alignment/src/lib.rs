#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Multi-draft token alignment for layered-drafts.
//!
//! Given two or more drafts of the same document, every block is tokenized
//! and aligned into a common column grid. The grid is then scored, voted into
//! a consensus and rendered.
//!
//! ## Alignment
//!
//! - [`align`] - request in, [`AlignmentResponse`] out, failures encoded in
//!   the response
//! - [`align_drafts`] - the fallible core returning [`AlignmentBlocks`]
//! - [`ProfileAligner`] - progressive sum-of-pairs dynamic program
//!
//! ## Analysis
//!
//! - [`ConfidenceAnalyzer`] - agreed/mismatched columns and summaries
//! - [`find_differences`] / [`suggestions`] - categorised differences and
//!   reference-vs-alternative lists
//! - [`generate_consensus`] / [`insert_consensus`] - synthetic `"consensus"`
//!   sequence
//!
//! ## Output
//!
//! - [`BlockDisplay`] - column-padded text grid
//! - [`to_csv`] - CSV alignment table
//! - [`request_alignment`] - one-retry delivery over an [`AlignmentTransport`]
//!
//! ## Example
//!
//! ```
//! use layered_drafts::{AlignmentConfig, Draft};
//! use layered_drafts_alignment::{align, AlignmentRequest};
//!
//! let request = AlignmentRequest::new(vec![
//!     Draft::single_block("gpt", "legal_text", "4 00 N"),
//!     Draft::single_block("claude", "legal_text", "6 08 E"),
//! ]);
//! let response = align(&request, &AlignmentConfig::default());
//! assert!(response.success);
//! assert_eq!(response.summary.total_differences_found, 3);
//! ```

mod aligner;
mod confidence;
mod consensus;
mod differences;
mod display;
mod engine;
mod export;
mod transport;
mod wire;

pub use aligner::{AlignmentGrid, ProfileAligner};
pub use confidence::{quality_label, summarize, ColumnAnalysis, ConfidenceAnalyzer, ConfidenceLevel};
pub use consensus::{
    consensus_sequence, generate_consensus, insert_consensus, ConsensusBlock, ConsensusDraft,
    ConsensusStrategy, NO_CONSENSUS,
};
pub use differences::{
    categorize, find_differences, suggestions, Difference, DifferenceCategory, DraftToken,
    Suggestion,
};
pub use display::{display_blocks, BlockDisplay};
pub use engine::{align, align_block, align_drafts};
pub use export::{to_csv, CsvTokens};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{parse_response, request_alignment, AlignmentTransport, LocalTransport};
pub use wire::{
    AlignedSequence, AlignmentBlock, AlignmentBlocks, AlignmentRequest, AlignmentResponse,
    AlignmentResults, ConfidenceDistribution, ConfidenceSummary, NO_DATA_QUALITY,
};
