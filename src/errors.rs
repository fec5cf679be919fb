//! Error types shared by the draft crates.
//!
//! Public boundaries that must never fail (alignment, consensus, document
//! formatting) convert these into failure values; internal steps propagate
//! them with `?`.

use thiserror::Error;

/// Minimum number of successful drafts an alignment needs.
pub const MIN_ALIGNABLE_DRAFTS: usize = 2;

/// Errors that can occur while preparing, configuring or aligning drafts.
#[derive(Debug, Error)]
pub enum DraftError {
    /// Fewer than [`MIN_ALIGNABLE_DRAFTS`] successful drafts were supplied.
    #[error("At least 2 successful drafts are required for alignment (found {found})")]
    InsufficientDrafts { found: usize },

    /// A draft failed boundary validation.
    #[error("invalid draft: {message}")]
    InvalidDraft { message: String },

    /// Configuration could not be read, parsed or validated.
    #[error("invalid configuration: {path}: {message}")]
    Config { path: String, message: String },

    /// The alignment backend could not be reached or answered garbage.
    #[error("transport error: {message}")]
    Transport { message: String },
}

impl DraftError {
    pub fn invalid_draft(message: impl Into<String>) -> Self {
        Self::InvalidDraft {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub(crate) fn config(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Result type for draft operations.
pub type DraftResult<T> = Result<T, DraftError>;
