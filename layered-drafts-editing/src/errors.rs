//! Errors for edits that cannot be recorded.
//!
//! A rejected edit leaves the working draft untouched. Undo and redo past the
//! ends of the history are no-ops, not errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("block index {index} is out of range ({count} blocks)")]
    BlockOutOfRange { index: usize, count: usize },

    #[error("token index {index} is out of range for block {block_index} ({count} positions)")]
    TokenOutOfRange {
        block_index: usize,
        index: usize,
        count: usize,
    },

    #[error("no draft is selected")]
    NoDraftSelected,

    #[error("unknown draft '{0}'")]
    UnknownDraft(String),
}

pub type EditResult<T> = Result<T, EditError>;
