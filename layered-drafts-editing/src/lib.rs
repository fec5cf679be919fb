#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Editable working drafts for layered-drafts.
//!
//! A reviewer reconciles aligned drafts by picking alternatives or typing
//! corrections position by position. Every change is an [`EditOperation`] in
//! a history, and the working text is always the replay of that history over
//! the original draft.
//!
//! ## Core Types
//!
//! - [`EditableDraft`] - apply / undo / redo / reset / save over a draft
//! - [`BlockLayout`] - maps aligned columns (or whitespace words, without
//!   alignment data) to slices of a block's text
//! - [`DraftSession`] - one document's drafts, alignment and working draft,
//!   with stale-response protection and [`SessionEvent`] subscriptions
//!
//! ## Example
//!
//! ```
//! use layered_drafts::Draft;
//! use layered_drafts_editing::{Edit, EditableDraft};
//!
//! let draft = Draft::single_block("draft_1", "legal_text", "4 00 N");
//! let mut editable = EditableDraft::new(&draft, None);
//!
//! editable.apply_edit(Edit::manual(0, 0, "6")).unwrap();
//! assert_eq!(editable.edited_blocks(), ["6 00 N"]);
//!
//! editable.undo();
//! assert_eq!(editable.edited_blocks(), ["4 00 N"]);
//! ```

mod editable;
mod errors;
mod layout;
mod operation;
mod session;

pub use editable::{EditableDraft, EditableDraftState};
pub use errors::{EditError, EditResult};
pub use layout::{is_deletion, BlockLayout, Overrides, Slot};
pub use operation::{Edit, EditOperation, EditType};
pub use session::{AlignmentTicket, Direction, DraftSession, SessionEvent};
