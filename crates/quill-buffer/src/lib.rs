//! # Quill Buffer
//!
//! Line-structured text storage with exact, node-preserving undo/redo.
//!
//! ## Key Concepts for Learning Rust
//!
//! ### Ownership & Borrowing
//! - `Buffer` owns every line through a `LineStore` arena
//! - Cursors, the mark and undo actions refer to lines by `LineId`, a
//!   plain `Copy` index, so they never borrow the buffer
//! - Mutations require `&mut Buffer`; observers of a mutation only get
//!   `&Buffer`
//!
//! ### Memory Safety
//! - Unlinked lines keep their arena slot, so a stale `LineId` is never a
//!   dangling pointer and undo can bring the line back
//! - Invalid UTF-8 is kept as raw bytes and decoded lossily when needed

mod action;
mod buffer;
mod cursor;
mod history;
mod line;
mod location;
mod reader;

pub use action::{Action, ActionKind, EditObserver};
pub use buffer::{Buffer, ViewId};
pub use cursor::Cursor;
pub use history::{ActionGroup, History};
pub use line::{Line, LineId, LineIter, LineStore};
pub use location::{
    decode_last_rune, decode_rune, find_closest_offsets, is_word, rune_advance, voffset_coffset,
    Offsets, TopLineChange, ViewLocation, DEFAULT_TAB_WIDTH,
};
pub use reader::BufferReader;

/// Result type for buffer operations
pub type BufferResult<T> = Result<T, BufferError>;

/// Errors that can occur during buffer operations
#[derive(Debug, thiserror::Error)]
pub enum BufferError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
