//! # Quill Core
//!
//! Views onto buffers and the editor state that ties them together.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                        Editor                         │
//! │  ┌──────────┐ ┌───────────┐ ┌──────────────────────┐  │
//! │  │  Config  │ │ StatusLog │ │  CompletionSource    │  │
//! │  └──────────┘ └───────────┘ └──────────────────────┘  │
//! │                                                       │
//! │  ┌────────────────────┐     ┌──────────────────────┐  │
//! │  │  Buffers           │◄────┤  Views               │  │
//! │  │  (quill-buffer)    │     │  cursor, scroll,     │  │
//! │  │  lines + history   │     │  dirty flags         │  │
//! │  └────────────────────┘     └──────────────────────┘  │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! A [`Command`] is executed on one view. Edits it makes are applied to the
//! view's buffer, which notifies every other view attached to the same
//! buffer so their cursors and scroll positions stay valid.
//!
//! ## Learning: Module Organization
//!
//! Rust modules map to files:
//! - `mod foo;` looks for `foo.rs` or `foo/mod.rs`
//! - `pub use` re-exports items for cleaner public APIs

pub mod autocomplete;
pub mod command;
pub mod config;
pub mod editor;
pub mod status;
pub mod view;

pub use autocomplete::{Autocomplete, BufferWords, Completion, CompletionSession, CompletionSource};
pub use command::{Command, CommandClass};
pub use config::{Config, ConfigError, EditorConfig};
pub use editor::{BufferId, Editor};
pub use status::{StatusLog, StatusReporter};
pub use view::{Dirty, View, ViewConfig, ViewContext};

pub use quill_buffer::ViewId;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("View not found: {0}")]
    ViewNotFound(ViewId),

    #[error("Buffer not found: {0}")]
    BufferNotFound(BufferId),

    #[error("View {0} is not attached to a buffer")]
    ViewDetached(ViewId),

    #[error("Buffer {0} has no file path")]
    NoPath(BufferId),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Buffer error: {0}")]
    Buffer(#[from] quill_buffer::BufferError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}
