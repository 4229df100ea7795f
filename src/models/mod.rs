//! Data models shared by the shell core and the editor.
//!
//! Contains domain types for:
//! - [`FsNode`], [`DirEntry`], [`EntryKind`], [`WriteMode`] - Virtual filesystem representation
//! - [`EditorRequest`] - Hand-off from the `vi` command to the line editor

mod editor;
mod filesystem;

pub use editor::EditorRequest;
pub use filesystem::{DirEntry, Entries, EntryKind, FsNode, WriteMode};
