//! Custom error types for the shell.
//!
//! Every error is recovered locally and turned into a line of terminal
//! output; none of them escape `Shell::execute`.
//!
//! - [`FsError`] - Virtual filesystem failures (Unix reason phrases)
//! - [`CommandError`] - Dispatch and handler failures
//! - [`EditorError`] - Line editor `:` command failures
//! - [`StorageError`] - Persistence failures (logged, never shown)

use thiserror::Error;

/// Virtual filesystem errors.
///
/// `Display` yields the bare Unix reason phrase so callers can prefix it
/// with the command and operand (`mkdir: cannot create directory 'a': File exists`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FsError {
    /// Target does not exist
    #[error("No such file or directory")]
    NoSuchEntry,
    /// A path component that must be a directory is a file
    #[error("Not a directory")]
    NotADirectory,
    /// Operation needs a file but found a directory
    #[error("Is a directory")]
    IsADirectory,
    /// Leaf name already taken
    #[error("File exists")]
    AlreadyExists,
    /// Parent directory of the target is missing
    #[error("No such file or directory")]
    NoSuchParent,
}

/// Command dispatch and execution errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Name is not in the command table.
    #[error("{0}: command not found")]
    NotFound(String),
    /// Redirection operator without a target file.
    #[error("bash: syntax error near unexpected token `newline'")]
    MissingRedirectTarget,
    /// Handler failed internally.
    #[error("{0}")]
    Failed(String),
}

impl From<StorageError> for CommandError {
    fn from(err: StorageError) -> Self {
        Self::Failed(err.to_string())
    }
}

/// Line editor command-mode errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    /// Text after `:` is not one of `w`, `q`, `q!`, `wq`, `x`.
    #[error("Not an editor command: {0}")]
    UnknownCommand(String),
    /// `:q` with a modified buffer.
    #[error("No write since last change (add ! to override)")]
    UnsavedChanges,
}

/// Persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backing store not available (no window, private mode, ...).
    #[error("storage not available")]
    Unavailable,
    /// Value could not be encoded.
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    /// Backing store rejected the write.
    #[error("failed to write {key}: {reason}")]
    Write { key: String, reason: String },
    /// Backing store rejected the removal.
    #[error("failed to remove {key}: {reason}")]
    Remove { key: String, reason: String },
}
