//! A Unix-like shell over an in-memory filesystem.
//!
//! The crate is host-agnostic: a [`Shell`] executes command lines and
//! answers completion requests, and a [`LineEditor`] handles `vi` sessions.
//! The native binary drives both over stdin/stdout; on wasm32 the
//! `web` module exposes them to JavaScript with `localStorage` persistence.
//!
//! ```
//! use ripsh::{Outcome, Shell};
//!
//! let mut shell = Shell::default();
//! shell.execute("echo hello > greeting.txt");
//! assert_eq!(shell.execute("cat greeting.txt"), Outcome::text("hello"));
//! ```

pub mod config;
pub mod core;
pub mod editor;
pub mod models;
pub mod utils;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use crate::config::ShellConfig;
pub use crate::core::{CompletionKind, CompletionResult, Outcome, Shell};
pub use crate::editor::{Key, LineEditor, Mode};
