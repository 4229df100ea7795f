//! Core business logic for the shell.
//!
//! This module provides:
//! - [`Shell`] session facade (execution, completion, persistence)
//! - [`Command`] parsing and [`execute_command`] execution
//! - [`VirtualFs`] virtual filesystem management
//! - [`get_completions`] for tab completion

pub mod autocomplete;
mod commands;
pub mod env;
pub mod error;
mod filesystem;
pub mod parser;
mod shell;
pub mod state;
pub mod storage;

pub use autocomplete::{CompletionKind, CompletionResult, get_completions};
pub use commands::{Command, ExecContext, Outcome, PathArg, execute_command};
pub use filesystem::VirtualFs;
pub use parser::parse_input;
pub use shell::Shell;
pub use state::ShellState;
