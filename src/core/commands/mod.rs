//! Command parsing and execution.
//!
//! This module provides:
//! - `Command` enum for parsed shell commands
//! - `Outcome` for command execution results
//! - `execute_command` for running a parsed command against an [`ExecContext`]
//!
//! # Architecture
//!
//! Input lines are split by [`parse_input`](crate::core::parser::parse_input)
//! into a name and arguments, which `Command::parse` turns into a `Command`
//! variant. Names not in the table parse to `None`, which the shell reports
//! as `command not found`.

mod execute;
mod ps;
mod result;

pub use execute::{ExecContext, execute_command};
pub use result::Outcome;

use std::fmt;

// =============================================================================
// Path Argument Type
// =============================================================================

/// A path argument passed to a command (e.g., `cd foo`, `cat bar.txt`).
///
/// The path is stored as typed (not resolved) so error messages can echo it
/// back; resolution against the current directory happens at execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathArg(String);

impl PathArg {
    /// Create a new path argument from a string.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// Get the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PathArg {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl PartialEq<&str> for PathArg {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

// =============================================================================
// Command Enum
// =============================================================================

/// Parsed shell command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    /// List a directory (current one if no path)
    Ls(Option<PathArg>),
    /// Change directory (HOME if no path)
    Cd(Option<PathArg>),
    Pwd,
    Cat(Option<PathArg>),
    Echo(Vec<String>),
    Clear,
    Whoami,
    Date,
    /// `uname`, with `-a` for the long banner
    Uname {
        all: bool,
    },
    Env,
    Export(Vec<String>),
    Unset(Vec<String>),
    History,
    Mkdir(Vec<PathArg>),
    Touch(Vec<PathArg>),
    Rm(Vec<PathArg>),
    Tree,
    /// Open the line editor (`vi` / `vim`)
    Vi(Option<PathArg>),
    /// Switch user (`root` if none given)
    Su(Option<String>),
    Ps(Vec<String>),
    /// Clear persisted state. bool = `-f` / `--filesystem` given
    Reset {
        filesystem: bool,
    },
}

impl Command {
    /// All command names, sorted, for completion.
    pub fn names() -> &'static [&'static str] {
        &[
            "cat", "cd", "clear", "date", "echo", "env", "export", "help", "history", "ls",
            "mkdir", "ps", "pwd", "reset", "rm", "su", "touch", "tree", "uname", "unset", "vi",
            "vim", "whoami",
        ]
    }

    /// Parse command from name and arguments.
    ///
    /// Names are case-sensitive. Returns `None` for unknown names.
    pub fn parse(name: &str, args: &[String]) -> Option<Self> {
        let first_path = || args.first().map(|arg| PathArg::new(arg.as_str()));
        let paths = || args.iter().map(|arg| PathArg::new(arg.as_str())).collect();

        let cmd = match name {
            "help" => Self::Help,
            "ls" => Self::Ls(first_path()),
            "cd" => Self::Cd(first_path()),
            "pwd" => Self::Pwd,
            "cat" => Self::Cat(first_path()),
            "echo" => Self::Echo(args.to_vec()),
            "clear" => Self::Clear,
            "whoami" => Self::Whoami,
            "date" => Self::Date,
            "uname" => Self::Uname {
                all: args.iter().any(|arg| arg == "-a"),
            },
            "env" => Self::Env,
            "export" => Self::Export(args.to_vec()),
            "unset" => Self::Unset(args.to_vec()),
            "history" => Self::History,
            "mkdir" => Self::Mkdir(paths()),
            "touch" => Self::Touch(paths()),
            "rm" => Self::Rm(paths()),
            "tree" => Self::Tree,
            "vi" | "vim" => Self::Vi(first_path()),
            "su" => Self::Su(args.first().cloned()),
            "ps" => Self::Ps(args.to_vec()),
            "reset" => Self::Reset {
                filesystem: matches!(
                    args.first().map(String::as_str),
                    Some("-f" | "--filesystem")
                ),
            },
            _ => return None,
        };
        Some(cmd)
    }
}

// =============================================================================
// Tests
// =============================================================================
