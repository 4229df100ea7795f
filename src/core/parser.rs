//! Command line parser: output redirection and word splitting.
//!
//! Supports:
//! - Overwrite redirection: `cmd args > file`
//! - Append redirection: `cmd args >> file`
//! - Whitespace tokenization into `[name, ...args]`
//!
//! The rightmost `>>` wins; without one, the rightmost `>` is used. An
//! operator inside the command name itself (`a>b`) is not a redirection.

use crate::core::error::CommandError;
use crate::models::WriteMode;

// =============================================================================
// Parsed Representation
// =============================================================================

/// Output redirection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub target: String,
    pub mode: WriteMode,
}

/// A single parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
    pub redirect: Option<Redirect>,
}

// =============================================================================
// Parser
// =============================================================================

/// Parse a raw input line.
///
/// Returns `Ok(None)` for blank input.
pub fn parse_input(input: &str) -> Result<Option<ParsedCommand>, CommandError> {
    let (command_part, redirect) = split_redirect(input)?;

    let mut words = command_part.split_whitespace().map(str::to_string);
    let Some(name) = words.next() else {
        return Ok(None);
    };

    Ok(Some(ParsedCommand {
        name,
        args: words.collect(),
        redirect,
    }))
}

/// Split off a trailing `> file` / `>> file`.
fn split_redirect(input: &str) -> Result<(&str, Option<Redirect>), CommandError> {
    let name_end = command_name_end(input);
    let rest = &input[name_end..];

    let found = rest
        .rfind(">>")
        .map(|idx| (idx, 2, WriteMode::Append))
        .or_else(|| rest.rfind('>').map(|idx| (idx, 1, WriteMode::Overwrite)));

    let Some((idx, op_len, mode)) = found else {
        return Ok((input, None));
    };

    let split_at = name_end + idx;
    let target = input[split_at + op_len..].trim();
    if target.is_empty() {
        return Err(CommandError::MissingRedirectTarget);
    }

    Ok((
        &input[..split_at],
        Some(Redirect {
            target: target.to_string(),
            mode,
        }),
    ))
}

/// Byte offset just past the first word (the command name).
fn command_name_end(input: &str) -> usize {
    let start = input.len() - input.trim_start().len();
    input[start..]
        .find(char::is_whitespace)
        .map_or(input.len(), |idx| start + idx)
}

// =============================================================================
// Tests
// =============================================================================
