//! Tab completion for command names and paths.
//!
//! The first word completes against the command table; any later word
//! completes against the entries of a directory in the virtual filesystem.
//!
//! The engine only reports matches. Choosing what to do with them (accept a
//! single match, extend to the common prefix, list the options) is up to the
//! host, with [`CompletionResult::common_prefix`] and
//! [`CompletionResult::extend_input`] as helpers.

use serde::Serialize;

use crate::core::commands::Command;
use crate::core::filesystem::VirtualFs;
use crate::utils::format::expand_tilde;

// ============================================================================
// Public Types
// ============================================================================

/// What the matches are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionKind {
    Command,
    Path,
}

/// Result of a completion request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompletionResult {
    pub kind: CompletionKind,
    /// Command names, or entry names (`/`-suffixed for directories)
    pub matches: Vec<String>,
    /// The word being completed, as typed
    pub prefix: String,
}

impl CompletionResult {
    fn empty(kind: CompletionKind, prefix: &str) -> Self {
        Self {
            kind,
            matches: Vec::new(),
            prefix: prefix.to_string(),
        }
    }

    /// Longest prefix shared by every match (empty if there are none).
    pub fn common_prefix(&self) -> String {
        find_common_prefix(&self.matches)
    }

    /// `input` with the completed word extended as far as the matches allow.
    ///
    /// A single match is taken whole (followed by a space unless it is a
    /// directory); several matches extend to their common prefix. `input` is
    /// returned unchanged when nothing matches.
    pub fn extend_input(&self, input: &str) -> String {
        let Some(base) = input.strip_suffix(self.prefix.as_str()) else {
            return input.to_string();
        };

        let completion = match self.matches.as_slice() {
            [] => return input.to_string(),
            [single] if single.ends_with('/') => single.clone(),
            [single] => format!("{} ", single),
            _ => self.common_prefix(),
        };

        let dir_part = match self.kind {
            CompletionKind::Path => split_fragment(&self.prefix).0,
            CompletionKind::Command => "",
        };

        let extended = format!("{}{}{}", base, dir_part, completion);
        // Never shorten what was typed
        if extended.len() < input.len() {
            input.to_string()
        } else {
            extended
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Complete the last word of `input`.
///
/// `current_path` and `home` resolve relative and `~` paths.
pub fn get_completions(
    input: &str,
    current_path: &str,
    home: &str,
    fs: &VirtualFs,
) -> CompletionResult {
    let trimmed = input.trim_start();
    if !trimmed.contains(char::is_whitespace) {
        return CompletionResult {
            kind: CompletionKind::Command,
            matches: complete_command(trimmed, Command::names()),
            prefix: trimmed.to_string(),
        };
    }

    // Trailing whitespace means a new, empty word
    let fragment = if trimmed.ends_with(char::is_whitespace) {
        ""
    } else {
        trimmed.split_whitespace().last().unwrap_or_default()
    };

    complete_path(fragment, current_path, home, fs)
}

// ============================================================================
// Command Completion
// ============================================================================

/// Names in `names` starting with `partial` (case-sensitive), in table order.
fn complete_command(partial: &str, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .filter(|name| name.starts_with(partial))
        .map(|name| name.to_string())
        .collect()
}

// ============================================================================
// Path Completion
// ============================================================================

/// Split a path fragment into directory part (with trailing `/`) and name part.
fn split_fragment(fragment: &str) -> (&str, &str) {
    match fragment.rfind('/') {
        Some(idx) => (&fragment[..=idx], &fragment[idx + 1..]),
        None => ("", fragment),
    }
}

fn complete_path(fragment: &str, current_path: &str, home: &str, fs: &VirtualFs) -> CompletionResult {
    let (dir_part, name_part) = split_fragment(fragment);

    let search_dir = if dir_part.is_empty() {
        current_path.to_string()
    } else {
        VirtualFs::resolve_path(current_path, &expand_tilde(dir_part, home))
    };

    let Ok(entries) = fs.list_entries(&search_dir) else {
        return CompletionResult::empty(CompletionKind::Path, fragment);
    };

    CompletionResult {
        kind: CompletionKind::Path,
        matches: entries
            .iter()
            .filter(|entry| entry.name.starts_with(name_part))
            .map(|entry| entry.display_name())
            .collect(),
        prefix: fragment.to_string(),
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Find the common prefix of multiple strings.
fn find_common_prefix(strings: &[String]) -> String {
    let Some((first, rest)) = strings.split_first() else {
        return String::new();
    };

    let mut prefix_len = first.len();
    for s in rest {
        prefix_len = first
            .char_indices()
            .zip(s.chars())
            .take_while(|((idx, a), b)| *idx < prefix_len && a == b)
            .last()
            .map_or(0, |((idx, a), _)| idx + a.len_utf8());
    }

    first[..prefix_len].to_string()
}

// ============================================================================
// Tests
// ============================================================================
