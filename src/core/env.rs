//! Environment variable helpers for `env`, `export` and `unset`.
//!
//! Variables live in [`ShellState`]; this module only validates names and
//! renders listings. `USER` and `PWD` mirror shell state and are read-only,
//! and none of the variables every session starts with can be unset.

use crate::core::state::ShellState;

/// Variables that track shell state and cannot be assigned directly.
pub const READONLY_VARS: &[&str] = &["USER", "PWD"];

/// Variables every session defines.
pub const REQUIRED_VARS: &[&str] = &["USER", "HOME", "PWD", "PATH", "SHELL"];

/// Check if a variable name is valid.
///
/// Valid names must:
/// - Not be empty
/// - Start with a letter or underscore
/// - Contain only alphanumeric characters and underscores
pub fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    if !first.is_ascii_alphabetic() && first != '_' {
        return false;
    }

    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `KEY=VALUE` lines in definition order.
pub fn format_env(state: &ShellState) -> String {
    state
        .environment()
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `declare -x KEY="VALUE"` lines in definition order.
pub fn format_export(state: &ShellState) -> String {
    state
        .environment()
        .iter()
        .map(|(key, value)| format!("declare -x {}=\"{}\"", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Apply one `export` operand, returning a message line if there is one.
///
/// `KEY=VALUE` assigns (surrounding quotes on the value are dropped); a bare
/// `KEY` prints the current value.
pub fn export(state: &mut ShellState, operand: &str) -> Option<String> {
    let (key, value) = match operand.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (operand, None),
    };

    if !is_valid_var_name(key) {
        return Some(format!("export: `{}': not a valid identifier", operand));
    }

    match value {
        Some(_) if READONLY_VARS.contains(&key) => {
            Some(format!("export: {}: readonly variable", key))
        }
        Some(value) => {
            let value = value.trim_matches('"').trim_matches('\'');
            state.set_var(key, value);
            None
        }
        None => state
            .get_var(key)
            .map(|value| format!("{}={}", key, value)),
    }
}

/// Apply one `unset` operand, returning an error line if it was refused.
///
/// Unsetting a variable that does not exist succeeds silently.
pub fn unset(state: &mut ShellState, name: &str) -> Option<String> {
    if !is_valid_var_name(name) {
        return Some(format!("unset: `{}': not a valid identifier", name));
    }
    if REQUIRED_VARS.contains(&name) {
        return Some(format!("unset: {}: cannot unset: readonly variable", name));
    }
    state.unset_var(name);
    None
}
