//! Command execution result type.

use serde::Serialize;

/// Result of executing a command line.
///
/// Plain output is `Text` (possibly empty). The other variants are control
/// signals for the hosting UI and are never printed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Outcome {
    /// Output to display (empty means nothing to show)
    Text(String),
    /// Clear the terminal screen
    ClearScreen,
    /// The line editor was opened; fetch it with `Shell::take_editor_request`
    EditorOpened,
    /// The current user changed to the given name
    UserSwitched(String),
}

impl Outcome {
    /// Create a text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create an empty result (no output).
    pub fn empty() -> Self {
        Self::Text(String::new())
    }

    /// The printable text, if this is not a control signal.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether this is a control signal rather than output.
    pub fn is_signal(&self) -> bool {
        !matches!(self, Self::Text(_))
    }
}

impl From<String> for Outcome {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Outcome {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}
