//! Key events understood by the line editor.

/// A single key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Printable character (already shifted, `G` not `g`)
    Char(char),
    Escape,
    Enter,
    Backspace,
    Left,
    Right,
    Up,
    Down,
}

impl Key {
    /// Parse a key name.
    ///
    /// Accepts DOM `KeyboardEvent.key` values (`"a"`, `"Escape"`,
    /// `"ArrowLeft"`, ...) and the vim notation names (`"Esc"`, `"CR"`,
    /// `"BS"`, `"Left"`, ...). Returns `None` for keys the editor ignores
    /// (`"Shift"`, `"F1"`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Some(Self::Char(c));
        }

        let key = match name {
            "Escape" | "Esc" => Self::Escape,
            "Enter" | "CR" | "Return" => Self::Enter,
            "Backspace" | "BS" => Self::Backspace,
            "ArrowLeft" | "Left" => Self::Left,
            "ArrowRight" | "Right" => Self::Right,
            "ArrowUp" | "Up" => Self::Up,
            "ArrowDown" | "Down" => Self::Down,
            "lt" => Self::Char('<'),
            "Space" => Self::Char(' '),
            _ => return None,
        };
        Some(key)
    }

    /// Parse a key sequence in vim notation, e.g. `"iHello<Esc>:wq<CR>"`.
    ///
    /// Text outside `<...>` is typed literally; `<lt>` is a literal `<`. A
    /// bracketed name that is not a key is also typed literally.
    pub fn parse_sequence(input: &str) -> Vec<Self> {
        let mut keys = Vec::new();
        let mut rest = input;

        while let Some(c) = rest.chars().next() {
            if c == '<'
                && let Some(end) = rest.find('>')
                && let Some(key) = Self::from_name(&rest[1..end]).filter(|_| end > 2)
            {
                keys.push(key);
                rest = &rest[end + 1..];
                continue;
            }
            keys.push(Self::Char(c));
            rest = &rest[c.len_utf8()..];
        }

        keys
    }
}
