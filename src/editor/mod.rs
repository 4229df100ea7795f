//! Modal (vi-style) line editor.
//!
//! A [`LineEditor`] is created when `vi` opens a file and lives until one of
//! the quit commands closes it. The host routes every key to
//! [`LineEditor::handle_key`] while it is open, and draws it with
//! [`LineEditor::render_lines`] and [`LineEditor::status_line`].
//!
//! Supported keys:
//!
//! | Mode    | Keys |
//! |---------|------|
//! | Normal  | `h j k l` / arrows, `0 $ G`, `i a o O`, `x D Y p`, `:` |
//! | Insert  | printable characters, `Enter`, `Backspace`, `Escape` |
//! | Command | text, `Enter` to run `w q q! wq x`, `Backspace`, `Escape` |

mod buffer;
mod keys;

pub use buffer::Buffer;
pub use keys::Key;

use std::fmt;

use crate::core::error::EditorError;
use crate::models::EditorRequest;

/// Called with `(filename, content)` on every write.
pub type SaveCallback = Box<dyn FnMut(&str, &str)>;

/// Called once when the editor closes.
pub type ExitCallback = Box<dyn FnMut()>;

/// Editing mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    Command,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
            Self::Command => "COMMAND",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// vi-style editor state machine for one file.
pub struct LineEditor {
    filename: String,
    buffer: Buffer,
    mode: Mode,
    pending_command: String,
    /// `None` until something is yanked
    yank: Option<String>,
    modified: bool,
    message: Option<String>,
    closed: bool,
    on_save: SaveCallback,
    on_exit: ExitCallback,
}

impl LineEditor {
    pub fn new(
        filename: impl Into<String>,
        content: &str,
        on_save: impl FnMut(&str, &str) + 'static,
        on_exit: impl FnMut() + 'static,
    ) -> Self {
        Self {
            filename: filename.into(),
            buffer: Buffer::from_content(content),
            mode: Mode::Normal,
            pending_command: String::new(),
            yank: None,
            modified: false,
            message: None,
            closed: false,
            on_save: Box::new(on_save),
            on_exit: Box::new(on_exit),
        }
    }

    /// Open the file a `vi` command asked for.
    pub fn from_request(
        request: EditorRequest,
        on_save: impl FnMut(&str, &str) + 'static,
        on_exit: impl FnMut() + 'static,
    ) -> Self {
        Self::new(request.path, &request.content, on_save, on_exit)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn lines(&self) -> &[String] {
        self.buffer.lines()
    }

    pub fn content(&self) -> String {
        self.buffer.content()
    }

    /// Cursor as `(row, col)`, both 0-based.
    pub fn cursor(&self) -> (usize, usize) {
        (self.buffer.row(), self.buffer.col())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Text typed after `:` so far.
    pub fn pending_command(&self) -> &str {
        &self.pending_command
    }

    /// One-shot status message from the last key, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    // =========================================================================
    // Key Handling
    // =========================================================================

    /// Process one key. Ignored once the editor is closed.
    pub fn handle_key(&mut self, key: Key) {
        if self.closed {
            return;
        }
        self.message = None;

        match self.mode {
            Mode::Normal => self.handle_normal(key),
            Mode::Insert => self.handle_insert(key),
            Mode::Command => self.handle_command(key),
        }
    }

    /// Process keys in order.
    pub fn handle_keys(&mut self, keys: impl IntoIterator<Item = Key>) {
        for key in keys {
            self.handle_key(key);
        }
    }

    fn handle_normal(&mut self, key: Key) {
        let buf = &mut self.buffer;
        match key {
            Key::Char('h') | Key::Left => buf.move_left(),
            Key::Char('j') | Key::Down => buf.move_down(),
            Key::Char('k') | Key::Up => buf.move_up(),
            Key::Char('l') | Key::Right => buf.move_right(),
            Key::Char('0') => buf.line_start(),
            Key::Char('$') => buf.line_end(),
            Key::Char('G') => buf.last_line(),
            Key::Char('i') => self.mode = Mode::Insert,
            Key::Char('a') => {
                buf.move_right();
                self.mode = Mode::Insert;
            }
            Key::Char('o') => {
                buf.open_below();
                self.mode = Mode::Insert;
                self.modified = true;
            }
            Key::Char('O') => {
                buf.open_above();
                self.mode = Mode::Insert;
                self.modified = true;
            }
            Key::Char('x') => {
                if buf.delete_char() {
                    self.modified = true;
                }
            }
            Key::Char('D') => {
                buf.truncate_line();
                self.modified = true;
            }
            Key::Char('Y') => {
                self.yank = Some(buf.current_line().to_string());
                self.message = Some("yanked line".to_string());
            }
            Key::Char('p') => {
                if let Some(line) = &self.yank {
                    buf.put_below(line);
                    self.modified = true;
                }
            }
            Key::Char(':') => {
                self.mode = Mode::Command;
                self.pending_command.clear();
            }
            _ => {}
        }
    }

    fn handle_insert(&mut self, key: Key) {
        match key {
            Key::Escape => {
                self.mode = Mode::Normal;
                self.buffer.move_left();
            }
            Key::Enter => {
                self.buffer.split_line();
                self.modified = true;
            }
            Key::Backspace => {
                if self.buffer.backspace() {
                    self.modified = true;
                }
            }
            Key::Char(c) if !c.is_control() => {
                self.buffer.insert_char(c);
                self.modified = true;
            }
            Key::Left => self.buffer.move_left(),
            Key::Right => self.buffer.move_right(),
            Key::Up => self.buffer.move_up(),
            Key::Down => self.buffer.move_down(),
            Key::Char(_) => {}
        }
    }

    fn handle_command(&mut self, key: Key) {
        match key {
            Key::Escape => {
                self.mode = Mode::Normal;
                self.pending_command.clear();
            }
            Key::Enter => {
                let command = std::mem::take(&mut self.pending_command);
                self.mode = Mode::Normal;
                if let Err(err) = self.run_command(&command) {
                    self.message = Some(err.to_string());
                }
            }
            Key::Backspace => {
                if self.pending_command.pop().is_none() {
                    self.mode = Mode::Normal;
                }
            }
            Key::Char(c) if !c.is_control() => self.pending_command.push(c),
            _ => {}
        }
    }

    /// Run an ex command (the text after `:`).
    fn run_command(&mut self, command: &str) -> Result<(), EditorError> {
        match command {
            "w" => {
                self.save();
                self.message = Some(format!(
                    "\"{}\" {}L written",
                    self.filename,
                    self.buffer.lines().len()
                ));
            }
            "q" if self.modified => return Err(EditorError::UnsavedChanges),
            "q" | "q!" => self.close(),
            "wq" | "x" => {
                self.save();
                self.close();
            }
            other => return Err(EditorError::UnknownCommand(other.to_string())),
        }
        Ok(())
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Hand the buffer to the save callback and clear the modified flag.
    pub fn save(&mut self) {
        let content = self.buffer.content();
        tracing::debug!(file = %self.filename, bytes = content.len(), "editor write");
        (self.on_save)(&self.filename, &content);
        self.modified = false;
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        (self.on_exit)();
    }

    // =========================================================================
    // Presentation
    // =========================================================================

    /// Buffer lines with the cursor drawn in.
    ///
    /// Insert mode shows `|` between characters; the other modes bracket the
    /// character under the cursor (`[█]` past the end of the line).
    pub fn render_lines(&self) -> Vec<String> {
        let (row, col) = self.cursor();
        self.buffer
            .lines()
            .iter()
            .enumerate()
            .map(|(idx, line)| {
                if idx != row {
                    return line.clone();
                }
                let mut out = String::with_capacity(line.len() + 4);
                let mut chars = line.chars();
                out.extend(chars.by_ref().take(col));
                match (self.mode, chars.next()) {
                    (Mode::Insert, Some(c)) => {
                        out.push('|');
                        out.push(c);
                    }
                    (Mode::Insert, None) => out.push('|'),
                    (_, Some(c)) => {
                        out.push('[');
                        out.push(c);
                        out.push(']');
                    }
                    (_, None) => out.push_str("[█]"),
                }
                out.extend(chars);
                out
            })
            .collect()
    }

    /// Bottom status line.
    pub fn status_line(&self) -> String {
        if self.mode == Mode::Command {
            return format!(":{}", self.pending_command);
        }
        if let Some(message) = &self.message {
            return message.clone();
        }
        let (row, col) = self.cursor();
        format!(
            "-- {} -- {} \"{}\" {}L  {},{}",
            self.mode,
            if self.modified { "[+]" } else { "" },
            self.filename,
            self.buffer.lines().len(),
            row + 1,
            col + 1
        )
    }
}

impl fmt::Debug for LineEditor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LineEditor")
            .field("filename", &self.filename)
            .field("buffer", &self.buffer)
            .field("mode", &self.mode)
            .field("modified", &self.modified)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Saved = Rc<RefCell<Vec<(String, String)>>>;

    struct Harness {
        editor: LineEditor,
        saved: Saved,
        exits: Rc<RefCell<u32>>,
    }

    impl Harness {
        fn open(content: &str) -> Self {
            let saved: Saved = Rc::default();
            let exits = Rc::new(RefCell::new(0));
            let editor = LineEditor::new(
                "/home/user/notes.txt",
                content,
                {
                    let saved = saved.clone();
                    move |name: &str, content: &str| {
                        saved.borrow_mut().push((name.to_string(), content.to_string()))
                    }
                },
                {
                    let exits = exits.clone();
                    move || *exits.borrow_mut() += 1
                },
            );
            Self {
                editor,
                saved,
                exits,
            }
        }

        fn keys(&mut self, sequence: &str) -> &mut Self {
            self.editor.handle_keys(Key::parse_sequence(sequence));
            self
        }

        fn exits(&self) -> u32 {
            *self.exits.borrow()
        }
    }

    // =========================================================================
    // Normal Mode
    // =========================================================================

    #[test]
    fn test_insert_hello() {
        let mut h = Harness::open("");
        h.keys("iHello<Esc>");
        assert_eq!(h.editor.lines(), &["Hello".to_string()]);
        assert_eq!(h.editor.cursor(), (0, 4));
        assert_eq!(h.editor.mode(), Mode::Normal);
        assert!(h.editor.is_modified());
    }

    #[test]
    fn test_append_after_cursor() {
        let mut h = Harness::open("ac");
        h.keys("ab<Esc>");
        assert_eq!(h.editor.content(), "abc");
        assert_eq!(h.editor.cursor(), (0, 1));
    }

    #[test]
    fn test_open_lines() {
        let mut h = Harness::open("middle");
        h.keys("obelow<Esc>kOabove<Esc>");
        assert_eq!(h.editor.content(), "above\nmiddle\nbelow");
        assert_eq!(h.editor.cursor(), (0, 4));
    }

    #[test]
    fn test_open_sets_modified_without_typing() {
        let mut h = Harness::open("x");
        h.keys("o<Esc>");
        assert!(h.editor.is_modified());
        assert_eq!(h.editor.lines().len(), 2);
    }

    #[test]
    fn test_delete_keys() {
        let mut h = Harness::open("abcdef");
        h.keys("x");
        assert_eq!(h.editor.content(), "bcdef");
        h.keys("lD");
        assert_eq!(h.editor.content(), "b");
    }

    #[test]
    fn test_x_at_end_of_line_is_noop() {
        let mut h = Harness::open("ab");
        h.keys("$x");
        assert_eq!(h.editor.content(), "ab");
        assert!(!h.editor.is_modified());
    }

    #[test]
    fn test_yank_and_paste() {
        let mut h = Harness::open("one\ntwo");
        h.keys("Y");
        assert_eq!(h.editor.message(), Some("yanked line"));
        h.keys("jp");
        assert_eq!(h.editor.content(), "one\ntwo\none");
        assert_eq!(h.editor.cursor().0, 2);
        assert_eq!(h.editor.message(), None);
    }

    #[test]
    fn test_paste_without_yank_is_noop() {
        let mut h = Harness::open("one");
        h.keys("p");
        assert_eq!(h.editor.content(), "one");
        assert!(!h.editor.is_modified());
    }

    #[test]
    fn test_movement_clamps() {
        let mut h = Harness::open("long line\nab");
        h.keys("$jkhhhhhhhhhhhhl");
        assert_eq!(h.editor.cursor(), (0, 1));
        h.keys("G$");
        assert_eq!(h.editor.cursor(), (1, 2));
        h.keys("<Down><Right>0");
        assert_eq!(h.editor.cursor(), (1, 0));
    }

    // =========================================================================
    // Insert Mode
    // =========================================================================

    #[test]
    fn test_enter_splits_line() {
        let mut h = Harness::open("hello");
        h.keys("ll");
        h.keys("i<CR><Esc>");
        assert_eq!(h.editor.content(), "he\nllo");
        assert_eq!(h.editor.cursor(), (1, 0));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut h = Harness::open("ab\ncd");
        h.keys("ji<BS>");
        assert_eq!(h.editor.content(), "abcd");
        assert_eq!(h.editor.cursor(), (0, 2));
        h.keys("<BS><Esc>");
        assert_eq!(h.editor.content(), "acd");
    }

    // =========================================================================
    // Command Mode
    // =========================================================================

    #[test]
    fn test_write() {
        let mut h = Harness::open("");
        h.keys("ihi<Esc>:w<CR>");
        assert_eq!(
            h.saved.borrow().as_slice(),
            &[("/home/user/notes.txt".to_string(), "hi".to_string())]
        );
        assert!(!h.editor.is_modified());
        assert_eq!(h.editor.message(), Some("\"/home/user/notes.txt\" 1L written"));
        assert_eq!(h.editor.mode(), Mode::Normal);
        assert!(!h.editor.is_closed());
    }

    #[test]
    fn test_quit_refuses_unsaved_changes() {
        let mut h = Harness::open("");
        h.keys("ix<Esc>:q<CR>");
        assert!(!h.editor.is_closed());
        assert_eq!(
            h.editor.message(),
            Some("No write since last change (add ! to override)")
        );
        assert_eq!(h.editor.mode(), Mode::Normal);
        h.keys(":q!<CR>");
        assert!(h.editor.is_closed());
        assert!(h.saved.borrow().is_empty());
        assert_eq!(h.exits(), 1);
    }

    #[test]
    fn test_quit_clean_buffer() {
        let mut h = Harness::open("text");
        h.keys(":q<CR>");
        assert!(h.editor.is_closed());
        assert_eq!(h.exits(), 1);
    }

    #[test]
    fn test_write_quit() {
        for cmd in [":wq<CR>", ":x<CR>"] {
            let mut h = Harness::open("");
            h.keys("ia<Esc>");
            h.keys(cmd);
            assert!(h.editor.is_closed());
            assert_eq!(h.saved.borrow().len(), 1);
            assert_eq!(h.exits(), 1);
        }
    }

    #[test]
    fn test_unknown_command() {
        let mut h = Harness::open("");
        h.keys(":set nu<CR>");
        assert_eq!(h.editor.message(), Some("Not an editor command: set nu"));
        assert_eq!(h.editor.mode(), Mode::Normal);
        assert_eq!(h.editor.pending_command(), "");
    }

    #[test]
    fn test_command_escape_and_backspace() {
        let mut h = Harness::open("");
        h.keys(":wq<Esc>");
        assert_eq!(h.editor.mode(), Mode::Normal);
        assert_eq!(h.editor.pending_command(), "");

        h.keys(":w<BS>");
        assert_eq!(h.editor.mode(), Mode::Command);
        assert_eq!(h.editor.pending_command(), "");
        h.keys("<BS>");
        assert_eq!(h.editor.mode(), Mode::Normal);
    }

    #[test]
    fn test_keys_ignored_after_close() {
        let mut h = Harness::open("keep");
        h.keys(":q<CR>ix<Esc>:wq<CR>");
        assert_eq!(h.editor.content(), "keep");
        assert!(h.saved.borrow().is_empty());
        assert_eq!(h.exits(), 1);
    }

    // =========================================================================
    // Presentation
    // =========================================================================

    #[test]
    fn test_render_lines() {
        let mut h = Harness::open("ab\ncd");
        assert_eq!(h.editor.render_lines(), vec!["[a]b", "cd"]);
        h.keys("$");
        assert_eq!(h.editor.render_lines()[0], "ab[█]");
        h.keys("0i");
        assert_eq!(h.editor.render_lines()[0], "|ab");
    }

    #[test]
    fn test_status_line() {
        let mut h = Harness::open("ab\ncd");
        assert_eq!(
            h.editor.status_line(),
            "-- NORMAL --  \"/home/user/notes.txt\" 2L  1,1"
        );
        h.keys("jix");
        assert_eq!(
            h.editor.status_line(),
            "-- INSERT -- [+] \"/home/user/notes.txt\" 2L  2,2"
        );
        h.keys("<Esc>:wq");
        assert_eq!(h.editor.status_line(), ":wq");
    }
}
