//! Line buffer with a cursor.
//!
//! Columns count characters, not bytes. The cursor may sit one past the
//! last character of its line (append position). There is always at least
//! one line.

/// Text lines plus cursor position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Buffer {
    lines: Vec<String>,
    row: usize,
    col: usize,
}

impl Buffer {
    /// Split `content` on `\n`. Empty content is a single empty line.
    pub fn from_content(content: &str) -> Self {
        Self {
            lines: content.split('\n').map(str::to_string).collect(),
            row: 0,
            col: 0,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines joined with `\n`.
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn current_line(&self) -> &str {
        &self.lines[self.row]
    }

    /// Length of the current line in characters.
    pub fn line_len(&self) -> usize {
        self.current_line().chars().count()
    }

    /// Byte offset of character column `col` in the current line.
    fn byte_offset(&self, col: usize) -> usize {
        let line = self.current_line();
        line.char_indices()
            .nth(col)
            .map_or(line.len(), |(idx, _)| idx)
    }

    fn clamp_col(&mut self) {
        self.col = self.col.min(self.line_len());
    }

    // =========================================================================
    // Movement
    // =========================================================================

    pub fn move_left(&mut self) {
        self.col = self.col.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.col = (self.col + 1).min(self.line_len());
    }

    pub fn move_up(&mut self) {
        self.row = self.row.saturating_sub(1);
        self.clamp_col();
    }

    pub fn move_down(&mut self) {
        self.row = (self.row + 1).min(self.lines.len() - 1);
        self.clamp_col();
    }

    pub fn line_start(&mut self) {
        self.col = 0;
    }

    pub fn line_end(&mut self) {
        self.col = self.line_len();
    }

    pub fn last_line(&mut self) {
        self.row = self.lines.len() - 1;
        self.clamp_col();
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Insert an empty line below and move onto it.
    pub fn open_below(&mut self) {
        self.lines.insert(self.row + 1, String::new());
        self.row += 1;
        self.col = 0;
    }

    /// Insert an empty line above and move onto it.
    pub fn open_above(&mut self) {
        self.lines.insert(self.row, String::new());
        self.col = 0;
    }

    /// Insert `text` as a new line below and move onto it.
    pub fn put_below(&mut self, text: &str) {
        self.lines.insert(self.row + 1, text.to_string());
        self.row += 1;
        self.clamp_col();
    }

    /// Delete the character under the cursor. Returns false at end of line.
    pub fn delete_char(&mut self) -> bool {
        if self.col >= self.line_len() {
            return false;
        }
        let at = self.byte_offset(self.col);
        self.lines[self.row].remove(at);
        true
    }

    /// Delete from the cursor to the end of the line.
    pub fn truncate_line(&mut self) {
        let at = self.byte_offset(self.col);
        self.lines[self.row].truncate(at);
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.col);
        self.lines[self.row].insert(at, c);
        self.col += 1;
    }

    /// Split the line at the cursor; the cursor moves to the start of the new line.
    pub fn split_line(&mut self) {
        let at = self.byte_offset(self.col);
        let tail = self.lines[self.row].split_off(at);
        self.lines.insert(self.row + 1, tail);
        self.row += 1;
        self.col = 0;
    }

    /// Delete before the cursor, joining with the previous line at column 0.
    ///
    /// Returns false if there was nothing to delete (start of the buffer).
    pub fn backspace(&mut self) -> bool {
        if self.col > 0 {
            self.col -= 1;
            let at = self.byte_offset(self.col);
            self.lines[self.row].remove(at);
            true
        } else if self.row > 0 {
            let line = self.lines.remove(self.row);
            self.row -= 1;
            self.col = self.line_len();
            self.lines[self.row].push_str(&line);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content() {
        assert_eq!(Buffer::from_content("").lines(), &[String::new()]);
        assert_eq!(Buffer::from_content("a\nb").lines().len(), 2);
        assert_eq!(Buffer::from_content("a\n").lines(), &["a".to_string(), String::new()]);
        assert_eq!(Buffer::from_content("a\nb").content(), "a\nb");
    }

    #[test]
    fn test_vertical_movement_clamps_column() {
        let mut buf = Buffer::from_content("long line\nab\n");
        buf.line_end();
        assert_eq!(buf.col(), 9);
        buf.move_down();
        assert_eq!((buf.row(), buf.col()), (1, 2));
        buf.move_down();
        assert_eq!((buf.row(), buf.col()), (2, 0));
        buf.move_down();
        assert_eq!(buf.row(), 2);
        buf.move_up();
        buf.move_up();
        buf.move_up();
        assert_eq!((buf.row(), buf.col()), (0, 0));
    }

    #[test]
    fn test_horizontal_movement_clamps() {
        let mut buf = Buffer::from_content("ab");
        buf.move_left();
        assert_eq!(buf.col(), 0);
        buf.move_right();
        buf.move_right();
        buf.move_right();
        assert_eq!(buf.col(), 2);
    }

    #[test]
    fn test_insert_and_delete_multibyte() {
        let mut buf = Buffer::from_content("héllo");
        buf.move_right();
        buf.move_right();
        assert!(buf.delete_char());
        assert_eq!(buf.current_line(), "hélo");
        buf.insert_char('ł');
        assert_eq!(buf.current_line(), "héłlo");
        assert_eq!(buf.col(), 3);
    }

    #[test]
    fn test_delete_char_at_end_is_noop() {
        let mut buf = Buffer::from_content("ab");
        buf.line_end();
        assert!(!buf.delete_char());
        assert_eq!(buf.current_line(), "ab");
    }

    #[test]
    fn test_split_and_join() {
        let mut buf = Buffer::from_content("hello");
        buf.move_right();
        buf.move_right();
        buf.split_line();
        assert_eq!(buf.lines(), &["he".to_string(), "llo".to_string()]);
        assert_eq!((buf.row(), buf.col()), (1, 0));
        assert!(buf.backspace());
        assert_eq!(buf.lines(), &["hello".to_string()]);
        assert_eq!((buf.row(), buf.col()), (0, 2));
    }

    #[test]
    fn test_backspace_at_buffer_start() {
        let mut buf = Buffer::from_content("x");
        assert!(!buf.backspace());
        assert_eq!(buf.current_line(), "x");
    }

    #[test]
    fn test_truncate_line() {
        let mut buf = Buffer::from_content("abcdef");
        buf.move_right();
        buf.move_right();
        buf.truncate_line();
        assert_eq!(buf.current_line(), "ab");
        assert_eq!(buf.col(), 2);
    }

    #[test]
    fn test_open_and_put() {
        let mut buf = Buffer::from_content("one\ntwo");
        buf.open_above();
        assert_eq!(buf.lines()[0], "");
        assert_eq!(buf.row(), 0);
        buf.open_below();
        assert_eq!(buf.row(), 1);
        buf.put_below("copy");
        assert_eq!(buf.row(), 2);
        assert_eq!(buf.lines(), &["", "", "copy", "one", "two"].map(String::from));
    }
}
