/// Maximum snapshots kept for undo.
const MAX_UNDO_ENTRIES: usize = 200;

/// Cursor and buffer snapshot taken before each edit.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Snapshot {
    buffer: Vec<String>,
    cursor_line: usize,
    cursor_col: usize,
}

/// Text buffer behind the in-preview editor.
///
/// The buffer splits the original text on `\n` and [`EditorState::content`]
/// joins it back the same way, so an unmodified buffer round-trips byte for
/// byte (trailing newline and `\r` included). Columns count chars, not bytes.
#[derive(Debug, Clone)]
pub struct EditorState {
    pub buffer: Vec<String>,
    pub cursor_line: usize,
    pub cursor_col: usize,
    /// Whether the buffer differs from what it was created with.
    pub modified: bool,
    /// Line index of the topmost visible line.
    pub scroll_offset: usize,
    /// Visible height of the editor area (set during render).
    pub visible_height: usize,
    pub tab_width: usize,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl EditorState {
    pub fn new(content: &str) -> Self {
        Self {
            buffer: content.split('\n').map(String::from).collect(),
            cursor_line: 0,
            cursor_col: 0,
            modified: false,
            scroll_offset: 0,
            visible_height: 20,
            tab_width: 4,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width.max(1);
        self
    }

    /// The full buffer as the text that would be saved.
    pub fn content(&self) -> String {
        self.buffer.join("\n")
    }

    pub fn line_count(&self) -> usize {
        self.buffer.len()
    }

    /// Width of the line number gutter (digits + space + separator).
    pub fn gutter_width(&self) -> u16 {
        let digits = self.line_count().max(1).to_string().len() as u16;
        digits + 2
    }

    fn line_chars(&self, line: usize) -> usize {
        self.buffer.get(line).map(|l| l.chars().count()).unwrap_or(0)
    }

    fn current_line_len(&self) -> usize {
        self.line_chars(self.cursor_line)
    }

    fn clamp_cursor(&mut self) {
        if self.cursor_line >= self.buffer.len() {
            self.cursor_line = self.buffer.len().saturating_sub(1);
        }
        self.cursor_col = self.cursor_col.min(self.current_line_len());
    }

    /// Scroll so the cursor stays inside the viewport with a small margin.
    pub fn ensure_cursor_visible(&mut self) {
        let margin = 2usize;
        if self.visible_height == 0 {
            return;
        }
        if self.cursor_line < self.scroll_offset + margin {
            self.scroll_offset = self.cursor_line.saturating_sub(margin);
        }
        let bottom = self.scroll_offset + self.visible_height;
        if self.cursor_line >= bottom.saturating_sub(margin) {
            self.scroll_offset = self
                .cursor_line
                .saturating_sub(self.visible_height.saturating_sub(margin + 1));
        }
    }

    // ── Undo/Redo ─────────────────────────────────────────────────────

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            buffer: self.buffer.clone(),
            cursor_line: self.cursor_line,
            cursor_col: self.cursor_col,
        }
    }

    fn restore(&mut self, snap: Snapshot) {
        self.buffer = snap.buffer;
        self.cursor_line = snap.cursor_line;
        self.cursor_col = snap.cursor_col;
        self.modified = true;
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    fn record(&mut self) {
        let snap = self.snapshot();
        self.undo_stack.push(snap);
        if self.undo_stack.len() > MAX_UNDO_ENTRIES {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
        self.modified = true;
    }

    pub fn undo(&mut self) {
        if let Some(snap) = self.undo_stack.pop() {
            let current = self.snapshot();
            self.redo_stack.push(current);
            self.restore(snap);
        }
    }

    pub fn redo(&mut self) {
        if let Some(snap) = self.redo_stack.pop() {
            let current = self.snapshot();
            self.undo_stack.push(current);
            self.restore(snap);
        }
    }

    // ── Buffer mutation ───────────────────────────────────────────────

    pub fn insert_char(&mut self, ch: char) {
        self.record();
        let col = self.cursor_col;
        if let Some(line) = self.buffer.get_mut(self.cursor_line) {
            let byte_idx = char_to_byte_index(line, col);
            line.insert(byte_idx, ch);
            self.cursor_col += 1;
        }
    }

    /// Insert spaces up to the next tab stop.
    pub fn insert_tab(&mut self) {
        let spaces = self.tab_width - (self.cursor_col % self.tab_width);
        self.record();
        let col = self.cursor_col;
        if let Some(line) = self.buffer.get_mut(self.cursor_line) {
            let byte_idx = char_to_byte_index(line, col);
            line.insert_str(byte_idx, &" ".repeat(spaces));
            self.cursor_col += spaces;
        }
    }

    /// Backspace: delete before the cursor, joining lines at column 0.
    pub fn delete_char_before(&mut self) {
        if self.cursor_col > 0 {
            self.record();
            let col = self.cursor_col;
            let line = &mut self.buffer[self.cursor_line];
            let byte_idx = char_to_byte_index(line, col - 1);
            line.remove(byte_idx);
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.record();
            let current = self.buffer.remove(self.cursor_line);
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.buffer[self.cursor_line].push_str(&current);
            self.ensure_cursor_visible();
        }
    }

    /// Delete: delete under the cursor, joining the next line at line end.
    pub fn delete_char_at(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.record();
            let col = self.cursor_col;
            let line = &mut self.buffer[self.cursor_line];
            let byte_idx = char_to_byte_index(line, col);
            line.remove(byte_idx);
        } else if self.cursor_line + 1 < self.buffer.len() {
            self.record();
            let next = self.buffer.remove(self.cursor_line + 1);
            self.buffer[self.cursor_line].push_str(&next);
        }
    }

    /// Split the line at the cursor, carrying over leading whitespace.
    pub fn insert_newline(&mut self) {
        self.record();
        let line = &self.buffer[self.cursor_line];
        let indent: String = line
            .chars()
            .take_while(|c| *c == ' ' || *c == '\t')
            .take(self.cursor_col)
            .collect();
        let byte_idx = char_to_byte_index(line, self.cursor_col);
        let remainder = line[byte_idx..].to_string();
        self.buffer[self.cursor_line].truncate(byte_idx);
        self.buffer
            .insert(self.cursor_line + 1, format!("{indent}{remainder}"));
        self.cursor_line += 1;
        self.cursor_col = indent.chars().count();
        self.ensure_cursor_visible();
    }

    // ── Navigation ────────────────────────────────────────────────────

    pub fn move_up(&mut self) {
        if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.clamp_cursor();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_line + 1 < self.buffer.len() {
            self.cursor_line += 1;
            self.clamp_cursor();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_line > 0 {
            self.cursor_line -= 1;
            self.cursor_col = self.current_line_len();
            self.ensure_cursor_visible();
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_col < self.current_line_len() {
            self.cursor_col += 1;
        } else if self.cursor_line + 1 < self.buffer.len() {
            self.cursor_line += 1;
            self.cursor_col = 0;
            self.ensure_cursor_visible();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.current_line_len();
    }

    pub fn page_up(&mut self) {
        let jump = self.visible_height.max(1);
        self.cursor_line = self.cursor_line.saturating_sub(jump);
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }

    pub fn page_down(&mut self) {
        let jump = self.visible_height.max(1);
        self.cursor_line = (self.cursor_line + jump).min(self.buffer.len().saturating_sub(1));
        self.clamp_cursor();
        self.ensure_cursor_visible();
    }
}

/// Byte index of the `char_col`-th char, or the string length past the end.
fn char_to_byte_index(s: &str, char_col: usize) -> usize {
    s.char_indices()
        .nth(char_col)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}
