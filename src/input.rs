/// Single-line text input with a byte-offset cursor kept on char boundaries.
///
/// Shared by the search bar and the upload dialog.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    /// Input prefilled with `value`, cursor at the end.
    pub fn with_value(value: impl Into<String>) -> Self {
        let value = value.into();
        let cursor = value.len();
        Self { value, cursor }
    }

    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if let Some(prev) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
            self.value.remove(self.cursor);
        }
    }

    /// Delete the character under the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.value.len() {
            self.value.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        if let Some(prev) = self.value[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = self.value[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Split around the cursor for rendering: (before, under cursor, after).
    pub fn split_at_cursor(&self) -> (&str, &str, &str) {
        match self.value[self.cursor..].chars().next() {
            Some(c) => {
                let end = self.cursor + c.len_utf8();
                (
                    &self.value[..self.cursor],
                    &self.value[self.cursor..end],
                    &self.value[end..],
                )
            }
            None => (self.value.as_str(), " ", ""),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_backspace() {
        let mut input = TextInput::default();
        input.insert('a');
        input.insert('b');
        input.insert('c');
        assert_eq!(input.value, "abc");
        assert_eq!(input.cursor, 3);
        input.backspace();
        assert_eq!(input.value, "ab");
        assert_eq!(input.cursor, 2);
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut input = TextInput::with_value("x");
        input.home();
        input.backspace();
        assert_eq!(input.value, "x");
        assert_eq!(input.cursor, 0);
    }

    #[test]
    fn cursor_moves_over_multibyte_chars() {
        let mut input = TextInput::with_value("aé");
        assert_eq!(input.cursor, 3);
        input.left();
        assert_eq!(input.cursor, 1);
        input.right();
        assert_eq!(input.cursor, 3);
        input.right();
        assert_eq!(input.cursor, 3);
        input.backspace();
        assert_eq!(input.value, "a");
    }

    #[test]
    fn delete_removes_char_under_cursor() {
        let mut input = TextInput::with_value("abc");
        input.home();
        input.delete();
        assert_eq!(input.value, "bc");
        input.end();
        input.delete();
        assert_eq!(input.value, "bc");
    }

    #[test]
    fn split_at_cursor_pads_at_end() {
        let mut input = TextInput::with_value("ab");
        assert_eq!(input.split_at_cursor(), ("ab", " ", ""));
        input.home();
        assert_eq!(input.split_at_cursor(), ("", "a", "b"));
    }

    #[test]
    fn clear_resets_cursor() {
        let mut input = TextInput::with_value("hello");
        input.clear();
        assert!(input.value.is_empty());
        assert_eq!(input.cursor, 0);
    }
}
