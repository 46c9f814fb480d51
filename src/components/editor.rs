use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use syntect::easy::HighlightLines;

use crate::editor::EditorState;
use crate::preview_content::Highlighter;
use crate::theme::ThemeColors;

/// Editor view: line numbers, syntax colors and a block cursor.
pub struct EditorWidget<'a> {
    editor: &'a EditorState,
    key: &'a str,
    theme: &'a ThemeColors,
    highlighter: &'a Highlighter,
}

impl<'a> EditorWidget<'a> {
    pub fn new(
        editor: &'a EditorState,
        key: &'a str,
        theme: &'a ThemeColors,
        highlighter: &'a Highlighter,
    ) -> Self {
        Self {
            editor,
            key,
            theme,
            highlighter,
        }
    }

    /// Highlighter for the buffer, or `None` when it is too large to color.
    fn highlight_state(&self) -> Option<HighlightLines<'a>> {
        let size: usize = self.editor.buffer.iter().map(|l| l.len() + 1).sum();
        if !self.highlighter.within_limit(size) {
            return None;
        }
        let first = self.editor.buffer.first().map(String::as_str).unwrap_or("");
        let syntax = self.highlighter.syntax_for(self.key, first);
        Some(HighlightLines::new(syntax, self.highlighter.theme()))
    }
}

/// One display cell per char; controls would corrupt the terminal.
fn display_char(ch: char) -> char {
    match ch {
        '\t' | '\r' => ' ',
        c if c.is_control() => '\u{FFFD}',
        c => c,
    }
}

impl Widget for EditorWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let gutter_w = self.editor.gutter_width();
        let code_width = area.width.saturating_sub(gutter_w);
        if code_width == 0 {
            return;
        }

        let syntax_set = self.highlighter.syntax_set();
        let mut highlight = self.highlight_state();
        let scroll = self.editor.scroll_offset;

        // Lines above the viewport still advance the parser state.
        if let Some(h) = highlight.as_mut() {
            for line in self.editor.buffer.iter().take(scroll) {
                let _ = h.highlight_line(line, syntax_set);
            }
        }

        let cursor_style = Style::default()
            .fg(self.theme.editor_cursor_fg)
            .bg(self.theme.editor_cursor_bg);

        for row in 0..area.height as usize {
            let line_idx = scroll + row;
            let y = area.y + row as u16;
            let Some(content) = self.editor.buffer.get(line_idx) else {
                buf.set_string(area.x, y, "~", Style::default().fg(self.theme.dim_fg));
                continue;
            };
            let is_current = line_idx == self.editor.cursor_line;

            let gutter_style = if is_current {
                Style::default()
                    .fg(self.theme.editor_line_nr_current)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.editor_line_nr)
            };
            let number = format!("{:>w$} ", line_idx + 1, w = (gutter_w - 2) as usize);
            buf.set_string(area.x, y, number, gutter_style);
            buf.set_string(
                area.x + gutter_w - 1,
                y,
                "│",
                Style::default().fg(self.theme.editor_gutter_sep),
            );

            let pieces: Vec<(Color, &str)> = match highlight.as_mut() {
                Some(h) => h
                    .highlight_line(content, syntax_set)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|(style, text)| {
                        let fg = style.foreground;
                        (Color::Rgb(fg.r, fg.g, fg.b), text)
                    })
                    .collect(),
                None => vec![(self.theme.preview_fg, content.as_str())],
            };

            let code_x = area.x + gutter_w;
            let mut col = 0usize;
            for (fg, text) in pieces {
                for ch in text.chars() {
                    if col >= code_width as usize {
                        break;
                    }
                    let style = if is_current && col == self.editor.cursor_col {
                        cursor_style
                    } else if is_current {
                        Style::default().fg(fg).bg(self.theme.editor_current_line_bg)
                    } else {
                        Style::default().fg(fg)
                    };
                    buf.set_string(
                        code_x + col as u16,
                        y,
                        display_char(ch).to_string(),
                        style,
                    );
                    col += 1;
                }
            }

            if is_current {
                for fill in col..code_width as usize {
                    let style = if fill == self.editor.cursor_col {
                        cursor_style
                    } else {
                        Style::default().bg(self.theme.editor_current_line_bg)
                    };
                    buf.set_string(code_x + fill as u16, y, " ", style);
                }
            }
        }
    }
}
