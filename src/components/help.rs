use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Widget},
};

use crate::theme::ThemeColors;

/// Key bindings grouped for display: (category, [(keys, description)]).
const CATEGORIES: &[(&str, &[(&str, &str)])] = &[
    (
        "Browse",
        &[
            ("j / ↓", "Move down"),
            ("k / ↑", "Move up"),
            ("g / G", "First / last entry"),
            ("PgUp / PgDn", "Page up / down"),
            ("Enter / l", "Open folder or preview file"),
            ("Backspace / h", "Parent folder"),
            ("r / F5", "Refresh listing (retry after an error)"),
            ("click crumb", "Jump to that folder"),
        ],
    ),
    (
        "Search",
        &[
            ("/", "Filter this folder by name"),
            ("Enter / Esc", "Leave the search bar, keep the filter"),
            ("Esc", "Clear the filter (in the list)"),
        ],
    ),
    (
        "Select",
        &[
            ("Space", "Toggle the file under the cursor"),
            ("a", "Select / deselect all visible files"),
            ("x", "Clear the selection"),
        ],
    ),
    (
        "Objects",
        &[
            ("d", "Download to the download directory"),
            ("D / Delete", "Delete the selection, or the file under the cursor"),
            ("u", "Upload a local file into this folder"),
        ],
    ),
    (
        "Preview",
        &[
            ("j / k", "Scroll"),
            ("e", "Edit (text files, not read-only)"),
            ("d", "Download instead"),
            ("Esc / q", "Close"),
        ],
    ),
    (
        "Editor",
        &[
            ("Ctrl+S", "Save"),
            ("Ctrl+Z / Ctrl+Y", "Undo / redo"),
            ("Esc", "Discard edits"),
        ],
    ),
];

const KEY_COLUMN: usize = 20;

/// Centered key binding reference.
pub struct HelpOverlay<'a> {
    theme: &'a ThemeColors,
}

impl<'a> HelpOverlay<'a> {
    pub fn new(theme: &'a ThemeColors) -> Self {
        Self { theme }
    }

    fn content_lines(&self) -> Vec<Line<'static>> {
        let heading = Style::default()
            .fg(self.theme.accent_fg)
            .add_modifier(Modifier::BOLD);
        let key_style = Style::default()
            .fg(self.theme.warning_fg)
            .add_modifier(Modifier::BOLD);
        let text_style = Style::default().fg(self.theme.list_file_fg);

        let mut lines = Vec::new();
        for (name, entries) in CATEGORIES {
            lines.push(Line::from(vec![
                Span::styled(format!("── {name} "), heading),
                Span::styled("─".repeat(30), Style::default().fg(self.theme.dim_fg)),
            ]));
            for (keys, description) in entries.iter() {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {keys:<KEY_COLUMN$}"), key_style),
                    Span::styled(description.to_string(), text_style),
                ]));
            }
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            " Press ? or Esc to close ",
            Style::default().fg(self.theme.dim_fg),
        )));
        lines
    }

    /// Lines the overlay wants to show.
    pub fn total_lines() -> usize {
        CATEGORIES
            .iter()
            .map(|(_, entries)| entries.len() + 2)
            .sum::<usize>()
            + 1
    }
}

impl Widget for HelpOverlay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = (area.width as f32 * 0.7).clamp(20.0, 80.0) as u16;
        let height = (Self::total_lines() as u16 + 2).min(area.height);
        let rect = super::centered_rect(width, height, area);

        Clear.render(rect, buf);
        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.theme.border_focused_fg))
            .style(Style::default().bg(self.theme.dialog_bg));
        let inner = block.inner(rect);
        block.render(rect, buf);

        for (i, line) in self
            .content_lines()
            .iter()
            .take(inner.height as usize)
            .enumerate()
        {
            buf.set_line(
                inner.x + 1,
                inner.y + i as u16,
                line,
                inner.width.saturating_sub(2),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_category_has_entries() {
        for (name, entries) in CATEGORIES {
            assert!(!entries.is_empty(), "category '{name}' has no entries");
        }
    }

    #[test]
    fn content_lines_match_total() {
        let theme = crate::theme::dark_theme();
        let overlay = HelpOverlay::new(&theme);
        assert_eq!(overlay.content_lines().len(), HelpOverlay::total_lines());
    }

    #[test]
    fn renders_bindings() {
        let theme = crate::theme::dark_theme();
        let area = Rect::new(0, 0, 100, 60);
        let mut buf = Buffer::empty(area);
        HelpOverlay::new(&theme).render(area, &mut buf);
        let text = super::super::buffer_text(&buf);
        assert!(text.contains("Help"));
        assert!(text.contains("Ctrl+S"));
        assert!(text.contains("Upload a local file"));
    }
}
