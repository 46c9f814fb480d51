use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::dispatch::{Action, Command, HitMap};
use crate::theme::ThemeColors;
use crate::vfs::SearchFilter;

const PROMPT: &str = " / ";
const HINT: &str = "Press / to search this folder";
const CLEAR: &str = "[x] clear";

/// One-line filter bar above the list.
pub struct SearchBarWidget<'a> {
    search: &'a SearchFilter,
    theme: &'a ThemeColors,
    hits: Option<&'a mut HitMap>,
}

impl<'a> SearchBarWidget<'a> {
    pub fn new(search: &'a SearchFilter, theme: &'a ThemeColors) -> Self {
        Self {
            search,
            theme,
            hits: None,
        }
    }

    pub fn hits(mut self, hits: &'a mut HitMap) -> Self {
        self.hits = Some(hits);
        self
    }
}

impl Widget for SearchBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let prompt_style = if self.search.focused {
            Style::default()
                .fg(self.theme.accent_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.theme.dim_fg)
        };
        let text_style = Style::default().fg(self.theme.list_file_fg);

        let mut spans = vec![Span::styled(PROMPT, prompt_style)];
        let mut clear_at = None;
        if self.search.focused {
            let (before, at, after) = self.search.input.split_at_cursor();
            spans.push(Span::styled(before.to_string(), text_style));
            spans.push(Span::styled(
                at.to_string(),
                Style::default()
                    .fg(self.theme.editor_cursor_fg)
                    .bg(self.theme.editor_cursor_bg),
            ));
            spans.push(Span::styled(after.to_string(), text_style));
        } else if self.search.is_active() {
            spans.push(Span::styled(self.search.term().to_string(), text_style));
            spans.push(Span::raw("  "));
            clear_at = Some(spans.iter().map(|s| s.width() as u16).sum::<u16>());
            spans.push(Span::styled(CLEAR, Style::default().fg(self.theme.dim_fg)));
        } else {
            spans.push(Span::styled(HINT, Style::default().fg(self.theme.dim_fg)));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        if let Some(hits) = self.hits {
            hits.push(
                Rect::new(area.x, area.y, area.width, 1),
                Command::new(Action::FocusSearch),
            );
            if let Some(offset) = clear_at.filter(|o| *o < area.width) {
                let width = (CLEAR.len() as u16).min(area.width - offset);
                hits.push(
                    Rect::new(area.x + offset, area.y, width, 1),
                    Command::new(Action::ClearSearch),
                );
            }
        }
    }
}
