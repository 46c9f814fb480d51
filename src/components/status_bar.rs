use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

const KEY_HINTS: &str = " /:search  d:get  D:del  u:put  ?:help ";
const KEY_HINTS_READ_ONLY: &str = " /:search  d:get  ?:help ";

/// Bottom line: a transient message, or the current folder, counts and key hints.
pub struct StatusBarWidget<'a> {
    path_str: &'a str,
    summary: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
    read_only: bool,
    busy: Option<&'a str>,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(path_str: &'a str, summary: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            path_str,
            summary,
            theme,
            status_message: None,
            is_error: false,
            read_only: false,
            busy: None,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Short label for work in flight, e.g. `Deleting...`.
    pub fn busy(mut self, label: &'a str) -> Self {
        self.busy = Some(label);
        self
    }
}

/// `s` cut to at most `width` chars, keeping its tail when `from_end`.
fn fit(s: &str, width: usize, from_end: bool) -> String {
    let len = s.chars().count();
    if len <= width {
        return s.to_string();
    }
    if from_end && width > 3 {
        let tail: String = s.chars().skip(len - (width - 3)).collect();
        return format!("...{tail}");
    }
    s.chars().take(width).collect()
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        let width = area.width as usize;
        let bar = Style::default()
            .bg(self.theme.status_bg)
            .fg(self.theme.status_fg);

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_fg)
            } else {
                Style::default().fg(self.theme.success_fg)
            };
            let display = format!("{:<width$}", fit(msg, width, false));
            buf.set_line(area.x, area.y, &Line::from(Span::styled(display, style)), area.width);
            return;
        }

        let hints = if self.read_only {
            KEY_HINTS_READ_ONLY
        } else {
            KEY_HINTS
        };
        let busy = self.busy.map(|b| format!(" {b}")).unwrap_or_default();
        let fixed = self.summary.chars().count() + busy.chars().count() + hints.len() + 2;
        let path = format!(" /{}", self.path_str);
        let path = fit(&path, width.saturating_sub(fixed), true);

        let mut spans = vec![
            Span::styled(path, bar),
            Span::styled("  ", bar),
            Span::styled(self.summary.to_string(), bar.fg(self.theme.info_fg)),
        ];
        if !busy.is_empty() {
            spans.push(Span::styled(
                busy,
                bar.fg(self.theme.warning_fg).add_modifier(Modifier::BOLD),
            ));
        }
        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        let pad = width.saturating_sub(used).saturating_sub(hints.len());
        spans.push(Span::styled(" ".repeat(pad), bar));
        spans.push(Span::styled(hints, bar.fg(self.theme.dim_fg)));

        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}
