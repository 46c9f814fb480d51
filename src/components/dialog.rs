use std::path::Path;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::app::DialogKind;
use crate::dispatch::{Action, Command, HitMap};
use crate::input::TextInput;
use crate::theme::ThemeColors;

/// Centered modal for the upload prompts, delete confirmation and errors.
pub struct DialogWidget<'a> {
    kind: &'a DialogKind,
    input: &'a TextInput,
    theme: &'a ThemeColors,
    hits: Option<&'a mut HitMap>,
}

impl<'a> DialogWidget<'a> {
    pub fn new(kind: &'a DialogKind, input: &'a TextInput, theme: &'a ThemeColors) -> Self {
        Self {
            kind,
            input,
            theme,
            hits: None,
        }
    }

    /// Replace the click targets with the dialog's buttons.
    pub fn hits(mut self, hits: &'a mut HitMap) -> Self {
        self.hits = Some(hits);
        self
    }

    fn frame(&self, title: &str, width: u16, height: u16, danger: bool, area: Rect, buf: &mut Buffer) -> Rect {
        let rect = super::centered_rect(width.min(area.width.saturating_sub(4)), height, area);
        Clear.render(rect, buf);
        let border = if danger {
            self.theme.error_fg
        } else {
            self.theme.dialog_border_fg
        };
        let block = Block::default()
            .title(format!(" {title} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(self.theme.dialog_bg))
            .padding(Padding::horizontal(1));
        let inner = block.inner(rect);
        block.render(rect, buf);
        inner
    }

    fn render_input(&mut self, title: &str, detail: Option<String>, area: Rect, buf: &mut Buffer) {
        let height = if detail.is_some() { 6 } else { 5 };
        let inner = self.frame(title, 60, height, false, area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let mut y = inner.y;
        if let Some(detail) = detail {
            buf.set_line(
                inner.x,
                y,
                &Line::from(Span::styled(detail, Style::default().fg(self.theme.dim_fg))),
                inner.width,
            );
            y += 1;
        }

        let (before, at, after) = self.input.split_at_cursor();
        // Keep the cursor in view when the value is wider than the box.
        let room = (inner.width as usize).saturating_sub(2);
        let skip = before.chars().count().saturating_sub(room);
        let before: String = before.chars().skip(skip).collect();
        let text = Style::default().fg(self.theme.list_file_fg);
        let line = Line::from(vec![
            Span::styled(before, text),
            Span::styled(
                at.to_string(),
                Style::default()
                    .fg(self.theme.editor_cursor_fg)
                    .bg(self.theme.editor_cursor_bg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(after.to_string(), text),
        ]);
        buf.set_line(inner.x, y + 1, &line, inner.width);

        self.render_hints(
            &[
                ("[Enter] Confirm", Action::Submit),
                ("[Esc] Cancel", Action::Cancel),
            ],
            inner,
            buf,
        );
    }

    fn render_delete(&mut self, keys: &[String], area: Rect, buf: &mut Buffer) {
        let widest = keys.iter().map(|k| k.chars().count()).max().unwrap_or(10);
        let height = (keys.len() as u16 + 6).min(area.height.saturating_sub(2));
        let inner = self.frame("Delete", widest as u16 + 10, height, true, area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let header = match keys.len() {
            1 => "Delete this object?".to_string(),
            n => format!("Delete these {n} objects?"),
        };
        buf.set_line(
            inner.x,
            inner.y,
            &Line::from(Span::styled(
                header,
                Style::default()
                    .fg(self.theme.warning_fg)
                    .add_modifier(Modifier::BOLD),
            )),
            inner.width,
        );

        let room = inner.height.saturating_sub(3) as usize;
        let shown = if keys.len() > room { room.saturating_sub(1) } else { room };
        for (i, key) in keys.iter().take(shown).enumerate() {
            buf.set_line(
                inner.x,
                inner.y + 2 + i as u16,
                &Line::from(Span::styled(
                    format!("  • {key}"),
                    Style::default().fg(self.theme.list_file_fg),
                )),
                inner.width,
            );
        }
        if keys.len() > shown && room > 0 {
            buf.set_line(
                inner.x,
                inner.y + 2 + shown as u16,
                &Line::from(Span::styled(
                    format!("  … and {} more", keys.len() - shown),
                    Style::default().fg(self.theme.dim_fg),
                )),
                inner.width,
            );
        }

        self.render_hints(
            &[("[y] Delete", Action::Submit), ("[n/Esc] Cancel", Action::Cancel)],
            inner,
            buf,
        );
    }

    fn render_error(&mut self, message: &str, area: Rect, buf: &mut Buffer) {
        let width = message.chars().count() as u16 + 6;
        let inner = self.frame("Error", width.max(30), 5, true, area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }
        buf.set_line(
            inner.x,
            inner.y + inner.height / 2,
            &Line::from(Span::styled(message, Style::default().fg(self.theme.error_fg))),
            inner.width,
        );
        self.render_hints(&[("[Enter/Esc] Dismiss", Action::Cancel)], inner, buf);
    }

    /// Button row on the last inner line; each label is a click target.
    fn render_hints(&mut self, hints: &[(&str, Action)], inner: Rect, buf: &mut Buffer) {
        if inner.height < 2 {
            return;
        }
        let y = inner.y + inner.height - 1;
        let right = inner.x + inner.width;
        let style = Style::default()
            .fg(self.theme.dim_fg)
            .add_modifier(Modifier::BOLD);
        let mut x = inner.x;
        for (label, action) in hints {
            if x >= right {
                break;
            }
            let (end, _) = buf.set_stringn(x, y, label, (right - x) as usize, style);
            if let Some(hits) = self.hits.as_deref_mut() {
                hits.push(Rect::new(x, y, end - x, 1), Command::new(*action));
            }
            x = end.saturating_add(2);
        }
    }
}

impl Widget for DialogWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        if let Some(hits) = self.hits.as_deref_mut() {
            hits.clear();
        }
        match self.kind {
            DialogKind::UploadPath => {
                self.render_input("Upload: local file path", None, area, buf);
            }
            DialogKind::UploadKey { path } => {
                let detail = format!("From {}", display_path(path));
                self.render_input("Upload as key", Some(detail), area, buf);
            }
            DialogKind::DeleteConfirm { keys } => self.render_delete(keys, area, buf),
            DialogKind::Error { message } => self.render_error(message, area, buf),
        }
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn render(kind: &DialogKind, input: &TextInput, hits: &mut HitMap) -> String {
        let tc = crate::theme::dark_theme();
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        DialogWidget::new(kind, input, &tc)
            .hits(hits)
            .render(area, &mut buf);
        super::super::buffer_text(&buf)
    }

    fn has_action(hits: &HitMap, action: Action) -> bool {
        hits.regions().any(|(_, c)| c.action == action)
    }

    #[test]
    fn upload_path_shows_input_and_buttons() {
        let input = TextInput::with_value("/tmp/report.csv");
        let mut hits = HitMap::default();
        hits.push(Rect::new(0, 0, 80, 1), Command::new(Action::Refresh));
        let text = render(&DialogKind::UploadPath, &input, &mut hits);
        assert!(text.contains("Upload: local file path"));
        assert!(text.contains("/tmp/report.csv"));
        assert!(has_action(&hits, Action::Submit));
        assert!(has_action(&hits, Action::Cancel));
        assert!(!has_action(&hits, Action::Refresh));
    }

    #[test]
    fn upload_key_names_the_source() {
        let input = TextInput::with_value("docs/report.csv");
        let kind = DialogKind::UploadKey {
            path: PathBuf::from("/tmp/report.csv"),
        };
        let mut hits = HitMap::default();
        let text = render(&kind, &input, &mut hits);
        assert!(text.contains("From /tmp/report.csv"));
        assert!(text.contains("docs/report.csv"));
    }

    #[test]
    fn delete_confirm_lists_keys() {
        let kind = DialogKind::DeleteConfirm {
            keys: vec!["a.txt".into(), "docs/b.txt".into()],
        };
        let mut hits = HitMap::default();
        let text = render(&kind, &TextInput::default(), &mut hits);
        assert!(text.contains("Delete these 2 objects?"));
        assert!(text.contains("• a.txt"));
        assert!(text.contains("• docs/b.txt"));
        assert!(text.contains("[y] Delete"));
        assert!(has_action(&hits, Action::Submit));
    }

    #[test]
    fn long_delete_list_is_summarized() {
        let keys: Vec<String> = (0..40).map(|i| format!("file-{i}.txt")).collect();
        let kind = DialogKind::DeleteConfirm { keys };
        let mut hits = HitMap::default();
        let text = render(&kind, &TextInput::default(), &mut hits);
        assert!(text.contains("more"));
    }

    #[test]
    fn error_dialog_dismisses() {
        let kind = DialogKind::Error {
            message: "Failed to upload a.txt: boom".into(),
        };
        let mut hits = HitMap::default();
        let text = render(&kind, &TextInput::default(), &mut hits);
        assert!(text.contains("Failed to upload a.txt: boom"));
        assert_eq!(hits.len(), 1);
    }
}
