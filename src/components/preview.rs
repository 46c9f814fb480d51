use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Widget},
};

use crate::dispatch::{Action, Command, HitMap};
use crate::preview_content::{format_size, Highlighter};
use crate::session::preview::{ImagePreview, PreviewEditWorkflow, PreviewMode};
use crate::theme::ThemeColors;

use super::editor::EditorWidget;

/// Where the modal and its parts go inside `area`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLayout {
    pub outer: Rect,
    pub body: Rect,
    pub footer: Rect,
}

impl PreviewLayout {
    pub fn new(area: Rect) -> Self {
        let width = (area.width as u32 * 90 / 100) as u16;
        let height = (area.height as u32 * 85 / 100) as u16;
        let outer = super::centered_rect(width.max(20), height.max(6), area);
        let inner = Block::default()
            .borders(Borders::ALL)
            .padding(Padding::horizontal(1))
            .inner(outer);
        let body_h = inner.height.saturating_sub(1);
        Self {
            outer,
            body: Rect::new(inner.x, inner.y, inner.width, body_h),
            footer: Rect::new(inner.x, inner.y + body_h, inner.width, inner.height.min(1)),
        }
    }
}

/// Modal over the browser showing the open object, or its editor.
pub struct PreviewWidget<'a> {
    preview: &'a PreviewEditWorkflow,
    lines: &'a [Line<'static>],
    scroll: usize,
    read_only: bool,
    theme: &'a ThemeColors,
    highlighter: &'a Highlighter,
    hits: Option<&'a mut HitMap>,
}

impl<'a> PreviewWidget<'a> {
    pub fn new(
        preview: &'a PreviewEditWorkflow,
        theme: &'a ThemeColors,
        highlighter: &'a Highlighter,
    ) -> Self {
        Self {
            preview,
            lines: &[],
            scroll: 0,
            read_only: false,
            theme,
            highlighter,
            hits: None,
        }
    }

    /// Pre-rendered text lines and the first one shown.
    pub fn lines(mut self, lines: &'a [Line<'static>], scroll: usize) -> Self {
        self.lines = lines;
        self.scroll = scroll;
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn hits(mut self, hits: &'a mut HitMap) -> Self {
        self.hits = Some(hits);
        self
    }

    fn message(&self, text: String, style: Style) -> Vec<Line<'static>> {
        vec![Line::from(Span::styled(text, style))]
    }

    fn image_lines(&self, image: &ImagePreview) -> Vec<Line<'static>> {
        let label = Style::default()
            .fg(self.theme.accent_fg)
            .add_modifier(Modifier::BOLD);
        let value = Style::default().fg(self.theme.preview_fg);
        let dimensions = match image.dimensions {
            Some((w, h)) => format!("{w} × {h} px"),
            None => "unknown".to_string(),
        };
        let size = format_size(Some(image.bytes.len() as u64));
        vec![
            Line::from(Span::styled("Image", label)),
            Line::default(),
            Line::from(vec![
                Span::styled("Type:       ", label),
                Span::styled(image.content_type.clone(), value),
            ]),
            Line::from(vec![
                Span::styled("Size:       ", label),
                Span::styled(size, value),
            ]),
            Line::from(vec![
                Span::styled("Dimensions: ", label),
                Span::styled(dimensions, value),
            ]),
        ]
    }

    /// Footer entries as (label, command); `None` entries are plain text.
    fn footer_entries(&self) -> Vec<(String, Option<Command>)> {
        let mut entries = Vec::new();
        match self.preview.mode() {
            PreviewMode::Editing { error, .. } => {
                if let Some(err) = error {
                    entries.push((format!("{err} "), None));
                }
                entries.push(("[Ctrl+S] Save".to_string(), Some(Action::Save.into())));
                entries.push(("[Esc] Discard".to_string(), Some(Action::Cancel.into())));
            }
            PreviewMode::Saving { .. } => entries.push(("Saving...".to_string(), None)),
            _ => {
                if self.preview.can_edit(self.read_only) {
                    entries.push(("[e] Edit".to_string(), Some(Action::BeginEdit.into())));
                }
                entries.push(("[d] Download".to_string(), Some(Action::Download.into())));
                entries.push(("[Esc] Close".to_string(), Some(Action::Cancel.into())));
            }
        }
        entries
    }
}

impl Widget for PreviewWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let layout = PreviewLayout::new(area);
        let mut hits = self.hits.take();
        if let Some(hits) = hits.as_deref_mut() {
            hits.clear();
        }

        Clear.render(layout.outer, buf);
        let key = self.preview.key().unwrap_or_default();
        let modified = match self.preview.mode() {
            PreviewMode::Editing { editor, .. } if editor.modified => " [+]",
            _ => "",
        };
        Block::default()
            .title(format!(" {key}{modified} "))
            .borders(Borders::ALL)
            .padding(Padding::horizontal(1))
            .border_style(Style::default().fg(self.theme.border_focused_fg))
            .style(Style::default().bg(self.theme.dialog_bg))
            .render(layout.outer, buf);

        let dim = Style::default().fg(self.theme.dim_fg);
        let error = Style::default().fg(self.theme.error_fg);
        let download_hint = || {
            Line::from(Span::styled(
                "Press d to download the file instead.",
                Style::default().fg(self.theme.dim_fg),
            ))
        };
        let body: Vec<Line<'static>> = match self.preview.mode() {
            PreviewMode::Idle => Vec::new(),
            PreviewMode::Loading => self.message("Loading...".to_string(), dim),
            PreviewMode::Image(image) => self.image_lines(image),
            PreviewMode::Text(_) => self
                .lines
                .iter()
                .skip(self.scroll)
                .take(layout.body.height as usize)
                .cloned()
                .collect(),
            PreviewMode::Unsupported { content_type } => {
                let mut lines = self.message(
                    format!("Preview not available for content type {content_type}."),
                    dim,
                );
                lines.push(download_hint());
                lines
            }
            PreviewMode::Error(err) => {
                let mut lines = self.message(err.to_string(), error);
                lines.push(download_hint());
                lines
            }
            PreviewMode::Editing { editor, .. } | PreviewMode::Saving { editor, .. } => {
                EditorWidget::new(editor, key, self.theme, self.highlighter)
                    .render(layout.body, buf);
                Vec::new()
            }
        };
        for (i, line) in body.iter().take(layout.body.height as usize).enumerate() {
            buf.set_line(layout.body.x, layout.body.y + i as u16, line, layout.body.width);
        }

        if layout.footer.height == 0 {
            return;
        }
        let right = layout.footer.x + layout.footer.width;
        let mut x = layout.footer.x;
        for (label, command) in self.footer_entries() {
            if x >= right {
                break;
            }
            let style = match command {
                Some(_) => Style::default()
                    .fg(self.theme.warning_fg)
                    .add_modifier(Modifier::BOLD),
                None => error,
            };
            let start = x;
            let (nx, _) = buf.set_stringn(x, layout.footer.y, &label, (right - x) as usize, style);
            if let (Some(hits), Some(command)) = (hits.as_deref_mut(), command) {
                hits.push(Rect::new(start, layout.footer.y, nx - start, 1), command);
            }
            x = nx.saturating_add(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ObjectBody;

    fn hl() -> Highlighter {
        Highlighter::new("base16-ocean.dark", 262_144, 4)
    }

    fn opened(key: &str, body: ObjectBody) -> PreviewEditWorkflow {
        let mut preview = PreviewEditWorkflow::new(1000, 4);
        let token = preview.open(key);
        assert!(preview.finish_load(token, Ok(body)));
        preview
    }

    fn text_body(text: &str) -> ObjectBody {
        ObjectBody {
            content_type: Some("text/plain".into()),
            bytes: text.as_bytes().to_vec(),
        }
    }

    fn render(preview: &PreviewEditWorkflow, lines: &[Line<'static>], hits: &mut HitMap) -> String {
        let tc = crate::theme::dark_theme();
        let highlighter = hl();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        PreviewWidget::new(preview, &tc, &highlighter)
            .lines(lines, 0)
            .hits(hits)
            .render(area, &mut buf);
        super::super::buffer_text(&buf)
    }

    fn footer_command(hits: &HitMap, action: Action) -> bool {
        hits.regions().any(|(_, c)| c.action == action)
    }

    #[test]
    fn text_preview_offers_edit_and_replaces_hits() {
        let preview = opened("notes.txt", text_body("hello"));
        let lines = vec![Line::from("hello")];
        let mut hits = HitMap::default();
        hits.push(Rect::new(0, 0, 5, 1), Command::new(Action::Refresh));
        let text = render(&preview, &lines, &mut hits);

        assert!(text.contains("notes.txt"));
        assert!(text.contains("hello"));
        assert!(footer_command(&hits, Action::BeginEdit));
        assert!(footer_command(&hits, Action::Download));
        assert!(!footer_command(&hits, Action::Refresh));
    }

    #[test]
    fn read_only_hides_edit() {
        let preview = opened("notes.txt", text_body("hello"));
        let tc = crate::theme::dark_theme();
        let highlighter = hl();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        let mut hits = HitMap::default();
        PreviewWidget::new(&preview, &tc, &highlighter)
            .read_only(true)
            .hits(&mut hits)
            .render(area, &mut buf);
        assert!(!footer_command(&hits, Action::BeginEdit));
    }

    #[test]
    fn image_summary_lists_type_and_size() {
        let png: Vec<u8> = vec![
            0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48,
            0x44, 0x52, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0x08, 0x06, 0x00, 0x00,
            0x00,
        ];
        let preview = opened(
            "logo.png",
            ObjectBody {
                content_type: Some("image/png".into()),
                bytes: png,
            },
        );
        let mut hits = HitMap::default();
        let text = render(&preview, &[], &mut hits);
        assert!(text.contains("image/png"));
        assert!(text.contains("29 B"));
        assert!(text.contains("2 × 3 px"));
    }

    #[test]
    fn editing_shows_save_target() {
        let mut preview = opened("notes.txt", text_body("hello"));
        assert!(preview.begin_edit(false));
        let mut hits = HitMap::default();
        let text = render(&preview, &[], &mut hits);
        assert!(text.contains("1 │hello"));
        assert!(footer_command(&hits, Action::Save));
    }
}
