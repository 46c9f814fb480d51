use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::dispatch::{Action, Command, HitMap};
use crate::preview_content::{file_icon, format_size};
use crate::session::ListingStatus;
use crate::theme::ThemeColors;
use crate::vfs::{Node, SelectionModel};

/// Width of the `[x] ` checkbox column.
const CHECK_W: u16 = 4;
/// Width reserved for the size column.
const SIZE_W: u16 = 10;

pub const EMPTY_FOLDER: &str = "This folder is empty";
pub const NO_MATCHES: &str = "No files match your search";

/// The current level: a header with the select-all box, then one row per
/// node with a checkbox for files.
pub struct FileListWidget<'a> {
    nodes: &'a [&'a Node],
    status: &'a ListingStatus,
    selection: &'a SelectionModel,
    theme: &'a ThemeColors,
    cursor: usize,
    scroll: usize,
    use_icons: bool,
    searching: bool,
    all_checked: bool,
    block: Option<Block<'a>>,
    hits: Option<&'a mut HitMap>,
}

impl<'a> FileListWidget<'a> {
    pub fn new(
        nodes: &'a [&'a Node],
        status: &'a ListingStatus,
        selection: &'a SelectionModel,
        theme: &'a ThemeColors,
    ) -> Self {
        Self {
            nodes,
            status,
            selection,
            theme,
            cursor: 0,
            scroll: 0,
            use_icons: true,
            searching: false,
            all_checked: false,
            block: None,
            hits: None,
        }
    }

    pub fn cursor(mut self, cursor: usize, scroll: usize) -> Self {
        self.cursor = cursor;
        self.scroll = scroll;
        self
    }

    pub fn use_icons(mut self, use_icons: bool) -> Self {
        self.use_icons = use_icons;
        self
    }

    /// Whether a search term is narrowing the list.
    pub fn searching(mut self, searching: bool) -> Self {
        self.searching = searching;
        self
    }

    pub fn all_checked(mut self, all_checked: bool) -> Self {
        self.all_checked = all_checked;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    pub fn hits(mut self, hits: &'a mut HitMap) -> Self {
        self.hits = Some(hits);
        self
    }

    fn record(&mut self, area: Rect, command: Command) {
        if let Some(hits) = self.hits.as_deref_mut() {
            hits.push(area, command);
        }
    }

    /// Message shown in place of rows, if any.
    fn placeholder(&self) -> Option<(String, Style)> {
        if !self.nodes.is_empty() {
            return None;
        }
        let dim = Style::default().fg(self.theme.dim_fg);
        Some(match self.status {
            ListingStatus::Failed(err) => (
                format!("{err}. Press r or click here to retry."),
                Style::default().fg(self.theme.error_fg),
            ),
            ListingStatus::Idle | ListingStatus::Loading => ("Loading...".to_string(), dim),
            ListingStatus::Ready if self.searching => (NO_MATCHES.to_string(), dim),
            ListingStatus::Ready => (EMPTY_FOLDER.to_string(), dim),
        })
    }

    fn render_header(&mut self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .fg(self.theme.header_fg)
            .add_modifier(Modifier::BOLD);
        let check = if self.all_checked { "[x] " } else { "[ ] " };
        buf.set_stringn(area.x, area.y, check, area.width as usize, style);
        let name_x = area.x + CHECK_W.min(area.width);
        buf.set_stringn(
            name_x,
            area.y,
            "Name",
            (area.x + area.width - name_x) as usize,
            style,
        );
        if area.width > CHECK_W + SIZE_W + 4 {
            let size_x = area.x + area.width - SIZE_W;
            buf.set_string(size_x, area.y, format!("{:>w$}", "Size", w = SIZE_W as usize), style);
        }
        self.record(
            Rect::new(area.x, area.y, CHECK_W.min(area.width), 1),
            Command::new(Action::ToggleSelectAll),
        );
    }

    fn row_line(&self, node: &Node, is_cursor: bool, width: u16) -> Line<'static> {
        let checked = self.selection.is_selected(&node.key);
        let check = match (node.is_folder, checked) {
            (true, _) => "    ",
            (false, true) => "[x] ",
            (false, false) => "[ ] ",
        };
        let base = if node.is_folder {
            Style::default()
                .fg(self.theme.list_dir_fg)
                .add_modifier(Modifier::BOLD)
        } else if checked {
            Style::default().fg(self.theme.list_checked_fg)
        } else {
            Style::default().fg(self.theme.list_file_fg)
        };
        let style = if is_cursor {
            base.bg(self.theme.list_selected_bg)
                .fg(self.theme.list_selected_fg)
                .add_modifier(Modifier::BOLD)
        } else {
            base
        };

        let icon = file_icon(&node.name, node.is_folder, self.use_icons);
        let suffix = if node.is_folder { "/" } else { "" };
        let name = format!("{icon}{}{suffix}", node.name);
        let size = format_size(node.size);
        let used = CHECK_W as usize + name.chars().count() + size.len();
        let pad = (width as usize).saturating_sub(used);

        Line::from(vec![
            Span::styled(check, style),
            Span::styled(name, style),
            Span::styled(" ".repeat(pad), style),
            Span::styled(size, style.fg(self.theme.dim_fg)),
        ])
    }
}

impl Widget for FileListWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        let inner = match self.block.take() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        self.render_header(Rect::new(inner.x, inner.y, inner.width, 1), buf);
        let body = Rect::new(
            inner.x,
            inner.y + 1,
            inner.width,
            inner.height.saturating_sub(1),
        );
        if body.height == 0 {
            return;
        }

        if let Some((message, style)) = self.placeholder() {
            buf.set_stringn(body.x + 1, body.y, &message, body.width as usize, style);
            if matches!(self.status, ListingStatus::Failed(_)) {
                self.record(
                    Rect::new(body.x, body.y, body.width, 1),
                    Command::new(Action::Refresh),
                );
            }
            return;
        }

        let rows = self
            .nodes
            .iter()
            .enumerate()
            .skip(self.scroll)
            .take(body.height as usize);
        let mut targets = Vec::new();
        for (row, (idx, node)) in rows.enumerate() {
            let y = body.y + row as u16;
            let line = self.row_line(node, idx == self.cursor, body.width);
            buf.set_line(body.x, y, &line, body.width);

            let check_w = CHECK_W.min(body.width);
            if !node.is_folder {
                targets.push((
                    Rect::new(body.x, y, check_w, 1),
                    Command::with_key(Action::ToggleSelect, node.key.clone()),
                ));
            }
            targets.push((
                Rect::new(body.x + check_w, y, body.width - check_w, 1),
                Command::with_key(Action::Activate, node.key.clone()),
            ));
        }
        for (rect, command) in targets {
            self.record(rect, command);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ListingError, StoreError};
    use crate::theme;
    use crate::vfs::path::materialize;

    fn nodes() -> Vec<Node> {
        materialize("", &["a.txt", "docs/readme.md", "b.csv"])
    }

    fn render(
        visible: &[&Node],
        status: &ListingStatus,
        selection: &SelectionModel,
        searching: bool,
        hits: &mut HitMap,
    ) -> String {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 40, 6);
        let mut buf = Buffer::empty(area);
        FileListWidget::new(visible, status, selection, &tc)
            .use_icons(false)
            .searching(searching)
            .hits(hits)
            .render(area, &mut buf);
        super::super::buffer_text(&buf)
    }

    #[test]
    fn rows_show_checkboxes_for_files_only() {
        let all = nodes();
        let visible: Vec<&Node> = all.iter().collect();
        let mut selection = SelectionModel::default();
        selection.toggle("b.csv");
        let mut hits = HitMap::default();
        let text = render(&visible, &ListingStatus::Ready, &selection, false, &mut hits);

        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[0].starts_with("[ ] Name"));
        assert!(lines[1].starts_with("    [D] docs/"));
        assert!(lines[2].starts_with("[ ] [F] a.txt"));
        assert!(lines[3].starts_with("[x] [F] b.csv"));
    }

    #[test]
    fn clicks_map_to_rows_and_checkboxes() {
        let all = nodes();
        let visible: Vec<&Node> = all.iter().collect();
        let selection = SelectionModel::default();
        let mut hits = HitMap::default();
        render(&visible, &ListingStatus::Ready, &selection, false, &mut hits);

        assert_eq!(hits.hit(1, 0), Some(&Command::new(Action::ToggleSelectAll)));
        assert_eq!(hits.hit(1, 1), None);
        assert_eq!(
            hits.hit(10, 1),
            Some(&Command::with_key(Action::Activate, "docs"))
        );
        assert_eq!(
            hits.hit(1, 2),
            Some(&Command::with_key(Action::ToggleSelect, "a.txt"))
        );
        assert_eq!(
            hits.hit(12, 2),
            Some(&Command::with_key(Action::Activate, "a.txt"))
        );
    }

    #[test]
    fn empty_states_differ_for_search() {
        let selection = SelectionModel::default();
        let mut hits = HitMap::default();
        let text = render(&[], &ListingStatus::Ready, &selection, false, &mut hits);
        assert!(text.contains(EMPTY_FOLDER));
        let text = render(&[], &ListingStatus::Ready, &selection, true, &mut hits);
        assert!(text.contains(NO_MATCHES));
    }

    #[test]
    fn failure_offers_retry_target() {
        let selection = SelectionModel::default();
        let status = ListingStatus::Failed(ListingError(StoreError::Transport(
            "connection refused".into(),
        )));
        let mut hits = HitMap::default();
        let text = render(&[], &status, &selection, false, &mut hits);
        assert!(text.contains("Error loading files"));
        assert_eq!(hits.hit(3, 1), Some(&Command::new(Action::Refresh)));
    }
}
