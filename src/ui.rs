use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::{App, AppMode};
use crate::components::breadcrumbs::BreadcrumbWidget;
use crate::components::dialog::DialogWidget;
use crate::components::file_list::FileListWidget;
use crate::components::help::HelpOverlay;
use crate::components::preview::{PreviewLayout, PreviewWidget};
use crate::components::search::SearchBarWidget;
use crate::components::status_bar::StatusBarWidget;

/// Render the application UI and rebuild the click targets for this frame.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    app.hits.clear();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // bucket label + badges
            Constraint::Length(1), // breadcrumbs
            Constraint::Length(1), // search bar
            Constraint::Min(3),    // list
            Constraint::Length(1), // status bar
        ])
        .split(area);

    render_header(app, frame, chunks[0]);

    frame.render_widget(
        BreadcrumbWidget::new(app.navigation.breadcrumbs(), &app.theme).hits(&mut app.hits),
        chunks[1],
    );
    frame.render_widget(
        SearchBarWidget::new(&app.search, &app.theme).hits(&mut app.hits),
        chunks[2],
    );

    // Border plus the header row.
    app.update_scroll(chunks[3].height.saturating_sub(3) as usize);
    render_list(app, frame, chunks[3]);
    render_status(app, frame, chunks[4]);

    match &app.mode {
        AppMode::Dialog(kind) => {
            frame.render_widget(
                DialogWidget::new(kind, &app.dialog_input, &app.theme).hits(&mut app.hits),
                area,
            );
        }
        AppMode::Preview if app.preview.is_open() => render_preview(app, frame, area),
        AppMode::Help => {
            app.hits.clear();
            frame.render_widget(HelpOverlay::new(&app.theme), area);
        }
        AppMode::Preview | AppMode::Normal | AppMode::Search => {}
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(
        format!(" {} ", app.remote.label()),
        Style::default()
            .fg(theme.header_fg)
            .add_modifier(Modifier::BOLD),
    )];
    let badge = |text: &'static str, color: Color| {
        Span::styled(
            text,
            Style::default()
                .fg(theme.status_bg)
                .bg(color)
                .add_modifier(Modifier::BOLD),
        )
    };
    if app.remote.demo_mode {
        spans.push(Span::raw(" "));
        spans.push(badge(" DEMO ", theme.info_fg));
    }
    if app.read_only() {
        spans.push(Span::raw(" "));
        spans.push(badge(" READ-ONLY ", theme.warning_fg));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_list(app: &mut App, frame: &mut Frame, area: Rect) {
    // The list borrows all of `app`, so its targets land in a scratch map.
    let mut hits = std::mem::take(&mut app.hits);
    {
        let app: &App = app;
        let visible = app.visible();
        let title = if app.search.is_active() {
            format!(" {} of {} ", visible.len(), app.listing.nodes().len())
        } else {
            format!(" {} items ", visible.len())
        };
        let border = if app.mode == AppMode::Normal {
            app.theme.border_focused_fg
        } else {
            app.theme.border_fg
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));

        let widget =
            FileListWidget::new(&visible, app.listing.status(), &app.selection, &app.theme)
                .cursor(app.cursor, app.scroll_offset)
                .use_icons(app.settings.use_icons)
                .searching(app.search.is_active())
                .all_checked(app.all_visible_checked())
                .block(block)
                .hits(&mut hits);
        frame.render_widget(widget, area);
    }
    app.hits = hits;
}

fn render_status(app: &App, frame: &mut Frame, area: Rect) {
    let visible = app.visible().len();
    let summary = match app.selection.count() {
        0 => format!("{visible} items"),
        n => format!("{visible} items, {n} selected"),
    };
    let mut bar = StatusBarWidget::new(app.navigation.current_path(), &summary, &app.theme)
        .read_only(app.read_only());
    if app.batch.is_busy() {
        bar = bar.busy("Working...");
    } else if app.listing.is_loading() {
        bar = bar.busy("Loading...");
    }
    if let Some(msg) = &app.status_message {
        bar = bar.status_message(&msg.text, msg.is_error);
    }
    frame.render_widget(bar, area);
}

fn render_preview(app: &mut App, frame: &mut Frame, area: Rect) {
    let layout = PreviewLayout::new(area);
    app.preview_height = layout.body.height as usize;
    if let Some(editor) = app.preview.editor_mut() {
        editor.visible_height = layout.body.height as usize;
        editor.ensure_cursor_visible();
    }

    let read_only = app.read_only();
    frame.render_widget(
        PreviewWidget::new(&app.preview, &app.theme, &app.highlighter)
            .lines(&app.preview_lines, app.preview_scroll)
            .read_only(read_only)
            .hits(&mut app.hits),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Settings;
    use crate::dispatch::{Action, Command};
    use crate::effects::Completion;
    use crate::preview_content::Highlighter;
    use crate::theme::dark_theme;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn app_with(keys: &[&str]) -> App {
        let mut app = App::new(
            "",
            Settings::default(),
            dark_theme(),
            Highlighter::new("base16-ocean.dark", 1024, 4),
        );
        let effects = app.startup();
        let token = effects
            .iter()
            .find_map(|e| match e {
                crate::effects::Effect::Refresh { token } => Some(*token),
                _ => None,
            })
            .unwrap();
        app.apply(Completion::Listing {
            token,
            result: Ok(keys.iter().map(|k| k.to_string()).collect()),
        });
        app
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| render(app, f)).unwrap();
        crate::components::buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn frame_shows_crumbs_list_and_status() {
        let mut app = app_with(&["docs/readme.md", "a.txt"]);
        let text = draw(&mut app);
        assert!(text.contains("Root"));
        assert!(text.contains("docs/"));
        assert!(text.contains("a.txt"));
        assert!(text.contains("2 items"));
    }

    #[test]
    fn hit_map_targets_rows_after_render() {
        let mut app = app_with(&["docs/readme.md", "a.txt"]);
        draw(&mut app);
        let has = |cmd: &Command| app.hits.regions().any(|(_, c)| c == cmd);
        assert!(has(&Command::with_key(Action::Activate, "docs")));
        assert!(has(&Command::with_key(Action::ToggleSelect, "a.txt")));
        assert!(has(&Command::with_key(Action::OpenCrumb, "")));
        assert!(has(&Command::new(Action::FocusSearch)));
    }

    #[test]
    fn dialog_replaces_background_targets() {
        let mut app = app_with(&["a.txt"]);
        app.dispatch(Command::new(Action::RequestUpload));
        draw(&mut app);
        assert!(app
            .hits
            .regions()
            .all(|(_, c)| matches!(c.action, Action::Submit | Action::Cancel)));
    }

    #[test]
    fn read_only_badge_is_shown() {
        let mut app = app_with(&["a.txt"]);
        app.settings.read_only = true;
        let text = draw(&mut app);
        assert!(text.contains("READ-ONLY"));
    }
}
