//! Terminal input to [`Command`]s. Nothing here changes state; the result
//! goes through `App::dispatch`.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::app::{App, AppMode, DialogKind};
use crate::dispatch::{Action, Command, EditorKey, TextEdit};
use crate::session::preview::PreviewMode;

/// Lines scrolled per mouse wheel notch.
const WHEEL_LINES: i32 = 3;

/// Map a key press to a command for the current mode.
pub fn handle_key_event(app: &App, key: KeyEvent) -> Option<Command> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Some(Action::Quit.into());
    }

    let action = match &app.mode {
        AppMode::Normal => normal_key(key),
        AppMode::Search => search_key(key),
        AppMode::Dialog(kind) => dialog_key(kind, key),
        AppMode::Help => match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::ToggleHelp),
            _ => None,
        },
        AppMode::Preview => match app.preview.mode() {
            PreviewMode::Editing { .. } => editor_key(key, ctrl),
            PreviewMode::Saving { .. } => None,
            _ => preview_key(app, key),
        },
    };
    action.map(Command::new)
}

fn normal_key(key: KeyEvent) -> Option<Action> {
    let action = match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::CursorDown,
        KeyCode::Char('k') | KeyCode::Up => Action::CursorUp,
        KeyCode::Char('g') | KeyCode::Home => Action::CursorFirst,
        KeyCode::Char('G') | KeyCode::End => Action::CursorLast,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Action::Activate,
        KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => Action::NavigateUp,
        KeyCode::Char(' ') => Action::ToggleSelect,
        KeyCode::Char('a') => Action::ToggleSelectAll,
        KeyCode::Char('x') => Action::ClearSelection,
        KeyCode::Char('/') => Action::FocusSearch,
        KeyCode::Char('r') | KeyCode::F(5) => Action::Refresh,
        KeyCode::Char('d') => Action::Download,
        KeyCode::Char('D') | KeyCode::Delete => Action::RequestDelete,
        KeyCode::Char('u') => Action::RequestUpload,
        KeyCode::Char('?') => Action::ToggleHelp,
        KeyCode::Esc => Action::Cancel,
        _ => return None,
    };
    Some(action)
}

fn text_edit(key: KeyEvent) -> Option<TextEdit> {
    let edit = match key.code {
        KeyCode::Char(c) => TextEdit::Insert(c),
        KeyCode::Backspace => TextEdit::Backspace,
        KeyCode::Delete => TextEdit::Delete,
        KeyCode::Left => TextEdit::Left,
        KeyCode::Right => TextEdit::Right,
        KeyCode::Home => TextEdit::Home,
        KeyCode::End => TextEdit::End,
        _ => return None,
    };
    Some(edit)
}

fn search_key(key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => Some(Action::Cancel),
        KeyCode::Down => Some(Action::CursorDown),
        KeyCode::Up => Some(Action::CursorUp),
        _ => text_edit(key).map(Action::Text),
    }
}

fn dialog_key(kind: &DialogKind, key: KeyEvent) -> Option<Action> {
    match kind {
        DialogKind::DeleteConfirm { .. } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(Action::Submit),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
        DialogKind::Error { .. } => match key.code {
            KeyCode::Enter | KeyCode::Esc => Some(Action::Cancel),
            _ => None,
        },
        DialogKind::UploadPath | DialogKind::UploadKey { .. } => match key.code {
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Esc => Some(Action::Cancel),
            _ => text_edit(key).map(Action::Text),
        },
    }
}

fn preview_key(app: &App, key: KeyEvent) -> Option<Action> {
    let page = app.preview_height.max(1) as i32;
    let action = match key.code {
        KeyCode::Esc | KeyCode::Char('q') => Action::Cancel,
        KeyCode::Char('e') => Action::BeginEdit,
        KeyCode::Char('d') => Action::Download,
        KeyCode::Char('j') | KeyCode::Down => Action::ScrollPreview(1),
        KeyCode::Char('k') | KeyCode::Up => Action::ScrollPreview(-1),
        KeyCode::PageDown | KeyCode::Char(' ') => Action::ScrollPreview(page),
        KeyCode::PageUp => Action::ScrollPreview(-page),
        KeyCode::Char('g') | KeyCode::Home => Action::ScrollPreview(i32::MIN / 2),
        KeyCode::Char('G') | KeyCode::End => Action::ScrollPreview(i32::MAX / 2),
        _ => return None,
    };
    Some(action)
}

fn editor_key(key: KeyEvent, ctrl: bool) -> Option<Action> {
    if ctrl {
        return match key.code {
            KeyCode::Char('s') => Some(Action::Save),
            KeyCode::Char('z') => Some(Action::Edit(EditorKey::Undo)),
            KeyCode::Char('y') => Some(Action::Edit(EditorKey::Redo)),
            _ => None,
        };
    }
    let edit = match key.code {
        KeyCode::Esc => return Some(Action::Cancel),
        KeyCode::Char(c) => EditorKey::Char(c),
        KeyCode::Tab => EditorKey::Tab,
        KeyCode::Enter => EditorKey::Newline,
        KeyCode::Backspace => EditorKey::Backspace,
        KeyCode::Delete => EditorKey::Delete,
        KeyCode::Up => EditorKey::Up,
        KeyCode::Down => EditorKey::Down,
        KeyCode::Left => EditorKey::Left,
        KeyCode::Right => EditorKey::Right,
        KeyCode::Home => EditorKey::Home,
        KeyCode::End => EditorKey::End,
        KeyCode::PageUp => EditorKey::PageUp,
        KeyCode::PageDown => EditorKey::PageDown,
        _ => return None,
    };
    Some(Action::Edit(edit))
}

/// Map a mouse event: clicks go through the last frame's hit regions, the
/// wheel scrolls whatever has focus.
pub fn handle_mouse_event(app: &App, mouse: MouseEvent) -> Option<Command> {
    let editing = app.preview.is_editing();
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.hits.hit(mouse.column, mouse.row).cloned(),
        MouseEventKind::ScrollDown => Some(match app.mode {
            AppMode::Preview if editing => Action::Edit(EditorKey::Down).into(),
            AppMode::Preview => Action::ScrollPreview(WHEEL_LINES).into(),
            AppMode::Normal | AppMode::Search => Action::CursorDown.into(),
            _ => return None,
        }),
        MouseEventKind::ScrollUp => Some(match app.mode {
            AppMode::Preview if editing => Action::Edit(EditorKey::Up).into(),
            AppMode::Preview => Action::ScrollPreview(-WHEEL_LINES).into(),
            AppMode::Normal | AppMode::Search => Action::CursorUp.into(),
            _ => return None,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Settings;
    use crate::preview_content::Highlighter;
    use crate::theme::dark_theme;
    use ratatui::layout::Rect;

    fn app() -> App {
        App::new(
            "",
            Settings::default(),
            dark_theme(),
            Highlighter::new("base16-ocean.dark", 1024, 4),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn action(app: &App, key: KeyEvent) -> Option<Action> {
        handle_key_event(app, key).map(|c| c.action)
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let mut app = app();
        assert_eq!(action(&app, ctrl('c')), Some(Action::Quit));
        app.mode = AppMode::Search;
        assert_eq!(action(&app, ctrl('c')), Some(Action::Quit));
    }

    #[test]
    fn normal_mode_bindings() {
        let app = app();
        assert_eq!(action(&app, press(KeyCode::Char('j'))), Some(Action::CursorDown));
        assert_eq!(action(&app, press(KeyCode::Enter)), Some(Action::Activate));
        assert_eq!(action(&app, press(KeyCode::Char(' '))), Some(Action::ToggleSelect));
        assert_eq!(action(&app, press(KeyCode::Char('/'))), Some(Action::FocusSearch));
        assert_eq!(action(&app, press(KeyCode::Char('D'))), Some(Action::RequestDelete));
        assert_eq!(action(&app, press(KeyCode::Char('z'))), None);
    }

    #[test]
    fn search_mode_types_text() {
        let mut app = app();
        app.mode = AppMode::Search;
        assert_eq!(
            action(&app, press(KeyCode::Char('q'))),
            Some(Action::Text(TextEdit::Insert('q')))
        );
        assert_eq!(action(&app, press(KeyCode::Enter)), Some(Action::Cancel));
    }

    #[test]
    fn delete_confirm_accepts_y() {
        let mut app = app();
        app.mode = AppMode::Dialog(DialogKind::DeleteConfirm {
            keys: vec!["a".into()],
        });
        assert_eq!(action(&app, press(KeyCode::Char('y'))), Some(Action::Submit));
        assert_eq!(action(&app, press(KeyCode::Char('n'))), Some(Action::Cancel));
        assert_eq!(action(&app, press(KeyCode::Char('x'))), None);
    }

    #[test]
    fn click_resolves_through_hit_map() {
        let mut app = app();
        app.hits.push(
            Rect::new(0, 2, 20, 1),
            Command::with_key(Action::Activate, "docs"),
        );
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 5,
            row: 2,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            handle_mouse_event(&app, click),
            Some(Command::with_key(Action::Activate, "docs"))
        );
        let miss = MouseEvent { row: 9, ..click };
        assert_eq!(handle_mouse_event(&app, miss), None);
    }

    #[test]
    fn wheel_scrolls_preview() {
        let mut app = app();
        app.mode = AppMode::Preview;
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(
            handle_mouse_event(&app, wheel).map(|c| c.action),
            Some(Action::ScrollPreview(WHEEL_LINES))
        );
    }
}
