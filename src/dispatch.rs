//! Commands: every user intent, from the keyboard or the mouse, becomes a
//! [`Command`] that `App::dispatch` applies.
//!
//! Rendering records which screen rectangles map to which command in a
//! [`HitMap`]; mouse clicks are resolved against the map from the last frame.

use ratatui::layout::{Position, Rect};

/// Edits to a single-line input (search bar, dialogs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// Edits to the multi-line editor buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    Char(char),
    Tab,
    Newline,
    Backspace,
    Delete,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Undo,
    Redo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,

    // List cursor
    CursorUp,
    CursorDown,
    CursorFirst,
    CursorLast,
    PageUp,
    PageDown,

    /// Open the node under `key`: navigate into a folder, preview a file.
    Activate,
    /// Jump to the breadcrumb whose path is `key`.
    OpenCrumb,
    NavigateUp,
    /// Retry the listing (or refresh a good one).
    Refresh,

    // Selection
    ToggleSelect,
    ToggleSelectAll,
    ClearSelection,

    // Search
    FocusSearch,
    ClearSearch,

    // Mutations
    Download,
    /// Ask to delete the selection, or `key` when nothing is selected.
    RequestDelete,
    RequestUpload,
    /// Confirm the open dialog.
    Submit,
    /// Back out of the innermost mode.
    Cancel,
    /// Single-line input edit for the focused input.
    Text(TextEdit),

    // Preview modal
    ScrollPreview(i32),
    BeginEdit,
    Save,
    Edit(EditorKey),

    ToggleHelp,
}

/// An action, optionally addressed to an object key or path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub action: Action,
    pub key: Option<String>,
}

impl Command {
    pub fn new(action: Action) -> Self {
        Self { action, key: None }
    }

    pub fn with_key(action: Action, key: impl Into<String>) -> Self {
        Self {
            action,
            key: Some(key.into()),
        }
    }
}

impl From<Action> for Command {
    fn from(action: Action) -> Self {
        Command::new(action)
    }
}

/// Interactive regions of the last rendered frame.
#[derive(Debug, Clone, Default)]
pub struct HitMap {
    regions: Vec<(Rect, Command)>,
}

impl HitMap {
    pub fn push(&mut self, area: Rect, command: Command) {
        if area.width > 0 && area.height > 0 {
            self.regions.push((area, command));
        }
    }

    /// Drop everything recorded so far; a modal covers the frame.
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// The command at a cell. Later regions sit on top of earlier ones.
    pub fn hit(&self, column: u16, row: u16) -> Option<&Command> {
        let pos = Position::new(column, row);
        self.regions
            .iter()
            .rev()
            .find(|(area, _)| area.contains(pos))
            .map(|(_, cmd)| cmd)
    }

    #[cfg(test)]
    pub fn regions(&self) -> impl Iterator<Item = &(Rect, Command)> {
        self.regions.iter()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.regions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_resolves_topmost_region() {
        let mut hits = HitMap::default();
        hits.push(Rect::new(0, 0, 10, 5), Command::new(Action::Refresh));
        hits.push(
            Rect::new(2, 1, 3, 1),
            Command::with_key(Action::ToggleSelect, "a.txt"),
        );

        assert_eq!(
            hits.hit(3, 1),
            Some(&Command::with_key(Action::ToggleSelect, "a.txt"))
        );
        assert_eq!(hits.hit(0, 0), Some(&Command::new(Action::Refresh)));
        assert_eq!(hits.hit(10, 0), None);
    }

    #[test]
    fn empty_regions_are_ignored() {
        let mut hits = HitMap::default();
        hits.push(Rect::new(0, 0, 0, 3), Command::new(Action::Quit));
        assert_eq!(hits.regions().count(), 0);
    }

    #[test]
    fn clear_forgets_regions() {
        let mut hits = HitMap::default();
        hits.push(Rect::new(0, 0, 4, 4), Command::new(Action::Quit));
        hits.clear();
        assert_eq!(hits.hit(1, 1), None);
    }
}
