use std::path::PathBuf;
use std::time::{Duration, Instant};

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use tracing::{error, info, warn};

use crate::dispatch::{Action, Command, EditorKey, HitMap, TextEdit};
use crate::effects::{Completion, Effect};
use crate::error::SaveError;
use crate::input::TextInput;
use crate::preview_content::{is_previewable, Highlighter};
use crate::session::batch::{BatchMutationCoordinator, UploadReport};
use crate::session::preview::{PreviewEditWorkflow, PreviewMode};
use crate::session::transfer::{local_file_name, upload_key};
use crate::session::ListingSession;
use crate::store::keys::file_name;
use crate::store::RemoteConfig;
use crate::theme::ThemeColors;
use crate::vfs::{NavigationController, Node, SearchFilter, SelectionModel};

/// How long a status message stays up.
const STATUS_TTL: Duration = Duration::from_secs(4);

/// The kind of dialog being displayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogKind {
    /// Local path of the file to upload.
    UploadPath,
    /// Key to upload `path` under, prefilled with its file name.
    UploadKey { path: PathBuf },
    DeleteConfirm { keys: Vec<String> },
    Error { message: String },
}

impl DialogKind {
    pub fn has_input(&self) -> bool {
        matches!(self, DialogKind::UploadPath | DialogKind::UploadKey { .. })
    }
}

/// Application mode.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum AppMode {
    #[default]
    Normal,
    /// Typing into the search bar.
    Search,
    Dialog(DialogKind),
    Preview,
    Help,
}

/// Startup settings that do not change while running.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Client-side read-only; OR-ed with the server's flag.
    pub read_only: bool,
    pub confirm_delete: bool,
    pub download_dir: PathBuf,
    pub use_icons: bool,
    pub max_chars: usize,
    pub tab_width: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            read_only: false,
            confirm_delete: true,
            download_dir: PathBuf::from("."),
            use_icons: true,
            max_chars: crate::session::preview::MAX_PREVIEW_CHARS,
            tab_width: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    created: Instant,
}

/// Main application state.
///
/// Each concern lives in its own component; `dispatch` and `apply` are the
/// only ways in, and both return the effects the caller must run.
pub struct App {
    pub navigation: NavigationController,
    pub listing: ListingSession,
    pub selection: SelectionModel,
    pub search: SearchFilter,
    pub preview: PreviewEditWorkflow,
    pub batch: BatchMutationCoordinator,
    pub remote: RemoteConfig,
    pub settings: Settings,
    pub theme: ThemeColors,
    pub highlighter: Highlighter,

    pub mode: AppMode,
    pub dialog_input: TextInput,
    pub status_message: Option<StatusMessage>,

    /// Cursor into the filtered node list.
    pub cursor: usize,
    pub scroll_offset: usize,
    /// Rows available to the list in the last frame.
    pub list_height: usize,

    /// Rendered text preview, rebuilt when the preview content changes.
    pub preview_lines: Vec<Line<'static>>,
    pub preview_scroll: usize,
    pub preview_height: usize,

    /// Interactive regions of the last frame.
    pub hits: HitMap,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        start_path: &str,
        settings: Settings,
        theme: ThemeColors,
        highlighter: Highlighter,
    ) -> Self {
        let preview = PreviewEditWorkflow::new(settings.max_chars, settings.tab_width);
        Self {
            navigation: NavigationController::new(start_path),
            listing: ListingSession::default(),
            selection: SelectionModel::default(),
            search: SearchFilter::default(),
            preview,
            batch: BatchMutationCoordinator::default(),
            remote: RemoteConfig::default(),
            settings,
            theme,
            highlighter,
            mode: AppMode::Normal,
            dialog_input: TextInput::default(),
            status_message: None,
            cursor: 0,
            scroll_offset: 0,
            list_height: 20,
            preview_lines: Vec::new(),
            preview_scroll: 0,
            preview_height: 20,
            hits: HitMap::default(),
            should_quit: false,
        }
    }

    /// Effects to run once before the first frame.
    pub fn startup(&mut self) -> Vec<Effect> {
        vec![Effect::FetchConfig, self.refresh()]
    }

    // ── Derived state ──────────────────────────────────────────────────────

    pub fn read_only(&self) -> bool {
        self.settings.read_only || self.remote.read_only_mode
    }

    /// Nodes of the current level after the search filter.
    pub fn visible(&self) -> Vec<&Node> {
        self.search.filter(self.listing.nodes())
    }

    /// Keys of the visible files; the domain of "select all".
    pub fn visible_file_keys(&self) -> Vec<&str> {
        self.visible()
            .into_iter()
            .filter(|n| !n.is_folder)
            .map(|n| n.key.as_str())
            .collect()
    }

    /// Checked state of the header checkbox, shared with `ToggleSelectAll`.
    pub fn all_visible_checked(&self) -> bool {
        self.selection.all_checked(&self.visible_file_keys())
    }

    pub fn cursor_node(&self) -> Option<&Node> {
        self.visible().get(self.cursor).copied()
    }

    fn node_by_key(&self, key: &str) -> Option<&Node> {
        self.listing.nodes().iter().find(|n| n.key == key)
    }

    /// The key a command targets: its own, else the node under the cursor.
    fn target_key(&self, cmd: &Command) -> Option<String> {
        cmd.key
            .clone()
            .or_else(|| self.cursor_node().map(|n| n.key.clone()))
    }

    // ── Status messages ────────────────────────────────────────────────────

    pub fn set_status_message(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: false,
            created: Instant::now(),
        });
    }

    pub fn set_error_message(&mut self, text: impl Into<String>) {
        self.status_message = Some(StatusMessage {
            text: text.into(),
            is_error: true,
            created: Instant::now(),
        });
    }

    /// Clear the status message once it has been up long enough.
    pub fn clear_expired_status(&mut self) {
        if let Some(msg) = &self.status_message {
            if msg.created.elapsed() > STATUS_TTL {
                self.status_message = None;
            }
        }
    }

    // ── Cursor ─────────────────────────────────────────────────────────────

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.cursor = 0;
        } else if self.cursor >= len {
            self.cursor = len - 1;
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }
        let next = self.cursor as isize + delta;
        self.cursor = next.clamp(0, len as isize - 1) as usize;
    }

    fn focus_key(&mut self, key: &str) {
        if let Some(idx) = self.visible().iter().position(|n| n.key == key) {
            self.cursor = idx;
        }
    }

    /// Keep the cursor row inside the viewport.
    pub fn update_scroll(&mut self, height: usize) {
        self.list_height = height;
        if height == 0 {
            return;
        }
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + height {
            self.scroll_offset = self.cursor + 1 - height;
        }
    }

    // ── Dispatch ───────────────────────────────────────────────────────────

    /// Apply a user command. Returns the effects it started.
    pub fn dispatch(&mut self, cmd: Command) -> Vec<Effect> {
        match cmd.action {
            Action::Quit => {
                self.should_quit = true;
                Vec::new()
            }
            Action::CursorUp => self.cursor_then(-1),
            Action::CursorDown => self.cursor_then(1),
            Action::PageUp => self.cursor_then(-(self.list_height.max(1) as isize)),
            Action::PageDown => self.cursor_then(self.list_height.max(1) as isize),
            Action::CursorFirst => {
                self.cursor = 0;
                Vec::new()
            }
            Action::CursorLast => {
                self.cursor = self.visible().len().saturating_sub(1);
                Vec::new()
            }
            Action::Activate => self.activate(&cmd),
            Action::OpenCrumb => {
                let path = cmd.key.unwrap_or_default();
                let changed = self.navigation.navigate_to_breadcrumb(&path);
                self.after_navigation(changed)
            }
            Action::NavigateUp => {
                let changed = self.navigation.navigate_up();
                self.after_navigation(changed)
            }
            Action::Refresh => vec![self.refresh()],
            Action::ToggleSelect => {
                if let Some(key) = self.target_key(&cmd) {
                    if self.node_by_key(&key).is_some_and(|n| !n.is_folder) {
                        self.selection.toggle(&key);
                    }
                }
                Vec::new()
            }
            Action::ToggleSelectAll => {
                let visible: Vec<String> =
                    self.visible_file_keys().into_iter().map(String::from).collect();
                let refs: Vec<&str> = visible.iter().map(String::as_str).collect();
                self.selection.toggle_all(&refs);
                Vec::new()
            }
            Action::ClearSelection => {
                self.selection.clear();
                Vec::new()
            }
            Action::FocusSearch => {
                self.search.focus();
                self.mode = AppMode::Search;
                Vec::new()
            }
            Action::ClearSearch => {
                self.search.reset();
                if self.mode == AppMode::Search {
                    self.mode = AppMode::Normal;
                }
                self.clamp_cursor();
                Vec::new()
            }
            Action::Text(edit) => {
                self.text_edit(edit);
                Vec::new()
            }
            Action::Download => self.download(&cmd),
            Action::RequestDelete => self.request_delete(&cmd),
            Action::RequestUpload => {
                if self.read_only() {
                    self.set_error_message("Read-only mode: uploads are disabled");
                } else {
                    self.open_dialog(DialogKind::UploadPath);
                }
                Vec::new()
            }
            Action::Submit => self.submit_dialog(),
            Action::Cancel => self.cancel(),
            Action::ScrollPreview(delta) => {
                let max = self.preview_lines.len().saturating_sub(1);
                let next = (self.preview_scroll as i64 + delta as i64).clamp(0, max as i64);
                self.preview_scroll = next as usize;
                Vec::new()
            }
            Action::BeginEdit => {
                if !self.preview.begin_edit(self.read_only()) {
                    self.explain_no_edit();
                }
                Vec::new()
            }
            Action::Save => match self.preview.begin_save() {
                Some(request) => {
                    self.set_status_message(format!("Saving {}...", request.key));
                    vec![Effect::Save(request)]
                }
                None => Vec::new(),
            },
            Action::Edit(key) => {
                self.editor_key(key);
                Vec::new()
            }
            Action::ToggleHelp => {
                self.mode = match self.mode {
                    AppMode::Help => AppMode::Normal,
                    AppMode::Normal => AppMode::Help,
                    ref other => other.clone(),
                };
                Vec::new()
            }
        }
    }

    fn cursor_then(&mut self, delta: isize) -> Vec<Effect> {
        self.move_cursor(delta);
        Vec::new()
    }

    /// Start a listing refresh and return the effect that performs it.
    fn refresh(&mut self) -> Effect {
        Effect::Refresh {
            token: self.listing.begin_refresh(),
        }
    }

    fn after_navigation(&mut self, changed: bool) -> Vec<Effect> {
        if !changed {
            return Vec::new();
        }
        self.listing.rematerialize(self.navigation.current_path());
        self.cursor = 0;
        self.scroll_offset = 0;
        vec![self.refresh()]
    }

    fn activate(&mut self, cmd: &Command) -> Vec<Effect> {
        let Some(key) = self.target_key(cmd) else {
            return Vec::new();
        };
        let Some(node) = self.node_by_key(&key).cloned() else {
            return Vec::new();
        };
        self.focus_key(&node.key);
        if node.is_folder {
            let changed = self.navigation.navigate_to_folder(&node.key);
            return self.after_navigation(changed);
        }
        self.open_preview(&node.key)
    }

    fn open_preview(&mut self, key: &str) -> Vec<Effect> {
        if !is_previewable(key) {
            self.set_status_message(format!(
                "No preview available for {}. Press d to download.",
                file_name(key)
            ));
            return Vec::new();
        }
        let token = self.preview.open(key);
        self.preview_lines.clear();
        self.preview_scroll = 0;
        self.mode = AppMode::Preview;
        vec![Effect::Load {
            token,
            key: key.to_string(),
        }]
    }

    fn close_preview(&mut self) {
        self.preview.close();
        self.preview_lines.clear();
        self.preview_scroll = 0;
        self.mode = AppMode::Normal;
    }

    fn explain_no_edit(&mut self) {
        let reason = match self.preview.mode() {
            PreviewMode::Text(text) if text.truncated => {
                "Editing is disabled for truncated files"
            }
            PreviewMode::Text(_) if self.read_only() => "Read-only mode: editing is disabled",
            PreviewMode::Text(_) => "This file type cannot be edited as text",
            _ => return,
        };
        self.set_error_message(reason);
    }

    fn download(&mut self, cmd: &Command) -> Vec<Effect> {
        let key = if self.mode == AppMode::Preview {
            self.preview.key().map(String::from)
        } else {
            self.target_key(cmd)
        };
        let Some(key) = key else {
            return Vec::new();
        };
        if self.node_by_key(&key).is_some_and(|n| n.is_folder) {
            self.set_error_message("Folders cannot be downloaded");
            return Vec::new();
        }
        self.set_status_message(format!("Downloading {}...", file_name(&key)));
        vec![Effect::Download {
            key,
            dir: self.settings.download_dir.clone(),
        }]
    }

    fn request_delete(&mut self, cmd: &Command) -> Vec<Effect> {
        if self.read_only() {
            self.set_error_message("Read-only mode: deletes are disabled");
            return Vec::new();
        }
        let keys = if cmd.key.is_none() && !self.selection.is_empty() {
            self.selection.keys()
        } else {
            match self.target_key(cmd) {
                Some(key) if self.node_by_key(&key).is_some_and(|n| !n.is_folder) => vec![key],
                _ => Vec::new(),
            }
        };
        if keys.is_empty() {
            return Vec::new();
        }
        if self.settings.confirm_delete {
            self.open_dialog(DialogKind::DeleteConfirm { keys });
            Vec::new()
        } else {
            self.start_delete(keys)
        }
    }

    fn start_delete(&mut self, keys: Vec<String>) -> Vec<Effect> {
        self.batch.begin();
        self.set_status_message(format!("Deleting {} object(s)...", keys.len()));
        vec![Effect::Delete { keys }]
    }

    // ── Dialogs ────────────────────────────────────────────────────────────

    pub fn open_dialog(&mut self, kind: DialogKind) {
        self.dialog_input = match &kind {
            DialogKind::UploadKey { path } => {
                TextInput::with_value(local_file_name(path).unwrap_or_default())
            }
            _ => TextInput::default(),
        };
        self.mode = AppMode::Dialog(kind);
    }

    pub fn close_dialog(&mut self) {
        self.mode = AppMode::Normal;
        self.dialog_input.clear();
    }

    fn submit_dialog(&mut self) -> Vec<Effect> {
        let AppMode::Dialog(kind) = self.mode.clone() else {
            return Vec::new();
        };
        match kind {
            DialogKind::UploadPath => {
                let raw = self.dialog_input.value.trim();
                if raw.is_empty() {
                    return Vec::new();
                }
                let path = PathBuf::from(raw);
                if local_file_name(&path).is_none() {
                    self.open_dialog(DialogKind::Error {
                        message: format!("{} is not a file", path.display()),
                    });
                    return Vec::new();
                }
                self.open_dialog(DialogKind::UploadKey { path });
                Vec::new()
            }
            DialogKind::UploadKey { path } => {
                let local = local_file_name(&path).unwrap_or_default();
                let key = upload_key(
                    self.navigation.current_path(),
                    &self.dialog_input.value,
                    &local,
                );
                self.close_dialog();
                self.batch.begin();
                self.set_status_message(format!("Uploading {key}... 0%"));
                vec![Effect::Upload { path, key }]
            }
            DialogKind::DeleteConfirm { keys } => {
                self.close_dialog();
                self.start_delete(keys)
            }
            DialogKind::Error { .. } => {
                self.close_dialog();
                Vec::new()
            }
        }
    }

    fn cancel(&mut self) -> Vec<Effect> {
        match self.mode {
            AppMode::Search => {
                self.search.blur();
                self.mode = AppMode::Normal;
            }
            AppMode::Dialog(_) => self.close_dialog(),
            AppMode::Help => self.mode = AppMode::Normal,
            AppMode::Preview => {
                if self.preview.is_editing() {
                    self.preview.cancel_edit();
                } else {
                    self.close_preview();
                }
            }
            AppMode::Normal => {
                if self.search.is_active() {
                    self.search.reset();
                    self.clamp_cursor();
                }
            }
        }
        Vec::new()
    }

    fn text_edit(&mut self, edit: TextEdit) {
        let input = match &self.mode {
            AppMode::Search => &mut self.search.input,
            AppMode::Dialog(kind) if kind.has_input() => &mut self.dialog_input,
            _ => return,
        };
        match edit {
            TextEdit::Insert(c) => input.insert(c),
            TextEdit::Backspace => input.backspace(),
            TextEdit::Delete => input.delete(),
            TextEdit::Left => input.left(),
            TextEdit::Right => input.right(),
            TextEdit::Home => input.home(),
            TextEdit::End => input.end(),
        }
        if self.mode == AppMode::Search {
            self.cursor = 0;
            self.scroll_offset = 0;
        }
    }

    fn editor_key(&mut self, key: EditorKey) {
        let Some(editor) = self.preview.editor_mut() else {
            return;
        };
        match key {
            EditorKey::Char(c) => editor.insert_char(c),
            EditorKey::Tab => editor.insert_tab(),
            EditorKey::Newline => editor.insert_newline(),
            EditorKey::Backspace => editor.delete_char_before(),
            EditorKey::Delete => editor.delete_char_at(),
            EditorKey::Up => editor.move_up(),
            EditorKey::Down => editor.move_down(),
            EditorKey::Left => editor.move_left(),
            EditorKey::Right => editor.move_right(),
            EditorKey::Home => editor.move_home(),
            EditorKey::End => editor.move_end(),
            EditorKey::PageUp => editor.page_up(),
            EditorKey::PageDown => editor.page_down(),
            EditorKey::Undo => editor.undo(),
            EditorKey::Redo => editor.redo(),
        }
        editor.ensure_cursor_visible();
    }

    // ── Completions ────────────────────────────────────────────────────────

    /// Apply the result of an effect. Returns follow-up effects.
    pub fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        match completion {
            Completion::Config(Ok(remote)) => {
                info!(
                    bucket = %remote.label(),
                    read_only = remote.read_only_mode,
                    demo = remote.demo_mode,
                    "remote config loaded"
                );
                self.remote = remote;
                Vec::new()
            }
            Completion::Config(Err(err)) => {
                warn!(error = %err, "failed to load remote config, using defaults");
                Vec::new()
            }
            Completion::Listing { token, result } => {
                let current = self.navigation.current_path().to_string();
                if self.listing.finish_refresh(token, result, &current) {
                    if let Some(err) = self.listing.error() {
                        let message = err.to_string();
                        self.set_error_message(format!("{message} (press r to retry)"));
                    }
                    self.clamp_cursor();
                }
                Vec::new()
            }
            Completion::Loaded { token, result } => {
                if self.preview.finish_load(token, result) {
                    self.rebuild_preview_lines();
                }
                Vec::new()
            }
            Completion::Saved { request, result } if request.token != self.preview.token() => {
                // The preview closed while saving; report the outcome anyway.
                match result {
                    Ok(()) => {
                        info!(key = request.key, "saved after the preview closed");
                        self.set_status_message(format!("Saved {}", request.key));
                    }
                    Err(source) => {
                        let err = SaveError {
                            key: request.key,
                            source,
                        };
                        error!(error = %err, "save failed after the preview closed");
                        self.set_error_message(err.to_string());
                    }
                }
                Vec::new()
            }
            Completion::Saved { request, result } => {
                match self.preview.finish_save(&request, result) {
                    Some(Ok(())) => {
                        self.set_status_message(format!("Saved {}", request.key));
                        self.rebuild_preview_lines();
                    }
                    Some(Err(err)) => self.set_error_message(err.to_string()),
                    None => {}
                }
                Vec::new()
            }
            Completion::Deleted(report) => {
                match self.batch.finish_delete(report) {
                    Ok(count) => self.set_status_message(format!("Deleted {count} object(s)")),
                    Err(err) => self.set_error_message(err.to_string()),
                }
                vec![self.refresh()]
            }
            Completion::Uploaded(result) => {
                let report = match result {
                    Ok(_) => UploadReport {
                        total: 1,
                        failures: Vec::new(),
                    },
                    Err(err) => UploadReport {
                        total: 1,
                        failures: vec![err],
                    },
                };
                match self.batch.finish_upload(report) {
                    Ok(_) => {
                        self.set_status_message("Upload complete 100%");
                        vec![self.refresh()]
                    }
                    Err(failures) => {
                        let message = failures
                            .first()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "Upload failed".to_string());
                        self.set_error_message(message);
                        Vec::new()
                    }
                }
            }
            Completion::Downloaded(Ok(path)) => {
                self.set_status_message(format!("Downloaded to {}", path.display()));
                Vec::new()
            }
            Completion::Downloaded(Err(err)) => {
                self.set_error_message(err.to_string());
                Vec::new()
            }
        }
    }

    /// Highlight the text preview once, rather than on every frame.
    fn rebuild_preview_lines(&mut self) {
        self.preview_scroll = 0;
        self.preview_lines.clear();
        let (PreviewMode::Text(text), Some(key)) = (self.preview.mode(), self.preview.key())
        else {
            return;
        };
        let mut lines = self.highlighter.render(key, &text.content);
        if let Some(notice) = text.notice() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                notice,
                Style::default()
                    .fg(self.theme.warning_fg)
                    .add_modifier(Modifier::BOLD),
            )));
        }
        self.preview_lines = lines;
    }
}
