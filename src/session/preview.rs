//! The preview/edit state machine for a single object.
//!
//! ```text
//! idle ─open─▶ loading ─▶ image | text | unsupported | error
//! text ─edit─▶ editing ─save─▶ saving ─ok─▶ text
//!                  ▲                  └─err─▶ editing
//!                  └──────── cancel ◀─ editing
//! any ─close─▶ idle
//! ```
//!
//! Every load and save carries the session token handed out by
//! [`PreviewEditWorkflow::open`]; a completion whose token is no longer
//! current is dropped, so a slow response can never overwrite a newer session.

use tracing::{debug, error, info, warn};

use crate::editor::EditorState;
use crate::error::{PreviewLoadError, SaveError, StoreError};
use crate::preview_content::{escape_html, image_dimensions, is_editable};
use crate::store::keys::content_type_for;
use crate::store::{ObjectBody, ObjectStore};

/// Decoded text beyond this many characters is cut off for display.
pub const MAX_PREVIEW_CHARS: usize = 500_000;

/// Fetched image held in memory and summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub dimensions: Option<(usize, usize)>,
}

impl ImagePreview {
    pub fn new(content_type: String, bytes: Vec<u8>) -> Self {
        let dimensions = image_dimensions(&bytes);
        Self {
            content_type,
            bytes,
            dimensions,
        }
    }
}

/// Decoded text, possibly cut at the display ceiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPreview {
    /// What is shown: the whole text, or its first `limit` characters.
    pub content: String,
    pub truncated: bool,
    pub total_chars: usize,
    pub limit: usize,
}

impl TextPreview {
    pub fn new(text: String, limit: usize) -> Self {
        match text.char_indices().nth(limit) {
            Some((cut, _)) => {
                let total_chars = limit + text[cut..].chars().count();
                let mut content = text;
                content.truncate(cut);
                Self {
                    content,
                    truncated: true,
                    total_chars,
                    limit,
                }
            }
            None => Self::complete(text),
        }
    }

    /// Text known to be complete, whatever its length.
    pub fn complete(text: String) -> Self {
        let total_chars = text.chars().count();
        Self {
            content: text,
            truncated: false,
            total_chars,
            limit: total_chars,
        }
    }

    pub fn notice(&self) -> Option<String> {
        self.truncated.then(|| {
            format!(
                "[File truncated: showing the first {} of {} characters. Editing is disabled.]",
                self.limit, self.total_chars
            )
        })
    }

    /// The text as escaped `<pre>` markup, ending with the notice when cut.
    pub fn to_markup(&self) -> String {
        match self.notice() {
            Some(notice) => format!(
                "<pre>{}...\n\n{}</pre>",
                escape_html(&self.content),
                escape_html(&notice)
            ),
            None => format!("<pre>{}</pre>", escape_html(&self.content)),
        }
    }
}

/// Where the active session is.
#[derive(Debug, Clone, Default)]
pub enum PreviewMode {
    #[default]
    Idle,
    Loading,
    Image(ImagePreview),
    Text(TextPreview),
    Unsupported {
        content_type: String,
    },
    Editing {
        text: TextPreview,
        editor: EditorState,
        error: Option<SaveError>,
    },
    Saving {
        text: TextPreview,
        editor: EditorState,
    },
    Error(PreviewLoadError),
}

impl PreviewMode {
    pub fn name(&self) -> &'static str {
        match self {
            PreviewMode::Idle => "idle",
            PreviewMode::Loading => "loading",
            PreviewMode::Image(_) => "image",
            PreviewMode::Text(_) => "text",
            PreviewMode::Unsupported { .. } => "unsupported",
            PreviewMode::Editing { .. } => "editing",
            PreviewMode::Saving { .. } => "saving",
            PreviewMode::Error(_) => "error",
        }
    }
}

/// A body to persist, tagged with the session it was produced in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub token: u64,
    pub key: String,
    pub body: String,
}

/// Turn a downloaded body into the mode it should be shown in.
///
/// `image/*` is shown as an image; anything else is tried as strict UTF-8 and
/// falls back to unsupported when it does not decode or contains NUL bytes.
pub fn classify(key: &str, body: ObjectBody, limit: usize) -> PreviewMode {
    let content_type = body
        .content_type
        .unwrap_or_else(|| content_type_for(key).to_string());
    if content_type.starts_with("image/") {
        return PreviewMode::Image(ImagePreview::new(content_type, body.bytes));
    }
    match String::from_utf8(body.bytes) {
        Ok(text) if !text.contains('\0') => PreviewMode::Text(TextPreview::new(text, limit)),
        _ => PreviewMode::Unsupported { content_type },
    }
}

/// Owns the one active preview session.
#[derive(Debug)]
pub struct PreviewEditWorkflow {
    key: Option<String>,
    /// The complete text last loaded or saved; `None` when truncated or not text.
    original_content: Option<String>,
    mode: PreviewMode,
    token: u64,
    limit: usize,
    tab_width: usize,
}

impl Default for PreviewEditWorkflow {
    fn default() -> Self {
        Self::new(MAX_PREVIEW_CHARS, 4)
    }
}

impl PreviewEditWorkflow {
    pub fn new(limit: usize, tab_width: usize) -> Self {
        Self {
            key: None,
            original_content: None,
            mode: PreviewMode::Idle,
            token: 0,
            limit,
            tab_width,
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn mode(&self) -> &PreviewMode {
        &self.mode
    }

    pub fn original_content(&self) -> Option<&str> {
        self.original_content.as_deref()
    }

    pub fn token(&self) -> u64 {
        self.token
    }

    pub fn is_open(&self) -> bool {
        !matches!(self.mode, PreviewMode::Idle)
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, PreviewMode::Editing { .. })
    }

    /// Start a new session for `key`, discarding any previous one including
    /// unsaved edits.
    pub fn open(&mut self, key: &str) -> u64 {
        if self.is_editing() {
            warn!(key = self.key.as_deref(), "discarding unsaved edits");
        }
        self.token += 1;
        self.key = Some(key.to_string());
        self.original_content = None;
        self.mode = PreviewMode::Loading;
        debug!(key, token = self.token, "preview opened");
        self.token
    }

    /// Apply a download result. Returns `false` if it was stale.
    pub fn finish_load(&mut self, token: u64, result: Result<ObjectBody, StoreError>) -> bool {
        if token != self.token || !matches!(self.mode, PreviewMode::Loading) {
            debug!(token, current = self.token, "discarding stale preview load");
            return false;
        }
        let key = self.key.clone().unwrap_or_default();
        self.mode = match result {
            Ok(body) => classify(&key, body, self.limit),
            Err(source) => {
                error!(key, error = %source, "preview load failed");
                PreviewMode::Error(PreviewLoadError { key, source })
            }
        };
        if let PreviewMode::Text(text) = &self.mode {
            if !text.truncated {
                self.original_content = Some(text.content.clone());
            }
        }
        debug!(mode = self.mode.name(), "preview loaded");
        true
    }

    /// Whether the edit affordance should be offered.
    pub fn can_edit(&self, read_only: bool) -> bool {
        let Some(key) = self.key.as_deref() else {
            return false;
        };
        match &self.mode {
            PreviewMode::Text(text) => {
                !read_only && !text.truncated && self.original_content.is_some() && is_editable(key)
            }
            _ => false,
        }
    }

    /// Enter editing with a buffer holding the complete original text.
    pub fn begin_edit(&mut self, read_only: bool) -> bool {
        if !self.can_edit(read_only) {
            return false;
        }
        let original = self.original_content.clone().unwrap_or_default();
        if let PreviewMode::Text(text) = std::mem::take(&mut self.mode) {
            let editor = EditorState::new(&original).with_tab_width(self.tab_width);
            self.mode = PreviewMode::Editing {
                text,
                editor,
                error: None,
            };
        }
        true
    }

    pub fn editor_mut(&mut self) -> Option<&mut EditorState> {
        match &mut self.mode {
            PreviewMode::Editing { editor, .. } => Some(editor),
            _ => None,
        }
    }

    /// Leave editing, dropping the buffer.
    pub fn cancel_edit(&mut self) {
        if !self.is_editing() {
            return;
        }
        if let PreviewMode::Editing { text, .. } = std::mem::take(&mut self.mode) {
            self.mode = PreviewMode::Text(text);
        }
    }

    /// Move to saving and hand out the full buffer to persist.
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        let key = self.key.clone()?;
        match std::mem::take(&mut self.mode) {
            PreviewMode::Editing { text, editor, .. } => {
                let body = editor.content();
                self.mode = PreviewMode::Saving { text, editor };
                Some(SaveRequest {
                    token: self.token,
                    key,
                    body,
                })
            }
            other => {
                self.mode = other;
                None
            }
        }
    }

    /// Apply a save result for `request`. On success the submitted body
    /// becomes the original content and the text view; on failure the editor
    /// comes back untouched with the error attached.
    pub fn finish_save(
        &mut self,
        request: &SaveRequest,
        result: Result<(), StoreError>,
    ) -> Option<Result<(), SaveError>> {
        if request.token != self.token || !matches!(self.mode, PreviewMode::Saving { .. }) {
            debug!(key = request.key, "discarding stale save completion");
            return None;
        }
        let PreviewMode::Saving { text, editor } = std::mem::take(&mut self.mode) else {
            return None;
        };
        match result {
            Ok(()) => {
                info!(key = request.key, bytes = request.body.len(), "saved");
                self.original_content = Some(request.body.clone());
                self.mode = PreviewMode::Text(TextPreview::complete(request.body.clone()));
                Some(Ok(()))
            }
            Err(source) => {
                error!(key = request.key, error = %source, "save failed");
                let err = SaveError {
                    key: request.key.clone(),
                    source,
                };
                self.mode = PreviewMode::Editing {
                    text,
                    editor,
                    error: Some(err.clone()),
                };
                Some(Err(err))
            }
        }
    }

    /// End the session; pending loads and saves become stale.
    pub fn close(&mut self) {
        if self.is_editing() {
            warn!(key = self.key.as_deref(), "closing preview with unsaved edits");
        }
        self.token += 1;
        self.key = None;
        self.original_content = None;
        self.mode = PreviewMode::Idle;
    }

    /// Open `key` and load it from `store` in one step.
    pub async fn load<S: ObjectStore>(&mut self, store: &S, key: &str) -> &PreviewMode {
        let token = self.open(key);
        let result = store.download(key).await;
        self.finish_load(token, result);
        &self.mode
    }

    /// Save the editor buffer to `store` in one step.
    pub async fn save<S: ObjectStore>(&mut self, store: &S) -> Option<Result<(), SaveError>> {
        let request = self.begin_save()?;
        let result = store.update(&request.key, request.body.clone()).await;
        self.finish_save(&request, result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::testing::FlakyStore;
    use crate::store::MemoryStore;

    fn body(bytes: &[u8], content_type: &str) -> ObjectBody {
        ObjectBody {
            bytes: bytes.to_vec(),
            content_type: Some(content_type.to_string()),
        }
    }

    #[test]
    fn large_csv_is_truncated_and_not_editable() {
        let mut wf = PreviewEditWorkflow::default();
        let token = wf.open("report.csv");
        let text = "x".repeat(600_000);
        assert!(wf.finish_load(token, Ok(body(text.as_bytes(), "text/csv"))));
        let PreviewMode::Text(preview) = wf.mode() else {
            panic!("expected text, got {}", wf.mode().name());
        };
        assert!(preview.truncated);
        assert_eq!(preview.content.chars().count(), 500_000);
        assert_eq!(preview.total_chars, 600_000);
        assert!(preview.notice().unwrap().contains("truncated"));
        assert!(!wf.can_edit(false));
        assert!(!wf.begin_edit(false));
        assert!(wf.original_content().is_none());
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let preview = TextPreview::new("é".repeat(10), 4);
        assert_eq!(preview.content, "éééé");
        assert_eq!(preview.total_chars, 10);
        let exact = TextPreview::new("abcd".to_string(), 4);
        assert!(!exact.truncated);
    }

    #[test]
    fn markup_escapes_content_and_appends_notice() {
        let preview = TextPreview::new("<b>&".to_string(), 10);
        assert_eq!(preview.to_markup(), "<pre>&lt;b&gt;&amp;</pre>");
        let cut = TextPreview::new("<<<<<".to_string(), 2);
        let markup = cut.to_markup();
        assert!(markup.starts_with("<pre>&lt;&lt;...\n\n[File truncated"));
    }

    #[test]
    fn image_content_type_becomes_image() {
        let mut wf = PreviewEditWorkflow::default();
        let token = wf.open("images/logo.png");
        wf.finish_load(token, Ok(body(b"\x89PNG....", "image/png")));
        assert_eq!(wf.mode().name(), "image");
        assert!(!wf.can_edit(false));
    }

    #[test]
    fn binary_body_is_unsupported() {
        let mut wf = PreviewEditWorkflow::default();
        let token = wf.open("data.txt");
        wf.finish_load(token, Ok(body(&[0xff, 0xfe, 0x00], "application/octet-stream")));
        assert!(matches!(wf.mode(), PreviewMode::Unsupported { .. }));
        let token = wf.open("nul.txt");
        wf.finish_load(token, Ok(body(b"a\0b", "text/plain")));
        assert!(matches!(wf.mode(), PreviewMode::Unsupported { .. }));
    }

    #[test]
    fn missing_content_type_uses_extension() {
        let mode = classify(
            "pic.gif",
            ObjectBody {
                bytes: b"GIF89a".to_vec(),
                content_type: None,
            },
            10,
        );
        assert!(matches!(mode, PreviewMode::Image(ref img) if img.content_type == "image/gif"));
    }

    #[test]
    fn load_failure_becomes_error_mode() {
        let mut wf = PreviewEditWorkflow::default();
        let token = wf.open("a.txt");
        wf.finish_load(token, Err(StoreError::NotFound("a.txt".into())));
        let PreviewMode::Error(err) = wf.mode() else {
            panic!("expected error");
        };
        assert_eq!(err.key, "a.txt");
    }

    #[test]
    fn stale_load_does_not_clobber_newer_session() {
        let mut wf = PreviewEditWorkflow::default();
        let first = wf.open("a.txt");
        let second = wf.open("b.txt");
        assert!(!wf.finish_load(first, Ok(body(b"from a", "text/plain"))));
        assert_eq!(wf.mode().name(), "loading");
        assert!(wf.finish_load(second, Ok(body(b"from b", "text/plain"))));
        assert_eq!(wf.original_content(), Some("from b"));
    }

    #[test]
    fn load_after_close_is_discarded() {
        let mut wf = PreviewEditWorkflow::default();
        let token = wf.open("a.txt");
        wf.close();
        assert!(!wf.finish_load(token, Ok(body(b"late", "text/plain"))));
        assert!(!wf.is_open());
    }

    #[test]
    fn read_only_or_non_editable_blocks_editing() {
        let mut wf = PreviewEditWorkflow::default();
        let token = wf.open("page.txt");
        wf.finish_load(token, Ok(body(b"hi", "text/plain")));
        assert!(!wf.can_edit(true));
        assert!(wf.can_edit(false));

        let token = wf.open("blob.bin");
        wf.finish_load(token, Ok(body(b"hi", "text/plain")));
        assert!(!wf.can_edit(false));
    }

    #[test]
    fn cancel_edit_returns_to_text() {
        let mut wf = PreviewEditWorkflow::default();
        let token = wf.open("a.md");
        wf.finish_load(token, Ok(body(b"# hi", "text/markdown")));
        assert!(wf.begin_edit(false));
        wf.editor_mut().unwrap().insert_char('x');
        wf.cancel_edit();
        assert_eq!(wf.mode().name(), "text");
        assert_eq!(wf.original_content(), Some("# hi"));
    }

    #[test]
    fn save_success_updates_original_content() {
        let mut wf = PreviewEditWorkflow::default();
        let token = wf.open("a.txt");
        wf.finish_load(token, Ok(body(b"old", "text/plain")));
        wf.begin_edit(false);
        let editor = wf.editor_mut().unwrap();
        editor.move_end();
        editor.insert_char('!');
        let request = wf.begin_save().unwrap();
        assert_eq!(request.body, "old!");
        assert_eq!(wf.mode().name(), "saving");
        assert_eq!(wf.finish_save(&request, Ok(())), Some(Ok(())));
        assert_eq!(wf.original_content(), Some("old!"));
        let PreviewMode::Text(text) = wf.mode() else {
            panic!("expected text");
        };
        assert_eq!(text.content, "old!");
    }

    #[test]
    fn save_failure_keeps_editor_buffer() {
        let mut wf = PreviewEditWorkflow::default();
        let token = wf.open("a.txt");
        wf.finish_load(token, Ok(body(b"old", "text/plain")));
        wf.begin_edit(false);
        wf.editor_mut().unwrap().insert_char('>');
        let request = wf.begin_save().unwrap();
        let outcome = wf.finish_save(&request, Err(StoreError::Transport("down".into())));
        assert!(matches!(outcome, Some(Err(_))));
        let PreviewMode::Editing { editor, error, .. } = wf.mode() else {
            panic!("expected editing");
        };
        assert_eq!(editor.content(), ">old");
        assert!(error.is_some());
        assert_eq!(wf.original_content(), Some("old"));
    }

    #[test]
    fn save_completion_after_reopen_is_ignored() {
        let mut wf = PreviewEditWorkflow::default();
        let token = wf.open("a.txt");
        wf.finish_load(token, Ok(body(b"old", "text/plain")));
        wf.begin_edit(false);
        let request = wf.begin_save().unwrap();
        wf.open("b.txt");
        assert_eq!(wf.finish_save(&request, Ok(())), None);
        assert_eq!(wf.key(), Some("b.txt"));
    }

    #[tokio::test]
    async fn load_and_save_round_trip_against_store() {
        let store = MemoryStore::with_objects([("notes.txt", "line\n")]);
        let mut wf = PreviewEditWorkflow::default();
        assert_eq!(wf.load(&store, "notes.txt").await.name(), "text");
        assert!(wf.begin_edit(false));
        wf.editor_mut().unwrap().insert_char('#');
        assert_eq!(wf.save(&store).await, Some(Ok(())));
        assert_eq!(store.get("notes.txt").unwrap(), b"#line\n");
    }

    #[tokio::test]
    async fn failed_store_update_surfaces_save_error() {
        let flaky = FlakyStore::new(MemoryStore::with_objects([("a.txt", "x")]));
        flaky.set_fail_update(true);
        let mut wf = PreviewEditWorkflow::default();
        wf.load(&flaky, "a.txt").await;
        wf.begin_edit(false);
        let err = wf.save(&flaky).await.unwrap().unwrap_err();
        assert!(err.to_string().starts_with("Failed to save a.txt"));
        assert!(wf.is_editing());
        assert_eq!(flaky.inner.get("a.txt").unwrap(), b"x");
    }
}
