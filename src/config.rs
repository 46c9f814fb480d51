//! Application configuration: TOML file loading, CLI overrides, and defaults.
//!
//! Resolution order (first found wins, values merge/override):
//! 1. CLI flags (`--server`, `--read-only`, `--theme`, etc.)
//! 2. `--config <FILE>`
//! 3. `$BKT_CONFIG` environment variable (path to config file)
//! 4. Project-local `.bkt.toml` in the current working directory
//! 5. Global `~/.config/bkt/config.toml`
//! 6. Built-in defaults

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::preview_content::DEFAULT_SYNTAX_THEME;
use crate::session::preview::MAX_PREVIEW_CHARS;

// ── Section configs ──────────────────────────────────────────────────────────

/// General application settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Virtual folder to open at startup (overridden by CLI positional arg).
    pub start_path: Option<String>,
    /// Confirm before delete operations.
    pub confirm_delete: Option<bool>,
    /// Enable mouse support.
    pub mouse: Option<bool>,
    /// Where downloads are written.
    pub download_dir: Option<PathBuf>,
}

/// Bucket service connection.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the bucket service.
    pub url: Option<String>,
    /// Refuse edits client-side, whatever the server says.
    pub read_only: Option<bool>,
    /// Use the in-memory demo bucket instead of the server.
    pub demo: Option<bool>,
}

/// Preview modal settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PreviewConfig {
    /// Characters of decoded text shown before truncating.
    pub max_chars: Option<usize>,
    /// Text larger than this (bytes) is shown without syntax highlighting.
    pub highlight_max_bytes: Option<usize>,
    /// Tab rendering width.
    pub tab_width: Option<usize>,
    /// Syntax highlighting theme (syntect theme name).
    pub syntax_theme: Option<String>,
}

/// File list settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ListConfig {
    /// Use nerd font icons (false = ASCII fallback).
    pub use_icons: Option<bool>,
}

/// Color settings for a single theme palette.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeColorsConfig {
    pub list_fg: Option<String>,
    pub list_selected_bg: Option<String>,
    pub list_selected_fg: Option<String>,
    pub list_dir_fg: Option<String>,
    pub list_file_fg: Option<String>,
    pub list_checked_fg: Option<String>,
    pub header_fg: Option<String>,
    pub crumb_fg: Option<String>,
    pub status_bg: Option<String>,
    pub status_fg: Option<String>,
    pub border_fg: Option<String>,
    pub dialog_bg: Option<String>,
    pub dialog_border_fg: Option<String>,
}

/// Theme configuration section.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ThemeConfig {
    /// Color scheme: "dark", "light", "custom".
    pub scheme: Option<String>,
    /// Custom color overrides.
    pub custom: Option<ThemeColorsConfig>,
}

/// Log output settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive, e.g. "info" or "bucket_browser_tui=debug".
    pub level: Option<String>,
    /// Log file path.
    pub file: Option<PathBuf>,
}

// ── Top-level config ─────────────────────────────────────────────────────────

/// Top-level application configuration.
///
/// All fields are optional so that partial configs from different sources
/// can be merged together (CLI overrides file, file overrides defaults).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub server: ServerConfig,
    pub preview: PreviewConfig,
    pub list: ListConfig,
    pub theme: ThemeConfig,
    pub log: LogConfig,
}

/// A merged configuration and the problems met while reading files.
///
/// Logging is configured from the result, so warnings are returned to be
/// logged once the subscriber is up.
#[derive(Debug, Default)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub warnings: Vec<String>,
}

// ── Default constants ────────────────────────────────────────────────────────

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
/// Default highlighting ceiling (256 KiB).
pub const DEFAULT_HIGHLIGHT_MAX_BYTES: usize = 262_144;
pub const DEFAULT_TAB_WIDTH: usize = 4;
pub const DEFAULT_LOG_LEVEL: &str = "info";

// ── Config file locator ──────────────────────────────────────────────────────

/// Return the list of candidate config file paths in priority order.
///
/// Does not include the CLI `--config` path, which `load` handles first.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(env_path) = std::env::var("BKT_CONFIG") {
        paths.push(PathBuf::from(env_path));
    }
    if let Ok(cwd) = std::env::current_dir() {
        paths.push(cwd.join(".bkt.toml"));
    }
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("bkt").join("config.toml"));
    }

    paths
}

/// Read and parse a TOML config file. A missing file is `Ok(None)`; an
/// unreadable or malformed one is an error message.
fn load_file(path: &Path) -> Result<Option<AppConfig>, String> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(format!("failed to read config file {}: {e}", path.display())),
    };
    toml::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|e| format!("failed to parse config file {}: {e}", path.display()))
}

// ── Merge logic ──────────────────────────────────────────────────────────────

fn pick<T: Clone>(over: &Option<T>, base: Option<T>) -> Option<T> {
    over.clone().or(base)
}

impl AppConfig {
    /// Merge `other` on top of `self`. `Some` values in `other` win.
    pub fn merge(self, other: &AppConfig) -> AppConfig {
        AppConfig {
            general: GeneralConfig {
                start_path: pick(&other.general.start_path, self.general.start_path),
                confirm_delete: pick(&other.general.confirm_delete, self.general.confirm_delete),
                mouse: pick(&other.general.mouse, self.general.mouse),
                download_dir: pick(&other.general.download_dir, self.general.download_dir),
            },
            server: ServerConfig {
                url: pick(&other.server.url, self.server.url),
                read_only: pick(&other.server.read_only, self.server.read_only),
                demo: pick(&other.server.demo, self.server.demo),
            },
            preview: PreviewConfig {
                max_chars: pick(&other.preview.max_chars, self.preview.max_chars),
                highlight_max_bytes: pick(
                    &other.preview.highlight_max_bytes,
                    self.preview.highlight_max_bytes,
                ),
                tab_width: pick(&other.preview.tab_width, self.preview.tab_width),
                syntax_theme: pick(&other.preview.syntax_theme, self.preview.syntax_theme),
            },
            list: ListConfig {
                use_icons: pick(&other.list.use_icons, self.list.use_icons),
            },
            theme: ThemeConfig {
                scheme: pick(&other.theme.scheme, self.theme.scheme),
                custom: pick(&other.theme.custom, self.theme.custom),
            },
            log: LogConfig {
                level: pick(&other.log.level, self.log.level),
                file: pick(&other.log.file, self.log.file),
            },
        }
    }

    /// Load the final merged configuration.
    ///
    /// `cli_config_path` is an explicit config file path from `--config`.
    /// `cli_overrides` are partial overrides derived from CLI flags.
    pub fn load(cli_config_path: Option<&Path>, cli_overrides: Option<&AppConfig>) -> LoadedConfig {
        let mut loaded = LoadedConfig::default();

        let mut files = candidate_paths();
        files.reverse();
        files.extend(cli_config_path.map(Path::to_path_buf));

        // Lowest priority first so that later files overwrite.
        for path in &files {
            match load_file(path) {
                Ok(Some(file_cfg)) => loaded.config = loaded.config.merge(&file_cfg),
                Ok(None) => {}
                Err(warning) => loaded.warnings.push(warning),
            }
        }
        if let Some(path) = cli_config_path {
            if !path.exists() {
                loaded
                    .warnings
                    .push(format!("config file {} does not exist", path.display()));
            }
        }

        if let Some(overrides) = cli_overrides {
            loaded.config = loaded.config.merge(overrides);
        }

        loaded
    }

    // ── Convenience getters with built-in defaults ──────────────────────────

    pub fn start_path(&self) -> &str {
        self.general.start_path.as_deref().unwrap_or("")
    }

    pub fn confirm_delete(&self) -> bool {
        self.general.confirm_delete.unwrap_or(true)
    }

    pub fn mouse_enabled(&self) -> bool {
        self.general.mouse.unwrap_or(true)
    }

    /// Download directory: configured, else the user's download folder, else
    /// the working directory.
    pub fn download_dir(&self) -> PathBuf {
        self.general
            .download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn server_url(&self) -> &str {
        self.server.url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn read_only(&self) -> bool {
        self.server.read_only.unwrap_or(false)
    }

    pub fn demo(&self) -> bool {
        self.server.demo.unwrap_or(false)
    }

    pub fn max_chars(&self) -> usize {
        self.preview.max_chars.unwrap_or(MAX_PREVIEW_CHARS)
    }

    pub fn highlight_max_bytes(&self) -> usize {
        self.preview
            .highlight_max_bytes
            .unwrap_or(DEFAULT_HIGHLIGHT_MAX_BYTES)
    }

    pub fn tab_width(&self) -> usize {
        self.preview.tab_width.unwrap_or(DEFAULT_TAB_WIDTH).max(1)
    }

    pub fn syntax_theme_name(&self) -> &str {
        self.preview
            .syntax_theme
            .as_deref()
            .unwrap_or(DEFAULT_SYNTAX_THEME)
    }

    pub fn use_icons(&self) -> bool {
        self.list.use_icons.unwrap_or(true)
    }

    /// Theme scheme: "dark", "light", or "custom".
    pub fn theme_scheme(&self) -> &str {
        self.theme.scheme.as_deref().unwrap_or("dark")
    }

    pub fn log_level(&self) -> &str {
        self.log.level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Log file: configured, else `<data_local_dir>/bkt/bkt.log`.
    pub fn log_file(&self) -> Option<PathBuf> {
        self.log
            .file
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join("bkt").join("bkt.log")))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
