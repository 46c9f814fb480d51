use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::store::keys::extension;

/// Extensions the preview action is offered for.
pub const PREVIEWABLE_EXTENSIONS: &[&str] = &[
    "txt", "csv", "json", "xml", "html", "css", "js", "md", "jpg", "jpeg", "png", "gif", "bmp",
    "svg",
];

/// Extensions that may be edited as text and saved back.
pub const EDITABLE_EXTENSIONS: &[&str] = &[
    "txt", "csv", "json", "xml", "html", "css", "js", "md", "sh", "py", "yaml", "yml", "toml",
    "log", "ini", "conf", "ts", "rs", "sql",
];

pub const DEFAULT_SYNTAX_THEME: &str = "base16-ocean.dark";

pub fn is_previewable(key: &str) -> bool {
    extension(key).is_some_and(|ext| PREVIEWABLE_EXTENSIONS.contains(&ext.as_str()))
}

pub fn is_editable(key: &str) -> bool {
    extension(key).is_some_and(|ext| EDITABLE_EXTENSIONS.contains(&ext.as_str()))
}

/// Syntax name for a key, falling back to the shebang of `first_line`.
pub fn detect_syntax_name(key: &str, first_line: &str) -> &'static str {
    match extension(key).as_deref() {
        Some("py") => "Python",
        Some("rs") => "Rust",
        Some("yaml" | "yml") => "YAML",
        Some("json") => "JSON",
        Some("toml") => "TOML",
        Some("sh" | "bash" | "zsh") => "Bash",
        Some("sql") => "SQL",
        Some("md" | "markdown") => "Markdown",
        Some("html" | "htm") => "HTML",
        Some("xml" | "svg") => "XML",
        Some("css") => "CSS",
        Some("js" | "jsx") => "JavaScript",
        Some("ts" | "tsx") => "TypeScript",
        Some("txt" | "log" | "csv" | "conf" | "ini") => "Plain Text",
        None => detect_from_shebang(first_line),
        _ => "Plain Text",
    }
}

fn detect_from_shebang(first_line: &str) -> &'static str {
    if !first_line.starts_with("#!") {
        return "Plain Text";
    }
    let line = first_line.to_lowercase();
    if line.contains("python") {
        "Python"
    } else if line.contains("bash") || line.contains("/sh") {
        "Bash"
    } else if line.contains("node") || line.contains("deno") {
        "JavaScript"
    } else {
        "Plain Text"
    }
}

/// Load a theme from the built-in theme set by name, with fallback.
pub fn load_theme(theme_name: &str) -> Theme {
    let mut ts = ThemeSet::load_defaults();
    ts.themes
        .remove(theme_name)
        .or_else(|| ts.themes.remove(DEFAULT_SYNTAX_THEME))
        .unwrap_or_default()
}

fn syntect_color_to_ratatui(c: syntect::highlighting::Color) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Syntax set, theme and limits for turning decoded text into styled lines.
pub struct Highlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
    max_bytes: usize,
    tab_width: usize,
}

impl Highlighter {
    pub fn new(theme_name: &str, max_bytes: usize, tab_width: usize) -> Self {
        Self {
            syntax_set: SyntaxSet::load_defaults_nonewlines(),
            theme: load_theme(theme_name),
            max_bytes,
            tab_width: tab_width.max(1),
        }
    }

    pub fn syntax_set(&self) -> &SyntaxSet {
        &self.syntax_set
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Whether text of `len` bytes is small enough to highlight.
    pub fn within_limit(&self, len: usize) -> bool {
        len <= self.max_bytes
    }

    pub fn syntax_for(&self, key: &str, first_line: &str) -> &SyntaxReference {
        let name = detect_syntax_name(key, first_line);
        self.syntax_set
            .find_syntax_by_name(name)
            .or_else(|| {
                extension(key).and_then(|ext| self.syntax_set.find_syntax_by_extension(&ext))
            })
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text())
    }

    /// Numbered, sanitized display lines for `text`. Highlighting is skipped
    /// when the text exceeds the configured byte limit.
    pub fn render(&self, key: &str, text: &str) -> Vec<Line<'static>> {
        let lines: Vec<&str> = text.split('\n').collect();
        let width = lines.len().to_string().len();
        let gutter_style = Style::default().fg(Color::DarkGray);

        let mut highlighter = if self.within_limit(text.len()) {
            let first = lines.first().copied().unwrap_or_default();
            Some(HighlightLines::new(self.syntax_for(key, first), &self.theme))
        } else {
            None
        };

        lines
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let shown = sanitize_for_terminal(raw, self.tab_width);
                let mut spans = vec![Span::styled(
                    format!("{:>width$} │ ", i + 1),
                    gutter_style,
                )];
                let highlighted = highlighter
                    .as_mut()
                    .and_then(|h| h.highlight_line(&shown, &self.syntax_set).ok());
                match highlighted {
                    Some(ranges) => spans.extend(ranges.into_iter().map(|(style, piece)| {
                        Span::styled(
                            piece.to_string(),
                            Style::default().fg(syntect_color_to_ratatui(style.foreground)),
                        )
                    })),
                    None => spans.push(Span::raw(shown.clone())),
                }
                Line::from(spans)
            })
            .collect()
    }
}

/// Make decoded text safe to draw: ANSI escape sequences are dropped, tabs
/// expand to spaces and other control characters become `\u{FFFD}`.
pub fn sanitize_for_terminal(s: &str, tab_width: usize) -> String {
    let mut out = String::with_capacity(s.len());
    let mut col = 0usize;
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\x1b' => {
                if chars.peek() == Some(&'[') {
                    chars.next();
                    for next in chars.by_ref() {
                        if next.is_ascii_alphabetic() || next == '~' {
                            break;
                        }
                    }
                }
            }
            '\t' => {
                let spaces = tab_width - (col % tab_width);
                out.extend(std::iter::repeat(' ').take(spaces));
                col += spaces;
            }
            '\r' => {}
            c if c.is_control() => {
                out.push(char::REPLACEMENT_CHARACTER);
                col += 1;
            }
            c => {
                out.push(c);
                col += 1;
            }
        }
    }
    out
}

/// Escape the HTML-significant characters `& < > " '`.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// Human-readable size, rounded to two decimals. Blank for zero or unknown.
pub fn format_size(size: Option<u64>) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let bytes = match size {
        Some(b) if b > 0 => b,
        _ => return String::new(),
    };
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

/// Pixel dimensions of an image blob, when the format is recognized.
pub fn image_dimensions(bytes: &[u8]) -> Option<(usize, usize)> {
    imagesize::blob_size(bytes)
        .ok()
        .map(|size| (size.width, size.height))
}

/// List indicator for a node: a Nerd Font glyph, or a bracket tag without icons.
pub fn file_icon(name: &str, is_folder: bool, use_icons: bool) -> &'static str {
    if !use_icons {
        return if is_folder { "[D] " } else { "[F] " };
    }
    if is_folder {
        return "\u{f07b} ";
    }
    match extension(name).as_deref() {
        Some("pdf") => "\u{f1c1} ",
        Some("doc" | "docx") => "\u{f1c2} ",
        Some("xls" | "xlsx") => "\u{f1c3} ",
        Some("ppt" | "pptx") => "\u{f1c4} ",
        Some("txt" | "md" | "log") => "\u{f15c} ",
        Some("csv") => "\u{f0ce} ",
        Some("jpg" | "jpeg" | "png" | "gif" | "bmp" | "svg") => "\u{f1c5} ",
        Some("mp3" | "wav") => "\u{f1c7} ",
        Some("mp4") => "\u{f1c8} ",
        Some("zip" | "rar") => "\u{f1c6} ",
        Some("json" | "html" | "css" | "js" | "ts" | "rs" | "py" | "sh" | "xml") => "\u{f1c9} ",
        _ => "\u{f15b} ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn previewable_and_editable_lists_differ_on_images() {
        assert!(is_previewable("images/logo.PNG"));
        assert!(!is_editable("images/logo.png"));
        assert!(is_previewable("a/b/report.csv"));
        assert!(is_editable("a/b/report.csv"));
        assert!(is_editable("scripts/deploy.sh"));
        assert!(!is_previewable("scripts/deploy.sh"));
        assert!(!is_previewable("README"));
        assert!(!is_editable("archive.zip"));
    }

    #[test]
    fn detect_syntax_by_extension() {
        assert_eq!(detect_syntax_name("foo.rs", ""), "Rust");
        assert_eq!(detect_syntax_name("dir/bar.py", ""), "Python");
        assert_eq!(detect_syntax_name("baz.yml", ""), "YAML");
        assert_eq!(detect_syntax_name("page.HTML", ""), "HTML");
        assert_eq!(detect_syntax_name("file.xyz", ""), "Plain Text");
    }

    #[test]
    fn detect_syntax_from_shebang() {
        assert_eq!(detect_syntax_name("run", "#!/usr/bin/env python3"), "Python");
        assert_eq!(detect_syntax_name("run", "#!/bin/sh"), "Bash");
        assert_eq!(detect_syntax_name("run", "just text"), "Plain Text");
    }

    #[test]
    fn load_theme_falls_back_to_default() {
        let fallback = load_theme("no-such-theme");
        let default = load_theme(DEFAULT_SYNTAX_THEME);
        assert_eq!(fallback.name, default.name);
    }

    #[test]
    fn render_numbers_every_line() {
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME, 1024, 4);
        let lines = hl.render("a.json", "{\n  \"a\": 1\n}");
        assert_eq!(lines.len(), 3);
        let first: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert!(first.starts_with("1 │ {"));
    }

    #[test]
    fn render_skips_highlighting_over_limit() {
        let hl = Highlighter::new(DEFAULT_SYNTAX_THEME, 4, 4);
        let lines = hl.render("a.rs", "fn main() {}");
        assert_eq!(lines[0].spans.len(), 2);
        assert_eq!(lines[0].spans[1].content, "fn main() {}");
    }

    #[test]
    fn sanitize_strips_escapes_and_controls() {
        assert_eq!(sanitize_for_terminal("\x1b[31mred\x1b[0m", 4), "red");
        assert_eq!(sanitize_for_terminal("a\x07b", 4), "a\u{FFFD}b");
        assert_eq!(sanitize_for_terminal("a\tb", 4), "a   b");
        assert_eq!(sanitize_for_terminal("line\r", 4), "line");
    }

    #[test]
    fn escape_html_covers_all_significant_chars() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#039;Jerry&#039;&lt;/a&gt;"
        );
    }

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(None), "");
        assert_eq!(format_size(Some(0)), "");
        assert_eq!(format_size(Some(500)), "500 B");
        assert_eq!(format_size(Some(1024)), "1 KB");
        assert_eq!(format_size(Some(1536)), "1.5 KB");
        assert_eq!(format_size(Some(5 * 1024 * 1024)), "5 MB");
    }

    #[test]
    fn image_dimensions_from_png_header() {
        let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        png.extend_from_slice(&[0, 0, 0, 13]);
        png.extend_from_slice(b"IHDR");
        png.extend_from_slice(&640u32.to_be_bytes());
        png.extend_from_slice(&480u32.to_be_bytes());
        png.extend_from_slice(&[8, 6, 0, 0, 0]);
        assert_eq!(image_dimensions(&png), Some((640, 480)));
        assert_eq!(image_dimensions(b"not an image"), None);
    }

    #[test]
    fn icons_without_nerd_font() {
        assert_eq!(file_icon("docs", true, false), "[D] ");
        assert_eq!(file_icon("a.txt", false, false), "[F] ");
        assert_ne!(file_icon("a.pdf", false, true), file_icon("a.txt", false, true));
    }
}
