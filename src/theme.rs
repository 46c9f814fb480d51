//! Palettes for the browser chrome and their resolution from config.

use ratatui::style::Color;

use crate::config::{ThemeColorsConfig, ThemeConfig};

/// Runtime colors, built by [`resolve_theme`].
#[derive(Debug, Clone)]
pub struct ThemeColors {
    // File list
    pub list_fg: Color,
    pub list_selected_bg: Color,
    pub list_selected_fg: Color,
    pub list_dir_fg: Color,
    pub list_file_fg: Color,
    pub list_checked_fg: Color,
    pub header_fg: Color,

    // Breadcrumb bar
    pub crumb_fg: Color,

    // Preview modal
    pub preview_fg: Color,

    // Status bar
    pub status_bg: Color,
    pub status_fg: Color,

    // Borders
    pub border_fg: Color,
    pub border_focused_fg: Color,

    // Dialogs
    pub dialog_bg: Color,
    pub dialog_border_fg: Color,

    // Semantic colors, not configurable
    pub error_fg: Color,
    pub warning_fg: Color,
    pub success_fg: Color,
    pub info_fg: Color,
    pub accent_fg: Color,
    pub dim_fg: Color,

    // Editor
    pub editor_line_nr: Color,
    pub editor_line_nr_current: Color,
    pub editor_gutter_sep: Color,
    pub editor_cursor_fg: Color,
    pub editor_cursor_bg: Color,
    pub editor_current_line_bg: Color,
}

/// Catppuccin Mocha.
pub fn dark_theme() -> ThemeColors {
    let text = Color::Rgb(205, 214, 244); // #cdd6f4
    let blue = Color::Rgb(137, 180, 250); // #89b4fa
    let overlay0 = Color::Rgb(108, 112, 134); // #6c7086
    let surface0 = Color::Rgb(49, 50, 68); // #313244
    let surface1 = Color::Rgb(69, 71, 90); // #45475a
    let base = Color::Rgb(30, 30, 46); // #1e1e2e
    let yellow = Color::Rgb(249, 226, 175); // #f9e2af
    let green = Color::Rgb(166, 227, 161); // #a6e3a1
    let mauve = Color::Rgb(203, 166, 247); // #cba6f7

    ThemeColors {
        list_fg: text,
        list_selected_bg: surface1,
        list_selected_fg: text,
        list_dir_fg: blue,
        list_file_fg: text,
        list_checked_fg: green,
        header_fg: overlay0,
        crumb_fg: mauve,
        preview_fg: text,
        status_bg: base,
        status_fg: text,
        border_fg: Color::Rgb(88, 91, 112), // #585b70
        border_focused_fg: blue,
        dialog_bg: surface0,
        dialog_border_fg: blue,
        error_fg: Color::Rgb(243, 139, 168), // #f38ba8
        warning_fg: yellow,
        success_fg: green,
        info_fg: blue,
        accent_fg: mauve,
        dim_fg: overlay0,
        editor_line_nr: overlay0,
        editor_line_nr_current: yellow,
        editor_gutter_sep: surface1,
        editor_cursor_fg: base,
        editor_cursor_bg: text,
        editor_current_line_bg: surface0,
    }
}

/// Catppuccin Latte.
pub fn light_theme() -> ThemeColors {
    let text = Color::Rgb(76, 79, 105); // #4c4f69
    let blue = Color::Rgb(30, 102, 245); // #1e66f5
    let overlay0 = Color::Rgb(156, 160, 176); // #9ca0b0
    let surface0 = Color::Rgb(230, 233, 239); // #e6e9ef
    let surface1 = Color::Rgb(204, 208, 218); // #ccd0da
    let base = Color::Rgb(239, 241, 245); // #eff1f5
    let yellow = Color::Rgb(223, 142, 29); // #df8e1d
    let green = Color::Rgb(64, 160, 43); // #40a02b
    let mauve = Color::Rgb(136, 57, 239); // #8839ef

    ThemeColors {
        list_fg: text,
        list_selected_bg: surface1,
        list_selected_fg: text,
        list_dir_fg: blue,
        list_file_fg: text,
        list_checked_fg: green,
        header_fg: overlay0,
        crumb_fg: mauve,
        preview_fg: text,
        status_bg: base,
        status_fg: text,
        border_fg: Color::Rgb(172, 176, 190), // #acb0be
        border_focused_fg: blue,
        dialog_bg: surface0,
        dialog_border_fg: blue,
        error_fg: Color::Rgb(210, 15, 57), // #d20f39
        warning_fg: yellow,
        success_fg: green,
        info_fg: blue,
        accent_fg: mauve,
        dim_fg: overlay0,
        editor_line_nr: overlay0,
        editor_line_nr_current: yellow,
        editor_gutter_sep: surface1,
        editor_cursor_fg: base,
        editor_cursor_bg: text,
        editor_current_line_bg: surface0,
    }
}

/// Parse `"#aabbcc"` (hash optional). `None` for malformed input.
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

/// Resolve the final palette.
///
/// - `"dark"` (default) and unknown names: Mocha
/// - `"light"`: Latte
/// - `"custom"`: Mocha with the configured hex overrides
pub fn resolve_theme(config: &ThemeConfig) -> ThemeColors {
    match config.scheme.as_deref().unwrap_or("dark") {
        "light" => light_theme(),
        "custom" => {
            let mut theme = dark_theme();
            if let Some(custom) = &config.custom {
                apply_custom_colors(&mut theme, custom);
            }
            theme
        }
        _ => dark_theme(),
    }
}

fn apply_custom_colors(theme: &mut ThemeColors, custom: &ThemeColorsConfig) {
    macro_rules! overlay {
        ($($field:ident),* $(,)?) => {
            $(
                if let Some(color) = custom.$field.as_deref().and_then(parse_hex_color) {
                    theme.$field = color;
                }
            )*
        };
    }
    overlay!(
        list_fg,
        list_selected_bg,
        list_selected_fg,
        list_dir_fg,
        list_file_fg,
        list_checked_fg,
        header_fg,
        crumb_fg,
        status_bg,
        status_fg,
        border_fg,
        dialog_bg,
        dialog_border_fg,
    );
}
