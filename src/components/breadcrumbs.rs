use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    widgets::Widget,
};

use crate::dispatch::{Action, Command, HitMap};
use crate::theme::ThemeColors;
use crate::vfs::Crumb;

const SEPARATOR: &str = " / ";

/// Clickable trail from the root to the current folder.
pub struct BreadcrumbWidget<'a> {
    crumbs: &'a [Crumb],
    theme: &'a ThemeColors,
    hits: Option<&'a mut HitMap>,
}

impl<'a> BreadcrumbWidget<'a> {
    pub fn new(crumbs: &'a [Crumb], theme: &'a ThemeColors) -> Self {
        Self {
            crumbs,
            theme,
            hits: None,
        }
    }

    /// Record each crumb as a click target.
    pub fn hits(mut self, hits: &'a mut HitMap) -> Self {
        self.hits = Some(hits);
        self
    }
}

impl Widget for BreadcrumbWidget<'_> {
    fn render(mut self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        let right = area.x + area.width;
        let last = self.crumbs.len().saturating_sub(1);
        let mut x = area.x;

        for (i, crumb) in self.crumbs.iter().enumerate() {
            if i > 0 {
                if x >= right {
                    break;
                }
                let (nx, _) = buf.set_stringn(
                    x,
                    area.y,
                    SEPARATOR,
                    (right - x) as usize,
                    Style::default().fg(self.theme.dim_fg),
                );
                x = nx;
            }
            if x >= right {
                break;
            }
            let style = if i == last {
                Style::default()
                    .fg(self.theme.crumb_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
                    .fg(self.theme.crumb_fg)
                    .add_modifier(Modifier::UNDERLINED)
            };
            let start = x;
            let (nx, _) = buf.set_stringn(x, area.y, &crumb.name, (right - x) as usize, style);
            x = nx;
            if let Some(hits) = self.hits.as_deref_mut() {
                hits.push(
                    Rect::new(start, area.y, x - start, 1),
                    Command::with_key(Action::OpenCrumb, crumb.path.clone()),
                );
            }
        }
    }
}
