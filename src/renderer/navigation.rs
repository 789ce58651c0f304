//! Breadcrumb-style navigation bar.

use super::{clear_row, write_clipped, Renderer};
use crate::layout::BlockDimensions;
use crate::terminal::Surface;
use crate::types::{Color, Style};

pub const DEFAULT_SEPARATOR: &str = " > ";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationItem {
    pub label: String,
    pub active: bool,
}

impl NavigationItem {
    pub fn new(label: impl Into<String>, active: bool) -> Self {
        Self {
            label: label.into(),
            active,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationBarData {
    pub items: Vec<NavigationItem>,
    /// Defaults to `" > "`.
    pub separator: Option<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NavigationBarRenderer;

impl Renderer for NavigationBarRenderer {
    type Data = NavigationBarData;

    fn render(&self, surface: &mut dyn Surface, data: &NavigationBarData, dims: &BlockDimensions) {
        if dims.is_empty() {
            return;
        }
        clear_row(surface, dims, 0);

        let separator = data.separator.as_deref().unwrap_or(DEFAULT_SEPARATOR);
        let mut room = dims.content_width as usize;
        for (index, item) in data.items.iter().enumerate() {
            if room == 0 {
                break;
            }
            if index > 0 {
                write_clipped(surface, separator, Style::new().dim(), &mut room);
            }
            let style = if item.active {
                Style::new().fg(Color::Cyan).bold()
            } else {
                Style::new().dim()
            };
            write_clipped(surface, &item.label, style, &mut room);
        }
    }
}
