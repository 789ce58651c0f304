//! Selectable list renderer with jump markers.
//!
//! In Select mode every row gets a one-letter marker; pressing the letter
//! picks the row. Markers follow the home row first.

use super::{clear_row, write_clipped, Renderer};
use crate::layout::BlockDimensions;
use crate::terminal::Surface;
use crate::types::{Color, Style};

/// Marker letters in assignment order.
pub const MARKER_KEYS: &str = "asdfghjklqwertyuiopzxcvbnm";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectableItem {
    pub label: String,
    /// Overrides the positional marker.
    pub marker: Option<char>,
}

impl SelectableItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            marker: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectableListData {
    pub items: Vec<SelectableItem>,
    pub selected: Option<usize>,
    pub show_markers: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SelectableListRenderer;

impl SelectableListRenderer {
    /// Marker for row `index`, wrapping after the last letter.
    pub fn marker_key(index: usize) -> char {
        let keys = MARKER_KEYS.as_bytes();
        keys[index % keys.len()] as char
    }

    /// Row for a marker key, case-insensitive. Only the first 26 rows are
    /// reachable.
    pub fn index_for_marker(key: &str) -> Option<usize> {
        let mut chars = key.chars();
        let ch = chars.next()?.to_ascii_lowercase();
        if chars.next().is_some() {
            return None;
        }
        MARKER_KEYS.find(ch)
    }
}

impl Renderer for SelectableListRenderer {
    type Data = SelectableListData;

    fn render(&self, surface: &mut dyn Surface, data: &SelectableListData, dims: &BlockDimensions) {
        let rows = dims.content_height as usize;
        let visible = data.items.len().min(rows);

        for (index, item) in data.items.iter().take(visible).enumerate() {
            clear_row(surface, dims, index as u16);
            let mut room = dims.content_width as usize;
            let selected = data.selected == Some(index);

            if data.show_markers {
                let marker = item.marker.unwrap_or_else(|| Self::marker_key(index));
                let style = Style::new().fg(Color::Yellow).bold();
                write_clipped(surface, &format!("[{marker}]"), style, &mut room);
                write_clipped(surface, " ", Style::new(), &mut room);
            }

            if selected {
                write_clipped(surface, "▶ ", Style::new().fg(Color::Green).bold(), &mut room);
            } else {
                write_clipped(surface, "  ", Style::new(), &mut room);
            }

            let label_style = if selected { Style::new().bold() } else { Style::new() };
            write_clipped(surface, &item.label, label_style, &mut room);
        }

        // Rows a longer previous list left behind
        for row in visible..rows {
            clear_row(surface, dims, row as u16);
        }
    }
}
