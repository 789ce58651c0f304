//! Header renderer - title, subtitle and a right-aligned context string.

use super::{clear_row, write_clipped, Renderer};
use crate::layout::BlockDimensions;
use crate::terminal::{display_width, Surface};
use crate::types::{Color, Style};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderData {
    pub title: String,
    pub subtitle: Option<String>,
    /// Drawn at the right edge when it does not collide with the title.
    pub context: Option<String>,
}

impl HeaderData {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderRenderer;

const TITLE: Style = Style::new().fg(Color::Cyan).bold();

impl Renderer for HeaderRenderer {
    type Data = HeaderData;

    fn render(&self, surface: &mut dyn Surface, data: &HeaderData, dims: &BlockDimensions) {
        if dims.is_empty() {
            return;
        }
        clear_row(surface, dims, 0);

        let mut room = dims.content_width as usize;
        let mut used = write_clipped(surface, &data.title, TITLE, &mut room);
        if let Some(subtitle) = data.subtitle.as_deref().filter(|s| !s.is_empty()) {
            used += write_clipped(surface, " ", Style::new(), &mut room);
            used += write_clipped(surface, subtitle, Style::new().dim(), &mut room);
        }

        if let Some(context) = data.context.as_deref() {
            let width = display_width(context);
            let available = dims.content_width as usize;
            // At least one blank cell between the subtitle and the context
            if width > 0 && width + used + 1 < available {
                let x = dims.content_x.saturating_add((available - width) as u16);
                surface.move_to(x, dims.content_y);
                surface.write_styled(context, Style::new().dim());
            }
        }
    }
}
