//! Single-line input renderer: prompt, value or placeholder, and cursor.

use super::{clear_row, write_clipped, Renderer};
use crate::layout::BlockDimensions;
use crate::terminal::{display_width, Surface};
use crate::types::Style;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputData {
    pub prompt: String,
    pub value: String,
    pub placeholder: Option<String>,
    /// Cursor position in characters. `None` keeps the cursor hidden.
    pub cursor: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct InputRenderer;

impl Renderer for InputRenderer {
    type Data = InputData;

    fn render(&self, surface: &mut dyn Surface, data: &InputData, dims: &BlockDimensions) {
        if dims.is_empty() {
            return;
        }
        clear_row(surface, dims, 0);

        let mut room = dims.content_width as usize;
        if !data.prompt.is_empty() {
            write_clipped(surface, &data.prompt, Style::new().bold(), &mut room);
            write_clipped(surface, " ", Style::new(), &mut room);
        }
        let text_x = dims.content_x as usize + (dims.content_width as usize - room);
        let available = room;

        match data.placeholder.as_deref() {
            Some(placeholder) if data.value.is_empty() => {
                write_clipped(surface, placeholder, Style::new().dim(), &mut room);
            }
            _ => {
                write_clipped(surface, &data.value, Style::new(), &mut room);
            }
        }

        match data.cursor {
            Some(cursor) if available > 0 => {
                let before: String = data.value.chars().take(cursor).collect();
                let offset = display_width(&before).min(available - 1);
                let x = u16::try_from(text_x + offset).unwrap_or(u16::MAX);
                surface.move_to(x, dims.content_y);
                surface.set_cursor_visible(true);
            }
            _ => surface.set_cursor_visible(false),
        }
    }

    fn clear(&self, surface: &mut dyn Surface, dims: &BlockDimensions) {
        clear_row(surface, dims, 0);
        surface.set_cursor_visible(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BlockConfig, LayoutBlock};
    use crate::terminal::MemorySurface;
    use crate::types::Attr;

    fn dims(width: u16) -> BlockDimensions {
        LayoutBlock::new(BlockConfig::new("input", 0, 0, width, 1)).dimensions()
    }

    #[test]
    fn test_prompt_value_cursor() {
        let mut surface = MemorySurface::new(20, 1);
        let data = InputData {
            prompt: ":".into(),
            value: "reload".into(),
            placeholder: None,
            cursor: Some(6),
        };
        InputRenderer.render(&mut surface, &data, &dims(20));

        assert_eq!(surface.line(0), ": reload");
        assert_eq!(surface.cursor(), (8, 0));
        assert!(surface.is_cursor_visible());
    }

    #[test]
    fn test_placeholder_when_empty() {
        let mut surface = MemorySurface::new(20, 1);
        let data = InputData {
            prompt: ":".into(),
            value: String::new(),
            placeholder: Some("command".into()),
            cursor: None,
        };
        InputRenderer.render(&mut surface, &data, &dims(20));

        assert_eq!(surface.line(0), ": command");
        assert!(surface.style_at(2, 0).unwrap().attrs.contains(Attr::DIM));
        assert!(!surface.is_cursor_visible());
    }

    #[test]
    fn test_cursor_clamped_to_width() {
        let mut surface = MemorySurface::new(6, 1);
        let data = InputData {
            prompt: ">".into(),
            value: "abcdefgh".into(),
            placeholder: None,
            cursor: Some(8),
        };
        InputRenderer.render(&mut surface, &data, &dims(6));
        assert_eq!(surface.line(0), "> abcd");
        assert_eq!(surface.cursor(), (5, 0));
    }

    #[test]
    fn test_clear_hides_cursor() {
        let mut surface = MemorySurface::new(10, 1);
        let data = InputData {
            prompt: ":".into(),
            value: "x".into(),
            placeholder: None,
            cursor: Some(1),
        };
        InputRenderer.render(&mut surface, &data, &dims(10));
        InputRenderer.clear(&mut surface, &dims(10));
        assert_eq!(surface.line(0), "");
        assert!(!surface.is_cursor_visible());
    }
}
