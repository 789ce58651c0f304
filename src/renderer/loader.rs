//! Spinner line shown while something loads.

use super::{clear_row, write_clipped, Renderer};
use crate::layout::BlockDimensions;
use crate::terminal::Surface;
use crate::types::{Color, Style};

/// Braille spinner frames.
pub const DEFAULT_SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderData {
    pub loading: bool,
    pub message: String,
    /// Advances the spinner; usually a tick counter.
    pub frame: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct LoaderRenderer {
    frames: &'static [&'static str],
}

impl LoaderRenderer {
    pub fn new(frames: &'static [&'static str]) -> Self {
        Self { frames }
    }
}

impl Default for LoaderRenderer {
    fn default() -> Self {
        Self::new(&DEFAULT_SPINNER)
    }
}

impl Renderer for LoaderRenderer {
    type Data = LoaderData;

    fn render(&self, surface: &mut dyn Surface, data: &LoaderData, dims: &BlockDimensions) {
        if dims.is_empty() {
            return;
        }
        clear_row(surface, dims, 0);
        if !data.loading {
            return;
        }

        let mut room = dims.content_width as usize;
        if !self.frames.is_empty() {
            let frame = self.frames[data.frame % self.frames.len()];
            write_clipped(surface, frame, Style::new().fg(Color::Cyan), &mut room);
            write_clipped(surface, " ", Style::new(), &mut room);
        }
        write_clipped(surface, &data.message, Style::new(), &mut room);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BlockConfig, LayoutBlock};
    use crate::terminal::MemorySurface;

    fn dims(width: u16) -> BlockDimensions {
        LayoutBlock::new(BlockConfig::new("loader", 0, 0, width, 1)).dimensions()
    }

    #[test]
    fn test_spinner_frames_advance() {
        let mut surface = MemorySurface::new(20, 1);
        let mut data = LoaderData {
            loading: true,
            message: "Fetching".into(),
            frame: 0,
        };
        LoaderRenderer::default().render(&mut surface, &data, &dims(20));
        assert_eq!(surface.line(0), "⠋ Fetching");

        data.frame = 11;
        LoaderRenderer::default().render(&mut surface, &data, &dims(20));
        assert_eq!(surface.line(0), "⠙ Fetching");
        assert_eq!(surface.style_at(0, 0).unwrap().fg, Color::Cyan);
    }

    #[test]
    fn test_not_loading_clears_row() {
        let mut surface = MemorySurface::new(20, 1);
        let mut data = LoaderData {
            loading: true,
            message: "Fetching".into(),
            frame: 0,
        };
        LoaderRenderer::default().render(&mut surface, &data, &dims(20));
        data.loading = false;
        LoaderRenderer::default().render(&mut surface, &data, &dims(20));
        assert_eq!(surface.line(0), "");
    }

    #[test]
    fn test_custom_frames_and_truncation() {
        static FRAMES: [&str; 2] = ["-", "|"];
        let mut surface = MemorySurface::new(6, 1);
        let data = LoaderData {
            loading: true,
            message: "Fetching".into(),
            frame: 1,
        };
        LoaderRenderer::new(&FRAMES).render(&mut surface, &data, &dims(6));
        assert_eq!(surface.line(0), "| Fetc");
    }
}
