//! Headless in-memory surface.
//!
//! Keeps a character grid and per-cell styles so tests (and `--headless`
//! runs) can inspect exactly what a frame drew.

use std::io;

use unicode_width::UnicodeWidthChar;

use super::surface::Surface;
use crate::types::Style;

/// A grid-backed [`Surface`].
#[derive(Debug, Clone)]
pub struct MemorySurface {
    width: u16,
    height: u16,
    cells: Vec<char>,
    styles: Vec<Style>,
    cursor: (u16, u16),
    style: Style,
    cursor_visible: bool,
    fullscreen: bool,
    input_grabbed: bool,
    clear_count: usize,
    flush_count: usize,
}

impl MemorySurface {
    pub fn new(width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![' '; len],
            styles: vec![Style::default(); len],
            cursor: (0, 0),
            style: Style::default(),
            cursor_visible: true,
            fullscreen: false,
            input_grabbed: false,
            clear_count: 0,
            flush_count: 0,
        }
    }

    /// Resize the grid, discarding its contents.
    pub fn set_size(&mut self, width: u16, height: u16) {
        *self = Self {
            cursor_visible: self.cursor_visible,
            fullscreen: self.fullscreen,
            input_grabbed: self.input_grabbed,
            clear_count: self.clear_count,
            flush_count: self.flush_count,
            ..Self::new(width, height)
        };
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    fn put(&mut self, x: u16, y: u16, ch: char) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = ch;
            self.styles[i] = self.style;
        }
    }

    /// Row `y` with trailing blanks trimmed.
    pub fn line(&self, y: u16) -> String {
        if y >= self.height {
            return String::new();
        }
        let start = y as usize * self.width as usize;
        let row: String = self.cells[start..start + self.width as usize]
            .iter()
            .filter(|c| **c != '\0')
            .collect();
        row.trim_end().to_string()
    }

    /// The whole grid, one trimmed line per row.
    pub fn text(&self) -> String {
        (0..self.height)
            .map(|y| self.line(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn char_at(&self, x: u16, y: u16) -> Option<char> {
        self.index(x, y).map(|i| self.cells[i])
    }

    pub fn style_at(&self, x: u16, y: u16) -> Option<Style> {
        self.index(x, y).map(|i| self.styles[i])
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn is_cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_input_grabbed(&self) -> bool {
        self.input_grabbed
    }

    pub fn clear_count(&self) -> usize {
        self.clear_count
    }

    pub fn flush_count(&self) -> usize {
        self.flush_count
    }
}

impl Surface for MemorySurface {
    fn move_to(&mut self, x: u16, y: u16) {
        self.cursor = (x, y);
    }

    fn write(&mut self, text: &str) {
        let (mut x, y) = self.cursor;
        for ch in text.chars() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0) as u16;
            if w == 0 {
                continue;
            }
            if x.saturating_add(w) > self.width {
                break;
            }
            self.put(x, y, ch);
            // Second half of a wide character
            if w == 2 {
                self.put(x + 1, y, '\0');
            }
            x += w;
        }
        self.cursor = (x, y);
    }

    fn erase_line(&mut self) {
        let y = self.cursor.1;
        let saved = std::mem::take(&mut self.style);
        for x in 0..self.width {
            self.put(x, y, ' ');
        }
        self.style = saved;
    }

    fn erase_area(&mut self, x: u16, y: u16, width: u16, height: u16) {
        let saved = std::mem::take(&mut self.style);
        for row in y..y.saturating_add(height) {
            for col in x..x.saturating_add(width) {
                self.put(col, row, ' ');
            }
        }
        self.style = saved;
    }

    fn clear(&mut self) {
        self.cells.fill(' ');
        self.styles.fill(Style::default());
        self.cursor = (0, 0);
        self.clear_count += 1;
    }

    fn set_style(&mut self, style: Style) {
        self.style = style;
    }

    fn style_reset(&mut self) {
        self.style = Style::default();
    }

    fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.set_size(width, height);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor_visible = visible;
    }

    fn set_fullscreen(&mut self, enabled: bool) {
        self.fullscreen = enabled;
    }

    fn set_input_grab(&mut self, enabled: bool) {
        self.input_grabbed = enabled;
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flush_count += 1;
        Ok(())
    }
}
