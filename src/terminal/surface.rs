//! The drawing surface boundary.
//!
//! Everything that reaches the terminal goes through [`Surface`]. Drawing
//! calls are buffered and infallible; I/O errors are reported by
//! [`Surface::flush`].

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::types::Style;

/// A cursor-addressed text surface.
///
/// Coordinates are zero-based cells.
pub trait Surface {
    fn move_to(&mut self, x: u16, y: u16);

    /// Write text at the cursor and advance it. Text past the right edge is dropped.
    fn write(&mut self, text: &str);

    /// Erase the row the cursor is on.
    fn erase_line(&mut self);

    fn erase_area(&mut self, x: u16, y: u16, width: u16, height: u16);

    fn clear(&mut self);

    fn set_style(&mut self, style: Style);

    fn style_reset(&mut self);

    /// Current size as (columns, rows).
    fn size(&self) -> (u16, u16);

    /// The terminal reported a new size.
    fn resize(&mut self, _width: u16, _height: u16) {}

    fn set_cursor_visible(&mut self, visible: bool);

    /// Enter or leave the alternate screen.
    fn set_fullscreen(&mut self, enabled: bool);

    /// Take or return raw keyboard input.
    fn set_input_grab(&mut self, enabled: bool);

    fn flush(&mut self) -> io::Result<()>;

    /// Move and write in one call.
    fn write_at(&mut self, x: u16, y: u16, text: &str) {
        self.move_to(x, y);
        self.write(text);
    }

    /// Write `text` in `style` at the cursor, then reset the style.
    fn write_styled(&mut self, text: &str, style: Style) {
        self.set_style(style);
        self.write(text);
        self.style_reset();
    }
}

/// Surface shared between the terminal wrapper, block bindings and the app.
pub type SharedSurface = Rc<RefCell<dyn Surface>>;

// =============================================================================
// Text measurement
// =============================================================================

/// Display width of `text` in terminal cells.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Longest prefix of `text` that fits in `max` cells.
///
/// Never splits a wide character.
pub fn truncate_to_width(text: &str, max: usize) -> &str {
    let mut used = 0;
    for (index, ch) in text.char_indices() {
        let w = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + w > max {
            return &text[..index];
        }
        used += w;
    }
    text
}
