//! Crossterm backed surface writing to stdout.

use std::io;

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::{
    Attribute, Color as CtColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
    LeaveAlternateScreen,
};

use super::output::OutputBuffer;
use super::surface::{truncate_to_width, Surface};
use crate::types::{Attr, Color, Style};

const FALLBACK_SIZE: (u16, u16) = (80, 24);

fn to_crossterm(color: Color) -> CtColor {
    match color {
        Color::Default => CtColor::Reset,
        Color::Black => CtColor::Black,
        Color::Red => CtColor::DarkRed,
        Color::Green => CtColor::DarkGreen,
        Color::Yellow => CtColor::DarkYellow,
        Color::Blue => CtColor::DarkBlue,
        Color::Magenta => CtColor::DarkMagenta,
        Color::Cyan => CtColor::DarkCyan,
        Color::White => CtColor::White,
        Color::Gray => CtColor::Grey,
        Color::Rgb(r, g, b) => CtColor::Rgb { r, g, b },
    }
}

/// Surface drawing to the real terminal.
///
/// All commands are queued into an [`OutputBuffer`]; nothing reaches stdout
/// until [`Surface::flush`]. The first error raised while queueing is held and
/// returned from the next flush.
///
/// The size is queried once and then kept current by resize events and by
/// entering full-screen.
pub struct CrosstermSurface {
    buffer: OutputBuffer,
    cursor_x: u16,
    size: (u16, u16),
    pending_error: Option<io::Error>,
}

fn query_size() -> (u16, u16) {
    crossterm::terminal::size().unwrap_or(FALLBACK_SIZE)
}

impl CrosstermSurface {
    pub fn new() -> Self {
        Self {
            buffer: OutputBuffer::new(),
            cursor_x: 0,
            size: query_size(),
            pending_error: None,
        }
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            if self.pending_error.is_none() {
                self.pending_error = Some(err);
            }
        }
    }
}

impl Default for CrosstermSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl Surface for CrosstermSurface {
    fn move_to(&mut self, x: u16, y: u16) {
        self.cursor_x = x;
        let result = queue!(self.buffer, MoveTo(x, y));
        self.record(result);
    }

    fn write(&mut self, text: &str) {
        let room = self.size.0.saturating_sub(self.cursor_x) as usize;
        let visible = truncate_to_width(text, room);
        self.cursor_x = self
            .cursor_x
            .saturating_add(super::surface::display_width(visible) as u16);
        let result = queue!(self.buffer, Print(visible));
        self.record(result);
    }

    fn erase_line(&mut self) {
        let result = queue!(self.buffer, Clear(ClearType::CurrentLine));
        self.record(result);
    }

    fn erase_area(&mut self, x: u16, y: u16, width: u16, height: u16) {
        if width == 0 {
            return;
        }
        let blank = " ".repeat(width as usize);
        for row in y..y.saturating_add(height) {
            let result = queue!(self.buffer, MoveTo(x, row), Print(&blank));
            self.record(result);
        }
    }

    fn clear(&mut self) {
        let result = queue!(self.buffer, Clear(ClearType::All), MoveTo(0, 0));
        self.cursor_x = 0;
        self.record(result);
    }

    fn set_style(&mut self, style: Style) {
        let mut result = queue!(
            self.buffer,
            SetForegroundColor(to_crossterm(style.fg)),
            SetBackgroundColor(to_crossterm(style.bg))
        );
        for (flag, attribute) in [
            (Attr::BOLD, Attribute::Bold),
            (Attr::DIM, Attribute::Dim),
            (Attr::ITALIC, Attribute::Italic),
            (Attr::UNDERLINE, Attribute::Underlined),
            (Attr::INVERSE, Attribute::Reverse),
        ] {
            if style.attrs.contains(flag) {
                result = result.and_then(|_| queue!(self.buffer, SetAttribute(attribute)));
            }
        }
        self.record(result);
    }

    fn style_reset(&mut self) {
        let result = queue!(self.buffer, SetAttribute(Attribute::Reset), ResetColor);
        self.record(result);
    }

    fn size(&self) -> (u16, u16) {
        self.size
    }

    fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
    }

    fn set_cursor_visible(&mut self, visible: bool) {
        let result = if visible {
            queue!(self.buffer, Show)
        } else {
            queue!(self.buffer, Hide)
        };
        self.record(result);
    }

    fn set_fullscreen(&mut self, enabled: bool) {
        let result = if enabled {
            self.size = query_size();
            queue!(self.buffer, EnterAlternateScreen)
        } else {
            queue!(self.buffer, LeaveAlternateScreen)
        };
        self.record(result);
    }

    fn set_input_grab(&mut self, enabled: bool) {
        let result = if enabled {
            enable_raw_mode()
        } else {
            disable_raw_mode()
        };
        self.record(result);
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(err) = self.pending_error.take() {
            self.buffer.discard();
            return Err(err);
        }
        self.buffer.flush_stdout()
    }
}
