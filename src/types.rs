//! Core types for flowdash.
//!
//! Styling vocabulary shared by the drawing surface and the renderers, plus
//! the cleanup callback type returned by every listener registration.

// =============================================================================
// Cleanup Function
// =============================================================================

/// Cleanup function returned by listener registrations.
///
/// Call it to remove the listener. Dropping it without calling leaves the
/// listener registered.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// Color
// =============================================================================

/// Terminal color.
///
/// Named colors map onto the 16-color ANSI palette so the dashboard follows
/// the user's terminal theme. `Rgb` is available for truecolor terminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    /// Let the terminal decide.
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    Rgb(u8, u8, u8),
}

// =============================================================================
// Text Attributes (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Text attributes as a bitfield.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::UNDERLINE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE = 0;
        const BOLD = 1 << 0;
        const DIM = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
        const INVERSE = 1 << 4;
    }
}

// =============================================================================
// Style
// =============================================================================

/// Surface-local text style. Applied with `Surface::set_style`, cleared with
/// `Surface::style_reset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Style {
    pub const fn new() -> Self {
        Self {
            fg: Color::Default,
            bg: Color::Default,
            attrs: Attr::NONE,
        }
    }

    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = color;
        self
    }

    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = color;
        self
    }

    pub const fn bold(mut self) -> Self {
        self.attrs = self.attrs.union(Attr::BOLD);
        self
    }

    pub const fn dim(mut self) -> Self {
        self.attrs = self.attrs.union(Attr::DIM);
        self
    }

    pub const fn underline(mut self) -> Self {
        self.attrs = self.attrs.union(Attr::UNDERLINE);
        self
    }

    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

// =============================================================================
// Border Styles
// =============================================================================

/// Border drawing style for bordered blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    /// ─ │ ┌ ┐ └ ┘
    #[default]
    Single,
    /// ═ ║ ╔ ╗ ╚ ╝
    Double,
    /// ─ │ ╭ ╮ ╰ ╯
    Rounded,
    /// ━ ┃ ┏ ┓ ┗ ┛
    Bold,
    /// - | + + + +
    Ascii,
}

impl BorderStyle {
    /// Get the border characters for this style.
    ///
    /// Returns: (horizontal, vertical, top_left, top_right, bottom_right, bottom_left)
    pub const fn chars(&self) -> (&'static str, &'static str, &'static str, &'static str, &'static str, &'static str) {
        match self {
            Self::Single => ("─", "│", "┌", "┐", "┘", "└"),
            Self::Double => ("═", "║", "╔", "╗", "╝", "╚"),
            Self::Rounded => ("─", "│", "╭", "╮", "╯", "╰"),
            Self::Bold => ("━", "┃", "┏", "┓", "┛", "┗"),
            Self::Ascii => ("-", "|", "+", "+", "+", "+"),
        }
    }
}
