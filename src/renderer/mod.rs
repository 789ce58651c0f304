//! Renderers - draw one kind of data into a block's content rectangle.
//!
//! A renderer only knows how to draw; [`BlockBinding`] decides when. Every
//! renderer erases or overwrites its own previous output, so a frame never
//! depends on what the surface held before.
//!
//! # Example
//!
//! ```ignore
//! use flowdash::renderer::{BindOptions, BlockBinding, HeaderData, HeaderRenderer};
//!
//! let header = BlockBinding::bind(
//!     block,
//!     HeaderRenderer,
//!     surface.clone(),
//!     Some(Rc::new(move || HeaderData::new("Flow"))),
//!     BindOptions { reactive: true },
//! );
//! header.render();
//! ```

mod binding;
mod header;
mod input;
mod issues;
mod loader;
mod navigation;
mod selectable;
mod status_bar;

pub use binding::{BindOptions, BlockBinding, DataSource};
pub use header::{HeaderData, HeaderRenderer};
pub use input::{InputData, InputRenderer};
pub use issues::{IssueListData, IssueListRenderer};
pub use loader::{LoaderData, LoaderRenderer, DEFAULT_SPINNER};
pub use navigation::{NavigationBarData, NavigationBarRenderer, NavigationItem};
pub use selectable::{SelectableItem, SelectableListData, SelectableListRenderer, MARKER_KEYS};
pub use status_bar::{Notice, StatusBarData, StatusBarRenderer};

use crate::layout::{erase_block_area, BlockDimensions};
use crate::terminal::{display_width, truncate_to_width, Surface};
use crate::types::Style;

/// Draws a data payload into a block.
pub trait Renderer {
    type Data;

    /// Draw `data` inside `dims`' content rectangle.
    fn render(&self, surface: &mut dyn Surface, data: &Self::Data, dims: &BlockDimensions);

    /// Blank whatever this renderer drew.
    fn clear(&self, surface: &mut dyn Surface, dims: &BlockDimensions) {
        erase_block_area(surface, dims);
    }
}

/// Blank one content row and put the cursor at its start.
pub(crate) fn clear_row(surface: &mut dyn Surface, dims: &BlockDimensions, row: u16) {
    let y = dims.content_y.saturating_add(row);
    surface.erase_area(dims.content_x, y, dims.content_width, 1);
    surface.move_to(dims.content_x, y);
}

/// Write as much of `text` as fits in `room` cells at the cursor; returns the
/// cells used.
pub(crate) fn write_clipped(
    surface: &mut dyn Surface,
    text: &str,
    style: Style,
    room: &mut usize,
) -> usize {
    let visible = truncate_to_width(text, *room);
    if visible.is_empty() {
        return 0;
    }
    if style.is_plain() {
        surface.write(visible);
    } else {
        surface.write_styled(visible, style);
    }
    let used = display_width(visible);
    *room -= used;
    used
}
