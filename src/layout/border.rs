//! Border and title drawing for bordered blocks.

use super::block::BlockDimensions;
use crate::terminal::{truncate_to_width, Surface};
use crate::types::{BorderStyle, Style};

/// Draw a box around the outer rectangle, with an optional bold title
/// starting two cells into the top edge.
///
/// Rectangles narrower or shorter than two cells are skipped. Edges that
/// would fall past `u16::MAX` are pinned there and clipped by the surface.
pub fn draw_border(
    surface: &mut dyn Surface,
    dims: &BlockDimensions,
    title: Option<&str>,
    style: BorderStyle,
) {
    let BlockDimensions { x, y, width: w, height: h, .. } = *dims;
    if w < 2 || h < 2 {
        return;
    }
    let (horizontal, vertical, tl, tr, br, bl) = style.chars();
    let inner = horizontal.repeat(w as usize - 2);

    surface.write_at(x, y, &format!("{tl}{inner}{tr}"));
    for row in 1..h - 1 {
        let row_y = y.saturating_add(row);
        surface.write_at(x, row_y, vertical);
        surface.write_at(x.saturating_add(w - 1), row_y, vertical);
    }
    surface.write_at(x, y.saturating_add(h - 1), &format!("{bl}{inner}{br}"));

    if let Some(title) = title.filter(|t| !t.is_empty()) {
        let label = format!(" {title} ");
        let max = (w as usize).saturating_sub(4);
        let visible = truncate_to_width(&label, max);
        if !visible.is_empty() {
            surface.move_to(x.saturating_add(2), y);
            surface.write_styled(visible, Style::new().bold());
        }
    }
}

/// Blank the content rectangle.
pub fn erase_block_area(surface: &mut dyn Surface, dims: &BlockDimensions) {
    surface.erase_area(
        dims.content_x,
        dims.content_y,
        dims.content_width,
        dims.content_height,
    );
}
