//! Layout blocks - rectangular screen regions with an optional border.

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::BorderStyle;

/// Everything needed to create a block.
///
/// Padding is not configurable: it follows from `has_border`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockConfig {
    pub id: String,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub has_border: bool,
    pub title: Option<String>,
    pub z_index: i32,
    pub border_style: BorderStyle,
}

impl BlockConfig {
    pub fn new(id: impl Into<String>, x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }

    pub fn bordered(mut self) -> Self {
        self.has_border = true;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn border_style(mut self, style: BorderStyle) -> Self {
        self.border_style = style;
        self
    }
}

/// Outer rectangle plus the content rectangle inside the border.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockDimensions {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
    pub content_x: u16,
    pub content_y: u16,
    pub content_width: u16,
    pub content_height: u16,
}

impl BlockDimensions {
    /// True if there is no room to draw content.
    pub fn is_empty(&self) -> bool {
        self.content_width == 0 || self.content_height == 0
    }
}

/// A rectangular region of the terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutBlock {
    id: String,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
    has_border: bool,
    title: Option<String>,
    z_index: i32,
    border_style: BorderStyle,
    dirty: bool,
}

impl LayoutBlock {
    /// New blocks start dirty so they are drawn on the first render.
    pub fn new(config: BlockConfig) -> Self {
        Self {
            id: config.id,
            x: config.x,
            y: config.y,
            width: config.width,
            height: config.height,
            has_border: config.has_border,
            title: config.title,
            z_index: config.z_index,
            border_style: config.border_style,
            dirty: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn has_border(&self) -> bool {
        self.has_border
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: Option<String>) {
        if self.title != title {
            self.title = title;
            self.dirty = true;
        }
    }

    pub fn z_index(&self) -> i32 {
        self.z_index
    }

    pub fn border_style(&self) -> BorderStyle {
        self.border_style
    }

    /// Horizontal inset on each side (the border cell).
    pub fn padding_x(&self) -> u16 {
        u16::from(self.has_border)
    }

    /// Vertical inset on each side (the border cell).
    pub fn padding_y(&self) -> u16 {
        u16::from(self.has_border)
    }

    pub fn dimensions(&self) -> BlockDimensions {
        let inset_x = self.padding_x();
        let inset_y = self.padding_y();
        BlockDimensions {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
            content_x: self.x.saturating_add(inset_x),
            content_y: self.y.saturating_add(inset_y),
            content_width: self.width.saturating_sub(inset_x * 2),
            content_height: self.height.saturating_sub(inset_y * 2),
        }
    }

    /// Move or resize. Only an actual change marks the block dirty.
    pub fn set_dimensions(&mut self, x: u16, y: u16, width: u16, height: u16) {
        if (self.x, self.y, self.width, self.height) != (x, y, width, height) {
            self.x = x;
            self.y = y;
            self.width = width;
            self.height = height;
            self.dirty = true;
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

/// Shared handle to a block owned by a [`LayoutManager`](super::LayoutManager).
#[derive(Debug, Clone)]
pub struct Block {
    inner: Rc<RefCell<LayoutBlock>>,
}

impl Block {
    pub fn new(config: BlockConfig) -> Self {
        Self {
            inner: Rc::new(RefCell::new(LayoutBlock::new(config))),
        }
    }

    pub fn id(&self) -> String {
        self.inner.borrow().id.clone()
    }

    pub fn dimensions(&self) -> BlockDimensions {
        self.inner.borrow().dimensions()
    }

    pub fn set_dimensions(&self, x: u16, y: u16, width: u16, height: u16) {
        self.inner.borrow_mut().set_dimensions(x, y, width, height);
    }

    pub fn has_border(&self) -> bool {
        self.inner.borrow().has_border
    }

    pub fn title(&self) -> Option<String> {
        self.inner.borrow().title.clone()
    }

    pub fn set_title(&self, title: Option<String>) {
        self.inner.borrow_mut().set_title(title);
    }

    pub fn z_index(&self) -> i32 {
        self.inner.borrow().z_index
    }

    pub fn border_style(&self) -> BorderStyle {
        self.inner.borrow().border_style
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.borrow().dirty
    }

    pub fn mark_dirty(&self) {
        self.inner.borrow_mut().mark_dirty();
    }

    pub fn mark_clean(&self) {
        self.inner.borrow_mut().mark_clean();
    }

    /// Read the whole block at once.
    pub fn with<R>(&self, f: impl FnOnce(&LayoutBlock) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// True if both handles point at the same block.
    pub fn ptr_eq(&self, other: &Block) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_defaults() {
        let block = LayoutBlock::new(BlockConfig::new("a", 0, 0, 10, 5));
        assert!(!block.has_border());
        assert_eq!(block.z_index(), 0);
        assert_eq!((block.padding_x(), block.padding_y()), (0, 0));
        assert!(block.is_dirty());
        assert_eq!(block.border_style(), BorderStyle::Single);
    }

    #[test]
    fn test_bordered_content_region() {
        let block = LayoutBlock::new(BlockConfig::new("a", 2, 3, 10, 5).bordered());
        let dims = block.dimensions();
        assert_eq!((dims.content_x, dims.content_y), (3, 4));
        assert_eq!((dims.content_width, dims.content_height), (8, 3));
        assert_eq!((block.padding_x(), block.padding_y()), (1, 1));
    }

    #[test]
    fn test_content_clamp() {
        let small = LayoutBlock::new(BlockConfig::new("a", 0, 0, 3, 3).bordered());
        let dims = small.dimensions();
        assert_eq!((dims.content_width, dims.content_height), (1, 1));

        let tiny = LayoutBlock::new(BlockConfig::new("b", 0, 0, 1, 1).bordered());
        let dims = tiny.dimensions();
        assert_eq!((dims.content_width, dims.content_height), (0, 0));
        assert!(dims.is_empty());
    }

    #[test]
    fn test_set_dimensions_dirty_only_on_change() {
        let mut block = LayoutBlock::new(BlockConfig::new("a", 0, 0, 10, 5));
        block.mark_clean();

        block.set_dimensions(0, 0, 10, 5);
        assert!(!block.is_dirty());

        block.set_dimensions(0, 0, 11, 5);
        assert!(block.is_dirty());
    }

    #[test]
    fn test_handle_shares_state() {
        let block = Block::new(BlockConfig::new("a", 0, 0, 10, 5).title("Issues"));
        let other = block.clone();
        other.mark_clean();
        assert!(!block.is_dirty());
        assert!(block.ptr_eq(&other));
        assert_eq!(block.title().as_deref(), Some("Issues"));
    }

    proptest! {
        #[test]
        fn prop_content_inside_outer(
            x in 0u16..500,
            y in 0u16..500,
            w in 0u16..500,
            h in 0u16..500,
            border in any::<bool>(),
        ) {
            let mut config = BlockConfig::new("p", x, y, w, h);
            config.has_border = border;
            let dims = LayoutBlock::new(config).dimensions();
            let inset = u16::from(border);

            prop_assert_eq!(dims.content_width, w.saturating_sub(2 * inset));
            prop_assert_eq!(dims.content_height, h.saturating_sub(2 * inset));
            prop_assert!(dims.content_x >= dims.x);
            prop_assert!(dims.content_y >= dims.y);
            prop_assert!(dims.content_x as u32 + dims.content_width as u32 <= x as u32 + w.max(inset) as u32);
        }

        #[test]
        fn prop_set_same_dimensions_keeps_clean(
            x in 0u16..200, y in 0u16..200, w in 0u16..200, h in 0u16..200,
        ) {
            let mut block = LayoutBlock::new(BlockConfig::new("p", x, y, w, h));
            block.mark_clean();
            block.set_dimensions(x, y, w, h);
            prop_assert!(!block.is_dirty());
        }
    }
}
