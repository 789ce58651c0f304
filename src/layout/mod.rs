//! Layout - absolute block geometry.
//!
//! The screen is partitioned by the caller into [`Block`]s with explicit
//! positions. Each block knows its content rectangle (inside the border) and
//! whether it needs redrawing.
//!
//! # Example
//!
//! ```ignore
//! use flowdash::layout::{BlockConfig, LayoutManager};
//!
//! let layout = LayoutManager::new();
//! let header = layout.add_block(BlockConfig::new("header", 0, 1, 80, 3).bordered())?;
//! assert_eq!(header.dimensions().content_width, 78);
//! ```

mod block;
mod border;
mod manager;

pub use block::{Block, BlockConfig, BlockDimensions, LayoutBlock};
pub use border::{draw_border, erase_block_area};
pub use manager::LayoutManager;
