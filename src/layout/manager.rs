//! Layout manager - the ordered set of blocks on screen.

use std::cell::RefCell;

use super::block::{Block, BlockConfig};
use crate::error::{Error, Result};
use crate::reactive::Signal;

/// Owns every block of one screen, in insertion order.
///
/// Structural changes (add, remove, clear) bump a revision signal, so an
/// effect that calls [`LayoutManager::blocks`] re-runs when the block list
/// changes. Geometry changes inside a block are not reactive; they are
/// tracked with each block's dirty flag.
pub struct LayoutManager {
    blocks: RefCell<Vec<Block>>,
    revision: Signal<u64>,
}

impl LayoutManager {
    pub fn new() -> Self {
        Self {
            blocks: RefCell::new(Vec::new()),
            revision: Signal::new(0),
        }
    }

    fn bump(&self) {
        self.revision.update(|r| *r += 1);
    }

    /// Create a block and append it.
    ///
    /// Fails with [`Error::DuplicateBlock`] if the id is taken.
    pub fn add_block(&self, config: BlockConfig) -> Result<Block> {
        if self.contains(&config.id) {
            return Err(Error::DuplicateBlock(config.id));
        }
        tracing::debug!(id = %config.id, x = config.x, y = config.y, width = config.width, height = config.height, "add block");
        let block = Block::new(config);
        self.blocks.borrow_mut().push(block.clone());
        self.bump();
        Ok(block)
    }

    /// Remove a block. Unknown ids are ignored.
    pub fn remove_block(&self, id: &str) {
        let removed = {
            let mut blocks = self.blocks.borrow_mut();
            let before = blocks.len();
            blocks.retain(|block| block.id() != id);
            blocks.len() != before
        };
        if removed {
            tracing::debug!(id, "remove block");
            self.bump();
        }
    }

    pub fn block(&self, id: &str) -> Option<Block> {
        self.blocks
            .borrow()
            .iter()
            .find(|block| block.id() == id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.blocks.borrow().iter().any(|block| block.id() == id)
    }

    /// Flag every block for redraw.
    pub fn mark_all_dirty(&self) {
        for block in self.blocks.borrow().iter() {
            block.mark_dirty();
        }
    }

    /// Drop every block.
    pub fn clear(&self) {
        let had_blocks = !self.blocks.borrow().is_empty();
        self.blocks.borrow_mut().clear();
        if had_blocks {
            tracing::debug!("clear layout");
            self.bump();
        }
    }

    /// All blocks in insertion order (tracked).
    pub fn blocks(&self) -> Vec<Block> {
        self.revision.get();
        self.blocks.borrow().clone()
    }

    /// All blocks in ascending z-index order; ties keep insertion order.
    pub fn sorted_blocks(&self) -> Vec<Block> {
        let mut blocks = self.blocks();
        blocks.sort_by_key(|block| block.z_index());
        blocks
    }

    /// Blocks waiting to be drawn.
    pub fn dirty_blocks(&self) -> Vec<Block> {
        self.blocks
            .borrow()
            .iter()
            .filter(|block| block.is_dirty())
            .cloned()
            .collect()
    }

    pub fn revision(&self) -> Signal<u64> {
        self.revision.clone()
    }

    pub fn len(&self) -> usize {
        self.blocks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.borrow().is_empty()
    }
}

impl Default for LayoutManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_duplicate_id_rejected() {
        let manager = LayoutManager::new();
        manager.add_block(BlockConfig::new("header", 0, 1, 80, 3)).unwrap();
        let err = manager
            .add_block(BlockConfig::new("header", 0, 5, 80, 3))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateBlock(id) if id == "header"));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.block("header").unwrap().dimensions().y, 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let manager = LayoutManager::new();
        manager.add_block(BlockConfig::new("a", 0, 0, 1, 1)).unwrap();
        let revision = manager.revision().get_untracked();
        manager.remove_block("nope");
        assert_eq!(manager.revision().get_untracked(), revision);
        manager.remove_block("a");
        assert!(manager.is_empty());
        assert!(manager.block("a").is_none());
    }

    #[test]
    fn test_sorted_by_z_index() {
        let manager = LayoutManager::new();
        manager.add_block(BlockConfig::new("top", 0, 0, 1, 1).z_index(5)).unwrap();
        manager.add_block(BlockConfig::new("base", 0, 0, 1, 1)).unwrap();
        manager.add_block(BlockConfig::new("base2", 0, 0, 1, 1)).unwrap();

        let ids: Vec<String> = manager.sorted_blocks().iter().map(|b| b.id()).collect();
        assert_eq!(ids, vec!["base", "base2", "top"]);
    }

    #[test]
    fn test_block_list_is_reactive() {
        let manager = Rc::new(LayoutManager::new());
        let counts = Rc::new(RefCell::new(Vec::new()));

        let manager_clone = manager.clone();
        let counts_clone = counts.clone();
        let _e = effect(move || counts_clone.borrow_mut().push(manager_clone.blocks().len()));

        manager.add_block(BlockConfig::new("a", 0, 0, 1, 1)).unwrap();
        manager.add_block(BlockConfig::new("b", 0, 0, 1, 1)).unwrap();
        manager.clear();
        // Clearing an empty manager changes nothing
        manager.clear();

        assert_eq!(*counts.borrow(), vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_mark_all_dirty() {
        let manager = LayoutManager::new();
        let a = manager.add_block(BlockConfig::new("a", 0, 0, 1, 1)).unwrap();
        let b = manager.add_block(BlockConfig::new("b", 0, 0, 1, 1)).unwrap();
        a.mark_clean();
        b.mark_clean();
        assert!(manager.dirty_blocks().is_empty());

        manager.mark_all_dirty();
        assert!(a.is_dirty() && b.is_dirty());

        let calls = Cell::new(0);
        for block in manager.dirty_blocks() {
            block.mark_clean();
            calls.set(calls.get() + 1);
        }
        assert_eq!(calls.get(), 2);
    }
}
