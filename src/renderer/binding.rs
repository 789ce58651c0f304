//! Block bindings - a block, a renderer and where the data comes from.

use std::rc::Rc;

use super::Renderer;
use crate::layout::{draw_border, Block, BlockDimensions};
use crate::reactive::{effect, untrack, Effect};
use crate::terminal::{SharedSurface, Surface};

/// Zero-argument data getter. Build it from signals and deriveds to make a
/// reactive binding follow them.
pub type DataSource<T> = Rc<dyn Fn() -> T>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindOptions {
    /// Re-render whenever the data source's dependencies change.
    pub reactive: bool,
}

struct BindingInner<R: Renderer> {
    block: Block,
    renderer: R,
    surface: SharedSurface,
    source: Option<DataSource<R::Data>>,
}

impl<R: Renderer> BindingInner<R> {
    fn draw(&self, data: &R::Data) {
        self.frame(|surface, dims| self.renderer.render(surface, data, dims));
    }

    // Border and title, then `content`, then the block is clean.
    fn frame(&self, content: impl FnOnce(&mut dyn Surface, &BlockDimensions)) {
        let dims = self.block.dimensions();
        {
            let mut surface = self.surface.borrow_mut();
            if self.block.has_border() {
                let title = self.block.title();
                draw_border(&mut *surface, &dims, title.as_deref(), self.block.border_style());
            }
            content(&mut *surface, &dims);
        }
        self.block.mark_clean();
    }
}

/// Couples a [`Block`] to a [`Renderer`].
///
/// With [`BindOptions::reactive`] and a data source, the binding watches the
/// source and redraws with each new value until it is disposed or dropped.
/// The source is evaluated once at bind time to collect its dependencies; the
/// first draw is still up to the caller.
pub struct BlockBinding<R: Renderer> {
    inner: Rc<BindingInner<R>>,
    watcher: Option<Effect>,
}

impl<R: Renderer + 'static> BlockBinding<R> {
    pub fn bind(
        block: Block,
        renderer: R,
        surface: SharedSurface,
        source: Option<DataSource<R::Data>>,
        options: BindOptions,
    ) -> Self {
        let inner = Rc::new(BindingInner {
            block,
            renderer,
            surface,
            source,
        });

        let watcher = match (&inner.source, options.reactive) {
            (Some(source), true) => {
                let source = source.clone();
                let target = inner.clone();
                let mut first = true;
                Some(effect(move || {
                    let data = source();
                    if std::mem::take(&mut first) {
                        return;
                    }
                    untrack(|| target.draw(&data));
                }))
            }
            _ => None,
        };

        Self { inner, watcher }
    }

    /// Draw with data from the source. Without a source the block is still
    /// framed: border and title are drawn and the content area is blanked
    /// through [`Renderer::clear`].
    pub fn render(&self) {
        match &self.inner.source {
            Some(source) => {
                let data = untrack(|| source());
                self.inner.draw(&data);
            }
            None => {
                tracing::trace!(block = %self.inner.block.id(), "render without data source");
                let renderer = &self.inner.renderer;
                self.inner.frame(|surface, dims| renderer.clear(surface, dims));
            }
        }
    }

    /// Draw with explicit data.
    pub fn render_with(&self, data: &R::Data) {
        self.inner.draw(data);
    }

    pub fn mark_dirty(&self) {
        self.inner.block.mark_dirty();
    }

    /// Blank the content area via the renderer.
    pub fn clear(&self) {
        let dims = self.inner.block.dimensions();
        let mut surface = self.inner.surface.borrow_mut();
        self.inner.renderer.clear(&mut *surface, &dims);
    }

    /// Stop following the data source.
    pub fn dispose(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.dispose();
        }
    }

    pub fn is_reactive(&self) -> bool {
        self.watcher.as_ref().is_some_and(|w| !w.is_disposed())
    }

    pub fn block(&self) -> &Block {
        &self.inner.block
    }

    pub fn dimensions(&self) -> BlockDimensions {
        self.inner.block.dimensions()
    }
}
