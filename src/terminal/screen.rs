//! Terminal wrapper - reactive size, input listeners and acquisition state.

use std::cell::Cell;
use std::rc::Rc;

use super::input::{InputEvent, KeyboardEvent};
use super::surface::SharedSurface;
use crate::reactive::{batch, Signal};
use crate::registry::Registry;
use crate::types::Cleanup;

pub type KeyListener = dyn Fn(&KeyboardEvent);
pub type ResizeListener = dyn Fn(u16, u16);

/// The terminal as seen by the rest of the dashboard.
///
/// Width and height are signals: anything that reads them inside an effect
/// re-runs on resize. Input is pushed in through [`Terminal::handle_event`]
/// and fanned out to listeners in registration order.
pub struct Terminal {
    surface: SharedSurface,
    width: Signal<u16>,
    height: Signal<u16>,
    key_listeners: Registry<KeyListener>,
    resize_listeners: Registry<ResizeListener>,
    acquired: Cell<bool>,
}

impl Terminal {
    /// Wrap a surface, taking the initial size from it.
    pub fn new(surface: SharedSurface) -> Self {
        let (width, height) = surface.borrow().size();
        Self {
            surface,
            width: Signal::new(width),
            height: Signal::new(height),
            key_listeners: Registry::new(),
            resize_listeners: Registry::new(),
            acquired: Cell::new(false),
        }
    }

    pub fn surface(&self) -> &SharedSurface {
        &self.surface
    }

    /// Current width (tracked).
    pub fn width(&self) -> u16 {
        self.width.get()
    }

    /// Current height (tracked).
    pub fn height(&self) -> u16 {
        self.height.get()
    }

    pub fn width_signal(&self) -> Signal<u16> {
        self.width.clone()
    }

    pub fn height_signal(&self) -> Signal<u16> {
        self.height.clone()
    }

    /// Update both dimensions as one change.
    pub fn set_size(&self, width: u16, height: u16) {
        batch(|| {
            self.width.set(width);
            self.height.set(height);
        });
    }

    /// Re-read the size from the surface.
    pub fn refresh_size(&self) {
        let (width, height) = self.surface.borrow().size();
        self.set_size(width, height);
    }

    // =========================================================================
    // Listeners
    // =========================================================================

    pub fn on_key(&self, listener: impl Fn(&KeyboardEvent) + 'static) -> Cleanup {
        self.key_listeners.add(Rc::new(listener))
    }

    pub fn on_resize(&self, listener: impl Fn(u16, u16) + 'static) -> Cleanup {
        self.resize_listeners.add(Rc::new(listener))
    }

    pub fn key_listener_count(&self) -> usize {
        self.key_listeners.len()
    }

    /// Route one input event.
    ///
    /// Resizes update the size signals before resize listeners run. Key
    /// releases are dropped.
    pub fn handle_event(&self, event: &InputEvent) {
        match event {
            InputEvent::Key(key) if key.is_press() => {
                for listener in self.key_listeners.snapshot() {
                    listener(key);
                }
            }
            InputEvent::Resize(width, height) => {
                self.surface.borrow_mut().resize(*width, *height);
                self.set_size(*width, *height);
                for listener in self.resize_listeners.snapshot() {
                    listener(*width, *height);
                }
            }
            _ => {}
        }
    }

    // =========================================================================
    // Acquisition
    // =========================================================================

    /// Enter full-screen, hide the cursor and grab input. No-op if already acquired.
    pub fn acquire(&self) {
        if self.acquired.replace(true) {
            return;
        }
        let mut surface = self.surface.borrow_mut();
        surface.set_fullscreen(true);
        surface.set_cursor_visible(false);
        surface.set_input_grab(true);
        tracing::debug!("terminal acquired");
    }

    /// Undo [`Terminal::acquire`]. No-op if not acquired.
    pub fn release(&self) {
        if !self.acquired.replace(false) {
            return;
        }
        let mut surface = self.surface.borrow_mut();
        surface.set_input_grab(false);
        surface.set_cursor_visible(true);
        surface.set_fullscreen(false);
        surface.style_reset();
        if let Err(err) = surface.flush() {
            tracing::warn!(error = %err, "failed to flush while releasing terminal");
        }
        tracing::debug!("terminal released");
    }

    pub fn is_acquired(&self) -> bool {
        self.acquired.get()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect;
    use crate::terminal::{MemorySurface, Surface};
    use std::cell::{Cell, RefCell};

    fn terminal(width: u16, height: u16) -> (Rc<RefCell<MemorySurface>>, Terminal) {
        let surface = Rc::new(RefCell::new(MemorySurface::new(width, height)));
        let shared: SharedSurface = surface.clone();
        (surface, Terminal::new(shared))
    }

    #[test]
    fn test_initial_size_from_surface() {
        let (_, term) = terminal(80, 24);
        assert_eq!((term.width(), term.height()), (80, 24));
    }

    #[test]
    fn test_resize_runs_watcher_once() {
        let (surface, term) = terminal(80, 24);
        let runs = Rc::new(Cell::new(0));

        let runs_clone = runs.clone();
        let (w, h) = (term.width_signal(), term.height_signal());
        let _e = effect(move || {
            w.get();
            h.get();
            runs_clone.set(runs_clone.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        term.handle_event(&InputEvent::Resize(100, 30));
        assert_eq!(runs.get(), 2);
        assert_eq!((term.width(), term.height()), (100, 30));
        assert_eq!(surface.borrow().size(), (100, 30));
    }

    #[test]
    fn test_key_listeners_in_order_and_cleanup() {
        let (_, term) = terminal(10, 10);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_a = seen.clone();
        let cleanup_a = term.on_key(move |e| seen_a.borrow_mut().push(format!("a:{}", e.name())));
        let seen_b = seen.clone();
        let _cleanup_b = term.on_key(move |e| seen_b.borrow_mut().push(format!("b:{}", e.name())));

        term.handle_event(&InputEvent::Key(KeyboardEvent::new("x")));
        cleanup_a();
        term.handle_event(&InputEvent::Key(KeyboardEvent::new("y")));

        assert_eq!(*seen.borrow(), vec!["a:x", "b:x", "b:y"]);
        assert_eq!(term.key_listener_count(), 1);
    }

    #[test]
    fn test_acquire_release_idempotent() {
        let (surface, term) = terminal(10, 10);

        term.acquire();
        term.acquire();
        assert!(surface.borrow().is_fullscreen());
        assert!(!surface.borrow().is_cursor_visible());
        assert!(surface.borrow().is_input_grabbed());

        term.release();
        assert!(!surface.borrow().is_fullscreen());
        assert!(surface.borrow().is_cursor_visible());
        assert!(!surface.borrow().is_input_grabbed());
        assert_eq!(surface.borrow().flush_count(), 1);

        term.release();
        assert_eq!(surface.borrow().flush_count(), 1);
    }
}
