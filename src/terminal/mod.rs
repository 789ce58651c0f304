//! Terminal - drawing surface, input and the reactive terminal wrapper.
//!
//! - [`Surface`] - cursor-addressed drawing boundary
//! - [`CrosstermSurface`] - real terminal via crossterm
//! - [`MemorySurface`] - headless grid for tests
//! - [`Terminal`] - size signals, key/resize listeners, acquire/release
//! - [`input`] - key events and event sources

mod crossterm_surface;
pub mod input;
mod memory;
mod output;
mod screen;
mod surface;

pub use crossterm_surface::CrosstermSurface;
pub use input::{
    CrosstermEvents, EventSource, InputEvent, KeyState, KeyboardEvent, Modifiers, ScriptedEvents,
};
pub use memory::MemorySurface;
pub use output::OutputBuffer;
pub use screen::{KeyListener, ResizeListener, Terminal};
pub use surface::{display_width, truncate_to_width, SharedSurface, Surface};
