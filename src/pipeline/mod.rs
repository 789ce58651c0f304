//! Pipeline - from input and resize events to frames on the surface.
//!
//! ```text
//! resize → Terminal width/height (one batch) → layout marks blocks dirty → App::render
//! key    → Terminal key listeners → Keybindings::dispatch(mode) → state → reactive bindings
//! ```
//!
//! [`AppContext`] owns the services, [`App`] owns the render callbacks and
//! the lifecycle.

mod app;
mod context;

pub use app::{App, AppOptions};
pub use context::AppContext;
