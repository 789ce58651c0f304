//! # flowdash
//!
//! Reactive terminal dashboard for issue trackers.
//!
//! ## Architecture
//!
//! A small signal/derived/effect core drives everything. The terminal's size
//! lives in signals, layout blocks are marked dirty when it changes, and each
//! block is drawn by a renderer bound to a reactive data source. Keys go
//! through a vim-like modal dispatcher.
//!
//! ```text
//! signals → deriveds → BlockBinding → Renderer → Surface
//!    ↑                                              ↓
//! Keybindings ← ModeState ← Terminal ← EventSource  flush
//! ```
//!
//! ## Modules
//!
//! - [`reactive`] - signals, deriveds, effects, `watch`, `batch`
//! - [`terminal`] - drawing surface, input events, reactive terminal size
//! - [`layout`] - blocks, border arithmetic and the layout manager
//! - [`state`] - modes, keybindings, notifications, logs, async data, commands
//! - [`renderer`] - the `Renderer` trait, block bindings and stock renderers
//! - [`pipeline`] - app context, render scheduling and lifecycle
//! - [`tracker`] - issue types, sources and caching
//! - [`dashboard`] - the issue dashboard composed from all of the above
//! - [`config`] / [`logging`] - TOML configuration and tracing setup

pub mod config;
pub mod dashboard;
pub mod error;
pub mod layout;
pub mod logging;
pub mod pipeline;
pub mod reactive;
mod registry;
pub mod renderer;
pub mod state;
pub mod terminal;
pub mod tracker;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

pub use config::Config;
pub use layout::{Block, BlockConfig, BlockDimensions, LayoutManager};
pub use pipeline::{App, AppContext, AppOptions};
pub use reactive::{batch, derived, effect, signal, untrack, watch, Derived, Effect, Signal};
pub use renderer::{BindOptions, BlockBinding, Renderer};
pub use state::{InputMode, Keybindings, ModeState};
pub use terminal::{Surface, Terminal};
