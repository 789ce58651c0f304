//! Input mode - the vim-like modal state.
//!
//! Exactly one [`InputMode`] is current. Any mode can follow any other; the
//! only rule is that setting the current mode again is not a change.
//!
//! # Example
//!
//! ```ignore
//! use flowdash::state::{InputMode, ModeState};
//!
//! let modes = ModeState::new(InputMode::Normal);
//! let cleanup = modes.on_mode_change(|mode| println!("now in {mode}"));
//! modes.set_mode(InputMode::Command); // prints "now in COMMAND"
//! cleanup();
//! ```

use std::fmt;
use std::rc::Rc;

use crate::reactive::Signal;
use crate::registry::Registry;
use crate::types::Cleanup;

/// The four input modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Insert,
    Command,
    Select,
}

impl InputMode {
    pub const ALL: [InputMode; 4] = [
        InputMode::Normal,
        InputMode::Insert,
        InputMode::Command,
        InputMode::Select,
    ];

    pub fn label(self) -> &'static str {
        match self {
            InputMode::Normal => "NORMAL",
            InputMode::Insert => "INSERT",
            InputMode::Command => "COMMAND",
            InputMode::Select => "SELECT",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

type ModeListener = dyn Fn(InputMode);

/// Holds the current mode and notifies listeners on change.
pub struct ModeState {
    mode: Signal<InputMode>,
    listeners: Registry<ModeListener>,
}

impl ModeState {
    pub fn new(initial: InputMode) -> Self {
        Self {
            mode: Signal::new(initial),
            listeners: Registry::new(),
        }
    }

    /// Current mode (tracked).
    pub fn mode(&self) -> InputMode {
        self.mode.get()
    }

    /// The underlying signal, for deriveds and renderers.
    pub fn signal(&self) -> Signal<InputMode> {
        self.mode.clone()
    }

    /// Switch modes. Listeners run synchronously, after the signal's own
    /// dependents, and only if the mode actually changed.
    pub fn set_mode(&self, mode: InputMode) {
        let previous = self.mode.get_untracked();
        if previous == mode {
            return;
        }
        self.mode.set(mode);
        tracing::debug!(from = %previous, to = %mode, "mode change");
        for listener in self.listeners.snapshot() {
            listener(mode);
        }
    }

    pub fn on_mode_change(&self, listener: impl Fn(InputMode) + 'static) -> Cleanup {
        self.listeners.add(Rc::new(listener))
    }

    /// Drop every listener and return to Normal.
    pub fn reset(&self) {
        self.listeners.clear();
        self.mode.set(InputMode::Normal);
    }
}

impl Default for ModeState {
    fn default() -> Self {
        Self::new(InputMode::Normal)
    }
}
