//! Global Keys Module - the default modal key map
//!
//! Installs the bindings every dashboard starts with:
//! - Ctrl+c / Ctrl+d: quit, in any mode
//! - Normal: `/` Command, `i` Insert, `f` Select, `q` quit
//! - Insert, Command, Select: `Escape` back to Normal
//!
//! # Example
//!
//! ```ignore
//! use flowdash::state::global_keys;
//!
//! let handle = global_keys::setup_global_keys(&keys, &modes, move || app.request_exit());
//!
//! // Later, on cleanup:
//! handle.cleanup();
//! ```

use std::rc::Rc;

use super::keybindings::{KeyHandler, Keybindings};
use super::mode::{InputMode, ModeState};
use crate::types::Cleanup;

// =============================================================================
// GLOBAL KEYS HANDLE
// =============================================================================

/// Cleanup handle for the default bindings
pub struct GlobalKeysHandle {
    quit_cleanup: Option<Cleanup>,
    normal_cleanup: Option<Cleanup>,
    escape_cleanups: Vec<Cleanup>,
}

impl GlobalKeysHandle {
    /// Remove every binding this handle installed
    pub fn cleanup(mut self) {
        if let Some(cleanup) = self.quit_cleanup.take() {
            cleanup();
        }
        if let Some(cleanup) = self.normal_cleanup.take() {
            cleanup();
        }
        for cleanup in self.escape_cleanups.drain(..) {
            cleanup();
        }
    }
}

// =============================================================================
// SETUP
// =============================================================================

fn switch_to(modes: &Rc<ModeState>, mode: InputMode) -> KeyHandler {
    let modes = modes.clone();
    Rc::new(move || modes.set_mode(mode))
}

/// Install the default key map.
///
/// `quit` runs for Ctrl+c, Ctrl+d, and `q` in Normal mode.
pub fn setup_global_keys(
    keys: &Keybindings,
    modes: &Rc<ModeState>,
    quit: impl Fn() + 'static,
) -> GlobalKeysHandle {
    let quit: KeyHandler = Rc::new(quit);

    let quit_cleanup = keys.bind_global([("Ctrl+c", quit.clone()), ("Ctrl+d", quit.clone())]);

    let normal_cleanup = keys.bind_mode(
        InputMode::Normal,
        [
            ("/", switch_to(modes, InputMode::Command)),
            ("i", switch_to(modes, InputMode::Insert)),
            ("f", switch_to(modes, InputMode::Select)),
            ("q", quit),
        ],
    );

    let escape_cleanups = [InputMode::Insert, InputMode::Command, InputMode::Select]
        .into_iter()
        .map(|mode| keys.bind_mode(mode, [("Escape", switch_to(modes, InputMode::Normal))]))
        .collect();

    GlobalKeysHandle {
        quit_cleanup: Some(quit_cleanup),
        normal_cleanup: Some(normal_cleanup),
        escape_cleanups,
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn setup() -> (Keybindings, Rc<ModeState>, Rc<Cell<usize>>, GlobalKeysHandle) {
        let keys = Keybindings::new();
        let modes = Rc::new(ModeState::default());
        let quits = Rc::new(Cell::new(0));
        let quits_clone = quits.clone();
        let handle = setup_global_keys(&keys, &modes, move || quits_clone.set(quits_clone.get() + 1));
        (keys, modes, quits, handle)
    }

    #[test]
    fn test_mode_switching() {
        let (keys, modes, _, _handle) = setup();

        keys.dispatch("/", modes.mode());
        assert_eq!(modes.mode(), InputMode::Command);

        // "i" is text in Command mode, not a mode switch
        assert!(!keys.dispatch("i", modes.mode()));
        assert_eq!(modes.mode(), InputMode::Command);

        keys.dispatch("Escape", modes.mode());
        assert_eq!(modes.mode(), InputMode::Normal);

        keys.dispatch("f", modes.mode());
        assert_eq!(modes.mode(), InputMode::Select);
        keys.dispatch("Escape", modes.mode());
        keys.dispatch("i", modes.mode());
        assert_eq!(modes.mode(), InputMode::Insert);
    }

    #[test]
    fn test_quit_keys() {
        let (keys, modes, quits, _handle) = setup();

        keys.dispatch("q", InputMode::Normal);
        keys.dispatch("Ctrl+c", InputMode::Insert);
        keys.dispatch("Ctrl+d", InputMode::Command);
        assert_eq!(quits.get(), 3);

        // q is not a quit key outside Normal
        modes.set_mode(InputMode::Insert);
        keys.dispatch("q", modes.mode());
        assert_eq!(quits.get(), 3);
    }

    #[test]
    fn test_cleanup_removes_handlers() {
        let (keys, _modes, quits, handle) = setup();
        handle.cleanup();

        for mode in InputMode::ALL {
            assert!(keys.active_keys(mode).is_empty());
        }
        keys.dispatch("Ctrl+c", InputMode::Normal);
        assert_eq!(quits.get(), 0);
    }
}
