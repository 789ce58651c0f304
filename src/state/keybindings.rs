//! Keybindings - global and per-mode key tables with mode-first dispatch.
//!
//! A key name (see [`KeyboardEvent::name`](crate::terminal::KeyboardEvent::name))
//! resolves to at most one handler:
//!
//! 1. the binding for the current mode, if any
//! 2. otherwise the global binding, if any
//! 3. otherwise nothing happens
//!
//! Registering a key twice in the same scope replaces the earlier handler.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::{Rc, Weak};

use super::mode::InputMode;
use crate::types::Cleanup;

/// Handler invoked for a key.
pub type KeyHandler = Rc<dyn Fn()>;

type KeyTable = HashMap<String, KeyHandler>;

#[derive(Default)]
struct Tables {
    global: KeyTable,
    modes: HashMap<InputMode, KeyTable>,
}

/// The dispatcher.
#[derive(Default)]
pub struct Keybindings {
    tables: Rc<RefCell<Tables>>,
}

impl Keybindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_global(&self, key: impl Into<String>, handler: impl Fn() + 'static) {
        self.tables
            .borrow_mut()
            .global
            .insert(key.into(), Rc::new(handler));
    }

    pub fn unregister_global(&self, key: &str) {
        self.tables.borrow_mut().global.remove(key);
    }

    pub fn register_for_mode(
        &self,
        mode: InputMode,
        key: impl Into<String>,
        handler: impl Fn() + 'static,
    ) {
        self.tables
            .borrow_mut()
            .modes
            .entry(mode)
            .or_default()
            .insert(key.into(), Rc::new(handler));
    }

    pub fn unregister_for_mode(&self, mode: InputMode, key: &str) {
        if let Some(table) = self.tables.borrow_mut().modes.get_mut(&mode) {
            table.remove(key);
        }
    }

    /// Run the handler for `key` in `mode`. Returns false if nothing is bound.
    pub fn dispatch(&self, key: &str, mode: InputMode) -> bool {
        // Resolve first, call after the borrow ends: handlers may rebind keys.
        let handler = {
            let tables = self.tables.borrow();
            tables
                .modes
                .get(&mode)
                .and_then(|table| table.get(key))
                .or_else(|| tables.global.get(key))
                .cloned()
        };
        match handler {
            Some(handler) => {
                handler();
                true
            }
            None => {
                tracing::trace!(key, %mode, "unbound key");
                false
            }
        }
    }

    /// Register several global bindings; the cleanup removes them again.
    ///
    /// A key rebound by someone else in the meantime is left alone.
    pub fn bind_global<I, K>(&self, bindings: I) -> Cleanup
    where
        I: IntoIterator<Item = (K, KeyHandler)>,
        K: Into<String>,
    {
        let registered = {
            let mut tables = self.tables.borrow_mut();
            insert_all(&mut tables.global, bindings)
        };
        let weak = Rc::downgrade(&self.tables);
        Box::new(move || remove_all(&weak, None, registered))
    }

    /// Register several bindings for `mode`; the cleanup removes them again.
    pub fn bind_mode<I, K>(&self, mode: InputMode, bindings: I) -> Cleanup
    where
        I: IntoIterator<Item = (K, KeyHandler)>,
        K: Into<String>,
    {
        let registered = {
            let mut tables = self.tables.borrow_mut();
            insert_all(tables.modes.entry(mode).or_default(), bindings)
        };
        let weak = Rc::downgrade(&self.tables);
        Box::new(move || remove_all(&weak, Some(mode), registered))
    }

    pub fn is_bound(&self, key: &str, mode: InputMode) -> bool {
        let tables = self.tables.borrow();
        tables.global.contains_key(key)
            || tables.modes.get(&mode).is_some_and(|table| table.contains_key(key))
    }

    /// Keys that do something in `mode`, sorted.
    pub fn active_keys(&self, mode: InputMode) -> Vec<String> {
        let tables = self.tables.borrow();
        let mut keys: BTreeSet<String> = tables.global.keys().cloned().collect();
        if let Some(table) = tables.modes.get(&mode) {
            keys.extend(table.keys().cloned());
        }
        keys.into_iter().collect()
    }

    /// Keys bound for `mode` only, sorted.
    pub fn mode_keys(&self, mode: InputMode) -> Vec<String> {
        let tables = self.tables.borrow();
        let mut keys: Vec<String> = tables
            .modes
            .get(&mode)
            .map(|table| table.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    pub fn global_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.tables.borrow().global.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn clear(&self) {
        let mut tables = self.tables.borrow_mut();
        tables.global.clear();
        tables.modes.clear();
    }
}

fn insert_all<I, K>(table: &mut KeyTable, bindings: I) -> Vec<(String, KeyHandler)>
where
    I: IntoIterator<Item = (K, KeyHandler)>,
    K: Into<String>,
{
    bindings
        .into_iter()
        .map(|(key, handler)| {
            let key = key.into();
            table.insert(key.clone(), handler.clone());
            (key, handler)
        })
        .collect()
}

fn remove_all(tables: &Weak<RefCell<Tables>>, mode: Option<InputMode>, registered: Vec<(String, KeyHandler)>) {
    let Some(tables) = tables.upgrade() else {
        return;
    };
    let mut tables = tables.borrow_mut();
    let table = match mode {
        Some(mode) => match tables.modes.get_mut(&mode) {
            Some(table) => table,
            None => return,
        },
        None => &mut tables.global,
    };
    for (key, handler) in registered {
        if table.get(&key).is_some_and(|current| Rc::ptr_eq(current, &handler)) {
            table.remove(&key);
        }
    }
}
