//! Listener registry shared by the terminal, mode state and app shell.
//!
//! Listeners are kept in registration order under a numeric id. Adding one
//! returns a [`Cleanup`] that removes exactly that entry. Dispatch works on a
//! snapshot, so a listener may add or remove listeners while it runs.

use std::cell::RefCell;
use std::rc::Rc;

use crate::types::Cleanup;

struct RegistryInner<F: ?Sized> {
    entries: Vec<(usize, Rc<F>)>,
    next_id: usize,
}

pub(crate) struct Registry<F: ?Sized> {
    inner: Rc<RefCell<RegistryInner<F>>>,
}

impl<F: ?Sized + 'static> Registry<F> {
    pub(crate) fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(RegistryInner {
                entries: Vec::new(),
                next_id: 0,
            })),
        }
    }

    pub(crate) fn add(&self, listener: Rc<F>) -> Cleanup {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.entries.push((id, listener));
            id
        };

        let weak = Rc::downgrade(&self.inner);
        Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().entries.retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    pub(crate) fn snapshot(&self) -> Vec<Rc<F>> {
        self.inner
            .borrow()
            .entries
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    pub(crate) fn clear(&self) {
        self.inner.borrow_mut().entries.clear();
    }
}
