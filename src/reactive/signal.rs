//! Signals - reactive mutable cells.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::runtime::{self, Source, SourceNode};
use super::Trackable;

struct SignalInner<T> {
    node: SourceNode,
    value: RefCell<T>,
    equals: fn(&T, &T) -> bool,
}

impl<T: 'static> Source for SignalInner<T> {
    fn node(&self) -> &SourceNode {
        &self.node
    }

    fn refresh(&self) {}
}

/// A reactive cell.
///
/// Reading a signal inside a derived or effect subscribes that observer.
/// Writing notifies every observer that read it during its latest run.
///
/// # Equality policy
///
/// [`Signal::set`] compares the new value with the current one and does
/// nothing when they are equal: no version bump, no effect runs. The default
/// comparison is `PartialEq`; [`Signal::with_equals`] swaps in a custom one and
/// [`Signal::always`] disables the check. [`Signal::update`] mutates in place
/// and always notifies.
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

/// Create a signal using `PartialEq` for the equality policy.
pub fn signal<T: PartialEq + 'static>(value: T) -> Signal<T> {
    Signal::new(value)
}

impl<T: 'static> Signal<T> {
    pub fn new(value: T) -> Self
    where
        T: PartialEq,
    {
        Self::with_equals(value, |a, b| a == b)
    }

    /// Create a signal with a custom equality check.
    pub fn with_equals(value: T, equals: fn(&T, &T) -> bool) -> Self {
        Self {
            inner: Rc::new(SignalInner {
                node: SourceNode::new(),
                value: RefCell::new(value),
                equals,
            }),
        }
    }

    /// Create a signal where every `set` notifies.
    pub fn always(value: T) -> Self {
        Self::with_equals(value, |_, _| false)
    }

    fn track_read(&self) {
        runtime::track(self.inner.clone());
    }

    /// Read the value, subscribing the current observer.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.track_read();
        self.inner.value.borrow().clone()
    }

    /// Read the value without subscribing.
    pub fn get_untracked(&self) -> T
    where
        T: Clone,
    {
        self.inner.value.borrow().clone()
    }

    /// Borrow the value, subscribing the current observer.
    ///
    /// The signal must not be written from inside `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.track_read();
        f(&self.inner.value.borrow())
    }

    /// Borrow the value without subscribing.
    pub fn with_untracked<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value. Equal values are ignored (see the type docs).
    pub fn set(&self, value: T) {
        let previous = {
            let mut current = self.inner.value.borrow_mut();
            if (self.inner.equals)(&current, &value) {
                return;
            }
            std::mem::replace(&mut *current, value)
        };
        drop(previous);
        self.inner.node.bump();
        self.inner.node.notify_observers();
    }

    /// Mutate the value in place. Always notifies.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.inner.value.borrow_mut());
        self.inner.node.bump();
        self.inner.node.notify_observers();
    }

    /// Number of observers currently subscribed.
    pub fn observer_count(&self) -> usize {
        self.inner.node.observer_count()
    }
}

impl<T: 'static> Trackable for Signal<T> {
    fn track(&self) {
        self.track_read();
    }

    fn boxed(&self) -> Box<dyn Trackable> {
        Box::new(self.clone())
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Signal").field(&*self.inner.value.borrow()).finish()
    }
}
