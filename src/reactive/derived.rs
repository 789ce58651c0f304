//! Deriveds - memoized computations over signals and other deriveds.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::runtime::{self, NodeId, Observer, Source, SourceNode};
use super::Trackable;

struct DerivedInner<T> {
    node: SourceNode,
    weak_self: Weak<DerivedInner<T>>,
    compute: Box<dyn Fn() -> T>,
    value: RefCell<Option<T>>,
    dirty: Cell<bool>,
    sources: RefCell<Vec<(Rc<dyn Source>, u64)>>,
    equals: fn(&T, &T) -> bool,
}

impl<T: 'static> DerivedInner<T> {
    fn clear_sources(&self) {
        let sources = std::mem::take(&mut *self.sources.borrow_mut());
        for (source, _) in sources {
            source.node().unsubscribe(self.node.id());
        }
    }

    fn recompute(&self) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        self.clear_sources();
        let observer: Rc<dyn Observer> = this;
        let next = {
            let _unwind = Discard(self);
            runtime::with_observer(Some(observer), || (self.compute)())
        };
        self.dirty.set(false);

        let changed = {
            let mut value = self.value.borrow_mut();
            let changed = match value.as_ref() {
                Some(current) => !(self.equals)(current, &next),
                None => true,
            };
            if changed {
                *value = Some(next);
            }
            changed
        };
        if changed {
            self.node.bump();
        }
    }
}

/// Drops the cached value if `compute` unwinds. The derived is then clean
/// but empty: the next write notifies dependents again and the next read
/// recomputes.
struct Discard<'a, T>(&'a DerivedInner<T>);

impl<T> Drop for Discard<'_, T> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.value.borrow_mut().take();
            self.0.dirty.set(false);
        }
    }
}

impl<T: 'static> Source for DerivedInner<T> {
    fn node(&self) -> &SourceNode {
        &self.node
    }

    fn refresh(&self) {
        if self.dirty.get() || self.value.borrow().is_none() {
            self.recompute();
        }
    }
}

impl<T: 'static> Observer for DerivedInner<T> {
    fn id(&self) -> NodeId {
        self.node.id()
    }

    // Invalidate only; the value is recomputed on the next read.
    fn notify(&self) {
        if !self.dirty.replace(true) {
            self.node.notify_observers();
        }
    }

    fn record(&self, source: Rc<dyn Source>, version: u64) {
        let mut sources = self.sources.borrow_mut();
        let id = source.node().id();
        if !sources.iter().any(|(existing, _)| existing.node().id() == id) {
            sources.push((source, version));
        }
    }
}

/// A memoized computation.
///
/// Never computed on write: a dependency change only marks it dirty. The next
/// [`Derived::get`] recomputes, rebuilding the dependency set from scratch so
/// branches that are no longer taken stop triggering it. A recomputation that
/// yields an equal value leaves dependents untouched.
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

/// Create a derived value.
///
/// ```ignore
/// let count = signal(2);
/// let c = count.clone();
/// let doubled = derived(move || c.get() * 2);
/// assert_eq!(doubled.get(), 4);
/// ```
pub fn derived<T, F>(compute: F) -> Derived<T>
where
    T: PartialEq + Clone + 'static,
    F: Fn() -> T + 'static,
{
    Derived::with_equals(compute, |a, b| a == b)
}

impl<T: Clone + 'static> Derived<T> {
    pub fn with_equals<F>(compute: F, equals: fn(&T, &T) -> bool) -> Self
    where
        F: Fn() -> T + 'static,
    {
        let inner = Rc::new_cyclic(|weak_self| DerivedInner {
            node: SourceNode::new(),
            weak_self: weak_self.clone(),
            compute: Box::new(compute),
            value: RefCell::new(None),
            dirty: Cell::new(true),
            sources: RefCell::new(Vec::new()),
            equals,
        });
        Self { inner }
    }

    /// Read the value, recomputing if invalidated, and subscribe the current observer.
    pub fn get(&self) -> T {
        self.inner.refresh();
        runtime::track(self.inner.clone());
        self.current()
    }

    /// Read the value without subscribing.
    pub fn get_untracked(&self) -> T {
        self.inner.refresh();
        self.current()
    }

    fn current(&self) -> T {
        match self.inner.value.borrow().as_ref() {
            Some(value) => value.clone(),
            // refresh() always leaves a value behind
            None => unreachable!("derived read before first computation"),
        }
    }

    /// True if a dependency changed since the last computation.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.get()
    }
}

impl<T: Clone + 'static> Trackable for Derived<T> {
    fn track(&self) {
        self.inner.refresh();
        runtime::track(self.inner.clone());
    }

    fn boxed(&self) -> Box<dyn Trackable> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{effect, signal};
    use std::panic::{catch_unwind, AssertUnwindSafe};

    #[test]
    fn test_lazy_recompute() {
        let calls = Rc::new(Cell::new(0));
        let count = signal(1);

        let calls_clone = calls.clone();
        let count_clone = count.clone();
        let doubled = derived(move || {
            calls_clone.set(calls_clone.get() + 1);
            count_clone.get() * 2
        });

        // Nothing computed until read
        assert_eq!(calls.get(), 0);
        assert_eq!(doubled.get(), 2);
        assert_eq!(calls.get(), 1);

        // Memoized
        assert_eq!(doubled.get(), 2);
        assert_eq!(calls.get(), 1);

        // Invalidated on write, not recomputed
        count.set(5);
        assert!(doubled.is_dirty());
        assert_eq!(calls.get(), 1);

        assert_eq!(doubled.get(), 10);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_stale_dependencies_pruned() {
        let use_a = signal(true);
        let a = signal(1);
        let b = signal(100);

        let (use_a_c, a_c, b_c) = (use_a.clone(), a.clone(), b.clone());
        let value = derived(move || if use_a_c.get() { a_c.get() } else { b_c.get() });

        assert_eq!(value.get(), 1);
        assert_eq!(a.observer_count(), 1);
        assert_eq!(b.observer_count(), 0);

        use_a.set(false);
        assert_eq!(value.get(), 100);
        assert_eq!(a.observer_count(), 0);
        assert_eq!(b.observer_count(), 1);

        // Writing the abandoned branch no longer invalidates
        a.set(2);
        assert!(!value.is_dirty());
    }

    #[test]
    fn test_equal_recompute_skips_effect() {
        let n = signal(3);
        let n_clone = n.clone();
        let parity = derived(move || n_clone.get() % 2);

        let runs = Rc::new(Cell::new(0));
        let runs_clone = runs.clone();
        let parity_clone = parity.clone();
        let _e = effect(move || {
            parity_clone.get();
            runs_clone.set(runs_clone.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        // 3 -> 5 keeps parity 1
        n.set(5);
        assert_eq!(runs.get(), 1);

        n.set(6);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_recovers_after_compute_panic() {
        let a = signal(0);
        let a_clone = a.clone();
        let tenfold = derived(move || {
            let v = a_clone.get();
            if v == 1 {
                panic!("bad input");
            }
            v * 10
        });

        let seen = Rc::new(Cell::new(-1));
        let (seen_clone, tenfold_clone) = (seen.clone(), tenfold.clone());
        let _e = effect(move || seen_clone.set(tenfold_clone.get()));
        assert_eq!(seen.get(), 0);

        let result = catch_unwind(AssertUnwindSafe(|| a.set(1)));
        assert!(result.is_err());
        assert!(!tenfold.is_dirty());

        // The next write still reaches the effect
        a.set(2);
        assert_eq!(seen.get(), 20);
        assert_eq!(tenfold.get(), 20);

        a.set(3);
        assert_eq!(seen.get(), 30);
    }

    #[test]
    fn test_chained_deriveds() {
        let base = signal(2);
        let base_clone = base.clone();
        let squared = derived(move || base_clone.get() * base_clone.get());
        let squared_clone = squared.clone();
        let plus_one = derived(move || squared_clone.get() + 1);

        assert_eq!(plus_one.get(), 5);
        base.set(3);
        assert_eq!(plus_one.get(), 10);
    }
}
