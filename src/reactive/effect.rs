//! Effects - side effects that re-run when their dependencies change.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::runtime::{self, NodeId, Observer, Source};
use super::Trackable;

pub(crate) struct EffectInner {
    id: NodeId,
    weak_self: Weak<EffectInner>,
    f: RefCell<Box<dyn FnMut()>>,
    deps: Option<Vec<Box<dyn Trackable>>>,
    sources: RefCell<Vec<(Rc<dyn Source>, u64)>>,
    running: Cell<bool>,
    rerun: Cell<bool>,
    disposed: Cell<bool>,
}

struct RunningGuard<'a>(&'a Cell<bool>);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl EffectInner {
    fn clear_sources(&self) {
        let sources = std::mem::take(&mut *self.sources.borrow_mut());
        for (source, _) in sources {
            source.node().unsubscribe(self.id);
        }
    }

    // A source is stale if its version moved since we read it. Deriveds are
    // refreshed first so an equal recomputation does not count as a change.
    fn is_stale(&self) -> bool {
        let sources: Vec<(Rc<dyn Source>, u64)> = self
            .sources
            .borrow()
            .iter()
            .map(|(source, version)| (source.clone(), *version))
            .collect();
        sources.iter().any(|(source, seen)| {
            source.refresh();
            source.node().version() != *seen
        })
    }

    pub(crate) fn run_if_stale(&self) {
        if self.disposed.get() {
            return;
        }
        if self.running.get() {
            self.rerun.set(true);
            return;
        }
        if self.is_stale() {
            self.run();
        }
    }

    fn invoke(&self) {
        let mut f = self.f.borrow_mut();
        let f: &mut dyn FnMut() = &mut **f;
        match &self.deps {
            Some(deps) => {
                for dep in deps {
                    dep.track();
                }
                runtime::untrack(f);
            }
            None => f(),
        }
    }

    fn run(&self) {
        let Some(this) = self.weak_self.upgrade() else {
            return;
        };
        loop {
            self.clear_sources();
            {
                self.running.set(true);
                let _running = RunningGuard(&self.running);
                let observer: Rc<dyn Observer> = this.clone();
                runtime::with_observer(Some(observer), || self.invoke());
            }
            if !self.rerun.replace(false) || self.disposed.get() || !self.is_stale() {
                break;
            }
        }
    }

    fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.clear_sources();
        // Release captured state now unless we are being disposed from inside our own run.
        if let Ok(mut f) = self.f.try_borrow_mut() {
            *f = Box::new(|| {});
        }
    }
}

impl Observer for EffectInner {
    fn id(&self) -> NodeId {
        self.id
    }

    fn notify(&self) {
        if self.disposed.get() {
            return;
        }
        if let Some(this) = self.weak_self.upgrade() {
            runtime::schedule(this);
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

/// Handle to a running effect.
///
/// The effect stays subscribed while the handle is alive. Dropping the handle
/// (or calling [`Effect::dispose`]) stops it.
#[must_use = "an effect stops when its handle is dropped"]
pub struct Effect {
    inner: Rc<EffectInner>,
}

impl Effect {
    fn create(f: Box<dyn FnMut()>, deps: Option<Vec<Box<dyn Trackable>>>) -> Self {
        let inner = Rc::new_cyclic(|weak_self| EffectInner {
            id: runtime::next_node_id(),
            weak_self: weak_self.clone(),
            f: RefCell::new(f),
            deps,
            sources: RefCell::new(Vec::new()),
            running: Cell::new(false),
            rerun: Cell::new(false),
            disposed: Cell::new(false),
        });
        inner.run();
        Self { inner }
    }

    /// Stop the effect. Safe to call more than once.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.disposed.get()
    }

    /// Number of sources read during the last run.
    pub fn dependency_count(&self) -> usize {
        self.inner.sources.borrow().len()
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        self.inner.dispose();
    }
}

/// Run `f` now and again whenever anything it read changes.
///
/// Re-runs happen synchronously inside the write that caused them (or at the
/// end of the enclosing [`batch`](super::batch)). A panic inside `f`
/// propagates out of that write.
///
/// ```ignore
/// let count = signal(0);
/// let c = count.clone();
/// let _e = effect(move || println!("count = {}", c.get()));
/// count.set(1); // prints "count = 1"
/// ```
pub fn effect<F>(f: F) -> Effect
where
    F: FnMut() + 'static,
{
    Effect::create(Box::new(f), None)
}

/// Like [`effect`], but only `deps` are tracked; reads inside `f` are not.
pub fn effect_on<F>(deps: &[&dyn Trackable], f: F) -> Effect
where
    F: FnMut() + 'static,
{
    let deps = deps.iter().map(|dep| dep.boxed()).collect();
    Effect::create(Box::new(f), Some(deps))
}

/// Call `callback(new, old)` whenever the value produced by `source` changes.
///
/// `source` is evaluated immediately (tracked) but the callback only fires on
/// later changes. The callback itself runs untracked.
///
/// ```ignore
/// let _w = watch(move || mode.get(), |new, old| {
///     tracing::debug!(?old, ?new, "mode changed");
/// });
/// ```
pub fn watch<T, S, C>(source: S, mut callback: C) -> Effect
where
    T: PartialEq + Clone + 'static,
    S: Fn() -> T + 'static,
    C: FnMut(&T, &T) + 'static,
{
    let mut previous: Option<T> = None;
    effect(move || {
        let next = source();
        match previous.replace(next.clone()) {
            Some(old) if old != next => runtime::untrack(|| callback(&next, &old)),
            _ => {}
        }
    })
}
