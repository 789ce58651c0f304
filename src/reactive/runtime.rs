//! Reactive runtime - tracking context, batching, node identity.
//!
//! There is exactly one runtime per thread. It owns:
//!
//! - the observer stack (who is currently evaluating and should record reads)
//! - the batch depth and the queue of effects waiting to run
//! - the node id counter (ids double as creation order)
//!
//! Everything here is `!Send`: the dashboard is single-threaded and all reactive
//! values live on the UI thread.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::effect::EffectInner;

pub(crate) type NodeId = u64;

// =============================================================================
// Graph traits
// =============================================================================

/// Something that can be read inside a tracking context.
pub(crate) trait Source {
    fn node(&self) -> &SourceNode;

    /// Bring the value up to date. Signals are always current; deriveds
    /// recompute here if they were invalidated.
    fn refresh(&self);
}

/// Something that records the sources it reads and reacts to their changes.
pub(crate) trait Observer {
    fn id(&self) -> NodeId;

    /// A source this observer read has (possibly) changed.
    fn notify(&self);

    /// Remember `source` at `version` as a dependency of the current evaluation.
    fn record(&self, source: Rc<dyn Source>, version: u64);
}

// =============================================================================
// SourceNode
// =============================================================================

/// Subscription bookkeeping shared by signals and deriveds.
pub(crate) struct SourceNode {
    id: NodeId,
    version: Cell<u64>,
    observers: RefCell<Vec<(NodeId, Weak<dyn Observer>)>>,
}

impl SourceNode {
    pub(crate) fn new() -> Self {
        Self {
            id: next_node_id(),
            version: Cell::new(0),
            observers: RefCell::new(Vec::new()),
        }
    }

    pub(crate) fn id(&self) -> NodeId {
        self.id
    }

    pub(crate) fn version(&self) -> u64 {
        self.version.get()
    }

    /// Record that the value actually changed.
    pub(crate) fn bump(&self) {
        self.version.set(self.version.get().wrapping_add(1));
    }

    pub(crate) fn subscribe(&self, observer: &Rc<dyn Observer>) {
        let id = observer.id();
        let mut observers = self.observers.borrow_mut();
        if !observers.iter().any(|(existing, _)| *existing == id) {
            observers.push((id, Rc::downgrade(observer)));
        }
    }

    pub(crate) fn unsubscribe(&self, id: NodeId) {
        self.observers.borrow_mut().retain(|(existing, _)| *existing != id);
    }

    /// Number of live observers (dead weak entries are pruned first).
    pub(crate) fn observer_count(&self) -> usize {
        let mut observers = self.observers.borrow_mut();
        observers.retain(|(_, weak)| weak.strong_count() > 0);
        observers.len()
    }

    /// Notify every live observer. Effects reached this way run once the
    /// surrounding batch closes, which is before this call returns unless
    /// an outer `batch` is open.
    pub(crate) fn notify_observers(&self) {
        let observers: Vec<Rc<dyn Observer>> = {
            let mut observers = self.observers.borrow_mut();
            observers.retain(|(_, weak)| weak.strong_count() > 0);
            observers.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
        };
        if observers.is_empty() {
            return;
        }
        batch(|| {
            for observer in observers {
                observer.notify();
            }
        });
    }
}

// =============================================================================
// Runtime state
// =============================================================================

struct Runtime {
    observers: RefCell<Vec<Option<Rc<dyn Observer>>>>,
    batch_depth: Cell<usize>,
    pending: RefCell<Vec<Rc<EffectInner>>>,
    next_id: Cell<NodeId>,
}

thread_local! {
    static RUNTIME: Runtime = Runtime {
        observers: RefCell::new(Vec::new()),
        batch_depth: Cell::new(0),
        pending: RefCell::new(Vec::new()),
        next_id: Cell::new(0),
    };
}

pub(crate) fn next_node_id() -> NodeId {
    RUNTIME.with(|rt| {
        let id = rt.next_id.get();
        rt.next_id.set(id + 1);
        id
    })
}

/// Record a read of `source` against the current observer, if any.
pub(crate) fn track(source: Rc<dyn Source>) {
    let current = RUNTIME.with(|rt| rt.observers.borrow().last().cloned().flatten());
    if let Some(observer) = current {
        source.node().subscribe(&observer);
        let version = source.node().version();
        observer.record(source, version);
    }
}

/// Pops the observer stack even when the evaluation unwinds.
struct ObserverGuard;

impl Drop for ObserverGuard {
    fn drop(&mut self) {
        RUNTIME.with(|rt| {
            rt.observers.borrow_mut().pop();
        });
    }
}

/// Run `f` with `observer` as the current tracking context.
pub(crate) fn with_observer<R>(observer: Option<Rc<dyn Observer>>, f: impl FnOnce() -> R) -> R {
    RUNTIME.with(|rt| rt.observers.borrow_mut().push(observer));
    let _guard = ObserverGuard;
    f()
}

/// Run `f` without recording any reactive reads.
///
/// ```ignore
/// let e = effect(move || {
///     let a = a.get();                 // tracked
///     let b = untrack(|| b.get());     // not tracked
///     println!("{a} {b}");
/// });
/// ```
pub fn untrack<R>(f: impl FnOnce() -> R) -> R {
    with_observer(None, f)
}

/// Queue an effect; it runs when the outermost batch closes.
pub(crate) fn schedule(effect: Rc<EffectInner>) {
    RUNTIME.with(|rt| rt.pending.borrow_mut().push(effect));
}

// =============================================================================
// Batching
// =============================================================================

struct BatchGuard;

impl Drop for BatchGuard {
    fn drop(&mut self) {
        RUNTIME.with(|rt| {
            rt.batch_depth.set(rt.batch_depth.get() - 1);
        });
    }
}

/// Group several writes so that dependent effects run once, after `f`.
///
/// Without a batch every write runs its effects synchronously before
/// returning. Inside a batch, effects are queued and run (each at most once,
/// in creation order) when the outermost batch returns.
///
/// ```ignore
/// batch(|| {
///     width.set(100);
///     height.set(30);
/// }); // resize watcher runs once here
/// ```
pub fn batch<R>(f: impl FnOnce() -> R) -> R {
    RUNTIME.with(|rt| rt.batch_depth.set(rt.batch_depth.get() + 1));
    let result = {
        let _guard = BatchGuard;
        f()
    };
    if RUNTIME.with(|rt| rt.batch_depth.get()) == 0 {
        flush();
    }
    result
}

/// Effects of the current flush that have not run yet. If one of them
/// panics, the rest go back on the queue for the next flush.
struct Queued(std::vec::IntoIter<Rc<EffectInner>>);

impl Drop for Queued {
    fn drop(&mut self) {
        let rest: Vec<_> = self.0.by_ref().collect();
        if !rest.is_empty() {
            RUNTIME.with(|rt| rt.pending.borrow_mut().extend(rest));
        }
    }
}

fn flush() {
    loop {
        let mut queued = RUNTIME.with(|rt| std::mem::take(&mut *rt.pending.borrow_mut()));
        if queued.is_empty() {
            break;
        }
        queued.sort_by_key(|effect| effect.id());
        queued.dedup_by_key(|effect| effect.id());
        let mut queued = Queued(queued.into_iter());
        while let Some(effect) = queued.0.next() {
            effect.run_if_stale();
        }
    }
}

/// True while inside `batch`.
pub fn is_batching() -> bool {
    RUNTIME.with(|rt| rt.batch_depth.get() > 0)
}
