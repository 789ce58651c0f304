//! Reactive Core - signals, deriveds and effects.
//!
//! A small fine-grained reactivity system with automatic dependency tracking:
//!
//! - [`Signal`] - a mutable cell; reads are tracked, writes notify
//! - [`Derived`] - a memoized computation, invalidated on write and recomputed on read
//! - [`Effect`] - a side effect re-run synchronously when what it read changes
//!
//! # Tracking
//!
//! While a derived or effect evaluates, it sits on top of a thread-local
//! observer stack. Every signal or derived read during that evaluation
//! subscribes the observer. Before each re-evaluation the observer drops all
//! of its subscriptions, so dependencies that are no longer read are pruned.
//!
//! # Scheduling
//!
//! A write runs the affected effects before it returns, in creation order.
//! [`batch`] defers them to the end of the batch and runs each once.
//!
//! # Example
//!
//! ```ignore
//! use flowdash::reactive::{signal, derived, effect};
//!
//! let count = signal(0);
//! let c = count.clone();
//! let label = derived(move || format!("Issues: {}", c.get()));
//!
//! let l = label.clone();
//! let _e = effect(move || println!("{}", l.get()));
//! count.set(3); // prints "Issues: 3"
//! ```

mod derived;
mod effect;
mod runtime;
mod signal;

pub use derived::{derived, Derived};
pub use effect::{effect, effect_on, watch, Effect};
pub use runtime::{batch, is_batching, untrack};
pub use signal::{signal, Signal};

/// A reactive value that can be listed as an explicit dependency of [`effect_on`].
pub trait Trackable {
    /// Register a read with the current observer.
    fn track(&self);

    /// Clone into a boxed dependency handle.
    fn boxed(&self) -> Box<dyn Trackable>;
}
