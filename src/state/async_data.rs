//! Async data - fetch results delivered into signals.
//!
//! A fetch runs either inline ([`AsyncData::execute`]) or on a worker thread
//! ([`AsyncData::refresh`]). The worker only produces a result; it never
//! touches reactive state. The UI thread picks the result up with
//! [`AsyncData::poll`] (typically from an `on_tick` callback) and writes it
//! into the `data`/`loading`/`error` signals, which is how fetched data
//! reaches the screen.
//!
//! Failures are retried according to a [`RetryPolicy`]. When every attempt
//! has failed the error signal holds a [`FetchError`]; nothing is thrown.
//!
//! # Example
//!
//! ```ignore
//! let issues = AsyncData::new(move || source.search(&query), RetryPolicy::default());
//! issues.refresh();
//! app.on_tick(move |_| { issues.poll(); });
//! ```

use std::cell::RefCell;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use thiserror::Error;

use crate::error::Result;
use crate::reactive::{batch, Signal};

// =============================================================================
// Retry policy
// =============================================================================

/// Bounded retries with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. At least 1.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub multiplier: f64,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// A single attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31) as i32;
        let factor = self.multiplier.max(1.0).powi(exponent);
        let secs = self.initial_backoff.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= self.max_backoff.as_secs_f64() {
            return self.max_backoff;
        }
        self.initial_backoff.mul_f64(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            multiplier: 2.0,
            max_backoff: Duration::from_secs(10),
        }
    }
}

/// The terminal failure of a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (after {attempts} attempt(s))")]
pub struct FetchError {
    pub message: String,
    pub attempts: u32,
}

type Fetcher<T> = dyn Fn() -> Result<T> + Send + Sync;

fn fetch_with_retry<T>(fetcher: &Fetcher<T>, policy: &RetryPolicy) -> std::result::Result<T, FetchError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();
    for attempt in 1..=max_attempts {
        match fetcher() {
            Ok(value) => {
                tracing::debug!(attempt, "fetch succeeded");
                return Ok(value);
            }
            Err(err) => {
                tracing::warn!(attempt, max_attempts, error = %err, "fetch failed");
                last_error = err.to_string();
                if attempt < max_attempts {
                    thread::sleep(policy.backoff(attempt));
                }
            }
        }
    }
    Err(FetchError {
        message: last_error,
        attempts: max_attempts,
    })
}

// =============================================================================
// AsyncData
// =============================================================================

/// Data, loading flag and error for one fetcher.
pub struct AsyncData<T> {
    data: Signal<Option<T>>,
    loading: Signal<bool>,
    error: Signal<Option<FetchError>>,
    fetcher: Arc<Fetcher<T>>,
    policy: RetryPolicy,
    pending: RefCell<Option<Receiver<std::result::Result<T, FetchError>>>>,
}

impl<T: Clone + Send + 'static> AsyncData<T> {
    pub fn new<F>(fetcher: F, policy: RetryPolicy) -> Self
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        Self {
            data: Signal::always(None),
            loading: Signal::new(false),
            error: Signal::new(None),
            fetcher: Arc::new(fetcher),
            policy,
            pending: RefCell::new(None),
        }
    }

    fn begin(&self) {
        batch(|| {
            self.loading.set(true);
            self.error.set(None);
        });
    }

    fn apply(&self, outcome: std::result::Result<T, FetchError>) {
        batch(|| {
            match outcome {
                Ok(value) => self.data.set(Some(value)),
                Err(err) => self.error.set(Some(err)),
            }
            self.loading.set(false);
        });
    }

    /// Fetch on the current thread, blocking until done.
    pub fn execute(&self) {
        self.pending.borrow_mut().take();
        self.begin();
        let outcome = fetch_with_retry(self.fetcher.as_ref(), &self.policy);
        self.apply(outcome);
    }

    /// Start a fetch on a worker thread.
    ///
    /// A fetch still in flight is superseded: its result is dropped.
    pub fn refresh(&self) {
        let (tx, rx) = mpsc::channel();
        let fetcher = self.fetcher.clone();
        let policy = self.policy;
        self.begin();
        *self.pending.borrow_mut() = Some(rx);
        thread::spawn(move || {
            let outcome = fetch_with_retry(fetcher.as_ref(), &policy);
            // The receiver is gone if this fetch was superseded
            let _ = tx.send(outcome);
        });
    }

    /// Apply a finished background fetch. Returns true if state changed.
    pub fn poll(&self) -> bool {
        let received = match self.pending.borrow().as_ref() {
            None => return false,
            Some(rx) => rx.try_recv(),
        };
        match received {
            Ok(outcome) => {
                self.pending.borrow_mut().take();
                self.apply(outcome);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.pending.borrow_mut().take();
                self.apply(Err(FetchError {
                    message: "fetch worker stopped without a result".to_string(),
                    attempts: 0,
                }));
                true
            }
        }
    }

    /// True while a background fetch has not been applied yet.
    pub fn is_pending(&self) -> bool {
        self.pending.borrow().is_some()
    }

    /// Latest data (tracked).
    pub fn data(&self) -> Option<T> {
        self.data.get()
    }

    pub fn loading(&self) -> bool {
        self.loading.get()
    }

    pub fn error(&self) -> Option<FetchError> {
        self.error.get()
    }

    pub fn data_signal(&self) -> Signal<Option<T>> {
        self.data.clone()
    }

    pub fn loading_signal(&self) -> Signal<bool> {
        self.loading.clone()
    }

    pub fn error_signal(&self) -> Signal<Option<FetchError>> {
        self.error.clone()
    }
}
