//! Notifications - short-lived messages shown in the status bar.
//!
//! Expiry runs on a logical clock advanced by the event loop
//! ([`Notifications::advance`]), so it is deterministic under test. An expired
//! notification is removed from the list, not hidden.

use std::cell::Cell;
use std::time::Duration;

use chrono::{DateTime, Local};

use crate::reactive::Signal;

/// Timeout used by [`Notifications::notify`] unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

impl NotificationKind {
    /// Status bar glyph.
    pub fn icon(self) -> &'static str {
        match self {
            NotificationKind::Info => "ℹ",
            NotificationKind::Success => "✓",
            NotificationKind::Warning => "⚠",
            NotificationKind::Error => "✗",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    /// Logical time the notification was added.
    pub created_at: Duration,
    /// Zero means it stays until dismissed.
    pub timeout: Duration,
    pub timestamp: DateTime<Local>,
}

impl Notification {
    pub fn is_expired(&self, now: Duration) -> bool {
        !self.timeout.is_zero() && now >= self.created_at + self.timeout
    }
}

/// The reactive notification list.
pub struct Notifications {
    items: Signal<Vec<Notification>>,
    now: Cell<Duration>,
    next_id: Cell<u64>,
    default_timeout: Duration,
}

impl Notifications {
    pub fn new() -> Self {
        Self::with_default_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_default_timeout(default_timeout: Duration) -> Self {
        Self {
            items: Signal::new(Vec::new()),
            now: Cell::new(Duration::ZERO),
            next_id: Cell::new(1),
            default_timeout,
        }
    }

    /// Add a notification with the default timeout. Returns its id.
    pub fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        self.notify_for(message, kind, self.default_timeout)
    }

    /// Add a notification that expires after `timeout` (zero: never).
    pub fn notify_for(
        &self,
        message: impl Into<String>,
        kind: NotificationKind,
        timeout: Duration,
    ) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let notification = Notification {
            id,
            message: message.into(),
            kind,
            created_at: self.now.get(),
            timeout,
            timestamp: Local::now(),
        };
        tracing::debug!(id, kind = ?notification.kind, message = %notification.message, "notify");
        self.items.update(|items| items.push(notification));
        id
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Success)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Warning)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.notify(message, NotificationKind::Error)
    }

    /// Remove one notification. Unknown ids are ignored.
    pub fn dismiss(&self, id: u64) {
        if self.items.with_untracked(|items| items.iter().any(|n| n.id == id)) {
            self.items.update(|items| items.retain(|n| n.id != id));
        }
    }

    pub fn clear_all(&self) {
        if !self.items.with_untracked(Vec::is_empty) {
            self.items.set(Vec::new());
        }
    }

    /// Move the clock forward and drop whatever expired.
    pub fn advance(&self, elapsed: Duration) {
        let now = self.now.get() + elapsed;
        self.now.set(now);
        let any_expired = self
            .items
            .with_untracked(|items| items.iter().any(|n| n.is_expired(now)));
        if any_expired {
            self.items.update(|items| items.retain(|n| !n.is_expired(now)));
        }
    }

    /// Logical time since creation.
    pub fn now(&self) -> Duration {
        self.now.get()
    }

    /// All live notifications, oldest first (tracked).
    pub fn list(&self) -> Vec<Notification> {
        self.items.get()
    }

    /// Most recent notification (tracked).
    pub fn latest(&self) -> Option<Notification> {
        self.items.with(|items| items.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.items.with_untracked(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn signal(&self) -> Signal<Vec<Notification>> {
        self.items.clone()
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::effect;
    use std::rc::Rc;

    #[test]
    fn test_self_expiry() {
        let notifications = Notifications::new();
        notifications.info("sticky-ish");
        let id = notifications.notify_for("short", NotificationKind::Success, Duration::from_millis(100));

        assert_eq!(notifications.len(), 2);
        assert!(notifications.list().iter().any(|n| n.id == id));

        notifications.advance(Duration::from_millis(101));
        assert_eq!(notifications.len(), 1);
        assert!(!notifications.list().iter().any(|n| n.id == id));
    }

    #[test]
    fn test_expires_exactly_at_timeout() {
        let notifications = Notifications::new();
        notifications.notify_for("x", NotificationKind::Info, Duration::from_millis(100));
        notifications.advance(Duration::from_millis(99));
        assert_eq!(notifications.len(), 1);
        notifications.advance(Duration::from_millis(1));
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_zero_timeout_never_expires() {
        let notifications = Notifications::new();
        let id = notifications.notify_for("pinned", NotificationKind::Warning, Duration::ZERO);
        notifications.advance(Duration::from_secs(3600));
        assert_eq!(notifications.len(), 1);
        notifications.dismiss(id);
        assert!(notifications.is_empty());
    }

    #[test]
    fn test_latest_is_reactive() {
        let notifications = Rc::new(Notifications::new());
        let seen = Rc::new(std::cell::RefCell::new(Vec::new()));

        let n = notifications.clone();
        let seen_clone = seen.clone();
        let _e = effect(move || {
            seen_clone
                .borrow_mut()
                .push(n.latest().map(|n| n.message).unwrap_or_default());
        });

        notifications.error("boom");
        // Nothing expires: no re-run
        notifications.advance(Duration::from_millis(10));
        notifications.clear_all();

        assert_eq!(*seen.borrow(), vec!["", "boom", ""]);
    }

    #[test]
    fn test_icons() {
        assert_eq!(NotificationKind::Info.icon(), "ℹ");
        assert_eq!(NotificationKind::Error.icon(), "✗");
    }
}
