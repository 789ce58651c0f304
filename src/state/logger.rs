//! Reactive log store.
//!
//! Keeps the most recent entries in a bounded list that renderers can read,
//! and mirrors every entry to `tracing` so it also lands in the log file.

use chrono::{DateTime, Local};

use crate::reactive::Signal;

pub const DEFAULT_CAPACITY: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Log,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

/// Bounded reactive log. Oldest entries are evicted first.
pub struct LogStore {
    entries: Signal<Vec<LogEntry>>,
    capacity: usize,
}

impl LogStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Signal::new(Vec::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn push(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Log => tracing::debug!(target: "flowdash::log", "{message}"),
            LogLevel::Info => tracing::info!(target: "flowdash::log", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "flowdash::log", "{message}"),
            LogLevel::Error => tracing::error!(target: "flowdash::log", "{message}"),
        }
        let entry = LogEntry {
            level,
            message,
            timestamp: Local::now(),
        };
        let capacity = self.capacity;
        self.entries.update(|entries| {
            entries.push(entry);
            if entries.len() > capacity {
                let excess = entries.len() - capacity;
                entries.drain(..excess);
            }
        });
    }

    pub fn log(&self, message: impl Into<String>) {
        self.push(LogLevel::Log, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.push(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(LogLevel::Error, message);
    }

    pub fn clear(&self) {
        self.entries.set(Vec::new());
    }

    /// Entries oldest first (tracked).
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.get()
    }

    /// Newest entry (tracked).
    pub fn latest(&self) -> Option<LogEntry> {
        self.entries.with(|entries| entries.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.entries.with_untracked(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for LogStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eviction_keeps_newest() {
        let logs = LogStore::new(3);
        for i in 0..5 {
            logs.info(format!("line {i}"));
        }
        let messages: Vec<String> = logs.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec!["line 2", "line 3", "line 4"]);
    }

    #[test]
    fn test_levels_and_latest() {
        let logs = LogStore::default();
        assert!(logs.latest().is_none());
        logs.log("a");
        logs.warn("b");
        logs.error("c");
        let latest = logs.latest().unwrap();
        assert_eq!(latest.level, LogLevel::Error);
        assert_eq!(latest.message, "c");
        assert_eq!(logs.len(), 3);

        logs.clear();
        assert!(logs.is_empty());
    }

    #[test]
    fn test_zero_capacity_keeps_one() {
        let logs = LogStore::new(0);
        logs.info("x");
        logs.info("y");
        assert_eq!(logs.capacity(), 1);
        assert_eq!(logs.latest().unwrap().message, "y");
    }
}
