//! Dashboard configuration
//!
//! Loaded from a TOML file with every section optional, then adjusted by
//! `FLOWDASH_*` environment variables.
//!
//! ```toml
//! [ui]
//! tick_ms = 100
//! notification_timeout_ms = 3000
//! log_capacity = 200
//!
//! [tracker]
//! query = "assignee = currentUser()"
//! max_results = 50
//!
//! [fetch]
//! max_attempts = 3
//! initial_backoff_ms = 500
//! max_backoff_ms = 10000
//!
//! [logging]
//! level = "info"
//! file = "flowdash.log"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::state::RetryPolicy;
use crate::tracker::{default_fields, IssueQuery, DEFAULT_MAX_RESULTS, DEFAULT_QUERY};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from `path`. A missing file yields the defaults; an unreadable or
    /// malformed one is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(Error::Config(format!(
                "failed to read {}: {err}",
                path.display()
            ))),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `FLOWDASH_LOG_LEVEL`, `FLOWDASH_QUERY` and `FLOWDASH_TICK_MS`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("FLOWDASH_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(query) = lookup("FLOWDASH_QUERY") {
            self.tracker.query = query;
        }
        if let Some(tick) = lookup("FLOWDASH_TICK_MS") {
            match tick.parse() {
                Ok(ms) => self.ui.tick_ms = ms,
                Err(_) => tracing::warn!(value = %tick, "ignoring invalid FLOWDASH_TICK_MS"),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.ui.tick_ms == 0 {
            return Err(Error::Config("ui.tick_ms must be greater than 0".into()));
        }
        if self.ui.log_capacity == 0 {
            return Err(Error::Config("ui.log_capacity must be greater than 0".into()));
        }
        if self.tracker.query.trim().is_empty() {
            return Err(Error::Config("tracker.query cannot be empty".into()));
        }
        if self.tracker.max_results == 0 {
            return Err(Error::Config("tracker.max_results must be greater than 0".into()));
        }
        if self.fetch.max_attempts == 0 {
            return Err(Error::Config("fetch.max_attempts must be at least 1".into()));
        }
        if self.fetch.max_backoff_ms < self.fetch.initial_backoff_ms {
            return Err(Error::Config(
                "fetch.max_backoff_ms must not be below fetch.initial_backoff_ms".into(),
            ));
        }
        match self.logging.level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
            _ => Err(Error::Config(format!(
                "invalid log level: {}",
                self.logging.level
            ))),
        }
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.ui.tick_ms)
    }

    pub fn notification_timeout(&self) -> Duration {
        Duration::from_millis(self.ui.notification_timeout_ms)
    }

    pub fn query(&self) -> IssueQuery {
        IssueQuery {
            jql: self.tracker.query.clone(),
            max_results: self.tracker.max_results,
            fields: self.tracker.fields.clone(),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.fetch.max_attempts,
            initial_backoff: Duration::from_millis(self.fetch.initial_backoff_ms),
            multiplier: self.fetch.multiplier,
            max_backoff: Duration::from_millis(self.fetch.max_backoff_ms),
        }
    }
}

/// UI timing and buffer sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Event-loop poll interval.
    pub tick_ms: u64,
    pub notification_timeout_ms: u64,
    pub log_capacity: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            notification_timeout_ms: 3000,
            log_capacity: crate::state::DEFAULT_LOG_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub query: String,
    pub max_results: usize,
    pub fields: Vec<String>,
    /// Fixture file served instead of a live tracker.
    pub fixture: Option<PathBuf>,
    /// Cache lifetime for search results. Unset caches until reload.
    pub cache_ttl_secs: Option<u64>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            query: DEFAULT_QUERY.to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            fields: default_fields(),
            fixture: None,
            cache_ttl_secs: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub multiplier: f64,
    pub max_backoff_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            multiplier: policy.multiplier,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Log file. The terminal belongs to the dashboard, so logs never go to
    /// stdout; without a file logging stays off.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.tick(), Duration::from_millis(100));
        assert_eq!(config.query().jql, DEFAULT_QUERY);
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ui]\ntick_ms = 50\n\n[tracker]\nquery = \"project = FLOW\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.ui.tick_ms, 50);
        assert_eq!(config.ui.notification_timeout_ms, 3000);
        assert_eq!(config.tracker.query, "project = FLOW");
        assert_eq!(config.tracker.max_results, 50);
        assert_eq!(config.fetch, FetchConfig::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ui\ntick_ms = ").unwrap();
        assert!(matches!(Config::load(file.path()), Err(Error::ConfigParse(_))));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("FLOWDASH_LOG_LEVEL", "debug"),
            ("FLOWDASH_QUERY", "project = OPS"),
            ("FLOWDASH_TICK_MS", "nope"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.tracker.query, "project = OPS");
        assert_eq!(config.ui.tick_ms, 100);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.ui.tick_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = "loud".into();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        let mut config = Config::default();
        config.fetch.max_backoff_ms = 1;
        assert!(config.validate().is_err());
    }
}
