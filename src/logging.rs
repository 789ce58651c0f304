//! Tracing subscriber setup.
//!
//! The dashboard owns stdout, so log output goes to a file or nowhere.
//! `RUST_LOG` takes precedence over the configured level.

use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Filter from `RUST_LOG`, falling back to `level`.
pub fn filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|err| Error::Config(format!("invalid log level '{level}': {err}"))),
    }
}

/// Install the global subscriber. Returns `Ok(false)` when no log file is
/// configured or a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<bool> {
    let Some(path) = config.file.as_ref() else {
        return Ok(false);
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter(&config.level)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .is_ok();
    if installed {
        tracing::info!(path = %path.display(), level = %config.level, "logging started");
    }
    Ok(installed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_file_means_no_subscriber() {
        assert!(!init(&LoggingConfig::default()).unwrap());
    }

    #[test]
    fn test_filter_accepts_levels() {
        assert!(EnvFilter::try_new("debug").is_ok());
        assert!(EnvFilter::try_new("flowdash=trace,info").is_ok());
    }

    #[test]
    fn test_unwritable_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "info".into(),
            file: Some(dir.path().join("missing").join("flowdash.log")),
        };
        assert!(matches!(init(&config), Err(Error::Io(_))));
    }
}
