//! Error types.

use thiserror::Error;

/// Everything that can go wrong outside of a render pass.
#[derive(Debug, Error)]
pub enum Error {
    #[error("block '{0}' already exists")]
    DuplicateBlock(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Command not found: {0}")]
    CommandNotFound(String),

    #[error("command '{name}' failed: {message}")]
    Command { name: String, message: String },

    #[error("issue tracker error: {0}")]
    Tracker(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            Error::DuplicateBlock("header".into()).to_string(),
            "block 'header' already exists"
        );
        assert_eq!(
            Error::CommandNotFound("frobnicate".into()).to_string(),
            "Command not found: frobnicate"
        );
    }

    #[test]
    fn test_io_conversion() {
        fn open() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))?;
            Ok(())
        }
        assert!(matches!(open(), Err(Error::Io(_))));
    }
}
