//! State Module - the dashboard's runtime services
//!
//! - **Mode** - the current input mode and its change listeners
//! - **Keybindings** - mode-first key dispatch
//! - **Global keys** - the default modal key map
//! - **Notifications** - self-expiring status messages
//! - **Logger** - bounded reactive log mirrored to tracing
//! - **Async data** - background fetches delivered into signals
//! - **Commands** - named actions for Command mode
//! - **Prompt** - the editable command line

mod async_data;
mod commands;
pub mod global_keys;
mod keybindings;
mod logger;
mod mode;
mod notifications;
mod prompt;

pub use async_data::{AsyncData, FetchError, RetryPolicy};
pub use commands::{Command, CommandHandler, Commands};
pub use global_keys::{setup_global_keys, GlobalKeysHandle};
pub use keybindings::{KeyHandler, Keybindings};
pub use logger::{LogEntry, LogLevel, LogStore, DEFAULT_CAPACITY as DEFAULT_LOG_CAPACITY};
pub use mode::{InputMode, ModeState};
pub use notifications::{Notification, NotificationKind, Notifications, DEFAULT_TIMEOUT};
pub use prompt::Prompt;
