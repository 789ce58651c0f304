//! Commands - named actions run from Command mode.
//!
//! A command line is split on whitespace; the first word picks the command
//! and the rest are passed to it as arguments.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::error::{Error, Result};

pub type CommandHandler = Rc<dyn Fn(&[&str]) -> Result<()>>;

#[derive(Clone)]
pub struct Command {
    pub name: String,
    pub description: String,
    handler: CommandHandler,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct Commands {
    commands: RefCell<BTreeMap<String, Command>>,
}

impl Commands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any existing one with the same name.
    pub fn register<F>(&self, name: impl Into<String>, description: impl Into<String>, handler: F)
    where
        F: Fn(&[&str]) -> Result<()> + 'static,
    {
        let name = name.into();
        let command = Command {
            name: name.clone(),
            description: description.into(),
            handler: Rc::new(handler),
        };
        self.commands.borrow_mut().insert(name, command);
    }

    pub fn unregister(&self, name: &str) {
        self.commands.borrow_mut().remove(name);
    }

    /// Parse and run a command line. A blank line does nothing.
    pub fn execute(&self, line: &str) -> Result<()> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(());
        };
        let args: Vec<&str> = words.collect();

        let handler = self
            .commands
            .borrow()
            .get(name)
            .map(|command| command.handler.clone())
            .ok_or_else(|| Error::CommandNotFound(name.to_string()))?;

        tracing::debug!(command = name, ?args, "execute command");
        handler(&args)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.borrow().contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.commands.borrow().keys().cloned().collect()
    }

    pub fn list(&self) -> Vec<Command> {
        self.commands.borrow().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_execute_splits_args() {
        let commands = Commands::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_clone = seen.clone();
        commands.register("open", "Open an issue", move |args| {
            seen_clone
                .borrow_mut()
                .extend(args.iter().map(|a| a.to_string()));
            Ok(())
        });

        commands.execute("  open   FLOW-12  now ").unwrap();
        assert_eq!(*seen.borrow(), vec!["FLOW-12", "now"]);
    }

    #[test]
    fn test_unknown_command() {
        let commands = Commands::new();
        let err = commands.execute("nope 1 2").unwrap_err();
        assert!(matches!(err, Error::CommandNotFound(ref name) if name == "nope"));
        assert_eq!(err.to_string(), "Command not found: nope");
    }

    #[test]
    fn test_blank_line_is_noop() {
        let commands = Commands::new();
        assert!(commands.execute("   ").is_ok());
    }

    #[test]
    fn test_handler_error_propagates() {
        let commands = Commands::new();
        commands.register("fail", "Always fails", |_| {
            Err(Error::Command {
                name: "fail".into(),
                message: "nope".into(),
            })
        });
        assert!(matches!(commands.execute("fail"), Err(Error::Command { .. })));
    }

    #[test]
    fn test_register_unregister_names() {
        let commands = Commands::new();
        commands.register("reload", "Reload issues", |_| Ok(()));
        commands.register("help", "Show help", |_| Ok(()));
        assert_eq!(commands.names(), vec!["help", "reload"]);
        assert_eq!(commands.list()[0].description, "Show help");

        commands.unregister("help");
        assert!(!commands.contains("help"));
        assert!(commands.contains("reload"));
    }
}
