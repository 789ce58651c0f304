//! Application context - the service objects one dashboard runs on.

use std::rc::Rc;

use crate::config::Config;
use crate::layout::LayoutManager;
use crate::reactive::{watch, Effect};
use crate::state::{Commands, Keybindings, LogStore, ModeState, Notifications, Prompt};
use crate::terminal::{SharedSurface, Terminal};

/// Everything an [`App`](super::App) and its setup code share.
///
/// Services are built once and handed out by `Rc`. The context also keeps
/// layout in step with the terminal: every resize marks all blocks dirty
/// before anything registered later reacts to it.
pub struct AppContext {
    pub config: Config,
    pub terminal: Rc<Terminal>,
    pub layout: Rc<LayoutManager>,
    pub modes: Rc<ModeState>,
    pub keys: Rc<Keybindings>,
    pub notifications: Rc<Notifications>,
    pub logs: Rc<LogStore>,
    pub commands: Rc<Commands>,
    pub prompt: Rc<Prompt>,
    _layout_watcher: Effect,
}

impl AppContext {
    pub fn new(surface: SharedSurface, config: Config) -> Self {
        let terminal = Rc::new(Terminal::new(surface));
        let layout = Rc::new(LayoutManager::new());

        let width = terminal.width_signal();
        let height = terminal.height_signal();
        let watched = layout.clone();
        let layout_watcher = watch(
            move || (width.get(), height.get()),
            move |(w, h), _| {
                tracing::debug!(width = w, height = h, "terminal resized");
                watched.mark_all_dirty();
            },
        );

        Self {
            notifications: Rc::new(Notifications::with_default_timeout(
                config.notification_timeout(),
            )),
            logs: Rc::new(LogStore::new(config.ui.log_capacity)),
            terminal,
            layout,
            modes: Rc::new(ModeState::default()),
            keys: Rc::new(Keybindings::new()),
            commands: Rc::new(Commands::new()),
            prompt: Rc::new(Prompt::new()),
            config,
            _layout_watcher: layout_watcher,
        }
    }

    /// Current terminal size, untracked.
    pub fn size(&self) -> (u16, u16) {
        (
            self.terminal.width_signal().get_untracked(),
            self.terminal.height_signal().get_untracked(),
        )
    }
}
