//! The issue dashboard - blocks, bindings, keys and commands on top of an [`App`].
//!
//! ```text
//! row 0
//! ┌──────────────── header ────────────────┐  y = 1, h = 3
//! │ Flowdash Flow Control Center  Issues: 4│
//! └────────────────────────────────────────┘
//! ┌──────────────── content ───────────────┐  y = 4, h = height - 6
//! │ Your Open Sub-Tasks:                   │
//! └────────────────────────────────────────┘
//!  status bar                                 y = height - 2 (footer)
//!  prompt / loader                            y = height - 1
//! ```
//!
//! # Example
//!
//! ```ignore
//! let mut dashboard = None;
//! app.launch(|app| {
//!     dashboard = Some(Dashboard::setup(app, source, &args)?);
//!     Ok(())
//! })?;
//! app.run_loop(&mut CrosstermEvents)?;
//! ```

use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::layout::{Block, BlockConfig, BlockDimensions, LayoutManager};
use crate::pipeline::{App, AppContext};
use crate::reactive::{effect_on, signal, watch, Effect, Signal};
use crate::renderer::{
    BindOptions, BlockBinding, HeaderData, HeaderRenderer, InputData, InputRenderer,
    IssueListData, IssueListRenderer, LoaderData, LoaderRenderer, Notice, Renderer,
    SelectableListRenderer, StatusBarData, StatusBarRenderer,
};
use crate::state::{
    setup_global_keys, AsyncData, GlobalKeysHandle, InputMode, KeyHandler, NotificationKind,
};
use crate::terminal::{KeyboardEvent, Surface};
use crate::tracker::{Issue, IssueSource};
use crate::types::Cleanup;

pub const HEADER: &str = "header";
pub const CONTENT: &str = "content";
pub const FOOTER: &str = "footer";
pub const PROMPT: &str = "prompt";

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 3;
const HELP: &str = "Press r=reload, /=command, f=select, q=quit";
const HELP_TIMEOUT: Duration = Duration::from_millis(5000);

// =============================================================================
// Layout
// =============================================================================

/// Block frames for a terminal of the given size: header, content, footer
/// and the prompt line inside the footer.
pub fn frames(width: u16, height: u16) -> [BlockConfig; 4] {
    let footer_y = height.saturating_sub(2);
    [
        BlockConfig::new(HEADER, 0, 1, width, HEADER_HEIGHT).bordered(),
        BlockConfig::new(
            CONTENT,
            0,
            1 + HEADER_HEIGHT,
            width,
            height.saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT),
        )
        .bordered(),
        BlockConfig::new(FOOTER, 0, footer_y, width, FOOTER_HEIGHT),
        BlockConfig::new(PROMPT, 0, footer_y + 1, width, 1),
    ]
}

#[derive(Debug, Clone)]
pub struct DashboardBlocks {
    pub header: Block,
    pub content: Block,
    pub footer: Block,
    pub prompt: Block,
}

impl DashboardBlocks {
    pub fn create(layout: &LayoutManager, width: u16, height: u16) -> Result<Self> {
        let [header, content, footer, prompt] = frames(width, height);
        Ok(Self {
            header: layout.add_block(header)?,
            content: layout.add_block(content)?,
            footer: layout.add_block(footer)?,
            prompt: layout.add_block(prompt)?,
        })
    }

    /// Move every block to its frame for the new size.
    pub fn relayout(&self, width: u16, height: u16) {
        let blocks = [&self.header, &self.content, &self.footer, &self.prompt];
        for (block, frame) in blocks.into_iter().zip(frames(width, height)) {
            block.set_dimensions(frame.x, frame.y, frame.width, frame.height);
        }
    }
}

// =============================================================================
// Prompt line
// =============================================================================

/// The bottom line: the command prompt in Command mode, a fetch spinner
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptLine {
    Input(InputData),
    Loader(LoaderData),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptLineRenderer {
    loader: LoaderRenderer,
}

impl Renderer for PromptLineRenderer {
    type Data = PromptLine;

    fn render(&self, surface: &mut dyn Surface, data: &PromptLine, dims: &BlockDimensions) {
        match data {
            PromptLine::Input(input) => InputRenderer.render(surface, input, dims),
            PromptLine::Loader(loader) => {
                surface.set_cursor_visible(false);
                self.loader.render(surface, loader, dims);
            }
        }
    }

    fn clear(&self, surface: &mut dyn Surface, dims: &BlockDimensions) {
        InputRenderer.clear(surface, dims);
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// A dashboard wired onto an app. Dropping it stops its watchers; the
/// bindings live as long as the app's render callback.
pub struct Dashboard {
    pub blocks: DashboardBlocks,
    pub issues: Rc<AsyncData<Vec<Issue>>>,
    frame: Signal<usize>,
    _effects: Vec<Effect>,
    cleanups: Vec<Cleanup>,
    global_keys: Option<GlobalKeysHandle>,
}

impl Dashboard {
    /// Build the dashboard, start the first fetch and run `args` as a
    /// command line if there are any.
    pub fn setup(app: &App, source: Arc<dyn IssueSource>, args: &[String]) -> Result<Self> {
        let ctx = app.context().clone();
        let (width, height) = ctx.size();
        let blocks = DashboardBlocks::create(&ctx.layout, width, height)?;
        let mut effects = Vec::new();
        let mut cleanups = Vec::new();

        // Keep blocks in step with the terminal
        {
            let blocks = blocks.clone();
            let w = ctx.terminal.width_signal();
            let h = ctx.terminal.height_signal();
            effects.push(watch(
                move || (w.get(), h.get()),
                move |&(width, height), _| blocks.relayout(width, height),
            ));
        }

        // ----- Data -----

        let query = ctx.config.query();
        let issues = {
            let source = source.clone();
            let query = query.clone();
            Rc::new(AsyncData::new(
                move || source.search(&query),
                ctx.config.retry_policy(),
            ))
        };

        {
            let logs = ctx.logs.clone();
            let notifications = ctx.notifications.clone();
            effects.push(watch(
                {
                    let issues = issues.clone();
                    move || issues.error()
                },
                move |error, _| {
                    if let Some(error) = error {
                        logs.error(format!("Error fetching issues: {}", error.message));
                        notifications.error(format!("Error: {}", error.message));
                    }
                },
            ));
        }

        {
            let logs = ctx.logs.clone();
            let data = issues.data_signal();
            let dependency = data.clone();
            let mut first = true;
            effects.push(effect_on(&[&dependency], move || {
                if std::mem::take(&mut first) {
                    return;
                }
                let count = data.with_untracked(|d| d.as_ref().map_or(0, Vec::len));
                logs.log(format!("Loaded {count} issues"));
            }));
        }

        // ----- Bindings -----

        let surface = ctx.terminal.surface().clone();
        let reactive = BindOptions { reactive: true };
        let frame = signal(0usize);

        let header = BlockBinding::bind(
            blocks.header.clone(),
            HeaderRenderer,
            surface.clone(),
            Some({
                let issues = issues.clone();
                Rc::new(move || {
                    let count = issues.data().map_or(0, |d| d.len());
                    HeaderData::new("Flowdash")
                        .subtitle("Flow Control Center")
                        .context(format!("Issues: {count}"))
                })
            }),
            reactive,
        );

        let content = BlockBinding::bind(
            blocks.content.clone(),
            IssueListRenderer,
            surface.clone(),
            Some({
                let issues = issues.clone();
                let modes = ctx.modes.clone();
                Rc::new(move || IssueListData {
                    issues: issues.data().unwrap_or_default(),
                    loading: issues.loading(),
                    show_markers: modes.mode() == InputMode::Select,
                })
            }),
            reactive,
        );

        let footer = BlockBinding::bind(
            blocks.footer.clone(),
            StatusBarRenderer,
            surface.clone(),
            Some({
                let modes = ctx.modes.clone();
                let logs = ctx.logs.clone();
                let notifications = ctx.notifications.clone();
                Rc::new(move || StatusBarData {
                    mode: modes.mode(),
                    message: logs.latest().map(|entry| entry.message),
                    notice: notifications.latest().as_ref().map(Notice::from),
                })
            }),
            reactive,
        );

        let prompt_line = BlockBinding::bind(
            blocks.prompt.clone(),
            PromptLineRenderer::default(),
            surface,
            Some({
                let modes = ctx.modes.clone();
                let prompt = ctx.prompt.clone();
                let issues = issues.clone();
                let frame = frame.clone();
                Rc::new(move || {
                    if modes.mode() == InputMode::Command {
                        PromptLine::Input(InputData {
                            prompt: ":".into(),
                            value: prompt.value(),
                            placeholder: Some("command".into()),
                            cursor: Some(prompt.cursor()),
                        })
                    } else {
                        PromptLine::Loader(LoaderData {
                            loading: issues.loading(),
                            message: "Fetching issues".into(),
                            frame: frame.get(),
                        })
                    }
                })
            }),
            reactive,
        );

        cleanups.push(app.on_render(move || {
            header.render();
            content.render();
            footer.render();
            prompt_line.render();
        }));

        {
            let notifications = ctx.notifications.clone();
            let issues = issues.clone();
            let frame = frame.clone();
            cleanups.push(app.on_tick(move |elapsed| {
                notifications.advance(elapsed);
                issues.poll();
                if issues.loading_signal().get_untracked() {
                    frame.update(|f| *f = f.wrapping_add(1));
                }
            }));
        }

        // ----- Keys -----

        let quit = {
            let app = app.weak();
            move || {
                if let Some(app) = app.upgrade() {
                    app.exit();
                }
            }
        };
        let global_keys = setup_global_keys(&ctx.keys, &ctx.modes, quit);

        let reload: KeyHandler = {
            let logs = ctx.logs.clone();
            let issues = issues.clone();
            let source = source.clone();
            let query = query.clone();
            Rc::new(move || {
                logs.log("Reloading issues...");
                source.invalidate(&query);
                issues.refresh();
            })
        };
        let help: KeyHandler = {
            let notifications = ctx.notifications.clone();
            Rc::new(move || {
                notifications.notify_for(HELP, NotificationKind::Info, HELP_TIMEOUT);
            })
        };
        cleanups.push(ctx.keys.bind_mode(InputMode::Normal, [("r", reload.clone()), ("h", help)]));

        {
            let prompt = ctx.prompt.clone();
            cleanups.push(ctx.modes.on_mode_change(move |mode| {
                if mode != InputMode::Command {
                    prompt.clear();
                }
            }));
        }

        {
            let ctx = ctx.clone();
            let issues = issues.clone();
            cleanups.push(app.on_unhandled_key(move |event| match ctx.modes.signal().get_untracked() {
                InputMode::Command => {
                    if event.name() == "Enter" {
                        let line = ctx.prompt.take();
                        ctx.modes.set_mode(InputMode::Normal);
                        if let Err(err) = ctx.commands.execute(&line) {
                            ctx.logs.error(err.to_string());
                            ctx.notifications.error(err.to_string());
                        }
                    } else {
                        ctx.prompt.handle_key(event);
                    }
                }
                InputMode::Select => select_by_marker(&ctx, &issues, event),
                mode => tracing::trace!(key = %event.name(), %mode, "unhandled key"),
            }));
        }

        // ----- Commands -----

        {
            let reload = reload.clone();
            ctx.commands.register("reload", "Reload issues", move |_| {
                reload();
                Ok(())
            });
        }
        {
            let logs = ctx.logs.clone();
            let notifications = ctx.notifications.clone();
            let issues = issues.clone();
            ctx.commands.register("open", "Open issue by key or number", move |args| {
                let Some(id) = args.first() else {
                    return Err(Error::Command {
                        name: "open".into(),
                        message: "missing issue id".into(),
                    });
                };
                logs.log(format!("Searching: {id}"));
                match find_issue(&issues.data_signal().get_untracked().unwrap_or_default(), id) {
                    Some(issue) => {
                        notifications.info(format!("{}: {}", issue.key, issue.fields.summary));
                    }
                    None => {
                        notifications.warning(format!("No issue matching {id}"));
                    }
                }
                Ok(())
            });
        }
        {
            let logs = ctx.logs.clone();
            let commands = Rc::downgrade(&ctx.commands);
            ctx.commands.register("help", "List commands", move |_| {
                if let Some(commands) = commands.upgrade() {
                    let names = commands.names().join(", ");
                    logs.info(format!("Commands: {names}"));
                }
                Ok(())
            });
        }
        for name in ["reload", "open", "help"] {
            let commands = ctx.commands.clone();
            cleanups.push(Box::new(move || commands.unregister(name)));
        }

        issues.refresh();

        let dashboard = Self {
            blocks,
            issues,
            frame,
            _effects: effects,
            cleanups,
            global_keys: Some(global_keys),
        };

        if !args.is_empty() {
            ctx.commands.execute(&args.join(" "))?;
        }
        Ok(dashboard)
    }

    /// Spinner frame counter.
    pub fn frame(&self) -> usize {
        self.frame.get_untracked()
    }

    /// Remove every callback and binding the dashboard installed.
    pub fn teardown(mut self) {
        for cleanup in self.cleanups.drain(..) {
            cleanup();
        }
        if let Some(handle) = self.global_keys.take() {
            handle.cleanup();
        }
    }
}

fn select_by_marker(ctx: &AppContext, issues: &AsyncData<Vec<Issue>>, event: &KeyboardEvent) {
    let Some(index) = event
        .printable()
        .and_then(|ch| SelectableListRenderer::index_for_marker(&ch.to_string()))
    else {
        return;
    };
    let selected = issues
        .data_signal()
        .with_untracked(|data| data.as_ref().and_then(|list| list.get(index).cloned()));
    if let Some(issue) = selected {
        ctx.logs.log(format!("Selected {}: {}", issue.key, issue.fields.summary));
        ctx.modes.set_mode(InputMode::Normal);
    }
}

/// Match a full key (`FLOW-12`, any case) or just its number (`12`).
fn find_issue<'a>(issues: &'a [Issue], id: &str) -> Option<&'a Issue> {
    issues.iter().find(|issue| {
        issue.key.eq_ignore_ascii_case(id)
            || issue
                .key
                .rsplit_once('-')
                .is_some_and(|(_, number)| number == id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::sample_issue;

    #[test]
    fn test_frames_at_80_by_24() {
        let [header, content, footer, prompt] = frames(80, 24);
        assert_eq!((header.y, header.height, header.has_border), (1, 3, true));
        assert_eq!((content.y, content.height, content.has_border), (4, 18, true));
        assert_eq!((footer.y, footer.height, footer.has_border), (22, 3, false));
        assert_eq!((prompt.y, prompt.height), (23, 1));
    }

    #[test]
    fn test_frames_tiny_terminal() {
        let [_, content, footer, _] = frames(10, 3);
        assert_eq!(content.height, 0);
        assert_eq!(footer.y, 1);
    }

    #[test]
    fn test_find_issue() {
        let issues = vec![
            sample_issue("FLOW-12", "twelve", "Open"),
            sample_issue("OPS-3", "three", "Open"),
        ];
        assert_eq!(find_issue(&issues, "flow-12").unwrap().key, "FLOW-12");
        assert_eq!(find_issue(&issues, "3").unwrap().key, "OPS-3");
        assert!(find_issue(&issues, "4").is_none());
    }
}
