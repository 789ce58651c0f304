//! App - render scheduling, input wiring and lifecycle.
//!
//! # Example
//!
//! ```ignore
//! use flowdash::pipeline::{App, AppContext, AppOptions};
//!
//! let ctx = Rc::new(AppContext::new(surface, config));
//! let app = App::new(ctx.clone(), AppOptions::default());
//!
//! app.launch(|app| {
//!     let header = /* BlockBinding */;
//!     let _ = app.on_render(move || header.render());
//!     Ok(())
//! })?;
//!
//! app.run_loop(&mut CrosstermEvents)?;
//! app.cleanup();
//! ```

use std::cell::{Cell, RefCell};
use std::io;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use super::context::AppContext;
use crate::error::Result;
use crate::reactive::{watch, Effect};
use crate::registry::Registry;
use crate::terminal::{EventSource, KeyboardEvent};
use crate::types::Cleanup;

type RenderCallback = dyn Fn();
type TickCallback = dyn Fn(Duration);
type KeyCallback = dyn Fn(&KeyboardEvent);

// =============================================================================
// Options
// =============================================================================

#[derive(Default)]
pub struct AppOptions {
    /// Runs once, during the first cleanup.
    pub on_exit: Option<Box<dyn FnOnce()>>,
}

impl AppOptions {
    pub fn on_exit(mut self, f: impl FnOnce() + 'static) -> Self {
        self.on_exit = Some(Box::new(f));
        self
    }
}

// =============================================================================
// App
// =============================================================================

/// The running dashboard.
///
/// Created behind an `Rc` because the key listener and resize watcher it
/// installs hold weak references back to it.
pub struct App {
    ctx: Rc<AppContext>,
    weak_self: Weak<App>,
    render_callbacks: Registry<RenderCallback>,
    tick_callbacks: Registry<TickCallback>,
    unhandled_key_callbacks: Registry<KeyCallback>,
    key_cleanup: RefCell<Option<Cleanup>>,
    resize_watcher: RefCell<Option<Effect>>,
    on_exit: RefCell<Option<Box<dyn FnOnce()>>>,
    running: Cell<bool>,
    exit_requested: Cell<bool>,
    rendering: Cell<bool>,
}

impl App {
    pub fn new(ctx: Rc<AppContext>, options: AppOptions) -> Rc<Self> {
        Rc::new_cyclic(|weak_self| Self {
            ctx,
            weak_self: weak_self.clone(),
            render_callbacks: Registry::new(),
            tick_callbacks: Registry::new(),
            unhandled_key_callbacks: Registry::new(),
            key_cleanup: RefCell::new(None),
            resize_watcher: RefCell::new(None),
            on_exit: RefCell::new(options.on_exit),
            running: Cell::new(false),
            exit_requested: Cell::new(false),
            rendering: Cell::new(false),
        })
    }

    pub fn context(&self) -> &Rc<AppContext> {
        &self.ctx
    }

    /// Weak handle for callbacks that need to reach the app later.
    pub fn weak(&self) -> Weak<App> {
        self.weak_self.clone()
    }

    // =========================================================================
    // Callbacks
    // =========================================================================

    /// Add a callback to every frame. Callbacks run in registration order.
    pub fn on_render(&self, callback: impl Fn() + 'static) -> Cleanup {
        self.render_callbacks.add(Rc::new(callback))
    }

    /// Add a callback to every event-loop iteration; it receives the time
    /// since the previous iteration.
    pub fn on_tick(&self, callback: impl Fn(Duration) + 'static) -> Cleanup {
        self.tick_callbacks.add(Rc::new(callback))
    }

    /// Add a fallback for key presses no binding handled.
    pub fn on_unhandled_key(&self, callback: impl Fn(&KeyboardEvent) + 'static) -> Cleanup {
        self.unhandled_key_callbacks.add(Rc::new(callback))
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Draw one full frame: clear, run every render callback, reset the
    /// style and flush.
    ///
    /// A render callback that triggers another render is ignored.
    pub fn render(&self) -> io::Result<()> {
        if self.rendering.replace(true) {
            tracing::warn!("render requested while rendering, skipped");
            return Ok(());
        }
        struct Reset<'a>(&'a Cell<bool>);
        impl Drop for Reset<'_> {
            fn drop(&mut self) {
                self.0.set(false);
            }
        }
        let _reset = Reset(&self.rendering);

        let surface = self.ctx.terminal.surface().clone();
        surface.borrow_mut().clear();
        for callback in self.render_callbacks.snapshot() {
            callback();
        }
        let mut surface = surface.borrow_mut();
        surface.style_reset();
        surface.flush()
    }

    fn handle_key(&self, event: &KeyboardEvent) {
        let key = event.name();
        let mode = self.ctx.modes.signal().get_untracked();
        if self.ctx.keys.dispatch(&key, mode) {
            return;
        }
        for callback in self.unhandled_key_callbacks.snapshot() {
            callback(event);
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Take over the terminal, wire input and resize handling and draw the
    /// first frame. Calling it again while running does nothing.
    pub fn run(&self) -> io::Result<()> {
        if self.running.get() {
            return Ok(());
        }
        self.running.set(true);
        self.exit_requested.set(false);
        self.ctx.terminal.acquire();

        let weak = self.weak_self.clone();
        let cleanup = self.ctx.terminal.on_key(move |event| {
            if let Some(app) = weak.upgrade() {
                app.handle_key(event);
            }
        });
        *self.key_cleanup.borrow_mut() = Some(cleanup);

        let width = self.ctx.terminal.width_signal();
        let height = self.ctx.terminal.height_signal();
        let weak = self.weak_self.clone();
        let watcher = watch(
            move || (width.get(), height.get()),
            move |_, _| {
                if let Some(app) = weak.upgrade() {
                    if let Err(err) = app.render() {
                        tracing::warn!(error = %err, "render after resize failed");
                    }
                }
            },
        );
        *self.resize_watcher.borrow_mut() = Some(watcher);

        tracing::info!(size = ?self.ctx.size(), "app started");
        self.render()
    }

    /// Run `setup`, then [`App::run`]. If either fails the app is cleaned up
    /// before the error is returned.
    pub fn launch(&self, setup: impl FnOnce(&App) -> Result<()>) -> Result<()> {
        let result = setup(self).and_then(|()| Ok(self.run()?));
        if let Err(err) = &result {
            tracing::error!(error = %err, "launch failed");
            self.cleanup();
        }
        result
    }

    /// Poll `events` until an exit is requested.
    ///
    /// Each iteration routes at most one event, runs the tick callbacks and
    /// flushes whatever reactive bindings drew in between.
    pub fn run_loop(&self, events: &mut dyn EventSource) -> io::Result<()> {
        let tick = self.ctx.config.tick();
        let mut last = Instant::now();
        while self.is_running() {
            if let Some(event) = events.poll_event(tick)? {
                self.ctx.terminal.handle_event(&event);
            }
            let now = Instant::now();
            let elapsed = now - last;
            last = now;
            for callback in self.tick_callbacks.snapshot() {
                callback(elapsed);
            }
            self.ctx.terminal.surface().borrow_mut().flush()?;
        }
        Ok(())
    }

    /// Ask [`App::run_loop`] to return after the current iteration.
    pub fn request_exit(&self) {
        self.exit_requested.set(true);
    }

    pub fn is_running(&self) -> bool {
        self.running.get() && !self.exit_requested.get()
    }

    /// Stop the event loop and clean up.
    pub fn exit(&self) {
        self.request_exit();
        self.cleanup();
    }

    /// Unwire input, stop the resize watcher, drop all key bindings, restore
    /// the terminal and run `on_exit`. Only the first call has any effect on
    /// `on_exit`; the rest are no-ops.
    pub fn cleanup(&self) {
        self.request_exit();
        self.running.set(false);

        if let Some(cleanup) = self.key_cleanup.borrow_mut().take() {
            cleanup();
        }
        if let Some(watcher) = self.resize_watcher.borrow_mut().take() {
            watcher.dispose();
        }
        self.ctx.keys.clear();
        self.ctx.terminal.release();

        let on_exit = self.on_exit.borrow_mut().take();
        if let Some(on_exit) = on_exit {
            tracing::info!("app exited");
            on_exit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::Error;
    use crate::state::InputMode;
    use crate::terminal::{InputEvent, MemorySurface, ScriptedEvents, SharedSurface, Surface};

    fn setup(width: u16, height: u16) -> (Rc<RefCell<MemorySurface>>, Rc<AppContext>) {
        let surface = Rc::new(RefCell::new(MemorySurface::new(width, height)));
        let shared: SharedSurface = surface.clone();
        (surface, Rc::new(AppContext::new(shared, Config::default())))
    }

    fn counter() -> (Rc<Cell<usize>>, Rc<Cell<usize>>) {
        let c = Rc::new(Cell::new(0));
        (c.clone(), c)
    }

    #[test]
    fn test_render_runs_callbacks_in_order() {
        let (surface, ctx) = setup(20, 3);
        let app = App::new(ctx.clone(), AppOptions::default());
        let order = Rc::new(RefCell::new(Vec::new()));

        let (o1, o2) = (order.clone(), order.clone());
        let s1 = ctx.terminal.surface().clone();
        let _a = app.on_render(move || {
            o1.borrow_mut().push("a");
            s1.borrow_mut().write_at(0, 0, "first");
        });
        let remove_b = app.on_render(move || o2.borrow_mut().push("b"));

        app.render().unwrap();
        assert_eq!(*order.borrow(), vec!["a", "b"]);
        assert_eq!(surface.borrow().line(0), "first");
        assert_eq!(surface.borrow().clear_count(), 1);
        assert_eq!(surface.borrow().flush_count(), 1);

        remove_b();
        app.render().unwrap();
        assert_eq!(*order.borrow(), vec!["a", "b", "a"]);
    }

    #[test]
    fn test_nested_render_is_skipped() {
        let (surface, ctx) = setup(10, 2);
        let app = App::new(ctx, AppOptions::default());
        let (runs, runs_clone) = counter();
        let weak = Rc::downgrade(&app);
        let _r = app.on_render(move || {
            runs_clone.set(runs_clone.get() + 1);
            if let Some(app) = weak.upgrade() {
                app.render().unwrap();
            }
        });
        app.render().unwrap();
        assert_eq!(runs.get(), 1);
        assert_eq!(surface.borrow().clear_count(), 1);
    }

    #[test]
    fn test_run_acquires_and_renders() {
        let (surface, ctx) = setup(20, 5);
        let app = App::new(ctx.clone(), AppOptions::default());
        app.run().unwrap();

        assert!(app.is_running());
        assert!(ctx.terminal.is_acquired());
        assert!(surface.borrow().is_fullscreen());
        assert_eq!(ctx.terminal.key_listener_count(), 1);
        assert_eq!(surface.borrow().clear_count(), 1);

        // Second run is a no-op
        app.run().unwrap();
        assert_eq!(ctx.terminal.key_listener_count(), 1);
    }

    #[test]
    fn test_keys_dispatch_with_current_mode() {
        let (_, ctx) = setup(20, 5);
        let app = App::new(ctx.clone(), AppOptions::default());
        let (hits, hits_clone) = counter();
        ctx.keys
            .register_for_mode(InputMode::Select, "q", move || hits_clone.set(hits_clone.get() + 1));
        let unhandled = Rc::new(RefCell::new(Vec::new()));
        let unhandled_clone = unhandled.clone();
        let _u = app.on_unhandled_key(move |event| unhandled_clone.borrow_mut().push(event.name()));
        app.run().unwrap();

        ctx.terminal.handle_event(&InputEvent::Key(KeyboardEvent::new("q")));
        assert_eq!(hits.get(), 0);
        assert_eq!(*unhandled.borrow(), vec!["q".to_string()]);

        ctx.modes.set_mode(InputMode::Select);
        ctx.terminal.handle_event(&InputEvent::Key(KeyboardEvent::new("q")));
        assert_eq!(hits.get(), 1);
        assert_eq!(unhandled.borrow().len(), 1);
    }

    #[test]
    fn test_resize_rerenders_once() {
        let (surface, ctx) = setup(20, 5);
        let app = App::new(ctx.clone(), AppOptions::default());
        app.run().unwrap();
        assert_eq!(surface.borrow().clear_count(), 1);

        ctx.terminal.set_size(30, 8);
        assert_eq!(surface.borrow().clear_count(), 2);

        ctx.terminal.handle_event(&InputEvent::Resize(30, 8));
        assert_eq!(surface.borrow().clear_count(), 2);
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let (surface, ctx) = setup(20, 5);
        let (exits, exits_clone) = counter();
        let app = App::new(
            ctx.clone(),
            AppOptions::default().on_exit(move || exits_clone.set(exits_clone.get() + 1)),
        );
        app.run().unwrap();

        app.cleanup();
        app.cleanup();
        assert_eq!(exits.get(), 1);
        assert!(!app.is_running());
        assert!(!ctx.terminal.is_acquired());
        assert!(!surface.borrow().is_fullscreen());
        assert_eq!(ctx.terminal.key_listener_count(), 0);

        // No more frames on resize
        ctx.terminal.set_size(40, 10);
        assert_eq!(surface.borrow().clear_count(), 1);
    }

    #[test]
    fn test_launch_failure_cleans_up() {
        let (_, ctx) = setup(20, 5);
        let (exits, exits_clone) = counter();
        let app = App::new(
            ctx.clone(),
            AppOptions::default().on_exit(move || exits_clone.set(exits_clone.get() + 1)),
        );

        let result = app.launch(|app| {
            app.context().keys.register_global("x", || {});
            Err(Error::Config("bad setup".into()))
        });

        assert!(matches!(result, Err(Error::Config(_))));
        assert_eq!(exits.get(), 1);
        assert_eq!(ctx.terminal.key_listener_count(), 0);
        assert!(!ctx.terminal.is_acquired());
        assert!(ctx.keys.global_keys().is_empty());
    }

    #[test]
    fn test_run_loop_ticks_until_exit() {
        let (_, ctx) = setup(20, 5);
        let app = App::new(ctx.clone(), AppOptions::default());
        let weak = Rc::downgrade(&app);
        ctx.keys.register_global("q", move || {
            if let Some(app) = weak.upgrade() {
                app.request_exit();
            }
        });
        let (ticks, ticks_clone) = counter();
        let _t = app.on_tick(move |_| ticks_clone.set(ticks_clone.get() + 1));

        app.run().unwrap();
        let mut events = ScriptedEvents::keys(&["a", "b", "q"]);
        app.run_loop(&mut events).unwrap();

        assert_eq!(ticks.get(), 3);
        assert!(!app.is_running());
        app.cleanup();
    }
}
