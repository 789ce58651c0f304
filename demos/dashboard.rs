//! Dashboard Example - the full issue dashboard in the terminal
//!
//! Serves issues from a JSON fixture in the tracker's search-response shape:
//! - `r` reloads, `h` shows help, `q` / Ctrl+C quits
//! - `/` opens the command prompt (`reload`, `open <id>`, `help`)
//! - `f` shows jump markers; press a marker to select an issue
//!
//! Run with: cargo run --example dashboard -- --issues demos/issues.json

use std::cell::RefCell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use flowdash::dashboard::Dashboard;
use flowdash::terminal::{CrosstermEvents, CrosstermSurface, SharedSurface};
use flowdash::tracker::{CachedSource, FixtureSource, IssueSource, MemoryCache};
use flowdash::{logging, App, AppContext, AppOptions, Config};

#[derive(Parser, Debug)]
#[command(name = "flowdash", version)]
#[command(about = "Reactive terminal dashboard for your open sub-tasks")]
struct Args {
    /// Configuration file
    #[arg(long, default_value = "flowdash.toml")]
    config: PathBuf,

    /// Issue fixture (JSON array or search response)
    #[arg(long)]
    issues: Option<PathBuf>,

    /// Write logs here
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Command to run after startup, e.g. `open 12`
    command: Vec<String>,
}

fn load_config(args: &Args) -> flowdash::Result<Config> {
    let mut config = Config::load(&args.config)?;
    config.apply_env_overrides();
    if let Some(path) = &args.log_file {
        config.logging.file = Some(path.clone());
    }
    if let Some(path) = &args.issues {
        config.tracker.fixture = Some(path.clone());
    }
    config.validate()?;
    Ok(config)
}

fn issue_source(config: &Config) -> flowdash::Result<Arc<dyn IssueSource>> {
    let fixture = match &config.tracker.fixture {
        Some(path) => FixtureSource::from_path(path)?,
        None => {
            tracing::warn!("no issue fixture configured, starting empty");
            FixtureSource::default()
        }
    };
    let ttl = config.tracker.cache_ttl_secs.map(Duration::from_secs);
    Ok(Arc::new(CachedSource::new(fixture, Arc::new(MemoryCache::new()), ttl)))
}

fn run(args: Args) -> flowdash::Result<()> {
    let config = load_config(&args)?;
    logging::init(&config.logging)?;
    let source = issue_source(&config)?;

    let surface: SharedSurface = Rc::new(RefCell::new(CrosstermSurface::new()));
    let ctx = Rc::new(AppContext::new(surface, config));
    let options = AppOptions::default().on_exit(|| tracing::info!("dashboard closed"));
    let app = App::new(ctx, options);

    let mut dashboard = None;
    app.launch(|app| {
        dashboard = Some(Dashboard::setup(app, source, &args.command)?);
        Ok(())
    })?;

    let result = app.run_loop(&mut CrosstermEvents);
    app.cleanup();
    if let Some(dashboard) = dashboard {
        dashboard.teardown();
    }
    Ok(result?)
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("flowdash: {err}");
            ExitCode::FAILURE
        }
    }
}
