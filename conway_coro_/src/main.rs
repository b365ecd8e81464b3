// main.rs - Terminal cellular automaton with a background run loop

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result, bail};
use clap::Parser;
use conway::{Automaton, RunController};
use crossterm::terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod keys;
mod ui;

use app::App;
use cli::Cli;
use ui::{Layout, Painter, Palette, StdoutWriter, TerminalGuard};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_deref())?;

    let settings = cli.settings();
    settings.validate().context("invalid configuration")?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let mut automaton = Automaton::new(settings.rows, settings.cols, settings.rule)
        .context("failed to build automaton")?;
    automaton.seed(&settings.seed);
    let controller = RunController::new(automaton, settings.step_interval, runtime.handle().clone());

    info!(
        rows = settings.rows,
        cols = settings.cols,
        rule = %settings.rule,
        step_interval_ms = settings.step_interval.as_millis() as u64,
        "starting terminal automaton"
    );

    let layout = Layout::new(settings.rows, settings.cols).with_context(|| {
        format!("a {}x{} grid cannot be drawn in a terminal", settings.rows, settings.cols)
    })?;
    let (width, height) = terminal::size().context("failed to read terminal size")?;
    if !layout.fits(width, height) {
        let (needed_width, needed_height) = layout.size();
        bail!(
            "a {}x{} grid needs a {needed_width}x{needed_height} terminal, this one is {width}x{height}",
            settings.rows,
            settings.cols,
        );
    }
    let painter = Painter {
        layout,
        palette: Palette { alive: cli.alive_color, dead: cli.dead_color },
    };

    let _terminal = TerminalGuard::enter().context("failed to prepare terminal")?;
    let mut app = App::new(&controller, painter, StdoutWriter);
    let result = app.run(&runtime);
    if result.is_err() {
        app.shutdown(&runtime);
    }
    result
}

/// Logs go to `log_file` when given; otherwise they are dropped, since stdout
/// and stderr share the screen with the grid.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
