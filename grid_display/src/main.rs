// main.rs - Windowed cellular automaton: egui grid over the background run loop

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use conway::SettingsArgs;
use eframe::egui;
use egui::Color32;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod app;
mod display;

use app::{GridApp, Palette};

#[derive(Parser, Debug)]
#[command(
    name = "grid_display",
    version,
    about = "Run a two-state cellular automaton on a wrapping grid in a window"
)]
struct Cli {
    #[command(flatten)]
    grid: SettingsArgs,

    /// Color of live cells as #rrggbb.
    #[arg(long, env = "CONWAY_ALIVE_COLOR", default_value = "#00c800", value_parser = color)]
    alive_color: Color32,

    /// Color of dead cells as #rrggbb.
    #[arg(long, env = "CONWAY_DEAD_COLOR", default_value = "#282828", value_parser = color)]
    dead_color: Color32,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let settings = cli.grid.settings();
    settings.validate().context("invalid configuration")?;
    let palette = Palette { alive: cli.alive_color, dead: cli.dead_color };
    let app = GridApp::new(&settings, palette)?;

    info!(
        rows = settings.rows,
        cols = settings.cols,
        rule = %settings.rule,
        step_interval_ms = settings.step_interval.as_millis() as u64,
        "starting windowed automaton"
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(app::window_size(settings.rows, settings.cols)),
        ..Default::default()
    };

    eframe::run_native(
        "Cellular Automaton",
        options,
        Box::new(move |_cc| Box::new(app)),
    )
    .map_err(|err| anyhow!("window failed: {err}"))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

fn color(raw: &str) -> Result<Color32, String> {
    let hex = raw.trim().trim_start_matches('#');
    if hex.len() != 6 {
        return Err(format!("expected #rrggbb, got {raw:?}"));
    }
    let channel = |i: usize| {
        hex.get(i..i + 2)
            .and_then(|pair| u8::from_str_radix(pair, 16).ok())
            .ok_or_else(|| format!("expected #rrggbb, got {raw:?}"))
    };
    Ok(Color32::from_rgb(channel(0)?, channel(2)?, channel(4)?))
}
