// cli.rs - Command-line configuration for the terminal frontend

use std::path::PathBuf;

use clap::Parser;
use conway::{Settings, SettingsArgs};
use crossterm::style::Color;

#[derive(Parser, Debug)]
#[command(
    name = "conway_coro",
    version,
    about = "Run a two-state cellular automaton on a wrapping grid in the terminal"
)]
pub struct Cli {
    #[command(flatten)]
    pub grid: SettingsArgs,

    /// Color of live cells.
    #[arg(long, env = "CONWAY_ALIVE_COLOR", default_value = "green", value_parser = color)]
    pub alive_color: Color,

    /// Color of dead cells.
    #[arg(long, env = "CONWAY_DEAD_COLOR", default_value = "black", value_parser = color)]
    pub dead_color: Color,

    /// Write logs to this file (the terminal itself is the display).
    #[arg(long, env = "CONWAY_LOG_FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        self.grid.settings()
    }
}

fn color(raw: &str) -> Result<Color, String> {
    Color::try_from(raw).map_err(|_| format!("unknown color {raw:?}"))
}
