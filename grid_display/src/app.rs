// app.rs - egui frontend: key and click dispatch, grid painting

use std::sync::{Arc, Mutex};

use anyhow::{Context as _, Result};
use conway::{Automaton, AutomatonError, CellPos, Command, RunController, Settings};
use eframe::egui;
use egui::{Color32, Key, Pos2, Rect, Stroke, Vec2};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::display::{Display, DisplayObserver, SharedDisplay, lock};

pub const BOX_SIZE: f32 = 18.0;
pub const SPACING: f32 = 1.0;

const KEYMAP: [(Key, Command); 12] = [
    (Key::R,          Command::Start),
    (Key::C,          Command::Cancel),
    (Key::S,          Command::Step),
    (Key::U,          Command::Toggle),
    (Key::E,          Command::Exit),
    (Key::Q,          Command::Exit),
    (Key::Escape,     Command::Exit),
    (Key::ArrowUp,    Command::Move { d_row: -1, d_col: 0 }),
    (Key::ArrowDown,  Command::Move { d_row: 1, d_col: 0 }),
    (Key::ArrowLeft,  Command::Move { d_row: 0, d_col: -1 }),
    (Key::ArrowRight, Command::Move { d_row: 0, d_col: 1 }),
    (Key::Space,      Command::Toggle),
];

pub fn command_for(key: Key) -> Option<Command> {
    KEYMAP.iter().find(|(k, _)| *k == key).map(|(_, command)| *command)
}

/// Keys pressed since the last frame, in keymap order.
fn read_commands(ctx: &egui::Context) -> Vec<Command> {
    ctx.input(|i| {
        KEYMAP
            .iter()
            .filter(|(key, _)| i.key_pressed(*key))
            .map(|(_, command)| *command)
            .collect()
    })
}

/// Cell under `pos` for a grid painted from `origin`, if any. Clicks on the
/// gaps between boxes land on the box to their upper left.
pub fn cell_at(origin: Pos2, pos: Pos2, rows: usize, cols: usize) -> Option<CellPos> {
    let offset = pos - origin;
    if offset.x < 0.0 || offset.y < 0.0 {
        return None;
    }
    let pitch = BOX_SIZE + SPACING;
    let row = (offset.y / pitch) as usize;
    let col = (offset.x / pitch) as usize;
    (row < rows && col < cols).then_some(CellPos { row, col })
}

/// Window size that fits the grid plus the controls above it.
pub fn window_size(rows: usize, cols: usize) -> [f32; 2] {
    let pitch = BOX_SIZE + SPACING;
    [cols as f32 * pitch + 40.0, rows as f32 * pitch + 170.0]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub alive : Color32,
    pub dead  : Color32,
}

pub struct GridApp {
    controller : RunController,
    display    : SharedDisplay,
    cursor     : CellPos,
    palette    : Palette,
    rule       : String,
    runtime    : Runtime,               // dropped after the controller
}

impl GridApp {
    pub fn new(settings: &Settings, palette: Palette) -> Result<Self> {
        let runtime = Runtime::new().context("failed to start tokio runtime")?;
        let mut automaton = Automaton::new(settings.rows, settings.cols, settings.rule)
            .context("failed to build automaton")?;
        automaton.seed(&settings.seed);

        let display = Display::new(automaton.grid().clone(), automaton.generation());
        let controller =
            RunController::new(automaton, settings.step_interval, runtime.handle().clone());

        Ok(Self {
            controller,
            display: Arc::new(Mutex::new(display)),
            cursor: CellPos::default(),
            palette,
            rule: settings.rule.to_string(),
            runtime,
        })
    }

    pub fn cursor(&self) -> CellPos {
        self.cursor
    }

    pub fn display(&self) -> Display {
        lock(&self.display).clone()
    }

    pub fn controller(&self) -> &RunController {
        &self.controller
    }

    pub fn dispatch(&mut self, ctx: &egui::Context, command: Command) -> Result<Flow, AutomatonError> {
        if command.needs_idle() && self.controller.is_running() {
            debug!(?command, "ignored while running");
            return Ok(Flow::Continue);
        }

        match command {
            Command::Start => {
                let observer = DisplayObserver::new(Arc::clone(&self.display), ctx.clone());
                if self.controller.start(observer) {
                    info!(generation = self.controller.generation(), "run started");
                }
            }
            Command::Cancel => {
                if self.controller.cancel() {
                    info!("run cancelled");
                }
            }
            Command::Step => {
                let changes = self.controller.step()?;
                let mut display = lock(&self.display);
                display.apply(&changes)?;
                display.generation = self.controller.generation();
            }
            Command::Move { d_row, d_col } => {
                let display = lock(&self.display);
                let (rows, cols) = (display.grid.rows(), display.grid.cols());
                self.cursor = self.cursor.moved(d_row, d_col, rows, cols);
            }
            Command::Toggle => {
                let alive = self.controller.toggle(self.cursor.row, self.cursor.col)?;
                lock(&self.display).grid.set(self.cursor.row, self.cursor.col, alive)?;
            }
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// Cancels any run and waits for its completion hook.
    pub fn shutdown(&mut self) {
        self.controller.cancel();
        match self.runtime.block_on(self.controller.finish()) {
            Some(Ok(report)) => info!(generations = report.generations, "run finished"),
            Some(Err(err)) => warn!(%err, "run ended with an error"),
            None => {}
        }
    }

    fn handle(&mut self, ctx: &egui::Context, command: Command) {
        match self.dispatch(ctx, command) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
            Err(err) => warn!(%err, ?command, "command failed"),
        }
    }

    fn draw_grid(&mut self, ui: &mut egui::Ui) -> Option<CellPos> {
        let display = self.display();
        let (rows, cols) = (display.grid.rows(), display.grid.cols());
        let pitch = BOX_SIZE + SPACING;

        let origin = ui.cursor().min;
        let total_size = Vec2::new(cols as f32 * pitch - SPACING, rows as f32 * pitch - SPACING);
        let (response, painter) = ui.allocate_painter(total_size, egui::Sense::click());

        painter.rect_filled(Rect::from_min_size(origin, total_size), 0.0, Color32::DARK_GRAY);
        for (row, col, alive) in display.grid.iter() {
            let min = origin + Vec2::new(col as f32 * pitch, row as f32 * pitch);
            let rect = Rect::from_min_size(min, Vec2::splat(BOX_SIZE));
            let color = if alive { self.palette.alive } else { self.palette.dead };
            painter.rect_filled(rect, 0.0, color);
            painter.rect_stroke(rect, 0.0, Stroke::new(0.3, Color32::GRAY));
        }

        if !display.running {
            let min = origin
                + Vec2::new(self.cursor.col as f32 * pitch, self.cursor.row as f32 * pitch);
            let rect = Rect::from_min_size(min, Vec2::splat(BOX_SIZE));
            painter.rect_stroke(rect, 0.0, Stroke::new(2.0, Color32::YELLOW));
        }

        if !response.clicked() {
            return None;
        }
        response
            .interact_pointer_pos()
            .and_then(|pos| cell_at(origin, pos, rows, cols))
    }
}

impl eframe::App for GridApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for command in read_commands(ctx) {
            self.handle(ctx, command);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            let display = self.display();
            ui.heading(format!("Cellular automaton  {}", self.rule));

            ui.horizontal(|ui| {
                let running = self.controller.is_running();
                if ui.add_enabled(!running, egui::Button::new("Run")).clicked() {
                    self.handle(ctx, Command::Start);
                }
                if ui.add_enabled(running, egui::Button::new("Cancel")).clicked() {
                    self.handle(ctx, Command::Cancel);
                }
                if ui.add_enabled(!running, egui::Button::new("Step")).clicked() {
                    self.handle(ctx, Command::Step);
                }

                ui.separator();
                ui.label("Alive:");
                ui.color_edit_button_srgba(&mut self.palette.alive);
                ui.label("Dead:");
                ui.color_edit_button_srgba(&mut self.palette.dead);
            });

            ui.label(format!(
                "generation {}  population {}  {}",
                display.generation,
                display.grid.population(),
                if display.running { "running" } else { "idle" },
            ));
            ui.label("[r]un [c]ancel [s]tep [arrows] move [u]pdate cell [e]xit, or click a cell");
            ui.separator();

            if let Some(cell) = self.draw_grid(ui) {
                if self.controller.is_running() {
                    debug!(?cell, "click ignored while running");
                } else {
                    self.cursor = cell;
                    self.handle(ctx, Command::Toggle);
                }
            }
        });
    }
}

impl Drop for GridApp {
    fn drop(&mut self) {
        self.shutdown();
    }
}
