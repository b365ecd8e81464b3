// app.rs - Command dispatch for the terminal frontend

use std::io::Write;

use anyhow::{Context, Result};
use conway::{CellPos, Command, RunController, Rule};
use crossterm::event::{self, Event};
use tokio::runtime::Runtime;
use tracing::{debug, info, warn};

use crate::keys::decode;
use crate::ui::{Painter, RunPainter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Foreground state: the controller, the cursor, and where to draw.
///
/// All commands arrive here one at a time, so checking `is_running` before a
/// grid or cursor command is enough to keep the foreground off the grid while
/// a run owns it.
pub struct App<'a, R: Rule, W> {
    controller : &'a RunController<R>,
    painter    : Painter,
    cursor     : CellPos,
    out        : W,
}

impl<'a, R: Rule, W: Write + Clone + Send + 'static> App<'a, R, W> {
    pub fn new(controller: &'a RunController<R>, painter: Painter, out: W) -> Self {
        Self { controller, painter, cursor: CellPos::default(), out }
    }

    pub fn cursor(&self) -> CellPos {
        self.cursor
    }

    /// Draws the grid, then handles keys until an exit command arrives.
    pub fn run(&mut self, runtime: &Runtime) -> Result<()> {
        self.draw()?;
        loop {
            let Event::Key(key) = event::read().context("failed to read terminal event")? else {
                continue;
            };
            let Some(command) = decode(key) else {
                continue;
            };
            if self.dispatch(command)? == Flow::Exit {
                break;
            }
        }
        self.shutdown(runtime);
        Ok(())
    }

    pub fn draw(&mut self) -> Result<()> {
        let grid = self.controller.snapshot();
        self.painter
            .draw_frame(&mut self.out, &grid)
            .context("failed to draw grid")?;
        self.show_status()?;
        Ok(())
    }

    pub fn dispatch(&mut self, command: Command) -> Result<Flow> {
        if command.needs_idle() && self.controller.is_running() {
            debug!(?command, "ignored while running");
            return Ok(Flow::Continue);
        }

        match command {
            Command::Start => {
                let observer = RunPainter::new(
                    self.painter,
                    self.out.clone(),
                    self.cursor,
                    self.controller.generation(),
                );
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
                self.painter
                    .paint_changes(&mut self.out, &changes)
                    .context("failed to paint step")?;
                self.show_status()?;
            }
            Command::Move { d_row, d_col } => {
                let grid = self.controller.snapshot();
                self.cursor = self.cursor.moved(d_row, d_col, grid.rows(), grid.cols());
                self.painter
                    .move_cursor(&mut self.out, self.cursor)
                    .context("failed to move cursor")?;
            }
            Command::Toggle => {
                let alive = self.controller.toggle(self.cursor.row, self.cursor.col)?;
                self.painter
                    .paint_cell(&mut self.out, self.cursor, alive)
                    .context("failed to paint cell")?;
                self.show_status()?;
            }
            Command::Exit => return Ok(Flow::Exit),
        }
        Ok(Flow::Continue)
    }

    /// Stops any run and waits for its completion hook, so the cursor is
    /// restored before the terminal is handed back.
    pub fn shutdown(&self, runtime: &Runtime) {
        self.controller.cancel();
        match runtime.block_on(self.controller.finish()) {
            Some(Ok(report)) => info!(generations = report.generations, "run finished"),
            Some(Err(err)) => warn!(%err, "run ended with an error"),
            None => {}
        }
    }

    fn show_status(&mut self) -> Result<()> {
        let text = format!(
            "generation {}  population {}",
            self.controller.generation(),
            self.controller.population()
        );
        self.painter
            .status(&mut self.out, &text, self.cursor)
            .context("failed to draw status line")
    }
}
