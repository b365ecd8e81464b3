// display.rs - Cell buffer shared between the background run and the egui frame

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use conway::{AutomatonError, BoxError, ChangeEvent, Grid, RunObserver};
use eframe::egui;

/// What the frame paints. Written by the run observer while a run is active
/// and by the dispatcher otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub grid       : Grid,
    pub generation : u64,
    pub running    : bool,              // hides the cursor highlight
}

impl Display {
    pub fn new(grid: Grid, generation: u64) -> Self {
        Self { grid, generation, running: false }
    }

    pub fn apply(&mut self, changes: &[ChangeEvent]) -> Result<(), AutomatonError> {
        for change in changes {
            self.grid.set(change.row, change.col, change.next_state)?;
        }
        Ok(())
    }
}

pub type SharedDisplay = Arc<Mutex<Display>>;

pub fn lock(display: &SharedDisplay) -> MutexGuard<'_, Display> {
    display.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Copies each generation's changes into the shared buffer and asks egui for
/// a new frame, since the UI thread only paints when woken.
pub struct DisplayObserver {
    display : SharedDisplay,
    ctx     : egui::Context,
}

impl DisplayObserver {
    pub fn new(display: SharedDisplay, ctx: egui::Context) -> Self {
        Self { display, ctx }
    }
}

impl RunObserver for DisplayObserver {
    fn on_start(&mut self) -> Result<(), BoxError> {
        lock(&self.display).running = true;
        self.ctx.request_repaint();
        Ok(())
    }

    fn on_changes(&mut self, changes: &[ChangeEvent]) -> Result<(), BoxError> {
        {
            let mut display = lock(&self.display);
            display.apply(changes)?;
            display.generation += 1;
        }
        self.ctx.request_repaint();
        Ok(())
    }

    fn on_complete(&mut self) {
        lock(&self.display).running = false;
        self.ctx.request_repaint();
    }
}
