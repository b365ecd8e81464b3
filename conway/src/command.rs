// command.rs - Frontend-neutral commands and cursor arithmetic

use crate::grid::wrap_index;

/// What a key press asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Cancel,
    Step,
    Move { d_row: isize, d_col: isize },
    Toggle,
    Exit,
}

impl Command {
    /// Commands that touch the grid or the cursor, refused while a run is active.
    pub fn needs_idle(self) -> bool {
        matches!(self, Command::Step | Command::Move { .. } | Command::Toggle)
    }
}

/// A cell coordinate on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellPos {
    pub row : usize,
    pub col : usize,
}

impl CellPos {
    /// Moves by `(d_row, d_col)`, wrapping around the grid edges.
    pub fn moved(self, d_row: isize, d_col: isize, rows: usize, cols: usize) -> Self {
        Self {
            row: wrap_index(self.row, d_row, rows),
            col: wrap_index(self.col, d_col, cols),
        }
    }
}
