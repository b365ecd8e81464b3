// grid.rs - Fixed-size toroidal grid for the automaton

use crate::error::AutomatonError;

/// Offsets of the 8 Moore neighbors, row-major around the cell.
pub const NEIGHBORS: [(isize, isize); 8] = [
    (-1, -1), (-1, 0), (-1, 1),
    ( 0, -1),          ( 0, 1),
    ( 1, -1), ( 1, 0), ( 1, 1),
];

/// Moves `index` by `delta` along an axis of length `len`, wrapping at both ends.
pub fn wrap_index(index: usize, delta: isize, len: usize) -> usize {
    (index as isize + delta).rem_euclid(len as isize) as usize
}

/// A `rows x cols` field of cells, stored row-major.
///
/// The dimensions are fixed at construction; the edges wrap around so that
/// the leftmost column neighbors the rightmost one, and likewise for rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows  : usize,
    cols  : usize,
    cells : Vec<bool>,
}

impl Grid {
    /// Allocates an all-dead grid.
    pub fn new(rows: usize, cols: usize) -> Result<Self, AutomatonError> {
        if rows == 0 || cols == 0 {
            return Err(AutomatonError::InvalidDimensions { rows, cols });
        }
        Ok(Self { rows, cols, cells: vec![false; rows * cols] })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool, AutomatonError> {
        Ok(self.cells[self.index(row, col)?])
    }

    pub fn set(&mut self, row: usize, col: usize, alive: bool) -> Result<(), AutomatonError> {
        let index = self.index(row, col)?;
        self.cells[index] = alive;
        Ok(())
    }

    /// Sets the cell at `(row, col)` taken modulo the grid size.
    pub(crate) fn set_wrapping(&mut self, row: usize, col: usize, alive: bool) {
        let index = (row % self.rows) * self.cols + col % self.cols;
        self.cells[index] = alive;
    }

    /// State of the cell `(d_row, d_col)` away from `(row, col)`, wrapping on both axes.
    pub fn wrapped(&self, row: usize, col: usize, d_row: isize, d_col: isize) -> bool {
        let r = wrap_index(row, d_row, self.rows);
        let c = wrap_index(col, d_col, self.cols);
        self.cells[r * self.cols + c]
    }

    /// Counts live cells among the 8 neighbors of `(row, col)`.
    ///
    /// Always 8 lookups. On grids with 1 or 2 rows (or columns) several offsets
    /// land on the same cell, possibly the cell itself, and each one counts.
    pub fn live_neighbors(&self, row: usize, col: usize) -> u8 {
        NEIGHBORS
            .iter()
            .filter(|&&(d_row, d_col)| self.wrapped(row, col, d_row, d_col))
            .count() as u8
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&alive| alive).count()
    }

    /// Every cell as `(row, col, alive)`, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, bool)> + '_ {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &alive)| (i / cols, i % cols, alive))
    }

    /// Coordinates of the live cells, row-major.
    pub fn live_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.iter().filter(|&(_, _, alive)| alive).map(|(r, c, _)| (r, c))
    }

    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    fn index(&self, row: usize, col: usize) -> Result<usize, AutomatonError> {
        if row >= self.rows || col >= self.cols {
            return Err(AutomatonError::IndexOutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }
}
