// automaton.rs - Two-state cellular automaton with incremental change reporting

use crate::error::AutomatonError;
use crate::grid::Grid;
use crate::patterns;
use crate::rule::{LifeLike, Rule};
use crate::settings::Seed;

/// One cell that flips during a generation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChangeEvent {
    pub row        : usize,
    pub col        : usize,
    pub next_state : bool,
}

impl ChangeEvent {
    pub fn new(row: usize, col: usize, next_state: bool) -> Self {
        Self { row, col, next_state }
    }
}

/// A toroidal grid advanced one generation at a time by a fixed rule.
#[derive(Debug, Clone)]
pub struct Automaton<R = LifeLike> {
    grid       : Grid,
    rule       : R,
    generation : u64,
}

impl Automaton<LifeLike> {
    /// An all-dead grid running Conway's rule.
    pub fn life(rows: usize, cols: usize) -> Result<Self, AutomatonError> {
        Self::new(rows, cols, LifeLike::conway())
    }
}

impl<R: Rule> Automaton<R> {
    pub fn new(rows: usize, cols: usize, rule: R) -> Result<Self, AutomatonError> {
        Ok(Self { grid: Grid::new(rows, cols)?, rule, generation: 0 })
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    /// Generations advanced since construction or the last [`clear`](Self::clear).
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn population(&self) -> usize {
        self.grid.population()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool, AutomatonError> {
        self.grid.get(row, col)
    }

    pub fn set(&mut self, row: usize, col: usize, alive: bool) -> Result<(), AutomatonError> {
        self.grid.set(row, col, alive)
    }

    /// Flips one cell and returns its new state.
    pub fn toggle(&mut self, row: usize, col: usize) -> Result<bool, AutomatonError> {
        let alive = !self.grid.get(row, col)?;
        self.grid.set(row, col, alive)?;
        Ok(alive)
    }

    /// Kills every cell and resets the generation counter.
    pub fn clear(&mut self) {
        self.grid.clear();
        self.generation = 0;
    }

    /// Replaces the grid contents with `seed` and resets the generation counter.
    pub fn seed(&mut self, seed: &Seed) {
        self.clear();
        match *seed {
            Seed::Empty             => {}
            Seed::Pattern(pattern)  => patterns::apply_pattern(&mut self.grid, pattern),
            Seed::Random(value)     => patterns::apply_random_pattern(&mut self.grid, value),
        }
    }

    /// Advances one generation and returns the cells that flipped, row-major.
    ///
    /// Every next state is computed from the grid as it stood before the call;
    /// the returned events are applied only once all of them are known.
    pub fn next(&mut self) -> Vec<ChangeEvent> {
        let changes: Vec<ChangeEvent> = self
            .grid
            .iter()
            .filter_map(|(row, col, alive)| {
                let count = self.grid.live_neighbors(row, col);
                let next_state = self.rule.next_state(alive, count);
                (next_state != alive).then(|| ChangeEvent::new(row, col, next_state))
            })
            .collect();

        for change in &changes {
            self.grid.set_wrapping(change.row, change.col, change.next_state);
        }
        self.generation += 1;
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::life;

    fn live(automaton: &Automaton<impl Rule>) -> Vec<(usize, usize)> {
        automaton.grid().live_cells().collect()
    }

    #[test]
    fn construction_validates_dimensions() {
        assert!(matches!(
            Automaton::life(0, 3),
            Err(AutomatonError::InvalidDimensions { rows: 0, cols: 3 })
        ));
        let automaton = Automaton::new(4, 7, life).unwrap();
        assert_eq!((automaton.rows(), automaton.cols()), (4, 7));
        assert_eq!(automaton.population(), 0);
    }

    #[test]
    fn toggle_returns_new_state() {
        let mut automaton = Automaton::life(3, 3).unwrap();
        assert_eq!(automaton.toggle(1, 2), Ok(true));
        assert_eq!(automaton.get(1, 2), Ok(true));
        assert_eq!(automaton.toggle(1, 2), Ok(false));
        assert!(matches!(
            automaton.toggle(3, 0),
            Err(AutomatonError::IndexOutOfBounds { row: 3, .. })
        ));
    }

    #[test]
    fn blinker_oscillates() {
        let mut automaton = Automaton::life(5, 5).unwrap();
        for col in 1..4 {
            automaton.set(2, col, true).unwrap();
        }

        let changes = automaton.next();
        assert_eq!(
            changes,
            vec![
                ChangeEvent::new(1, 2, true),
                ChangeEvent::new(2, 1, false),
                ChangeEvent::new(2, 3, false),
                ChangeEvent::new(3, 2, true),
            ]
        );
        assert_eq!(live(&automaton), vec![(1, 2), (2, 2), (3, 2)]);

        automaton.next();
        assert_eq!(live(&automaton), vec![(2, 1), (2, 2), (2, 3)]);
        assert_eq!(automaton.generation(), 2);
    }

    #[test]
    fn glider_crosses_the_edge() {
        let mut automaton = Automaton::life(6, 6).unwrap();
        for &(r, c) in &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)] {
            automaton.set(r, c, true).unwrap();
        }
        // a glider translates by (1, 1) every 4 generations
        for _ in 0..24 {
            automaton.next();
        }
        assert_eq!(live(&automaton), vec![(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)]);
    }

    #[test]
    fn seeding_replaces_the_grid() {
        let mut automaton = Automaton::life(5, 5).unwrap();
        automaton.toggle(0, 0).unwrap();
        automaton.next();

        let blinker = crate::patterns::Pattern::find("blinker").unwrap();
        automaton.seed(&Seed::Pattern(blinker));
        assert_eq!(live(&automaton), vec![(2, 1), (2, 2), (2, 3)]);
        assert_eq!(automaton.generation(), 0);

        automaton.seed(&Seed::Empty);
        assert_eq!(automaton.population(), 0);
    }

    #[test]
    fn clear_resets_generation() {
        let mut automaton = Automaton::life(3, 3).unwrap();
        automaton.toggle(0, 0).unwrap();
        automaton.next();
        automaton.clear();
        assert_eq!(automaton.generation(), 0);
        assert_eq!(automaton.population(), 0);
    }
}
