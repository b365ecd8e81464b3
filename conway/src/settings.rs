// settings.rs - Bootstrap configuration shared by the frontends

use std::time::Duration;

use crate::error::{AutomatonError, SettingsError};
use crate::patterns::Pattern;
use crate::rule::LifeLike;

pub const DEFAULT_ROWS: usize = 15;
pub const DEFAULT_COLS: usize = 30;
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(500);

/// Initial contents of the grid.
#[derive(Debug, Clone, Copy, Default)]
pub enum Seed {
    /// All cells dead.
    #[default]
    Empty,
    /// A named pattern centered on the grid.
    Pattern(&'static Pattern),
    /// Pseudo-random fill; the same value always yields the same grid.
    Random(u64),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub rows          : usize,
    pub cols          : usize,
    pub rule          : LifeLike,
    pub step_interval : Duration,
    pub seed          : Seed,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            rule: LifeLike::conway(),
            step_interval: DEFAULT_STEP_INTERVAL,
            seed: Seed::Empty,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(AutomatonError::InvalidDimensions { rows: self.rows, cols: self.cols }.into());
        }
        if self.step_interval.is_zero() {
            return Err(SettingsError::ZeroInterval);
        }
        Ok(())
    }
}
