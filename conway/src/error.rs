// error.rs - Error types for the automaton engine and run controller

use thiserror::Error;

/// Boxed error returned by run observers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised by grid construction and cell access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    /// Rows or columns was zero.
    #[error("grid dimensions must be positive, got {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    /// A cell coordinate fell outside the grid.
    #[error("cell ({row}, {col}) is outside the {rows}x{cols} grid")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// The grid is owned by a background run until it returns to idle.
    #[error("a run is in progress; the grid cannot be modified until it stops")]
    RunActive,
}

/// Why a background run ended abnormally.
#[derive(Debug, Error)]
pub enum RunError {
    /// The observer reported a failure while consuming a change list.
    #[error("run observer failed after {generations} generations: {source}")]
    Observer {
        generations: u64,
        #[source]
        source: BoxError,
    },

    /// The background task panicked.
    #[error("run task panicked")]
    Panicked,

    /// The runtime dropped the task before it finished.
    #[error("run task was aborted")]
    Aborted,
}

/// Invalid `B…/S…` rule notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleParseError {
    #[error("rule must look like B3/S23, got {0:?}")]
    Malformed(String),

    #[error("invalid neighbor count {0:?}, expected a digit 0-8")]
    InvalidCount(char),
}

/// Rejected bootstrap configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Dimensions(#[from] AutomatonError),

    #[error("step interval must be positive")]
    ZeroInterval,
}
