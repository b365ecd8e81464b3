//! Two-state cellular automata on a toroidal grid.
//!
//! [`Automaton`] owns the grid and advances it one generation at a time,
//! reporting exactly which cells flipped. [`RunController`] drives an
//! automaton on a tokio task at a fixed cadence, hands each change list to a
//! [`RunObserver`], and stops cooperatively when cancelled.
//!
//! ```
//! use conway::{Automaton, ChangeEvent};
//!
//! let mut life = Automaton::life(3, 3).unwrap();
//! life.toggle(1, 1).unwrap();
//! assert_eq!(life.next(), vec![ChangeEvent::new(1, 1, false)]);
//! ```

pub mod automaton;
#[cfg(feature = "cli")]
pub mod cli;
pub mod command;
pub mod controller;
pub mod error;
pub mod grid;
pub mod patterns;
pub mod rule;
pub mod settings;

pub use automaton::{Automaton, ChangeEvent};
#[cfg(feature = "cli")]
pub use cli::SettingsArgs;
pub use command::{CellPos, Command};
pub use controller::{OnChanges, RunController, RunObserver, RunReport, RunState, on_changes};
pub use error::{AutomatonError, BoxError, RuleParseError, RunError, SettingsError};
pub use grid::{Grid, wrap_index};
pub use patterns::{PATTERNS, Pattern};
pub use rule::{LifeLike, Rule, life};
pub use settings::{Seed, Settings};
