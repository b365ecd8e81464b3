// cli.rs - Command-line flags shared by every frontend

use std::time::Duration;

use clap::Args;

use crate::patterns::{PATTERNS, Pattern};
use crate::rule::LifeLike;
use crate::settings::{DEFAULT_COLS, DEFAULT_ROWS, Seed, Settings};

/// Grid, rule, cadence and seed flags. Frontends `#[command(flatten)]` this
/// into their own parser and add display options beside it.
#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
    /// Number of grid rows.
    #[arg(long, env = "CONWAY_ROWS", default_value_t = DEFAULT_ROWS, value_parser = positive)]
    pub rows: usize,

    /// Number of grid columns.
    #[arg(long, env = "CONWAY_COLS", default_value_t = DEFAULT_COLS, value_parser = positive)]
    pub cols: usize,

    /// Transition rule in B/S notation (B3/S23 is Conway's Life).
    #[arg(long, env = "CONWAY_RULE", default_value = "B3/S23")]
    pub rule: LifeLike,

    /// Milliseconds between generations while running.
    #[arg(long = "step-interval-ms", env = "CONWAY_STEP_INTERVAL_MS", default_value_t = 500, value_parser = positive_u64)]
    pub step_interval_ms: u64,

    /// Named pattern to start from (glider, pulsar, gosper-glider-gun, ...).
    #[arg(long, value_parser = pattern, conflicts_with = "random")]
    pub pattern: Option<&'static Pattern>,

    /// Start from a pseudo-random fill with this seed.
    #[arg(long)]
    pub random: Option<u64>,
}

impl SettingsArgs {
    pub fn settings(&self) -> Settings {
        let seed = match (self.pattern, self.random) {
            (Some(pattern), _) => Seed::Pattern(pattern),
            (None, Some(value)) => Seed::Random(value),
            (None, None) => Seed::Empty,
        };
        Settings {
            rows: self.rows,
            cols: self.cols,
            rule: self.rule,
            step_interval: Duration::from_millis(self.step_interval_ms),
            seed,
        }
    }
}

fn positive(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("must be greater than zero".to_string()),
        Ok(value) => Ok(value),
        Err(err) => Err(err.to_string()),
    }
}

fn positive_u64(raw: &str) -> Result<u64, String> {
    positive(raw).map(|value| value as u64)
}

fn pattern(raw: &str) -> Result<&'static Pattern, String> {
    Pattern::find(raw).ok_or_else(|| {
        let known: Vec<_> = PATTERNS.iter().map(|p| p.name).collect();
        format!("unknown pattern {raw:?}, expected one of: {}", known.join(", "))
    })
}
