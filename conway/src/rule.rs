// rule.rs - Transition rules for two-state automata

use std::fmt;
use std::str::FromStr;

use crate::error::RuleParseError;

/// Decides a cell's next state from its current state and live neighbor count.
///
/// Rules are pure: the same inputs always produce the same output. Any
/// `Fn(bool, u8) -> bool` closure or function pointer is a rule.
pub trait Rule: Send + Sync + 'static {
    fn next_state(&self, alive: bool, live_neighbors: u8) -> bool;
}

impl<F> Rule for F
where
    F: Fn(bool, u8) -> bool + Send + Sync + 'static,
{
    fn next_state(&self, alive: bool, live_neighbors: u8) -> bool {
        self(alive, live_neighbors)
    }
}

/// Conway's rule: birth on 3, survival on 2 or 3.
pub fn life(alive: bool, live_neighbors: u8) -> bool {
    match (alive, live_neighbors) {
        (true, 2) | (true, 3) => true,   // Survival
        (false, 3)            => true,   // Birth
        _                     => false,  // Death or stays dead
    }
}

/// Outer-totalistic rule written in `B…/S…` notation, e.g. `B3/S23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifeLike {
    birth    : [bool; 9],
    survival : [bool; 9],
}

impl LifeLike {
    pub fn new(birth: &[u8], survival: &[u8]) -> Self {
        let mut rule = Self { birth: [false; 9], survival: [false; 9] };
        for &n in birth.iter().filter(|&&n| n <= 8) {
            rule.birth[n as usize] = true;
        }
        for &n in survival.iter().filter(|&&n| n <= 8) {
            rule.survival[n as usize] = true;
        }
        rule
    }

    /// B3/S23.
    pub fn conway() -> Self {
        Self::new(&[3], &[2, 3])
    }

    /// B36/S23.
    pub fn highlife() -> Self {
        Self::new(&[3, 6], &[2, 3])
    }
}

impl Default for LifeLike {
    fn default() -> Self {
        Self::conway()
    }
}

impl Rule for LifeLike {
    fn next_state(&self, alive: bool, live_neighbors: u8) -> bool {
        let n = live_neighbors as usize;
        if n > 8 {
            return false;
        }
        if alive { self.survival[n] } else { self.birth[n] }
    }
}

impl FromStr for LifeLike {
    type Err = RuleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || RuleParseError::Malformed(s.to_string());
        let (b, rest) = s.trim().split_once('/').ok_or_else(malformed)?;
        let birth = b
            .strip_prefix('B')
            .or_else(|| b.strip_prefix('b'))
            .ok_or_else(malformed)?;
        let survival = rest
            .strip_prefix('S')
            .or_else(|| rest.strip_prefix('s'))
            .ok_or_else(malformed)?;
        Ok(Self::new(&parse_counts(birth)?, &parse_counts(survival)?))
    }
}

fn parse_counts(digits: &str) -> Result<Vec<u8>, RuleParseError> {
    digits
        .chars()
        .map(|ch| match ch.to_digit(10) {
            Some(n) if n <= 8 => Ok(n as u8),
            _ => Err(RuleParseError::InvalidCount(ch)),
        })
        .collect()
}

impl fmt::Display for LifeLike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |set: &[bool; 9]| -> String {
            (0..9)
                .filter(|&n| set[n])
                .map(|n| char::from(b'0' + n as u8))
                .collect()
        };
        write!(f, "B{}/S{}", digits(&self.birth), digits(&self.survival))
    }
}
