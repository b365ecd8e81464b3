// patterns.rs - Seed patterns for populating a grid

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::grid::{Grid, wrap_index};

/// A named pattern, cells given relative to its top-left corner.
#[derive(Debug)]
pub struct Pattern {
    pub name  : &'static str,
    pub cells : &'static [(usize, usize)],
}

impl Pattern {
    /// Rows and columns spanned by the pattern.
    pub fn extent(&self) -> (usize, usize) {
        self.cells
            .iter()
            .fold((0, 0), |(h, w), &(r, c)| (h.max(r + 1), w.max(c + 1)))
    }

    /// Looks a pattern up by name, ignoring case, spaces, dashes and underscores.
    pub fn find(name: &str) -> Option<&'static Pattern> {
        let wanted = normalize(name);
        PATTERNS.iter().find(|p| normalize(p.name) == wanted)
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

pub const PATTERNS: &[Pattern] = &[
    Pattern {
        name: "Glider",
        cells: &[(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)],
    },
    Pattern {
        name: "Blinker",
        cells: &[(0, 0), (0, 1), (0, 2)],
    },
    Pattern {
        name: "Toad",
        cells: &[(0, 1), (0, 2), (0, 3), (1, 0), (1, 1), (1, 2)],
    },
    Pattern {
        name: "Beacon",
        cells: &[(0, 0), (0, 1), (1, 0), (1, 1), (2, 2), (2, 3), (3, 2), (3, 3)],
    },
    Pattern {
        name: "Pulsar",
        cells: &[
            // Top section
            (0, 2), (0, 3), (0, 4), (0, 8), (0, 9), (0, 10),
            (2, 0), (2, 5), (2, 7), (2, 12),
            (3, 0), (3, 5), (3, 7), (3, 12),
            (4, 0), (4, 5), (4, 7), (4, 12),
            (5, 2), (5, 3), (5, 4), (5, 8), (5, 9), (5, 10),
            // Bottom section (mirrored)
            (7, 2), (7, 3), (7, 4), (7, 8), (7, 9), (7, 10),
            (8, 0), (8, 5), (8, 7), (8, 12),
            (9, 0), (9, 5), (9, 7), (9, 12),
            (10, 0), (10, 5), (10, 7), (10, 12),
            (12, 2), (12, 3), (12, 4), (12, 8), (12, 9), (12, 10),
        ],
    },
    Pattern {
        name: "R-pentomino",
        cells: &[(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)],
    },
    Pattern {
        name: "Gosper Glider Gun",
        cells: &[
            (4, 0), (4, 1), (5, 0), (5, 1),
            (4, 10), (5, 10), (6, 10), (3, 11), (7, 11), (2, 12), (8, 12),
            (2, 13), (8, 13), (5, 14), (3, 15), (7, 15), (4, 16), (5, 16),
            (6, 16), (5, 17), (2, 20), (3, 20), (4, 20), (2, 21), (3, 21),
            (4, 21), (1, 22), (5, 22), (0, 24), (1, 24), (5, 24), (6, 24),
            (2, 34), (3, 34), (2, 35), (3, 35),
        ],
    },
];

/// Clears the grid and places `pattern` centered on it.
///
/// Patterns larger than the grid wrap around its edges.
pub fn apply_pattern(grid: &mut Grid, pattern: &Pattern) {
    grid.clear();

    let (height, width) = pattern.extent();
    let top  = (grid.rows() / 2) as isize - (height / 2) as isize;
    let left = (grid.cols() / 2) as isize - (width / 2) as isize;

    for &(row, col) in pattern.cells {
        let r = wrap_index(0, top + row as isize, grid.rows());
        let c = wrap_index(0, left + col as isize, grid.cols());
        grid.set_wrapping(r, c, true);
    }
}

/// Clears the grid and fills roughly a third of it, deterministically from `seed`.
pub fn apply_random_pattern(grid: &mut Grid, seed_value: u64) {
    // Simple pseudo-random generator
    let mut hasher = DefaultHasher::new();
    seed_value.hash(&mut hasher);
    let mut seed = hasher.finish();

    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            grid.set_wrapping(row, col, (seed >> 33) % 3 == 0); // ~33% chance of being alive
        }
    }
}
