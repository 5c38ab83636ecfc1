//! Seed types for initializing Game of Life grids.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::engine::{ALIVE, Cell, Grid};

/// Complete seed specification for grid initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Seed {
    /// Pattern to use for seeding.
    pub pattern: Pattern,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            pattern: Pattern::Glider { origin: (1, 1) },
        }
    }
}

/// Predefined patterns for initialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// All-dead grid.
    Empty,
    /// Explicit list of alive cells.
    Cells {
        /// Alive cell coordinates.
        alive: Vec<Cell>,
    },
    /// Three-cell horizontal blinker.
    Blinker {
        /// Leftmost cell of the row.
        origin: (usize, usize),
    },
    /// Standard five-cell glider travelling towards (+1, +1).
    Glider {
        /// Top-left corner of the 3x3 bounding box.
        origin: (usize, usize),
    },
    /// Uniform random fill.
    Random {
        /// Probability of a cell starting alive (0.0-1.0).
        density: f64,
        /// Random seed.
        seed: u64,
    },
}

impl Seed {
    /// Generate an initial grid of the given dimensions.
    ///
    /// Pattern coordinates wrap toroidally, so a pattern placed near an
    /// edge lands on the opposite side instead of being clipped.
    pub fn generate(&self, width: usize, height: usize) -> Grid {
        let mut grid = Grid::new(width, height);
        match &self.pattern {
            Pattern::Empty => {}
            Pattern::Cells { alive } => {
                for cell in alive {
                    grid.set(cell.x % width, cell.y % height, ALIVE);
                }
            }
            Pattern::Blinker { origin } => {
                let (x, y) = *origin;
                for dx in 0..3 {
                    grid.set((x + dx) % width, y % height, ALIVE);
                }
            }
            Pattern::Glider { origin } => {
                let (x, y) = *origin;
                for (dx, dy) in [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)] {
                    grid.set((x + dx) % width, (y + dy) % height, ALIVE);
                }
            }
            Pattern::Random { density, seed } => {
                let mut rng = StdRng::seed_from_u64(*seed);
                for y in 0..height {
                    for x in 0..width {
                        if rng.gen_bool(density.clamp(0.0, 1.0)) {
                            grid.set(x, y, ALIVE);
                        }
                    }
                }
            }
        }
        grid
    }
}
