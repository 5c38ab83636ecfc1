//! Toroidal grid and the Game of Life rule evaluator.
//!
//! `next_state` is the single source of truth for simulation semantics.
//! Both the parallel local path (worker bands) and the serial remote path
//! go through [`Grid::step_rows_into`], so the two can never diverge.

use serde::{Deserialize, Serialize};

/// Byte sentinel for an alive cell.
pub const ALIVE: u8 = 255;
/// Byte sentinel for a dead cell.
pub const DEAD: u8 = 0;

/// A grid coordinate, used to report changes and alive-cell listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub x: usize,
    pub y: usize,
}

/// Fixed-size toroidal byte matrix.
///
/// Cells are stored row-major; every cell is either [`ALIVE`] or [`DEAD`].
/// Neighbor lookups wrap modulo width/height in both axes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

/// Apply the Game of Life rule to a single cell.
///
/// An alive cell survives with 2 or 3 live neighbors; a dead cell becomes
/// alive with exactly 3. Everything else is dead.
#[inline]
pub fn next_state(current: u8, live_neighbors: u8) -> u8 {
    if current == ALIVE {
        match live_neighbors {
            2 | 3 => ALIVE,
            _ => DEAD,
        }
    } else if live_neighbors == 3 {
        ALIVE
    } else {
        DEAD
    }
}

impl Grid {
    /// Create an all-dead grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![DEAD; width * height],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Convert (x, y) coordinates to flat index.
    #[inline]
    fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.cells[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, state: u8) {
        let idx = self.idx(x, y);
        self.cells[idx] = state;
    }

    /// Raw cell storage, row-major.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    #[inline]
    pub(crate) fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    /// Count alive cells among the 8 toroidally-wrapped neighbors of (x, y).
    ///
    /// All eight offsets are enumerated explicitly: on a 1-wide or 1-tall
    /// torus several of them wrap to the same cell (possibly (x, y) itself),
    /// and each wrapped lookup counts.
    pub fn neighbor_count(&self, x: usize, y: usize) -> u8 {
        // Offsets into the 3x3 neighborhood anchored at (x - 1, y - 1)
        const NEIGHBOR_OFFSETS: [(usize, usize); 8] = [
            (0, 0),
            (1, 0),
            (2, 0),
            (0, 1),
            (2, 1),
            (0, 2),
            (1, 2),
            (2, 2),
        ];
        let w = self.width;
        let h = self.height;
        let mut count = 0;
        for (dx, dy) in NEIGHBOR_OFFSETS {
            if self.get((x + w - 1 + dx) % w, (y + h - 1 + dy) % h) == ALIVE {
                count += 1;
            }
        }
        count
    }

    /// List alive cell coordinates in row-major order.
    pub fn alive_cells(&self) -> Vec<Cell> {
        let mut alive = Vec::new();
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) == ALIVE {
                    alive.push(Cell { x, y });
                }
            }
        }
        alive
    }

    /// Count alive cells.
    pub fn alive_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == ALIVE).count()
    }

    /// Compute the next state for rows `start_row..start_row + band.len() / width`
    /// into `band`, reading the whole grid for neighbor lookups.
    ///
    /// Returns the cells whose state flipped, in row-major order within the band.
    /// `band.len()` must be a multiple of the grid width.
    pub fn step_rows_into(&self, start_row: usize, band: &mut [u8]) -> Vec<Cell> {
        debug_assert_eq!(band.len() % self.width, 0);
        let rows = band.len() / self.width;
        let mut flipped = Vec::new();
        for row in 0..rows {
            let y = start_row + row;
            for x in 0..self.width {
                let current = self.get(x, y);
                let state = next_state(current, self.neighbor_count(x, y));
                band[row * self.width + x] = state;
                if state != current {
                    flipped.push(Cell { x, y });
                }
            }
        }
        flipped
    }

    /// Serially compute one full generation into `next`.
    ///
    /// This is the path the remote evolution service uses; the worker pool
    /// computes the same function band-by-band.
    pub fn step_into(&self, next: &mut Grid) -> Vec<Cell> {
        debug_assert_eq!(self.width, next.width);
        debug_assert_eq!(self.height, next.height);
        self.step_rows_into(0, &mut next.cells)
    }
}
