//! Row-band worker pool for parallel generation computation.
//!
//! The grid is split into contiguous, disjoint row bands: every worker
//! gets `height / workers` rows and the last worker absorbs the remainder,
//! so each row is assigned exactly once. Workers read the whole current
//! grid for neighbor lookups but receive only their own `&mut` band of the
//! next grid, so disjoint writes are enforced by the borrow checker rather
//! than by convention (halo-free partitioning).

use rayon::prelude::*;

use super::grid::{Cell, Grid};

/// Pool of workers that compute one generation per invocation.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with exactly `workers` threads.
    ///
    /// `workers` must be validated against the grid dimensions upstream
    /// (see `RunConfig::validate`).
    pub fn new(workers: usize) -> Self {
        assert!(workers > 0, "worker count must be non-zero");
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .expect("failed to build worker thread pool");
        Self { pool, workers }
    }

    /// Number of workers in the pool.
    #[inline]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Compute one full generation of `current` into `next`.
    ///
    /// Dispatches one band per worker and returns only after every band has
    /// been committed (full barrier). The returned flipped-cell list is the
    /// concatenation of per-band lists in band order.
    pub fn step_into(&self, current: &Grid, next: &mut Grid) -> Vec<Cell> {
        debug_assert_eq!(current.width(), next.width());
        debug_assert_eq!(current.height(), next.height());

        let width = current.width();
        let height = current.height();
        let band_rows = height / self.workers;

        // Carve `next` into disjoint &mut row bands, last takes the remainder
        let mut bands: Vec<(usize, &mut [u8])> = Vec::with_capacity(self.workers);
        let mut rest = next.cells_mut();
        let mut y = 0;
        for worker in 0..self.workers {
            let rows = if worker == self.workers - 1 {
                height - y
            } else {
                band_rows
            };
            let (band, tail) = rest.split_at_mut(rows * width);
            bands.push((y, band));
            rest = tail;
            y += rows;
        }

        let mut band_flips: Vec<Vec<Cell>> = Vec::new();
        self.pool.install(|| {
            bands
                .into_par_iter()
                .map(|(start_row, band)| current.step_rows_into(start_row, band))
                .collect_into_vec(&mut band_flips);
        });

        band_flips.into_iter().flatten().collect()
    }
}
