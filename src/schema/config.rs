//! Run configuration for Game of Life simulations.

use serde::{Deserialize, Serialize};

/// Top-level run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Grid width in cells (X dimension).
    pub width: usize,
    /// Grid height in cells (Y dimension).
    pub height: usize,
    /// Total turn budget for the run.
    pub turns: u32,
    /// Number of concurrent workers for the local engine.
    pub workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            width: 64,
            height: 64,
            turns: 100,
            workers: 4,
        }
    }
}

impl RunConfig {
    /// Get total grid size (width * height).
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.width * self.height
    }

    /// Validate configuration parameters.
    ///
    /// Must pass before any grid is allocated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::InvalidDimensions);
        }
        if self.workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }
        if self.workers > self.height {
            return Err(ConfigError::WorkersExceedRows {
                workers: self.workers,
                rows: self.height,
            });
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid dimensions (width, height) must be non-zero")]
    InvalidDimensions,
    #[error("Worker count must be non-zero")]
    InvalidWorkers,
    #[error("Worker count {workers} exceeds grid rows {rows}")]
    WorkersExceedRows { workers: usize, rows: usize },
}
