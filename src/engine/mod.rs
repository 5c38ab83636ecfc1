//! Engine module - Grid primitives, worker pool, and the turn engine.

mod control;
mod events;
mod grid;
mod turn;
mod workers;

pub use control::*;
pub use events::*;
pub use grid::*;
pub use turn::*;
pub use workers::*;
