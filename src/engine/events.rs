//! Event and command types crossing the engine boundary.

use serde::{Deserialize, Serialize};

use super::grid::Cell;

/// Engine lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Executing,
    Paused,
    Quitting,
}

/// One-way, ordered notification stream from the engine to a reporting sink.
///
/// The stream is closed exactly once, after the final `StateChange` to
/// `Quitting`; nothing is emitted past that point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Engine entered a new phase.
    StateChange { turn: u32, phase: Phase },
    /// Cells whose state flipped during this turn.
    CellsFlipped { turn: u32, cells: Vec<Cell> },
    /// One generation fully committed.
    TurnComplete { turn: u32 },
    /// Current number of alive cells.
    AliveCellsCount { turn: u32, count: usize },
    /// Final turn count and all alive cells at run end.
    FinalTurnComplete { turn: u32, cells: Vec<Cell> },
    /// A snapshot export finished.
    ImageOutputComplete { turn: u32, label: String },
}

/// Single-token control commands consumed by the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Pause,
    Resume,
    Save,
    Quit,
}
