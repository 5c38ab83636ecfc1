//! Turn engine - drives successive generations through the worker pool.
//!
//! Phases move Executing -> Paused -> Executing under external commands and
//! end in Quitting, either on a quit command or when the turn budget runs
//! out. Pause takes effect only at a generation boundary: the per-generation
//! barrier cannot be interrupted, so an in-flight generation always commits.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use log::info;

use crate::schema::{ConfigError, RunConfig, Seed};

use super::control::{STATUS_INTERVAL, SnapshotExporter, run_control, run_ticker};
use super::events::{Command, Event, Phase};
use super::grid::{Cell, Grid};
use super::workers::WorkerPool;

/// Errors that abort a local run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("final snapshot export failed: {0}")]
    Export(#[source] io::Error),
}

/// State shared between the turn engine, control surface, and ticker.
///
/// The grid buffers, turn counter, and pause flag are the only shared
/// mutable state; every access goes through the one mutex.
pub(crate) struct EngineState {
    pub current: Grid,
    pub next: Grid,
    pub turn: u32,
    pub phase: Phase,
}

pub(crate) struct EngineShared {
    state: Mutex<EngineState>,
    resumed: Condvar,
}

impl EngineShared {
    pub(crate) fn new(current: Grid, next: Grid) -> Self {
        Self {
            state: Mutex::new(EngineState {
                current,
                next,
                turn: 0,
                phase: Phase::Executing,
            }),
            resumed: Condvar::new(),
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().expect("engine state lock poisoned")
    }

    pub(crate) fn notify(&self) {
        self.resumed.notify_all();
    }

    fn wait<'a>(&self, guard: MutexGuard<'a, EngineState>) -> MutexGuard<'a, EngineState> {
        self.resumed
            .wait(guard)
            .expect("engine state lock poisoned")
    }

    pub(crate) fn wait_timeout<'a>(
        &self,
        guard: MutexGuard<'a, EngineState>,
        timeout: Duration,
    ) -> (MutexGuard<'a, EngineState>, bool) {
        let (guard, result) = self
            .resumed
            .wait_timeout(guard, timeout)
            .expect("engine state lock poisoned");
        (guard, result.timed_out())
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Number of fully completed turns.
    pub turns: u32,
    /// Final grid.
    pub grid: Grid,
    /// Alive cells in the final grid.
    pub alive: Vec<Cell>,
}

/// Run a full local simulation.
///
/// Spawns the control surface and the periodic reporter as threads, then
/// drives the worker pool one generation at a time on the calling thread.
/// Per completed turn the engine emits `CellsFlipped`, `AliveCellsCount`,
/// and `TurnComplete`, in that order. On quit or budget exhaustion it emits
/// `FinalTurnComplete`, hands the grid to the exporter, emits
/// `ImageOutputComplete` and a final `StateChange`, and closes the event
/// stream.
pub fn run_local(
    config: &RunConfig,
    seed: &Seed,
    events: Sender<Event>,
    commands: Receiver<Command>,
    exporter: Arc<dyn SnapshotExporter>,
) -> Result<RunSummary, EngineError> {
    config.validate()?;

    let current = seed.generate(config.width, config.height);
    let next = Grid::new(config.width, config.height);
    let pool = WorkerPool::new(config.workers);
    let shared = Arc::new(EngineShared::new(current, next));

    info!(
        "starting {}x{} run: {} turns across {} workers",
        config.width, config.height, config.turns, config.workers
    );
    let _ = events.send(Event::StateChange {
        turn: 0,
        phase: Phase::Executing,
    });

    let control = {
        let shared = Arc::clone(&shared);
        let events = events.clone();
        let exporter = Arc::clone(&exporter);
        thread::spawn(move || run_control(shared, commands, events, exporter))
    };
    let ticker = {
        let shared = Arc::clone(&shared);
        let events = events.clone();
        thread::spawn(move || run_ticker(shared, events, STATUS_INTERVAL))
    };

    loop {
        let mut state = shared.lock();
        // Pause blocks here instead of spinning; resume/quit notify the condvar
        while state.phase == Phase::Paused {
            state = shared.wait(state);
        }
        if state.phase == Phase::Quitting || state.turn >= config.turns {
            break;
        }

        let EngineState { current, next, .. } = &mut *state;
        let flipped = pool.step_into(current, next);
        std::mem::swap(current, next);
        state.turn += 1;
        let turn = state.turn;
        let count = state.current.alive_count();
        drop(state);

        let _ = events.send(Event::CellsFlipped {
            turn,
            cells: flipped,
        });
        let _ = events.send(Event::AliveCellsCount { turn, count });
        let _ = events.send(Event::TurnComplete { turn });
    }

    {
        let mut state = shared.lock();
        state.phase = Phase::Quitting;
    }
    shared.notify();

    // Join the helper threads before the final sequence so no event can
    // trail the stream-terminating StateChange
    ticker.join().expect("ticker thread panicked");
    control.join().expect("control thread panicked");

    let (turn, grid) = {
        let state = shared.lock();
        (state.turn, state.current.clone())
    };
    let alive = grid.alive_cells();
    info!("run finished after {turn} turns, {} cells alive", alive.len());

    let _ = events.send(Event::FinalTurnComplete {
        turn,
        cells: alive.clone(),
    });
    let label = exporter.export(&grid, turn).map_err(EngineError::Export)?;
    let _ = events.send(Event::ImageOutputComplete { turn, label });
    let _ = events.send(Event::StateChange {
        turn,
        phase: Phase::Quitting,
    });
    drop(events);

    Ok(RunSummary { turns: turn, grid, alive })
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use super::*;
    use crate::schema::Pattern;

    struct NullExporter;

    impl SnapshotExporter for NullExporter {
        fn export(&self, grid: &Grid, turn: u32) -> io::Result<String> {
            Ok(format!("{}x{}-{}", grid.width(), grid.height(), turn))
        }
    }

    fn blinker_config(turns: u32) -> (RunConfig, Seed) {
        (
            RunConfig {
                width: 8,
                height: 8,
                turns,
                workers: 3,
            },
            Seed {
                pattern: Pattern::Blinker { origin: (2, 3) },
            },
        )
    }

    fn collect_run(turns: u32) -> (RunSummary, Vec<Event>) {
        let (config, seed) = blinker_config(turns);
        let (events_tx, events_rx) = mpsc::channel();
        let (_commands_tx, commands_rx) = mpsc::channel();

        let summary = run_local(&config, &seed, events_tx, commands_rx, Arc::new(NullExporter))
            .expect("run failed");
        let events: Vec<Event> = events_rx.iter().collect();
        (summary, events)
    }

    #[test]
    fn test_budget_exhaustion_completes_all_turns() {
        let (summary, events) = collect_run(6);
        assert_eq!(summary.turns, 6);

        let completed: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                Event::TurnComplete { turn } => Some(*turn),
                _ => None,
            })
            .collect();
        assert_eq!(completed, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_event_stream_well_formed() {
        let (_, events) = collect_run(4);

        let finals = events
            .iter()
            .filter(|e| matches!(e, Event::FinalTurnComplete { .. }))
            .count();
        assert_eq!(finals, 1, "exactly one FinalTurnComplete");

        // Stream terminates with export-complete then the Quitting transition
        let tail: Vec<&Event> = events.iter().rev().take(3).collect();
        assert!(matches!(
            tail[0],
            Event::StateChange {
                phase: Phase::Quitting,
                ..
            }
        ));
        assert!(matches!(tail[1], Event::ImageOutputComplete { .. }));
        assert!(matches!(tail[2], Event::FinalTurnComplete { .. }));

        // First event announces Executing at turn 0
        assert_eq!(
            events[0],
            Event::StateChange {
                turn: 0,
                phase: Phase::Executing,
            }
        );
    }

    #[test]
    fn test_per_turn_event_order_and_monotonic_turns() {
        let (_, events) = collect_run(5);

        let mut last_complete = 0;
        for window in events.windows(2) {
            if let Event::CellsFlipped { turn, .. } = &window[0] {
                assert!(
                    matches!(&window[1], Event::AliveCellsCount { turn: t, .. } if t == turn),
                    "count must directly follow the change set"
                );
            }
            if let Event::TurnComplete { turn } = &window[0] {
                assert_eq!(*turn, last_complete + 1);
                last_complete = *turn;
            }
        }
    }

    #[test]
    fn test_blinker_run_returns_to_start_on_even_turns() {
        let (summary, _) = collect_run(4);
        assert_eq!(
            summary.alive,
            vec![
                Cell { x: 2, y: 3 },
                Cell { x: 3, y: 3 },
                Cell { x: 4, y: 3 }
            ]
        );
    }

    #[test]
    fn test_quit_command_stops_before_budget() {
        let (config, seed) = blinker_config(u32::MAX);
        let (events_tx, events_rx) = mpsc::channel();
        let (commands_tx, commands_rx) = mpsc::channel();

        commands_tx.send(Command::Quit).unwrap();

        let summary = run_local(&config, &seed, events_tx, commands_rx, Arc::new(NullExporter))
            .expect("run failed");
        assert!(summary.turns < u32::MAX);

        let finals = events_rx
            .iter()
            .filter(|e| matches!(e, Event::FinalTurnComplete { .. }))
            .count();
        assert_eq!(finals, 1);
    }

    #[test]
    fn test_save_command_exports_without_advancing_state() {
        let (config, seed) = blinker_config(200);
        let (events_tx, events_rx) = mpsc::channel();
        let (commands_tx, commands_rx) = mpsc::channel();

        commands_tx.send(Command::Save).unwrap();

        let summary = run_local(&config, &seed, events_tx, commands_rx, Arc::new(NullExporter))
            .expect("run failed");
        assert_eq!(summary.turns, 200);

        // One save export plus the final export
        let exports = events_rx
            .iter()
            .filter(|e| matches!(e, Event::ImageOutputComplete { .. }))
            .count();
        assert_eq!(exports, 2);
    }

    #[test]
    fn test_invalid_config_rejected_before_run() {
        let (mut config, seed) = blinker_config(1);
        config.workers = 0;
        let (events_tx, events_rx) = mpsc::channel();
        let (_commands_tx, commands_rx) = mpsc::channel();

        let result = run_local(&config, &seed, events_tx, commands_rx, Arc::new(NullExporter));
        assert!(matches!(result, Err(EngineError::Config(_))));
        // Nothing was emitted before the rejection
        assert!(events_rx.iter().next().is_none());
    }

    #[test]
    fn test_turn_counter_frozen_while_paused() {
        let (config, seed) = blinker_config(u32::MAX);
        let (events_tx, events_rx) = mpsc::channel();
        let (commands_tx, commands_rx) = mpsc::channel();

        let runner = thread::spawn(move || {
            run_local(&config, &seed, events_tx, commands_rx, Arc::new(NullExporter))
        });

        commands_tx.send(Command::Pause).unwrap();

        // Drain the stream until the pause transition shows up
        let mut events = Vec::new();
        loop {
            let event = events_rx
                .recv_timeout(Duration::from_secs(5))
                .expect("pause never observed");
            let paused = matches!(
                event,
                Event::StateChange {
                    phase: Phase::Paused,
                    ..
                }
            );
            events.push(event);
            if paused {
                break;
            }
        }

        // Plenty of time for the engine to advance if pause did not freeze it
        thread::sleep(Duration::from_millis(100));

        commands_tx.send(Command::Resume).unwrap();
        commands_tx.send(Command::Quit).unwrap();
        runner
            .join()
            .expect("runner thread panicked")
            .expect("run failed");
        events.extend(events_rx.iter());

        let paused_at = events
            .iter()
            .position(|e| {
                matches!(
                    e,
                    Event::StateChange {
                        phase: Phase::Paused,
                        ..
                    }
                )
            })
            .expect("pause transition missing");
        let resumed_at = events[paused_at..]
            .iter()
            .position(|e| {
                matches!(
                    e,
                    Event::StateChange {
                        phase: Phase::Executing,
                        ..
                    }
                )
            })
            .map(|i| paused_at + i)
            .expect("resume transition missing");

        // Pause lands at a generation boundary, so at most the one in-flight
        // generation may still commit after the transition
        let committed_while_paused = events[paused_at..resumed_at]
            .iter()
            .filter(|e| matches!(e, Event::TurnComplete { .. }))
            .count();
        assert!(
            committed_while_paused <= 1,
            "turn counter advanced {committed_while_paused} times while paused"
        );
    }

    #[test]
    fn test_pause_resume_round_trip() {
        let (config, seed) = blinker_config(50);
        let (events_tx, events_rx) = mpsc::channel();
        let (commands_tx, commands_rx) = mpsc::channel();

        commands_tx.send(Command::Pause).unwrap();
        commands_tx.send(Command::Resume).unwrap();

        let summary = run_local(&config, &seed, events_tx, commands_rx, Arc::new(NullExporter))
            .expect("run failed");
        assert_eq!(summary.turns, 50);

        // Regardless of where the pause landed, the stream stays well formed
        let finals = events_rx
            .iter()
            .filter(|e| matches!(e, Event::FinalTurnComplete { .. }))
            .count();
        assert_eq!(finals, 1);
    }
}
