//! Control surface - command consumption, paused-state reporting, and the
//! snapshot export seam.
//!
//! All state mutation happens under the same lock the turn engine uses for
//! its buffer swap, so a pause or save can never observe a grid mid-swap.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use log::{debug, warn};

use super::events::{Command, Event, Phase};
use super::grid::Grid;
use super::turn::EngineShared;

/// Interval between alive-cell reports while paused.
pub const STATUS_INTERVAL: Duration = Duration::from_secs(2);

/// How often the command loop re-checks for engine shutdown.
const COMMAND_POLL: Duration = Duration::from_millis(50);

/// External sink that persists labeled grid snapshots.
///
/// The grid carries its own dimensions, so both the save path and the quit
/// path hand over exactly the same arguments. Export is synchronous; the
/// caller waits for the returned label.
pub trait SnapshotExporter: Send + Sync {
    fn export(&self, grid: &Grid, turn: u32) -> io::Result<String>;
}

/// Exporter writing binary PGM snapshots named `{width}x{height}-{turn}.pgm`.
pub struct FileExporter {
    dir: PathBuf,
}

impl FileExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SnapshotExporter for FileExporter {
    fn export(&self, grid: &Grid, turn: u32) -> io::Result<String> {
        let label = format!("{}x{}-{}", grid.width(), grid.height(), turn);
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{label}.pgm"));
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(writer, "P5")?;
        writeln!(writer, "{} {}", grid.width(), grid.height())?;
        writeln!(writer, "255")?;
        writer.write_all(grid.cells())?;
        writer.flush()?;
        Ok(label)
    }
}

/// Command loop: consume tokens until the engine quits.
///
/// Runs on its own thread. Exits when the engine reaches `Quitting`, when a
/// quit command arrives, or when the command source disconnects.
pub(crate) fn run_control(
    shared: Arc<EngineShared>,
    commands: Receiver<Command>,
    events: Sender<Event>,
    exporter: Arc<dyn SnapshotExporter>,
) {
    loop {
        match commands.recv_timeout(COMMAND_POLL) {
            Ok(Command::Pause) => {
                let mut state = shared.lock();
                if state.phase == Phase::Executing {
                    state.phase = Phase::Paused;
                    let turn = state.turn;
                    drop(state);
                    debug!("paused at turn {turn}");
                    let _ = events.send(Event::StateChange {
                        turn,
                        phase: Phase::Paused,
                    });
                }
            }
            Ok(Command::Resume) => {
                let mut state = shared.lock();
                if state.phase == Phase::Paused {
                    state.phase = Phase::Executing;
                    let turn = state.turn;
                    drop(state);
                    shared.notify();
                    debug!("resumed at turn {turn}");
                    let _ = events.send(Event::StateChange {
                        turn,
                        phase: Phase::Executing,
                    });
                }
            }
            Ok(Command::Save) => {
                // Clone under the lock, export outside it
                let (grid, turn) = {
                    let state = shared.lock();
                    (state.current.clone(), state.turn)
                };
                match exporter.export(&grid, turn) {
                    Ok(label) => {
                        let _ = events.send(Event::ImageOutputComplete { turn, label });
                    }
                    Err(err) => warn!("snapshot export failed at turn {turn}: {err}"),
                }
            }
            Ok(Command::Quit) => {
                let mut state = shared.lock();
                if state.phase != Phase::Quitting {
                    state.phase = Phase::Quitting;
                    drop(state);
                    shared.notify();
                }
                return;
            }
            Err(RecvTimeoutError::Timeout) => {
                if shared.lock().phase == Phase::Quitting {
                    return;
                }
            }
            Err(RecvTimeoutError::Disconnected) => return,
        }
    }
}

/// Periodic reporter: emit an alive-cell count while the engine is paused.
///
/// While executing, the per-turn `AliveCellsCount` event covers this duty,
/// so the ticker stays quiet to avoid duplicate reporting.
pub(crate) fn run_ticker(shared: Arc<EngineShared>, events: Sender<Event>, interval: Duration) {
    let mut state = shared.lock();
    loop {
        if state.phase == Phase::Quitting {
            return;
        }
        let (guard, _timeout) = shared.wait_timeout(state, interval);
        state = guard;
        if state.phase == Phase::Paused {
            let _ = events.send(Event::AliveCellsCount {
                turn: state.turn,
                count: state.current.alive_count(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::sync::mpsc;
    use std::thread;

    use super::*;
    use crate::engine::grid::ALIVE;

    #[test]
    fn test_ticker_reports_only_while_paused() {
        let mut grid = Grid::new(4, 4);
        grid.set(1, 1, ALIVE);
        grid.set(2, 2, ALIVE);
        let shared = Arc::new(EngineShared::new(grid, Grid::new(4, 4)));
        let (events_tx, events_rx) = mpsc::channel();

        let ticker = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || run_ticker(shared, events_tx, Duration::from_millis(5)))
        };

        // Executing: the per-turn events cover reporting, ticker stays quiet
        thread::sleep(Duration::from_millis(40));
        assert!(events_rx.try_recv().is_err());

        shared.lock().phase = Phase::Paused;
        thread::sleep(Duration::from_millis(60));

        shared.lock().phase = Phase::Quitting;
        shared.notify();
        ticker.join().expect("ticker thread panicked");

        let reports: Vec<Event> = events_rx.iter().collect();
        assert!(!reports.is_empty(), "paused ticker must report");
        for report in &reports {
            assert_eq!(
                *report,
                Event::AliveCellsCount { turn: 0, count: 2 },
                "ticker emits only alive-cell counts"
            );
        }
    }

    #[test]
    fn test_file_exporter_writes_labeled_pgm() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = FileExporter::new(dir.path());

        let mut grid = Grid::new(4, 3);
        grid.set(1, 1, ALIVE);

        let label = exporter.export(&grid, 7).unwrap();
        assert_eq!(label, "4x3-7");

        let mut contents = Vec::new();
        File::open(dir.path().join("4x3-7.pgm"))
            .unwrap()
            .read_to_end(&mut contents)
            .unwrap();

        let header = b"P5\n4 3\n255\n";
        assert_eq!(&contents[..header.len()], header);
        assert_eq!(contents.len(), header.len() + 12);
        assert_eq!(contents[header.len() + 5], ALIVE);
    }
}
