//! Client side of the remote evolution protocol.

use std::io::BufReader;
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::mpsc::Sender;

use log::info;

use crate::engine::{Event, Grid, Phase, RunSummary};
use crate::schema::{RunConfig, Seed};

use super::protocol::{EvolveRequest, EvolveResponse, RemoteError, read_message, write_message};

/// One connection, good for exactly one evolution call.
pub struct RemoteClient {
    stream: TcpStream,
}

impl RemoteClient {
    /// Dial the evolution server. A failure here is fatal to the run.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, RemoteError> {
        let stream = TcpStream::connect(addr).map_err(RemoteError::Connect)?;
        Ok(Self { stream })
    }

    /// Issue the single evolution call and block for the response.
    ///
    /// Consumes the client: the protocol allows one call per connection,
    /// and the response is all-or-nothing.
    pub fn evolve(mut self, request: &EvolveRequest) -> Result<EvolveResponse, RemoteError> {
        write_message(&mut self.stream, request)?;
        let mut reader = BufReader::new(self.stream);
        read_message(&mut reader)
    }
}

/// Offload a whole run to a remote evolution server.
///
/// Loads the initial grid, issues exactly one call, and reports the final
/// state on the event stream. There is no pause/resume and no per-turn
/// reporting on this path; a connection or call error aborts the run.
pub fn run_remote(
    config: &RunConfig,
    seed: &Seed,
    events: Sender<Event>,
    addr: impl ToSocketAddrs,
) -> Result<RunSummary, RemoteError> {
    config.validate()?;

    let world = seed.generate(config.width, config.height);
    let _ = events.send(Event::StateChange {
        turn: 0,
        phase: Phase::Executing,
    });

    let client = RemoteClient::connect(addr)?;
    info!(
        "offloading {}x{} run of {} turns to remote server",
        config.width, config.height, config.turns
    );

    let request = EvolveRequest {
        scratch: Grid::new(config.width, config.height),
        width: config.width,
        height: config.height,
        turns: config.turns,
        world,
    };
    let response = client.evolve(&request)?;

    let turn = response.completed_turns;
    let alive = response.world.alive_cells();
    info!("remote run finished after {turn} turns, {} cells alive", alive.len());

    let _ = events.send(Event::FinalTurnComplete {
        turn,
        cells: alive.clone(),
    });
    let _ = events.send(Event::StateChange {
        turn,
        phase: Phase::Quitting,
    });
    drop(events);

    Ok(RunSummary {
        turns: turn,
        grid: response.world,
        alive,
    })
}
