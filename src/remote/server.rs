//! Server side of the remote evolution protocol.
//!
//! Stateless across calls: each connection carries one request, gets one
//! response, and nothing is retained after the reply.

use std::io::BufReader;
use std::net::{TcpListener, TcpStream};

use log::{info, warn};

use crate::engine::Grid;

use super::protocol::{EvolveRequest, EvolveResponse, RemoteError, read_message, write_message};

/// Run the requested number of generations serially.
///
/// Uses the same rule evaluator as the parallel local path, one full-grid
/// step per turn with a buffer swap. Always completes the full budget;
/// there is no early-exit path.
pub fn evolve(request: EvolveRequest) -> EvolveResponse {
    let mut world = request.world;
    let mut scratch = request.scratch;
    if scratch.width() != world.width() || scratch.height() != world.height() {
        scratch = Grid::new(world.width(), world.height());
    }

    let mut turn = 0;
    while turn < request.turns {
        world.step_into(&mut scratch);
        std::mem::swap(&mut world, &mut scratch);
        turn += 1;
    }

    EvolveResponse {
        world,
        completed_turns: turn,
    }
}

fn handle_connection(stream: TcpStream) -> Result<(), RemoteError> {
    let peer = stream.peer_addr().map_err(RemoteError::Call)?;
    let mut reader = BufReader::new(stream.try_clone().map_err(RemoteError::Call)?);

    let request: EvolveRequest = read_message(&mut reader)?;
    info!(
        "evolving {}x{} world for {} turns (peer {peer})",
        request.width, request.height, request.turns
    );

    let response = evolve(request);
    let mut stream = stream;
    write_message(&mut stream, &response)
}

/// Accept connections and serve one evolution call per connection.
///
/// Per-connection failures are logged and do not stop the server.
pub fn serve(listener: TcpListener) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("evolution server listening on {addr}");
    }
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                if let Err(err) = handle_connection(stream) {
                    warn!("connection failed: {err}");
                }
            }
            Err(err) => warn!("accept failed: {err}"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Pattern, Seed};

    #[test]
    fn test_evolve_matches_serial_reference() {
        let seed = Seed {
            pattern: Pattern::Random {
                density: 0.35,
                seed: 99,
            },
        };
        let start = seed.generate(12, 12);

        let mut reference = start.clone();
        let mut buffer = Grid::new(12, 12);
        for _ in 0..8 {
            reference.step_into(&mut buffer);
            std::mem::swap(&mut reference, &mut buffer);
        }

        let response = evolve(EvolveRequest {
            scratch: Grid::new(12, 12),
            width: 12,
            height: 12,
            turns: 8,
            world: start,
        });

        assert_eq!(response.completed_turns, 8);
        assert_eq!(response.world, reference);
    }

    #[test]
    fn test_zero_turns_is_identity() {
        let seed = Seed {
            pattern: Pattern::Glider { origin: (1, 1) },
        };
        let start = seed.generate(8, 8);

        let response = evolve(EvolveRequest {
            scratch: Grid::new(8, 8),
            width: 8,
            height: 8,
            turns: 0,
            world: start.clone(),
        });

        assert_eq!(response.completed_turns, 0);
        assert_eq!(response.world, start);
    }

    #[test]
    fn test_mismatched_scratch_is_replaced() {
        let seed = Seed {
            pattern: Pattern::Blinker { origin: (2, 2) },
        };
        let start = seed.generate(6, 6);

        let response = evolve(EvolveRequest {
            scratch: Grid::new(2, 2),
            width: 6,
            height: 6,
            turns: 2,
            world: start.clone(),
        });

        // Blinker has period two
        assert_eq!(response.world, start);
    }
}
