//! Wire messages and framing for the remote evolution protocol.
//!
//! Messages are newline-delimited JSON: one request line, one response
//! line per connection. No versioning, no authentication.

use std::io::{self, BufRead, Write};

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::engine::Grid;
use crate::schema::ConfigError;

/// Request for a whole-run evolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolveRequest {
    /// Initial world state.
    pub world: Grid,
    /// Scratch buffer the server evolves into; same dimensions as `world`.
    pub scratch: Grid,
    /// Grid width in cells.
    pub width: usize,
    /// Grid height in cells.
    pub height: usize,
    /// Number of turns to run.
    pub turns: u32,
}

/// Response carrying the completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolveResponse {
    /// Final world state.
    pub world: Grid,
    /// Turns actually completed; always equals the requested count.
    pub completed_turns: u32,
}

/// Errors crossing the remote boundary. All are fatal; none are retried.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("failed to connect to evolution server: {0}")]
    Connect(#[source] io::Error),
    #[error("evolution call failed: {0}")]
    Call(#[source] io::Error),
    #[error("malformed wire message: {0}")]
    Protocol(#[from] serde_json::Error),
    #[error("peer closed the connection before replying")]
    PeerClosed,
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Write one message as a single JSON line.
pub fn write_message<T: Serialize, W: Write>(writer: &mut W, message: &T) -> Result<(), RemoteError> {
    let line = serde_json::to_string(message)?;
    writer.write_all(line.as_bytes()).map_err(RemoteError::Call)?;
    writer.write_all(b"\n").map_err(RemoteError::Call)?;
    writer.flush().map_err(RemoteError::Call)?;
    Ok(())
}

/// Read one JSON-line message.
pub fn read_message<T: DeserializeOwned, R: BufRead>(reader: &mut R) -> Result<T, RemoteError> {
    let mut line = String::new();
    let read = reader.read_line(&mut line).map_err(RemoteError::Call)?;
    if read == 0 {
        return Err(RemoteError::PeerClosed);
    }
    Ok(serde_json::from_str(line.trim_end())?)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::engine::ALIVE;

    #[test]
    fn test_request_survives_the_wire() {
        let mut world = Grid::new(4, 4);
        world.set(1, 2, ALIVE);
        let request = EvolveRequest {
            scratch: Grid::new(4, 4),
            width: 4,
            height: 4,
            turns: 9,
            world,
        };

        let mut wire = Vec::new();
        write_message(&mut wire, &request).unwrap();
        assert_eq!(*wire.last().unwrap(), b'\n');

        let decoded: EvolveRequest = read_message(&mut Cursor::new(wire)).unwrap();
        assert_eq!(decoded.turns, 9);
        assert_eq!(decoded.world.get(1, 2), ALIVE);
    }

    #[test]
    fn test_closed_peer_is_detected() {
        let result: Result<EvolveResponse, _> = read_message(&mut Cursor::new(Vec::new()));
        assert!(matches!(result, Err(RemoteError::PeerClosed)));
    }

    #[test]
    fn test_garbage_is_a_protocol_error() {
        let result: Result<EvolveResponse, _> =
            read_message(&mut Cursor::new(b"not json\n".to_vec()));
        assert!(matches!(result, Err(RemoteError::Protocol(_))));
    }
}
