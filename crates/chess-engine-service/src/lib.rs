//! Engine service backed by a UCI chess engine.
//!
//! [`UciEngineService`] runs an engine such as Stockfish as a subprocess and
//! implements [`chess_session::EngineService`] on top of it: each request
//! sends `position fen <fen>` and `go depth <n>` and waits for `bestmove`.

mod engine;

pub use engine::{UciEngineService, HANDSHAKE_TIMEOUT, MAX_SEARCH_LINES, MAX_UCI_LINES};

use chess_session::ServiceError;
use thiserror::Error;

/// Errors that can occur when working with a UCI engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine process or talk to it.
    #[error("Failed to spawn engine: {0}")]
    SpawnError(#[from] std::io::Error),
    /// Engine executable was not found.
    #[error("Engine not found: {0}")]
    NotFound(String),
    /// Engine failed to initialize properly (UCI handshake failed).
    #[error("Engine initialization failed")]
    InitFailed,
    /// Engine returned an invalid or unexpected response.
    #[error("Invalid engine response: {0}")]
    InvalidResponse(String),
    /// The engine closed its output.
    #[error("Engine exited")]
    Closed,
}

impl From<EngineError> for ServiceError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::SpawnError(io) => ServiceError::Io(io.to_string()),
            EngineError::InvalidResponse(msg) => ServiceError::InvalidResponse(msg),
            other => ServiceError::Unavailable(other.to_string()),
        }
    }
}
