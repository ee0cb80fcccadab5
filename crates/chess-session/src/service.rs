//! Engine service contract.

use async_trait::async_trait;
use thiserror::Error;

use crate::position::BoardMove;

/// Errors an engine service can report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The service could not be reached or has shut down.
    #[error("engine service unavailable: {0}")]
    Unavailable(String),
    /// The engine found no move to play.
    #[error("engine returned no move")]
    NoMove,
    /// The reply could not be understood.
    #[error("invalid engine response: {0}")]
    InvalidResponse(String),
    /// Talking to the engine failed at the I/O level.
    #[error("engine I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::Io(e.to_string())
    }
}

/// A collaborator that suggests moves for a position.
///
/// Requests carry no identifier and replies may arrive in any order, so
/// callers tag each request themselves.
#[async_trait]
pub trait EngineService: Send + Sync {
    /// Suggests the best move for the position given in FEN, searching to `depth`.
    async fn suggest_move(&self, fen: &str, depth: u32) -> Result<BoardMove, ServiceError>;
}
