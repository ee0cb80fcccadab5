use thiserror::Error;

use crate::ledger::LedgerError;
use crate::position::{BoardMove, PositionError};
use crate::rules::Illegal;
use crate::service::ServiceError;

/// Errors returned by session operations.
///
/// A failed operation leaves the session exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Illegal(#[from] Illegal),

    #[error("it is not the human's turn")]
    NotYourTurn,

    #[error("no human and engine move pair to undo")]
    NothingToUndo,

    #[error("no moves to redo")]
    EmptyRedo,

    #[error("undone move {0} can no longer be replayed")]
    StaleRedo(BoardMove),

    /// An engine reply arrived for a position the session has left.
    #[error("stale engine response for ply {tagged} (now at ply {current})")]
    StaleResponse { tagged: usize, current: usize },

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("the game is over")]
    GameAlreadyOver,

    #[error("cannot rewind to ply {ply}")]
    InvalidPly { ply: usize },

    /// A move record did not follow the ledger head. Indicates a bug in the
    /// caller, never a user mistake.
    #[error("move history out of order: expected ply {expected}, got ply {got}")]
    HistoryOutOfOrder { expected: usize, got: usize },

    #[error(transparent)]
    InvalidFen(#[from] PositionError),

    #[error("session closed")]
    SessionClosed,
}

impl From<LedgerError> for SessionError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::EmptyHistory => SessionError::NothingToUndo,
            LedgerError::EmptyRedo => SessionError::EmptyRedo,
            LedgerError::StaleRedo(mv) => SessionError::StaleRedo(mv),
            LedgerError::NonContiguous { expected, got } => {
                SessionError::HistoryOutOfOrder { expected, got }
            }
        }
    }
}
