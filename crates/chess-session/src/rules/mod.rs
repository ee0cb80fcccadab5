//! Rules engine abstraction.
//!
//! The session never decides legality itself. Everything board-specific is
//! delegated to a [`RulesEngine`], which must be deterministic and free of
//! side effects so that replaying the same moves always yields the same
//! positions.

mod standard;

pub use standard::StandardRules;

use std::fmt;

use thiserror::Error;

use crate::position::{BoardMove, Position, PositionError};
use crate::Side;

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The side to move is checkmated.
    Checkmate { winner: Side },
    /// The side to move has no legal moves but is not in check.
    Stalemate,
    /// Neither side can deliver mate.
    InsufficientMaterial,
    /// The same position occurred three times.
    ThreefoldRepetition,
    /// 100 half-moves without a capture or pawn move.
    FiftyMoveRule,
}

impl Termination {
    /// The winning side, or `None` for draws.
    pub const fn winner(self) -> Option<Side> {
        match self {
            Termination::Checkmate { winner } => Some(winner),
            _ => None,
        }
    }

    /// PGN result string ("1-0", "0-1" or "1/2-1/2").
    pub const fn result(self) -> &'static str {
        match self {
            Termination::Checkmate {
                winner: Side::White,
            } => "1-0",
            Termination::Checkmate {
                winner: Side::Black,
            } => "0-1",
            _ => "1/2-1/2",
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Checkmate {
                winner: Side::White,
            } => write!(f, "checkmate, white wins"),
            Termination::Checkmate {
                winner: Side::Black,
            } => write!(f, "checkmate, black wins"),
            Termination::Stalemate => write!(f, "draw by stalemate"),
            Termination::InsufficientMaterial => write!(f, "draw by insufficient material"),
            Termination::ThreefoldRepetition => write!(f, "draw by threefold repetition"),
            Termination::FiftyMoveRule => write!(f, "draw by the fifty-move rule"),
        }
    }
}

/// Why the rules engine refused a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalReason {
    /// The move is not among the legal moves of the position.
    NotLegal,
    /// The position is already terminal.
    GameOver,
}

impl fmt::Display for IllegalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IllegalReason::NotLegal => write!(f, "not legal in this position"),
            IllegalReason::GameOver => write!(f, "the game is over"),
        }
    }
}

/// A move rejected by the rules engine.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("illegal move {mv}: {reason}")]
pub struct Illegal {
    pub mv: BoardMove,
    pub reason: IllegalReason,
}

impl Illegal {
    pub const fn new(mv: BoardMove, reason: IllegalReason) -> Self {
        Self { mv, reason }
    }
}

/// The outcome of applying one legal move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    /// The move as it was played, promotion defaults filled in.
    pub mv: BoardMove,
    /// The position after the move.
    pub position: Position,
    /// Set when the new position ends the game.
    pub terminal: Option<Termination>,
    /// Standard algebraic notation with check or mate suffix.
    pub san: String,
    /// Whether the move captured a piece.
    pub capture: bool,
}

/// Trait for the collaborator that owns the rules of the game.
///
/// # Example
///
/// ```
/// use chess_session::rules::{RulesEngine, StandardRules};
///
/// let rules = StandardRules;
/// let start = rules.initial_position();
/// let applied = rules.apply_move(&start, "e2e4".parse().unwrap()).unwrap();
/// assert_eq!(applied.san, "e4");
/// ```
pub trait RulesEngine {
    /// Returns the initial position.
    fn initial_position(&self) -> Position;

    /// Builds a position from FEN.
    fn position_from_fen(&self, fen: &str) -> Result<Position, PositionError>;

    /// Applies `mv` to `position`, returning the successor position.
    fn apply_move(&self, position: &Position, mv: BoardMove) -> Result<Applied, Illegal>;

    /// Returns all legal moves in the position.
    fn legal_moves(&self, position: &Position) -> Vec<BoardMove>;

    /// Returns the termination reason if the position ends the game.
    fn terminal(&self, position: &Position) -> Option<Termination>;

    /// Returns true if `mv` can be played in `position`.
    fn is_legal(&self, position: &Position, mv: BoardMove) -> bool {
        self.apply_move(position, mv).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn termination_results() {
        assert_eq!(
            Termination::Checkmate {
                winner: Side::White
            }
            .result(),
            "1-0"
        );
        assert_eq!(Termination::Stalemate.result(), "1/2-1/2");
        assert_eq!(Termination::FiftyMoveRule.winner(), None);
        assert_eq!(
            Termination::Checkmate {
                winner: Side::Black
            }
            .winner(),
            Some(Side::Black)
        );
    }

    #[test]
    fn illegal_display() {
        let err = Illegal::new("e2e5".parse().unwrap(), IllegalReason::NotLegal);
        assert_eq!(err.to_string(), "illegal move e2e5: not legal in this position");
    }
}
