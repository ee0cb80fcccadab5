//! Immutable positions and board moves.

use std::fmt;
use std::str::FromStr;

use shakmaty::fen::Fen;
use shakmaty::uci::UciMove;
use shakmaty::zobrist::Zobrist64;
use shakmaty::{CastlingMode, Chess, EnPassantMode, Move, Position as _};
use thiserror::Error;

use crate::{PieceKind, Side, Square};

/// Errors produced while building a [`Position`] from external input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    /// The FEN string could not be parsed or describes an impossible position.
    #[error("invalid FEN '{fen}': {reason}")]
    InvalidFen { fen: String, reason: String },
}

/// Error returned when a move string is not in UCI long algebraic form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid move notation: {0}")]
pub struct MoveParseError(pub String);

/// Full game state at a ply.
///
/// A `Position` is never modified in place. The rules engine produces a new
/// one for every applied move, carrying forward the hashes needed for
/// repetition detection.
#[derive(Debug, Clone)]
pub struct Position {
    chess: Chess,
    /// Hashes of every position since the last irreversible move, this one last.
    repetitions: Vec<Zobrist64>,
}

impl Position {
    /// The standard starting position.
    pub fn starting() -> Self {
        Self::from_chess(Chess::default())
    }

    /// Parses a position from FEN.
    pub fn from_fen(fen: &str) -> Result<Self, PositionError> {
        let invalid = |reason: String| PositionError::InvalidFen {
            fen: fen.to_string(),
            reason,
        };
        let parsed: Fen = fen.trim().parse().map_err(|e| invalid(format!("{e}")))?;
        let chess: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| invalid(format!("{e}")))?;
        Ok(Self::from_chess(chess))
    }

    pub(crate) fn from_chess(chess: Chess) -> Self {
        let hash = chess.zobrist_hash::<Zobrist64>(EnPassantMode::Legal);
        Self {
            chess,
            repetitions: vec![hash],
        }
    }

    /// Builds the successor of `self` after `chess` was reached by one move.
    pub(crate) fn successor(&self, chess: Chess) -> Self {
        let hash = chess.zobrist_hash::<Zobrist64>(EnPassantMode::Legal);
        let repetitions = if chess.halfmoves() == 0 {
            vec![hash]
        } else {
            let mut seen = self.repetitions.clone();
            seen.push(hash);
            seen
        };
        Self { chess, repetitions }
    }

    /// The underlying rules-library position.
    pub fn chess(&self) -> &Chess {
        &self.chess
    }

    /// The side to move.
    pub fn side_to_move(&self) -> Side {
        self.chess.turn()
    }

    /// Returns true if the side to move is in check.
    pub fn is_check(&self) -> bool {
        self.chess.is_check()
    }

    /// Half-moves since the last capture or pawn move.
    pub fn halfmove_clock(&self) -> u32 {
        self.chess.halfmoves()
    }

    /// The full move number, starting at 1.
    pub fn fullmove_number(&self) -> u32 {
        self.chess.fullmoves().get()
    }

    /// How many times the current position has occurred since the last
    /// irreversible move.
    pub fn repetition_count(&self) -> usize {
        match self.repetitions.last() {
            Some(current) => self.repetitions.iter().filter(|h| *h == current).count(),
            None => 0,
        }
    }

    /// The piece kind standing on `square`, if any.
    pub fn piece_kind_at(&self, square: Square) -> Option<PieceKind> {
        self.chess.board().role_at(square)
    }

    /// FEN encoding, the wire format sent to engine services.
    pub fn to_fen(&self) -> String {
        Fen::from_position(&self.chess, EnPassantMode::Legal).to_string()
    }

    /// Placement, side to move, castling and en passant fields of the FEN.
    ///
    /// Two positions reached by different move orders share a key, which
    /// makes it suitable for opening lookup.
    pub fn key(&self) -> String {
        self.to_fen()
            .split_whitespace()
            .take(4)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::starting()
    }
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.repetitions == other.repetitions && self.to_fen() == other.to_fen()
    }
}

impl Eq for Position {}

/// A move expressed as origin, destination and optional promotion piece.
///
/// Castling is written as the king's two-square move (`e1g1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardMove {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl BoardMove {
    /// Creates a move without promotion.
    pub const fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// Returns this move promoting to `kind`.
    pub const fn promoting_to(self, kind: PieceKind) -> Self {
        Self {
            promotion: Some(kind),
            ..self
        }
    }

    /// Converts a rules-library move using standard castling notation.
    pub fn from_move(m: &Move) -> Option<Self> {
        match m.to_uci(CastlingMode::Standard) {
            UciMove::Normal {
                from,
                to,
                promotion,
            } => Some(Self {
                from,
                to,
                promotion,
            }),
            _ => None,
        }
    }

    pub(crate) fn to_uci_move(self) -> UciMove {
        UciMove::Normal {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

impl fmt::Display for BoardMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.char())?;
        }
        Ok(())
    }
}

impl FromStr for BoardMove {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<UciMove>() {
            Ok(UciMove::Normal {
                from,
                to,
                promotion,
            }) => Ok(Self {
                from,
                to,
                promotion,
            }),
            _ => Err(MoveParseError(s.trim().to_string())),
        }
    }
}

/// Board orientation used by presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplaySide {
    #[default]
    White,
    Black,
}

impl DisplaySide {
    /// The opposite orientation.
    pub const fn flipped(self) -> Self {
        match self {
            DisplaySide::White => DisplaySide::Black,
            DisplaySide::Black => DisplaySide::White,
        }
    }

    /// The orientation that puts `side` at the bottom of the board.
    pub const fn facing(side: Side) -> Self {
        match side {
            Side::White => DisplaySide::White,
            Side::Black => DisplaySide::Black,
        }
    }
}
