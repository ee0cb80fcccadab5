//! A named line of play.

use std::fmt;

use chess_session::{BoardMove, MoveParseError};
use serde::{Deserialize, Serialize};

/// An opening: its ECO code, its name and the moves from the standard
/// start position that reach it.
///
/// Moves are kept as UCI strings so books round-trip through JSON unchanged;
/// [`board_moves`](Self::board_moves) parses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opening {
    /// ECO code such as "B20". Empty when the book does not give one.
    #[serde(default)]
    pub eco: String,
    pub name: String,
    pub moves: Vec<String>,
}

impl Opening {
    #[must_use]
    pub fn new(eco: impl Into<String>, name: impl Into<String>, moves: Vec<String>) -> Self {
        Self {
            eco: eco.into(),
            name: name.into(),
            moves,
        }
    }

    /// Builds an opening from a space-separated UCI line such as `"e2e4 c7c5"`.
    #[must_use]
    pub fn from_line(eco: &str, name: &str, line: &str) -> Self {
        Self::new(
            eco,
            name,
            line.split_whitespace().map(String::from).collect(),
        )
    }

    /// The line as board moves, failing on the first malformed entry.
    pub fn board_moves(&self) -> Result<Vec<BoardMove>, MoveParseError> {
        self.moves.iter().map(|uci| uci.parse()).collect()
    }

    /// Number of half-moves in the line.
    #[must_use]
    pub fn ply_count(&self) -> usize {
        self.moves.len()
    }
}

impl fmt::Display for Opening {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.eco.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} {}", self.eco, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_line_splits_moves() {
        let opening = Opening::from_line("C44", "King's Pawn Game", " e2e4  e7e5 ");
        assert_eq!(opening.moves, vec!["e2e4", "e7e5"]);
        assert_eq!(opening.ply_count(), 2);
        assert_eq!(opening.to_string(), "C44 King's Pawn Game");
    }

    #[test]
    fn test_board_moves() {
        let opening = Opening::from_line("B20", "Sicilian Defense", "e2e4 c7c5");
        let moves = opening.board_moves().unwrap();
        assert_eq!(moves[1], "c7c5".parse().unwrap());

        let broken = Opening::from_line("", "Broken", "e2e4 castles");
        assert_eq!(
            broken.board_moves(),
            Err(MoveParseError("castles".to_string()))
        );
    }

    #[test]
    fn test_json_without_eco() {
        let opening: Opening =
            serde_json::from_str(r#"{"name": "Sicilian Defense", "moves": ["e2e4", "c7c5"]}"#)
                .unwrap();
        assert_eq!(opening.eco, "");
        assert_eq!(opening.to_string(), "Sicilian Defense");
    }
}
