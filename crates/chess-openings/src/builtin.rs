//! Built-in opening data.
//!
//! A short list of the openings most often reached in casual play. Larger
//! books can be loaded from JSON.

use crate::opening::Opening;

const BUILTIN: &[(&str, &str, &str)] = &[
    // First moves
    ("B00", "King's Pawn Game", "e2e4"),
    ("D00", "Queen's Pawn Game", "d2d4"),
    ("A10", "English Opening", "c2c4"),
    ("A04", "Zukertort Opening", "g1f3"),
    // Open games
    ("C20", "King's Pawn Game: Open Game", "e2e4 e7e5"),
    ("C40", "King's Knight Opening", "e2e4 e7e5 g1f3"),
    ("C44", "King's Knight Opening: Normal Variation", "e2e4 e7e5 g1f3 b8c6"),
    ("C50", "Italian Game", "e2e4 e7e5 g1f3 b8c6 f1c4"),
    ("C53", "Italian Game: Giuoco Piano", "e2e4 e7e5 g1f3 b8c6 f1c4 f8c5"),
    ("C55", "Italian Game: Two Knights Defense", "e2e4 e7e5 g1f3 b8c6 f1c4 g8f6"),
    ("C60", "Ruy Lopez", "e2e4 e7e5 g1f3 b8c6 f1b5"),
    ("C70", "Ruy Lopez: Morphy Defense", "e2e4 e7e5 g1f3 b8c6 f1b5 a7a6"),
    ("C45", "Scotch Game", "e2e4 e7e5 g1f3 b8c6 d2d4"),
    ("C42", "Petrov's Defense", "e2e4 e7e5 g1f3 g8f6"),
    ("C41", "Philidor Defense", "e2e4 e7e5 g1f3 d7d6"),
    ("C23", "Bishop's Opening", "e2e4 e7e5 f1c4"),
    ("C25", "Vienna Game", "e2e4 e7e5 b1c3"),
    ("C30", "King's Gambit", "e2e4 e7e5 f2f4"),
    // Semi-open games
    ("B20", "Sicilian Defense", "e2e4 c7c5"),
    ("B22", "Sicilian Defense: Alapin Variation", "e2e4 c7c5 c2c3"),
    ("B23", "Sicilian Defense: Closed", "e2e4 c7c5 b1c3"),
    (
        "B90",
        "Sicilian Defense: Najdorf Variation",
        "e2e4 c7c5 g1f3 d7d6 d2d4 c5d4 f3d4 g8f6 b1c3 a7a6",
    ),
    ("C00", "French Defense", "e2e4 e7e6"),
    ("B10", "Caro-Kann Defense", "e2e4 c7c6"),
    ("B01", "Scandinavian Defense", "e2e4 d7d5"),
    ("B02", "Alekhine Defense", "e2e4 g8f6"),
    ("B07", "Pirc Defense", "e2e4 d7d6 d2d4 g8f6 b1c3 g7g6"),
    // Closed games
    ("D06", "Queen's Gambit", "d2d4 d7d5 c2c4"),
    ("D20", "Queen's Gambit Accepted", "d2d4 d7d5 c2c4 d5c4"),
    ("D30", "Queen's Gambit Declined", "d2d4 d7d5 c2c4 e7e6"),
    ("D10", "Slav Defense", "d2d4 d7d5 c2c4 c7c6"),
    ("D00", "Queen's Pawn Game: London System", "d2d4 d7d5 c1f4"),
    // Indian defenses
    ("A45", "Indian Defense", "d2d4 g8f6"),
    ("E60", "King's Indian Defense", "d2d4 g8f6 c2c4 g7g6"),
    ("D80", "Grünfeld Defense", "d2d4 g8f6 c2c4 g7g6 b1c3 d7d5"),
    ("E20", "Nimzo-Indian Defense", "d2d4 g8f6 c2c4 e7e6 b1c3 f8b4"),
    ("E12", "Queen's Indian Defense", "d2d4 g8f6 c2c4 e7e6 g1f3 b7b6"),
    ("A80", "Dutch Defense", "d2d4 f7f5"),
];

/// The built-in openings.
#[must_use]
pub fn builtin_openings() -> Vec<Opening> {
    BUILTIN
        .iter()
        .map(|(eco, name, line)| Opening::from_line(eco, name, line))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_session::{RulesEngine, StandardRules};

    #[test]
    fn test_builtin_openings_not_empty() {
        assert!(builtin_openings().len() >= 30);
    }

    #[test]
    fn test_builtin_openings_all_have_eco() {
        for opening in builtin_openings() {
            assert_eq!(opening.eco.len(), 3, "{} has a bad ECO code", opening.name);
        }
    }

    #[test]
    fn test_builtin_openings_all_have_legal_moves() {
        let rules = StandardRules;
        for opening in builtin_openings() {
            let mut position = rules.initial_position();
            for uci in &opening.moves {
                let mv = uci.parse().unwrap();
                position = rules
                    .apply_move(&position, mv)
                    .unwrap_or_else(|e| panic!("{}: {}", opening.name, e))
                    .position;
            }
        }
    }
}
