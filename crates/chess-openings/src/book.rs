//! Opening lookup by position.

use std::collections::HashMap;
use std::path::Path;

use chess_session::{OpeningLookup, Position, RulesEngine, StandardRules};
use thiserror::Error;
use tracing::debug;

use crate::builtin::builtin_openings;
use crate::opening::Opening;

/// Errors that can occur when building an opening book.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to parse the opening database.
    #[error("failed to parse opening database: {0}")]
    ParseError(String),

    /// Failed to read the opening database file.
    #[error("failed to read opening database: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A line in the book cannot be played from the start position.
    #[error("opening '{opening}' has an illegal move: {mv}")]
    IllegalMove { opening: String, mv: String },
}

/// Opening names indexed by the position each line reaches.
///
/// Positions are compared by [`Position::key`], so a line reached by a
/// different move order finds the same names.
#[derive(Debug, Clone, Default)]
pub struct OpeningBook {
    openings: Vec<Opening>,
    by_position: HashMap<String, Vec<usize>>,
}

impl OpeningBook {
    /// Creates a new empty book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The book of built-in openings.
    #[must_use]
    pub fn builtin() -> Self {
        let mut book = Self::new();
        for opening in builtin_openings() {
            // Built-in lines are checked by tests.
            if let Err(e) = book.add(opening) {
                debug!(error = %e, "skipping built-in opening");
            }
        }
        book
    }

    /// Builds a book from `openings`, rejecting any with an illegal line.
    pub fn with_openings(openings: Vec<Opening>) -> Result<Self, DatabaseError> {
        let mut book = Self::new();
        book.extend(openings)?;
        Ok(book)
    }

    /// Parses a JSON array of openings.
    pub fn from_json_str(json: &str) -> Result<Self, DatabaseError> {
        let openings: Vec<Opening> = serde_json::from_str(json)?;
        Self::with_openings(openings)
    }

    /// Loads a JSON array of openings from `path`.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Adds every opening, stopping at the first illegal line.
    pub fn extend(&mut self, openings: Vec<Opening>) -> Result<(), DatabaseError> {
        for opening in openings {
            self.add(opening)?;
        }
        Ok(())
    }

    /// Replays the opening's line and indexes its final position.
    pub fn add(&mut self, opening: Opening) -> Result<(), DatabaseError> {
        if opening.name.trim().is_empty() {
            return Err(DatabaseError::ParseError(
                "opening without a name".to_string(),
            ));
        }
        let key = final_position(&opening)?.key();
        debug!(opening = %opening, plies = opening.ply_count(), "indexed opening");
        let index = self.openings.len();
        self.openings.push(opening);
        self.by_position.entry(key).or_default().push(index);
        Ok(())
    }

    /// Names of the openings that reach `position`, in insertion order.
    #[must_use]
    pub fn names_for(&self, position: &Position) -> Vec<String> {
        self.openings_for(position)
            .into_iter()
            .map(|o| o.name.clone())
            .collect()
    }

    /// The openings that reach `position`.
    #[must_use]
    pub fn openings_for(&self, position: &Position) -> Vec<&Opening> {
        self.by_position
            .get(&position.key())
            .map(|indices| indices.iter().map(|&i| &self.openings[i]).collect())
            .unwrap_or_default()
    }

    /// Returns all openings in the book.
    #[must_use]
    pub fn all(&self) -> &[Opening] {
        &self.openings
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.openings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.openings.is_empty()
    }
}

fn final_position(opening: &Opening) -> Result<Position, DatabaseError> {
    let rules = StandardRules;
    let illegal = |mv: &str| DatabaseError::IllegalMove {
        opening: opening.name.clone(),
        mv: mv.to_string(),
    };
    let moves = opening.board_moves().map_err(|e| illegal(e.0.as_str()))?;
    let mut position = rules.initial_position();
    for mv in moves {
        position = rules
            .apply_move(&position, mv)
            .map_err(|_| illegal(mv.to_string().as_str()))?
            .position;
    }
    Ok(position)
}

impl OpeningLookup for OpeningBook {
    fn lookup(&self, position: &Position) -> Vec<String> {
        self.names_for(position)
    }
}
