//! UCI info line parsing.

/// Score in centipawns or mate distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    /// Centipawn score (100 = 1 pawn advantage).
    Cp(i32),
    /// Mate in N moves (positive = engine winning, negative = engine losing).
    Mate(i32),
}

/// Progress reported by a running search.
///
/// Only the fields the service logs are kept; the rest of the line is
/// skipped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineInfo {
    /// Search depth in plies.
    pub depth: Option<u32>,
    pub score: Option<Score>,
}

impl EngineInfo {
    /// Parse UCI info line.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        if parts.next() != Some("info") {
            return None;
        }

        let mut info = EngineInfo::default();
        while let Some(key) = parts.next() {
            match key {
                "depth" => info.depth = parts.next().and_then(|v| v.parse().ok()),
                "score" => {
                    let kind = parts.next();
                    let value = parts.next().and_then(|v| v.parse().ok());
                    info.score = match (kind, value) {
                        (Some("cp"), Some(cp)) => Some(Score::Cp(cp)),
                        (Some("mate"), Some(m)) => Some(Score::Mate(m)),
                        _ => info.score,
                    };
                }
                // Free text runs to the end of the line.
                "string" => break,
                _ => {}
            }
        }

        Some(info)
    }
}
