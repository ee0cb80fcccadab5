use crate::position::Position;

/// Names the opening a position belongs to.
///
/// Lookups are by exact position, so transpositions are found regardless of
/// move order.
pub trait OpeningLookup: Send + Sync {
    /// All opening names recorded for `position`; empty when unknown.
    fn lookup(&self, position: &Position) -> Vec<String>;
}
