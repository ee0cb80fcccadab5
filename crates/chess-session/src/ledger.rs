//! Move history with a redo buffer.
//!
//! The [`MoveLedger`] keeps the played moves in order, each with the
//! position it produced, plus a stack of moves taken back. Positions in the
//! ledger always come from the rules engine: redo re-applies the move
//! instead of trusting the position cached when it was first played.

use thiserror::Error;

use crate::position::{BoardMove, Position};
use crate::rules::{Applied, RulesEngine};
use crate::{PieceKind, Side, Square};

/// Errors from ledger operations. None of them mutate the ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// There is no move to take back.
    #[error("no moves to undo")]
    EmptyHistory,
    /// There is no undone move to replay.
    #[error("no moves to redo")]
    EmptyRedo,
    /// The undone move is no longer legal from the current position.
    #[error("undone move {0} is no longer legal")]
    StaleRedo(BoardMove),
    /// A record was appended out of order.
    #[error("expected a record for ply {expected}, got ply {got}")]
    NonContiguous { expected: usize, got: usize },
}

/// One applied move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    /// Zero-based index of this half-move in the game.
    pub ply: usize,
    /// The side that played the move.
    pub mover: Side,
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
    /// Standard algebraic notation with check or mate suffix.
    pub san: String,
    /// Whether the move captured a piece.
    pub capture: bool,
    /// The position after the move.
    pub resulting_position: Position,
}

impl MoveRecord {
    /// Builds the record for `applied`, played by `mover` at `ply`.
    pub fn from_applied(ply: usize, mover: Side, applied: Applied) -> Self {
        Self {
            ply,
            mover,
            from: applied.mv.from,
            to: applied.mv.to,
            promotion: applied.mv.promotion,
            san: applied.san,
            capture: applied.capture,
            resulting_position: applied.position,
        }
    }

    /// The move itself, without the resulting position.
    pub fn board_move(&self) -> BoardMove {
        BoardMove {
            from: self.from,
            to: self.to,
            promotion: self.promotion,
        }
    }
}

/// A numbered pair of half-moves for move list display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub number: u32,
    pub white: Option<String>,
    pub black: Option<String>,
}

/// Played moves plus the stack of moves taken back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveLedger {
    initial: Position,
    played: Vec<MoveRecord>,
    redo: Vec<MoveRecord>,
}

impl MoveLedger {
    /// Creates an empty ledger starting from `initial`.
    pub fn new(initial: Position) -> Self {
        Self {
            initial,
            played: Vec::new(),
            redo: Vec::new(),
        }
    }

    /// The position the game started from.
    pub fn initial_position(&self) -> &Position {
        &self.initial
    }

    /// The position after the last played move, or the initial position.
    pub fn head_position(&self) -> &Position {
        self.played
            .last()
            .map_or(&self.initial, |r| &r.resulting_position)
    }

    /// Number of played half-moves.
    pub fn len(&self) -> usize {
        self.played.len()
    }

    /// Returns true if no move has been played.
    pub fn is_empty(&self) -> bool {
        self.played.is_empty()
    }

    /// The played moves, oldest first.
    pub fn played(&self) -> &[MoveRecord] {
        &self.played
    }

    /// The most recently played move.
    pub fn last(&self) -> Option<&MoveRecord> {
        self.played.last()
    }

    /// The undone moves, the next one to redo last.
    pub fn redo_stack(&self) -> &[MoveRecord] {
        &self.redo
    }

    /// Number of undone moves available for redo.
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    /// Appends a record for the next ply and discards the redo stack.
    pub fn append(&mut self, record: MoveRecord) -> Result<&MoveRecord, LedgerError> {
        if record.ply != self.played.len() {
            return Err(LedgerError::NonContiguous {
                expected: self.played.len(),
                got: record.ply,
            });
        }
        self.redo.clear();
        self.played.push(record);
        Ok(&self.played[self.played.len() - 1])
    }

    /// Takes back the last half-move and pushes it onto the redo stack.
    pub fn undo_last(&mut self) -> Result<MoveRecord, LedgerError> {
        let record = self.played.pop().ok_or(LedgerError::EmptyHistory)?;
        self.redo.push(record.clone());
        Ok(record)
    }

    /// Replays the most recently undone move through `rules`.
    ///
    /// The entry stays on the redo stack if it no longer applies.
    pub fn redo<R: RulesEngine + ?Sized>(&mut self, rules: &R) -> Result<&MoveRecord, LedgerError> {
        let record = self.prepare_redo(rules)?;
        self.redo.pop();
        self.played.push(record);
        Ok(&self.played[self.played.len() - 1])
    }

    /// Replays the `count` most recently undone moves, all or nothing.
    pub fn redo_many<R: RulesEngine + ?Sized>(
        &mut self,
        rules: &R,
        count: usize,
    ) -> Result<&[MoveRecord], LedgerError> {
        if self.redo.len() < count {
            return Err(LedgerError::EmptyRedo);
        }
        let mut replayed: Vec<MoveRecord> = Vec::with_capacity(count);
        for offset in 0..count {
            let base = replayed
                .last()
                .map_or_else(|| self.head_position(), |r| &r.resulting_position);
            let pending = &self.redo[self.redo.len() - 1 - offset];
            let applied = rules
                .apply_move(base, pending.board_move())
                .map_err(|_| LedgerError::StaleRedo(pending.board_move()))?;
            let ply = self.played.len() + offset;
            replayed.push(MoveRecord::from_applied(ply, pending.mover, applied));
        }
        let start = self.played.len();
        self.redo.truncate(self.redo.len() - count);
        self.played.extend(replayed);
        Ok(&self.played[start..])
    }

    fn prepare_redo<R: RulesEngine + ?Sized>(&self, rules: &R) -> Result<MoveRecord, LedgerError> {
        let pending = self.redo.last().ok_or(LedgerError::EmptyRedo)?;
        let applied = rules
            .apply_move(self.head_position(), pending.board_move())
            .map_err(|_| LedgerError::StaleRedo(pending.board_move()))?;
        Ok(MoveRecord::from_applied(
            self.played.len(),
            pending.mover,
            applied,
        ))
    }

    /// Drops every played move from `ply` onward, returning them oldest first.
    ///
    /// The redo stack is discarded as well: the dropped tail replaces it as
    /// the abandoned line, and the next append starts a new branch. A `ply`
    /// at or past the end drops nothing and leaves the redo stack alone.
    pub fn truncate_from(&mut self, ply: usize) -> Vec<MoveRecord> {
        if ply >= self.played.len() {
            return Vec::new();
        }
        self.redo.clear();
        self.played.split_off(ply)
    }

    /// Played moves in UCI notation.
    pub fn uci_moves(&self) -> Vec<String> {
        self.played
            .iter()
            .map(|r| r.board_move().to_string())
            .collect()
    }

    /// The move list grouped into numbered turns.
    ///
    /// When the game started with Black to move, the first turn has no
    /// White move.
    pub fn turns(&self) -> Vec<Turn> {
        let mut turns: Vec<Turn> = Vec::new();
        let mut number = self.initial.fullmove_number();
        for record in &self.played {
            match record.mover {
                Side::White => {
                    turns.push(Turn {
                        number,
                        white: Some(record.san.clone()),
                        black: None,
                    });
                }
                Side::Black => {
                    match turns.last_mut() {
                        Some(turn) if turn.number == number && turn.black.is_none() => {
                            turn.black = Some(record.san.clone());
                        }
                        _ => turns.push(Turn {
                            number,
                            white: None,
                            black: Some(record.san.clone()),
                        }),
                    }
                    number += 1;
                }
            }
        }
        turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::StandardRules;
    use proptest::prelude::*;

    fn record(ledger: &MoveLedger, uci: &str) -> MoveRecord {
        let position = ledger.head_position();
        let mover = position.side_to_move();
        let applied = StandardRules
            .apply_move(position, uci.parse().unwrap())
            .unwrap();
        MoveRecord::from_applied(ledger.len(), mover, applied)
    }

    fn ledger_with(moves: &[&str]) -> MoveLedger {
        let mut ledger = MoveLedger::new(Position::starting());
        for uci in moves {
            let r = record(&ledger, uci);
            ledger.append(r).unwrap();
        }
        ledger
    }

    #[test]
    fn append_requires_contiguous_ply() {
        let mut ledger = ledger_with(&["e2e4"]);
        let mut r = record(&ledger, "e7e5");
        r.ply = 5;
        assert_eq!(
            ledger.append(r),
            Err(LedgerError::NonContiguous {
                expected: 1,
                got: 5
            })
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn undo_on_empty_fails() {
        let mut ledger = MoveLedger::new(Position::starting());
        assert_eq!(ledger.undo_last(), Err(LedgerError::EmptyHistory));
        assert_eq!(ledger.redo_len(), 0);
    }

    #[test]
    fn redo_on_empty_fails() {
        let mut ledger = ledger_with(&["e2e4"]);
        assert_eq!(
            ledger.redo(&StandardRules).unwrap_err(),
            LedgerError::EmptyRedo
        );
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn append_after_undo_discards_redo_tail() {
        let mut ledger = ledger_with(&["e2e4", "e7e5", "g1f3"]);
        let undone = ledger.undo_last().unwrap();
        assert_eq!(undone.san, "Nf3");
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.redo_len(), 1);

        let d4 = record(&ledger, "d2d4");
        ledger.append(d4).unwrap();
        assert_eq!(ledger.uci_moves(), vec!["e2e4", "e7e5", "d2d4"]);
        assert_eq!(ledger.redo_len(), 0);
    }

    #[test]
    fn redo_is_lifo() {
        let mut ledger = ledger_with(&["e2e4", "e7e5", "g1f3"]);
        ledger.undo_last().unwrap();
        ledger.undo_last().unwrap();
        assert_eq!(ledger.redo_len(), 2);

        let first = ledger.redo(&StandardRules).unwrap();
        assert_eq!(first.san, "e5");
        assert_eq!(first.ply, 1);
        let second = ledger.redo(&StandardRules).unwrap();
        assert_eq!(second.san, "Nf3");
        assert_eq!(ledger.uci_moves(), vec!["e2e4", "e7e5", "g1f3"]);
    }

    #[test]
    fn identical_moves_in_redo_are_popped_individually() {
        let mut ledger = ledger_with(&["g1f3", "g8f6", "f3g1", "f6g8", "g1f3"]);
        for _ in 0..5 {
            ledger.undo_last().unwrap();
        }
        assert_eq!(ledger.redo_len(), 5);
        ledger.redo(&StandardRules).unwrap();
        assert_eq!(ledger.redo_len(), 4);
        assert_eq!(ledger.uci_moves(), vec!["g1f3"]);
    }

    #[test]
    fn stale_redo_is_not_consumed() {
        let mut ledger = ledger_with(&["e2e4", "e7e5"]);
        let mut undone = ledger.undo_last().unwrap();
        // Replace the entry with one that cannot be replayed.
        ledger.redo.pop();
        undone.from = Square::E7;
        undone.to = Square::E4;
        ledger.redo.push(undone);

        let err = ledger.redo(&StandardRules).unwrap_err();
        assert!(matches!(err, LedgerError::StaleRedo(_)));
        assert_eq!(ledger.redo_len(), 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn redo_many_is_all_or_nothing() {
        let mut ledger = ledger_with(&["e2e4", "e7e5"]);
        ledger.undo_last().unwrap();
        let human = ledger.undo_last().unwrap();
        // Corrupt the second entry of the pair (the reply, popped second).
        let mut reply = ledger.redo.remove(0);
        reply.to = Square::E3;
        ledger.redo.insert(0, reply);

        let err = ledger.redo_many(&StandardRules, 2).unwrap_err();
        assert!(matches!(err, LedgerError::StaleRedo(_)));
        assert_eq!(ledger.len(), 0);
        assert_eq!(ledger.redo_len(), 2);
        assert_eq!(ledger.redo_stack()[1].board_move(), human.board_move());
    }

    #[test]
    fn redo_many_needs_enough_entries() {
        let mut ledger = ledger_with(&["e2e4"]);
        ledger.undo_last().unwrap();
        assert_eq!(
            ledger.redo_many(&StandardRules, 2).unwrap_err(),
            LedgerError::EmptyRedo
        );
        assert_eq!(ledger.redo_len(), 1);
    }

    #[test]
    fn truncate_from_replaces_the_tail() {
        let mut ledger = ledger_with(&["e2e4", "e7e5", "g1f3", "b8c6"]);
        ledger.undo_last().unwrap();
        let dropped = ledger.truncate_from(1);
        assert_eq!(dropped.len(), 2);
        assert_eq!(dropped[0].san, "e5");
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.redo_len(), 0);

        let c5 = record(&ledger, "c7c5");
        ledger.append(c5).unwrap();
        assert_eq!(ledger.uci_moves(), vec!["e2e4", "c7c5"]);
    }

    #[test]
    fn truncate_past_the_end_keeps_moves_and_redo() {
        let mut ledger = ledger_with(&["e2e4", "e7e5"]);
        ledger.undo_last().unwrap();
        assert!(ledger.truncate_from(1).is_empty());
        assert!(ledger.truncate_from(3).is_empty());
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.redo_len(), 1);
        assert_eq!(ledger.redo_stack()[0].san, "e5");
    }

    #[test]
    fn turns_pair_white_and_black() {
        let ledger = ledger_with(&["e2e4", "e7e5", "g1f3"]);
        let turns = ledger.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].number, 1);
        assert_eq!(turns[0].white.as_deref(), Some("e4"));
        assert_eq!(turns[0].black.as_deref(), Some("e5"));
        assert_eq!(turns[1].white.as_deref(), Some("Nf3"));
        assert_eq!(turns[1].black, None);
    }

    #[test]
    fn turns_when_black_starts() {
        let start = Position::from_fen(
            "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1",
        )
        .unwrap();
        let mut ledger = MoveLedger::new(start);
        let r = record(&ledger, "e7e5");
        ledger.append(r).unwrap();
        let r = record(&ledger, "g1f3");
        ledger.append(r).unwrap();
        let turns = ledger.turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].white, None);
        assert_eq!(turns[0].black.as_deref(), Some("e5"));
        assert_eq!(turns[1].number, 2);
        assert_eq!(turns[1].white.as_deref(), Some("Nf3"));
    }

    proptest! {
        #[test]
        fn chain_matches_iterated_rules(choices in proptest::collection::vec(any::<prop::sample::Index>(), 0..30)) {
            let rules = StandardRules;
            let mut ledger = MoveLedger::new(rules.initial_position());
            let mut played = Vec::new();
            for choice in choices {
                let moves = rules.legal_moves(ledger.head_position());
                if moves.is_empty() {
                    break;
                }
                let mv = moves[choice.index(moves.len())];
                let mover = ledger.head_position().side_to_move();
                let applied = rules.apply_move(ledger.head_position(), mv).unwrap();
                ledger.append(MoveRecord::from_applied(ledger.len(), mover, applied)).unwrap();
                played.push(mv);
            }

            let mut expected = rules.initial_position();
            for (i, mv) in played.iter().enumerate() {
                expected = rules.apply_move(&expected, *mv).unwrap().position;
                prop_assert_eq!(&ledger.played()[i].resulting_position, &expected);
                prop_assert_eq!(ledger.played()[i].ply, i);
            }
            prop_assert_eq!(ledger.head_position(), &expected);
        }

        #[test]
        fn undo_then_redo_restores_the_chain(choices in proptest::collection::vec(any::<prop::sample::Index>(), 1..20), back in 0usize..20) {
            let rules = StandardRules;
            let mut ledger = MoveLedger::new(rules.initial_position());
            for choice in choices {
                let moves = rules.legal_moves(ledger.head_position());
                if moves.is_empty() {
                    break;
                }
                let mv = moves[choice.index(moves.len())];
                let mover = ledger.head_position().side_to_move();
                let applied = rules.apply_move(ledger.head_position(), mv).unwrap();
                ledger.append(MoveRecord::from_applied(ledger.len(), mover, applied)).unwrap();
            }
            let before = ledger.played().to_vec();
            let back = back.min(ledger.len());
            for _ in 0..back {
                ledger.undo_last().unwrap();
            }
            for _ in 0..back {
                ledger.redo(&rules).unwrap();
            }
            prop_assert_eq!(ledger.played(), &before[..]);
            prop_assert_eq!(ledger.redo_len(), 0);
        }
    }
}
