//! Standard chess rules backed by `shakmaty`.

use shakmaty::san::San;
use shakmaty::{Chess, Position as _, Rank, Role};

use super::{Applied, Illegal, IllegalReason, RulesEngine, Termination};
use crate::position::{BoardMove, Position, PositionError};

/// Standard chess rules (FIDE).
///
/// Besides checkmate and stalemate, the draws that end a game without a
/// claim are detected: insufficient material, threefold repetition and the
/// fifty-move rule.
///
/// A pawn move onto the last rank that does not name a promotion piece is
/// promoted to a queen.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    fn with_default_promotion(chess: &Chess, mv: BoardMove) -> BoardMove {
        let reaches_last_rank = matches!(mv.to.rank(), Rank::First | Rank::Eighth);
        if mv.promotion.is_none()
            && reaches_last_rank
            && chess.board().role_at(mv.from) == Some(Role::Pawn)
        {
            mv.promoting_to(Role::Queen)
        } else {
            mv
        }
    }
}

impl RulesEngine for StandardRules {
    fn initial_position(&self) -> Position {
        Position::starting()
    }

    fn position_from_fen(&self, fen: &str) -> Result<Position, PositionError> {
        Position::from_fen(fen)
    }

    fn apply_move(&self, position: &Position, mv: BoardMove) -> Result<Applied, Illegal> {
        if self.terminal(position).is_some() {
            return Err(Illegal::new(mv, IllegalReason::GameOver));
        }

        let chess = position.chess();
        let mv = Self::with_default_promotion(chess, mv);
        let m = mv
            .to_uci_move()
            .to_move(chess)
            .map_err(|_| Illegal::new(mv, IllegalReason::NotLegal))?;

        let san = San::from_move(chess, m.clone());
        let capture = m.is_capture();
        let next = chess
            .clone()
            .play(m)
            .map_err(|_| Illegal::new(mv, IllegalReason::NotLegal))?;

        let position = position.successor(next);
        let terminal = self.terminal(&position);
        let suffix = match terminal {
            Some(Termination::Checkmate { .. }) => "#",
            _ if position.is_check() => "+",
            _ => "",
        };

        Ok(Applied {
            mv,
            position,
            terminal,
            san: format!("{san}{suffix}"),
            capture,
        })
    }

    fn legal_moves(&self, position: &Position) -> Vec<BoardMove> {
        if self.terminal(position).is_some() {
            return Vec::new();
        }
        position
            .chess()
            .legal_moves()
            .iter()
            .filter_map(BoardMove::from_move)
            .collect()
    }

    fn terminal(&self, position: &Position) -> Option<Termination> {
        let chess = position.chess();
        if chess.is_checkmate() {
            return Some(Termination::Checkmate {
                winner: !chess.turn(),
            });
        }
        if chess.is_stalemate() {
            return Some(Termination::Stalemate);
        }
        if chess.is_insufficient_material() {
            return Some(Termination::InsufficientMaterial);
        }
        if position.repetition_count() >= 3 {
            return Some(Termination::ThreefoldRepetition);
        }
        if position.halfmove_clock() >= 100 {
            return Some(Termination::FiftyMoveRule);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PieceKind, Side, Square};
    use proptest::prelude::*;

    fn play(rules: &StandardRules, position: &Position, uci: &str) -> Applied {
        rules
            .apply_move(position, uci.parse().unwrap())
            .unwrap_or_else(|e| panic!("{uci} should be legal: {e}"))
    }

    #[test]
    fn twenty_moves_from_start() {
        let rules = StandardRules;
        assert_eq!(rules.legal_moves(&rules.initial_position()).len(), 20);
    }

    #[test]
    fn apply_reports_san_and_capture() {
        let rules = StandardRules;
        let p1 = play(&rules, &rules.initial_position(), "e2e4");
        assert_eq!(p1.san, "e4");
        assert!(!p1.capture);
        let p2 = play(&rules, &p1.position, "d7d5");
        let p3 = play(&rules, &p2.position, "e4d5");
        assert_eq!(p3.san, "exd5");
        assert!(p3.capture);
        assert_eq!(p3.position.side_to_move(), Side::Black);
    }

    #[test]
    fn illegal_move_rejected() {
        let rules = StandardRules;
        let err = rules
            .apply_move(&rules.initial_position(), "e2e5".parse().unwrap())
            .unwrap_err();
        assert_eq!(err.reason, IllegalReason::NotLegal);
    }

    #[test]
    fn moving_the_wrong_side_is_illegal() {
        let rules = StandardRules;
        assert!(!rules.is_legal(&rules.initial_position(), "e7e5".parse().unwrap()));
    }

    #[test]
    fn fools_mate_is_terminal() {
        let rules = StandardRules;
        let mut position = rules.initial_position();
        let mut last = None;
        for uci in ["f2f3", "e7e5", "g2g4", "d8h4"] {
            let applied = play(&rules, &position, uci);
            position = applied.position.clone();
            last = Some(applied);
        }
        let last = last.unwrap();
        assert_eq!(last.san, "Qh4#");
        assert_eq!(
            last.terminal,
            Some(Termination::Checkmate {
                winner: Side::Black
            })
        );
        assert!(rules.legal_moves(&position).is_empty());

        let err = rules
            .apply_move(&position, "a2a3".parse().unwrap())
            .unwrap_err();
        assert_eq!(err.reason, IllegalReason::GameOver);
    }

    #[test]
    fn stalemate_detected() {
        let rules = StandardRules;
        let position = rules
            .position_from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1")
            .unwrap();
        assert_eq!(rules.terminal(&position), Some(Termination::Stalemate));
    }

    #[test]
    fn insufficient_material_detected() {
        let rules = StandardRules;
        let position = rules
            .position_from_fen("8/8/8/8/8/8/8/4K2k w - - 0 1")
            .unwrap();
        assert_eq!(
            rules.terminal(&position),
            Some(Termination::InsufficientMaterial)
        );
    }

    #[test]
    fn threefold_repetition_detected() {
        let rules = StandardRules;
        let mut position = rules.initial_position();
        let shuffle = ["g1f3", "g8f6", "f3g1", "f6g8"];
        for uci in shuffle.iter().chain(shuffle.iter().take(3)) {
            position = play(&rules, &position, uci).position;
        }
        assert_eq!(rules.terminal(&position), None);
        let applied = play(&rules, &position, "f6g8");
        assert_eq!(applied.position.repetition_count(), 3);
        assert_eq!(applied.terminal, Some(Termination::ThreefoldRepetition));
    }

    #[test]
    fn fifty_move_rule_detected() {
        let rules = StandardRules;
        let position = rules
            .position_from_fen("8/8/8/8/8/8/8/R3K2k w Q - 99 60")
            .unwrap();
        let applied = play(&rules, &position, "a1a2");
        assert_eq!(applied.terminal, Some(Termination::FiftyMoveRule));
    }

    #[test]
    fn promotion_defaults_to_queen() {
        let rules = StandardRules;
        let position = rules
            .position_from_fen("8/4P3/8/8/8/8/8/k6K w - - 0 1")
            .unwrap();
        let applied = play(&rules, &position, "e7e8");
        assert_eq!(applied.mv.promotion, Some(PieceKind::Queen));
        assert_eq!(applied.position.piece_kind_at(Square::E8), Some(PieceKind::Queen));

        let under = play(&rules, &position, "e7e8n");
        assert_eq!(under.position.piece_kind_at(Square::E8), Some(PieceKind::Knight));
    }

    #[test]
    fn castling_uses_king_destination() {
        let rules = StandardRules;
        let position = rules
            .position_from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1")
            .unwrap();
        let applied = play(&rules, &position, "e1g1");
        assert_eq!(applied.san, "O-O");
        assert_eq!(applied.position.piece_kind_at(Square::G1), Some(PieceKind::King));
        assert!(rules
            .legal_moves(&position)
            .contains(&"e1c1".parse().unwrap()));
    }

    proptest! {
        #[test]
        fn every_listed_move_applies(choices in proptest::collection::vec(any::<prop::sample::Index>(), 0..40)) {
            let rules = StandardRules;
            let mut position = rules.initial_position();
            for choice in choices {
                let moves = rules.legal_moves(&position);
                if moves.is_empty() {
                    break;
                }
                let mv = moves[choice.index(moves.len())];
                let applied = rules.apply_move(&position, mv);
                prop_assert!(applied.is_ok(), "{} listed but rejected", mv);
                position = applied.unwrap().position;
            }
        }
    }
}
