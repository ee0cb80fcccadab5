//! Random move engine - plays a random legal move.
//!
//! Used when no UCI engine is installed, and handy for trying the session
//! without waiting on a search.

use async_trait::async_trait;
use chess_session::{BoardMove, EngineService, RulesEngine, ServiceError, StandardRules};
use rand::seq::IndexedRandom;
use tracing::debug;

/// Suggests a uniformly random legal move.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomEngine {
    rules: StandardRules,
}

impl RandomEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn pick(&self, fen: &str) -> Result<BoardMove, ServiceError> {
        let position = self
            .rules
            .position_from_fen(fen)
            .map_err(|e| ServiceError::Unavailable(format!("cannot read position: {e}")))?;
        let moves = self.rules.legal_moves(&position);
        let mv = moves
            .choose(&mut rand::rng())
            .copied()
            .ok_or(ServiceError::NoMove)?;
        debug!(%mv, candidates = moves.len(), "random move");
        Ok(mv)
    }
}

#[async_trait]
impl EngineService for RandomEngine {
    async fn suggest_move(&self, fen: &str, _depth: u32) -> Result<BoardMove, ServiceError> {
        self.pick(fen)
    }
}
