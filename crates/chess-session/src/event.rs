//! Session notifications for presentation.

use tokio::sync::mpsc;
use tracing::trace;

use crate::ledger::MoveRecord;
use crate::position::{BoardMove, DisplaySide};
use crate::rules::{IllegalReason, Termination};
use crate::service::ServiceError;
use crate::{Side, Square};

/// What an engine request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestPurpose {
    /// The engine's own move.
    EngineMove,
    /// A suggestion for the human.
    Hint,
}

/// A discrete change in the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A fresh game started.
    GameStarted { human_side: Side },
    /// A move was validated and recorded.
    MoveApplied { record: MoveRecord },
    /// The side to move changed.
    TurnChanged { to_move: Side },
    /// The game reached a terminal position.
    GameEnded { reason: Termination },
    /// A hint for the current position is available.
    HintReady { from: Square, to: Square },
    /// Moves were taken back; `ply` is the new ledger length.
    HistoryRewound { ply: usize },
    /// The engine proposed a move the rules engine refused.
    IllegalMoveRejected { mv: BoardMove, reason: IllegalReason },
    /// An engine request failed.
    EngineFailed {
        purpose: RequestPurpose,
        error: ServiceError,
    },
    /// The board orientation was flipped.
    OrientationChanged { orientation: DisplaySide },
}

impl SessionEvent {
    /// Short name for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            SessionEvent::GameStarted { .. } => "game_started",
            SessionEvent::MoveApplied { .. } => "move_applied",
            SessionEvent::TurnChanged { .. } => "turn_changed",
            SessionEvent::GameEnded { .. } => "game_ended",
            SessionEvent::HintReady { .. } => "hint_ready",
            SessionEvent::HistoryRewound { .. } => "history_rewound",
            SessionEvent::IllegalMoveRejected { .. } => "illegal_move_rejected",
            SessionEvent::EngineFailed { .. } => "engine_failed",
            SessionEvent::OrientationChanged { .. } => "orientation_changed",
        }
    }
}

/// Receiving end of a subscription.
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// Fan-out of session events to subscribers.
///
/// Each subscriber has its own unbounded queue, so events arrive in the
/// order they were published and exactly once. Dropped receivers are pruned
/// on the next publish.
#[derive(Debug, Default)]
pub struct EventChannel {
    subscribers: Vec<mpsc::UnboundedSender<SessionEvent>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    pub fn subscribe(&mut self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn publish(&mut self, event: SessionEvent) {
        trace!(kind = event.kind(), "publishing session event");
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}
