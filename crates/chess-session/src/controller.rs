//! The game session state machine.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use crate::error::SessionError;
use crate::event::{EventChannel, EventReceiver, RequestPurpose, SessionEvent};
use crate::ledger::{MoveLedger, MoveRecord};
use crate::position::{BoardMove, DisplaySide, Position};
use crate::rules::{Illegal, IllegalReason, RulesEngine, StandardRules, Termination};
use crate::service::{EngineService, ServiceError};
use crate::{Side, Square};

/// Where the session is in the turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The human is to move.
    AwaitingHumanMove,
    /// The engine is to move; a request is outstanding or must be retried.
    RequestingEngineMove,
    /// The game has ended.
    GameOver(Termination),
}

impl SessionState {
    pub const fn is_over(self) -> bool {
        matches!(self, SessionState::GameOver(_))
    }
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// The side the human plays.
    pub human_side: Side,
    /// Search depth sent with every engine request.
    pub depth: u32,
    /// Request a hint every time the human is to move.
    pub auto_hint: bool,
    /// Start position in FEN; the standard start when `None`.
    pub start_fen: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            human_side: Side::White,
            depth: 1,
            auto_hint: true,
            start_fen: None,
        }
    }
}

/// Everything presentation needs to draw the game.
///
/// Returned by [`SessionController::snapshot`] as an owned copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub state: SessionState,
    pub position: Position,
    pub ledger: MoveLedger,
    pub human_side: Side,
    pub orientation: DisplaySide,
}

/// An outstanding engine request.
#[derive(Debug)]
struct PendingSuggestion {
    /// Ledger length when the request was issued.
    ply: usize,
    generation: u64,
    task: AbortHandle,
}

/// The result of an engine request, tagged with what it was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineReply {
    pub purpose: RequestPurpose,
    pub ply: usize,
    pub generation: u64,
    pub result: Result<BoardMove, ServiceError>,
}

/// Drives one human-versus-engine game.
///
/// The controller owns the session and mutates it only through `&mut self`.
/// Engine requests run as background tasks that report back through a
/// channel read with [`next_reply`](Self::next_reply); each reply is checked
/// against the live request before it is allowed to touch the game.
pub struct SessionController<R: RulesEngine = StandardRules> {
    rules: R,
    engine: Arc<dyn EngineService>,
    config: SessionConfig,
    initial: Position,
    session: Session,
    pending_move: Option<PendingSuggestion>,
    pending_hint: Option<PendingSuggestion>,
    generation: u64,
    replies_tx: mpsc::UnboundedSender<EngineReply>,
    replies_rx: mpsc::UnboundedReceiver<EngineReply>,
    events: EventChannel,
    started: bool,
}

impl SessionController<StandardRules> {
    /// Creates a controller using standard chess rules.
    pub fn new(engine: Arc<dyn EngineService>, config: SessionConfig) -> Result<Self, SessionError> {
        Self::with_rules(StandardRules, engine, config)
    }
}

impl<R: RulesEngine> SessionController<R> {
    /// Creates a controller with a custom rules engine.
    ///
    /// Nothing is published and no request is issued until
    /// [`start`](Self::start) is called, so subscribers can attach first.
    pub fn with_rules(
        rules: R,
        engine: Arc<dyn EngineService>,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let initial = match &config.start_fen {
            Some(fen) => rules.position_from_fen(fen)?,
            None => rules.initial_position(),
        };
        let state = Self::state_for(&rules, &initial, config.human_side);
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();

        Ok(Self {
            session: Session {
                state,
                position: initial.clone(),
                ledger: MoveLedger::new(initial.clone()),
                human_side: config.human_side,
                orientation: DisplaySide::facing(config.human_side),
            },
            rules,
            engine,
            config,
            initial,
            pending_move: None,
            pending_hint: None,
            generation: 0,
            replies_tx,
            replies_rx,
            events: EventChannel::new(),
            started: false,
        })
    }

    fn state_for(rules: &R, position: &Position, human_side: Side) -> SessionState {
        match rules.terminal(position) {
            Some(reason) => SessionState::GameOver(reason),
            None if position.side_to_move() == human_side => SessionState::AwaitingHumanMove,
            None => SessionState::RequestingEngineMove,
        }
    }

    /// Registers an event subscriber.
    pub fn subscribe(&mut self) -> EventReceiver {
        self.events.subscribe()
    }

    /// Starts the first game. Later calls do nothing; use
    /// [`new_game`](Self::new_game) to start over.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self) {
        if self.started {
            debug!("session already started");
            return;
        }
        self.started = true;
        self.new_game();
    }

    // -- queries --

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    /// The current position (the ledger head).
    pub fn position(&self) -> &Position {
        &self.session.position
    }

    pub fn ledger(&self) -> &MoveLedger {
        &self.session.ledger
    }

    pub fn human_side(&self) -> Side {
        self.session.human_side
    }

    pub fn orientation(&self) -> DisplaySide {
        self.session.orientation
    }

    /// Origin and destination of the latest move, for highlighting.
    pub fn last_move(&self) -> Option<(Square, Square)> {
        self.session.ledger.last().map(|r| (r.from, r.to))
    }

    /// The ply tag of the outstanding request for `purpose`, if any.
    pub fn pending_request(&self, purpose: RequestPurpose) -> Option<usize> {
        self.slot(purpose).as_ref().map(|p| p.ply)
    }

    /// An owned copy of the session.
    pub fn snapshot(&self) -> Session {
        self.session.clone()
    }

    // -- commands --

    /// Plays a human move.
    ///
    /// Fails without side effects if it is not the human's turn or the move
    /// is illegal. No event is published for a rejected human move.
    pub fn submit_move(&mut self, mv: BoardMove) -> Result<MoveRecord, SessionError> {
        match self.session.state {
            SessionState::GameOver(_) => return Err(SessionError::GameAlreadyOver),
            SessionState::RequestingEngineMove => return Err(SessionError::NotYourTurn),
            SessionState::AwaitingHumanMove => {}
        }
        self.play(mv)
    }

    /// Reissues the engine move request after a failed or rejected reply.
    pub fn retry_engine_move(&mut self) -> Result<(), SessionError> {
        match self.session.state {
            SessionState::GameOver(_) => Err(SessionError::GameAlreadyOver),
            SessionState::AwaitingHumanMove => Err(SessionError::NotYourTurn),
            SessionState::RequestingEngineMove => {
                if self.pending_move.is_none() {
                    self.pending_move = Some(self.issue(RequestPurpose::EngineMove));
                }
                Ok(())
            }
        }
    }

    /// Asks the engine for a suggestion in the current position.
    ///
    /// The answer arrives as [`SessionEvent::HintReady`]. A hint already in
    /// flight is replaced.
    pub fn request_hint(&mut self) -> Result<(), SessionError> {
        if self.session.state.is_over() {
            return Err(SessionError::GameAlreadyOver);
        }
        self.cancel(RequestPurpose::Hint);
        self.pending_hint = Some(self.issue(RequestPurpose::Hint));
        Ok(())
    }

    /// Resets to the start position with the same human side.
    pub fn new_game(&mut self) {
        let side = self.session.human_side;
        self.new_game_as(side);
    }

    /// Resets to the start position with the human playing `human_side`.
    pub fn new_game_as(&mut self, human_side: Side) {
        self.cancel_all();
        self.session.ledger = MoveLedger::new(self.initial.clone());
        self.session.position = self.initial.clone();
        if human_side != self.session.human_side {
            self.session.orientation = DisplaySide::facing(human_side);
        }
        self.session.human_side = human_side;
        self.config.human_side = human_side;

        info!(?human_side, "new game");
        self.events.publish(SessionEvent::GameStarted { human_side });
        match self.rules.terminal(&self.session.position) {
            Some(reason) => self.finish(reason),
            None => self.enter_turn(),
        }
    }

    /// Takes back the last engine move and the human move before it.
    pub fn undo_turn(&mut self) -> Result<(), SessionError> {
        if self.session.state.is_over() {
            return Err(SessionError::GameAlreadyOver);
        }
        let played = self.session.ledger.played();
        let human = self.session.human_side;
        match played {
            [.., before, last] if before.mover == human && last.mover != human => {}
            _ => return Err(SessionError::NothingToUndo),
        }

        self.cancel_all();
        self.session.ledger.undo_last()?;
        self.session.ledger.undo_last()?;
        self.session.position = self.session.ledger.head_position().clone();
        let ply = self.session.ledger.len();
        info!(ply, "turn undone");
        self.events.publish(SessionEvent::HistoryRewound { ply });
        self.await_human();
        Ok(())
    }

    /// Replays the human and engine moves taken back by the last undo.
    ///
    /// Both moves are checked against the rules again; if either no longer
    /// applies nothing changes.
    pub fn redo_turn(&mut self) -> Result<(), SessionError> {
        match self.session.state {
            SessionState::GameOver(_) => return Err(SessionError::GameAlreadyOver),
            SessionState::RequestingEngineMove => return Err(SessionError::NotYourTurn),
            SessionState::AwaitingHumanMove => {}
        }
        let human = self.session.human_side;
        match self.session.ledger.redo_stack() {
            [.., reply, next] if next.mover == human && reply.mover != human => {}
            _ => return Err(SessionError::EmptyRedo),
        }

        let replayed = self
            .session
            .ledger
            .redo_many(&self.rules, 2)?
            .to_vec();
        self.cancel_all();
        self.session.position = self.session.ledger.head_position().clone();
        info!(ply = self.session.ledger.len(), "turn redone");
        for record in replayed {
            self.events.publish(SessionEvent::MoveApplied { record });
        }
        match self.rules.terminal(&self.session.position) {
            Some(reason) => self.finish(reason),
            None => self.enter_turn(),
        }
        Ok(())
    }

    /// Goes back to an earlier ply where the human is to move.
    ///
    /// Later moves are dropped for good; the redo stack is cleared.
    pub fn rewind_to(&mut self, ply: usize) -> Result<(), SessionError> {
        let ledger = &self.session.ledger;
        if ply >= ledger.len() {
            return Err(SessionError::InvalidPly { ply });
        }
        let target = match ply {
            0 => ledger.initial_position(),
            n => &ledger.played()[n - 1].resulting_position,
        };
        if target.side_to_move() != self.session.human_side {
            return Err(SessionError::InvalidPly { ply });
        }

        self.cancel_all();
        let dropped = self.session.ledger.truncate_from(ply);
        self.session.position = self.session.ledger.head_position().clone();
        info!(ply, dropped = dropped.len(), "rewound");
        self.events.publish(SessionEvent::HistoryRewound { ply });
        self.await_human();
        Ok(())
    }

    /// Flips the board for display.
    pub fn flip_orientation(&mut self) -> DisplaySide {
        let orientation = self.session.orientation.flipped();
        self.session.orientation = orientation;
        self.events
            .publish(SessionEvent::OrientationChanged { orientation });
        orientation
    }

    // -- engine replies --

    /// Waits for the next engine reply.
    pub async fn next_reply(&mut self) -> Option<EngineReply> {
        self.replies_rx.recv().await
    }

    /// Returns a reply that has already arrived, if any.
    pub fn try_next_reply(&mut self) -> Option<EngineReply> {
        self.replies_rx.try_recv().ok()
    }

    /// Applies an engine reply to the session.
    ///
    /// Replies for a request that is no longer live fail with
    /// [`SessionError::StaleResponse`] and publish nothing.
    pub fn handle_reply(&mut self, reply: EngineReply) -> Result<(), SessionError> {
        let current = self.session.ledger.len();
        let live = self
            .slot(reply.purpose)
            .as_ref()
            .is_some_and(|p| p.generation == reply.generation && p.ply == reply.ply);
        if !live || reply.ply != current {
            debug!(
                purpose = ?reply.purpose,
                tagged = reply.ply,
                current,
                generation = reply.generation,
                "discarding stale engine response"
            );
            return Err(SessionError::StaleResponse {
                tagged: reply.ply,
                current,
            });
        }
        *self.slot_mut(reply.purpose) = None;

        let mv = match reply.result {
            Ok(mv) => mv,
            Err(error) => {
                warn!(purpose = ?reply.purpose, %error, "engine request failed");
                self.events.publish(SessionEvent::EngineFailed {
                    purpose: reply.purpose,
                    error: error.clone(),
                });
                return Err(error.into());
            }
        };

        match reply.purpose {
            RequestPurpose::Hint => self.deliver_hint(mv),
            RequestPurpose::EngineMove => {
                if self.session.state != SessionState::RequestingEngineMove {
                    return Err(SessionError::StaleResponse {
                        tagged: reply.ply,
                        current,
                    });
                }
                match self.play(mv) {
                    Ok(_) => Ok(()),
                    Err(SessionError::Illegal(illegal)) => {
                        warn!(mv = %illegal.mv, reason = %illegal.reason, "engine proposed an illegal move");
                        self.events.publish(SessionEvent::IllegalMoveRejected {
                            mv: illegal.mv,
                            reason: illegal.reason,
                        });
                        Err(illegal.into())
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }

    fn deliver_hint(&mut self, mv: BoardMove) -> Result<(), SessionError> {
        if !self.rules.is_legal(&self.session.position, mv) {
            warn!(%mv, "engine suggested an illegal hint");
            let error = ServiceError::InvalidResponse(format!("illegal hint {mv}"));
            self.events.publish(SessionEvent::EngineFailed {
                purpose: RequestPurpose::Hint,
                error,
            });
            return Err(Illegal::new(mv, IllegalReason::NotLegal).into());
        }
        debug!(%mv, "hint ready");
        self.events.publish(SessionEvent::HintReady {
            from: mv.from,
            to: mv.to,
        });
        Ok(())
    }

    // -- internals --

    fn play(&mut self, mv: BoardMove) -> Result<MoveRecord, SessionError> {
        let mover = self.session.position.side_to_move();
        let applied = self.rules.apply_move(&self.session.position, mv)?;
        let terminal = applied.terminal;
        let record = MoveRecord::from_applied(self.session.ledger.len(), mover, applied);

        self.session.ledger.append(record.clone())?;
        self.cancel_all();
        self.session.position = record.resulting_position.clone();
        info!(ply = record.ply, mover = ?mover, san = %record.san, "move applied");
        self.events.publish(SessionEvent::MoveApplied {
            record: record.clone(),
        });

        match terminal {
            Some(reason) => self.finish(reason),
            None => self.enter_turn(),
        }
        Ok(record)
    }

    fn finish(&mut self, reason: Termination) {
        self.cancel_all();
        self.session.state = SessionState::GameOver(reason);
        info!(result = reason.result(), %reason, "game over");
        self.events.publish(SessionEvent::GameEnded { reason });
    }

    /// Announces the side to move and starts its turn.
    fn enter_turn(&mut self) {
        let to_move = self.session.position.side_to_move();
        self.events.publish(SessionEvent::TurnChanged { to_move });
        if to_move == self.session.human_side {
            self.await_human();
        } else {
            self.session.state = SessionState::RequestingEngineMove;
            self.pending_move = Some(self.issue(RequestPurpose::EngineMove));
        }
    }

    fn await_human(&mut self) {
        self.session.state = SessionState::AwaitingHumanMove;
        if self.config.auto_hint {
            self.pending_hint = Some(self.issue(RequestPurpose::Hint));
        }
    }

    fn issue(&mut self, purpose: RequestPurpose) -> PendingSuggestion {
        self.generation += 1;
        let generation = self.generation;
        let ply = self.session.ledger.len();
        let fen = self.session.position.to_fen();
        let depth = self.config.depth;
        let engine = Arc::clone(&self.engine);
        let replies = self.replies_tx.clone();

        debug!(?purpose, ply, generation, %fen, "requesting engine suggestion");
        let task = tokio::spawn(async move {
            let result = engine.suggest_move(&fen, depth).await;
            // The controller may be gone; nobody is left to tell.
            let _ = replies.send(EngineReply {
                purpose,
                ply,
                generation,
                result,
            });
        });

        PendingSuggestion {
            ply,
            generation,
            task: task.abort_handle(),
        }
    }

    fn slot(&self, purpose: RequestPurpose) -> &Option<PendingSuggestion> {
        match purpose {
            RequestPurpose::EngineMove => &self.pending_move,
            RequestPurpose::Hint => &self.pending_hint,
        }
    }

    fn slot_mut(&mut self, purpose: RequestPurpose) -> &mut Option<PendingSuggestion> {
        match purpose {
            RequestPurpose::EngineMove => &mut self.pending_move,
            RequestPurpose::Hint => &mut self.pending_hint,
        }
    }

    fn cancel(&mut self, purpose: RequestPurpose) {
        if let Some(pending) = self.slot_mut(purpose).take() {
            debug!(?purpose, ply = pending.ply, generation = pending.generation, "cancelling engine request");
            pending.task.abort();
        }
    }

    fn cancel_all(&mut self) {
        self.cancel(RequestPurpose::EngineMove);
        self.cancel(RequestPurpose::Hint);
    }
}

impl<R: RulesEngine> Drop for SessionController<R> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

impl<R: RulesEngine> std::fmt::Debug for SessionController<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("session", &self.session)
            .field("config", &self.config)
            .field("pending_move", &self.pending_move)
            .field("pending_hint", &self.pending_hint)
            .finish_non_exhaustive()
    }
}
