use crate::event::SessionEvent;
use crate::ledger::MoveRecord;
use crate::rules::Termination;
use crate::Side;

/// Sound to play for a session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    Victory,
    Defeat,
    Check,
    Draw,
    Capture,
    Move,
    GenericNotify,
}

impl SoundCue {
    /// Cue for a move that did not end the game.
    pub fn for_move(record: &MoveRecord) -> Self {
        if record.resulting_position.is_check() {
            SoundCue::Check
        } else if record.capture {
            SoundCue::Capture
        } else {
            SoundCue::Move
        }
    }

    /// Cue for the end of the game, seen from the human's side.
    pub fn for_ending(reason: Termination, human_side: Side) -> Self {
        match reason.winner() {
            Some(winner) if winner == human_side => SoundCue::Victory,
            Some(_) => SoundCue::Defeat,
            None => SoundCue::Draw,
        }
    }

    /// Cue for `event`, if it has one.
    ///
    /// A game-ending move produces a move cue followed by the ending cue;
    /// players usually let the later one win.
    pub fn for_event(event: &SessionEvent, human_side: Side) -> Option<Self> {
        match event {
            SessionEvent::MoveApplied { record } => Some(Self::for_move(record)),
            SessionEvent::GameEnded { reason } => Some(Self::for_ending(*reason, human_side)),
            SessionEvent::GameStarted { .. } | SessionEvent::HistoryRewound { .. } => {
                Some(SoundCue::GenericNotify)
            }
            _ => None,
        }
    }
}
