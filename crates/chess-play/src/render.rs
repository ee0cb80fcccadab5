//! Text rendering of the board, move list and session events.

use std::fmt::Write;

use chess_session::{
    DisplaySide, Position, RequestPurpose, SessionEvent, Side, SoundCue, Turn,
};

pub fn side_name(side: Side) -> &'static str {
    match side {
        Side::White => "White",
        Side::Black => "Black",
    }
}

/// Draws the board with `orientation` at the bottom.
///
/// Pieces use FEN letters, empty squares a dot.
pub fn board(position: &Position, orientation: DisplaySide) -> String {
    let fen = position.to_fen();
    let placement = fen.split_whitespace().next().unwrap_or_default();
    let mut ranks: Vec<Vec<char>> = placement
        .split('/')
        .map(|rank| {
            rank.chars()
                .flat_map(|c| match c.to_digit(10) {
                    Some(n) => vec!['.'; n as usize],
                    None => vec![c],
                })
                .collect()
        })
        .collect();
    let mut labels: Vec<char> = ('1'..='8').rev().collect();
    let mut files: Vec<char> = ('a'..='h').collect();

    if orientation == DisplaySide::Black {
        ranks.reverse();
        ranks.iter_mut().for_each(|rank| rank.reverse());
        labels.reverse();
        files.reverse();
    }

    let mut out = String::new();
    for (label, rank) in labels.iter().zip(&ranks) {
        let squares: Vec<String> = rank.iter().map(char::to_string).collect();
        let _ = writeln!(out, "{label} {}", squares.join(" "));
    }
    let files: Vec<String> = files.iter().map(char::to_string).collect();
    let _ = write!(out, "  {}", files.join(" "));
    out
}

/// The move list, one numbered turn per line.
pub fn move_list(turns: &[Turn]) -> String {
    if turns.is_empty() {
        return "No moves yet.".to_string();
    }
    turns
        .iter()
        .map(|turn| {
            let white = turn.white.as_deref().unwrap_or("...");
            match &turn.black {
                Some(black) => format!("{}. {white} {black}", turn.number),
                None => format!("{}. {white}", turn.number),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A line describing `event` for the player.
pub fn describe(event: &SessionEvent) -> String {
    match event {
        SessionEvent::GameStarted { human_side } => {
            format!("New game. You play {}.", side_name(*human_side))
        }
        SessionEvent::MoveApplied { record } => {
            let position = &record.resulting_position;
            match record.mover {
                Side::White => format!("{}. {}", position.fullmove_number(), record.san),
                Side::Black => format!(
                    "{}... {}",
                    position.fullmove_number().saturating_sub(1),
                    record.san
                ),
            }
        }
        SessionEvent::TurnChanged { to_move } => format!("{} to move.", side_name(*to_move)),
        SessionEvent::GameEnded { reason } => {
            format!("Game over: {reason} ({}).", reason.result())
        }
        SessionEvent::HintReady { from, to } => format!("Hint: {from}{to}"),
        SessionEvent::HistoryRewound { ply } => {
            format!("Taken back to half-move {ply}.")
        }
        SessionEvent::IllegalMoveRejected { mv, reason } => {
            format!("Engine proposed {mv}, which is illegal ({reason}). Type 'retry'.")
        }
        SessionEvent::EngineFailed {
            purpose: RequestPurpose::EngineMove,
            error,
        } => format!("Engine failed: {error}. Type 'retry' to ask again."),
        SessionEvent::EngineFailed {
            purpose: RequestPurpose::Hint,
            error,
        } => format!("No hint available: {error}."),
        SessionEvent::OrientationChanged { orientation } => {
            let bottom = match orientation {
                DisplaySide::White => Side::White,
                DisplaySide::Black => Side::Black,
            };
            format!("Board flipped, {} at the bottom.", side_name(bottom))
        }
    }
}

/// Terminal bell for the cues worth interrupting the player for.
pub fn bell(cue: SoundCue) -> Option<&'static str> {
    match cue {
        SoundCue::Victory | SoundCue::Defeat | SoundCue::Draw | SoundCue::Check => Some("\x07"),
        SoundCue::Capture | SoundCue::Move | SoundCue::GenericNotify => None,
    }
}
