//! Line commands typed at the prompt.

use chess_session::{BoardMove, Side};
use thiserror::Error;

pub const HELP: &str = "\
Commands:
  e2e4, e7e8q     play a move (also: move e2e4)
  hint            ask the engine for a suggestion
  retry           ask the engine to move again after a failure
  undo            take back your last move and the engine's reply
  redo            replay the turn you took back
  rewind <ply>    go back to the position after <ply> half-moves
  new [white|black]  start a new game
  flip            turn the board around
  moves           show the move list
  board           show the board
  fen             show the position in FEN
  help            show this help
  quit            leave";

/// A parsed prompt line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Move(BoardMove),
    Hint,
    Retry,
    Undo,
    Redo,
    Rewind(usize),
    NewGame(Option<Side>),
    Flip,
    Moves,
    Board,
    Fen,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Parses one line. Blank lines yield `Ok(None)`.
pub fn parse(line: &str) -> Result<Option<Input>, InputError> {
    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(InputError::Unknown(line.trim().to_string()));
    }

    let input = match (first.to_ascii_lowercase().as_str(), arg) {
        ("hint", None) => Input::Hint,
        ("retry", None) => Input::Retry,
        ("undo", None) => Input::Undo,
        ("redo", None) => Input::Redo,
        ("flip", None) => Input::Flip,
        ("moves", None) => Input::Moves,
        ("board", None) => Input::Board,
        ("fen", None) => Input::Fen,
        ("help" | "?", None) => Input::Help,
        ("quit" | "exit", None) => Input::Quit,
        ("new", None) => Input::NewGame(None),
        ("new", Some(side)) => Input::NewGame(Some(parse_side(side)?)),
        ("rewind", Some(ply)) => Input::Rewind(
            ply.parse()
                .map_err(|_| InputError::Usage("rewind <ply>"))?,
        ),
        ("rewind", None) => return Err(InputError::Usage("rewind <ply>")),
        ("move", Some(mv)) => Input::Move(parse_move(mv)?),
        ("move", None) => return Err(InputError::Usage("move <from><to>[promotion]")),
        (_, None) => Input::Move(parse_move(first)?),
        _ => return Err(InputError::Unknown(line.trim().to_string())),
    };
    Ok(Some(input))
}

fn parse_side(word: &str) -> Result<Side, InputError> {
    match word.to_ascii_lowercase().as_str() {
        "white" | "w" => Ok(Side::White),
        "black" | "b" => Ok(Side::Black),
        _ => Err(InputError::Usage("new [white|black]")),
    }
}

fn parse_move(word: &str) -> Result<BoardMove, InputError> {
    word.to_ascii_lowercase()
        .parse()
        .map_err(|_| InputError::Unknown(word.to_string()))
}
