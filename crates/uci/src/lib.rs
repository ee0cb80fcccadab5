//! GUI side of the UCI (Universal Chess Interface) protocol.
//!
//! This crate formats the commands a GUI sends to an engine and parses the
//! lines the engine prints back. It does no I/O itself.
//!
//! # Commands
//!
//! - `uci` - Initialize engine, get id and options
//! - `isready` / `readyok` - Synchronization
//! - `ucinewgame` - Next search is from a new game
//! - `position fen <fen>` - Set position
//! - `go [depth <d>]` - Start search
//! - `stop` - Stop search, the engine answers with `bestmove`
//! - `quit` - Exit engine

mod command;
mod info;

pub use command::{GoOptions, GuiCommand};
pub use info::{EngineInfo, Score};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Messages sent from engine to GUI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    /// Engine identification.
    Id {
        name: Option<String>,
        author: Option<String>,
    },
    /// UCI initialization complete.
    UciOk,
    /// Engine is ready.
    ReadyOk,
    /// Search information.
    Info(EngineInfo),
    /// Best move found; `None` when the engine has no legal move.
    BestMove {
        mv: Option<String>,
        ponder: Option<String>,
    },
    /// Anything else the engine prints.
    Unknown(String),
}

impl EngineMessage {
    /// Parse one line of engine output.
    pub fn parse(line: &str) -> Result<Self, UciError> {
        let line = line.trim();
        let mut parts = line.split_whitespace();

        match parts.next().unwrap_or("") {
            "uciok" => Ok(EngineMessage::UciOk),
            "readyok" => Ok(EngineMessage::ReadyOk),
            "id" => {
                let field = parts.next();
                let value = parts.collect::<Vec<_>>().join(" ");
                match field {
                    Some("name") => Ok(EngineMessage::Id {
                        name: Some(value),
                        author: None,
                    }),
                    Some("author") => Ok(EngineMessage::Id {
                        name: None,
                        author: Some(value),
                    }),
                    _ => Err(UciError::ParseError(format!("Malformed id line: {}", line))),
                }
            }
            "info" => EngineInfo::parse(line)
                .map(EngineMessage::Info)
                .ok_or_else(|| UciError::ParseError(line.to_string())),
            "bestmove" => {
                let mv = match parts.next() {
                    Some("(none)") | Some("0000") => None,
                    Some(m) => Some(m.to_string()),
                    None => {
                        return Err(UciError::ParseError(
                            "bestmove without a move".to_string(),
                        ))
                    }
                };
                let ponder = match (parts.next(), parts.next()) {
                    (Some("ponder"), Some(p)) => Some(p.to_string()),
                    _ => None,
                };
                Ok(EngineMessage::BestMove { mv, ponder })
            }
            _ => Ok(EngineMessage::Unknown(line.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_handshake() {
        assert_eq!(EngineMessage::parse("uciok").unwrap(), EngineMessage::UciOk);
        assert_eq!(
            EngineMessage::parse("readyok\n").unwrap(),
            EngineMessage::ReadyOk
        );
        assert_eq!(
            EngineMessage::parse("id name Stockfish 16").unwrap(),
            EngineMessage::Id {
                name: Some("Stockfish 16".to_string()),
                author: None
            }
        );
    }

    #[test]
    fn option_lines_are_unknown() {
        assert!(matches!(
            EngineMessage::parse("option name Skill Level type spin default 20 min 0 max 20"),
            Ok(EngineMessage::Unknown(_))
        ));
    }

    #[test]
    fn parse_bestmove() {
        assert_eq!(
            EngineMessage::parse("bestmove e2e4 ponder e7e5").unwrap(),
            EngineMessage::BestMove {
                mv: Some("e2e4".to_string()),
                ponder: Some("e7e5".to_string())
            }
        );
        assert_eq!(
            EngineMessage::parse("bestmove e7e8q").unwrap(),
            EngineMessage::BestMove {
                mv: Some("e7e8q".to_string()),
                ponder: None
            }
        );
    }

    #[test]
    fn parse_bestmove_none() {
        assert_eq!(
            EngineMessage::parse("bestmove (none)").unwrap(),
            EngineMessage::BestMove {
                mv: None,
                ponder: None
            }
        );
        assert!(EngineMessage::parse("bestmove").is_err());
    }

    #[test]
    fn parse_info_line() {
        match EngineMessage::parse("info depth 1 score cp 20").unwrap() {
            EngineMessage::Info(info) => assert_eq!(info.depth, Some(1)),
            other => panic!("Expected info, got {:?}", other),
        }
    }

    #[test]
    fn unknown_lines_are_kept() {
        assert_eq!(
            EngineMessage::parse("Stockfish 16 by the Stockfish developers").unwrap(),
            EngineMessage::Unknown("Stockfish 16 by the Stockfish developers".to_string())
        );
    }
}
