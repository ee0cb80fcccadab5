//! Human versus engine chess sessions.
//!
//! This crate provides:
//! - [`Position`] - Immutable game state produced by the rules engine
//! - [`RulesEngine`] - Trait for the rules collaborator, with [`StandardRules`]
//! - [`MoveLedger`] - Played moves plus a redo stack
//! - [`SessionController`] - Turn state machine, undo/redo and engine requests
//! - [`EngineService`] - Async trait for move suggestion services
//! - [`SessionHandle`] - Runs a controller on its own task
//!
//! # Engine requests
//!
//! Engine requests are answered asynchronously and in any order. Every
//! request is tagged with the ply it was issued for and a generation number;
//! a reply is applied only if both still match the live request. Anything
//! else is dropped without touching the game.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use chess_session::{
//!     BoardMove, EngineService, ServiceError, SessionConfig, SessionController, SessionEvent,
//!     SessionState,
//! };
//!
//! struct Scholar;
//!
//! #[async_trait]
//! impl EngineService for Scholar {
//!     async fn suggest_move(&self, _fen: &str, _depth: u32) -> Result<BoardMove, ServiceError> {
//!         Ok("e7e5".parse().unwrap())
//!     }
//! }
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let config = SessionConfig { auto_hint: false, ..SessionConfig::default() };
//! let mut session = SessionController::new(Arc::new(Scholar), config).unwrap();
//! let mut events = session.subscribe();
//! session.start();
//!
//! session.submit_move("e2e4".parse().unwrap()).unwrap();
//! assert_eq!(session.state(), SessionState::RequestingEngineMove);
//!
//! let reply = session.next_reply().await.unwrap();
//! session.handle_reply(reply).unwrap();
//! assert_eq!(session.state(), SessionState::AwaitingHumanMove);
//! assert_eq!(session.ledger().uci_moves(), vec!["e2e4", "e7e5"]);
//! # assert!(matches!(events.try_recv(), Ok(SessionEvent::GameStarted { .. })));
//! # });
//! ```

mod controller;
mod cue;
mod error;
mod event;
mod handle;
pub mod ledger;
mod opening;
mod position;
pub mod rules;
mod service;

pub use shakmaty::{Color as Side, Role as PieceKind, Square};

pub use controller::{EngineReply, Session, SessionConfig, SessionController, SessionState};
pub use cue::SoundCue;
pub use error::SessionError;
pub use event::{EventChannel, EventReceiver, RequestPurpose, SessionEvent};
pub use handle::SessionHandle;
pub use ledger::{LedgerError, MoveLedger, MoveRecord, Turn};
pub use opening::OpeningLookup;
pub use position::{BoardMove, DisplaySide, MoveParseError, Position, PositionError};
pub use rules::{Applied, Illegal, IllegalReason, RulesEngine, StandardRules, Termination};
pub use service::{EngineService, ServiceError};
