//! Actor wrapper that serialises access to a [`SessionController`].

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::controller::{Session, SessionController};
use crate::error::SessionError;
use crate::event::EventReceiver;
use crate::ledger::MoveRecord;
use crate::position::{BoardMove, DisplaySide};
use crate::rules::RulesEngine;
use crate::Side;

type Reply<T> = oneshot::Sender<Result<T, SessionError>>;

/// Commands understood by the session task. Each carries its reply channel.
enum Command {
    SubmitMove { mv: BoardMove, reply: Reply<MoveRecord> },
    RequestHint { reply: Reply<()> },
    RetryEngineMove { reply: Reply<()> },
    UndoTurn { reply: Reply<()> },
    RedoTurn { reply: Reply<()> },
    NewGame { human_side: Option<Side>, reply: Reply<()> },
    RewindTo { ply: usize, reply: Reply<()> },
    FlipOrientation { reply: Reply<DisplaySide> },
    Snapshot { reply: Reply<Session> },
    Subscribe { reply: Reply<EventReceiver> },
    Shutdown { reply: oneshot::Sender<()> },
}

/// Cloneable handle to a session running on its own task.
///
/// Human commands and engine replies are handled one at a time by the
/// task, so an engine move can never land in the middle of an undo.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Starts the game, unless the controller was already started, and
    /// moves the controller onto a new task.
    ///
    /// Subscribe on the controller before calling this to see the opening
    /// events.
    pub fn spawn<R>(controller: SessionController<R>) -> (Self, JoinHandle<()>)
    where
        R: RulesEngine + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(32);
        let task = tokio::spawn(run(controller, rx));
        (Self { tx }, task)
    }

    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| SessionError::SessionClosed)?;
        rx.await.map_err(|_| SessionError::SessionClosed)?
    }

    pub async fn submit_move(&self, mv: BoardMove) -> Result<MoveRecord, SessionError> {
        self.call(|reply| Command::SubmitMove { mv, reply }).await
    }

    pub async fn request_hint(&self) -> Result<(), SessionError> {
        self.call(|reply| Command::RequestHint { reply }).await
    }

    pub async fn retry_engine_move(&self) -> Result<(), SessionError> {
        self.call(|reply| Command::RetryEngineMove { reply }).await
    }

    pub async fn undo_turn(&self) -> Result<(), SessionError> {
        self.call(|reply| Command::UndoTurn { reply }).await
    }

    pub async fn redo_turn(&self) -> Result<(), SessionError> {
        self.call(|reply| Command::RedoTurn { reply }).await
    }

    /// Starts over; `human_side` switches sides when given.
    pub async fn new_game(&self, human_side: Option<Side>) -> Result<(), SessionError> {
        self.call(|reply| Command::NewGame { human_side, reply }).await
    }

    pub async fn rewind_to(&self, ply: usize) -> Result<(), SessionError> {
        self.call(|reply| Command::RewindTo { ply, reply }).await
    }

    pub async fn flip_orientation(&self) -> Result<DisplaySide, SessionError> {
        self.call(|reply| Command::FlipOrientation { reply }).await
    }

    pub async fn snapshot(&self) -> Result<Session, SessionError> {
        self.call(|reply| Command::Snapshot { reply }).await
    }

    pub async fn subscribe(&self) -> Result<EventReceiver, SessionError> {
        self.call(|reply| Command::Subscribe { reply }).await
    }

    /// Stops the session task. Later calls fail with `SessionClosed`.
    pub async fn shutdown(&self) {
        let (reply, rx) = oneshot::channel();
        if self.tx.send(Command::Shutdown { reply }).await.is_ok() {
            let _ = rx.await;
        }
    }
}

async fn run<R: RulesEngine>(
    mut controller: SessionController<R>,
    mut commands: mpsc::Receiver<Command>,
) {
    controller.start();
    loop {
        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Shutdown { reply }) => {
                    let _ = reply.send(());
                    break;
                }
                Some(command) => dispatch(&mut controller, command),
                None => break,
            },
            Some(reply) = controller.next_reply() => {
                if let Err(e) = controller.handle_reply(reply) {
                    debug!(error = %e, "engine reply not applied");
                }
            }
        }
    }
    info!("session task stopped");
}

fn dispatch<R: RulesEngine>(controller: &mut SessionController<R>, command: Command) {
    // A dropped reply receiver only means the caller stopped waiting.
    match command {
        Command::SubmitMove { mv, reply } => {
            let _ = reply.send(controller.submit_move(mv));
        }
        Command::RequestHint { reply } => {
            let _ = reply.send(controller.request_hint());
        }
        Command::RetryEngineMove { reply } => {
            let _ = reply.send(controller.retry_engine_move());
        }
        Command::UndoTurn { reply } => {
            let _ = reply.send(controller.undo_turn());
        }
        Command::RedoTurn { reply } => {
            let _ = reply.send(controller.redo_turn());
        }
        Command::NewGame { human_side, reply } => {
            match human_side {
                Some(side) => controller.new_game_as(side),
                None => controller.new_game(),
            }
            let _ = reply.send(Ok(()));
        }
        Command::RewindTo { ply, reply } => {
            let _ = reply.send(controller.rewind_to(ply));
        }
        Command::FlipOrientation { reply } => {
            let _ = reply.send(Ok(controller.flip_orientation()));
        }
        Command::Snapshot { reply } => {
            let _ = reply.send(Ok(controller.snapshot()));
        }
        Command::Subscribe { reply } => {
            let _ = reply.send(Ok(controller.subscribe()));
        }
        Command::Shutdown { reply } => {
            let _ = reply.send(());
        }
    }
}
