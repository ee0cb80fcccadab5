//! UCI engine subprocess driven with tokio.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use chess_session::{BoardMove, EngineService, ServiceError};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, info, trace, warn};
use uci::{EngineMessage, GoOptions, GuiCommand};

use crate::EngineError;

/// Maximum number of lines to read before giving up on a handshake response.
pub const MAX_UCI_LINES: usize = 1000;

/// Maximum number of lines to read while waiting for `bestmove`.
pub const MAX_SEARCH_LINES: usize = 100_000;

/// How long the engine gets to finish the `uci` handshake.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

struct EngineProcess {
    child: Child,
    stdin: ChildStdin,
    lines: Lines<BufReader<ChildStdout>>,
    /// Set while a search may be running whose `bestmove` was not read.
    in_flight: bool,
}

impl EngineProcess {
    async fn send(&mut self, cmd: &GuiCommand) -> Result<(), EngineError> {
        let line = cmd.to_uci();
        trace!(%line, "uci >");
        self.stdin.write_all(format!("{}\n", line).as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    async fn read_message(&mut self) -> Result<EngineMessage, EngineError> {
        let line = self.lines.next_line().await?.ok_or(EngineError::Closed)?;
        trace!(%line, "uci <");
        EngineMessage::parse(&line).map_err(|e| EngineError::InvalidResponse(e.to_string()))
    }

    async fn wait_for(
        &mut self,
        limit: usize,
        mut done: impl FnMut(&EngineMessage) -> bool,
    ) -> Result<EngineMessage, EngineError> {
        for _ in 0..limit {
            let msg = self.read_message().await?;
            if done(&msg) {
                return Ok(msg);
            }
        }
        Err(EngineError::InvalidResponse(format!(
            "no answer within {} lines",
            limit
        )))
    }

    /// Finishes a search abandoned by a cancelled request.
    async fn settle(&mut self) -> Result<(), EngineError> {
        if !self.in_flight {
            return Ok(());
        }
        debug!("stopping abandoned search");
        self.send(&GuiCommand::Stop).await?;
        self.send(&GuiCommand::IsReady).await?;
        self.wait_for(MAX_SEARCH_LINES, |m| *m == EngineMessage::ReadyOk)
            .await?;
        self.in_flight = false;
        Ok(())
    }

    async fn search(&mut self, fen: &str, depth: u32) -> Result<Option<String>, EngineError> {
        self.settle().await?;

        self.in_flight = true;
        self.send(&GuiCommand::position_fen(fen)).await?;
        self.send(&GuiCommand::Go(GoOptions::depth(depth))).await?;

        let msg = self
            .wait_for(MAX_SEARCH_LINES, |m| {
                if let EngineMessage::Info(info) = m {
                    trace!(depth = ?info.depth, score = ?info.score, "search info");
                }
                matches!(m, EngineMessage::BestMove { .. })
            })
            .await?;
        self.in_flight = false;

        match msg {
            EngineMessage::BestMove { mv, .. } => Ok(mv),
            other => Err(EngineError::InvalidResponse(format!("{:?}", other))),
        }
    }
}

/// An [`EngineService`] backed by a UCI engine subprocess.
///
/// Searches run one at a time on the single process. When a request is
/// cancelled mid-search the engine is told to stop before the next search
/// starts, so a late `bestmove` is never mistaken for a newer answer.
///
/// # Example
///
/// ```no_run
/// use chess_engine_service::UciEngineService;
///
/// # async fn run() -> Result<(), chess_engine_service::EngineError> {
/// let engine = UciEngineService::spawn("stockfish").await?;
/// let best = engine
///     .best_move("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1", 1)
///     .await?;
/// println!("{} suggests {:?}", engine.name(), best);
/// engine.quit().await;
/// # Ok(())
/// # }
/// ```
pub struct UciEngineService {
    name: String,
    process: Mutex<EngineProcess>,
}

impl UciEngineService {
    /// Spawns the engine and completes the UCI handshake.
    pub async fn spawn(program: impl AsRef<OsStr>) -> Result<Self, EngineError> {
        Self::spawn_with_args(program, std::iter::empty::<&str>()).await
    }

    /// Spawns the engine with extra command-line arguments.
    pub async fn spawn_with_args<I, S>(
        program: impl AsRef<OsStr>,
        args: I,
    ) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = program.as_ref();
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => {
                    EngineError::NotFound(program.to_string_lossy().into_owned())
                }
                _ => EngineError::SpawnError(e),
            })?;

        let stdin = child.stdin.take().ok_or(EngineError::InitFailed)?;
        let stdout = child.stdout.take().ok_or(EngineError::InitFailed)?;
        let mut process = EngineProcess {
            child,
            stdin,
            lines: BufReader::new(stdout).lines(),
            in_flight: false,
        };

        let name = tokio::time::timeout(HANDSHAKE_TIMEOUT, Self::handshake(&mut process))
            .await
            .map_err(|_| EngineError::InitFailed)??;
        info!(engine = %name, "uci engine ready");

        Ok(Self {
            name,
            process: Mutex::new(process),
        })
    }

    async fn handshake(process: &mut EngineProcess) -> Result<String, EngineError> {
        process.send(&GuiCommand::Uci).await?;
        let mut name = None;
        for _ in 0..MAX_UCI_LINES {
            match process.read_message().await? {
                EngineMessage::Id { name: Some(n), .. } => name = Some(n),
                EngineMessage::UciOk => {
                    process.send(&GuiCommand::IsReady).await?;
                    process
                        .wait_for(MAX_UCI_LINES, |m| *m == EngineMessage::ReadyOk)
                        .await
                        .map_err(|_| EngineError::InitFailed)?;
                    return Ok(name.unwrap_or_else(|| "Unknown Engine".to_string()));
                }
                _ => {}
            }
        }
        Err(EngineError::InitFailed)
    }

    /// The engine's name as reported via `id name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Searches `fen` to `depth` and returns the engine's move in UCI
    /// notation, or `None` if the side to move has no legal move.
    pub async fn best_move(&self, fen: &str, depth: u32) -> Result<Option<String>, EngineError> {
        let mut process = self.process.lock().await;
        process.search(fen, depth).await
    }

    /// Tells the engine that the next search belongs to a new game.
    pub async fn new_game(&self) -> Result<(), EngineError> {
        let mut process = self.process.lock().await;
        process.settle().await?;
        process.send(&GuiCommand::UciNewGame).await?;
        process.send(&GuiCommand::IsReady).await?;
        process
            .wait_for(MAX_UCI_LINES, |m| *m == EngineMessage::ReadyOk)
            .await?;
        Ok(())
    }

    /// Shuts the engine down, killing it if `quit` is ignored.
    pub async fn quit(self) {
        let mut process = self.process.into_inner();
        if let Err(e) = process.send(&GuiCommand::Quit).await {
            warn!(error = %e, "failed to send quit");
        }
        match tokio::time::timeout(Duration::from_secs(1), process.child.wait()).await {
            Ok(_) => {}
            Err(_) => {
                let _ = process.child.kill().await;
            }
        }
    }
}

#[async_trait]
impl EngineService for UciEngineService {
    async fn suggest_move(&self, fen: &str, depth: u32) -> Result<BoardMove, ServiceError> {
        let best = self.best_move(fen, depth).await?;
        let uci = best.ok_or(ServiceError::NoMove)?;
        uci.parse::<BoardMove>()
            .map_err(|e| ServiceError::InvalidResponse(e.to_string()))
    }
}

impl std::fmt::Debug for UciEngineService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UciEngineService")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
