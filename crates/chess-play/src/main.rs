//! Chess Play - a game against a chess engine in the terminal.
//!
//! Reads line commands from stdin, forwards them to a session running on
//! its own task and prints the session's events as they arrive. Logs go to
//! stderr so they can be silenced with `RUST_LOG` without losing the game.

mod command;
mod config;
mod random;
mod render;

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chess_engine_service::UciEngineService;
use chess_openings::OpeningBook;
use chess_session::{
    DisplaySide, EngineService, EventReceiver, OpeningLookup, SessionController, SessionError,
    SessionEvent, SessionHandle, Side, SoundCue,
};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use command::{Input, HELP};
use config::{Config, EngineKind, Overrides};
use random::RandomEngine;

/// Chess Play - play chess against an engine in the terminal.
#[derive(Parser)]
#[command(name = "chess-play")]
#[command(about = "Play chess against a UCI engine in the terminal")]
struct Args {
    /// Path to the config file
    #[arg(long, default_value = Config::DEFAULT_PATH)]
    config: PathBuf,

    #[command(flatten)]
    overrides: Overrides,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?
        .with_overrides(&args.overrides);
    config.validate()?;
    info!(engine = ?config.engine, depth = config.depth, "starting chess-play");

    let book = load_book(&config)?;
    let engine = connect_engine(&config).await?;

    let mut controller = SessionController::new(engine, config.session_config())
        .context("invalid start position")?;
    let events = controller.subscribe();
    let (handle, session_task) = SessionHandle::spawn(controller);
    let printer = tokio::spawn(print_events(events, book, config.human_side.into()));

    println!("{HELP}\n");
    if let Ok(session) = handle.snapshot().await {
        println!("{}", render::board(&session.position, session.orientation));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = match command::parse(&line) {
            Ok(Some(input)) => input,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        match execute(&handle, input).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(SessionError::SessionClosed) => {
                warn!("session stopped");
                break;
            }
            Err(e) => println!("{e}"),
        }
    }

    handle.shutdown().await;
    session_task.await?;
    printer.await?;
    info!("goodbye");
    Ok(())
}

fn load_book(config: &Config) -> anyhow::Result<OpeningBook> {
    let mut book = OpeningBook::builtin();
    if let Some(path) = &config.openings_file {
        let extra = OpeningBook::load_json(path)
            .with_context(|| format!("loading openings from {}", path.display()))?;
        info!(count = extra.len(), "loaded opening book");
        book.extend(extra.all().to_vec())?;
    }
    Ok(book)
}

async fn connect_engine(config: &Config) -> anyhow::Result<Arc<dyn EngineService>> {
    match config.engine {
        EngineKind::Uci => {
            let engine = UciEngineService::spawn(&config.engine_path)
                .await
                .with_context(|| format!("starting engine '{}'", config.engine_path))?;
            engine.new_game().await?;
            info!(name = engine.name(), "engine ready");
            Ok(Arc::new(engine))
        }
        EngineKind::Random => Ok(Arc::new(RandomEngine::new())),
    }
}

/// Runs one command. Returns `Ok(false)` when the player wants to leave.
async fn execute(handle: &SessionHandle, input: Input) -> Result<bool, SessionError> {
    match input {
        Input::Move(mv) => {
            handle.submit_move(mv).await?;
        }
        Input::Hint => handle.request_hint().await?,
        Input::Retry => handle.retry_engine_move().await?,
        Input::Undo => handle.undo_turn().await?,
        Input::Redo => handle.redo_turn().await?,
        Input::Rewind(ply) => handle.rewind_to(ply).await?,
        Input::NewGame(side) => handle.new_game(side).await?,
        Input::Flip => {
            handle.flip_orientation().await?;
        }
        Input::Moves => {
            let session = handle.snapshot().await?;
            println!("{}", render::move_list(&session.ledger.turns()));
        }
        Input::Board => {
            let session = handle.snapshot().await?;
            println!("{}", render::board(&session.position, session.orientation));
        }
        Input::Fen => println!("{}", handle.snapshot().await?.position.to_fen()),
        Input::Help => println!("{HELP}"),
        Input::Quit => return Ok(false),
    }
    Ok(true)
}

/// Prints events until the session stops.
async fn print_events(mut events: EventReceiver, book: OpeningBook, mut human_side: Side) {
    let mut orientation = DisplaySide::facing(human_side);
    while let Some(event) = events.recv().await {
        debug!(kind = event.kind(), "session event");
        println!("{}", render::describe(&event));

        match &event {
            SessionEvent::GameStarted { human_side: side } => {
                // The board only turns when the human changes sides.
                if *side != human_side {
                    orientation = DisplaySide::facing(*side);
                }
                human_side = *side;
            }
            SessionEvent::OrientationChanged { orientation: o } => orientation = *o,
            SessionEvent::MoveApplied { record } => {
                let position = &record.resulting_position;
                for name in book.lookup(position) {
                    println!("Opening: {name}");
                }
                if position.side_to_move() == human_side {
                    println!("{}", render::board(position, orientation));
                }
            }
            _ => {}
        }

        if let Some(bell) = SoundCue::for_event(&event, human_side).and_then(render::bell) {
            print!("{bell}");
            let _ = std::io::stdout().flush();
        }
    }
}
