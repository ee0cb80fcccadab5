//! Drives the service against a scripted shell engine and, when available,
//! a real Stockfish binary.

use std::path::PathBuf;
use std::time::Duration;

use chess_engine_service::{EngineError, UciEngineService};
use chess_session::{BoardMove, EngineService, ServiceError};
use tempfile::TempDir;

const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// A minimal UCI engine in POSIX sh. `go` waits `delay` seconds before
/// answering with `reply`.
fn fake_engine(dir: &TempDir, reply: &str, delay: &str) -> PathBuf {
    let script = format!(
        r#"while read -r line; do
  case "$line" in
    uci) echo "id name Fake Engine"; echo "option name Hash type spin default 16 min 1 max 64"; echo uciok ;;
    isready) echo readyok ;;
    go*) sleep {delay}; echo "info depth 1 score cp 12 pv {reply}"; echo "bestmove {reply}" ;;
    quit) exit 0 ;;
  esac
done
"#
    );
    let path = dir.path().join("engine.sh");
    std::fs::write(&path, script).unwrap();
    path
}

async fn spawn_fake(dir: &TempDir, reply: &str, delay: &str) -> UciEngineService {
    let script = fake_engine(dir, reply, delay);
    UciEngineService::spawn_with_args("sh", [script])
        .await
        .expect("fake engine starts")
}

#[tokio::test]
async fn handshake_reads_engine_name() {
    let dir = TempDir::new().unwrap();
    let engine = spawn_fake(&dir, "e2e4", "0").await;
    assert_eq!(engine.name(), "Fake Engine");
    engine.quit().await;
}

#[tokio::test]
async fn suggests_the_engine_best_move() {
    let dir = TempDir::new().unwrap();
    let engine = spawn_fake(&dir, "e2e4", "0").await;
    let mv = engine.suggest_move(START_FEN, 1).await.unwrap();
    assert_eq!(mv, "e2e4".parse::<BoardMove>().unwrap());

    // Searches can be repeated on the same process.
    let again = engine.best_move(START_FEN, 1).await.unwrap();
    assert_eq!(again.as_deref(), Some("e2e4"));
    engine.quit().await;
}

#[tokio::test]
async fn no_move_is_reported_as_no_move() {
    let dir = TempDir::new().unwrap();
    let engine = spawn_fake(&dir, "(none)", "0").await;
    assert_eq!(
        engine.suggest_move(START_FEN, 1).await,
        Err(ServiceError::NoMove)
    );
    engine.quit().await;
}

#[tokio::test]
async fn garbage_move_is_an_invalid_response() {
    let dir = TempDir::new().unwrap();
    let engine = spawn_fake(&dir, "zz99", "0").await;
    assert!(matches!(
        engine.suggest_move(START_FEN, 1).await,
        Err(ServiceError::InvalidResponse(_))
    ));
    engine.quit().await;
}

#[tokio::test]
async fn cancelled_search_does_not_leak_into_the_next() {
    let dir = TempDir::new().unwrap();
    let engine = std::sync::Arc::new(spawn_fake(&dir, "g1f3", "0.3").await);

    let slow = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.best_move(START_FEN, 1).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    slow.abort();
    assert!(slow.await.unwrap_err().is_cancelled());

    let next = tokio::time::timeout(Duration::from_secs(5), engine.best_move(START_FEN, 1))
        .await
        .expect("engine recovers")
        .unwrap();
    assert_eq!(next.as_deref(), Some("g1f3"));
}

#[tokio::test]
async fn missing_binary_is_not_found() {
    let result = UciEngineService::spawn("/nonexistent/path/to/engine").await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn engine_that_exits_fails_the_handshake() {
    let result = UciEngineService::spawn_with_args("sh", ["-c", "exit 0"]).await;
    // Depending on timing the write of `uci` or the read of its answer fails.
    assert!(matches!(
        result,
        Err(EngineError::Closed) | Err(EngineError::SpawnError(_))
    ));
}

#[tokio::test]
#[ignore = "requires Stockfish"]
async fn stockfish_plays_a_legal_move() {
    use chess_session::{RulesEngine, StandardRules};

    let engine = UciEngineService::spawn("stockfish").await.unwrap();
    engine.new_game().await.unwrap();
    let mv = engine.suggest_move(START_FEN, 1).await.unwrap();
    let rules = StandardRules;
    assert!(rules.is_legal(&rules.initial_position(), mv));
    engine.quit().await;
}
