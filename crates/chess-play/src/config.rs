//! Configuration file loading for the terminal player.
//!
//! Settings are merged in increasing priority: built-in defaults, the TOML
//! file (`chess-play.toml` unless `--config` says otherwise), then
//! command-line flags.

use std::path::{Path, PathBuf};

use chess_session::{SessionConfig, Side};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading or validating configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    /// A setting has a value the session cannot use.
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Which engine plays against the human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// A UCI engine subprocess.
    #[default]
    Uci,
    /// Uniformly random legal moves, no subprocess.
    Random,
}

/// The side the human plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlayerSide {
    #[default]
    White,
    Black,
}

impl From<PlayerSide> for Side {
    fn from(side: PlayerSide) -> Self {
        match side {
            PlayerSide::White => Side::White,
            PlayerSide::Black => Side::Black,
        }
    }
}

/// Player configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Path to the UCI engine executable. Defaults to "stockfish" in PATH.
    pub engine_path: String,
    pub engine: EngineKind,
    /// Search depth for engine moves and hints.
    pub depth: u32,
    pub human_side: PlayerSide,
    /// Ask for a hint whenever it is the human's move.
    pub auto_hint: bool,
    /// Start position in FEN; the standard start when absent.
    pub start_fen: Option<String>,
    /// JSON opening book added to the built-in openings.
    pub openings_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            engine_path: "stockfish".to_string(),
            engine: EngineKind::default(),
            depth: 1,
            human_side: PlayerSide::default(),
            auto_hint: true,
            start_fen: None,
            openings_file: None,
        }
    }
}

/// Command-line flags that override the config file.
#[derive(Debug, Default, clap::Args)]
pub struct Overrides {
    /// Path to the UCI engine executable
    #[arg(long)]
    pub engine_path: Option<String>,

    /// Engine to play against
    #[arg(long, value_enum)]
    pub engine: Option<EngineKind>,

    /// Search depth for engine moves and hints
    #[arg(long)]
    pub depth: Option<u32>,

    /// Side you play
    #[arg(long, value_enum)]
    pub side: Option<PlayerSide>,

    /// Do not ask for a hint on every move
    #[arg(long)]
    pub no_hint: bool,

    /// Start position in FEN
    #[arg(long)]
    pub fen: Option<String>,

    /// JSON opening book to add to the built-in openings
    #[arg(long)]
    pub openings: Option<PathBuf>,
}

impl Config {
    /// Default config file name, looked up in the working directory.
    pub const DEFAULT_PATH: &'static str = "chess-play.toml";

    /// Loads the configuration from `path`.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ReadError`] if the file exists but cannot be read,
    /// or [`ConfigError::ParseError`] if the file contains invalid TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Applies command-line flags on top of this configuration.
    #[must_use]
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(path) = &overrides.engine_path {
            self.engine_path = path.clone();
        }
        if let Some(engine) = overrides.engine {
            self.engine = engine;
        }
        if let Some(depth) = overrides.depth {
            self.depth = depth;
        }
        if let Some(side) = overrides.side {
            self.human_side = side;
        }
        if overrides.no_hint {
            self.auto_hint = false;
        }
        if let Some(fen) = &overrides.fen {
            self.start_fen = Some(fen.clone());
        }
        if let Some(path) = &overrides.openings {
            self.openings_file = Some(path.clone());
        }
        self
    }

    /// Checks settings the session would otherwise reject later.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.depth == 0 {
            return Err(ConfigError::Invalid("depth must be at least 1".to_string()));
        }
        if self.engine == EngineKind::Uci && self.engine_path.trim().is_empty() {
            return Err(ConfigError::Invalid("engine_path is empty".to_string()));
        }
        Ok(())
    }

    /// The session settings this configuration describes.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            human_side: self.human_side.into(),
            depth: self.depth,
            auto_hint: self.auto_hint,
            start_fen: self.start_fen.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let config = Config::from_toml_str(
            r#"
engine_path = "/usr/games/stockfish"
engine = "uci"
depth = 8
human_side = "black"
auto_hint = false
start_fen = "8/8/8/8/8/8/8/K6k w - - 0 1"
openings_file = "openings.json"
"#,
        )
        .unwrap();

        assert_eq!(config.engine_path, "/usr/games/stockfish");
        assert_eq!(config.engine, EngineKind::Uci);
        assert_eq!(config.depth, 8);
        assert_eq!(config.human_side, PlayerSide::Black);
        assert!(!config.auto_hint);
        assert_eq!(
            config.start_fen.as_deref(),
            Some("8/8/8/8/8/8/8/K6k w - - 0 1")
        );
        assert_eq!(config.openings_file, Some(PathBuf::from("openings.json")));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml_str("engine = \"random\"\n").unwrap();
        assert_eq!(config.engine, EngineKind::Random);
        assert_eq!(config.engine_path, "stockfish");
        assert_eq!(config.depth, 1);
        assert_eq!(config.human_side, PlayerSide::White);
        assert!(config.auto_hint);
    }

    #[test]
    fn test_invalid_values_fail_to_parse() {
        assert!(matches!(
            Config::from_toml_str("engine = \"lc0\""),
            Err(ConfigError::ParseError(_))
        ));
        assert!(matches!(
            Config::from_toml_str("depth = \"deep\""),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let config = Config::load(Path::new("/nonexistent/chess-play.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "depth = 3").unwrap();
        writeln!(file, "human_side = \"black\"").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.depth, 3);
        assert_eq!(config.human_side, PlayerSide::Black);
    }

    #[test]
    fn test_overrides_win() {
        let file = Config::from_toml_str("depth = 3\nauto_hint = true\n").unwrap();
        let overrides = Overrides {
            engine: Some(EngineKind::Random),
            depth: Some(5),
            side: Some(PlayerSide::Black),
            no_hint: true,
            ..Overrides::default()
        };

        let config = file.with_overrides(&overrides);
        assert_eq!(config.engine, EngineKind::Random);
        assert_eq!(config.depth, 5);
        assert_eq!(config.human_side, PlayerSide::Black);
        assert!(!config.auto_hint);
        // Untouched keys keep the file's values.
        assert_eq!(config.engine_path, "stockfish");
    }

    #[test]
    fn test_validate() {
        assert!(Config::default().validate().is_ok());
        let zero = Config {
            depth: 0,
            ..Config::default()
        };
        assert!(matches!(zero.validate(), Err(ConfigError::Invalid(_))));
        let no_path = Config {
            engine_path: String::new(),
            ..Config::default()
        };
        assert!(no_path.validate().is_err());
        let random = Config {
            engine: EngineKind::Random,
            ..no_path
        };
        assert!(random.validate().is_ok());
    }

    #[test]
    fn test_session_config() {
        let config = Config {
            human_side: PlayerSide::Black,
            depth: 4,
            auto_hint: false,
            ..Config::default()
        };
        let session = config.session_config();
        assert_eq!(session.human_side, Side::Black);
        assert_eq!(session.depth, 4);
        assert!(!session.auto_hint);
        assert_eq!(session.start_fen, None);
    }
}
