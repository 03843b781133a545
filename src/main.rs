//! Stackfall: falling-block puzzle game in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::{Parser, ValueEnum};
use stackfall::highscores::{self, FileStore};
use stackfall::{GameConfig, HighScoreStore, MemoryStore};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.log_level)?;

    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "theme not loaded, using defaults");
        let mut t = theme::Theme::default();
        t.apply_palette(args.palette);
        t
    });
    let config = GameConfig {
        cols: args.width,
        rows: args.height,
        drop_interval: Duration::from_millis(args.drop_interval_ms.max(1)),
        seed: args.seed,
    }
    .clamped();
    let store = open_store(args.high_score_file.clone());
    tracing::info!(?config, "starting");

    let mut app = App::new(&config, store, theme, args.frame_rate, args.no_animation)?;
    app.run()?;
    Ok(())
}

/// Install a file logger when asked; stdout belongs to the game screen.
fn init_logging(path: Option<&Path>, level: LogLevel) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(std::sync::Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::from(level))
        .init();
    Ok(())
}

/// File store at the given or default path; in-memory if there is no home directory.
fn open_store(path: Option<PathBuf>) -> Box<dyn HighScoreStore> {
    match path.map_or_else(highscores::default_path, Ok) {
        Ok(path) => {
            tracing::debug!(path = %path.display(), "high score file");
            Box::new(FileStore::open(path))
        }
        Err(e) => {
            tracing::warn!(error = %e, "high score will not persist");
            Box::new(MemoryStore::default())
        }
    }
}

/// Falling-block puzzle game in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "stackfall",
    version,
    about = "Falling-block puzzle in the terminal. Fill rows to clear them; the game ends when a new piece has no room.",
    long_about = "Stackfall is a terminal falling-block puzzle.\n\n\
        Steer the falling piece, complete horizontal rows to clear them. Clearing several rows \
        with one piece doubles the reward for each extra row (10, 30, 70, 150).\n\n\
        CONTROLS:\n  Left/h  Move left    Right/l  Move right   Up/k/x  Rotate\n  Down/j  Soft drop    \
        R        Restart      P       Pause     Q / Esc  Quit"
)]
pub struct Args {
    /// Playfield width in columns.
    #[arg(long, default_value = "12", value_name = "COLS")]
    pub width: usize,

    /// Playfield height in rows.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub height: usize,

    /// Time between gravity steps in milliseconds.
    #[arg(long, default_value = "1000", value_name = "MS")]
    pub drop_interval_ms: u64,

    /// Seed for piece selection (same seed, same pieces).
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Path to theme file (btop-style theme[key]="value"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Piece palette: normal (catalog colours), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the game-over fade.
    #[arg(long)]
    pub no_animation: bool,

    /// Where to keep the high score. Defaults to the XDG config directory.
    #[arg(long, value_name = "FILE")]
    pub high_score_file: Option<PathBuf>,

    /// Write logs to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log verbosity when --log-file is set.
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_classic_board() {
        let args = Args::parse_from(["stackfall"]);
        assert_eq!((args.width, args.height), (12, 20));
        assert_eq!(args.drop_interval_ms, 1000);
        assert_eq!(args.palette, Palette::Normal);
        assert_eq!(args.log_level, LogLevel::Info);
        assert!(args.seed.is_none());
    }

    #[test]
    fn palette_aliases_parse() {
        let args = Args::parse_from(["stackfall", "--palette", "colourblind", "--seed", "9"]);
        assert_eq!(args.palette, Palette::Colorblind);
        assert_eq!(args.seed, Some(9));
    }

    #[test]
    fn explicit_store_path_is_used() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hs");
        std::fs::write(&path, "77\n").unwrap();
        assert_eq!(open_store(Some(path)).get_high_score(), 77);
    }
}
