//! Stackfall: falling-block puzzle engine.
//!
//! A [`GameSession`] owns the grid, the falling piece and the score. The host
//! drives it with [`GameSession::tick`] and [`GameSession::apply`], draws it
//! through a [`Canvas`], and persists the best score through a
//! [`HighScoreStore`].

pub mod canvas;
pub mod catalog;
pub mod grid;
pub mod highscores;
pub mod player;
pub mod scoring;
pub mod session;

pub use canvas::{Canvas, Layer};
pub use catalog::{PieceKind, Shape};
pub use grid::{Grid, Position};
pub use player::{DropOutcome, Player};
pub use scoring::{HighScoreStore, MemoryStore, ScoreBoard, StoreError, award};
pub use session::{Command, GameSession, GameState};

use std::time::Duration;

/// Smallest playfield that still fits the 4-wide I piece.
pub const MIN_COLS: usize = 4;
pub const MIN_ROWS: usize = 4;

/// Options that shape a session (size, gravity, randomness).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameConfig {
    pub cols: usize,
    pub rows: usize,
    pub drop_interval: Duration,
    /// Fixed seed for piece selection; random when None.
    pub seed: Option<u64>,
}

impl GameConfig {
    /// Clamp the playfield so every catalog piece can spawn.
    pub fn clamped(mut self) -> Self {
        self.cols = self.cols.max(MIN_COLS);
        self.rows = self.rows.max(MIN_ROWS);
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cols: grid::DEFAULT_COLS,
            rows: grid::DEFAULT_ROWS,
            drop_interval: Duration::from_millis(1000),
            seed: None,
        }
    }
}
