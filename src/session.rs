//! Game loop: one session's grid, active piece, score and gravity timer.

use crate::GameConfig;
use crate::canvas::{Canvas, Layer};
use crate::catalog::{PieceKind, Shape};
use crate::grid::{Grid, Position};
use crate::player::{DropOutcome, Player};
use crate::scoring::{HighScoreStore, MemoryStore, ScoreBoard};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameState {
    Running,
    GameOver,
}

/// Decoded player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    Restart,
}

/// A single game session. The host calls `tick` every frame with the time
/// since the previous one, feeds commands through `apply`, and draws with `draw`.
#[derive(Debug)]
pub struct GameSession<S: HighScoreStore = MemoryStore> {
    grid: Grid,
    player: Player,
    board: ScoreBoard,
    state: GameState,
    drop_interval: Duration,
    /// Time accumulated since the last drop.
    drop_counter: Duration,
    rng: StdRng,
    store: S,
    /// The last game over beat the stored best score.
    new_record: bool,
}

impl<S: HighScoreStore> GameSession<S> {
    pub fn new(config: &GameConfig, store: S) -> Self {
        let grid = Grid::new(config.cols, config.rows);
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let player = Player::spawn(&grid, &mut rng);
        let board = ScoreBoard::new(store.get_high_score());
        let mut session = Self {
            grid,
            player,
            board,
            state: GameState::Running,
            drop_interval: config.drop_interval,
            drop_counter: Duration::ZERO,
            rng,
            store,
            new_record: false,
        };
        info!(
            cols = config.cols,
            rows = config.rows,
            high_score = session.board.high_score,
            "session started"
        );
        if session.player.collides(&session.grid) {
            session.game_over();
        }
        session
    }

    /// Advance gravity by `delta`. At most one drop happens per call, however
    /// large `delta` is. Returns the drop's outcome if one happened.
    pub fn tick(&mut self, delta: Duration) -> Option<DropOutcome> {
        if self.state != GameState::Running {
            return None;
        }
        self.drop_counter = self.drop_counter.saturating_add(delta);
        if self.drop_counter < self.drop_interval {
            return None;
        }
        Some(self.drop())
    }

    /// Apply one command. Returns true if it changed anything.
    /// Only Restart does anything after game over.
    pub fn apply(&mut self, command: Command) -> bool {
        match (self.state, command) {
            (_, Command::Restart) => {
                self.restart();
                true
            }
            (GameState::GameOver, _) => false,
            (GameState::Running, Command::MoveLeft) => self.player.move_by(&self.grid, -1),
            (GameState::Running, Command::MoveRight) => self.player.move_by(&self.grid, 1),
            (GameState::Running, Command::Rotate) => self.player.rotate(&self.grid),
            (GameState::Running, Command::SoftDrop) => {
                self.drop();
                true
            }
        }
    }

    /// Gravity step shared by the timer and soft drop.
    fn drop(&mut self) -> DropOutcome {
        let outcome = self.player.drop(&mut self.grid);
        self.drop_counter = Duration::ZERO;
        if outcome.locked {
            let points = self.board.add_rows(outcome.cleared_rows);
            debug!(
                kind = self.player.kind.name(),
                x = self.player.pos.x,
                y = self.player.pos.y,
                cleared = outcome.cleared_rows,
                points,
                "piece locked"
            );
            self.spawn_next();
        }
        outcome
    }

    fn spawn_next(&mut self) {
        self.player = Player::spawn(&self.grid, &mut self.rng);
        debug!(kind = self.player.kind.name(), x = self.player.pos.x, "spawned");
        if self.player.collides(&self.grid) {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        self.state = GameState::GameOver;
        self.new_record = self.board.record_high_score();
        info!(
            score = self.board.score,
            lines = self.board.lines,
            new_record = self.new_record,
            "game over"
        );
        if self.new_record {
            if let Err(e) = self.store.set_high_score(self.board.high_score) {
                warn!(error = %e, "could not save high score");
            }
        }
    }

    /// Empty grid, zero score, fresh piece.
    pub fn restart(&mut self) {
        self.grid.reset();
        self.board.reset();
        self.drop_counter = Duration::ZERO;
        self.new_record = false;
        self.state = GameState::Running;
        info!("restart");
        self.spawn_next();
    }

    /// Issue this frame's cells: the grid, then (while running) the ghost and
    /// the active piece.
    pub fn draw<C: Canvas + ?Sized>(&self, canvas: &mut C) {
        for (y, row) in self.grid.iter_rows().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                if let Some(kind) = PieceKind::from_id(value) {
                    canvas.fill_cell(x, y, kind, Layer::Locked);
                }
            }
        }
        if self.state != GameState::Running {
            return;
        }
        let kind = self.player.kind;
        let ghost = self.player.ghost_position(&self.grid);
        draw_shape(canvas, &self.player.shape, ghost, kind, Layer::Ghost);
        draw_shape(canvas, &self.player.shape, self.player.pos, kind, Layer::Active);
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ghost_position(&self) -> Position {
        self.player.ghost_position(&self.grid)
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.board.score
    }

    pub fn high_score(&self) -> u32 {
        self.board.high_score
    }

    pub fn lines(&self) -> u32 {
        self.board.lines
    }

    pub fn new_record(&self) -> bool {
        self.new_record
    }

    pub fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn draw_shape<C: Canvas + ?Sized>(
    canvas: &mut C,
    shape: &Shape,
    pos: Position,
    kind: PieceKind,
    layer: Layer,
) {
    for (x, y) in shape.filled() {
        let gx = pos.x + x as i32;
        let gy = pos.y + y as i32;
        if gx >= 0 && gy >= 0 {
            canvas.fill_cell(gx as usize, gy as usize, kind, layer);
        }
    }
}
