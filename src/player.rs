//! Active piece: spawn, move, rotate, drop, ghost.

use crate::catalog::{PieceKind, Shape};
use crate::grid::{Grid, Position};
use rand::Rng;

/// Result of one downward step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DropOutcome {
    /// The piece could not move down and was merged into the grid.
    pub locked: bool,
    /// Rows removed by the sweep that followed the lock.
    pub cleared_rows: usize,
}

/// The falling piece. `shape` is the current, possibly rotated, matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub pos: Position,
    pub shape: Shape,
    pub kind: PieceKind,
}

impl Player {
    /// Unrotated `kind` at the top, centred: x = cols/2 - width/2.
    pub fn new(grid: &Grid, kind: PieceKind) -> Self {
        let shape = kind.shape().clone();
        let x = (grid.cols() / 2) as i32 - (shape.width() / 2) as i32;
        Self {
            pos: Position::new(x, 0),
            shape,
            kind,
        }
    }

    /// Uniformly random kind. Does not check for collision.
    pub fn spawn<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Self {
        let kind = PieceKind::ALL[rng.gen_range(0..PieceKind::ALL.len())];
        Self::new(grid, kind)
    }

    #[inline]
    pub fn collides(&self, grid: &Grid) -> bool {
        grid.collides(&self.shape, self.pos)
    }

    /// Shift horizontally by `dx`; unchanged if the target collides.
    pub fn move_by(&mut self, grid: &Grid, dx: i32) -> bool {
        let target = Position::new(self.pos.x + dx, self.pos.y);
        if grid.collides(&self.shape, target) {
            return false;
        }
        self.pos = target;
        true
    }

    /// Quarter turn in place; unchanged if the rotated shape collides here.
    pub fn rotate(&mut self, grid: &Grid) -> bool {
        let rotated = self.shape.rotated();
        if grid.collides(&rotated, self.pos) {
            return false;
        }
        self.shape = rotated;
        true
    }

    /// Move down one row, or lock in place and sweep if that collides.
    pub fn drop(&mut self, grid: &mut Grid) -> DropOutcome {
        let below = Position::new(self.pos.x, self.pos.y + 1);
        if !grid.collides(&self.shape, below) {
            self.pos = below;
            return DropOutcome::default();
        }
        grid.merge(&self.shape, self.pos, self.kind.id());
        DropOutcome {
            locked: true,
            cleared_rows: grid.sweep(),
        }
    }

    /// Where the piece would land if dropped straight down.
    pub fn ghost_position(&self, grid: &Grid) -> Position {
        let mut ghost = self.pos;
        let floor = grid.rows() as i32;
        while ghost.y < floor && !grid.collides(&self.shape, Position::new(ghost.x, ghost.y + 1)) {
            ghost.y += 1;
        }
        ghost
    }
}
