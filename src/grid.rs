//! Grid: locked cells, collision test, merge and row sweep.

use crate::catalog::Shape;
use std::collections::VecDeque;

pub const DEFAULT_COLS: usize = 12;
pub const DEFAULT_ROWS: usize = 20;

/// Empty cell value; 1..=11 are piece ids.
pub const EMPTY: u8 = 0;

/// Offset of a shape's top-left corner within the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Locked cells. y = 0 is the top row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    /// rows[y][x]; every row holds exactly `cols` cells.
    rows: VecDeque<Vec<u8>>,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows: (0..rows).map(|_| vec![EMPTY; cols]).collect(),
        }
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, x: usize, y: usize, value: u8) {
        if let Some(cell) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = value;
        }
    }

    /// Iterate rows top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn reset(&mut self) {
        for row in &mut self.rows {
            row.fill(EMPTY);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.iter().all(|&c| c == EMPTY))
    }

    /// Grid coordinates of a filled shape cell at `pos`, or None if off the grid.
    fn target(&self, pos: Position, x: usize, y: usize) -> Option<(usize, usize)> {
        let gx = pos.x + x as i32;
        let gy = pos.y + y as i32;
        if gx < 0 || gy < 0 || gx as usize >= self.cols || gy as usize >= self.rows() {
            return None;
        }
        Some((gx as usize, gy as usize))
    }

    /// True if any filled cell of `shape` at `pos` lies outside the grid
    /// (either axis) or on an occupied cell.
    pub fn collides(&self, shape: &Shape, pos: Position) -> bool {
        shape.filled().any(|(x, y)| match self.target(pos, x, y) {
            Some((gx, gy)) => self.rows[gy][gx] != EMPTY,
            None => true,
        })
    }

    /// Write `value` into every filled cell of `shape` at `pos`.
    /// Callers check `collides` first; cells off the grid are skipped.
    pub fn merge(&mut self, shape: &Shape, pos: Position, value: u8) {
        debug_assert!(!self.collides(shape, pos), "merge while colliding");
        for (x, y) in shape.filled() {
            if let Some((gx, gy)) = self.target(pos, x, y) {
                self.rows[gy][gx] = value;
            }
        }
    }

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(|&c| c != EMPTY))
    }

    /// Remove full rows, bottom to top, inserting a blank row at the top for
    /// each. The same index is checked again after a removal since the row
    /// above has shifted into it. Returns how many rows were cleared.
    pub fn sweep(&mut self) -> usize {
        let mut cleared = 0;
        let mut y = self.rows.len();
        while y > 0 {
            if self.is_row_full(y - 1) {
                if let Some(mut row) = self.rows.remove(y - 1) {
                    row.fill(EMPTY);
                    self.rows.push_front(row);
                    cleared += 1;
                }
                continue;
            }
            y -= 1;
        }
        cleared
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_COLS, DEFAULT_ROWS)
    }
}
