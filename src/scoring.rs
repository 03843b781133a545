//! Line-clear scoring and the high-score store contract.

use thiserror::Error;

/// Points for the first row of a sweep; each further row is worth double the previous.
pub const LINE_BASE: u32 = 10;

/// Points for `cleared_rows` rows removed by a single sweep.
///
/// The multiplier starts at 1 for every sweep and doubles after each row:
/// 1 row = 10, 2 = 10 + 20, 3 = 10 + 20 + 40, 4 = 10 + 20 + 40 + 80.
pub fn award(cleared_rows: usize) -> u32 {
    let mut multiplier = 1u32;
    let mut delta = 0u32;
    for _ in 0..cleared_rows {
        delta = delta.saturating_add(multiplier.saturating_mul(LINE_BASE));
        multiplier = multiplier.saturating_mul(2);
    }
    delta
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("no location for the high score file")]
    NoLocation,
}

/// Key-value persistence for the best score across sessions.
pub trait HighScoreStore {
    /// Stored best score, 0 if nothing was saved yet.
    fn get_high_score(&self) -> u32;
    fn set_high_score(&mut self, score: u32) -> Result<(), StoreError>;
}

/// In-process store; nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<u32>,
}

impl MemoryStore {
    pub fn with_value(value: u32) -> Self {
        Self { value: Some(value) }
    }
}

impl HighScoreStore for MemoryStore {
    fn get_high_score(&self) -> u32 {
        self.value.unwrap_or(0)
    }

    fn set_high_score(&mut self, score: u32) -> Result<(), StoreError> {
        self.value = Some(score);
        Ok(())
    }
}

impl<S: HighScoreStore + ?Sized> HighScoreStore for Box<S> {
    fn get_high_score(&self) -> u32 {
        (**self).get_high_score()
    }

    fn set_high_score(&mut self, score: u32) -> Result<(), StoreError> {
        (**self).set_high_score(score)
    }
}

/// Session score plus the best score loaded from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreBoard {
    pub score: u32,
    pub high_score: u32,
    /// Rows cleared this session.
    pub lines: u32,
}

impl ScoreBoard {
    pub fn new(high_score: u32) -> Self {
        Self {
            high_score,
            ..Self::default()
        }
    }

    /// Apply one sweep's result. Returns the points added.
    pub fn add_rows(&mut self, cleared_rows: usize) -> u32 {
        let delta = award(cleared_rows);
        self.score = self.score.saturating_add(delta);
        self.lines = self.lines.saturating_add(cleared_rows as u32);
        delta
    }

    /// Raise the best score if this session beat it. Returns true when it did.
    pub fn record_high_score(&mut self) -> bool {
        if self.score > self.high_score {
            self.high_score = self.score;
            return true;
        }
        false
    }

    /// New session; the best score is kept.
    pub fn reset(&mut self) {
        self.score = 0;
        self.lines = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn award_doubles_per_row() {
        assert_eq!(award(0), 0);
        assert_eq!(award(1), 10);
        assert_eq!(award(2), 30);
        assert_eq!(award(3), 70);
        assert_eq!(award(4), 150);
    }

    #[test]
    fn award_restarts_the_multiplier_each_sweep() {
        let mut board = ScoreBoard::default();
        board.add_rows(2);
        board.add_rows(2);
        assert_eq!(board.score, 60);
        assert_eq!(board.lines, 4);
    }

    #[test]
    fn award_saturates_on_absurd_counts() {
        assert_eq!(award(64), u32::MAX);
    }

    #[test]
    fn high_score_only_moves_up() {
        let mut board = ScoreBoard::new(50);
        board.add_rows(1);
        assert!(!board.record_high_score());
        assert_eq!(board.high_score, 50);
        board.add_rows(4);
        assert!(board.record_high_score());
        assert_eq!(board.high_score, 160);
        board.reset();
        assert_eq!((board.score, board.lines, board.high_score), (0, 0, 160));
    }

    #[test]
    fn memory_store_defaults_to_zero() {
        let mut store = MemoryStore::default();
        assert_eq!(store.get_high_score(), 0);
        store.set_high_score(42).unwrap();
        assert_eq!(store.get_high_score(), 42);
    }
}
