//! Persist the high score to disk (XDG config or ~/.config/stackfall).

use crate::scoring::{HighScoreStore, StoreError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "stackfall";
const FILENAME: &str = "highscore";

/// Default location: $XDG_CONFIG_HOME/stackfall/highscore, else ~/.config/stackfall/highscore.
pub fn default_path() -> Result<PathBuf, StoreError> {
    let base = match std::env::var("XDG_CONFIG_HOME") {
        Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg),
        _ => std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".config"))
            .map_err(|_| StoreError::NoLocation)?,
    };
    Ok(base.join(APP_DIR).join(FILENAME))
}

/// High score kept as a single decimal number in a text file.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    /// Last value read or written, so lookups never hit the disk.
    cached: u32,
}

impl FileStore {
    /// Open the store at `path`; a missing or unreadable file counts as 0.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = read_score(&path);
        Self { path, cached }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn read_score(path: &Path) -> u32 {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.lines().next().and_then(|l| l.trim().parse::<u32>().ok()))
        .unwrap_or(0)
}

impl HighScoreStore for FileStore {
    fn get_high_score(&self) -> u32 {
        self.cached
    }

    /// Creates the parent directory if needed. The new value is written to a
    /// sibling temp file and renamed over the old one.
    fn set_high_score(&mut self, score: u32) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        writeln!(tmp, "{}", score)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        self.cached = score;
        Ok(())
    }
}
