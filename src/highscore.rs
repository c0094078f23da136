//! Persist the high score: one decimal integer in a named file.

use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoreStoreError {
    #[error("write high score: {0}")]
    Io(#[from] std::io::Error),
}

/// File-backed high score store. The file is opened, read/written, and
/// closed within the scope of each call; no handle outlives a turn.
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    path: PathBuf,
}

impl HighScoreStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Read the stored high score. A missing file or unparsable contents
    /// degrade to 0; nothing is surfaced to the player.
    pub fn load(&self) -> u32 {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Overwrite the stored high score.
    pub fn save(&self, score: u32) -> Result<(), ScoreStoreError> {
        fs::write(&self.path, score.to_string())?;
        Ok(())
    }
}
