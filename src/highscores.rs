//! Persistent high score
//!
//! The game only needs two operations from its store: read the best score
//! and offer a new one. A score replaces the stored best only when it is
//! strictly higher.

use serde::{Deserialize, Serialize};

use crate::platform::storage::{self, StorageError};

/// Storage boundary used by the game facade
pub trait HighScoreStore {
    fn high_score(&self) -> u64;

    /// Store `score` if it beats the current best. Returns whether it did.
    fn set_high_score_if_higher(&mut self, score: u64) -> Result<bool, StorageError>;
}

/// Non-persistent store (native builds, tests)
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScore {
    best: u64,
}

impl MemoryHighScore {
    pub fn new(best: u64) -> Self {
        Self { best }
    }
}

impl HighScoreStore for MemoryHighScore {
    fn high_score(&self) -> u64 {
        self.best
    }

    fn set_high_score_if_higher(&mut self, score: u64) -> Result<bool, StorageError> {
        if score > self.best {
            self.best = score;
            return Ok(true);
        }
        Ok(false)
    }
}

/// Persisted best score
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreRecord {
    pub score: u64,
}

/// LocalStorage-backed store (in-memory natively)
#[derive(Debug, Clone, Default)]
pub struct LocalHighScore {
    record: HighScoreRecord,
}

impl LocalHighScore {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "neon_runner_highscore";

    /// Load the stored best, starting fresh when nothing usable is stored
    pub fn load() -> Self {
        match storage::load_json::<HighScoreRecord>(Self::STORAGE_KEY) {
            Some(record) => {
                log::info!("Loaded high score {}", record.score);
                Self { record }
            }
            None => {
                log::info!("No high score found, starting fresh");
                Self::default()
            }
        }
    }
}

impl HighScoreStore for LocalHighScore {
    fn high_score(&self) -> u64 {
        self.record.score
    }

    fn set_high_score_if_higher(&mut self, score: u64) -> Result<bool, StorageError> {
        if score <= self.record.score {
            return Ok(false);
        }
        self.record.score = score;
        // Keep the in-memory best even if the write fails
        storage::save_json(Self::STORAGE_KEY, &self.record)?;
        log::info!("High score saved ({})", score);
        Ok(true)
    }
}
