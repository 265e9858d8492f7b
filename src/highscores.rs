//! Best-score tracking
//!
//! A single integer persisted across sessions. "New high score" is judged
//! against the best as it stood when the current game started.

use crate::persistence::KeyValueStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HighScore {
    best: u64,
    /// Best score when the current game began
    baseline: u64,
}

impl HighScore {
    /// Storage key for the persisted best score
    pub const STORAGE_KEY: &'static str = "__menja__highScore";

    pub fn new(best: u64) -> Self {
        Self {
            best,
            baseline: best,
        }
    }

    pub fn best(&self) -> u64 {
        self.best
    }

    /// Snapshot the current best as the bar to beat this game
    pub fn begin_game(&mut self) {
        self.baseline = self.best;
    }

    pub fn is_new_high_score(&self, score: u64) -> bool {
        score > self.baseline
    }

    /// Record `score` if it beats the best; returns true if it did
    pub fn confirm(&mut self, score: u64) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Load from storage; missing or malformed values read as zero
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(raw) = store.get(Self::STORAGE_KEY) else {
            log::info!("No high score found, starting fresh");
            return Self::default();
        };
        match serde_json::from_str::<u64>(raw.trim()) {
            Ok(best) => {
                log::info!("Loaded high score {best}");
                Self::new(best)
            }
            Err(err) => {
                log::warn!("Ignoring malformed high score {raw:?}: {err}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> bool {
        let saved = match serde_json::to_string(&self.best) {
            Ok(json) => store.set(Self::STORAGE_KEY, &json),
            Err(_) => false,
        };
        if saved {
            log::info!("High score saved ({})", self.best);
        } else {
            log::warn!("Failed to save high score");
        }
        saved
    }
}
