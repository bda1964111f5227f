//! High score leaderboard
//!
//! Top 10 runs, sorted descending by score, persisted as a single JSON
//! entry. The plain "high score" number shown in the menu is the top entry.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage, KEY_LEADERBOARD};

/// Maximum number of entries to keep
pub const MAX_HIGH_SCORES: usize = 10;

/// A single leaderboard entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Distance reached, meters
    pub distance: u64,
    pub max_combo: u32,
}

/// High score leaderboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score qualifies for the leaderboard
    pub fn qualifies(&self, score: u64) -> bool {
        if score == 0 {
            return false;
        }
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Record a run. Returns the rank achieved (1-indexed) or None if it
    /// didn't qualify.
    pub fn add_score(&mut self, score: u64, distance: u64, max_combo: u32) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }
        let entry = HighScoreEntry {
            score,
            distance,
            max_combo,
        };

        let pos = self.entries.iter().position(|e| score > e.score);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn top_score(&self) -> Option<u64> {
        self.entries.first().map(|e| e.score)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn load(storage: &dyn Storage) -> Self {
        let scores: HighScores = persistence::load_json(storage, KEY_LEADERBOARD, HighScores::new());
        if !scores.is_empty() {
            log::info!("loaded {} leaderboard entries", scores.entries.len());
        }
        scores
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        persistence::save_json(storage, KEY_LEADERBOARD, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_never_qualifies() {
        let scores = HighScores::new();
        assert!(!scores.qualifies(0));
        assert!(scores.qualifies(1));
    }

    #[test]
    fn test_ranked_insert_and_truncate() {
        let mut scores = HighScores::new();
        for i in 1..=12u64 {
            scores.add_score(i * 100, i * 10, i as u32);
        }
        assert_eq!(scores.entries.len(), MAX_HIGH_SCORES);
        assert_eq!(scores.top_score(), Some(1200));
        // Lowest surviving entry is 300 (100 and 200 fell off)
        assert_eq!(scores.entries.last().unwrap().score, 300);

        // A mid-table score lands at its rank
        let rank = scores.add_score(650, 65, 6).expect("qualifies");
        assert_eq!(rank, 6);
        assert!(!scores.qualifies(200));
    }

    #[test]
    fn test_persistence_round_trip() {
        use crate::persistence::MemoryStorage;
        let mut storage = MemoryStorage::new();
        let mut scores = HighScores::new();
        scores.add_score(500, 120, 9);
        scores.save(&mut storage);
        assert_eq!(HighScores::load(&storage), scores);
    }
}
