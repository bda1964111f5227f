//! Persistence seam
//!
//! String key/value storage owned by the host (browser LocalStorage, a save
//! file, or memory). Everything here is best-effort: a failed save or a
//! corrupt value is logged and replaced by defaults, never surfaced to
//! gameplay.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::sim::player::Character;

/// Host-implemented key/value store
pub trait Storage {
    fn load(&self, key: &str) -> Option<String>;
    /// Returns false when the write was rejected (quota, IO error)
    fn save(&mut self, key: &str, value: &str) -> bool;
}

/// In-memory storage for tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryStorage {
    map: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    fn save(&mut self, key: &str, value: &str) -> bool {
        self.map.insert(key.to_string(), value.to_string());
        true
    }
}

/// Deserialize `key`, falling back to `default` on absence or corruption
pub fn load_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str, default: T) -> T {
    match storage.load(key) {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("corrupt save entry {key:?}, using default: {err}");
                default
            }
        },
        None => default,
    }
}

/// Serialize and store `value`; failures are logged and swallowed
pub fn save_json<T: Serialize>(storage: &mut dyn Storage, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => {
            if !storage.save(key, &raw) {
                log::warn!("save rejected for {key:?}");
            }
        }
        Err(err) => log::warn!("serialize failed for {key:?}: {err}"),
    }
}

/// Storage keys
pub const KEY_HIGH_SCORE: &str = "highScore";
pub const KEY_MUTED: &str = "game_muted";
pub const KEY_VOLUME: &str = "game_volume";
pub const KEY_PROGRESS: &str = "game_progress";
pub const KEY_LEADERBOARD: &str = "leaderboard";

/// Cross-run progression, persisted under `game_progress`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub total_scrolls: u64,
    pub unlocked: Vec<Character>,
    pub total_games: u64,
    pub total_distance: f64,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            total_scrolls: 0,
            unlocked: vec![Character::Akira],
            total_games: 0,
            total_distance: 0.0,
        }
    }
}

impl Progress {
    pub fn is_unlocked(&self, character: Character) -> bool {
        self.unlocked.contains(&character)
    }

    /// Returns true when the character was newly unlocked
    pub fn unlock(&mut self, character: Character) -> bool {
        if self.is_unlocked(character) {
            return false;
        }
        self.unlocked.push(character);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let mut storage = MemoryStorage::new();
        let mut progress = Progress::default();
        progress.total_scrolls = 120;
        progress.unlock(Character::Ryu);
        save_json(&mut storage, KEY_PROGRESS, &progress);

        let loaded: Progress = load_json(&storage, KEY_PROGRESS, Progress::default());
        assert_eq!(loaded, progress);
        assert!(loaded.is_unlocked(Character::Ryu));
        assert!(!loaded.is_unlocked(Character::Kenji));
    }

    #[test]
    fn test_corrupt_entry_falls_back() {
        let mut storage = MemoryStorage::new();
        storage.save(KEY_PROGRESS, "{not json");
        let loaded: Progress = load_json(&storage, KEY_PROGRESS, Progress::default());
        assert_eq!(loaded, Progress::default());
    }

    #[test]
    fn test_missing_entry_falls_back() {
        let storage = MemoryStorage::new();
        let value: u64 = load_json(&storage, KEY_HIGH_SCORE, 7);
        assert_eq!(value, 7);
    }

    #[test]
    fn test_unlock_is_idempotent() {
        let mut progress = Progress::default();
        assert!(progress.unlock(Character::Hana));
        assert!(!progress.unlock(Character::Hana));
        assert_eq!(progress.unlocked.len(), 2);
    }
}
