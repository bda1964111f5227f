//! Persisted preferences
//!
//! Stored as one entry per preference, so partial corruption only loses
//! that one setting.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, Storage, KEY_MUTED, KEY_VOLUME};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub sound_enabled: bool,
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            volume: 0.5,
        }
    }
}

impl Settings {
    pub fn load(storage: &dyn Storage) -> Self {
        let muted: bool = persistence::load_json(storage, KEY_MUTED, false);
        let volume: f32 = persistence::load_json(storage, KEY_VOLUME, 0.5);
        Self {
            sound_enabled: !muted,
            volume: volume.clamp(0.0, 1.0),
        }
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        persistence::save_json(storage, KEY_MUTED, &!self.sound_enabled);
        persistence::save_json(storage, KEY_VOLUME, &self.volume);
        log::debug!("settings saved (sound={}, volume={})", self.sound_enabled, self.volume);
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_settings_round_trip() {
        let mut storage = MemoryStorage::new();
        let mut settings = Settings::default();
        settings.sound_enabled = false;
        settings.set_volume(0.8);
        settings.save(&mut storage);

        let loaded = Settings::load(&storage);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_volume_clamped_on_load() {
        let mut storage = MemoryStorage::new();
        storage.save(KEY_VOLUME, "9.5");
        assert_eq!(Settings::load(&storage).volume, 1.0);
    }
}
