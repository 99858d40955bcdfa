//! Player preferences
//!
//! Persisted separately from the high score in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::platform::storage::{self, StorageError};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Mute everything
    pub muted: bool,
    /// Mute while the tab is hidden
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "neon_runner_settings";

    /// Combined effect volume, 0 when muted
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0) * self.sfx_volume.clamp(0.0, 1.0)
        }
    }

    /// Load settings, falling back to defaults
    pub fn load() -> Self {
        match storage::load_json(Self::STORAGE_KEY) {
            Some(settings) => {
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<(), StorageError> {
        storage::save_json(Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
