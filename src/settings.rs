//! Runtime preferences
//!
//! Stored as JSON next to the working directory. Missing or broken files fall
//! back to defaults so a bad edit never stops the game from starting.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::sim::Topology;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding the four quadrant maps
    pub maps_dir: PathBuf,

    // === Visual Effects ===
    /// Camera shake on hard wall impacts
    pub screen_shake: bool,

    // === Debug ===
    /// Let the grant-key input hand the player a key
    pub debug_keys: bool,
    /// Ticks to simulate when running without a window
    pub headless_ticks: u64,

    // === Accessibility ===
    /// Reduced motion (disables shake)
    pub reduced_motion: bool,

    /// Map seam suppression flags per quadrant
    pub topology: Topology,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            maps_dir: PathBuf::from("data/map"),
            screen_shake: true,
            debug_keys: false,
            headless_ticks: 600,
            reduced_motion: false,
            topology: Topology::default(),
        }
    }
}

impl Settings {
    /// Settings file name
    pub const FILE_NAME: &'static str = "clockwise.json";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Load settings from the working directory
    pub fn load() -> Self {
        Self::load_from(Self::FILE_NAME)
    }

    /// Load settings from `path`, using defaults on any failure
    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) => {
                log::info!("Using default settings ({}: {err})", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Ignoring invalid settings in {}: {err}", path.display());
                Self::default()
            }
        }
    }

    /// Save settings to `path`, logging any failure
    pub fn save_to(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match serde_json::to_string_pretty(self) {
            Ok(json) => match std::fs::write(path, json) {
                Ok(()) => log::info!("Settings saved"),
                Err(err) => log::warn!("Could not write {}: {err}", path.display()),
            },
            Err(err) => log::warn!("Could not serialize settings: {err}"),
        }
    }
}
