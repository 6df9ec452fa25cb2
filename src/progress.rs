//! Persisted player progress
//!
//! Exactly two fields survive a process restart: the tutorial-completed flag
//! and the dungeon unlock frontier. Everything else in the engine is session
//! state and is rebuilt by `restart()`. This module is the serialization
//! boundary for that whitelist; the simulation never touches the filesystem
//! itself, the driver decides when to `load`/`save`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// The lowest dungeon id; a fresh profile has only this one unlocked
pub const FIRST_DUNGEON_ID: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub tutorial_completed: bool,
    #[serde(default = "first_dungeon")]
    pub max_unlocked_dungeon: u32,
}

fn first_dungeon() -> u32 {
    FIRST_DUNGEON_ID
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            tutorial_completed: false,
            max_unlocked_dungeon: FIRST_DUNGEON_ID,
        }
    }
}

impl Progress {
    /// Raise the unlock frontier after clearing `dungeon_id`. Monotonic and
    /// capped: clearing an already-cleared dungeon never lowers it, and the
    /// frontier never passes the last dungeon in the table.
    ///
    /// Returns true if the frontier moved.
    pub fn unlock_after(&mut self, dungeon_id: u32, max_dungeon_id: u32) -> bool {
        if dungeon_id >= self.max_unlocked_dungeon && self.max_unlocked_dungeon < max_dungeon_id {
            self.max_unlocked_dungeon = (dungeon_id + 1).min(max_dungeon_id);
            true
        } else {
            false
        }
    }

    pub fn is_dungeon_unlocked(&self, dungeon_id: u32) -> bool {
        dungeon_id <= self.max_unlocked_dungeon
    }

    /// Progress file location in the platform data directory
    fn file_path() -> Option<PathBuf> {
        dirs::data_dir().map(|d| d.join("divide-strike").join("progress.json"))
    }

    /// Load saved progress, falling back to defaults on any failure
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            log::warn!("No data directory available, using default progress");
            return Self::default();
        };

        if !path.exists() {
            log::info!("No progress file at {:?}, starting fresh", path);
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(progress) => {
                    log::info!("Loaded progress from {:?}", path);
                    progress
                }
                Err(e) => {
                    log::error!("Corrupt progress file ({e}), using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                log::error!("Failed to read progress file ({e}), using defaults");
                Self::default()
            }
        }
    }

    /// Save progress to the platform data directory
    pub fn save(&self) {
        let Some(path) = Self::file_path() else {
            log::error!("No data directory available, progress not saved");
            return;
        };

        if let Some(parent) = path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            log::error!("Failed to create progress directory: {e}");
            return;
        }

        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    log::error!("Failed to write progress file: {e}");
                } else {
                    log::info!("Progress saved to {:?}", path);
                }
            }
            Err(e) => log::error!("Failed to serialize progress: {e}"),
        }
    }
}
