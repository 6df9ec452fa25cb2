//! Dungeon progression
//!
//! Dungeons are fixed wave sequences from the config table, gated by the
//! persisted unlock frontier. Clearing the final wave latches the cleared
//! banner, raises the frontier and (after confirmation) returns the player
//! to the world map.

use crate::consts::{DUNGEON_CLEAR_DELAY_MS, RESPAWN_DELAY_MS};

use super::events::GameEvent;
use super::state::{DeferredAction, GameState, Mode, Scene};

/// Dungeon-mode session state
#[derive(Debug, Clone, Copy, Default)]
pub struct DungeonState {
    /// The dungeon the session is running, if any
    pub selected: Option<u32>,
    /// Index into the selected dungeon's wave table
    pub wave_index: usize,
    pub is_cleared: bool,
    /// The reward popup is showing on the world map, awaiting dismissal
    pub show_reward: bool,
}

/// Enter a dungeon from the world map. Refused for unknown or still-locked
/// dungeon ids.
pub fn select_dungeon(state: &mut GameState, dungeon_id: u32) -> bool {
    if state.config.dungeon(dungeon_id).is_none() {
        log::warn!("Ignoring selection of unknown dungeon {dungeon_id}");
        return false;
    }
    if !state.progress.is_dungeon_unlocked(dungeon_id) {
        log::info!("Dungeon {dungeon_id} is still locked");
        return false;
    }
    state.dungeon.selected = Some(dungeon_id);
    state.dungeon.show_reward = false;
    state.set_mode(Mode::Dungeon);
    state.set_scene(Scene::Game);
    true
}

/// Schedule the follow-up to an emptied dungeon wave: either the next wave
/// after a short beat, or the clear sequence after the final one.
pub(super) fn on_wave_cleared(state: &mut GameState) {
    let Some(dungeon) = state
        .dungeon
        .selected
        .and_then(|id| state.config.dungeon(id))
    else {
        return;
    };

    if state.dungeon.wave_index + 1 < dungeon.waves.len() {
        state.schedule(RESPAWN_DELAY_MS, DeferredAction::DungeonNextWave);
    } else {
        state.schedule(DUNGEON_CLEAR_DELAY_MS, DeferredAction::DungeonCleared);
    }
}

/// Deferred: advance to and spawn the next wave
pub(super) fn next_wave(state: &mut GameState) {
    state.dungeon.wave_index += 1;
    state.spawn_wave();
}

/// Deferred: latch the clear banner
pub(super) fn finish_dungeon(state: &mut GameState) {
    let Some(dungeon_id) = state.dungeon.selected else {
        return;
    };
    state.dungeon.is_cleared = true;
    log::info!("Dungeon {dungeon_id} cleared");
    state.push_event(GameEvent::DungeonCleared { id: dungeon_id });
}

/// Acknowledge the clear banner: raise the unlock frontier, return to the
/// world map and surface the reward popup there. The driver should persist
/// `progress` afterwards.
pub fn confirm_clear(state: &mut GameState) {
    if !state.dungeon.is_cleared {
        return;
    }
    let Some(dungeon_id) = state.dungeon.selected else {
        return;
    };

    let max = state.config.max_dungeon_id();
    if state.progress.unlock_after(dungeon_id, max) {
        log::info!(
            "Unlock frontier raised to {}",
            state.progress.max_unlocked_dungeon
        );
    }
    state.dungeon.show_reward = true;
    state.set_scene(Scene::WorldMap);
}

/// Dismiss the reward popup on the world map
pub fn close_reward(state: &mut GameState) {
    state.dungeon.show_reward = false;
}
