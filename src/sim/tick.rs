//! Clock tick and fire resolution
//!
//! `tick` advances the engine clock and applies everything time-driven:
//! deferred actions coming due, then enemy counter-attack timers against a
//! snapshot of the wave. `fire` applies one weapon strike. Both are free
//! functions over the state so every transition is a single visible
//! snapshot-to-snapshot step.

use crate::consts::{FAIL_COOLDOWN_MS, RESPAWN_DELAY_MS, SCORE_PER_KILL};

use super::combat;
use super::dungeon;
use super::events::GameEvent;
use super::state::{DeferredAction, GameState, Mode};
use super::tutorial::{self, TutorialPhase};

/// Advance the simulation by `elapsed_ms`.
///
/// The clock always moves and due deferred work always runs, even while
/// paused: pending respawns and tutorial advances must still land. Combat
/// time (counter-attack windups) is gated behind the pause conditions.
pub fn tick(state: &mut GameState, elapsed_ms: u32) {
    state.advance_clock(elapsed_ms);
    run_due_actions(state);

    if state.is_game_over
        || state.is_menu_open
        || state.is_timer_paused
        || state.mode == Mode::Title
        || (state.mode == Mode::Tutorial && state.tutorial.phase == TutorialPhase::Complete)
    {
        return;
    }

    // Counter-attacks resolve against the wave as it stood at tick entry;
    // damage is summed and applied once
    let wave_size = state.wave_size;
    let now = state.now_ms();
    let mut attacks: Vec<(u32, i32)> = Vec::new();
    for enemy in &mut state.enemies {
        let outcome = combat::resolve_counter_attack(enemy, elapsed_ms, wave_size);
        enemy.attack_timer = outcome.timer;
        if outcome.attacked {
            enemy.last_attack_at = now;
            attacks.push((enemy.id, outcome.damage));
        }
    }

    if attacks.is_empty() {
        return;
    }
    let mut total = 0i32;
    for (id, damage) in attacks {
        total += damage;
        state.push_event(GameEvent::EnemyAttacked { id, damage });
    }
    apply_player_damage(state, total);
}

fn apply_player_damage(state: &mut GameState, damage: i32) {
    let floor = if state.is_invincible { 1 } else { 0 };
    let hp = (state.player.hp - damage).max(floor);
    state.player.hp = hp;
    state.push_event(GameEvent::PlayerDamaged { hp });

    if hp <= 0 && !state.is_game_over {
        state.is_game_over = true;
        state.cancel_drag();
        state.push_event(GameEvent::GameOver);
        log::info!("Game over at score {}", state.score);
    }
}

/// Execute every scheduled action that has come due. Entries from a
/// previous session are dropped unexecuted, and each action re-validates
/// its guards: the state may have moved on since it was scheduled.
fn run_due_actions(state: &mut GameState) {
    let now = state.now_ms();
    let session = state.session;

    let mut due: Vec<DeferredAction> = Vec::new();
    state.scheduled.retain(|entry| {
        if entry.session != session {
            return false;
        }
        if entry.due_at <= now {
            due.push(entry.action);
            return false;
        }
        true
    });

    for action in due {
        match action {
            DeferredAction::SpawnWave => {
                if !state.is_game_over && state.mode != Mode::Title && state.enemies.is_empty() {
                    state.spawn_wave();
                }
            }
            DeferredAction::DungeonNextWave => {
                if state.mode == Mode::Dungeon && !state.is_game_over {
                    dungeon::next_wave(state);
                }
            }
            DeferredAction::DungeonCleared => {
                if state.mode == Mode::Dungeon && !state.is_game_over {
                    dungeon::finish_dungeon(state);
                }
            }
            DeferredAction::TutorialAdvance(step) => {
                if state.mode == Mode::Tutorial {
                    tutorial::advance_to(state, step);
                }
            }
        }
    }
}

/// Fire the weapon in `slot` at the enemy with `enemy_id`. Returns whether
/// the strike landed.
///
/// A landed strike starts the weapon's full cooldown; a deflected one locks
/// the weapon for the short fail cooldown instead. Firing at an enemy that
/// no longer exists is a no-op with no cooldown: the target died between
/// aim and release.
pub fn fire(state: &mut GameState, enemy_id: u32, slot: usize) -> bool {
    if state.is_game_over || state.is_menu_open {
        return false;
    }
    let Some(weapon) = state.config.weapons.get(slot).cloned() else {
        return false;
    };
    if state.is_weapon_locked(slot) || !state.is_weapon_ready(slot) {
        return false;
    }
    let Some(index) = state.enemies.iter().position(|e| e.id == enemy_id) else {
        return false;
    };

    let outcome = combat::resolve_hit(&state.enemies[index], weapon.damage);
    let now = state.now_ms();
    let ready_at = if outcome.success {
        now + weapon.cooldown_ms
    } else {
        now + FAIL_COOLDOWN_MS
    };
    state.set_cooldown(slot, ready_at);

    if outcome.success {
        if outcome.new_hp <= 0 {
            state.enemies.remove(index);
            state.score += SCORE_PER_KILL;
            state.push_event(GameEvent::EnemyDefeated { id: enemy_id });
            log::debug!("Enemy {enemy_id} defeated by {}", weapon.id);
            if state.enemies.is_empty() {
                state.push_event(GameEvent::WaveCleared);
                on_wave_cleared(state);
            }
        } else {
            let enemy = &mut state.enemies[index];
            enemy.hp = outcome.new_hp;
            enemy.attack_timer = outcome.new_timer;
            state.push_event(GameEvent::EnemyStruck {
                id: enemy_id,
                hp: outcome.new_hp,
            });
        }
    } else {
        state.push_event(GameEvent::StrikeDeflected { id: enemy_id });
    }

    // HP and the enemy set may have changed; re-derive tutorial highlights
    // before its condition sees the outcome
    tutorial::evaluate(state);
    tutorial::on_fire_resolved(state, outcome.success);
    outcome.success
}

fn on_wave_cleared(state: &mut GameState) {
    match state.mode {
        Mode::Normal => state.schedule(RESPAWN_DELAY_MS, DeferredAction::SpawnWave),
        Mode::Dungeon => dungeon::on_wave_cleared(state),
        // Tutorial clears advance through the step script instead
        Mode::Tutorial | Mode::Title => {}
    }
}
