//! Headless demo driver
//!
//! Stands in for a UI layer: drives the simulation at the expected tick
//! cadence, maps a simple bot policy onto the drag-to-fire input surface,
//! and logs the drained event stream. Progress is loaded at startup and
//! saved at exit, same as an interactive frontend would.

use glam::Vec2;

use divide_strike::consts::TICK_INTERVAL_MS;
use divide_strike::sim::{tick, AimPoint, GameEvent, Mode, Scene};
use divide_strike::{GameConfig, GameState, Progress};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let progress = Progress::load();
    let mut state = GameState::new(GameConfig::default(), progress, 0x1D1D);

    state.set_mode(Mode::Normal);
    state.set_scene(Scene::Game);

    // Sixty simulated seconds
    let ticks = 60_000 / TICK_INTERVAL_MS;
    for _ in 0..ticks {
        tick(&mut state, TICK_INTERVAL_MS);
        if state.is_game_over {
            break;
        }
        act(&mut state);
        report(&mut state);
    }

    log::info!(
        "Session ended: score {}, player HP {}/{}",
        state.score,
        state.player.hp,
        state.player.max_hp
    );
    state.progress.save();
}

/// Fire the largest landing divisor at the first enemy, through the same
/// drag gesture surface a pointer would use
fn act(state: &mut GameState) {
    let Some(enemy) = state.enemies.first() else {
        return;
    };
    let (target_id, hp) = (enemy.id, enemy.hp);
    let Some(slot) = best_ready_slot(state, hp) else {
        return;
    };

    // Lay the wave out on a line above the weapon tray, as a UI would
    let points: Vec<AimPoint> = state
        .enemies
        .iter()
        .enumerate()
        .map(|(i, e)| AimPoint {
            id: e.id,
            pos: Vec2::new(-200.0 + 200.0 * i as f32, 300.0),
        })
        .collect();
    let target = points
        .iter()
        .find(|p| p.id == target_id)
        .map(|p| p.pos)
        .unwrap_or(Vec2::Y);

    if state.begin_drag(slot, Vec2::ZERO) {
        state.update_drag(target.normalize_or(Vec2::Y) * 120.0, &points);
        state.end_drag(&points);
    }
}

/// Largest ready, unlocked divisor that would land on `hp`
fn best_ready_slot(state: &GameState, hp: i64) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (slot, weapon) in state.config.weapons.iter().enumerate() {
        if !state.is_weapon_ready(slot) || state.is_weapon_locked(slot) {
            continue;
        }
        let lands = weapon.damage == 1 || hp % weapon.damage == 0;
        if lands && best.is_none_or(|(_, d)| weapon.damage > d) {
            best = Some((slot, weapon.damage));
        }
    }
    best.map(|(slot, _)| slot)
}

fn report(state: &mut GameState) {
    for event in state.drain_events() {
        match event {
            GameEvent::WaveSpawned { wave_size } => {
                log::info!("Wave of {wave_size} spawned");
            }
            GameEvent::EnemyDefeated { id } => {
                log::info!("Enemy {id} defeated, score {}", state.score);
            }
            GameEvent::PlayerDamaged { hp } => {
                log::info!("Player hit, HP {hp}");
            }
            GameEvent::GameOver => {
                log::info!("Game over");
            }
            other => log::debug!("{other:?}"),
        }
    }
}
