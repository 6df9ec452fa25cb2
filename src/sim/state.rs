//! Game state and core simulation types
//!
//! One state owner holds the enemy set, player, cooldowns and mode flags;
//! every mutation (tick, fire, deferred action) is applied as a single
//! snapshot-to-snapshot transition through it.

use std::collections::BTreeSet;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::config::{EnemySpec, GameConfig};
use crate::consts::PLAYER_MAX_HP;
use crate::progress::Progress;

use super::dungeon::DungeonState;
use super::events::GameEvent;
use super::gesture::DragTracker;
use super::tutorial::{self, StepId, TutorialPhase, TutorialState};

/// Which game flow is currently active. Exactly one at a time; switching
/// modes fully resets session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Title,
    Normal,
    Tutorial,
    Dungeon,
}

/// Which screen the UI layer should present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scene {
    Title,
    WorldMap,
    Game,
}

/// A live enemy. Created by `spawn_wave`, mutated by hit resolution and
/// clock ticks, removed in the same transition that drops its HP to 0.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub hp: i64,
    pub max_hp: i64,
    /// Accumulated counter-attack windup (ms)
    pub attack_timer: u32,
    /// Engine-clock timestamp of the last landed counter-attack, 0 if none
    pub last_attack_at: u64,
    pub damage: i32,
    /// Interval override (ms); negative disables counter-attacks
    pub attack_interval: Option<i64>,
    pub is_boss: bool,
}

impl Enemy {
    fn from_spec(id: u32, spec: &EnemySpec) -> Self {
        Self {
            id,
            hp: spec.hp,
            max_hp: spec.max_hp,
            attack_timer: 0,
            last_attack_at: 0,
            damage: spec.damage,
            attack_interval: spec.attack_interval,
            is_boss: spec.boss,
        }
    }
}

/// The player's session HP
#[derive(Debug, Clone, Copy)]
pub struct Player {
    pub hp: i32,
    pub max_hp: i32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            hp: PLAYER_MAX_HP,
            max_hp: PLAYER_MAX_HP,
        }
    }
}

/// Work deferred past a settle delay. Every variant re-validates its own
/// guards at execution time; the state may have moved on since scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredAction {
    /// Respawn after a normal-mode wave clear
    SpawnWave,
    /// Advance to the next dungeon wave and spawn it
    DungeonNextWave,
    /// Latch the dungeon-cleared banner
    DungeonCleared,
    /// Move the tutorial cursor
    TutorialAdvance(StepId),
}

/// A deferred action tagged with the session it was scheduled in. Stale
/// entries (session token moved on) are discarded unexecuted.
#[derive(Debug, Clone, Copy)]
pub struct ScheduledAction {
    pub due_at: u64,
    pub session: u64,
    pub action: DeferredAction,
}

/// The authoritative game state
#[derive(Debug)]
pub struct GameState {
    pub config: GameConfig,
    pub mode: Mode,
    pub scene: Scene,
    pub enemies: Vec<Enemy>,
    pub player: Player,
    pub score: u64,
    /// Enemy count of the last spawn; feeds the counter-attack cadence
    pub wave_size: u32,
    pub is_game_over: bool,
    pub is_menu_open: bool,
    pub is_timer_paused: bool,
    pub is_invincible: bool,
    /// Generation token; bumped on every full reset so observers (and
    /// pending deferred actions) can tell a stale session from the live one
    pub session: u64,
    pub tutorial: TutorialState,
    pub dungeon: DungeonState,
    pub progress: Progress,
    pub(super) drag: DragTracker,
    /// Ready-at engine timestamps per weapon slot
    cooldowns: Vec<u64>,
    /// Engine clock, advanced by `tick`; all cooldowns and deferred work
    /// are measured against this, never wall time
    now_ms: u64,
    pub(super) scheduled: Vec<ScheduledAction>,
    pub(super) events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a fresh state on the title screen
    pub fn new(config: GameConfig, progress: Progress, seed: u64) -> Self {
        let cooldowns = vec![0; config.weapons.len()];
        Self {
            config,
            mode: Mode::Title,
            scene: Scene::Title,
            enemies: Vec::new(),
            player: Player::default(),
            score: 0,
            wave_size: 0,
            is_game_over: false,
            is_menu_open: false,
            is_timer_paused: false,
            is_invincible: false,
            session: 0,
            tutorial: TutorialState::default(),
            dungeon: DungeonState::default(),
            progress,
            drag: DragTracker::default(),
            cooldowns,
            now_ms: 0,
            scheduled: Vec::new(),
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Current engine-clock time (ms)
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub(super) fn advance_clock(&mut self, elapsed_ms: u32) {
        self.now_ms += elapsed_ms as u64;
    }

    /// Allocate a new entity ID; ids are never reused within a state
    pub(super) fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Populate the enemy set for the active mode's configuration. The set
    /// is replaced atomically; readers never observe a partial spawn.
    pub fn spawn_wave(&mut self) {
        let mut wave: Vec<Enemy> = Vec::new();

        match self.mode {
            Mode::Title => {}
            Mode::Tutorial => {
                match self.tutorial.phase {
                    TutorialPhase::One => {
                        let spec = self.config.tutorial_phase1.clone();
                        let id = self.next_entity_id();
                        wave.push(Enemy::from_spec(id, &spec));
                    }
                    TutorialPhase::Two => {
                        let specs = self.config.tutorial_phase2.clone();
                        for spec in &specs {
                            let id = self.next_entity_id();
                            wave.push(Enemy::from_spec(id, spec));
                        }
                    }
                    // The clock is inert once the tutorial completes; no
                    // further spawns either
                    TutorialPhase::Complete => {}
                }
            }
            Mode::Dungeon => {
                let spec = self
                    .dungeon
                    .selected
                    .and_then(|id| self.config.dungeon(id))
                    .and_then(|d| d.waves.get(self.dungeon.wave_index))
                    .cloned();
                if let Some(spec) = spec {
                    let id = self.next_entity_id();
                    wave.push(Enemy::from_spec(id, &spec));
                }
            }
            Mode::Normal => {
                let params = self.config.normal.clone();
                let count = self
                    .rng
                    .random_range(params.enemy_count_min..=params.enemy_count_max.max(params.enemy_count_min));
                for _ in 0..count {
                    let hp = if params.hp_max > params.hp_min {
                        self.rng.random_range(params.hp_min..params.hp_max)
                    } else {
                        params.hp_min
                    };
                    let id = self.next_entity_id();
                    wave.push(Enemy {
                        id,
                        hp,
                        max_hp: hp,
                        attack_timer: 0,
                        last_attack_at: 0,
                        damage: params.damage,
                        attack_interval: None,
                        is_boss: false,
                    });
                }
            }
        }

        self.wave_size = wave.len() as u32;
        self.enemies = wave;

        if self.wave_size > 0 {
            log::info!(
                "Spawned wave of {} for {:?} mode",
                self.wave_size,
                self.mode
            );
            self.push_event(GameEvent::WaveSpawned {
                wave_size: self.wave_size,
            });
        }

        // The enemy set changed; recompute data-driven locks/highlights
        tutorial::evaluate(self);
    }

    /// Full session reset: clears enemies, cooldowns, score and flags,
    /// bumps the session token (invalidating scheduled work and telling
    /// observers to drop transient visual state), then respawns.
    pub fn restart(&mut self) {
        self.session += 1;
        self.enemies.clear();
        self.cooldowns = vec![0; self.config.weapons.len()];
        self.player = Player::default();
        self.score = 0;
        self.wave_size = 0;
        self.is_game_over = false;
        self.drag.cancel();
        if self.mode == Mode::Tutorial {
            self.tutorial.phase = TutorialPhase::One;
        }
        if self.mode == Mode::Dungeon {
            self.dungeon.wave_index = 0;
            self.dungeon.is_cleared = false;
        }
        log::info!("Session {} restarted in {:?} mode", self.session, self.mode);
        self.spawn_wave();
    }

    /// Switch the active game flow; fully resets session state
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.tutorial = TutorialState::default();
        self.is_timer_paused = false;
        self.is_invincible = false;
        log::info!("Mode set to {mode:?}");
        self.restart();
        tutorial::evaluate(self);
    }

    pub fn set_scene(&mut self, scene: Scene) {
        self.scene = scene;
    }

    pub fn set_menu_open(&mut self, open: bool) {
        self.is_menu_open = open;
    }

    /// Mark the tutorial as completed for good and drop into normal mode.
    /// The completion flag is the persisted one; the driver should save
    /// `progress` afterwards.
    pub fn complete_tutorial_and_start(&mut self) {
        self.progress.tutorial_completed = true;
        self.is_menu_open = false;
        self.set_mode(Mode::Normal);
        self.set_scene(Scene::Game);
    }

    /// Overwrite a weapon's ready-at timestamp
    pub(super) fn set_cooldown(&mut self, slot: usize, ready_at: u64) {
        if let Some(entry) = self.cooldowns.get_mut(slot) {
            *entry = ready_at;
        }
    }

    /// Engine timestamp at which the weapon becomes usable again
    pub fn cooldown_ready_at(&self, slot: usize) -> u64 {
        self.cooldowns.get(slot).copied().unwrap_or(0)
    }

    pub fn is_weapon_ready(&self, slot: usize) -> bool {
        self.now_ms >= self.cooldown_ready_at(slot)
    }

    /// Cooldown recovery as a 0..=1 fraction for the given weapon, for
    /// radial cooldown indicators
    pub fn cooldown_fraction(&self, slot: usize) -> f32 {
        let ready_at = self.cooldown_ready_at(slot);
        if self.now_ms >= ready_at {
            return 1.0;
        }
        let duration = self
            .config
            .weapons
            .get(slot)
            .map(|w| w.cooldown_ms)
            .unwrap_or(crate::consts::FAIL_COOLDOWN_MS)
            .max(1);
        let remaining = ready_at - self.now_ms;
        (1.0 - remaining as f32 / duration as f32).max(0.0)
    }

    pub fn is_weapon_locked(&self, slot: usize) -> bool {
        self.tutorial.locked.contains(&slot)
    }

    pub fn highlighted_weapons(&self) -> &BTreeSet<usize> {
        &self.tutorial.highlighted
    }

    /// Queue a deferred action against the current session token
    pub(super) fn schedule(&mut self, delay_ms: u64, action: DeferredAction) {
        self.scheduled.push(ScheduledAction {
            due_at: self.now_ms + delay_ms,
            session: self.session,
            action,
        });
    }
}
