//! Divide Strike - an arithmetic puzzle combat engine
//!
//! Core modules:
//! - `sim`: Deterministic simulation (combat resolution, game state, gesture
//!   targeting, tutorial and dungeon progression)
//! - `config`: Data-driven game content (weapons, spawn tables, tutorial
//!   script, dungeons)
//! - `progress`: The persisted progress subset (tutorial completion, dungeon
//!   unlock frontier)
//!
//! The UI layer is an external collaborator: it drives `sim` through the
//! boundary operations (`tick`, `fire`, drag handling, mode/scene switches)
//! and renders from the exposed read accessors plus the drained event queue.

pub mod config;
pub mod progress;
pub mod sim;

pub use config::GameConfig;
pub use progress::Progress;
pub use sim::{GameState, Mode, Scene};

/// Game timing and balance constants
pub mod consts {
    /// Period the external clock is expected to drive `tick` at (ms)
    pub const TICK_INTERVAL_MS: u32 = 100;

    /// Base counter-attack interval per live enemy (ms); the effective
    /// interval is this times the wave size, so cadence slows in big waves
    pub const BASE_ATTACK_INTERVAL_MS: i64 = 5000;

    /// Punitive cooldown applied when a fire attempt fails (ms)
    pub const FAIL_COOLDOWN_MS: u64 = 1000;

    /// Attack-timer reduction applied by the divisor-1 weapon (ms)
    pub const TIMER_DISRUPT_MS: u32 = 1000;

    /// Settle delay between an emptied wave and the next spawn (ms)
    pub const RESPAWN_DELAY_MS: u64 = 500;

    /// Longer settle delay before the dungeon-clear banner, so the boss
    /// defeat animation can play out (ms)
    pub const DUNGEON_CLEAR_DELAY_MS: u64 = 1500;

    /// Player session HP
    pub const PLAYER_MAX_HP: i32 = 5;

    /// Score awarded per defeated enemy
    pub const SCORE_PER_KILL: u64 = 10;

    /// Drag shorter than this expresses no direction (deadzone, px)
    pub const DRAG_DEADZONE: f32 = 10.0;

    /// Minimum drag distance at release for a fire to commit (px)
    pub const DRAG_FIRE_THRESHOLD: f32 = 50.0;

    /// Maximum angular difference for an enemy to be a snap candidate (rad)
    pub const SNAP_MAX_ANGLE: f32 = 1.0;
}
