//! Deterministic game simulation
//!
//! Fully headless: no rendering, no wall clock, no filesystem. The driver
//! owns the cadence (calling [`tick`] with elapsed milliseconds) and the
//! input mapping (drag handling, [`fire`], mode switches); everything else
//! is internal state transitions. Given the same seed and the same call
//! sequence the simulation is bit-for-bit reproducible.

pub mod combat;
pub mod dungeon;
pub mod events;
pub mod gesture;
pub mod state;
pub mod tick;
pub mod tutorial;

pub use dungeon::{close_reward, confirm_clear, select_dungeon, DungeonState};
pub use events::GameEvent;
pub use gesture::{resolve_snap, AimPoint, SnapTarget};
pub use state::{DeferredAction, Enemy, GameState, Mode, Player, Scene};
pub use tick::{fire, tick};
pub use tutorial::{StepId, TutorialPhase, TutorialState};
