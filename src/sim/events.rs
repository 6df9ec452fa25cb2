//! Presentation-facing event queue
//!
//! The simulation never calls into the UI; instead every transition that a
//! renderer would animate pushes an event keyed by entity id. The driver
//! drains the queue once per frame and dispatches to whatever presentation
//! layer is attached.

use super::tutorial::StepId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    WaveSpawned { wave_size: u32 },
    /// A fire landed; the enemy survives at `hp`
    EnemyStruck { id: u32, hp: i64 },
    /// A fire bounced off (divisor didn't divide the HP)
    StrikeDeflected { id: u32 },
    EnemyDefeated { id: u32 },
    /// An enemy's counter-attack landed on the player
    EnemyAttacked { id: u32, damage: i32 },
    PlayerDamaged { hp: i32 },
    WaveCleared,
    GameOver,
    TutorialStepEntered { step: StepId },
    TutorialCompleted,
    DungeonCleared { id: u32 },
}

impl super::state::GameState {
    pub(super) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events accumulated since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
