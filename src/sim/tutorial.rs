//! Guided tutorial state machine
//!
//! The tutorial is a script of steps with conditional branching, consumed as
//! configuration data. Each step can lock weapons, highlight weapons (either
//! a fixed set or the "valid" rule: every square weapon whose divisor evenly
//! divides the first live enemy's HP, recomputed on every evaluation), show
//! a modal (pausing the clock until dismissed) or an overlay hint, and
//! declares how it advances: a combat condition, or modal dismissal for pure
//! exposition steps.
//!
//! Step identifiers form a closed enumeration rather than loose integers;
//! the numeric identities of the original script are kept as discriminants.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::WeaponShape;

use super::events::GameEvent;
use super::state::{DeferredAction, GameState, Mode};

/// Coarse tutorial phase; phase two brings counter-attacking enemies and
/// `Complete` leaves the clock inert until the player exits tutorial mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TutorialPhase {
    #[default]
    One,
    Two,
    Complete,
}

/// Fine-grained script cursor. Discriminants match the shipped script's
/// step numbering; the gaps leave room for inserted steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StepId {
    Welcome = 10,
    ChipStrike = 11,
    DivisorIntro = 12,
    MissLesson = 13,
    ValidIntro = 14,
    DivisorStrike = 15,
    FinishPhaseOne = 16,
    PhaseTwoIntro = 20,
    TimerLesson = 21,
    CombatIntro = 22,
    /// Free-combat practice: unconditionally unlocks everything, unpauses
    /// the clock and grants invincibility so the lesson cannot be lost
    CombatPractice = 23,
    Complete = 30,
}

/// What a step displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepBody {
    /// Blocking dialog; the clock pauses until it is dismissed
    Modal {
        title: String,
        content: String,
        button: String,
    },
    /// Non-blocking hint anchored somewhere on screen
    Overlay { text: String, position: String },
    Silent,
}

/// Which weapons a step highlights
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HighlightRule {
    None,
    Slots(Vec<usize>),
    /// Square weapons whose divisor evenly divides the first live enemy's
    /// HP; recomputed on every evaluation, never cached
    Valid,
}

/// Combat outcome that lets a step advance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdvanceCondition {
    AttackFail,
    AttackSuccess,
    PhaseClear,
}

/// One entry of the tutorial script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSpec {
    pub id: StepId,
    /// Weapon slots disabled while this step is active
    #[serde(default)]
    pub lock: Vec<usize>,
    pub highlight: HighlightRule,
    pub body: StepBody,
    pub condition: Option<AdvanceCondition>,
    /// Pause between the condition being met and the cursor moving
    #[serde(default)]
    pub delay_ms: u64,
    pub next: Option<StepId>,
}

/// Live tutorial progress owned by the game state
#[derive(Debug, Clone, Default)]
pub struct TutorialState {
    pub phase: TutorialPhase,
    pub cursor: StepId,
    pub locked: BTreeSet<usize>,
    pub highlighted: BTreeSet<usize>,
    pub modal_open: bool,
    /// Last step whose entry effects ran; re-evaluations within the same
    /// step must not reopen a dismissed modal
    entered: Option<StepId>,
}

impl Default for StepId {
    fn default() -> Self {
        StepId::Welcome
    }
}

/// The shipped tutorial script. Phase one teaches the chip weapon, misses
/// and divisors against a passive enemy; phase two adds attack timers and a
/// free-combat segment.
pub fn default_script() -> Vec<StepSpec> {
    fn modal(title: &str, content: &str) -> StepBody {
        StepBody::Modal {
            title: title.to_string(),
            content: content.to_string(),
            button: "Next".to_string(),
        }
    }
    fn overlay(text: &str) -> StepBody {
        StepBody::Overlay {
            text: text.to_string(),
            position: "bottom".to_string(),
        }
    }

    vec![
        StepSpec {
            id: StepId::Welcome,
            lock: vec![0, 1, 2, 3, 4],
            highlight: HighlightRule::None,
            body: modal(
                "Welcome",
                "Enemies carry a number: their HP. Weapons are divisors. Drag a weapon toward an enemy to fire it.",
            ),
            condition: None,
            delay_ms: 0,
            next: Some(StepId::ChipStrike),
        },
        StepSpec {
            id: StepId::ChipStrike,
            lock: vec![1, 2, 3, 4],
            highlight: HighlightRule::Slots(vec![0]),
            body: overlay("Drag the 1 toward the enemy. It always hits, for one damage."),
            condition: Some(AdvanceCondition::AttackSuccess),
            delay_ms: 400,
            next: Some(StepId::DivisorIntro),
        },
        StepSpec {
            id: StepId::DivisorIntro,
            lock: vec![1, 2, 3, 4],
            highlight: HighlightRule::None,
            body: modal(
                "Divisors",
                "Square weapons divide. They only land when the enemy's HP is evenly divisible by them.",
            ),
            condition: None,
            delay_ms: 0,
            next: Some(StepId::MissLesson),
        },
        StepSpec {
            id: StepId::MissLesson,
            lock: vec![0],
            highlight: HighlightRule::None,
            body: overlay("Try any square weapon. If it doesn't divide evenly it bounces off and locks up for a moment."),
            condition: Some(AdvanceCondition::AttackFail),
            delay_ms: 400,
            next: Some(StepId::ValidIntro),
        },
        StepSpec {
            id: StepId::ValidIntro,
            lock: vec![0],
            highlight: HighlightRule::None,
            body: modal(
                "Check the number",
                "A miss wastes a second. Read the enemy's HP and pick a divisor that fits.",
            ),
            condition: None,
            delay_ms: 0,
            next: Some(StepId::DivisorStrike),
        },
        StepSpec {
            id: StepId::DivisorStrike,
            lock: vec![0],
            highlight: HighlightRule::Valid,
            body: overlay("The glowing weapons divide this enemy's HP. Fire one."),
            condition: Some(AdvanceCondition::AttackSuccess),
            delay_ms: 400,
            next: Some(StepId::FinishPhaseOne),
        },
        StepSpec {
            id: StepId::FinishPhaseOne,
            lock: vec![],
            highlight: HighlightRule::Valid,
            body: overlay("Finish it off. Reaching the divisor itself is a kill."),
            condition: Some(AdvanceCondition::PhaseClear),
            delay_ms: 600,
            next: Some(StepId::PhaseTwoIntro),
        },
        StepSpec {
            id: StepId::PhaseTwoIntro,
            lock: vec![],
            highlight: HighlightRule::None,
            body: modal(
                "They fight back",
                "Real enemies counter-attack when their gauge fills. Keep dividing before it does.",
            ),
            condition: None,
            delay_ms: 0,
            next: Some(StepId::TimerLesson),
        },
        StepSpec {
            id: StepId::TimerLesson,
            lock: vec![],
            highlight: HighlightRule::Slots(vec![0]),
            body: overlay("The 1 also knocks time off an enemy's attack gauge. Land one."),
            condition: Some(AdvanceCondition::AttackSuccess),
            delay_ms: 400,
            next: Some(StepId::CombatIntro),
        },
        StepSpec {
            id: StepId::CombatIntro,
            lock: vec![],
            highlight: HighlightRule::None,
            body: modal(
                "Practice fight",
                "Clear the field however you like. You can't die during practice.",
            ),
            condition: None,
            delay_ms: 0,
            next: Some(StepId::CombatPractice),
        },
        StepSpec {
            id: StepId::CombatPractice,
            lock: vec![],
            highlight: HighlightRule::None,
            body: StepBody::Silent,
            condition: Some(AdvanceCondition::PhaseClear),
            delay_ms: 800,
            next: Some(StepId::Complete),
        },
        StepSpec {
            id: StepId::Complete,
            lock: vec![],
            highlight: HighlightRule::None,
            body: modal(
                "Tutorial complete",
                "That's everything. Head out and start dividing for real.",
            ),
            condition: None,
            delay_ms: 0,
            next: None,
        },
    ]
}

fn spec_for(state: &GameState, id: StepId) -> Option<StepSpec> {
    state
        .config
        .tutorial_steps
        .iter()
        .find(|s| s.id == id)
        .cloned()
}

/// Square weapons whose divisor evenly divides the first live enemy's HP
fn valid_slots(state: &GameState) -> BTreeSet<usize> {
    let Some(enemy) = state.enemies.first() else {
        return BTreeSet::new();
    };
    state
        .config
        .weapons
        .iter()
        .enumerate()
        .filter(|(_, w)| w.shape == WeaponShape::Square && enemy.hp % w.damage == 0)
        .map(|(slot, _)| slot)
        .collect()
}

/// Recompute the derived lock/highlight sets and (re)assert step entry
/// effects. Called on every relevant state change: cursor move, mode
/// change, enemy-set change. Only changed values are committed, and entry
/// effects (modal, clock pause) run exactly once per step.
pub(super) fn evaluate(state: &mut GameState) {
    if state.mode != Mode::Tutorial {
        return;
    }
    let Some(step) = spec_for(state, state.tutorial.cursor) else {
        return;
    };

    let locks: BTreeSet<usize> = step.lock.iter().copied().collect();
    let highlights = match &step.highlight {
        HighlightRule::None => BTreeSet::new(),
        HighlightRule::Slots(slots) => slots.iter().copied().collect(),
        HighlightRule::Valid => valid_slots(state),
    };
    if state.tutorial.locked != locks {
        state.tutorial.locked = locks;
    }
    if state.tutorial.highlighted != highlights {
        state.tutorial.highlighted = highlights;
    }

    if state.tutorial.entered != Some(step.id) {
        state.tutorial.entered = Some(step.id);
        let is_modal = matches!(step.body, StepBody::Modal { .. });
        state.tutorial.modal_open = is_modal;
        state.is_timer_paused = is_modal;
        state.push_event(GameEvent::TutorialStepEntered { step: step.id });
        log::debug!("Tutorial entered step {:?}", step.id);
    }

    // Hard-coded practice override: everything unlocked, clock running,
    // player unkillable
    if step.id == StepId::CombatPractice {
        state.tutorial.locked.clear();
        state.tutorial.highlighted.clear();
        state.is_timer_paused = false;
        state.is_invincible = true;
    }
}

/// Dismiss the active step's modal. Pure exposition steps (no overlay, no
/// condition) advance immediately.
pub fn dismiss_modal(state: &mut GameState) {
    if state.mode != Mode::Tutorial || !state.tutorial.modal_open {
        return;
    }
    state.tutorial.modal_open = false;
    state.is_timer_paused = false;

    let Some(step) = spec_for(state, state.tutorial.cursor) else {
        return;
    };
    if step.condition.is_none()
        && !matches!(step.body, StepBody::Overlay { .. })
        && let Some(next) = step.next
    {
        advance_to(state, next);
    }
}

/// Evaluate the active step's advance condition against a resolved fire.
/// A match schedules the cursor move after the step's configured delay.
pub(super) fn on_fire_resolved(state: &mut GameState, success: bool) {
    if state.mode != Mode::Tutorial {
        return;
    }
    let Some(step) = spec_for(state, state.tutorial.cursor) else {
        return;
    };
    let Some(condition) = step.condition else {
        return;
    };

    let met = match condition {
        AdvanceCondition::AttackFail => !success,
        AdvanceCondition::AttackSuccess => success,
        AdvanceCondition::PhaseClear => state.enemies.is_empty(),
    };

    if met && let Some(next) = step.next {
        state.schedule(step.delay_ms, DeferredAction::TutorialAdvance(next));
    }
}

/// Move the cursor, applying the mode-specific side effects of arriving at
/// certain steps, then re-evaluate.
pub(super) fn advance_to(state: &mut GameState, step: StepId) {
    state.tutorial.cursor = step;
    match step {
        StepId::PhaseTwoIntro => {
            state.tutorial.phase = TutorialPhase::Two;
            // Brief beat for the phase-one exit animation before phase two
            // fills the field
            state.schedule(100, DeferredAction::SpawnWave);
        }
        StepId::Complete => {
            state.tutorial.phase = TutorialPhase::Complete;
            state.push_event(GameEvent::TutorialCompleted);
            log::info!("Tutorial script finished");
        }
        _ => {}
    }
    evaluate(state);
}

/// Boundary operation: advance the script explicitly. With no target the
/// cursor follows the active step's declared successor.
pub fn advance(state: &mut GameState, step: Option<StepId>) {
    if state.mode != Mode::Tutorial {
        return;
    }
    match step {
        Some(step) => advance_to(state, step),
        None => {
            if let Some(next) = spec_for(state, state.tutorial.cursor).and_then(|s| s.next) {
                advance_to(state, next);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::progress::Progress;
    use crate::sim::tick::{fire, tick};

    fn tutorial_state() -> GameState {
        let mut state = GameState::new(GameConfig::default(), Progress::default(), 3);
        state.set_mode(Mode::Tutorial);
        state.set_scene(Scene::Game);
        state
    }

    use crate::sim::state::Scene;

    /// Run ticks until any scheduled advance has landed
    fn settle(state: &mut GameState) {
        for _ in 0..20 {
            tick(state, 100);
        }
    }

    #[test]
    fn test_welcome_modal_pauses_clock() {
        let state = tutorial_state();
        assert_eq!(state.tutorial.cursor, StepId::Welcome);
        assert!(state.tutorial.modal_open);
        assert!(state.is_timer_paused);
    }

    #[test]
    fn test_exposition_step_advances_on_dismiss() {
        let mut state = tutorial_state();
        dismiss_modal(&mut state);
        assert_eq!(state.tutorial.cursor, StepId::ChipStrike);
        assert!(!state.tutorial.modal_open);
        assert!(!state.is_timer_paused);
        // Chip step locks every square weapon and highlights the 1
        assert_eq!(
            state.tutorial.locked,
            [1, 2, 3, 4].into_iter().collect::<std::collections::BTreeSet<_>>()
        );
        assert!(state.tutorial.highlighted.contains(&0));
    }

    #[test]
    fn test_attack_success_condition_advances_after_delay() {
        let mut state = tutorial_state();
        dismiss_modal(&mut state);

        let enemy_id = state.enemies[0].id;
        assert!(fire(&mut state, enemy_id, 0));
        // Delay has not elapsed yet
        assert_eq!(state.tutorial.cursor, StepId::ChipStrike);
        settle(&mut state);
        assert_eq!(state.tutorial.cursor, StepId::DivisorIntro);
        assert!(state.tutorial.modal_open);
    }

    #[test]
    fn test_attack_fail_condition() {
        let mut state = tutorial_state();
        dismiss_modal(&mut state);
        let enemy_id = state.enemies[0].id;
        fire(&mut state, enemy_id, 0);
        settle(&mut state);
        dismiss_modal(&mut state);
        assert_eq!(state.tutorial.cursor, StepId::MissLesson);

        // Phase-1 enemy is at 11 HP after the chip; weapon 7 misses
        assert_eq!(state.enemies[0].hp, 11);
        assert!(!fire(&mut state, enemy_id, 4));
        settle(&mut state);
        assert_eq!(state.tutorial.cursor, StepId::ValidIntro);
    }

    #[test]
    fn test_valid_highlight_tracks_first_enemy() {
        let mut state = tutorial_state();
        // Jump straight to the valid-highlight step
        advance(&mut state, Some(StepId::DivisorStrike));
        // Phase-1 enemy has 12 HP: squares 2 and 3 divide, 5 and 7 don't
        let expected: std::collections::BTreeSet<usize> = [1, 2].into_iter().collect();
        assert_eq!(state.tutorial.highlighted, expected);

        // Dropping the HP re-derives the set on the next evaluation
        state.enemies[0].hp = 35;
        evaluate(&mut state);
        let expected: std::collections::BTreeSet<usize> = [3, 4].into_iter().collect();
        assert_eq!(state.tutorial.highlighted, expected);
    }

    #[test]
    fn test_reevaluation_does_not_reopen_dismissed_modal() {
        let mut state = tutorial_state();
        dismiss_modal(&mut state);
        settle(&mut state);
        // Still on the chip step; force a re-evaluation
        evaluate(&mut state);
        assert!(!state.tutorial.modal_open);
        assert!(!state.is_timer_paused);
    }

    #[test]
    fn test_phase_clear_spawns_phase_two() {
        let mut state = tutorial_state();
        advance(&mut state, Some(StepId::FinishPhaseOne));
        state.enemies[0].hp = 5;
        let enemy_id = state.enemies[0].id;

        assert!(fire(&mut state, enemy_id, 3)); // 5 / 5 finishes
        assert!(state.enemies.is_empty());
        settle(&mut state);

        assert_eq!(state.tutorial.cursor, StepId::PhaseTwoIntro);
        assert_eq!(state.tutorial.phase, TutorialPhase::Two);
        assert_eq!(state.enemies.len(), state.config.tutorial_phase2.len());
    }

    #[test]
    fn test_combat_practice_override() {
        let mut state = tutorial_state();
        state.tutorial.phase = TutorialPhase::Two;
        state.spawn_wave();
        advance(&mut state, Some(StepId::CombatPractice));

        assert!(state.tutorial.locked.is_empty());
        assert!(state.tutorial.highlighted.is_empty());
        assert!(!state.is_timer_paused);
        assert!(state.is_invincible);

        // Invincibility floors HP at 1 no matter how hard the wave hits
        state.player.hp = 1;
        for enemy in &mut state.enemies {
            enemy.damage = 99;
            enemy.attack_interval = Some(100);
        }
        tick(&mut state, 100);
        assert_eq!(state.player.hp, 1);
        assert!(!state.is_game_over);
    }

    #[test]
    fn test_completion_makes_clock_inert() {
        let mut state = tutorial_state();
        state.tutorial.phase = TutorialPhase::Two;
        state.spawn_wave();
        advance(&mut state, Some(StepId::Complete));

        assert_eq!(state.tutorial.phase, TutorialPhase::Complete);
        let timers: Vec<u32> = state.enemies.iter().map(|e| e.attack_timer).collect();
        tick(&mut state, 100);
        let after: Vec<u32> = state.enemies.iter().map(|e| e.attack_timer).collect();
        assert_eq!(timers, after);
    }

    #[test]
    fn test_complete_and_start_persists_flag() {
        let mut state = tutorial_state();
        advance(&mut state, Some(StepId::Complete));
        state.complete_tutorial_and_start();

        assert!(state.progress.tutorial_completed);
        assert_eq!(state.mode, Mode::Normal);
        assert!(!state.enemies.is_empty());
    }
}
