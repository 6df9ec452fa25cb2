//! Drag gesture resolution
//!
//! Weapons are fired by dragging them toward an enemy. The driver feeds raw
//! pointer positions plus the current enemy screen positions (the simulation
//! itself is headless and has no layout); this module turns the drag vector
//! into a snapped target by angular proximity and decides on release whether
//! the gesture commits to a fire.

use glam::Vec2;

use crate::consts::{DRAG_DEADZONE, DRAG_FIRE_THRESHOLD, SNAP_MAX_ANGLE};

use super::state::GameState;

/// One targetable enemy as laid out by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AimPoint {
    pub id: u32,
    pub pos: Vec2,
}

/// The enemy a drag currently snaps to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTarget {
    pub id: u32,
    /// The snapped aim point, for drawing the targeting arrow endpoint
    pub pos: Vec2,
    /// Angular distance (radians) between the drag vector and the enemy
    pub angle_diff: f32,
}

/// Shortest angular distance between two angles, in 0..=PI
fn angular_diff(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(std::f32::consts::TAU);
    if d > std::f32::consts::PI {
        std::f32::consts::TAU - d
    } else {
        d
    }
}

/// Resolve the drag vector `origin -> current` against the given targets.
///
/// Drags shorter than the deadzone resolve to nothing. Otherwise the target
/// with the smallest angular distance from the drag direction wins, provided
/// it is within the snap cone; ties keep the earliest target in iteration
/// order so resolution is deterministic for identical layouts.
pub fn resolve_snap(origin: Vec2, current: Vec2, targets: &[AimPoint]) -> Option<SnapTarget> {
    let delta = current - origin;
    if delta.length() <= DRAG_DEADZONE {
        return None;
    }
    let drag_angle = delta.y.atan2(delta.x);

    let mut best: Option<SnapTarget> = None;
    for target in targets {
        let to_target = target.pos - origin;
        if to_target.length_squared() == 0.0 {
            continue;
        }
        let diff = angular_diff(drag_angle, to_target.y.atan2(to_target.x));
        if diff < SNAP_MAX_ANGLE && best.is_none_or(|b| diff < b.angle_diff) {
            best = Some(SnapTarget {
                id: target.id,
                pos: target.pos,
                angle_diff: diff,
            });
        }
    }
    best
}

/// Pointer-drag bookkeeping between `begin_drag` and `end_drag`
#[derive(Debug, Clone, Copy, Default)]
pub struct DragTracker {
    active: bool,
    slot: usize,
    origin: Vec2,
    current: Vec2,
    snapped: Option<SnapTarget>,
}

impl DragTracker {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn slot(&self) -> Option<usize> {
        self.active.then_some(self.slot)
    }

    pub fn snapped(&self) -> Option<SnapTarget> {
        if self.active { self.snapped } else { None }
    }

    /// Drop any in-flight drag without firing
    pub fn cancel(&mut self) {
        *self = Self::default();
    }
}

impl GameState {
    /// Start dragging the weapon in `slot` from `origin`. Refused while the
    /// weapon is locked by the tutorial, still cooling down, or the session
    /// is not accepting input.
    pub fn begin_drag(&mut self, slot: usize, origin: Vec2) -> bool {
        if self.is_game_over
            || self.is_menu_open
            || slot >= self.config.weapons.len()
            || self.is_weapon_locked(slot)
            || !self.is_weapon_ready(slot)
        {
            return false;
        }
        self.drag = DragTracker {
            active: true,
            slot,
            origin,
            current: origin,
            snapped: None,
        };
        true
    }

    /// Move the in-flight drag and re-resolve its snap target
    pub fn update_drag(&mut self, pos: Vec2, targets: &[AimPoint]) {
        if !self.drag.active {
            return;
        }
        self.drag.current = pos;
        self.drag.snapped = resolve_snap(self.drag.origin, pos, targets);
    }

    /// Release the drag. Fires at the snapped target only when the drag
    /// travelled past the fire threshold; short or unsnapped drags are a
    /// cancel. Returns whether a fire landed (see [`super::tick::fire`]).
    pub fn end_drag(&mut self, targets: &[AimPoint]) -> bool {
        if !self.drag.active {
            return false;
        }
        let drag = self.drag;
        self.drag.cancel();

        let distance = drag.origin.distance(drag.current);
        let snapped = resolve_snap(drag.origin, drag.current, targets);
        if distance > DRAG_FIRE_THRESHOLD
            && let Some(target) = snapped
        {
            return super::tick::fire(self, target.id, drag.slot);
        }
        false
    }

    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// The enemy the live drag would fire at, for reticle feedback
    pub fn drag_snap_target(&self) -> Option<u32> {
        self.drag.snapped().map(|t| t.id)
    }

    /// Where the targeting arrow should end for the live drag
    pub fn drag_snap_point(&self) -> Option<Vec2> {
        self.drag.snapped().map(|t| t.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::progress::Progress;
    use crate::sim::state::Mode;

    fn targets() -> Vec<AimPoint> {
        vec![
            AimPoint {
                id: 1,
                pos: Vec2::new(100.0, 0.0),
            },
            AimPoint {
                id: 2,
                pos: Vec2::new(0.0, 100.0),
            },
            AimPoint {
                id: 3,
                pos: Vec2::new(-100.0, 0.0),
            },
        ]
    }

    #[test]
    fn test_deadzone_resolves_to_nothing() {
        let snap = resolve_snap(Vec2::ZERO, Vec2::new(5.0, 5.0), &targets());
        assert_eq!(snap, None);
    }

    #[test]
    fn test_snaps_to_angular_nearest() {
        // Drag up-and-right, closer to straight up
        let snap = resolve_snap(Vec2::ZERO, Vec2::new(30.0, 90.0), &targets()).unwrap();
        assert_eq!(snap.id, 2);
        // Carries the aim point for the targeting arrow endpoint
        assert_eq!(snap.pos, Vec2::new(0.0, 100.0));

        let snap = resolve_snap(Vec2::ZERO, Vec2::new(90.0, 30.0), &targets());
        assert_eq!(snap.map(|t| t.id), Some(1));
    }

    #[test]
    fn test_snap_cone_excludes_wide_angles() {
        // Straight down: every target is more than 1 radian away
        let snap = resolve_snap(Vec2::ZERO, Vec2::new(0.0, -100.0), &targets());
        assert_eq!(snap, None);
    }

    #[test]
    fn test_tie_keeps_first_target() {
        let stacked = vec![
            AimPoint {
                id: 7,
                pos: Vec2::new(50.0, 0.0),
            },
            AimPoint {
                id: 8,
                pos: Vec2::new(200.0, 0.0),
            },
        ];
        let snap = resolve_snap(Vec2::ZERO, Vec2::new(80.0, 0.0), &stacked);
        assert_eq!(snap.map(|t| t.id), Some(7));
    }

    #[test]
    fn test_wraparound_angles() {
        // Drag just below the negative-x axis should still snap to a target
        // just above it
        let t = vec![AimPoint {
            id: 4,
            pos: Vec2::new(-100.0, 5.0),
        }];
        let snap = resolve_snap(Vec2::ZERO, Vec2::new(-100.0, -5.0), &t);
        assert_eq!(snap.map(|x| x.id), Some(4));
    }

    fn game() -> GameState {
        let mut state = GameState::new(GameConfig::default(), Progress::default(), 11);
        state.set_mode(Mode::Normal);
        state
    }

    #[test]
    fn test_locked_weapon_refuses_drag() {
        let mut state = game();
        state.tutorial.locked.insert(1);
        assert!(!state.begin_drag(1, Vec2::ZERO));
        assert!(state.begin_drag(0, Vec2::ZERO));
    }

    #[test]
    fn test_short_release_cancels() {
        let mut state = game();
        let enemy_id = state.enemies[0].id;
        let points = vec![AimPoint {
            id: enemy_id,
            pos: Vec2::new(0.0, 200.0),
        }];
        let hp = state.enemies[0].hp;

        assert!(state.begin_drag(0, Vec2::ZERO));
        state.update_drag(Vec2::new(0.0, 40.0), &points);
        assert_eq!(state.drag_snap_target(), Some(enemy_id));
        // Snapped but under the fire threshold
        assert!(!state.end_drag(&points));
        assert_eq!(state.enemies[0].hp, hp);
        assert!(state.is_weapon_ready(0));
    }

    #[test]
    fn test_committed_release_fires() {
        let mut state = game();
        let enemy_id = state.enemies[0].id;
        let points = vec![AimPoint {
            id: enemy_id,
            pos: Vec2::new(0.0, 200.0),
        }];
        let hp = state.enemies[0].hp;

        assert!(state.begin_drag(0, Vec2::ZERO));
        state.update_drag(Vec2::new(0.0, 120.0), &points);
        assert!(state.end_drag(&points));
        assert_eq!(state.enemies[0].hp, hp - 1);
        assert!(!state.drag.is_active());
        // Firing starts the weapon's cooldown
        assert!(!state.is_weapon_ready(0));
    }

    #[test]
    fn test_cooling_weapon_refuses_drag() {
        let mut state = game();
        let enemy_id = state.enemies[0].id;
        let points = vec![AimPoint {
            id: enemy_id,
            pos: Vec2::new(0.0, 200.0),
        }];
        state.begin_drag(0, Vec2::ZERO);
        state.update_drag(Vec2::new(0.0, 120.0), &points);
        state.end_drag(&points);

        assert!(!state.begin_drag(0, Vec2::ZERO));
    }
}
