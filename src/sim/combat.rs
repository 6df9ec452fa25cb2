//! Combat resolution
//!
//! The arithmetic heart of the game: a weapon is a divisor, and a hit only
//! lands when the enemy's HP is evenly divisible by it. These are pure
//! functions; the state machine applies the outcomes and removes enemies
//! whose resulting HP is 0.

use crate::consts::{BASE_ATTACK_INTERVAL_MS, TIMER_DISRUPT_MS};

use super::state::Enemy;

/// Result of applying a weapon divisor to an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOutcome {
    pub success: bool,
    pub new_hp: i64,
    /// Attack timer value to commit alongside the HP change
    pub new_timer: u32,
}

/// Result of advancing one enemy's counter-attack timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterOutcome {
    pub timer: u32,
    pub attacked: bool,
    pub damage: i32,
}

/// Resolve a weapon strike against an enemy.
///
/// - Divisor 1 always lands, chips one HP and shaves 1000 ms off the
///   enemy's counter-attack windup (floored at 0) without resetting it.
/// - Any other divisor lands only when it evenly divides the current HP.
///   The quotient becomes the new HP, except a quotient of exactly 1 kills
///   outright (reaching the divisor itself finishes the enemy). A landed
///   hit interrupts the windup, resetting the timer to 0.
/// - A miss changes nothing.
pub fn resolve_hit(enemy: &Enemy, divisor: i64) -> HitOutcome {
    debug_assert!(divisor > 0, "weapon divisor must be positive");

    if divisor == 1 {
        return HitOutcome {
            success: true,
            new_hp: (enemy.hp - 1).max(0),
            new_timer: enemy.attack_timer.saturating_sub(TIMER_DISRUPT_MS),
        };
    }

    if enemy.hp % divisor == 0 {
        let quotient = enemy.hp / divisor;
        HitOutcome {
            success: true,
            new_hp: if quotient == 1 { 0 } else { quotient },
            new_timer: 0,
        }
    } else {
        HitOutcome {
            success: false,
            new_hp: enemy.hp,
            new_timer: enemy.attack_timer,
        }
    }
}

/// Advance one enemy's counter-attack timer by `elapsed_ms`.
///
/// The effective interval is the enemy's override if present, else
/// 5000 ms times the wave size so cadence stays survivable in big waves.
/// An interval of 0 or less never fires; the gauge still accumulates.
pub fn resolve_counter_attack(enemy: &Enemy, elapsed_ms: u32, wave_size: u32) -> CounterOutcome {
    let interval = enemy
        .attack_interval
        .unwrap_or(BASE_ATTACK_INTERVAL_MS * wave_size.max(1) as i64);

    if interval <= 0 {
        // Disabled: the gauge still accumulates, it just never fires
        return CounterOutcome {
            timer: enemy.attack_timer.saturating_add(elapsed_ms),
            attacked: false,
            damage: 0,
        };
    }

    let timer = enemy.attack_timer.saturating_add(elapsed_ms);
    if timer as i64 >= interval {
        CounterOutcome {
            timer: 0,
            attacked: true,
            damage: enemy.damage,
        }
    } else {
        CounterOutcome {
            timer,
            attacked: false,
            damage: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enemy(hp: i64) -> Enemy {
        Enemy {
            id: 1,
            hp,
            max_hp: hp,
            attack_timer: 0,
            last_attack_at: 0,
            damage: 1,
            attack_interval: None,
            is_boss: false,
        }
    }

    #[test]
    fn test_divisor_one_always_chips() {
        for hp in [1, 2, 7, 49, 1000] {
            let result = resolve_hit(&enemy(hp), 1);
            assert!(result.success);
            assert_eq!(result.new_hp, hp - 1);
        }
        // Floors at zero
        let result = resolve_hit(&enemy(0), 1);
        assert!(result.success);
        assert_eq!(result.new_hp, 0);
    }

    #[test]
    fn test_divisor_one_disrupts_timer_without_reset() {
        let mut e = enemy(10);
        e.attack_timer = 3500;
        assert_eq!(resolve_hit(&e, 1).new_timer, 2500);

        e.attack_timer = 400;
        assert_eq!(resolve_hit(&e, 1).new_timer, 0);
    }

    #[test]
    fn test_divisible_hit_takes_quotient() {
        let result = resolve_hit(&enemy(49), 7);
        assert!(result.success);
        assert_eq!(result.new_hp, 7);
        assert_eq!(result.new_timer, 0);
    }

    #[test]
    fn test_finishing_rule() {
        // hp == divisor: the quotient would be 1, but the hit kills instead
        let result = resolve_hit(&enemy(7), 7);
        assert!(result.success);
        assert_eq!(result.new_hp, 0);
    }

    #[test]
    fn test_indivisible_hit_misses() {
        let mut e = enemy(10);
        e.attack_timer = 1234;
        let result = resolve_hit(&e, 3);
        assert!(!result.success);
        assert_eq!(result.new_hp, 10);
        assert_eq!(result.new_timer, 1234);
    }

    #[test]
    fn test_successful_hit_resets_windup() {
        let mut e = enemy(12);
        e.attack_timer = 4800;
        let result = resolve_hit(&e, 3);
        assert!(result.success);
        assert_eq!(result.new_hp, 4);
        assert_eq!(result.new_timer, 0);
    }

    #[test]
    fn test_counter_attack_cadence_scales_with_wave() {
        let mut e = enemy(10);
        e.damage = 2;

        // Wave of 1: fires at 5000 ms
        e.attack_timer = 4900;
        let result = resolve_counter_attack(&e, 100, 1);
        assert!(result.attacked);
        assert_eq!(result.timer, 0);
        assert_eq!(result.damage, 2);

        // Wave of 3: same accumulated time is well short of 15000 ms
        e.attack_timer = 4900;
        let result = resolve_counter_attack(&e, 100, 3);
        assert!(!result.attacked);
        assert_eq!(result.timer, 5000);
        assert_eq!(result.damage, 0);
    }

    #[test]
    fn test_interval_override() {
        let mut e = enemy(10);
        e.attack_interval = Some(2000);
        e.attack_timer = 1950;
        let result = resolve_counter_attack(&e, 100, 4);
        assert!(result.attacked);
    }

    #[test]
    fn test_negative_interval_disables_attacks() {
        let mut e = enemy(10);
        e.attack_interval = Some(-1);
        e.attack_timer = 123;
        let result = resolve_counter_attack(&e, 60_000, 1);
        assert!(!result.attacked);
        assert_eq!(result.damage, 0);
        // The gauge keeps filling even though it never fires
        assert_eq!(result.timer, 60_123);
    }

    #[test]
    fn test_zero_elapsed_changes_nothing() {
        let mut e = enemy(10);
        e.attack_timer = 777;
        let result = resolve_counter_attack(&e, 0, 1);
        assert!(!result.attacked);
        assert_eq!(result.timer, 777);
    }
}
