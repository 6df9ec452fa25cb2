//! Data-driven game content
//!
//! Everything the simulation treats as immutable input lives here: the
//! weapon table, normal-mode spawn parameters, tutorial phase enemies, the
//! tutorial step script, and the dungeon/wave tables. The defaults mirror
//! the shipped game data; a modded table can be loaded from JSON instead.

use serde::{Deserialize, Serialize};

use crate::sim::tutorial::{self, StepSpec};

/// Visual grouping tag for a weapon; the tutorial's "valid" highlight rule
/// only considers square weapons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeaponShape {
    Circle,
    Square,
}

/// One entry of the ordered weapon table. Never mutated at runtime; the
/// engine refers to weapons by their index in the table (a "slot").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponSpec {
    pub id: String,
    /// The divisor this weapon represents
    pub damage: i64,
    pub shape: WeaponShape,
    pub cooldown_ms: u64,
}

/// Randomized spawn parameters for normal mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalSpawnConfig {
    pub enemy_count_min: u32,
    pub enemy_count_max: u32,
    /// Inclusive lower HP bound
    pub hp_min: i64,
    /// Exclusive upper HP bound
    pub hp_max: i64,
    pub damage: i32,
}

/// A scripted enemy for tutorial phases and dungeon waves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpec {
    pub hp: i64,
    pub max_hp: i64,
    pub damage: i32,
    /// Counter-attack interval override (ms); negative disables attacks
    #[serde(default)]
    pub attack_interval: Option<i64>,
    #[serde(default)]
    pub boss: bool,
}

/// A dungeon: an ordered list of single-enemy waves plus world-map placement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DungeonSpec {
    pub id: u32,
    /// World-map node position (consumed by the excluded UI layer)
    pub x: f32,
    pub y: f32,
    pub waves: Vec<EnemySpec>,
}

/// Complete static content bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub weapons: Vec<WeaponSpec>,
    pub normal: NormalSpawnConfig,
    /// Tutorial phase 1 spawns a single scripted enemy
    pub tutorial_phase1: EnemySpec,
    /// Tutorial phase 2 spawns this whole list
    pub tutorial_phase2: Vec<EnemySpec>,
    pub tutorial_steps: Vec<StepSpec>,
    pub dungeons: Vec<DungeonSpec>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            weapons: vec![
                weapon("w_basic", 1, WeaponShape::Circle, 1000),
                weapon("w_2", 2, WeaponShape::Square, 3000),
                weapon("w_3", 3, WeaponShape::Square, 3000),
                weapon("w_5", 5, WeaponShape::Square, 3000),
                weapon("w_7", 7, WeaponShape::Square, 3000),
            ],
            normal: NormalSpawnConfig {
                enemy_count_min: 1,
                enemy_count_max: 3,
                hp_min: 10,
                hp_max: 100,
                damage: 1,
            },
            tutorial_phase1: EnemySpec {
                hp: 12,
                max_hp: 12,
                damage: 1,
                attack_interval: Some(-1),
                boss: false,
            },
            tutorial_phase2: vec![
                EnemySpec {
                    hp: 14,
                    max_hp: 14,
                    damage: 1,
                    attack_interval: Some(8000),
                    boss: false,
                },
                EnemySpec {
                    hp: 45,
                    max_hp: 45,
                    damage: 1,
                    attack_interval: Some(10000),
                    boss: false,
                },
            ],
            tutorial_steps: tutorial::default_script(),
            dungeons: default_dungeons(),
        }
    }
}

impl GameConfig {
    /// Parse a config bundle from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Look up a weapon slot by its content id
    pub fn weapon_slot(&self, id: &str) -> Option<usize> {
        self.weapons.iter().position(|w| w.id == id)
    }

    pub fn dungeon(&self, id: u32) -> Option<&DungeonSpec> {
        self.dungeons.iter().find(|d| d.id == id)
    }

    /// The unlock frontier cap: the highest dungeon id in the table
    pub fn max_dungeon_id(&self) -> u32 {
        self.dungeons.iter().map(|d| d.id).max().unwrap_or(0)
    }
}

fn weapon(id: &str, damage: i64, shape: WeaponShape, cooldown_ms: u64) -> WeaponSpec {
    WeaponSpec {
        id: id.to_string(),
        damage,
        shape,
        cooldown_ms,
    }
}

fn enemy(hp: i64, damage: i32, attack_interval: i64, boss: bool) -> EnemySpec {
    EnemySpec {
        hp,
        max_hp: hp,
        damage,
        attack_interval: Some(attack_interval),
        boss,
    }
}

fn default_dungeons() -> Vec<DungeonSpec> {
    vec![
        DungeonSpec {
            id: 1,
            x: 50.0,
            y: 120.0,
            waves: vec![
                enemy(8, 1, 8000, false),
                enemy(15, 1, 8000, false),
                enemy(49, 2, 12000, true),
            ],
        },
        DungeonSpec {
            id: 2,
            x: 25.0,
            y: 320.0,
            waves: vec![
                enemy(21, 1, 7000, false),
                enemy(35, 1, 7000, false),
                enemy(64, 2, 11000, true),
            ],
        },
        DungeonSpec {
            id: 3,
            x: 70.0,
            y: 520.0,
            waves: vec![
                enemy(27, 1, 7000, false),
                enemy(50, 1, 7000, false),
                enemy(63, 2, 7000, false),
                enemy(105, 2, 10000, true),
            ],
        },
        DungeonSpec {
            id: 4,
            x: 40.0,
            y: 720.0,
            waves: vec![
                enemy(42, 1, 6000, false),
                enemy(98, 2, 6000, false),
                enemy(125, 2, 6000, false),
                enemy(147, 3, 9000, true),
            ],
        },
        DungeonSpec {
            id: 5,
            x: 55.0,
            y: 920.0,
            waves: vec![
                enemy(75, 2, 6000, false),
                enemy(112, 2, 6000, false),
                enemy(135, 2, 5000, false),
                enemy(180, 3, 5000, false),
                enemy(245, 3, 9000, true),
            ],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weapon_table() {
        let config = GameConfig::default();
        let divisors: Vec<i64> = config.weapons.iter().map(|w| w.damage).collect();
        assert_eq!(divisors, vec![1, 2, 3, 5, 7]);
        assert_eq!(config.weapons[0].shape, WeaponShape::Circle);
        assert_eq!(config.weapon_slot("w_7"), Some(4));
        assert_eq!(config.weapon_slot("w_13"), None);
    }

    #[test]
    fn test_dungeon_tables_end_in_boss() {
        let config = GameConfig::default();
        assert!(!config.dungeons.is_empty());
        for dungeon in &config.dungeons {
            assert!(!dungeon.waves.is_empty());
            assert!(dungeon.waves.last().unwrap().boss);
        }
        assert_eq!(config.max_dungeon_id(), 5);
    }

    #[test]
    fn test_config_json_roundtrip() {
        let config = GameConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed = GameConfig::from_json(&json).unwrap();
        assert_eq!(parsed.weapons.len(), config.weapons.len());
        assert_eq!(parsed.dungeons.len(), config.dungeons.len());
        assert_eq!(parsed.tutorial_steps.len(), config.tutorial_steps.len());
    }
}
