//! Archetype lookup tables and their validation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use rampart_core::enums::{EnemyArchetype, ProjectileKind, TowerArchetype};

use crate::error::DataError;

/// One purchasable upgrade step for a tower archetype.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct UpgradeTier {
    pub cost: u32,
    pub damage_mult: f64,
    pub range_mult: f64,
    pub fire_rate_mult: f64,
}

/// Static parameters for a tower archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerSpec {
    pub cost: u32,
    pub damage: f64,
    pub range: f64,
    /// Shots per second.
    pub fire_rate: f64,
    pub projectile_kind: ProjectileKind,
    pub projectile_speed: f64,
    /// Homing turn rate in rad/s.
    pub turn_rate: f64,
    /// Terminal burst radius; 0 for pure direct-hit projectiles.
    pub explosion_radius: f64,
    pub projectile_ttl_secs: f64,
    pub upgrades: Vec<UpgradeTier>,
}

impl TowerSpec {
    /// Effective damage at an upgrade level (cumulative tier multipliers).
    pub fn damage_at(&self, level: u8) -> f64 {
        self.upgrades
            .iter()
            .take(level as usize)
            .fold(self.damage, |d, tier| d * tier.damage_mult)
    }

    pub fn range_at(&self, level: u8) -> f64 {
        self.upgrades
            .iter()
            .take(level as usize)
            .fold(self.range, |r, tier| r * tier.range_mult)
    }

    pub fn fire_rate_at(&self, level: u8) -> f64 {
        self.upgrades
            .iter()
            .take(level as usize)
            .fold(self.fire_rate, |f, tier| f * tier.fire_rate_mult)
    }

    pub fn max_level(&self) -> u8 {
        self.upgrades.len() as u8
    }
}

/// Optional enemy ability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Ability {
    /// Heals while alive; never past max, never revives.
    Regeneration { hp_per_sec: f64 },
    /// Absorbs damage before health; recharges over time.
    Shield { capacity: f64, recharge_per_sec: f64 },
    /// Spawns child enemies at the parent's position on death.
    SplitOnDeath { into: EnemyArchetype, count: u32 },
}

/// Static parameters for an enemy archetype.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySpec {
    pub health: f64,
    pub speed: f64,
    pub reward: u32,
    /// Damage multiplier per projectile kind. Absent kinds take full
    /// damage; below 1.0 resists, above 1.0 is a vulnerability.
    #[serde(default)]
    pub resistances: HashMap<ProjectileKind, f64>,
    #[serde(default)]
    pub abilities: Vec<Ability>,
}

impl EnemySpec {
    /// Damage multiplier applied to hits of the given projectile kind.
    pub fn damage_multiplier(&self, kind: ProjectileKind) -> f64 {
        self.resistances.get(&kind).copied().unwrap_or(1.0)
    }
}

/// The complete immutable archetype table set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameData {
    towers: HashMap<TowerArchetype, TowerSpec>,
    enemies: HashMap<EnemyArchetype, EnemySpec>,
}

impl GameData {
    /// Load tables from a JSON document and validate them.
    pub fn from_json(json: &str) -> Result<Self, DataError> {
        let data: GameData = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Look up a tower archetype. Tables are validated complete at
    /// construction, so lookups cannot fail afterwards.
    pub fn tower(&self, archetype: TowerArchetype) -> &TowerSpec {
        &self.towers[&archetype]
    }

    pub fn enemy(&self, archetype: EnemyArchetype) -> &EnemySpec {
        &self.enemies[&archetype]
    }

    /// Check every entry for out-of-range values and dangling references.
    pub fn validate(&self) -> Result<(), DataError> {
        const ALL_TOWERS: [TowerArchetype; 4] = [
            TowerArchetype::Arrow,
            TowerArchetype::Cannon,
            TowerArchetype::Frost,
            TowerArchetype::Sniper,
        ];
        const ALL_ENEMIES: [EnemyArchetype; 8] = [
            EnemyArchetype::Grunt,
            EnemyArchetype::Runner,
            EnemyArchetype::Tank,
            EnemyArchetype::Shielded,
            EnemyArchetype::Regenerator,
            EnemyArchetype::Splitter,
            EnemyArchetype::Swarmling,
            EnemyArchetype::Boss,
        ];

        for archetype in ALL_TOWERS {
            if !self.towers.contains_key(&archetype) {
                return Err(DataError::MissingArchetype {
                    archetype: format!("{archetype:?}"),
                });
            }
        }
        for archetype in ALL_ENEMIES {
            if !self.enemies.contains_key(&archetype) {
                return Err(DataError::MissingArchetype {
                    archetype: format!("{archetype:?}"),
                });
            }
        }

        for (archetype, spec) in &self.towers {
            let invalid = |field| DataError::InvalidTower {
                archetype: format!("{archetype:?}"),
                field,
            };
            if spec.cost == 0 {
                return Err(invalid("cost"));
            }
            if spec.damage <= 0.0 || !spec.damage.is_finite() {
                return Err(invalid("damage"));
            }
            if spec.range <= 0.0 || !spec.range.is_finite() {
                return Err(invalid("range"));
            }
            if spec.fire_rate <= 0.0 || !spec.fire_rate.is_finite() {
                return Err(invalid("fire_rate"));
            }
            if spec.projectile_speed <= 0.0 {
                return Err(invalid("projectile_speed"));
            }
            if spec.turn_rate <= 0.0 {
                return Err(invalid("turn_rate"));
            }
            if spec.explosion_radius < 0.0 {
                return Err(invalid("explosion_radius"));
            }
            if spec.projectile_ttl_secs <= 0.0 {
                return Err(invalid("projectile_ttl_secs"));
            }
            for tier in &spec.upgrades {
                if tier.cost == 0 {
                    return Err(invalid("upgrade cost"));
                }
                if tier.damage_mult < 1.0 || tier.range_mult < 1.0 || tier.fire_rate_mult < 1.0 {
                    return Err(invalid("upgrade multiplier"));
                }
            }
        }

        for (archetype, spec) in &self.enemies {
            let invalid = |field| DataError::InvalidEnemy {
                archetype: format!("{archetype:?}"),
                field,
            };
            if spec.health <= 0.0 || !spec.health.is_finite() {
                return Err(invalid("health"));
            }
            if spec.speed <= 0.0 || !spec.speed.is_finite() {
                return Err(invalid("speed"));
            }
            for mult in spec.resistances.values() {
                if *mult < 0.0 || !mult.is_finite() {
                    return Err(invalid("resistance"));
                }
            }
            for ability in &spec.abilities {
                match ability {
                    Ability::Regeneration { hp_per_sec } => {
                        if *hp_per_sec <= 0.0 {
                            return Err(invalid("regeneration rate"));
                        }
                    }
                    Ability::Shield {
                        capacity,
                        recharge_per_sec,
                    } => {
                        if *capacity <= 0.0 || *recharge_per_sec < 0.0 {
                            return Err(invalid("shield"));
                        }
                    }
                    Ability::SplitOnDeath { into, count } => {
                        if *count == 0 {
                            return Err(invalid("split count"));
                        }
                        if into == archetype || !self.enemies.contains_key(into) {
                            return Err(DataError::BadSplitTarget {
                                archetype: format!("{archetype:?}"),
                            });
                        }
                    }
                }
            }
        }

        Ok(())
    }

    /// The built-in default tables. Always valid.
    pub fn builtin() -> Self {
        let mut towers = HashMap::new();
        let mut enemies = HashMap::new();

        towers.insert(
            TowerArchetype::Arrow,
            TowerSpec {
                cost: 60,
                damage: 12.0,
                range: 140.0,
                fire_rate: 2.0,
                projectile_kind: ProjectileKind::Arrow,
                projectile_speed: 320.0,
                turn_rate: 8.0,
                explosion_radius: 0.0,
                projectile_ttl_secs: 1.5,
                upgrades: vec![
                    UpgradeTier {
                        cost: 70,
                        damage_mult: 1.3,
                        range_mult: 1.1,
                        fire_rate_mult: 1.15,
                    },
                    UpgradeTier {
                        cost: 110,
                        damage_mult: 1.35,
                        range_mult: 1.1,
                        fire_rate_mult: 1.2,
                    },
                    UpgradeTier {
                        cost: 170,
                        damage_mult: 1.4,
                        range_mult: 1.15,
                        fire_rate_mult: 1.25,
                    },
                ],
            },
        );
        towers.insert(
            TowerArchetype::Cannon,
            TowerSpec {
                cost: 120,
                damage: 30.0,
                range: 120.0,
                fire_rate: 0.5,
                projectile_kind: ProjectileKind::Shell,
                projectile_speed: 220.0,
                turn_rate: 3.0,
                explosion_radius: 48.0,
                projectile_ttl_secs: 2.0,
                upgrades: vec![
                    UpgradeTier {
                        cost: 140,
                        damage_mult: 1.4,
                        range_mult: 1.1,
                        fire_rate_mult: 1.1,
                    },
                    UpgradeTier {
                        cost: 220,
                        damage_mult: 1.5,
                        range_mult: 1.1,
                        fire_rate_mult: 1.1,
                    },
                ],
            },
        );
        towers.insert(
            TowerArchetype::Frost,
            TowerSpec {
                cost: 90,
                damage: 10.0,
                range: 110.0,
                fire_rate: 1.2,
                projectile_kind: ProjectileKind::Frost,
                projectile_speed: 260.0,
                turn_rate: 6.0,
                explosion_radius: 24.0,
                projectile_ttl_secs: 1.8,
                upgrades: vec![
                    UpgradeTier {
                        cost: 100,
                        damage_mult: 1.3,
                        range_mult: 1.1,
                        fire_rate_mult: 1.15,
                    },
                    UpgradeTier {
                        cost: 160,
                        damage_mult: 1.35,
                        range_mult: 1.15,
                        fire_rate_mult: 1.2,
                    },
                ],
            },
        );
        towers.insert(
            TowerArchetype::Sniper,
            TowerSpec {
                cost: 180,
                damage: 80.0,
                range: 260.0,
                fire_rate: 0.4,
                projectile_kind: ProjectileKind::Bolt,
                projectile_speed: 500.0,
                turn_rate: 10.0,
                explosion_radius: 0.0,
                projectile_ttl_secs: 1.2,
                upgrades: vec![
                    UpgradeTier {
                        cost: 200,
                        damage_mult: 1.5,
                        range_mult: 1.1,
                        fire_rate_mult: 1.1,
                    },
                    UpgradeTier {
                        cost: 320,
                        damage_mult: 1.6,
                        range_mult: 1.1,
                        fire_rate_mult: 1.15,
                    },
                ],
            },
        );

        enemies.insert(
            EnemyArchetype::Grunt,
            EnemySpec {
                health: 50.0,
                speed: 45.0,
                reward: 8,
                resistances: HashMap::new(),
                abilities: vec![],
            },
        );
        enemies.insert(
            EnemyArchetype::Runner,
            EnemySpec {
                health: 30.0,
                speed: 85.0,
                reward: 10,
                resistances: HashMap::from([(ProjectileKind::Shell, 0.8)]),
                abilities: vec![],
            },
        );
        enemies.insert(
            EnemyArchetype::Tank,
            EnemySpec {
                health: 160.0,
                speed: 28.0,
                reward: 20,
                resistances: HashMap::from([
                    (ProjectileKind::Arrow, 0.5),
                    (ProjectileKind::Bolt, 0.75),
                ]),
                abilities: vec![],
            },
        );
        enemies.insert(
            EnemyArchetype::Shielded,
            EnemySpec {
                health: 70.0,
                speed: 40.0,
                reward: 18,
                resistances: HashMap::from([(ProjectileKind::Frost, 0.8)]),
                abilities: vec![Ability::Shield {
                    capacity: 40.0,
                    recharge_per_sec: 4.0,
                }],
            },
        );
        enemies.insert(
            EnemyArchetype::Regenerator,
            EnemySpec {
                health: 90.0,
                speed: 38.0,
                reward: 16,
                resistances: HashMap::new(),
                abilities: vec![Ability::Regeneration { hp_per_sec: 6.0 }],
            },
        );
        enemies.insert(
            EnemyArchetype::Splitter,
            EnemySpec {
                health: 80.0,
                speed: 42.0,
                reward: 14,
                resistances: HashMap::new(),
                abilities: vec![Ability::SplitOnDeath {
                    into: EnemyArchetype::Swarmling,
                    count: 3,
                }],
            },
        );
        enemies.insert(
            EnemyArchetype::Swarmling,
            EnemySpec {
                health: 15.0,
                speed: 70.0,
                reward: 2,
                resistances: HashMap::new(),
                abilities: vec![],
            },
        );
        enemies.insert(
            EnemyArchetype::Boss,
            EnemySpec {
                health: 900.0,
                speed: 22.0,
                reward: 150,
                resistances: HashMap::from([
                    (ProjectileKind::Arrow, 0.7),
                    (ProjectileKind::Frost, 0.5),
                    (ProjectileKind::Shell, 0.8),
                    (ProjectileKind::Bolt, 0.8),
                ]),
                abilities: vec![Ability::Regeneration { hp_per_sec: 10.0 }],
            },
        );

        let data = GameData { towers, enemies };
        debug_assert!(data.validate().is_ok());
        data
    }
}
