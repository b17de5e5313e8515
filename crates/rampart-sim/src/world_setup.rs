//! Entity construction from archetype tables.

use hecs::{Entity, World};

use rampart_core::components::{
    Enemy, Health, PathFollower, Regeneration, Shield, Tower, TargetingState, Transform, Velocity,
    Weapon,
};
use rampart_core::constants::{WORLD_HEIGHT, WORLD_WIDTH};
use rampart_core::enums::{EnemyArchetype, TargetStrategy, TowerArchetype};
use rampart_core::types::Position;
use rampart_data::{Ability, GameData};

/// Spawn a tower at `pos`. Stats come from the archetype table at level 0.
pub fn spawn_tower(
    world: &mut World,
    data: &GameData,
    pos: Position,
    archetype: TowerArchetype,
) -> Entity {
    let spec = data.tower(archetype);
    world.spawn((
        Tower {
            archetype,
            level: 0,
            shots_fired: 0,
            kills: 0,
            damage_dealt: 0.0,
            invested: spec.cost,
        },
        Transform::at(pos),
        Weapon {
            damage: spec.damage,
            range: spec.range,
            fire_rate: spec.fire_rate,
            projectile_kind: spec.projectile_kind,
            last_fire_secs: f64::NEG_INFINITY,
        },
        TargetingState::new(spec.range, TargetStrategy::Nearest),
    ))
}

/// Spawn an enemy at the head of `path`, with health scaled by the wave
/// difficulty multiplier. Ability components are attached per the table.
pub fn spawn_enemy(
    world: &mut World,
    data: &GameData,
    archetype: EnemyArchetype,
    path: Vec<Position>,
    difficulty_mult: f64,
) -> Entity {
    let spec = data.enemy(archetype);
    let start = path.first().copied().unwrap_or_default();
    let scaled_health = spec.health * difficulty_mult;

    let entity = world.spawn((
        Enemy {
            archetype,
            reward: spec.reward,
        },
        Transform::at(start),
        Velocity {
            x: 0.0,
            y: 0.0,
            max_speed: spec.speed,
            friction: 0.0,
        },
        Health::full(scaled_health),
        PathFollower::new(path, spec.speed),
    ));

    for ability in &spec.abilities {
        match ability {
            Ability::Regeneration { hp_per_sec } => {
                let _ = world.insert_one(
                    entity,
                    Regeneration {
                        hp_per_sec: *hp_per_sec,
                    },
                );
            }
            Ability::Shield {
                capacity,
                recharge_per_sec,
            } => {
                let _ = world.insert_one(entity, Shield::full(*capacity, *recharge_per_sec));
            }
            // Split-on-death is resolved at kill time from the table, not
            // carried as a component.
            Ability::SplitOnDeath { .. } => {}
        }
    }

    entity
}

/// The built-in lane: a left-to-right S-curve across the playfield.
pub fn default_path() -> Vec<Position> {
    let w = WORLD_WIDTH;
    let h = WORLD_HEIGHT;
    vec![
        Position { x: 0.0, y: h * 0.25 },
        Position { x: w * 0.35, y: h * 0.25 },
        Position { x: w * 0.35, y: h * 0.75 },
        Position { x: w * 0.7, y: h * 0.75 },
        Position { x: w * 0.7, y: h * 0.4 },
        Position { x: w, y: h * 0.4 },
    ]
}
