//! Weapon cooldowns and projectile launches.

use glam::DVec2;
use hecs::{Entity, World};

use rampart_core::components::{
    Enemy, Health, TargetingState, Tower, Transform, Weapon,
};
use rampart_core::events::GameEvent;
use rampart_data::GameData;

use crate::pool::{ProjectileInit, ProjectilePool};

pub fn firing_system(
    world: &mut World,
    data: &GameData,
    pool: &mut ProjectilePool,
    now_secs: f64,
    events: &mut Vec<GameEvent>,
) {
    struct Shot {
        tower: Entity,
        target: Entity,
        pos: DVec2,
        init: ProjectileInit,
    }

    let mut shots = Vec::new();
    for (entity, (tower, weapon, targeting, transform)) in world
        .query_mut::<(&Tower, &Weapon, &TargetingState, &Transform)>()
    {
        let Some(target) = targeting.current_target else {
            continue;
        };
        if !weapon.can_fire(now_secs) {
            continue;
        }
        let spec = data.tower(tower.archetype);
        shots.push(Shot {
            tower: entity,
            target,
            pos: transform.pos.to_dvec2(),
            init: ProjectileInit {
                kind: weapon.projectile_kind,
                pos: transform.pos,
                velocity: DVec2::ZERO,
                max_speed: spec.projectile_speed,
                damage: weapon.damage,
                turn_rate: spec.turn_rate,
                explosion_radius: spec.explosion_radius,
                ttl_secs: spec.projectile_ttl_secs,
                target: Some(target),
                shooter: Some(entity),
            },
        });
    }

    for mut shot in shots {
        // The target may have died since the targeting pass this tick.
        let Ok((_, transform, health)) = world
            .query_one_mut::<(&Enemy, &Transform, &Health)>(shot.target)
        else {
            continue;
        };
        if health.dead {
            continue;
        }
        let target_pos = transform.pos.to_dvec2();

        let dir = (target_pos - shot.pos).normalize_or_zero();
        let dir = if dir == DVec2::ZERO { DVec2::X } else { dir };
        shot.init.velocity = dir * shot.init.max_speed;

        let (_, exhausted) = pool.acquire(world, shot.init);
        if exhausted {
            events.push(GameEvent::PoolExhausted {
                total_allocated: pool.total_allocated() as u32,
            });
        }

        if let Ok((tower, weapon, transform)) =
            world.query_one_mut::<(&mut Tower, &mut Weapon, &mut Transform)>(shot.tower)
        {
            weapon.last_fire_secs = now_secs;
            tower.shots_fired += 1;
            transform.rotation = dir.y.atan2(dir.x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::components::{PathFollower, Projectile, Velocity};
    use rampart_core::enums::{EnemyArchetype, TargetStrategy, TowerArchetype};
    use rampart_core::types::Position;
    use crate::world_setup::spawn_tower;

    fn spawn_enemy_at(world: &mut World, x: f64, y: f64) -> Entity {
        world.spawn((
            Enemy {
                archetype: EnemyArchetype::Grunt,
                reward: 8,
            },
            Transform::at(Position::new(x, y)),
            Velocity::default(),
            Health::full(50.0),
            PathFollower::default(),
        ))
    }

    fn aim(world: &mut World, tower: Entity, target: Entity) {
        world
            .query_one_mut::<&mut TargetingState>(tower)
            .unwrap()
            .current_target = Some(target);
    }

    fn active_projectiles(world: &mut World) -> usize {
        world
            .query_mut::<&Projectile>()
            .into_iter()
            .filter(|(_, p)| p.active)
            .count()
    }

    #[test]
    fn test_fires_at_valid_target_and_respects_cooldown() {
        let mut world = World::new();
        let data = GameData::builtin();
        let mut pool = ProjectilePool::with_sizes(&mut world, 8, 4, 16);
        let mut events = Vec::new();

        let tower = spawn_tower(
            &mut world,
            &data,
            Position::new(0.0, 0.0),
            TowerArchetype::Arrow,
        );
        let enemy = spawn_enemy_at(&mut world, 100.0, 0.0);
        aim(&mut world, tower, enemy);

        firing_system(&mut world, &data, &mut pool, 0.0, &mut events);
        assert_eq!(active_projectiles(&mut world), 1);

        // Arrow fires at 2/s: still cooling down at t=0.3, ready at t=0.5.
        firing_system(&mut world, &data, &mut pool, 0.3, &mut events);
        assert_eq!(active_projectiles(&mut world), 1);
        firing_system(&mut world, &data, &mut pool, 0.5, &mut events);
        assert_eq!(active_projectiles(&mut world), 2);

        let tower_stats = world.query_one_mut::<&Tower>(tower).unwrap();
        assert_eq!(tower_stats.shots_fired, 2);
    }

    #[test]
    fn test_projectile_launched_toward_target() {
        let mut world = World::new();
        let data = GameData::builtin();
        let mut pool = ProjectilePool::with_sizes(&mut world, 8, 4, 16);
        let mut events = Vec::new();

        let tower = spawn_tower(
            &mut world,
            &data,
            Position::new(0.0, 0.0),
            TowerArchetype::Arrow,
        );
        let enemy = spawn_enemy_at(&mut world, 0.0, 120.0);
        aim(&mut world, tower, enemy);
        firing_system(&mut world, &data, &mut pool, 0.0, &mut events);

        let speed = data.tower(TowerArchetype::Arrow).projectile_speed;
        let mut found = false;
        for (_, (proj, vel)) in world.query_mut::<(&Projectile, &Velocity)>() {
            if proj.active {
                assert!(vel.x.abs() < 1e-9);
                assert!((vel.y - speed).abs() < 1e-9);
                found = true;
            }
        }
        assert!(found);
    }

    #[test]
    fn test_dead_target_not_fired_at() {
        let mut world = World::new();
        let data = GameData::builtin();
        let mut pool = ProjectilePool::with_sizes(&mut world, 8, 4, 16);
        let mut events = Vec::new();

        let tower = spawn_tower(
            &mut world,
            &data,
            Position::new(0.0, 0.0),
            TowerArchetype::Arrow,
        );
        let enemy = spawn_enemy_at(&mut world, 100.0, 0.0);
        aim(&mut world, tower, enemy);
        world.query_one_mut::<&mut Health>(enemy).unwrap().dead = true;

        firing_system(&mut world, &data, &mut pool, 0.0, &mut events);
        assert_eq!(active_projectiles(&mut world), 0);
        assert_eq!(
            world.query_one_mut::<&Tower>(tower).unwrap().shots_fired,
            0
        );
    }
}
