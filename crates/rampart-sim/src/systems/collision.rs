//! Projectile impact resolution and the enemy damage pipeline.
//!
//! Broad-phase candidates come from the spatial grid (rebuilt after
//! movement, so positions are current). Damage flows through resistance,
//! then shield, then health; death side effects run exactly once per enemy.
//! A projectile resolves on contact, on TTL expiry, or on losing its
//! guidance target; the last two detonate in place when the projectile
//! carries a burst radius.

use glam::DVec2;
use hecs::{Entity, World};

use rampart_core::components::{
    Enemy, Guidance, Health, PathFollower, Projectile, Shield, Tower, Transform,
};
use rampart_core::constants::{COLLISION_QUERY_MARGIN, CONTACT_RADIUS};
use rampart_core::enums::ProjectileKind;
use rampart_core::events::GameEvent;
use rampart_core::state::CollisionStatsView;
use rampart_data::{Ability, GameData};

use crate::pool::ProjectilePool;
use crate::spatial::SpatialHashGrid;
use crate::systems::wave_director::WaveDirector;
use crate::world_setup::spawn_enemy;

struct Impact {
    entity: Entity,
    pos: DVec2,
    kind: ProjectileKind,
    damage: f64,
    explosion_radius: f64,
    target: Option<Entity>,
    shooter: Option<Entity>,
    expired: bool,
}

#[allow(clippy::too_many_arguments)]
pub fn collision_system(
    world: &mut World,
    data: &GameData,
    grid: &mut SpatialHashGrid,
    pool: &mut ProjectilePool,
    director: &mut WaveDirector,
    dt: f64,
    money: &mut u32,
    stats: &mut CollisionStatsView,
    events: &mut Vec<GameEvent>,
    despawn_queue: &mut Vec<Entity>,
) {
    // Tick down TTLs and collect the live projectiles to resolve.
    let mut impacts = Vec::new();
    for (entity, (proj, guidance, transform)) in
        world.query_mut::<(&Projectile, &mut Guidance, &Transform)>()
    {
        if !proj.active || guidance.exploded {
            continue;
        }
        guidance.ttl_secs -= dt;
        impacts.push(Impact {
            entity,
            pos: transform.pos.to_dvec2(),
            kind: proj.kind,
            damage: guidance.damage,
            explosion_radius: guidance.explosion_radius,
            target: guidance.target,
            shooter: guidance.shooter,
            expired: guidance.ttl_secs <= 0.0,
        });
    }

    let mut hits = Vec::new();
    for impact in impacts {
        // Recounted per impact: kills by an earlier projectile this pass
        // must not inflate the skip metric.
        let live_enemies = world
            .query_mut::<(&Enemy, &Health)>()
            .into_iter()
            .filter(|(_, (_, h))| !h.dead)
            .count() as u64;

        let query_radius =
            impact.explosion_radius.max(CONTACT_RADIUS) + COLLISION_QUERY_MARGIN;
        grid.query_radius(impact.pos, query_radius, &mut hits);
        stats.checks_skipped += live_enemies.saturating_sub(hits.len() as u64);

        // Narrow phase: nearest live enemy in contact (strictly inside the
        // contact radius), preferring the guided target on distance ties.
        let mut contact: Option<(Entity, f64)> = None;
        for entry in &hits {
            stats.checks_performed += 1;
            let dist = entry.pos.distance(impact.pos);
            if dist >= CONTACT_RADIUS || !is_live_enemy(world, entry.entity) {
                continue;
            }
            let preferred = impact.target == Some(entry.entity);
            let better = match contact {
                None => true,
                Some((_, best)) => dist < best || (preferred && dist <= best),
            };
            if better {
                contact = Some((entry.entity, dist));
            }
        }

        let mut damage_done = 0.0;
        let mut kills = 0u32;

        if let Some((enemy, _)) = contact {
            stats.collisions_detected += 1;
            if let Some(outcome) =
                apply_damage(world, data, enemy, impact.damage, impact.kind)
            {
                damage_done += outcome.applied;
                if outcome.killed {
                    kills += 1;
                    resolve_death(world, data, director, money, events, despawn_queue, enemy);
                }
            }
            if impact.explosion_radius > 0.0 {
                let (d, k) = area_burst(
                    world,
                    data,
                    director,
                    money,
                    events,
                    despawn_queue,
                    stats,
                    &hits,
                    &impact,
                    Some(enemy),
                );
                damage_done += d;
                kills += k;
            }
            pool.release(world, impact.entity, despawn_queue);
        } else {
            // No contact: the projectile still resolves when its TTL ran
            // out or when its guidance target is gone. Either way shells
            // detonate where they are; plain shots just go back to the pool.
            let target_lost = impact
                .target
                .is_some_and(|target| !is_live_enemy(world, target));
            if impact.expired || target_lost {
                if impact.explosion_radius > 0.0 {
                    let (d, k) = area_burst(
                        world,
                        data,
                        director,
                        money,
                        events,
                        despawn_queue,
                        stats,
                        &hits,
                        &impact,
                        None,
                    );
                    damage_done += d;
                    kills += k;
                }
                pool.release(world, impact.entity, despawn_queue);
            }
        }

        if damage_done > 0.0 || kills > 0 {
            if let Some(shooter) = impact.shooter {
                if let Ok(tower) = world.query_one_mut::<&mut Tower>(shooter) {
                    tower.damage_dealt += damage_done;
                    tower.kills += kills;
                }
            }
        }
    }
}

fn is_live_enemy(world: &World, entity: Entity) -> bool {
    world
        .entity(entity)
        .ok()
        .and_then(|e| e.get::<&Health>().map(|h| !h.dead && e.has::<Enemy>()))
        .unwrap_or(false)
}

struct DamageOutcome {
    /// Damage actually absorbed by shield plus health, after resistance.
    applied: f64,
    killed: bool,
}

/// Run one hit through the damage pipeline: resistance multiplier, shield
/// absorption, then health. Marks `dead` when health is depleted; the flag
/// is terminal and double kills are impossible.
fn apply_damage(
    world: &mut World,
    data: &GameData,
    enemy: Entity,
    base_damage: f64,
    kind: ProjectileKind,
) -> Option<DamageOutcome> {
    let Ok((health, shield, enemy_id)) =
        world.query_one_mut::<(&mut Health, Option<&mut Shield>, &Enemy)>(enemy)
    else {
        return None;
    };
    if health.dead {
        return None;
    }

    let mut damage = base_damage * data.enemy(enemy_id.archetype).damage_multiplier(kind);
    let mut applied = 0.0;
    if let Some(shield) = shield {
        let absorbed = shield.current.min(damage);
        shield.current -= absorbed;
        damage -= absorbed;
        applied += absorbed;
    }
    let health_damage = health.current.min(damage);
    health.current -= damage;
    applied += health_damage;

    let killed = health.current <= 0.0;
    if killed {
        health.current = 0.0;
        health.dead = true;
    }
    Some(DamageOutcome { applied, killed })
}

/// Damage every live enemy within the burst radius, with linear falloff
/// rounded up so the rim always takes at least one point.
#[allow(clippy::too_many_arguments)]
fn area_burst(
    world: &mut World,
    data: &GameData,
    director: &mut WaveDirector,
    money: &mut u32,
    events: &mut Vec<GameEvent>,
    despawn_queue: &mut Vec<Entity>,
    stats: &mut CollisionStatsView,
    hits: &[crate::spatial::GridEntry],
    impact: &Impact,
    exclude: Option<Entity>,
) -> (f64, u32) {
    let radius = impact.explosion_radius;
    let mut damage_done = 0.0;
    let mut kills = 0u32;
    for entry in hits {
        if exclude == Some(entry.entity) {
            continue;
        }
        stats.checks_performed += 1;
        let dist = entry.pos.distance(impact.pos);
        if dist > radius {
            continue;
        }
        let falloff = (impact.damage * (1.0 - dist / radius)).ceil();
        let Some(outcome) = apply_damage(world, data, entry.entity, falloff, impact.kind) else {
            continue;
        };
        damage_done += outcome.applied;
        if outcome.killed {
            kills += 1;
            resolve_death(world, data, director, money, events, despawn_queue, entry.entity);
        }
    }
    (damage_done, kills)
}

/// Death side effects: reward, bookkeeping, splitter children, corpse
/// removal. Called exactly once per enemy, guarded by the `dead` flag set
/// in `apply_damage`.
fn resolve_death(
    world: &mut World,
    data: &GameData,
    director: &mut WaveDirector,
    money: &mut u32,
    events: &mut Vec<GameEvent>,
    despawn_queue: &mut Vec<Entity>,
    enemy: Entity,
) {
    let Ok((enemy_id, transform, path)) =
        world.query_one_mut::<(&Enemy, &Transform, Option<&PathFollower>)>(enemy)
    else {
        return;
    };
    let archetype = enemy_id.archetype;
    let reward = enemy_id.reward;
    let pos = transform.pos;
    let path_state = path.map(|p| (p.waypoints.clone(), p.index));

    *money = money.saturating_add(reward);
    director.note_kill();
    events.push(GameEvent::EnemyKilled { archetype, reward });
    despawn_queue.push(enemy);

    // A dying splitter drops children that resume the parent's path.
    for ability in &data.enemy(archetype).abilities {
        if let Ability::SplitOnDeath { into, count } = ability {
            for _ in 0..*count {
                let child = spawn_enemy(
                    world,
                    data,
                    *into,
                    path_state
                        .as_ref()
                        .map(|(wps, _)| wps.clone())
                        .unwrap_or_default(),
                    director.difficulty(),
                );
                if let (Some((_, index)), Ok((child_path, child_transform))) = (
                    path_state.as_ref(),
                    world.query_one_mut::<(&mut PathFollower, &mut Transform)>(child),
                ) {
                    child_path.index = *index;
                    child_transform.pos = pos;
                }
            }
            director.note_split_children(*count);
            events.push(GameEvent::EnemySplit {
                archetype,
                children: *count,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::components::Velocity;
    use rampart_core::constants::ENTITY_RADIUS_PAD;
    use rampart_core::enums::EnemyArchetype;
    use rampart_core::types::Position;
    use crate::pool::ProjectileInit;
    use crate::world_setup::default_path;

    struct Rig {
        world: World,
        data: GameData,
        grid: SpatialHashGrid,
        pool: ProjectilePool,
        director: WaveDirector,
        money: u32,
        stats: CollisionStatsView,
        events: Vec<GameEvent>,
        despawn: Vec<Entity>,
    }

    impl Rig {
        fn new() -> Self {
            let mut world = World::new();
            let pool = ProjectilePool::with_sizes(&mut world, 16, 8, 32);
            Self {
                world,
                data: GameData::builtin(),
                grid: SpatialHashGrid::default(),
                pool,
                director: WaveDirector::new(default_path()),
                money: 0,
                stats: CollisionStatsView::default(),
                events: Vec::new(),
                despawn: Vec::new(),
            }
        }

        fn spawn_enemy_at(&mut self, archetype: EnemyArchetype, x: f64, y: f64) -> Entity {
            let e = spawn_enemy(&mut self.world, &self.data, archetype, default_path(), 1.0);
            self.world
                .query_one_mut::<&mut Transform>(e)
                .unwrap()
                .pos = Position::new(x, y);
            e
        }

        fn fire_at(&mut self, x: f64, y: f64, init: ProjectileInit) -> Entity {
            let mut init = init;
            init.pos = Position::new(x, y);
            let (e, _) = self.pool.acquire(&mut self.world, init);
            e
        }

        fn rebuild_grid(&mut self) {
            self.grid.clear();
            for (entity, (_, transform, health)) in
                self.world.query_mut::<(&Enemy, &Transform, &Health)>()
            {
                if !health.dead {
                    self.grid
                        .insert(entity, transform.pos.to_dvec2(), ENTITY_RADIUS_PAD);
                }
            }
        }

        fn resolve(&mut self, dt: f64) {
            self.rebuild_grid();
            collision_system(
                &mut self.world,
                &self.data,
                &mut self.grid,
                &mut self.pool,
                &mut self.director,
                dt,
                &mut self.money,
                &mut self.stats,
                &mut self.events,
                &mut self.despawn,
            );
        }
    }

    fn arrow(damage: f64) -> ProjectileInit {
        ProjectileInit {
            kind: ProjectileKind::Arrow,
            pos: Position::default(),
            velocity: glam::DVec2::ZERO,
            max_speed: 300.0,
            damage,
            turn_rate: 8.0,
            explosion_radius: 0.0,
            ttl_secs: 2.0,
            target: None,
            shooter: None,
        }
    }

    fn shell(damage: f64, radius: f64) -> ProjectileInit {
        ProjectileInit {
            kind: ProjectileKind::Shell,
            explosion_radius: radius,
            ..arrow(damage)
        }
    }

    #[test]
    fn test_direct_hit_applies_full_damage() {
        let mut rig = Rig::new();
        let enemy = rig.spawn_enemy_at(EnemyArchetype::Grunt, 100.0, 100.0);
        rig.fire_at(105.0, 100.0, arrow(12.0));
        rig.resolve(1.0 / 60.0);

        let health = rig.world.query_one_mut::<&Health>(enemy).unwrap();
        assert_eq!(health.current, 50.0 - 12.0);
        assert_eq!(rig.stats.collisions_detected, 1);
        assert_eq!(rig.pool.active_count(), 0, "projectile released on hit");
    }

    #[test]
    fn test_resistance_halves_arrow_damage_on_tank() {
        let mut rig = Rig::new();
        let tank = rig.spawn_enemy_at(EnemyArchetype::Tank, 100.0, 100.0);
        rig.fire_at(102.0, 100.0, arrow(40.0));
        rig.resolve(1.0 / 60.0);

        let health = rig.world.query_one_mut::<&Health>(tank).unwrap();
        assert_eq!(health.current, 160.0 - 20.0);
    }

    #[test]
    fn test_shield_absorbs_before_health() {
        let mut rig = Rig::new();
        let shielded = rig.spawn_enemy_at(EnemyArchetype::Shielded, 100.0, 100.0);
        // Shielded: 40 shield, resists nothing against arrows.
        rig.fire_at(102.0, 100.0, arrow(30.0));
        rig.resolve(1.0 / 60.0);

        let (health, shield) = rig
            .world
            .query_one_mut::<(&Health, &Shield)>(shielded)
            .unwrap();
        assert_eq!(shield.current, 10.0);
        assert_eq!(health.current, 70.0, "health untouched while shielded");
    }

    #[test]
    fn test_overflow_damage_passes_through_shield() {
        let mut rig = Rig::new();
        let shielded = rig.spawn_enemy_at(EnemyArchetype::Shielded, 100.0, 100.0);
        rig.fire_at(102.0, 100.0, arrow(55.0));
        rig.resolve(1.0 / 60.0);

        let (health, shield) = rig
            .world
            .query_one_mut::<(&Health, &Shield)>(shielded)
            .unwrap();
        assert_eq!(shield.current, 0.0);
        assert_eq!(health.current, 70.0 - 15.0);
    }

    #[test]
    fn test_kill_grants_reward_exactly_once() {
        let mut rig = Rig::new();
        let enemy = rig.spawn_enemy_at(EnemyArchetype::Grunt, 100.0, 100.0);
        // Two projectiles in contact on the same tick; only the first kill
        // pays out.
        rig.fire_at(102.0, 100.0, arrow(60.0));
        rig.fire_at(98.0, 100.0, arrow(60.0));
        rig.resolve(1.0 / 60.0);

        assert_eq!(rig.money, 8);
        let kills = rig
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyKilled { .. }))
            .count();
        assert_eq!(kills, 1);
        assert!(rig.despawn.contains(&enemy));
    }

    #[test]
    fn test_burst_falloff_rounds_up() {
        let mut rig = Rig::new();
        // Direct target at the impact point, bystander halfway out.
        let direct = rig.spawn_enemy_at(EnemyArchetype::Grunt, 100.0, 100.0);
        let bystander = rig.spawn_enemy_at(EnemyArchetype::Grunt, 124.0, 100.0);
        rig.fire_at(100.0, 100.0, shell(30.0, 48.0));
        rig.resolve(1.0 / 60.0);

        let direct_health = rig.world.query_one_mut::<&Health>(direct).unwrap().current;
        assert_eq!(direct_health, 50.0 - 30.0, "direct hit takes full damage");

        // d = 24, R = 48: ceil(30 * 0.5) = 15.
        let bystander_health = rig
            .world
            .query_one_mut::<&Health>(bystander)
            .unwrap()
            .current;
        assert_eq!(bystander_health, 50.0 - 15.0);
    }

    #[test]
    fn test_rim_of_burst_takes_at_least_one_point() {
        let mut rig = Rig::new();
        let rim = rig.spawn_enemy_at(EnemyArchetype::Grunt, 147.0, 100.0);
        let mut init = shell(30.0, 48.0);
        init.ttl_secs = 0.01;
        rig.fire_at(100.0, 100.0, init);
        rig.resolve(1.0 / 60.0);

        // d = 47, R = 48: ceil(30 * (1/48)) = 1.
        let health = rig.world.query_one_mut::<&Health>(rim).unwrap().current;
        assert_eq!(health, 49.0);
    }

    #[test]
    fn test_ttl_expiry_detonates_shells() {
        let mut rig = Rig::new();
        let enemy = rig.spawn_enemy_at(EnemyArchetype::Grunt, 120.0, 100.0);
        let mut init = shell(30.0, 48.0);
        init.ttl_secs = 0.01;
        rig.fire_at(100.0, 100.0, init);
        rig.resolve(1.0 / 60.0);

        let health = rig.world.query_one_mut::<&Health>(enemy).unwrap().current;
        assert!(health < 50.0, "expiring shell bursts in place");
        assert_eq!(rig.pool.active_count(), 0);
    }

    #[test]
    fn test_ttl_expiry_of_plain_arrow_just_releases() {
        let mut rig = Rig::new();
        let enemy = rig.spawn_enemy_at(EnemyArchetype::Grunt, 120.0, 100.0);
        let mut init = arrow(30.0);
        init.ttl_secs = 0.01;
        rig.fire_at(100.0, 100.0, init);
        rig.resolve(1.0 / 60.0);

        let health = rig.world.query_one_mut::<&Health>(enemy).unwrap().current;
        assert_eq!(health, 50.0);
        assert_eq!(rig.pool.active_count(), 0);
    }

    #[test]
    fn test_target_loss_resolves_projectile() {
        let mut rig = Rig::new();
        let mark = rig.spawn_enemy_at(EnemyArchetype::Grunt, 100.0, 100.0);
        let bystander = rig.spawn_enemy_at(EnemyArchetype::Grunt, 400.0, 100.0);
        rig.world.query_one_mut::<&mut Health>(mark).unwrap().dead = true;

        // Plenty of TTL left; losing the mark alone must end the flight.
        let mut init = arrow(12.0);
        init.target = Some(mark);
        init.ttl_secs = 1.5;
        rig.fire_at(300.0, 100.0, init);
        rig.resolve(1.0 / 60.0);

        assert_eq!(rig.pool.active_count(), 0, "released on target loss");
        let health = rig.world.query_one_mut::<&Health>(bystander).unwrap();
        assert_eq!(health.current, 50.0, "stray arrow harms nobody");
    }

    #[test]
    fn test_target_loss_detonates_shell_in_place() {
        let mut rig = Rig::new();
        let mark = rig.spawn_enemy_at(EnemyArchetype::Grunt, 100.0, 100.0);
        let bystander = rig.spawn_enemy_at(EnemyArchetype::Grunt, 320.0, 100.0);
        rig.world.query_one_mut::<&mut Health>(mark).unwrap().dead = true;

        let mut init = shell(30.0, 48.0);
        init.target = Some(mark);
        init.ttl_secs = 1.5;
        rig.fire_at(300.0, 100.0, init);
        rig.resolve(1.0 / 60.0);

        assert_eq!(rig.pool.active_count(), 0);
        // d = 20, R = 48: ceil(30 * (28/48)) = 18.
        let health = rig.world.query_one_mut::<&Health>(bystander).unwrap();
        assert_eq!(health.current, 50.0 - 18.0);
    }

    #[test]
    fn test_contact_requires_strictly_closer_than_radius() {
        let mut rig = Rig::new();
        // Exactly on the contact boundary: not a hit.
        let enemy = rig.spawn_enemy_at(EnemyArchetype::Grunt, 110.0, 100.0);
        let mut init = arrow(12.0);
        init.target = Some(enemy);
        rig.fire_at(100.0, 100.0, init);
        rig.resolve(1.0 / 60.0);

        assert_eq!(rig.world.query_one_mut::<&Health>(enemy).unwrap().current, 50.0);
        assert_eq!(rig.pool.active_count(), 1, "still in flight");
        assert_eq!(rig.stats.collisions_detected, 0);
    }

    #[test]
    fn test_splitter_spawns_children_on_death() {
        let mut rig = Rig::new();
        rig.spawn_enemy_at(EnemyArchetype::Splitter, 100.0, 100.0);
        rig.fire_at(102.0, 100.0, arrow(200.0));
        rig.resolve(1.0 / 60.0);

        let swarmlings: Vec<_> = rig
            .world
            .query_mut::<(&Enemy, &Transform)>()
            .into_iter()
            .filter(|(_, (e, _))| e.archetype == EnemyArchetype::Swarmling)
            .map(|(_, (_, t))| t.pos)
            .collect();
        assert_eq!(swarmlings.len(), 3);
        for pos in swarmlings {
            assert_eq!(pos, Position::new(100.0, 100.0), "children at parent pos");
        }
        assert!(rig
            .events
            .iter()
            .any(|e| matches!(e, GameEvent::EnemySplit { children: 3, .. })));
    }

    #[test]
    fn test_kill_attribution_reaches_shooter() {
        let mut rig = Rig::new();
        let tower = rig.world.spawn((
            Tower {
                archetype: rampart_core::enums::TowerArchetype::Arrow,
                level: 0,
                shots_fired: 1,
                kills: 0,
                damage_dealt: 0.0,
                invested: 60,
            },
            Transform::default(),
        ));
        rig.spawn_enemy_at(EnemyArchetype::Grunt, 100.0, 100.0);
        let mut init = arrow(60.0);
        init.shooter = Some(tower);
        rig.fire_at(102.0, 100.0, init);
        rig.resolve(1.0 / 60.0);

        let stats = rig.world.query_one_mut::<&Tower>(tower).unwrap();
        assert_eq!(stats.kills, 1);
        assert_eq!(stats.damage_dealt, 50.0, "capped at remaining health");
    }

    #[test]
    fn test_broad_phase_prunes_distant_enemies() {
        let mut rig = Rig::new();
        rig.spawn_enemy_at(EnemyArchetype::Grunt, 100.0, 100.0);
        for i in 0..20 {
            rig.spawn_enemy_at(EnemyArchetype::Grunt, 1000.0 + i as f64 * 30.0, 900.0);
        }
        rig.fire_at(102.0, 100.0, arrow(12.0));
        rig.resolve(1.0 / 60.0);

        assert!(rig.stats.checks_skipped >= 20);
        assert!(rig.stats.checks_performed < 5);
    }

    #[test]
    fn test_velocity_untouched_by_collision() {
        // Sanity: collision never writes velocities.
        let mut rig = Rig::new();
        let enemy = rig.spawn_enemy_at(EnemyArchetype::Grunt, 100.0, 100.0);
        let before = *rig.world.query_one_mut::<&Velocity>(enemy).unwrap();
        rig.fire_at(102.0, 100.0, arrow(1.0));
        rig.resolve(1.0 / 60.0);
        let after = *rig.world.query_one_mut::<&Velocity>(enemy).unwrap();
        assert_eq!(before.max_speed, after.max_speed);
    }
}
