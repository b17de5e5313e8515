//! Snapshot assembly: the world flattened into plain serializable views.

use hecs::World;

use rampart_core::components::{
    Enemy, Health, PathFollower, Projectile, Shield, TargetingState, Tower, Transform, Weapon,
};
use rampart_core::constants::SELL_REFUND_RATIO;
use rampart_core::enums::GamePhase;
use rampart_core::events::GameEvent;
use rampart_core::state::{
    CollisionStatsView, EnemyView, GameStateSnapshot, PoolStatsView, ProjectileView, TowerView,
    WaveProgressView,
};
use rampart_core::types::SimTime;

/// Refund for a tower with the given cumulative spend.
pub fn sell_value(invested: u32) -> u32 {
    (invested as f64 * SELL_REFUND_RATIO).floor() as u32
}

#[allow(clippy::too_many_arguments)]
pub fn build_snapshot(
    world: &mut World,
    time: SimTime,
    phase: GamePhase,
    money: u32,
    lives: u32,
    wave: WaveProgressView,
    pool: PoolStatsView,
    collision: CollisionStatsView,
    events: Vec<GameEvent>,
) -> GameStateSnapshot {
    let mut towers: Vec<TowerView> = world
        .query_mut::<(&Tower, &Transform, &Weapon, &TargetingState)>()
        .into_iter()
        .map(|(entity, (tower, transform, weapon, targeting))| TowerView {
            id: entity.to_bits().get(),
            archetype: tower.archetype,
            position: transform.pos,
            rotation: transform.rotation,
            level: tower.level,
            range: weapon.range,
            strategy: targeting.strategy,
            shots_fired: tower.shots_fired,
            kills: tower.kills,
            damage_dealt: tower.damage_dealt,
            sell_value: sell_value(tower.invested),
        })
        .collect();

    let mut enemies: Vec<EnemyView> = world
        .query_mut::<(&Enemy, &Transform, &Health, Option<&Shield>, &PathFollower)>()
        .into_iter()
        .filter(|(_, (_, _, health, _, _))| !health.dead)
        .map(|(entity, (enemy, transform, health, shield, path))| EnemyView {
            id: entity.to_bits().get(),
            archetype: enemy.archetype,
            position: transform.pos,
            rotation: transform.rotation,
            health: health.current,
            max_health: health.max,
            shield: shield.map(|s| s.current),
            waypoint_index: path.index,
        })
        .collect();

    let mut projectiles: Vec<ProjectileView> = world
        .query_mut::<(&Projectile, &Transform)>()
        .into_iter()
        .filter(|(_, (proj, _))| proj.active)
        .map(|(entity, (proj, transform))| ProjectileView {
            id: entity.to_bits().get(),
            kind: proj.kind,
            position: transform.pos,
            rotation: transform.rotation,
        })
        .collect();

    // Stable output order regardless of archetype storage order.
    towers.sort_by_key(|t| t.id);
    enemies.sort_by_key(|e| e.id);
    projectiles.sort_by_key(|p| p.id);

    GameStateSnapshot {
        time,
        phase,
        money,
        lives,
        wave,
        towers,
        enemies,
        projectiles,
        pool,
        collision,
        events,
    }
}
