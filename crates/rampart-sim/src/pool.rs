//! Recycling pool for projectile entities.
//!
//! Projectiles are the highest-churn entities in the simulation, so they are
//! preallocated and recycled instead of spawned and despawned every shot.
//! Parked entities stay in the world with `Projectile::active == false` and
//! are skipped by every system.
//!
//! Invariant: `active_count + free.len() == total_allocated`, and
//! `total_allocated <= max_size`. Fallback allocations made after the pool
//! hits its ceiling are tracked separately and despawned on release rather
//! than recycled.

use glam::DVec2;
use hecs::{Entity, World};
use log::warn;

use rampart_core::components::{Guidance, Projectile, Transform, Velocity};
use rampart_core::constants::{POOL_GROWTH_INCREMENT, POOL_INITIAL_SIZE, POOL_MAX_SIZE};
use rampart_core::enums::ProjectileKind;
use rampart_core::state::PoolStatsView;
use rampart_core::types::Position;

/// Everything needed to launch a projectile from a parked entity.
#[derive(Debug, Clone, Copy)]
pub struct ProjectileInit {
    pub kind: ProjectileKind,
    pub pos: Position,
    pub velocity: DVec2,
    pub max_speed: f64,
    pub damage: f64,
    pub turn_rate: f64,
    pub explosion_radius: f64,
    pub ttl_secs: f64,
    pub target: Option<Entity>,
    pub shooter: Option<Entity>,
}

#[derive(Debug)]
pub struct ProjectilePool {
    /// Parked, inactive entities ready for reuse.
    free: Vec<Entity>,
    /// Entities ever allocated through the pool (active + parked).
    total_allocated: usize,
    /// Pool entities currently in flight.
    active_count: usize,
    /// Live fallback entities allocated past the pool ceiling. Not counted
    /// in `total_allocated`.
    fallback_live: usize,
    growth_increment: usize,
    max_size: usize,
    /// Set once the first acquire past the ceiling happens, so exhaustion is
    /// reported a single time per episode.
    exhaustion_reported: bool,
}

impl ProjectilePool {
    pub fn new(world: &mut World) -> Self {
        Self::with_sizes(world, POOL_INITIAL_SIZE, POOL_GROWTH_INCREMENT, POOL_MAX_SIZE)
    }

    pub fn with_sizes(
        world: &mut World,
        initial: usize,
        growth_increment: usize,
        max_size: usize,
    ) -> Self {
        let mut pool = Self {
            free: Vec::with_capacity(max_size),
            total_allocated: 0,
            active_count: 0,
            fallback_live: 0,
            growth_increment,
            max_size,
            exhaustion_reported: false,
        };
        pool.grow(world, initial.min(max_size));
        pool
    }

    fn grow(&mut self, world: &mut World, count: usize) {
        for _ in 0..count {
            let entity = world.spawn((
                Projectile {
                    kind: ProjectileKind::Arrow,
                    pooled: true,
                    active: false,
                },
                Transform::default(),
                Velocity::default(),
                Guidance::default(),
            ));
            self.free.push(entity);
            self.total_allocated += 1;
        }
    }

    /// Take a projectile from the pool and arm it. Grows the pool when empty
    /// and falls back to a direct spawn once the ceiling is reached, so an
    /// acquire never fails.
    ///
    /// Returns the entity and whether pool capacity was exhausted on this
    /// call (the caller emits the telemetry event).
    pub fn acquire(&mut self, world: &mut World, init: ProjectileInit) -> (Entity, bool) {
        if self.free.is_empty() && self.total_allocated < self.max_size {
            let step = self
                .growth_increment
                .min(self.max_size - self.total_allocated);
            self.grow(world, step);
        }

        if let Some(entity) = self.free.pop() {
            self.arm(world, entity, init, true);
            self.active_count += 1;
            return (entity, false);
        }

        // Ceiling reached with nothing parked. Spawn outside the pool so
        // gameplay continues; the entity is despawned on release.
        let first_exhaustion = !self.exhaustion_reported;
        if first_exhaustion {
            warn!(
                "projectile pool exhausted at {} entities, falling back to direct spawns",
                self.total_allocated
            );
            self.exhaustion_reported = true;
        }
        let entity = world.spawn((
            Projectile {
                kind: init.kind,
                pooled: false,
                active: false,
            },
            Transform::default(),
            Velocity::default(),
            Guidance::default(),
        ));
        self.arm(world, entity, init, false);
        self.fallback_live += 1;
        (entity, first_exhaustion)
    }

    fn arm(&mut self, world: &mut World, entity: Entity, init: ProjectileInit, pooled: bool) {
        if let Ok((proj, transform, vel, guidance)) = world.query_one_mut::<(
            &mut Projectile,
            &mut Transform,
            &mut Velocity,
            &mut Guidance,
        )>(entity)
        {
            *proj = Projectile {
                kind: init.kind,
                pooled,
                active: true,
            };
            *transform = Transform::at(init.pos);
            transform.rotation = init.velocity.y.atan2(init.velocity.x);
            *vel = Velocity {
                x: init.velocity.x,
                y: init.velocity.y,
                max_speed: init.max_speed,
                friction: 0.0,
            };
            *guidance = Guidance {
                target: init.target,
                shooter: init.shooter,
                damage: init.damage,
                turn_rate: init.turn_rate,
                explosion_radius: init.explosion_radius,
                ttl_secs: init.ttl_secs,
                exploded: false,
            };
        }
    }

    /// Return a projectile to the pool. Pooled entities are reset and
    /// parked; fallback entities are queued for despawn. Releasing an
    /// already-inactive entity is a no-op.
    pub fn release(&mut self, world: &mut World, entity: Entity, despawn_queue: &mut Vec<Entity>) {
        let Ok(proj) = world.query_one_mut::<&mut Projectile>(entity) else {
            return;
        };
        if !proj.active {
            return;
        }
        proj.active = false;
        let pooled = proj.pooled;

        if pooled {
            if let Ok((transform, vel, guidance)) =
                world.query_one_mut::<(&mut Transform, &mut Velocity, &mut Guidance)>(entity)
            {
                *transform = Transform::default();
                *vel = Velocity::default();
                *guidance = Guidance::default();
            }
            self.free.push(entity);
            self.active_count = self.active_count.saturating_sub(1);
        } else {
            despawn_queue.push(entity);
            self.fallback_live = self.fallback_live.saturating_sub(1);
        }
    }

    pub fn active_count(&self) -> usize {
        self.active_count
    }

    pub fn total_allocated(&self) -> usize {
        self.total_allocated
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    pub fn stats(&self) -> PoolStatsView {
        PoolStatsView {
            active: self.active_count as u32,
            pooled: self.free.len() as u32,
            total: self.total_allocated as u32,
            utilization: if self.total_allocated == 0 {
                0.0
            } else {
                self.active_count as f64 / self.total_allocated as f64
            },
            fallback_active: self.fallback_live as u32,
        }
    }
}
