//! ECS components for hecs entities.
//!
//! Components are plain data structs; game logic lives in systems. The few
//! inherent methods here are pure derivations (cooldowns, liveness checks),
//! never state transitions.

use serde::{Deserialize, Serialize};

use crate::constants::WAYPOINT_RADIUS;
use crate::enums::*;
use crate::types::Position;

/// Spatial placement: position, heading, and non-uniform scale.
/// Mutated only by the movement system and placement commands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Transform {
    pub pos: Position,
    /// Heading in radians.
    pub rotation: f64,
    pub scale_x: f64,
    pub scale_y: f64,
}

impl Transform {
    pub fn at(pos: Position) -> Self {
        Self {
            pos,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::at(Position::default())
    }
}

/// Linear velocity with a speed clamp and friction coefficient.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub x: f64,
    pub y: f64,
    /// Speed is clamped to this after steering and friction.
    pub max_speed: f64,
    /// Linear friction coefficient (fraction of speed lost per second).
    pub friction: f64,
}

impl Velocity {
    pub fn speed(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }
}

/// Hit points. `dead` is terminal: it is set once and never cleared.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Health {
    pub current: f64,
    pub max: f64,
    pub dead: bool,
}

impl Health {
    pub fn full(max: f64) -> Self {
        Self {
            current: max,
            max,
            dead: false,
        }
    }
}

/// Tower weapon. Cooldown interval derives from the fire rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weapon {
    pub damage: f64,
    pub range: f64,
    /// Shots per second.
    pub fire_rate: f64,
    pub projectile_kind: ProjectileKind,
    /// Simulation time of the last shot, seconds. Negative infinity before
    /// the first shot.
    pub last_fire_secs: f64,
}

impl Weapon {
    pub fn cooldown_secs(&self) -> f64 {
        1.0 / self.fire_rate
    }

    pub fn can_fire(&self, now_secs: f64) -> bool {
        now_secs - self.last_fire_secs >= self.cooldown_secs()
    }
}

/// Target acquisition state for an attacker.
///
/// `current_target` is a weak reference: the entity may have died or been
/// recycled, so it must be revalidated against the world on every use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetingState {
    pub range: f64,
    pub strategy: TargetStrategy,
    #[serde(skip)]
    pub current_target: Option<hecs::Entity>,
    /// Simulation time of the last target search, seconds.
    pub last_search_secs: f64,
}

impl TargetingState {
    pub fn new(range: f64, strategy: TargetStrategy) -> Self {
        Self {
            range,
            strategy,
            current_target: None,
            last_search_secs: f64::NEG_INFINITY,
        }
    }
}

/// Ordered waypoint path consumed by the movement system.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathFollower {
    pub waypoints: Vec<Position>,
    pub index: usize,
    /// Steering speed along the path.
    pub speed: f64,
    /// Set when the final waypoint has been reached; velocity is zeroed.
    pub complete: bool,
}

impl PathFollower {
    pub fn new(waypoints: Vec<Position>, speed: f64) -> Self {
        Self {
            waypoints,
            index: 0,
            speed,
            complete: false,
        }
    }

    /// Whether `pos` is within arrival distance of the current waypoint.
    pub fn at_waypoint(&self, pos: &Position) -> bool {
        self.waypoints
            .get(self.index)
            .is_some_and(|wp| pos.distance_to(wp) < WAYPOINT_RADIUS)
    }
}

/// Homing guidance state for a projectile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Guidance {
    /// Target entity; revalidated every tick (the target can die mid-flight).
    #[serde(skip)]
    pub target: Option<hecs::Entity>,
    /// Tower that fired this projectile, for stat attribution.
    #[serde(skip)]
    pub shooter: Option<hecs::Entity>,
    pub damage: f64,
    /// Maximum heading change in radians per second.
    pub turn_rate: f64,
    /// Area-of-effect radius for the terminal burst.
    pub explosion_radius: f64,
    /// Remaining lifetime in seconds; expiry triggers an area burst.
    pub ttl_secs: f64,
    pub exploded: bool,
}

impl Default for Guidance {
    fn default() -> Self {
        Self {
            target: None,
            shooter: None,
            damage: 0.0,
            turn_rate: 0.0,
            explosion_radius: 0.0,
            ttl_secs: 0.0,
            exploded: false,
        }
    }
}

/// Projectile identity and pool bookkeeping.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Projectile {
    pub kind: ProjectileKind,
    /// False for fallback allocations made when the pool was exhausted;
    /// those are despawned on release instead of recycled.
    pub pooled: bool,
    /// Inactive projectiles are parked in the pool and skipped by systems.
    pub active: bool,
}

/// Tower identity, upgrade level, and accumulated statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Tower {
    pub archetype: TowerArchetype,
    /// Upgrade level, 0-based. Bounded by the archetype's upgrade table.
    pub level: u8,
    pub shots_fired: u32,
    pub kills: u32,
    pub damage_dealt: f64,
    /// Cumulative money spent on this tower (purchase + upgrades).
    /// Sell value is a fixed fraction of this.
    pub invested: u32,
}

/// Enemy identity and kill reward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Enemy {
    pub archetype: EnemyArchetype,
    pub reward: u32,
}

/// Regeneration ability: heals while alive, never past max, never revives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Regeneration {
    pub hp_per_sec: f64,
}

/// Shield ability: absorbs damage before health and recharges over time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Shield {
    pub current: f64,
    pub max: f64,
    pub recharge_per_sec: f64,
}

impl Shield {
    pub fn full(max: f64, recharge_per_sec: f64) -> Self {
        Self {
            current: max,
            max,
            recharge_per_sec,
        }
    }
}
