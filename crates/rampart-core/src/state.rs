//! Game state snapshot — the complete visible state produced each tick.
//!
//! Snapshots are read-only: the render/HUD layer draws from them and must
//! never reach back into the simulation.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::GameEvent;
use crate::types::{Position, SimTime};

/// Complete game state broadcast after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub money: u32,
    pub lives: u32,
    pub wave: WaveProgressView,
    pub towers: Vec<TowerView>,
    pub enemies: Vec<EnemyView>,
    pub projectiles: Vec<ProjectileView>,
    pub pool: PoolStatsView,
    pub collision: CollisionStatsView,
    pub events: Vec<GameEvent>,
}

/// Wave scheduler progress for the HUD.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WaveProgressView {
    pub number: u32,
    pub state: WaveState,
    pub boss: bool,
    /// Seconds until the next wave starts (Preparing only).
    pub prep_remaining_secs: f64,
    pub spawned: u32,
    pub killed: u32,
    pub leaked: u32,
    /// Enemies still to spawn plus enemies still alive.
    pub remaining: u32,
    pub difficulty_multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerView {
    /// Stable entity id (`hecs::Entity::to_bits`).
    pub id: u64,
    pub archetype: TowerArchetype,
    pub position: Position,
    pub rotation: f64,
    pub level: u8,
    pub range: f64,
    pub strategy: TargetStrategy,
    pub shots_fired: u32,
    pub kills: u32,
    pub damage_dealt: f64,
    pub sell_value: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: u64,
    pub archetype: EnemyArchetype,
    pub position: Position,
    pub rotation: f64,
    pub health: f64,
    pub max_health: f64,
    /// Shield charge, if the archetype carries one.
    pub shield: Option<f64>,
    /// Index of the waypoint currently being approached.
    pub waypoint_index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectileView {
    pub id: u64,
    pub kind: ProjectileKind,
    pub position: Position,
    pub rotation: f64,
}

/// Object pool telemetry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoolStatsView {
    pub active: u32,
    pub pooled: u32,
    pub total: u32,
    /// active / total, 0.0 when the pool is empty.
    pub utilization: f64,
    /// Live fallback allocations made while the pool was exhausted.
    pub fallback_active: u32,
}

/// Collision broad-phase telemetry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollisionStatsView {
    /// Exact distance checks performed after broad-phase filtering.
    pub checks_performed: u64,
    /// Pairs pruned by the broad-phase without an exact check.
    pub checks_skipped: u64,
    pub collisions_detected: u64,
}
