//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Tower archetype category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerArchetype {
    /// Cheap single-target tower with a fast fire rate.
    Arrow,
    /// Slow-firing tower lobbing shells with a large burst radius.
    Cannon,
    /// Medium tower firing frost bolts (most enemies resist them poorly).
    Frost,
    /// Long-range, high-damage, very slow fire rate.
    Sniper,
}

/// Enemy archetype category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyArchetype {
    /// Baseline walker.
    Grunt,
    /// Fast, fragile.
    Runner,
    /// Slow, heavily armored against arrows.
    Tank,
    /// Carries a rechargeable shield that absorbs damage before health.
    Shielded,
    /// Regenerates health while alive.
    Regenerator,
    /// Splits into swarmlings when killed.
    Splitter,
    /// Fragment spawned by a dying splitter.
    Swarmling,
    /// Wave-capstone enemy, every 5th wave.
    Boss,
}

/// Projectile damage kind; enemy resistances are keyed by this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    #[default]
    Arrow,
    Shell,
    Frost,
    Bolt,
}

/// Target selection strategy for a tower.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetStrategy {
    /// Closest candidate by distance.
    #[default]
    Nearest,
    /// Most distant candidate still in range.
    Farthest,
    /// Highest current health.
    Strongest,
    /// Lowest current health.
    Weakest,
    /// Candidate with the most other candidates nearby (splash efficiency).
    Center,
    /// First candidate in stable input order.
    First,
    /// Last candidate in stable input order.
    Last,
}

/// Wave scheduler state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaveState {
    /// Counting down the inter-wave delay.
    #[default]
    Preparing,
    /// Spawn queue draining; enemies on the field.
    Active,
    /// Spawn queue empty and zero enemies remain; reward granted.
    Completed,
}

/// Game phase (top-level state).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// No game running yet; commands other than StartGame are ignored.
    #[default]
    Setup,
    Active,
    Paused,
    /// Lives reached zero.
    Defeated,
}
