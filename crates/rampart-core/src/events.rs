//! Events emitted by the simulation for UI and audio feedback.
//!
//! The engine buffers events during a tick and drains them into the
//! snapshot, so the UI observes each event exactly once.

use serde::{Deserialize, Serialize};

use crate::commands::CommandError;
use crate::enums::{EnemyArchetype, TowerArchetype};

/// Events for the frontend, drained once per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A wave left Preparing and began spawning.
    WaveStarted { number: u32, boss: bool },
    /// A wave's queue emptied and its last enemy died or leaked.
    WaveCompleted { number: u32, reward: u32 },
    /// An enemy was killed; the reward has been credited.
    EnemyKilled {
        archetype: EnemyArchetype,
        reward: u32,
    },
    /// An enemy reached the base.
    EnemyLeaked { lives_remaining: u32 },
    /// A dying splitter spawned child enemies.
    EnemySplit {
        archetype: EnemyArchetype,
        children: u32,
    },
    /// Tower lifecycle.
    TowerPlaced {
        tower_id: u64,
        archetype: TowerArchetype,
        cost: u32,
    },
    TowerUpgraded { tower_id: u64, level: u8, cost: u32 },
    TowerSold { tower_id: u64, refund: u32 },
    /// The projectile pool hit its hard maximum and fell back to a direct
    /// allocation.
    PoolExhausted { total_allocated: u32 },
    /// Lives reached zero.
    GameOver { wave_number: u32 },
    /// A queued command failed validation.
    CommandRejected { reason: CommandError },
}
