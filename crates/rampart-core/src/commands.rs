//! Player commands sent from the UI layer to the simulation.
//!
//! Commands are validated against current resources before mutating state
//! and are atomic: fully applied or rejected with a `CommandError`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::enums::{TargetStrategy, TowerArchetype};

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Build commands ---
    /// Place a tower at a world position.
    PlaceTower {
        x: f64,
        y: f64,
        archetype: TowerArchetype,
    },
    /// Upgrade a tower to its next tier.
    UpgradeTower { tower_id: u64 },
    /// Sell a tower for a fraction of its cumulative spend.
    SellTower { tower_id: u64 },
    /// Change a tower's target selection strategy.
    SetTargetStrategy {
        tower_id: u64,
        strategy: TargetStrategy,
    },

    // --- Wave control ---
    /// Zero the remaining inter-wave preparation countdown.
    ForceStartNextWave,

    // --- Simulation control ---
    /// Start a new game from Setup.
    StartGame,
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
}

/// Why a command was rejected. No partial state mutation occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandError {
    /// Not enough money for the purchase or upgrade.
    InsufficientFunds,
    /// Placement outside the world bounds or too close to another tower.
    InvalidLocation,
    /// The tower is already at its maximum upgrade level.
    MaxUpgradeLevel,
    /// The referenced entity does not exist or is not a tower.
    NotFound,
    /// The game is not in a phase that accepts this command.
    WrongPhase,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CommandError::InsufficientFunds => "insufficient funds",
            CommandError::InvalidLocation => "invalid placement location",
            CommandError::MaxUpgradeLevel => "tower already at maximum level",
            CommandError::NotFound => "no such tower",
            CommandError::WrongPhase => "command not valid in current phase",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for CommandError {}
