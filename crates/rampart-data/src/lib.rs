//! Static archetype tables for towers and enemies.
//!
//! Tables are immutable lookup data loaded once at startup, either from the
//! built-in defaults or from JSON. Construction validates every entry;
//! corrupt configuration aborts initialization rather than running with
//! undefined archetype data. The simulation only ever reads these tables.

mod error;
mod tables;

pub use error::DataError;
pub use tables::{Ability, EnemySpec, GameData, TowerSpec, UpgradeTier};
