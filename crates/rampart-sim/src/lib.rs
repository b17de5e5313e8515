//! Deterministic fixed-tick tower defense simulation.
//!
//! The engine advances in fixed-order ticks over a hecs world: commands,
//! wave spawning, targeting, firing, movement, spatial index rebuild,
//! collision, abilities, cleanup, then a serializable snapshot. Given the
//! same seed and command sequence, every run is bit-identical.

pub mod engine;
pub mod pool;
pub mod spatial;
pub mod systems;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
