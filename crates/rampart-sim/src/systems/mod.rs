//! Per-tick simulation systems, run in a fixed order by the engine.

pub mod abilities;
pub mod cleanup;
pub mod collision;
pub mod firing;
pub mod movement;
pub mod snapshot;
pub mod targeting;
pub mod wave_director;
