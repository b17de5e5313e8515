//! Simulation constants and tuning parameters.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick at the nominal tick rate.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Maximum delta-time accepted by a single tick (seconds). Frame hitches
/// beyond this are clamped to bound integration error.
pub const MAX_DT: f64 = 0.1;

// --- World bounds ---

/// Playfield width in world units.
pub const WORLD_WIDTH: f64 = 1280.0;

/// Playfield height in world units.
pub const WORLD_HEIGHT: f64 = 960.0;

// --- Movement ---

/// Distance at which a path waypoint counts as reached.
pub const WAYPOINT_RADIUS: f64 = 5.0;

/// Distance at which a homing projectile is in contact with its target.
pub const CONTACT_RADIUS: f64 = 10.0;

// --- Targeting ---

/// Minimum interval between target searches per tower (seconds).
pub const TARGET_SEARCH_INTERVAL: f64 = 0.1;

/// Secondary radius used by the Center strategy to count clustered
/// candidates around each candidate.
pub const CENTER_CLUSTER_RADIUS: f64 = 40.0;

// --- Projectile pool ---

/// Projectile entities preallocated at startup.
pub const POOL_INITIAL_SIZE: usize = 200;

/// Entities added per growth step when the pool is exhausted.
pub const POOL_GROWTH_INCREMENT: usize = 50;

/// Hard ceiling on pooled projectile entities. Beyond this, acquires fall
/// back to direct (non-pooled) allocation.
pub const POOL_MAX_SIZE: usize = 1000;

// --- Spatial hash ---

/// Uniform grid cell size in world units.
pub const GRID_CELL_SIZE: f64 = 64.0;

/// Radius padding applied when inserting entities so boundary-straddling
/// entities land in every cell their extent touches.
pub const ENTITY_RADIUS_PAD: f64 = 8.0;

/// Extra margin added to collision broad-phase query radii.
pub const COLLISION_QUERY_MARGIN: f64 = 4.0;

// --- Economy ---

/// Starting money.
pub const STARTING_MONEY: u32 = 500;

/// Starting lives.
pub const STARTING_LIVES: u32 = 20;

/// Fraction of cumulative spend refunded when selling a tower.
pub const SELL_REFUND_RATIO: f64 = 0.7;

/// Minimum center-to-center spacing between towers.
pub const TOWER_MIN_SPACING: f64 = 24.0;

// --- Waves ---

/// Inter-wave preparation delay (seconds).
pub const WAVE_PREP_SECS: f64 = 10.0;

/// Seconds between consecutive spawn batches within a wave.
pub const WAVE_BATCH_INTERVAL_SECS: f64 = 0.8;

/// Every Nth wave is a boss wave.
pub const BOSS_WAVE_INTERVAL: u32 = 5;

/// Enemies in wave 1.
pub const WAVE_BASE_ENEMIES: u32 = 8;

/// Additional enemies per wave number.
pub const WAVE_ENEMIES_PER_WAVE: u32 = 3;

/// Difficulty multiplier growth per wave beyond the first.
pub const WAVE_DIFFICULTY_STEP: f64 = 0.12;

/// Money granted on wave completion, scaled by wave number.
pub const WAVE_REWARD_BASE: u32 = 50;
pub const WAVE_REWARD_PER_WAVE: u32 = 10;
