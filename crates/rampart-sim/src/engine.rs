//! The simulation engine: owns the world, resources, and the fixed-order
//! tick pipeline.
//!
//! Determinism contract: two engines built from the same `SimConfig` and
//! fed the same command sequence produce identical snapshots tick for tick.
//! All randomness flows through the seeded RNG, and systems run in a fixed
//! order over id-stable iteration.

use std::collections::VecDeque;

use hecs::{Entity, World};
use log::info;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rampart_core::commands::{CommandError, PlayerCommand};
use rampart_core::components::{Enemy, Health, TargetingState, Tower, Transform, Weapon};
use rampart_core::constants::{
    ENTITY_RADIUS_PAD, MAX_DT, STARTING_LIVES, STARTING_MONEY, TOWER_MIN_SPACING, WORLD_HEIGHT,
    WORLD_WIDTH,
};
use rampart_core::enums::{GamePhase, TargetStrategy, TowerArchetype};
use rampart_core::events::GameEvent;
use rampart_core::state::{CollisionStatsView, GameStateSnapshot};
use rampart_core::types::{Position, SimTime};
use rampart_data::GameData;

use crate::pool::ProjectilePool;
use crate::spatial::SpatialHashGrid;
use crate::systems::abilities::abilities_system;
use crate::systems::cleanup::cleanup_system;
use crate::systems::collision::collision_system;
use crate::systems::firing::firing_system;
use crate::systems::movement::movement_system;
use crate::systems::snapshot::{build_snapshot, sell_value};
use crate::systems::targeting::targeting_system;
use crate::systems::wave_director::WaveDirector;
use crate::world_setup::{default_path, spawn_tower};

/// Pick radius for `select_entity_near`.
const SELECT_RADIUS: f64 = 20.0;

/// Initial conditions for a run. Two engines with equal configs and equal
/// inputs evolve identically.
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub seed: u64,
    pub starting_money: u32,
    pub starting_lives: u32,
    pub path: Vec<Position>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            starting_money: STARTING_MONEY,
            starting_lives: STARTING_LIVES,
            path: default_path(),
        }
    }
}

pub struct SimulationEngine {
    config: SimConfig,
    data: GameData,
    world: World,
    time: SimTime,
    phase: GamePhase,
    money: u32,
    lives: u32,
    rng: ChaCha8Rng,
    commands: VecDeque<PlayerCommand>,
    despawn_queue: Vec<Entity>,
    pool: ProjectilePool,
    grid: SpatialHashGrid,
    director: WaveDirector,
    collision_stats: CollisionStatsView,
    events: Vec<GameEvent>,
}

impl SimulationEngine {
    pub fn new(config: SimConfig) -> Self {
        Self::with_data(config, GameData::builtin())
    }

    pub fn with_data(config: SimConfig, data: GameData) -> Self {
        let mut world = World::new();
        let pool = ProjectilePool::new(&mut world);
        let engine = Self {
            world,
            data,
            time: SimTime::default(),
            phase: GamePhase::Setup,
            money: config.starting_money,
            lives: config.starting_lives,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            commands: VecDeque::new(),
            despawn_queue: Vec::new(),
            pool,
            grid: SpatialHashGrid::default(),
            director: WaveDirector::new(config.path.clone()),
            collision_stats: CollisionStatsView::default(),
            events: Vec::new(),
            config,
        };
        info!("simulation engine created (seed {})", engine.config.seed);
        engine
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn money(&self) -> u32 {
        self.money
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Queue a command for the next tick. Rejections surface as
    /// `CommandRejected` events in that tick's snapshot.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.commands.push_back(command);
    }

    /// Advance the simulation by `dt` seconds (clamped) and return the
    /// post-tick snapshot. Outside the Active phase only commands are
    /// processed; time does not advance.
    pub fn tick(&mut self, dt: f64) -> GameStateSnapshot {
        let dt = dt.clamp(0.0, MAX_DT);
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems(dt);
            self.time.advance(dt);
        }

        build_snapshot(
            &mut self.world,
            self.time,
            self.phase,
            self.money,
            self.lives,
            self.director.progress(),
            self.pool.stats(),
            self.collision_stats.clone(),
            std::mem::take(&mut self.events),
        )
    }

    fn run_systems(&mut self, dt: f64) {
        let now = self.time.elapsed_secs;

        self.director.update(
            &mut self.world,
            &self.data,
            &mut self.rng,
            dt,
            &mut self.money,
            &mut self.events,
        );

        // Targeting reads the grid built after last tick's movement;
        // positions have not changed since. Enemies spawned this tick
        // become visible to towers next tick.
        targeting_system(&mut self.world, &mut self.grid, now);
        firing_system(
            &mut self.world,
            &self.data,
            &mut self.pool,
            now,
            &mut self.events,
        );

        movement_system(&mut self.world, dt);
        self.rebuild_grid();

        collision_system(
            &mut self.world,
            &self.data,
            &mut self.grid,
            &mut self.pool,
            &mut self.director,
            dt,
            &mut self.money,
            &mut self.collision_stats,
            &mut self.events,
            &mut self.despawn_queue,
        );

        abilities_system(&mut self.world, dt);

        cleanup_system(
            &mut self.world,
            &mut self.director,
            &mut self.lives,
            &mut self.events,
            &mut self.despawn_queue,
        );

        if self.lives == 0 {
            self.phase = GamePhase::Defeated;
            self.events.push(GameEvent::GameOver {
                wave_number: self.director.wave_number(),
            });
            info!("defeated on wave {}", self.director.wave_number());
        }
    }

    fn rebuild_grid(&mut self) {
        self.grid.clear();
        for (entity, (_, transform, health)) in
            self.world.query_mut::<(&Enemy, &Transform, &Health)>()
        {
            if !health.dead {
                self.grid
                    .insert(entity, transform.pos.to_dvec2(), ENTITY_RADIUS_PAD);
            }
        }
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.commands.pop_front() {
            let result = match command {
                PlayerCommand::PlaceTower { x, y, archetype } => {
                    self.place_tower(Position::new(x, y), archetype).map(|_| ())
                }
                PlayerCommand::UpgradeTower { tower_id } => self.upgrade_tower(tower_id),
                PlayerCommand::SellTower { tower_id } => self.sell_tower(tower_id).map(|_| ()),
                PlayerCommand::SetTargetStrategy { tower_id, strategy } => {
                    self.set_target_strategy(tower_id, strategy)
                }
                PlayerCommand::ForceStartNextWave => self.force_start_next_wave(),
                PlayerCommand::StartGame => self.start_game(),
                PlayerCommand::Pause => self.pause(),
                PlayerCommand::Resume => self.resume(),
            };
            if let Err(reason) = result {
                self.events.push(GameEvent::CommandRejected { reason });
            }
        }
    }

    /// Begin a run. From Defeated this resets the whole world and restarts
    /// from the configured initial conditions.
    pub fn start_game(&mut self) -> Result<(), CommandError> {
        match self.phase {
            GamePhase::Setup => {
                self.phase = GamePhase::Active;
                Ok(())
            }
            GamePhase::Defeated => {
                self.reset();
                self.phase = GamePhase::Active;
                Ok(())
            }
            _ => Err(CommandError::WrongPhase),
        }
    }

    fn reset(&mut self) {
        self.world = World::new();
        self.pool = ProjectilePool::new(&mut self.world);
        self.grid = SpatialHashGrid::default();
        self.director = WaveDirector::new(self.config.path.clone());
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.time = SimTime::default();
        self.money = self.config.starting_money;
        self.lives = self.config.starting_lives;
        self.collision_stats = CollisionStatsView::default();
        self.despawn_queue.clear();
        self.events.clear();
    }

    pub fn pause(&mut self) -> Result<(), CommandError> {
        if self.phase != GamePhase::Active {
            return Err(CommandError::WrongPhase);
        }
        self.phase = GamePhase::Paused;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<(), CommandError> {
        if self.phase != GamePhase::Paused {
            return Err(CommandError::WrongPhase);
        }
        self.phase = GamePhase::Active;
        Ok(())
    }

    /// Zero the inter-wave countdown so the next wave begins immediately.
    pub fn force_start_next_wave(&mut self) -> Result<(), CommandError> {
        if self.phase != GamePhase::Active {
            return Err(CommandError::WrongPhase);
        }
        self.director.force_start();
        Ok(())
    }

    /// Place a tower. Validation is atomic: on any failure no money is
    /// spent and no entity is created.
    pub fn place_tower(
        &mut self,
        pos: Position,
        archetype: TowerArchetype,
    ) -> Result<u64, CommandError> {
        self.require_build_phase()?;
        if !(0.0..=WORLD_WIDTH).contains(&pos.x) || !(0.0..=WORLD_HEIGHT).contains(&pos.y) {
            return Err(CommandError::InvalidLocation);
        }
        for (_, (_, transform)) in self.world.query_mut::<(&Tower, &Transform)>() {
            if transform.pos.distance_to(&pos) < TOWER_MIN_SPACING {
                return Err(CommandError::InvalidLocation);
            }
        }
        let cost = self.data.tower(archetype).cost;
        if self.money < cost {
            return Err(CommandError::InsufficientFunds);
        }

        self.money -= cost;
        let entity = spawn_tower(&mut self.world, &self.data, pos, archetype);
        let tower_id = entity.to_bits().get();
        self.events.push(GameEvent::TowerPlaced {
            tower_id,
            archetype,
            cost,
        });
        Ok(tower_id)
    }

    /// Upgrade a tower one tier, rescaling its weapon and targeting range.
    pub fn upgrade_tower(&mut self, tower_id: u64) -> Result<(), CommandError> {
        self.require_build_phase()?;
        let entity = self.lookup_tower(tower_id)?;
        let archetype;
        let level;
        {
            let Ok(tower) = self.world.query_one_mut::<&Tower>(entity) else {
                return Err(CommandError::NotFound);
            };
            archetype = tower.archetype;
            level = tower.level;
        }
        let spec = self.data.tower(archetype);
        if level >= spec.max_level() {
            return Err(CommandError::MaxUpgradeLevel);
        }
        let cost = spec.upgrades[level as usize].cost;
        if self.money < cost {
            return Err(CommandError::InsufficientFunds);
        }

        self.money -= cost;
        let new_level = level + 1;
        if let Ok((tower, weapon, targeting)) = self
            .world
            .query_one_mut::<(&mut Tower, &mut Weapon, &mut TargetingState)>(entity)
        {
            tower.level = new_level;
            tower.invested += cost;
            weapon.damage = spec.damage_at(new_level);
            weapon.range = spec.range_at(new_level);
            weapon.fire_rate = spec.fire_rate_at(new_level);
            targeting.range = weapon.range;
        }
        self.events.push(GameEvent::TowerUpgraded {
            tower_id,
            level: new_level,
            cost,
        });
        Ok(())
    }

    /// Sell a tower for a fixed fraction of everything spent on it.
    /// Returns the refund.
    pub fn sell_tower(&mut self, tower_id: u64) -> Result<u32, CommandError> {
        self.require_build_phase()?;
        let entity = self.lookup_tower(tower_id)?;
        let invested = match self.world.query_one_mut::<&Tower>(entity) {
            Ok(tower) => tower.invested,
            Err(_) => return Err(CommandError::NotFound),
        };
        let refund = sell_value(invested);
        self.money = self.money.saturating_add(refund);
        // In-flight projectiles keep a dangling shooter id; attribution
        // lookups simply miss.
        let _ = self.world.despawn(entity);
        self.events.push(GameEvent::TowerSold { tower_id, refund });
        Ok(refund)
    }

    pub fn set_target_strategy(
        &mut self,
        tower_id: u64,
        strategy: TargetStrategy,
    ) -> Result<(), CommandError> {
        self.require_build_phase()?;
        let entity = self.lookup_tower(tower_id)?;
        let Ok(targeting) = self.world.query_one_mut::<&mut TargetingState>(entity) else {
            return Err(CommandError::NotFound);
        };
        targeting.strategy = strategy;
        targeting.current_target = None;
        targeting.last_search_secs = f64::NEG_INFINITY;
        Ok(())
    }

    /// Find the tower or enemy closest to a point, within `radius` (the
    /// default pick radius when `None`).
    pub fn select_entity_near(&mut self, pos: Position, radius: Option<f64>) -> Option<u64> {
        let radius = radius.unwrap_or(SELECT_RADIUS);
        let mut best: Option<(u64, f64)> = None;
        for (entity, (_, transform)) in self.world.query_mut::<(&Tower, &Transform)>() {
            let dist = transform.pos.distance_to(&pos);
            if dist <= radius && best.is_none_or(|(_, d)| dist < d) {
                best = Some((entity.to_bits().get(), dist));
            }
        }
        for (entity, (_, transform, health)) in
            self.world.query_mut::<(&Enemy, &Transform, &Health)>()
        {
            if health.dead {
                continue;
            }
            let dist = transform.pos.distance_to(&pos);
            if dist <= radius && best.is_none_or(|(_, d)| dist < d) {
                best = Some((entity.to_bits().get(), dist));
            }
        }
        best.map(|(id, _)| id)
    }

    fn require_build_phase(&self) -> Result<(), CommandError> {
        match self.phase {
            GamePhase::Active | GamePhase::Paused => Ok(()),
            _ => Err(CommandError::WrongPhase),
        }
    }

    fn lookup_tower(&self, tower_id: u64) -> Result<Entity, CommandError> {
        let entity = Entity::from_bits(tower_id).ok_or(CommandError::NotFound)?;
        match self.world.entity(entity) {
            Ok(entity_ref) if entity_ref.has::<Tower>() => Ok(entity),
            _ => Err(CommandError::NotFound),
        }
    }
}
