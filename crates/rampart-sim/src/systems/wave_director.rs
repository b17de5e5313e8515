//! Wave scheduling: Preparing -> Active -> Completed, then back around.
//!
//! Wave composition is drawn from the shared deterministic RNG, so two runs
//! with the same seed produce identical spawn sequences.

use std::collections::VecDeque;

use hecs::World;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use rampart_core::constants::{
    BOSS_WAVE_INTERVAL, WAVE_BASE_ENEMIES, WAVE_BATCH_INTERVAL_SECS, WAVE_DIFFICULTY_STEP,
    WAVE_ENEMIES_PER_WAVE, WAVE_PREP_SECS, WAVE_REWARD_BASE, WAVE_REWARD_PER_WAVE,
};
use rampart_core::enums::{EnemyArchetype, WaveState};
use rampart_core::events::GameEvent;
use rampart_core::state::WaveProgressView;
use rampart_core::types::Position;
use rampart_data::GameData;

use crate::world_setup::spawn_enemy;

/// Enemies eligible in the opening waves.
const EARLY_MIX: &[EnemyArchetype] = &[
    EnemyArchetype::Grunt,
    EnemyArchetype::Grunt,
    EnemyArchetype::Runner,
];

/// Waves 4-7 add armored and shielded enemies.
const MID_MIX: &[EnemyArchetype] = &[
    EnemyArchetype::Grunt,
    EnemyArchetype::Runner,
    EnemyArchetype::Tank,
    EnemyArchetype::Shielded,
];

/// Wave 8 onward draws from the full roster.
const LATE_MIX: &[EnemyArchetype] = &[
    EnemyArchetype::Grunt,
    EnemyArchetype::Runner,
    EnemyArchetype::Tank,
    EnemyArchetype::Shielded,
    EnemyArchetype::Regenerator,
    EnemyArchetype::Splitter,
];

/// Wave scheduler and spawn queue.
#[derive(Debug)]
pub struct WaveDirector {
    number: u32,
    state: WaveState,
    boss: bool,
    prep_remaining: f64,
    /// Batches still to spawn; front is next.
    batches: VecDeque<Vec<EnemyArchetype>>,
    batch_timer: f64,
    spawned: u32,
    killed: u32,
    leaked: u32,
    /// Enemies currently on the field (includes split children).
    alive: u32,
    difficulty: f64,
    path: Vec<Position>,
}

impl WaveDirector {
    pub fn new(path: Vec<Position>) -> Self {
        Self {
            number: 0,
            state: WaveState::Preparing,
            boss: false,
            prep_remaining: WAVE_PREP_SECS,
            batches: VecDeque::new(),
            batch_timer: 0.0,
            spawned: 0,
            killed: 0,
            leaked: 0,
            alive: 0,
            difficulty: 1.0,
            path,
        }
    }

    pub fn wave_number(&self) -> u32 {
        self.number
    }

    pub fn state(&self) -> WaveState {
        self.state
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    pub fn path(&self) -> &[Position] {
        &self.path
    }

    /// Total enemies a wave spawns, before any boss bonus.
    pub fn wave_size(number: u32) -> u32 {
        WAVE_BASE_ENEMIES + (number.saturating_sub(1)) * WAVE_ENEMIES_PER_WAVE
    }

    /// Zero the remaining preparation countdown. The wave begins on the
    /// next tick. No effect outside Preparing.
    pub fn force_start(&mut self) {
        if self.state == WaveState::Preparing {
            self.prep_remaining = 0.0;
        }
    }

    /// An enemy died. Also called for split children.
    pub fn note_kill(&mut self) {
        self.killed += 1;
        self.alive = self.alive.saturating_sub(1);
    }

    /// An enemy reached the base.
    pub fn note_leak(&mut self) {
        self.leaked += 1;
        self.alive = self.alive.saturating_sub(1);
    }

    /// A dying splitter added children to the field mid-wave.
    pub fn note_split_children(&mut self, count: u32) {
        self.spawned += count;
        self.alive += count;
    }

    /// Advance the scheduler by `dt`, spawning any due batches.
    pub fn update(
        &mut self,
        world: &mut World,
        data: &GameData,
        rng: &mut ChaCha8Rng,
        dt: f64,
        money: &mut u32,
        events: &mut Vec<GameEvent>,
    ) {
        match self.state {
            WaveState::Preparing => {
                self.prep_remaining -= dt;
                if self.prep_remaining <= 0.0 {
                    self.begin_wave(rng, events);
                }
            }
            WaveState::Active => {
                self.batch_timer -= dt;
                while self.batch_timer <= 0.0 {
                    let Some(batch) = self.batches.pop_front() else {
                        break;
                    };
                    for archetype in batch {
                        spawn_enemy(world, data, archetype, self.path.clone(), self.difficulty);
                        self.spawned += 1;
                        self.alive += 1;
                    }
                    self.batch_timer += WAVE_BATCH_INTERVAL_SECS;
                }

                if self.batches.is_empty() && self.alive == 0 {
                    let reward = WAVE_REWARD_BASE + self.number * WAVE_REWARD_PER_WAVE;
                    *money = money.saturating_add(reward);
                    events.push(GameEvent::WaveCompleted {
                        number: self.number,
                        reward,
                    });
                    self.state = WaveState::Completed;
                }
            }
            WaveState::Completed => {
                // One-tick terminal state; roll straight into the next prep.
                self.state = WaveState::Preparing;
                self.prep_remaining = WAVE_PREP_SECS;
            }
        }
    }

    fn begin_wave(&mut self, rng: &mut ChaCha8Rng, events: &mut Vec<GameEvent>) {
        self.number += 1;
        self.boss = self.number % BOSS_WAVE_INTERVAL == 0;
        self.difficulty = 1.0 + (self.number - 1) as f64 * WAVE_DIFFICULTY_STEP;
        self.spawned = 0;
        self.killed = 0;
        self.leaked = 0;
        self.batches = Self::compose(self.number, self.boss, rng);
        self.batch_timer = 0.0;
        self.state = WaveState::Active;
        events.push(GameEvent::WaveStarted {
            number: self.number,
            boss: self.boss,
        });
    }

    /// Build the spawn batches for a wave: batch sizes of 1 to 3 that sum
    /// exactly to the wave size, drawn from the wave's difficulty bucket,
    /// plus a trailing solo boss batch on boss waves.
    fn compose(number: u32, boss: bool, rng: &mut ChaCha8Rng) -> VecDeque<Vec<EnemyArchetype>> {
        let mix: &[EnemyArchetype] = if number <= 3 {
            EARLY_MIX
        } else if number <= 7 {
            MID_MIX
        } else {
            LATE_MIX
        };

        let mut remaining = Self::wave_size(number);
        let mut batches = VecDeque::new();
        while remaining > 0 {
            let size = rng.gen_range(1..=3u32).min(remaining);
            let mut batch = Vec::with_capacity(size as usize);
            for _ in 0..size {
                batch.push(mix[rng.gen_range(0..mix.len())]);
            }
            remaining -= size;
            batches.push_back(batch);
        }
        if boss {
            batches.push_back(vec![EnemyArchetype::Boss]);
        }
        batches
    }

    /// Enemies still queued to spawn.
    fn queued(&self) -> u32 {
        self.batches.iter().map(|b| b.len() as u32).sum()
    }

    pub fn progress(&self) -> WaveProgressView {
        WaveProgressView {
            number: self.number,
            state: self.state,
            boss: self.boss,
            prep_remaining_secs: self.prep_remaining.max(0.0),
            spawned: self.spawned,
            killed: self.killed,
            leaked: self.leaked,
            remaining: self.queued() + self.alive,
            difficulty_multiplier: self.difficulty,
        }
    }
}
