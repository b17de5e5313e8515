//! Target acquisition for towers.
//!
//! Searches are throttled per tower, but a tower whose cached target died
//! or left range re-searches immediately. Candidate order is stabilized by
//! entity id so tie-breaks are deterministic.

use std::collections::HashMap;

use glam::DVec2;
use hecs::{Entity, World};

use rampart_core::components::{Enemy, Health, TargetingState, Transform};
use rampart_core::constants::{CENTER_CLUSTER_RADIUS, TARGET_SEARCH_INTERVAL};
use rampart_core::enums::TargetStrategy;

use crate::spatial::SpatialHashGrid;

struct Candidate {
    entity: Entity,
    pos: DVec2,
    dist: f64,
    health: f64,
}

pub fn targeting_system(world: &mut World, grid: &mut SpatialHashGrid, now_secs: f64) {
    // Live enemies, for target revalidation and exact filtering.
    let mut enemies: HashMap<Entity, (DVec2, f64)> = HashMap::new();
    for (entity, (_, transform, health)) in world.query_mut::<(&Enemy, &Transform, &Health)>() {
        if !health.dead {
            enemies.insert(entity, (transform.pos.to_dvec2(), health.current));
        }
    }

    let towers: Vec<(Entity, TargetingState, DVec2)> = world
        .query_mut::<(&TargetingState, &Transform)>()
        .into_iter()
        .map(|(e, (ts, t))| (e, *ts, t.pos.to_dvec2()))
        .collect();

    let mut hits = Vec::new();
    for (tower, state, tower_pos) in towers {
        let target_valid = state.current_target.is_some_and(|t| {
            enemies
                .get(&t)
                .is_some_and(|(pos, _)| pos.distance(tower_pos) <= state.range)
        });
        let due = now_secs - state.last_search_secs >= TARGET_SEARCH_INTERVAL;
        if target_valid && !due {
            continue;
        }

        let mut new_target = None;
        if due || !target_valid {
            grid.query_radius(tower_pos, state.range, &mut hits);
            let mut candidates: Vec<Candidate> = hits
                .iter()
                .filter_map(|entry| {
                    let (pos, health) = enemies.get(&entry.entity)?;
                    let dist = pos.distance(tower_pos);
                    (dist <= state.range).then_some(Candidate {
                        entity: entry.entity,
                        pos: *pos,
                        dist,
                        health: *health,
                    })
                })
                .collect();
            // Stable input order: ties always resolve to the same entity.
            candidates.sort_by_key(|c| c.entity.to_bits());
            new_target = select(&candidates, state.strategy);
        }

        if let Ok(ts) = world.query_one_mut::<&mut TargetingState>(tower) {
            ts.current_target = new_target;
            ts.last_search_secs = now_secs;
        }
    }
}

/// Pick a target from an id-ordered candidate list. The first candidate in
/// order wins ties, so selection is deterministic.
fn select(candidates: &[Candidate], strategy: TargetStrategy) -> Option<Entity> {
    if candidates.is_empty() {
        return None;
    }
    let pick = |better: &dyn Fn(&Candidate, &Candidate) -> bool| {
        let mut best = &candidates[0];
        for c in &candidates[1..] {
            if better(c, best) {
                best = c;
            }
        }
        best.entity
    };

    Some(match strategy {
        TargetStrategy::Nearest => pick(&|c, best| c.dist < best.dist),
        TargetStrategy::Farthest => pick(&|c, best| c.dist > best.dist),
        TargetStrategy::Strongest => pick(&|c, best| c.health > best.health),
        TargetStrategy::Weakest => pick(&|c, best| c.health < best.health),
        TargetStrategy::Center => {
            let cluster = |c: &Candidate| {
                candidates
                    .iter()
                    .filter(|o| o.pos.distance(c.pos) <= CENTER_CLUSTER_RADIUS)
                    .count()
            };
            pick(&|c, best| cluster(c) > cluster(best))
        }
        TargetStrategy::First => candidates[0].entity,
        TargetStrategy::Last => candidates[candidates.len() - 1].entity,
    })
}
