//! End-of-tick sweep: leaked enemies and deferred despawns.
//!
//! Runs last so every other system this tick observed a consistent world.
//! Despawns are queued throughout the tick and drained here in one place.

use hecs::{Entity, World};
use log::debug;

use rampart_core::components::{Enemy, Health, PathFollower};
use rampart_core::events::GameEvent;

use crate::systems::wave_director::WaveDirector;

/// Handle enemies that finished their path, then drain the despawn queue.
pub fn cleanup_system(
    world: &mut World,
    director: &mut WaveDirector,
    lives: &mut u32,
    events: &mut Vec<GameEvent>,
    despawn_queue: &mut Vec<Entity>,
) {
    let mut leaked = Vec::new();
    for (entity, (_, health, path)) in world.query_mut::<(&Enemy, &mut Health, &PathFollower)>() {
        if path.complete && !health.dead {
            // Mark dead so a leak is processed once; no reward is paid.
            health.dead = true;
            leaked.push(entity);
        }
    }

    for entity in leaked {
        *lives = lives.saturating_sub(1);
        director.note_leak();
        events.push(GameEvent::EnemyLeaked {
            lives_remaining: *lives,
        });
        despawn_queue.push(entity);
    }

    for entity in despawn_queue.drain(..) {
        // Double-queued entities are fine; the second despawn is a no-op.
        if world.despawn(entity).is_err() {
            debug!("despawn of stale entity {entity:?} skipped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rampart_core::enums::EnemyArchetype;
    use rampart_core::types::Position;
    use rampart_data::GameData;
    use crate::world_setup::{default_path, spawn_enemy};

    fn leak_one(world: &mut World, data: &GameData) -> Entity {
        let e = spawn_enemy(world, data, EnemyArchetype::Grunt, default_path(), 1.0);
        world.query_one_mut::<&mut PathFollower>(e).unwrap().complete = true;
        e
    }

    #[test]
    fn test_leak_decrements_lives_and_despawns() {
        let mut world = World::new();
        let data = GameData::builtin();
        let mut director = WaveDirector::new(default_path());
        director.note_split_children(1); // one on the field
        let mut lives = 20u32;
        let mut events = Vec::new();
        let mut queue = Vec::new();

        let enemy = leak_one(&mut world, &data);
        cleanup_system(&mut world, &mut director, &mut lives, &mut events, &mut queue);

        assert_eq!(lives, 19);
        assert!(world.entity(enemy).is_err(), "leaked enemy despawned");
        assert!(matches!(
            events.as_slice(),
            [GameEvent::EnemyLeaked { lives_remaining: 19 }]
        ));
        assert_eq!(director.progress().leaked, 1);
        assert_eq!(director.progress().remaining, 0);
    }

    #[test]
    fn test_leak_processed_once() {
        let mut world = World::new();
        let data = GameData::builtin();
        let mut director = WaveDirector::new(default_path());
        let mut lives = 20u32;
        let mut events = Vec::new();
        let mut queue = Vec::new();

        leak_one(&mut world, &data);
        cleanup_system(&mut world, &mut director, &mut lives, &mut events, &mut queue);
        cleanup_system(&mut world, &mut director, &mut lives, &mut events, &mut queue);
        assert_eq!(lives, 19);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_lives_saturate_at_zero() {
        let mut world = World::new();
        let data = GameData::builtin();
        let mut director = WaveDirector::new(default_path());
        let mut lives = 1u32;
        let mut events = Vec::new();
        let mut queue = Vec::new();

        leak_one(&mut world, &data);
        leak_one(&mut world, &data);
        cleanup_system(&mut world, &mut director, &mut lives, &mut events, &mut queue);
        assert_eq!(lives, 0);
    }

    #[test]
    fn test_despawn_queue_tolerates_duplicates() {
        let mut world = World::new();
        let e = world.spawn((Position::default(),));
        let mut director = WaveDirector::new(default_path());
        let mut lives = 20u32;
        let mut events = Vec::new();
        let mut queue = vec![e, e];

        cleanup_system(&mut world, &mut director, &mut lives, &mut events, &mut queue);
        assert!(queue.is_empty());
        assert!(world.entity(e).is_err());
        assert_eq!(lives, 20);
    }
}
