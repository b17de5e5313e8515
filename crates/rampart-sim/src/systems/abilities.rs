//! Passive enemy abilities: regeneration and shield recharge.

use hecs::World;

use rampart_core::components::{Health, Regeneration, Shield};

pub fn abilities_system(world: &mut World, dt: f64) {
    // Regeneration heals the living only; death is terminal.
    for (_, (health, regen)) in world.query_mut::<(&mut Health, &Regeneration)>() {
        if health.dead {
            continue;
        }
        health.current = (health.current + regen.hp_per_sec * dt).min(health.max);
    }

    for (_, (shield, health)) in world.query_mut::<(&mut Shield, &Health)>() {
        if health.dead {
            continue;
        }
        shield.current = (shield.current + shield.recharge_per_sec * dt).min(shield.max);
    }
}
