//! Path following, homing steering, and velocity integration.
//!
//! Steering runs before integration, so a steering change takes effect in
//! the same tick's position update.

use std::collections::HashMap;
use std::f64::consts::{PI, TAU};

use glam::DVec2;
use hecs::{Entity, World};

use rampart_core::components::{
    Enemy, Guidance, Health, PathFollower, Projectile, Transform, Velocity,
};

/// Wrap an angle difference into [-pi, pi].
fn wrap_angle(a: f64) -> f64 {
    (a + PI).rem_euclid(TAU) - PI
}

pub fn movement_system(world: &mut World, dt: f64) {
    path_steering(world);
    homing_steering(world, dt);
    integrate(world, dt);
}

/// Steer path followers toward their current waypoint, advancing through
/// any waypoints already within arrival distance.
fn path_steering(world: &mut World) {
    for (_, (transform, vel, path)) in
        world.query_mut::<(&Transform, &mut Velocity, &mut PathFollower)>()
    {
        if path.complete {
            vel.x = 0.0;
            vel.y = 0.0;
            continue;
        }
        while path.at_waypoint(&transform.pos) {
            path.index += 1;
        }
        let Some(waypoint) = path.waypoints.get(path.index) else {
            path.complete = true;
            vel.x = 0.0;
            vel.y = 0.0;
            continue;
        };
        let dir = (waypoint.to_dvec2() - transform.pos.to_dvec2()).normalize_or_zero();
        vel.x = dir.x * path.speed;
        vel.y = dir.y * path.speed;
    }
}

/// Rotate each live projectile's velocity toward its target, clamped to
/// the projectile's turn rate. A dead or despawned target gets no steering
/// here; the collision pass resolves that projectile the same tick.
fn homing_steering(world: &mut World, dt: f64) {
    let mut targets: HashMap<Entity, DVec2> = HashMap::new();
    for (entity, (_, transform, health)) in world.query_mut::<(&Enemy, &Transform, &Health)>() {
        if !health.dead {
            targets.insert(entity, transform.pos.to_dvec2());
        }
    }

    for (_, (proj, guidance, transform, vel)) in
        world.query_mut::<(&Projectile, &Guidance, &Transform, &mut Velocity)>()
    {
        if !proj.active {
            continue;
        }
        let Some(target_pos) = guidance.target.and_then(|t| targets.get(&t).copied()) else {
            continue;
        };

        let velocity = DVec2::new(vel.x, vel.y);
        let speed = velocity.length();
        if speed <= f64::EPSILON {
            continue;
        }
        let desired = (target_pos - transform.pos.to_dvec2()).normalize_or_zero();
        if desired == DVec2::ZERO {
            continue;
        }

        let current_angle = velocity.y.atan2(velocity.x);
        let desired_angle = desired.y.atan2(desired.x);
        let max_turn = guidance.turn_rate * dt;
        let delta = wrap_angle(desired_angle - current_angle).clamp(-max_turn, max_turn);
        let steered = DVec2::from_angle(current_angle + delta) * speed;
        vel.x = steered.x;
        vel.y = steered.y;
    }
}

/// Apply friction, clamp speed, and integrate position.
fn integrate(world: &mut World, dt: f64) {
    for (_, (transform, vel)) in world.query_mut::<(&mut Transform, &mut Velocity)>() {
        if vel.friction > 0.0 {
            let decay = (1.0 - vel.friction * dt).max(0.0);
            vel.x *= decay;
            vel.y *= decay;
        }
        let speed = vel.speed();
        if vel.max_speed > 0.0 && speed > vel.max_speed {
            let scale = vel.max_speed / speed;
            vel.x *= scale;
            vel.y *= scale;
        }
        transform.pos.x += vel.x * dt;
        transform.pos.y += vel.y * dt;
        if speed > 1e-6 {
            transform.rotation = vel.y.atan2(vel.x);
        }
    }
}
