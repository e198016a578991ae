//! Vehicle collision response
//!
//! Works on the contacts drained from the previous physics step. Contact
//! normals point from the vehicle towards the body it touched, so a wall on
//! the car's right has a normal pointing right and the ground under the car
//! has a normal pointing down.
//!
//! # Passes
//!
//! 1. Classify: any ground contact marks the vehicle grounded.
//! 2. Bounce: the first wall-like contact reverses and scales the speed and
//!    injects a one-tick energy-loss velocity, then starts the cooldown.
//! 3. Strip: every contact removes the velocity component driving the car
//!    into the other body, except landing contacts while airborne.

use std::collections::HashMap;

use glam::Vec3;

use super::config::VehicleConfig;
use super::state::VehicleState;
use crate::physics::{BodyHandle, ContactEvent};

/// Bounce factor used for obstacles that never registered one.
pub const DEFAULT_BOUNCE_FACTOR: f32 = 1.0;

/// Per-obstacle bounce factors, keyed by body handle.
#[derive(Debug, Clone, Default)]
pub struct BounceFactors {
    factors: HashMap<BodyHandle, f32>,
}

impl BounceFactors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factor; negative or non-finite values fall back to the default.
    pub fn insert(&mut self, handle: BodyHandle, factor: f32) {
        let factor = if factor.is_finite() && factor >= 0.0 {
            factor
        } else {
            log::warn!("invalid bounce factor {factor} for body {}, using default", handle.id());
            DEFAULT_BOUNCE_FACTOR
        };
        self.factors.insert(handle, factor);
    }

    pub fn get(&self, handle: BodyHandle) -> f32 {
        self.factors.get(&handle).copied().unwrap_or(DEFAULT_BOUNCE_FACTOR)
    }

    pub fn remove(&mut self, handle: BodyHandle) {
        self.factors.remove(&handle);
    }

    pub fn len(&self) -> usize {
        self.factors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factors.is_empty()
    }
}

/// Contact normal lies (nearly) in the ground plane.
pub fn is_wall(normal: Vec3, config: &VehicleConfig) -> bool {
    normal.y.abs() < config.horizontal_normal_tolerance
}

/// Contact normal points down from the car into a supporting surface.
pub fn is_ground(normal: Vec3, config: &VehicleConfig) -> bool {
    -normal.y > config.ground_normal_threshold
}

/// Contact normal is (nearly) vertical: a floor or a ceiling.
pub fn is_vertical(normal: Vec3, config: &VehicleConfig) -> bool {
    normal.y.abs() > config.vertical_normal_threshold
}

/// Speed after bouncing off a wall.
pub fn bounce_speed(speed: f32, forward: Vec3, normal: Vec3, bounce_factor: f32, config: &VehicleConfig) -> f32 {
    let impact = forward.dot(normal).abs().max(config.impact_floor);
    -speed * config.collision_bounce * bounce_factor * (1.0 + impact)
}

/// Energy-loss velocity pushing the car away from the wall for one tick.
pub fn counter_velocity(normal: Vec3, speed: f32, bounce_factor: f32, config: &VehicleConfig) -> Vec3 {
    let horizontal = Vec3::new(normal.x, 0.0, normal.z).normalize_or_zero();
    -horizontal * speed.abs() * bounce_factor * config.energy_loss_factor * config.energy_loss_scale
}

/// Classify contacts and apply the wall bounce. Mutates speed, grounded
/// and collision state; velocity stripping happens later in
/// [`strip_contact_velocity`] once the new velocity is known.
pub fn respond(
    state: &mut VehicleState,
    contacts: &[ContactEvent],
    forward: Vec3,
    bounce_factors: &BounceFactors,
    config: &VehicleConfig,
    dt: f32,
) {
    let collision = &mut state.collision;
    collision.active = false;
    collision.counter_velocity = Vec3::ZERO;
    collision.cooldown = (collision.cooldown - dt).max(0.0);

    state.grounded = contacts.iter().any(|c| is_ground(c.normal, config));

    if collision.cooldown > 0.0 {
        return;
    }
    let Some(wall) = contacts.iter().find(|c| is_wall(c.normal, config)) else {
        return;
    };

    let bounce_factor = bounce_factors.get(wall.other);
    let speed = state.speed;
    state.speed = bounce_speed(speed, forward, wall.normal, bounce_factor, config);

    let collision = &mut state.collision;
    collision.active = true;
    collision.direction = wall.normal;
    collision.bounce_factor = bounce_factor;
    collision.counter_velocity = counter_velocity(wall.normal, speed, bounce_factor, config);
    collision.cooldown = config.collision_cooldown;

    log::debug!(
        "vehicle bounced off body {}: speed {speed:.2} -> {:.2}",
        wall.other.id(),
        state.speed
    );
}

/// Remove velocity driving into contacted bodies. Landing contacts are
/// skipped while airborne so the car keeps its fall until the ground
/// catches it.
pub fn strip_contact_velocity(velocity: Vec3, contacts: &[ContactEvent], airborne: bool, config: &VehicleConfig) -> Vec3 {
    contacts.iter().fold(velocity, |v, contact| {
        let n = contact.normal;
        if airborne && is_vertical(n, config) {
            return v;
        }
        let into = v.dot(n);
        if into > 0.0 { v - n * into } else { v }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::MaterialTag;

    fn contact(other: u32, normal: Vec3) -> ContactEvent {
        ContactEvent {
            body: BodyHandle::from_raw(1),
            other: BodyHandle::from_raw(other),
            other_material: MaterialTag::Obstacle,
            normal,
            depth: 0.01,
        }
    }

    #[test]
    fn test_side_wall_bounce() {
        let config = VehicleConfig::default();
        let speed = bounce_speed(10.0, Vec3::Z, Vec3::X, 1.0, &config);
        assert!((speed + 6.0).abs() < 1e-5, "got {speed}");
    }

    #[test]
    fn test_respond_applies_bounce_and_cooldown() {
        let config = VehicleConfig::default();
        let mut state = VehicleState::new(0.0);
        state.speed = 10.0;
        let contacts = [contact(7, Vec3::X), contact(2, Vec3::NEG_Y)];

        respond(&mut state, &contacts, Vec3::Z, &BounceFactors::new(), &config, 1.0 / 60.0);
        assert!((state.speed + 6.0).abs() < 1e-5);
        assert!(state.grounded);
        assert!(state.collision.active);
        assert_eq!(state.collision.cooldown, config.collision_cooldown);
        // Pushed away from the wall (towards -X)
        let expected = 10.0 * config.energy_loss_factor * config.energy_loss_scale;
        assert!((state.collision.counter_velocity.x + expected).abs() < 1e-5);

        // Cooldown blocks a second bounce on the next tick
        respond(&mut state, &contacts, Vec3::Z, &BounceFactors::new(), &config, 1.0 / 60.0);
        assert!((state.speed + 6.0).abs() < 1e-5);
        assert!(!state.collision.active);
        assert_eq!(state.collision.counter_velocity, Vec3::ZERO);
    }

    #[test]
    fn test_registered_bounce_factor_scales_response() {
        let config = VehicleConfig::default();
        let mut factors = BounceFactors::new();
        factors.insert(BodyHandle::from_raw(7), 0.5);
        factors.insert(BodyHandle::from_raw(8), -3.0);
        assert_eq!(factors.get(BodyHandle::from_raw(8)), DEFAULT_BOUNCE_FACTOR);

        let mut state = VehicleState::new(0.0);
        state.speed = 10.0;
        respond(&mut state, &[contact(7, Vec3::X)], Vec3::Z, &factors, &config, 0.016);
        assert!((state.speed + 3.0).abs() < 1e-5);
        assert_eq!(state.collision.bounce_factor, 0.5);
    }

    #[test]
    fn test_no_ground_contact_means_airborne() {
        let config = VehicleConfig::default();
        let mut state = VehicleState::new(0.0);
        respond(&mut state, &[], Vec3::Z, &BounceFactors::new(), &config, 0.016);
        assert!(state.is_airborne());
    }

    #[test]
    fn test_strip_removes_only_approaching_component() {
        let config = VehicleConfig::default();
        let contacts = [contact(3, Vec3::X)];
        let v = strip_contact_velocity(Vec3::new(4.0, 0.0, 2.0), &contacts, false, &config);
        assert_eq!(v, Vec3::new(0.0, 0.0, 2.0));
        let v = strip_contact_velocity(Vec3::new(-4.0, 0.0, 2.0), &contacts, false, &config);
        assert_eq!(v, Vec3::new(-4.0, 0.0, 2.0));
    }

    #[test]
    fn test_landing_contact_skipped_while_airborne() {
        let config = VehicleConfig::default();
        let contacts = [contact(2, Vec3::NEG_Y)];
        let falling = Vec3::new(0.0, -5.0, 1.0);
        assert_eq!(strip_contact_velocity(falling, &contacts, true, &config), falling);
        assert_eq!(
            strip_contact_velocity(falling, &contacts, false, &config),
            Vec3::new(0.0, 0.0, 1.0)
        );
    }
}
