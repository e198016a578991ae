//! Motion integration
//!
//! Turns the scalar speed and steer value into a body velocity, a new
//! rotation and an angular velocity. The physics step then moves the body;
//! this module only decides what the body should be doing.
//!
//! # Frame
//!
//! `forward = rot * Z`, `up = rot * Y`, `side = rot * X`. Yaw is applied
//! about world +Y and the body is kept upright: pitch or roll beyond the
//! orientation tolerance is removed by rebuilding a yaw-only rotation.

use glam::{Quat, Vec3};

use super::config::VehicleConfig;
use crate::physics::types::yaw_of;

/// Handling multipliers supplied by the surface the car is on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handling {
    pub steer_multiplier: f32,
    pub grip_multiplier: f32,
}

impl Default for Handling {
    fn default() -> Self {
        Self {
            steer_multiplier: 1.0,
            grip_multiplier: 1.0,
        }
    }
}

/// Body pose and velocity read before integration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyPose {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
}

/// What integration wants written back to the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
}

/// Steering authority: fades with speed, scaled by surface handling.
pub fn steer_authority(speed: f32, handling: Handling, config: &VehicleConfig) -> f32 {
    handling.grip_multiplier * handling.steer_multiplier / (1.0 + speed.abs() * config.steer_speed_falloff.max(0.0))
}

/// Remove pitch and roll once they exceed `tolerance`.
pub fn level_rotation(rotation: Quat, tolerance: f32) -> Quat {
    let up = rotation * Vec3::Y;
    if up.angle_between(Vec3::Y) > tolerance {
        Quat::from_rotation_y(yaw_of(rotation))
    } else {
        rotation
    }
}

/// Integrate one tick of vehicle motion.
#[allow(clippy::too_many_arguments)]
pub fn integrate(
    pose: &BodyPose,
    speed: f32,
    steer: f32,
    airborne: bool,
    start_height: f32,
    counter_velocity: Vec3,
    handling: Handling,
    config: &VehicleConfig,
    dt: f32,
) -> Motion {
    let forward = pose.rotation * Vec3::Z;
    let up = pose.rotation * Vec3::Y;
    let side = pose.rotation * Vec3::X;

    let authority = steer_authority(speed, handling, config);
    let grip = config.grip * handling.grip_multiplier;

    let heading = Quat::from_axis_angle(up.normalize_or(Vec3::Y), steer * authority * config.heading_steer_factor) * forward;
    let lateral = side * speed * grip * steer * config.grip_lateral_factor;
    let mut velocity = heading * speed + lateral + counter_velocity;

    // Vertical velocity belongs to the physics step, not to the driving model
    let mut vertical = pose.velocity.y;
    if airborne {
        vertical *= config.free_fall_vertical_multiplier;
    }
    let ceiling = start_height + config.max_rise;
    let mut position = pose.position;
    if position.y >= ceiling && vertical > 0.0 {
        vertical = 0.0;
        position.y = ceiling;
    }
    velocity.y = vertical;

    let yaw_delta = steer * authority * dt * speed * config.steer_rotation_scale;
    let rotation = level_rotation(
        (Quat::from_rotation_y(yaw_delta) * pose.rotation).normalize(),
        config.orientation_tolerance,
    );

    Motion {
        position,
        rotation,
        velocity,
        angular_velocity: Vec3::new(0.0, pose.angular_velocity.y, 0.0),
    }
}
