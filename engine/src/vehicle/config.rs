//! Vehicle Tuning
//!
//! Every number the driving model uses lives here. Several of them (the
//! energy-loss and grip gains in particular) were tuned by feel and have no
//! physical meaning; they are kept as named tunables rather than derived.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Top forward speed in m/s
pub const MAX_SPEED: f32 = 40.0;

/// Top reverse speed in m/s (negative)
pub const MIN_SPEED: f32 = -12.0;

/// Largest steer value in radians
pub const MAX_STEER: f32 = std::f32::consts::FRAC_PI_4;

/// Seconds between two collision bounces
pub const COLLISION_COOLDOWN: f32 = 0.5;

/// Tuning for one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleConfig {
    // === Speed ===
    /// Forward speed bound (m/s)
    pub max_speed: f32,
    /// Reverse speed bound (m/s, negative)
    pub min_speed: f32,
    /// Acceleration while forward is held (m/s²)
    pub forward_acceleration: f32,
    /// Acceleration while backward is held (m/s²)
    pub backward_acceleration: f32,
    /// Deceleration when coasting or above a bound (m/s²)
    pub deceleration: f32,
    /// Below this |speed| a coasting vehicle stops dead (m/s)
    pub stop_speed: f32,
    /// Speed bound multiplier while off the track
    pub outside_track_speed_multiplier: f32,
    /// Deceleration multiplier while off the track
    pub outside_track_deceleration_multiplier: f32,
    /// Speed bound multiplier in incremental (key) steering mode
    pub incremental_mode_speed_multiplier: f32,
    /// Speed bound multiplier in absolute (camera) steering mode
    pub absolute_mode_speed_multiplier: f32,

    // === Steering ===
    /// Steer clamp (radians, at most PI/2)
    pub max_steer: f32,
    /// Ramp rate while a steer key is held (rad/s)
    pub steer_speed: f32,
    /// Relax rate back to centre with no steer key (rad/s)
    pub steer_return_speed: f32,
    /// Camera-heading error to steer value gain (absolute mode)
    pub absolute_steer_gain: f32,
    /// How quickly steering authority fades with speed
    pub steer_speed_falloff: f32,
    /// Fraction of the steer angle applied to the velocity heading
    pub heading_steer_factor: f32,
    /// Yaw rate per (steer * speed)
    pub steer_rotation_scale: f32,

    // === Grip ===
    /// Base grip coefficient
    pub grip: f32,
    /// Lateral velocity per (speed * grip * steer)
    pub grip_lateral_factor: f32,

    // === Drift ===
    /// Speed above which incremental steering drifts (m/s)
    pub drift_speed_threshold: f32,
    /// Drift factor accumulation rate (1/s)
    pub drift_rate: f32,
    /// Visual yaw offset at drift factor 1 (radians)
    pub drift_visual_angle: f32,

    // === Collision ===
    /// Fraction of speed returned by a wall bounce
    pub collision_bounce: f32,
    /// Seconds before another bounce can trigger
    pub collision_cooldown: f32,
    /// Lower bound of the impact coefficient
    pub impact_floor: f32,
    /// Energy-loss counter velocity gain
    pub energy_loss_factor: f32,
    /// Energy-loss counter velocity scale
    pub energy_loss_scale: f32,
    /// |normal.y| below this counts as a wall
    pub horizontal_normal_tolerance: f32,
    /// |normal.y| above this counts as floor or ceiling
    pub vertical_normal_threshold: f32,
    /// -normal.y above this counts as ground under the car
    pub ground_normal_threshold: f32,

    // === Vertical ===
    /// Highest the body may rise above its start height (m)
    pub max_rise: f32,
    /// Vertical velocity multiplier while airborne
    pub free_fall_vertical_multiplier: f32,
    /// Pitch/roll beyond this are removed (radians)
    pub orientation_tolerance: f32,

    // === Body ===
    /// Chassis half extents (m)
    pub half_extents: Vec3,
    /// Chassis mass (kg)
    pub mass: f32,
}

impl Default for VehicleConfig {
    fn default() -> Self {
        Self {
            max_speed: MAX_SPEED,
            min_speed: MIN_SPEED,
            forward_acceleration: 18.0,
            backward_acceleration: 10.0,
            deceleration: 14.0,
            stop_speed: 0.4,
            outside_track_speed_multiplier: 0.5,
            outside_track_deceleration_multiplier: 2.5,
            incremental_mode_speed_multiplier: 1.0,
            absolute_mode_speed_multiplier: 0.9,

            max_steer: MAX_STEER,
            steer_speed: 2.5,
            steer_return_speed: 3.5,
            absolute_steer_gain: 1.5,
            steer_speed_falloff: 0.02,
            heading_steer_factor: 0.3,
            steer_rotation_scale: 0.1,

            grip: 1.0,
            grip_lateral_factor: 0.05,

            drift_speed_threshold: 18.0,
            drift_rate: 1.5,
            drift_visual_angle: 0.35,

            collision_bounce: 0.5,
            collision_cooldown: COLLISION_COOLDOWN,
            impact_floor: 0.2,
            energy_loss_factor: 7.0,
            energy_loss_scale: 0.1,
            horizontal_normal_tolerance: 0.1,
            vertical_normal_threshold: 0.9,
            ground_normal_threshold: 0.7,

            max_rise: 0.5,
            free_fall_vertical_multiplier: 0.98,
            orientation_tolerance: 0.01,

            half_extents: Vec3::new(0.9, 0.5, 1.8),
            mass: 150.0,
        }
    }
}

impl VehicleConfig {
    /// Steer clamp actually used: `max_steer` limited to (0, PI/2].
    pub fn steer_limit(&self) -> f32 {
        if self.max_steer.is_finite() && self.max_steer > 0.0 {
            self.max_steer.min(FRAC_PI_2)
        } else {
            MAX_STEER
        }
    }
}
