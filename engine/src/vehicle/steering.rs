//! Steering and drift
//!
//! Two mutually exclusive steering models:
//!
//! - **Absolute**: steer tracks the signed angle from the vehicle heading to
//!   the camera heading, scaled and clamped.
//! - **Incremental**: steer ramps towards ±max while a key is held and relaxes
//!   to centre otherwise.
//!
//! The mode is resolved first each tick; drift reads the resolved mode.

use super::config::VehicleConfig;
use super::input::SteeringMode;
use super::state::DriftState;
use crate::physics::types::{sign_or_zero, wrap_angle};

/// Clamp a steer value into [-limit, limit]; non-finite values centre.
pub fn clamp_steer(steer: f32, limit: f32) -> f32 {
    if steer.is_finite() {
        steer.clamp(-limit, limit)
    } else {
        0.0
    }
}

/// Absolute-mode steer from camera and vehicle headings.
pub fn absolute_steer(camera_heading: f32, vehicle_heading: f32, gain: f32, limit: f32) -> f32 {
    let error = wrap_angle(camera_heading - vehicle_heading);
    clamp_steer(error * gain, limit)
}

/// Incremental-mode steer for one tick. `axis` is 1 (left), -1 (right) or 0.
pub fn incremental_steer(steer: f32, axis: i8, config: &VehicleConfig, dt: f32) -> f32 {
    let limit = config.steer_limit();
    let steer = clamp_steer(steer, limit);
    let next = match axis {
        1 => steer + config.steer_speed * dt,
        -1 => steer - config.steer_speed * dt,
        _ => {
            let relax = config.steer_return_speed * dt;
            if steer > 0.0 {
                (steer - relax).max(0.0)
            } else {
                (steer + relax).min(0.0)
            }
        }
    };
    clamp_steer(next, limit)
}

/// What happened to the drift this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriftTransition {
    None,
    Started,
    /// The drift ended; `yaw_offset` is the visual offset that must be
    /// folded into the body rotation.
    Ended { yaw_offset: f32 },
}

/// Advance the drift state machine.
pub fn update_drift(
    drift: &mut DriftState,
    mode: SteeringMode,
    speed: f32,
    steer: f32,
    config: &VehicleConfig,
    dt: f32,
) -> DriftTransition {
    let above_threshold = speed.abs() > config.drift_speed_threshold;
    let should_drift = mode == SteeringMode::Incremental && above_threshold;

    if drift.active && !should_drift {
        let yaw_offset = drift.factor * config.drift_visual_angle;
        drift.reset();
        return DriftTransition::Ended { yaw_offset };
    }
    if !should_drift {
        return DriftTransition::None;
    }

    let transition = if drift.active {
        DriftTransition::None
    } else {
        drift.active = true;
        drift.elapsed = 0.0;
        DriftTransition::Started
    };

    drift.elapsed += dt;
    drift.factor = (drift.factor + sign_or_zero(steer) * config.drift_rate * dt).clamp(-1.0, 1.0);
    transition
}
