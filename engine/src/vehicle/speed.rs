//! Speed update
//!
//! Scalar speed along the vehicle's forward axis. Forward/backward intent
//! accelerates towards the max/min bound; with no intent the speed decays
//! towards zero and snaps to exactly zero below `stop_speed`, so a coasting
//! car never creeps forever.

use super::config::VehicleConfig;
use super::input::{DriverIntent, SteeringMode};

/// Speed bounds for one tick, after track and steering-mode multipliers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimits {
    pub max: f32,
    pub min: f32,
    pub deceleration: f32,
}

impl SpeedLimits {
    /// Bounds for the current surface and steering mode.
    pub fn new(config: &VehicleConfig, mode: SteeringMode, inside_track: bool) -> Self {
        let mode_multiplier = match mode {
            SteeringMode::Absolute => config.absolute_mode_speed_multiplier,
            SteeringMode::Incremental => config.incremental_mode_speed_multiplier,
        };
        let (track_speed, track_decel) = if inside_track {
            (1.0, 1.0)
        } else {
            (
                config.outside_track_speed_multiplier,
                config.outside_track_deceleration_multiplier,
            )
        };

        Self {
            max: config.max_speed.max(0.0) * track_speed * mode_multiplier,
            min: config.min_speed.min(0.0) * track_speed * mode_multiplier,
            deceleration: config.deceleration.max(0.0) * track_decel,
        }
    }
}

/// Advance speed by one tick.
///
/// Acceleration only happens once the race has started; before that the
/// vehicle can only coast to a stop.
pub fn update_speed(
    speed: f32,
    intent: &DriverIntent,
    race_started: bool,
    limits: &SpeedLimits,
    config: &VehicleConfig,
    dt: f32,
) -> f32 {
    if !speed.is_finite() {
        return 0.0;
    }
    let decel_step = limits.deceleration * dt;

    // Above a bound (e.g. just left the track): brake towards it
    if speed > limits.max {
        return (speed - decel_step).max(limits.max);
    }
    if speed < limits.min {
        return (speed + decel_step).min(limits.min);
    }

    let throttle = if race_started { intent.throttle_axis() } else { 0 };
    match throttle {
        1 => (speed + config.forward_acceleration * dt).min(limits.max),
        -1 => (speed - config.backward_acceleration * dt).max(limits.min),
        _ => coast(speed, decel_step, config.stop_speed),
    }
}

/// Decay towards zero without crossing it; snap to zero below `stop_speed`.
pub fn coast(speed: f32, decel_step: f32, stop_speed: f32) -> f32 {
    let next = if speed > 0.0 {
        (speed - decel_step).max(0.0)
    } else {
        (speed + decel_step).min(0.0)
    };
    if next.abs() < stop_speed { 0.0 } else { next }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> SpeedLimits {
        SpeedLimits::new(&VehicleConfig::default(), SteeringMode::Incremental, true)
    }

    fn forward() -> DriverIntent {
        DriverIntent {
            forward: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_accelerates_to_max_speed() {
        let config = VehicleConfig::default();
        let mut speed = 0.0;
        for _ in 0..600 {
            speed = update_speed(speed, &forward(), true, &limits(), &config, 1.0 / 60.0);
        }
        assert_eq!(speed, limits().max);
    }

    #[test]
    fn test_no_acceleration_before_start() {
        let config = VehicleConfig::default();
        let speed = update_speed(0.0, &forward(), false, &limits(), &config, 0.1);
        assert_eq!(speed, 0.0);
    }

    #[test]
    fn test_reverse_uses_backward_rate() {
        let config = VehicleConfig::default();
        let intent = DriverIntent {
            backward: true,
            ..Default::default()
        };
        let speed = update_speed(0.0, &intent, true, &limits(), &config, 0.1);
        assert!((speed + config.backward_acceleration * 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_coasting_converges_to_exact_zero_without_sign_change() {
        let config = VehicleConfig::default();
        let idle = DriverIntent::default();
        for &initial in &[39.7_f32, 12.3, 0.9, -0.2, -11.9] {
            for &dt in &[0.001_f32, 1.0 / 60.0, 0.05, 0.3] {
                let mut speed = initial;
                let bound = (initial.abs() / (limits().deceleration * dt)).ceil() as usize + 2;
                let mut ticks = 0;
                while speed != 0.0 {
                    let next = update_speed(speed, &idle, true, &limits(), &config, dt);
                    assert!(next * initial >= 0.0, "sign flipped from {initial} to {next}");
                    assert!(next.abs() <= speed.abs());
                    speed = next;
                    ticks += 1;
                    assert!(ticks <= bound, "did not stop within {bound} ticks");
                }
            }
        }
    }

    #[test]
    fn test_brakes_down_to_lowered_bound() {
        let config = VehicleConfig::default();
        let off_track = SpeedLimits::new(&config, SteeringMode::Incremental, false);
        let mut speed = config.max_speed;
        for _ in 0..600 {
            speed = update_speed(speed, &forward(), true, &off_track, &config, 1.0 / 60.0);
        }
        assert_eq!(speed, off_track.max);
        assert!(off_track.deceleration > limits().deceleration);
    }
}
