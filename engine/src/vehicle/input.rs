//! Driver Intent
//!
//! The core never polls devices. The host translates whatever input it has
//! into a [`DriverIntent`] once per tick.

use serde::{Deserialize, Serialize};

/// Which steering model is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SteeringMode {
    /// Steer follows the angle between camera heading and vehicle heading
    Absolute,
    /// Steer ramps while left/right keys are held
    #[default]
    Incremental,
}

/// What the driver wants this tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DriverIntent {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// Leave the vehicle
    pub exit: bool,
    /// Camera yaw in radians (same convention as body yaw)
    pub camera_heading: f32,
    /// Analog / camera-relative input was used last
    pub absolute_steering: bool,
}

impl DriverIntent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Throttle axis: 1 forward, -1 backward, 0 for none or both.
    pub fn throttle_axis(&self) -> i8 {
        match (self.forward, self.backward) {
            (true, false) => 1,
            (false, true) => -1,
            _ => 0,
        }
    }

    /// Steer axis: 1 left, -1 right, 0 for none or both.
    pub fn steer_axis(&self) -> i8 {
        match (self.left, self.right) {
            (true, false) => 1,
            (false, true) => -1,
            _ => 0,
        }
    }

    /// Steering mode selected by this intent.
    pub fn steering_mode(&self) -> SteeringMode {
        if self.absolute_steering {
            SteeringMode::Absolute
        } else {
            SteeringMode::Incremental
        }
    }
}
