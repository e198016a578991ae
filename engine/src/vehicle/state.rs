//! Per-vehicle mutable state
//!
//! Created once when the vehicle spawns, rewritten every tick by the
//! dynamics engine, dropped when the vehicle is torn down.

use glam::Vec3;

use super::input::SteeringMode;

/// Drift accumulators.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DriftState {
    pub active: bool,
    /// Seconds since the drift began
    pub elapsed: f32,
    /// Signed, in [-1, 1]
    pub factor: f32,
}

impl DriftState {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Collision response bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CollisionState {
    /// A bounce was applied this tick
    pub active: bool,
    /// Normal of the last bounce (from the car towards the obstacle)
    pub direction: Vec3,
    /// Seconds until another bounce can trigger
    pub cooldown: f32,
    /// Bounce factor of the last obstacle hit
    pub bounce_factor: f32,
    /// Energy-loss velocity injected this tick only
    pub counter_velocity: Vec3,
}

/// Everything the driving model mutates.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleState {
    /// Signed speed along the vehicle's forward axis (m/s)
    pub speed: f32,
    /// Steer value (radians, positive = left)
    pub steer: f32,
    pub steering_mode: SteeringMode,
    pub drift: DriftState,
    pub collision: CollisionState,
    /// A driver is in the vehicle
    pub occupied: bool,
    /// Ground contact seen in the last drained contacts
    pub grounded: bool,
    /// Body height at spawn; caps how far the body may rise
    pub start_height: f32,
}

impl VehicleState {
    pub fn new(start_height: f32) -> Self {
        Self {
            speed: 0.0,
            steer: 0.0,
            steering_mode: SteeringMode::Incremental,
            drift: DriftState::default(),
            collision: CollisionState::default(),
            occupied: true,
            grounded: true,
            start_height,
        }
    }

    pub fn is_airborne(&self) -> bool {
        !self.grounded
    }

    /// Clear motion state, keeping occupancy and start height.
    pub fn reset_motion(&mut self) {
        self.speed = 0.0;
        self.steer = 0.0;
        self.drift.reset();
        self.collision = CollisionState::default();
        self.grounded = true;
    }
}

impl Default for VehicleState {
    fn default() -> Self {
        Self::new(0.0)
    }
}
