//! Hazard Effects
//!
//! Slippery surfaces (oil, ice) reduce steering authority and grip, and oil
//! makes the car sway. Each hazard kind has one timer:
//!
//! - inside a zone of that kind the timer is pinned to the hold time
//! - outside it is the hold time minus the time since leaving, and snaps to
//!   zero once that is negligible
//!
//! Time since leaving is summed in f64, so the timer reaches zero on the
//! tick where the frame deltas add up to the hold time, however fine they
//! are.
//!
//! While a timer is positive the kind's attenuation multiplies the handling.
//! Attenuations of different kinds combine multiplicatively.
//!
//! # Sway
//!
//! A triangle wave whose phase advances at `sway_rate` rad/s. Its value,
//! times `sway_amplitude * |speed| * dt`, is added to the body yaw after
//! integration. The tick number guards against applying it twice.

use std::fmt;
use std::str::FromStr;

use glam::Quat;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::physics::{BodyHandle, PhysicsWorld, RigidBody};
use crate::vehicle::Handling;

/// Seconds a hazard keeps acting after the car leaves its zone
pub const HAZARD_HOLD_TIME: f32 = 3.0;

/// Remaining time (seconds) below which a timer snaps to zero
pub const TIMER_EPSILON: f64 = 1e-6;

const KIND_COUNT: usize = 2;

/// Surface hazard kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HazardKind {
    Oil,
    Ice,
}

impl HazardKind {
    pub const ALL: [HazardKind; KIND_COUNT] = [HazardKind::Oil, HazardKind::Ice];

    pub fn as_str(&self) -> &'static str {
        match self {
            HazardKind::Oil => "oil",
            HazardKind::Ice => "ice",
        }
    }

    fn slot(self) -> usize {
        match self {
            HazardKind::Oil => 0,
            HazardKind::Ice => 1,
        }
    }
}

impl fmt::Display for HazardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HazardKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oil" => Ok(HazardKind::Oil),
            "ice" => Ok(HazardKind::Ice),
            _ => Err(ConfigError::UnknownHazard(s.to_string())),
        }
    }
}

/// Effect of one hazard kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardTuning {
    /// Steering authority and grip multiplier while active
    pub attenuation: f32,
    /// Sway yaw per (m/s of speed * second)
    pub sway_amplitude: f32,
    /// Sway phase rate (rad/s)
    pub sway_rate: f32,
}

impl Default for HazardTuning {
    fn default() -> Self {
        Self {
            attenuation: 1.0,
            sway_amplitude: 0.0,
            sway_rate: 0.0,
        }
    }
}

/// Hazard layer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    /// Seconds a timer is pinned to while inside a zone
    pub hold_time: f32,
    pub oil: HazardTuning,
    pub ice: HazardTuning,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            hold_time: HAZARD_HOLD_TIME,
            oil: HazardTuning {
                attenuation: 0.35,
                sway_amplitude: 0.02,
                sway_rate: 6.0,
            },
            ice: HazardTuning {
                attenuation: 0.5,
                sway_amplitude: 0.0,
                sway_rate: 0.0,
            },
        }
    }
}

impl HazardConfig {
    pub fn tuning(&self, kind: HazardKind) -> &HazardTuning {
        match kind {
            HazardKind::Oil => &self.oil,
            HazardKind::Ice => &self.ice,
        }
    }
}

/// Triangle wave in [-1, 1] with period 2*PI, matching `sin` at its peaks.
pub fn triangle_wave(phase: f32) -> f32 {
    phase.sin().asin() * std::f32::consts::FRAC_2_PI
}

/// Per-kind hazard timers and sway phase.
#[derive(Debug, Clone)]
pub struct HazardLayer {
    config: HazardConfig,
    timers: [f32; KIND_COUNT],
    /// Seconds since the car left a zone of each kind
    released: [f64; KIND_COUNT],
    phase: f32,
    last_sway_tick: Option<u64>,
}

impl HazardLayer {
    pub fn new(config: HazardConfig) -> Self {
        Self {
            config,
            timers: [0.0; KIND_COUNT],
            released: [0.0; KIND_COUNT],
            phase: 0.0,
            last_sway_tick: None,
        }
    }

    /// Update every timer. `inside(kind)` reports whether the footprint is
    /// in any zone of that kind this tick.
    pub fn update_timers(&mut self, inside: impl Fn(HazardKind) -> bool, dt: f32) {
        let hold = self.config.hold_time.max(0.0);
        for kind in HazardKind::ALL {
            let slot = kind.slot();
            let was_active = self.timers[slot] > 0.0;
            if inside(kind) {
                self.timers[slot] = hold;
                self.released[slot] = 0.0;
            } else if was_active {
                self.released[slot] += f64::from(dt);
                let remaining = f64::from(hold) - self.released[slot];
                self.timers[slot] = if remaining < TIMER_EPSILON { 0.0 } else { remaining as f32 };
            }
            let active = self.timers[slot] > 0.0;
            if was_active != active {
                log::debug!("{kind} hazard {}", if active { "active" } else { "cleared" });
            }
        }
    }

    /// Handling multipliers for the next vehicle update.
    pub fn handling(&self) -> Handling {
        let attenuation = HazardKind::ALL
            .into_iter()
            .filter(|&kind| self.is_active(kind))
            .map(|kind| self.config.tuning(kind).attenuation)
            .product::<f32>();
        Handling {
            steer_multiplier: attenuation,
            grip_multiplier: attenuation,
        }
    }

    /// Add this tick's sway to the body yaw. Returns the yaw applied, or
    /// `None` if sway already ran for `tick` or nothing is active.
    pub fn apply_sway<W: PhysicsWorld>(
        &mut self,
        world: &mut W,
        body: BodyHandle,
        speed: f32,
        dt: f32,
        tick: u64,
    ) -> Option<f32> {
        if self.last_sway_tick == Some(tick) {
            return None;
        }
        self.last_sway_tick = Some(tick);

        let mut yaw = 0.0;
        let mut rate: f32 = 0.0;
        for kind in HazardKind::ALL {
            if !self.is_active(kind) {
                continue;
            }
            let tuning = self.config.tuning(kind);
            rate = rate.max(tuning.sway_rate);
            yaw += tuning.sway_amplitude;
        }
        if rate <= 0.0 && yaw == 0.0 {
            return None;
        }

        self.phase = (self.phase + rate * dt) % std::f32::consts::TAU;
        let offset = triangle_wave(self.phase) * yaw * speed.abs() * dt;
        let body = world.body_mut(body)?;
        let rotation = (Quat::from_rotation_y(offset) * body.rotation()).normalize();
        body.set_rotation(rotation);
        Some(offset)
    }

    pub fn is_active(&self, kind: HazardKind) -> bool {
        self.timers[kind.slot()] > 0.0
    }

    pub fn any_active(&self) -> bool {
        self.timers.iter().any(|&t| t > 0.0)
    }

    pub fn get_timer(&self, kind: HazardKind) -> f32 {
        self.timers[kind.slot()]
    }

    pub fn get_config(&self) -> &HazardConfig {
        &self.config
    }

    /// Clear all timers (respawn, race reset).
    pub fn clear(&mut self) {
        self.timers = [0.0; KIND_COUNT];
        self.released = [0.0; KIND_COUNT];
        self.phase = 0.0;
    }
}
