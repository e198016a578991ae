//! Per-tick race snapshot
//!
//! Everything a renderer, HUD or audio layer needs after one tick, as plain
//! data. Serializable so a host can log or stream it.

use glam::{Quat, Vec3};
use serde::Serialize;

use crate::ghost::GhostPose;
use crate::track::{RaceEvent, RacePhase};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RaceSnapshot {
    // === Vehicle ===
    pub position: Vec3,
    /// Physics body rotation
    pub rotation: Quat,
    /// Body rotation plus the drift yaw offset
    pub visual_rotation: Quat,
    pub speed: f32,
    pub steer: f32,
    pub drift_factor: f32,
    pub drifting: bool,
    pub occupied: bool,

    // === Race progress ===
    pub phase: RacePhase,
    /// Gate the driver must cross next
    pub current_checkpoint: usize,
    /// -1 before the race starts
    pub laps_completed: i32,
    pub total_laps: u32,
    pub lap_elapsed: f32,
    pub total_elapsed: f32,
    pub best_lap: Option<f32>,

    // === Surface ===
    pub inside_track: bool,
    pub inside_hazard: bool,

    pub ghost: Option<GhostPose>,
    /// Events raised during the tick, in order
    pub events: Vec<RaceEvent>,
}

impl RaceSnapshot {
    /// Whether an event matching `predicate` happened this tick.
    pub fn has_event(&self, predicate: impl Fn(&RaceEvent) -> bool) -> bool {
        self.events.iter().any(predicate)
    }
}
