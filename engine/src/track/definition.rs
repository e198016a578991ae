//! Track definition file format
//!
//! A track is described by one JSON document. Shape, material and hazard
//! tags are kept as strings here and validated when the track is loaded,
//! so a typo is reported as a [`ConfigError`](crate::error::ConfigError)
//! naming the offending tag.
//!
//! ```json
//! {
//!   "bounds": [[[-50, 0, -50], [50, 0, -50], [50, 0, 50], [-50, 0, 50]]],
//!   "obstacles": [{ "kind": "wall", "shape": "box", "position": [0, 1, 30],
//!                   "scale": [10, 1, 0.5], "material": "obstacle" }],
//!   "hazards": [{ "kind": "oil", "points": [[0, 0, 0], [5, 0, 0], [5, 0, 5]] }],
//!   "checkpoints": [{ "index": 0, "position": [-5, 0, 0] },
//!                   { "index": 0, "position": [5, 0, 0] },
//!                   { "index": 1, "position": [-5, 0, 15] },
//!                   { "index": 1, "position": [5, 0, 15] }],
//!   "start_position": [0, 0.5, -3],
//!   "total_laps": 3
//! }
//! ```

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::TrackLoadError;

/// One static or dynamic obstacle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleDescriptor {
    /// Free-form label (e.g. "wall", "cone"); only used in logs
    pub kind: String,
    /// Shape tag
    pub shape: String,
    pub position: Vec3,
    pub rotation: Quat,
    /// Box half extents / sphere radius (x) / cylinder radius (x) and height (y)
    pub scale: Vec3,
    /// 0 = static
    pub mass: f32,
    /// Material tag
    pub material: String,
    /// Bounce factor applied when the vehicle hits this obstacle
    pub bounce_factor: Option<f32>,
    /// Convex / trimesh vertices
    pub vertices: Vec<Vec3>,
    /// Trimesh triangle indices
    pub indices: Vec<u32>,
}

impl Default for ObstacleDescriptor {
    fn default() -> Self {
        Self {
            kind: String::new(),
            shape: "box".to_string(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            mass: 0.0,
            material: "obstacle".to_string(),
            bounce_factor: None,
            vertices: Vec::new(),
            indices: Vec::new(),
        }
    }
}

/// A hazard area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardZoneDescriptor {
    /// Hazard tag ("oil", "ice")
    pub kind: String,
    pub points: Vec<Vec3>,
}

/// One end of a checkpoint gate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckpointPoint {
    pub index: usize,
    pub position: Vec3,
}

/// Everything needed to build a track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackDefinition {
    /// Drivable area polygons; inside any of them counts as on track
    pub bounds: Vec<Vec<Vec3>>,
    pub obstacles: Vec<ObstacleDescriptor>,
    pub hazards: Vec<HazardZoneDescriptor>,
    /// Two entries per gate index
    pub checkpoints: Vec<CheckpointPoint>,
    pub start_position: Vec3,
    pub start_rotation: Quat,
    /// Overrides the configured lap count
    pub total_laps: Option<u32>,
}

impl Default for TrackDefinition {
    fn default() -> Self {
        Self {
            bounds: Vec::new(),
            obstacles: Vec::new(),
            hazards: Vec::new(),
            checkpoints: Vec::new(),
            start_position: Vec3::ZERO,
            start_rotation: Quat::IDENTITY,
            total_laps: None,
        }
    }
}

impl TrackDefinition {
    pub fn from_json(json: &str) -> Result<Self, TrackLoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, TrackLoadError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add both ends of a gate.
    pub fn with_gate(mut self, index: usize, a: Vec3, b: Vec3) -> Self {
        self.checkpoints.push(CheckpointPoint { index, position: a });
        self.checkpoints.push(CheckpointPoint { index, position: b });
        self
    }
}
