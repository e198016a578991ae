//! Error Types
//!
//! Three families of failure exist in the core:
//!
//! - [`ConfigError`] - malformed track or catalog data. Fatal at load time.
//! - [`PhysicsError`] - the backend refused a request (unknown body, a shape it
//!   cannot simulate, an operation it cannot perform on a shape).
//! - [`TrackLoadError`] - everything that can stop a race from being built.
//!
//! Per-tick code never returns these. It logs and skips instead.

use std::fmt;

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

/// Malformed load-time data. A race with a configuration error never starts.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Shape tag is not one of box/sphere/cylinder/plane/convex/trimesh.
    UnknownShape(String),
    /// Material tag is not one of default/obstacle/car.
    UnknownMaterial(String),
    /// Hazard zone tag is not a known hazard kind.
    UnknownHazard(String),
    /// Checkpoint indices do not form a contiguous ring of gates.
    MalformedCheckpoints(String),
    /// A convex or trimesh obstacle came without its vertex data.
    MissingGeometry(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::UnknownShape(tag) => write!(f, "unknown shape tag: {tag:?}"),
            ConfigError::UnknownMaterial(tag) => write!(f, "unknown material tag: {tag:?}"),
            ConfigError::UnknownHazard(tag) => write!(f, "unknown hazard tag: {tag:?}"),
            ConfigError::MalformedCheckpoints(reason) => {
                write!(f, "malformed checkpoints: {reason}")
            }
            ConfigError::MissingGeometry(what) => write!(f, "missing geometry: {what}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// PHYSICS BACKEND ERRORS
// ============================================================================

/// Requests a physics backend could not honour.
#[derive(Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// The backend cannot build a body for this shape (or its geometry is degenerate).
    UnsupportedShape(String),
    /// The backend cannot perform `operation` on a body of shape `shape`.
    UnsupportedOperation {
        operation: &'static str,
        shape: &'static str,
    },
    /// The handle does not refer to a body in this world.
    UnknownBody(u32),
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhysicsError::UnsupportedShape(reason) => write!(f, "unsupported shape: {reason}"),
            PhysicsError::UnsupportedOperation { operation, shape } => {
                write!(f, "operation `{operation}` is not supported for {shape} bodies")
            }
            PhysicsError::UnknownBody(id) => write!(f, "no body with id {id}"),
        }
    }
}

impl std::error::Error for PhysicsError {}

// ============================================================================
// TRACK LOADING
// ============================================================================

/// Errors that prevent a track (and therefore a race) from loading.
#[derive(Debug)]
pub enum TrackLoadError {
    /// Track definition JSON could not be parsed.
    Json(serde_json::Error),
    /// Track data is malformed.
    Config(ConfigError),
    /// The physics backend rejected one of the track's bodies.
    Physics(PhysicsError),
}

impl fmt::Display for TrackLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackLoadError::Json(e) => write!(f, "JSON error: {e}"),
            TrackLoadError::Config(e) => write!(f, "configuration error: {e}"),
            TrackLoadError::Physics(e) => write!(f, "physics error: {e}"),
        }
    }
}

impl std::error::Error for TrackLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackLoadError::Json(e) => Some(e),
            TrackLoadError::Config(e) => Some(e),
            TrackLoadError::Physics(e) => Some(e),
        }
    }
}

impl From<serde_json::Error> for TrackLoadError {
    fn from(e: serde_json::Error) -> Self {
        TrackLoadError::Json(e)
    }
}

impl From<ConfigError> for TrackLoadError {
    fn from(e: ConfigError) -> Self {
        TrackLoadError::Config(e)
    }
}

impl From<PhysicsError> for TrackLoadError {
    fn from(e: PhysicsError) -> Self {
        TrackLoadError::Physics(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = ConfigError::UnknownShape("pyramid".to_string());
        assert_eq!(e.to_string(), "unknown shape tag: \"pyramid\"");

        let e = PhysicsError::UnsupportedOperation {
            operation: "set_scale",
            shape: "sphere",
        };
        assert_eq!(
            e.to_string(),
            "operation `set_scale` is not supported for sphere bodies"
        );
    }

    #[test]
    fn test_track_load_error_wraps_source() {
        use std::error::Error;

        let e: TrackLoadError = ConfigError::UnknownMaterial("rubber".to_string()).into();
        assert!(matches!(e, TrackLoadError::Config(_)));
        assert!(e.source().is_some());
    }
}
