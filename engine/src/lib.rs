//! Arcade Racer Engine Library
//!
//! Simulation core for a single-track arcade racer: a small physics
//! backend, the vehicle driving model, checkpoint and lap tracking, surface
//! hazards and ghost laps. Rendering, audio, UI and input devices live in
//! the host; the core consumes a [`DriverIntent`] and a frame delta and
//! returns a [`RaceSnapshot`].
//!
//! # Modules
//!
//! - [`physics`] - Backend traits, shapes, materials, contacts and the `ArcadeWorld` backend
//! - [`vehicle`] - Speed, steering, drift, collision response and integration
//! - [`track`] - Track loading, bounds, checkpoints and the lap state machine
//! - [`hazard`] - Oil and ice effects on handling
//! - [`ghost`] - Lap recording and playback
//! - [`race`] - `RaceContext`, which runs one race tick by tick
//! - [`config`] - `RaceConfig`, every tunable in one serde document
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```ignore
//! use arcade_racer_engine::{ArcadeWorld, DriverIntent, RaceConfig, RaceContext, TrackDefinition};
//!
//! let track = TrackDefinition::from_json(&std::fs::read_to_string("track.json")?)?;
//! let config = RaceConfig::default();
//! let world = ArcadeWorld::new(config.physics.clone());
//! let mut race = RaceContext::new(world, config, &track)?;
//!
//! race.start();
//! loop {
//!     let intent = DriverIntent { forward: true, ..Default::default() };
//!     let snapshot = race.tick(1.0 / 60.0, &intent);
//!     // draw snapshot.position / snapshot.visual_rotation, show snapshot.events
//! }
//! ```

pub mod config;
pub mod error;
pub mod ghost;
pub mod hazard;
pub mod physics;
pub mod race;
pub mod track;
pub mod vehicle;

// Re-export the types a host needs at crate level
pub use config::RaceConfig;
pub use error::{ConfigError, PhysicsError, TrackLoadError};
pub use ghost::{GhostConfig, GhostPose, GhostSample};
pub use hazard::{HazardConfig, HazardKind};
pub use physics::{ArcadeWorld, BodyHandle, PhysicsConfig, PhysicsWorld, RigidBody};
pub use race::{RaceContext, RaceSnapshot};
pub use track::{LapConfig, RaceEvent, RacePhase, TrackDefinition};
pub use vehicle::{DriverIntent, SteeringMode, VehicleConfig};
