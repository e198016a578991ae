//! Ghost Recording and Playback
//!
//! The recorder samples the car while racing; each completed lap is
//! committed as an immutable shared buffer that the player replays during
//! the next lap.

pub mod player;
pub mod recorder;

pub use player::{GhostPlayer, GhostPose};
pub use recorder::{GHOST_FREQUENCY, GhostConfig, GhostRecorder, GhostSample, MAX_GHOST_SAMPLES};
