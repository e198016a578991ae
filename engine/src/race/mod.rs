//! Race orchestration
//!
//! - [`context`] - [`RaceContext`], the per-race owner of world and subsystems
//! - [`snapshot`] - [`RaceSnapshot`], the per-tick output

pub mod context;
pub mod snapshot;

pub use context::RaceContext;
pub use snapshot::RaceSnapshot;
