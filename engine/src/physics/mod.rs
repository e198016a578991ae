//! Physics module
//!
//! Shape catalog, backend abstraction and the bundled arcade backend.
//!
//! # Unit System
//!
//! **1 unit = 1 meter** (SI units throughout): distances in meters,
//! velocities in m/s, masses in kg.
//!
//! # Submodules
//!
//! - [`types`] - glam re-exports and angle helpers
//! - [`shape`] - declarative shape descriptors
//! - [`material`] - material tags and the contact-material table
//! - [`backend`] - `PhysicsWorld` / `RigidBody` capability traits
//! - [`contact`] - contact events and the bounded per-step queue
//! - [`collision`] - narrow-phase tests (sphere, oriented box, plane)
//! - [`arcade_world`] - fixed-timestep backend implementing the traits

pub mod arcade_world;
pub mod backend;
pub mod collision;
pub mod contact;
pub mod material;
pub mod shape;
pub mod types;

pub use arcade_world::{ArcadeBody, ArcadeWorld, FIXED_TIMESTEP, MAX_SUBSTEPS, PhysicsConfig};
pub use backend::{BodyHandle, PhysicsWorld, RigidBody};
pub use contact::{ContactEvent, ContactQueue};
pub use material::{ContactMaterial, ContactMaterialTable, MaterialTag};
pub use shape::{Shape, ShapeDefinition, ShapeKind};
pub use types::{Quat, Vec2, Vec3};
