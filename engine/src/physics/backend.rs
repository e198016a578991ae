//! Physics backend capability traits
//!
//! Game systems talk to physics only through [`PhysicsWorld`] and
//! [`RigidBody`]. A backend is chosen once, when the race context is built,
//! and injected as a type parameter; nothing else in the crate names a
//! concrete backend.
//!
//! Bodies are addressed by [`BodyHandle`]. The subsystem that created a
//! body owns its handle and is responsible for destroying it; the world
//! only tracks handles for stepping and contact dispatch.

use glam::{Quat, Vec3};

use super::contact::ContactEvent;
use super::material::{ContactMaterialTable, MaterialTag};
use super::shape::{ShapeDefinition, ShapeKind};
use crate::error::PhysicsError;

/// Opaque identifier of a body inside one physics world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(u32);

impl BodyHandle {
    /// Build a handle from a backend-assigned id.
    pub const fn from_raw(id: u32) -> Self {
        Self(id)
    }

    pub const fn id(self) -> u32 {
        self.0
    }
}

/// One simulated rigid body.
pub trait RigidBody {
    fn shape_kind(&self) -> ShapeKind;
    fn material(&self) -> MaterialTag;

    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);

    /// Unit quaternion.
    fn rotation(&self) -> Quat;
    /// Setters normalize; non-finite rotations are ignored.
    fn set_rotation(&mut self, rotation: Quat);

    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);

    fn angular_velocity(&self) -> Vec3;
    fn set_angular_velocity(&mut self, angular_velocity: Vec3);

    fn mass(&self) -> f32;
    /// Negative masses are coerced to 0 (static).
    fn set_mass(&mut self, mass: f32);

    fn scale(&self) -> Vec3;
    /// Rescale the body's geometry. Backends report shapes they cannot
    /// rescale with [`PhysicsError::UnsupportedOperation`] and leave the
    /// body untouched.
    fn set_scale(&mut self, scale: Vec3) -> Result<(), PhysicsError>;

    /// Force applied over the next step (N).
    fn apply_force(&mut self, force: Vec3);
    /// Instant change of momentum (N*s).
    fn apply_impulse(&mut self, impulse: Vec3);

    fn sleep(&mut self);
    fn wake_up(&mut self);
    fn is_sleeping(&self) -> bool;

    fn is_static(&self) -> bool {
        self.mass() <= 0.0
    }
}

/// A physics world: body storage, gravity, contact materials and stepping.
pub trait PhysicsWorld {
    type Body: RigidBody;

    /// Build a body from a shape definition. The body is stored but not
    /// simulated until [`add_body`](Self::add_body) is called.
    fn create_body(&mut self, definition: &ShapeDefinition) -> Result<BodyHandle, PhysicsError>;

    /// Start simulating a stored body. No-op if it is already simulated.
    fn add_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError>;

    /// Stop simulating a body. No-op if it is not simulated. The body stays
    /// stored and can be added again.
    fn remove_body(&mut self, handle: BodyHandle);

    /// Remove and release a body entirely. No-op for unknown handles.
    fn destroy_body(&mut self, handle: BodyHandle);

    /// Whether the body is currently simulated.
    fn contains(&self, handle: BodyHandle) -> bool;

    fn body(&self, handle: BodyHandle) -> Option<&Self::Body>;
    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Self::Body>;

    /// Number of simulated bodies.
    fn body_count(&self) -> usize;

    fn gravity(&self) -> Vec3;
    fn set_gravity(&mut self, gravity: Vec3);

    fn contact_materials(&self) -> &ContactMaterialTable;
    fn contact_materials_mut(&mut self) -> &mut ContactMaterialTable;

    /// Advance the simulation by a wall-clock `dt`. Backends quantize it into
    /// fixed sub-steps and return how many ran.
    fn step(&mut self, dt: f32) -> u32;

    /// Remove and return the contacts recorded for `body` by the last step.
    fn drain_contacts(&mut self, body: BodyHandle) -> Vec<ContactEvent>;

    /// Create a body and start simulating it.
    fn spawn_body(&mut self, definition: &ShapeDefinition) -> Result<BodyHandle, PhysicsError> {
        let handle = self.create_body(definition)?;
        self.add_body(handle)?;
        Ok(handle)
    }
}
