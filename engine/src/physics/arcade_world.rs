//! Arcade physics backend
//!
//! A small fixed-timestep rigid-body world, built for the handful of bodies
//! a single-track race needs: one or more cars, static track obstacles and a
//! ground plane.
//!
//! # Stepping
//!
//! [`ArcadeWorld::step`] takes the wall-clock frame delta and runs as many
//! fixed sub-steps (default 1/120 s) as fit, capped at `max_substeps`. The
//! leftover time carries into the next call; backlog beyond the cap is
//! dropped so a long frame cannot trigger a spiral of catch-up steps.
//!
//! # Sub-step
//!
//! 1. Integrate forces, gravity and damping into velocity (semi-implicit Euler)
//! 2. Integrate velocity into position, angular velocity into rotation
//! 3. Detect contacts for every pair with at least one awake dynamic body
//! 4. Resolve: positional correction, normal impulse with restitution, friction
//! 5. Record a [`ContactEvent`] for each dynamic body involved

use std::collections::{BTreeMap, BTreeSet};

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::backend::{BodyHandle, PhysicsWorld, RigidBody};
use super::collision::{Collider, Obb, collide};
use super::contact::{ContactEvent, ContactQueue, DEFAULT_CONTACT_CAPACITY};
use super::material::{ContactMaterialTable, MaterialTag};
use super::shape::{Shape, ShapeDefinition, ShapeKind, sanitize_mass};
use crate::error::PhysicsError;

/// Default physics timestep (seconds).
pub const FIXED_TIMESTEP: f32 = 1.0 / 120.0;

/// Default cap on sub-steps per `step` call.
pub const MAX_SUBSTEPS: u32 = 8;

static_assertions::const_assert!(MAX_SUBSTEPS > 0);
static_assertions::const_assert!(FIXED_TIMESTEP > 0.0);

/// Penetration allowed before positional correction kicks in (meters).
const PENETRATION_SLOP: f32 = 0.005;

/// Fraction of the penetration corrected per sub-step.
const CORRECTION_PERCENT: f32 = 0.8;

/// Configuration for the arcade physics world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Gravity acceleration (m/s²)
    pub gravity: Vec3,
    /// Fixed sub-step length (seconds)
    pub fixed_timestep: f32,
    /// Maximum sub-steps per frame
    pub max_substeps: u32,
    /// Linear velocity damping per second (0 = none)
    pub linear_damping: f32,
    /// Angular velocity damping per second (0 = none)
    pub angular_damping: f32,
    /// Contact events kept per step
    pub contact_capacity: usize,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.82, 0.0),
            fixed_timestep: FIXED_TIMESTEP,
            max_substeps: MAX_SUBSTEPS,
            linear_damping: 0.01,
            angular_damping: 0.01,
            contact_capacity: DEFAULT_CONTACT_CAPACITY,
        }
    }
}

// ============================================================================
// BODY
// ============================================================================

/// A body simulated by [`ArcadeWorld`].
#[derive(Debug, Clone)]
pub struct ArcadeBody {
    shape: Shape,
    material: MaterialTag,
    position: Vec3,
    rotation: Quat,
    velocity: Vec3,
    angular_velocity: Vec3,
    mass: f32,
    scale: Vec3,
    /// Force accumulated for the next sub-step
    force: Vec3,
    sleeping: bool,
}

impl ArcadeBody {
    fn from_definition(definition: &ShapeDefinition) -> Self {
        Self {
            shape: definition.shape.clone(),
            material: definition.material,
            position: definition.position,
            rotation: normalized_or_identity(definition.rotation),
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: sanitize_mass(definition.mass),
            scale: definition.scale,
            force: Vec3::ZERO,
            sleeping: false,
        }
    }

    fn inverse_mass(&self) -> f32 {
        if self.mass > 0.0 && !self.sleeping {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// Collision primitive at the current pose.
    pub fn collider(&self) -> Collider {
        match &self.shape {
            Shape::Sphere { radius } => Collider::Sphere {
                center: self.position,
                radius: radius * self.scale.abs().max_element(),
            },
            Shape::Plane => Collider::Plane {
                point: self.position,
                normal: self.rotation * Vec3::Y,
            },
            other => {
                let half_extents = other.local_half_extents().unwrap_or(Vec3::ZERO) * self.scale.abs();
                Collider::Box(Obb::new(self.position, self.rotation, half_extents))
            }
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

fn normalized_or_identity(rotation: Quat) -> Quat {
    let normalized = rotation.normalize();
    if normalized.is_finite() {
        normalized
    } else {
        Quat::IDENTITY
    }
}

impl RigidBody for ArcadeBody {
    fn shape_kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    fn material(&self) -> MaterialTag {
        self.material
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        if position.is_finite() {
            self.position = position;
        }
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        let normalized = rotation.normalize();
        if normalized.is_finite() {
            self.rotation = normalized;
        }
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        if velocity.is_finite() {
            self.velocity = velocity;
            if velocity != Vec3::ZERO {
                self.sleeping = false;
            }
        }
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn set_angular_velocity(&mut self, angular_velocity: Vec3) {
        if angular_velocity.is_finite() {
            self.angular_velocity = angular_velocity;
        }
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn set_mass(&mut self, mass: f32) {
        self.mass = sanitize_mass(mass);
    }

    fn scale(&self) -> Vec3 {
        self.scale
    }

    fn set_scale(&mut self, scale: Vec3) -> Result<(), PhysicsError> {
        let kind = self.shape.kind();
        let supported = match kind {
            ShapeKind::Box | ShapeKind::Convex | ShapeKind::TriMesh => true,
            // Radius must stay circular
            ShapeKind::Cylinder => (scale.x - scale.z).abs() < 1e-6,
            ShapeKind::Sphere | ShapeKind::Plane => false,
        };
        if !supported {
            return Err(PhysicsError::UnsupportedOperation {
                operation: "set_scale",
                shape: kind.as_str(),
            });
        }
        self.scale = scale;
        Ok(())
    }

    fn apply_force(&mut self, force: Vec3) {
        if force.is_finite() {
            self.force += force;
            self.sleeping = false;
        }
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        if self.mass > 0.0 && impulse.is_finite() {
            self.velocity += impulse / self.mass;
            self.sleeping = false;
        }
    }

    fn sleep(&mut self) {
        self.sleeping = true;
        self.velocity = Vec3::ZERO;
        self.angular_velocity = Vec3::ZERO;
    }

    fn wake_up(&mut self) {
        self.sleeping = false;
    }

    fn is_sleeping(&self) -> bool {
        self.sleeping
    }
}

// ============================================================================
// WORLD
// ============================================================================

/// Fixed-timestep physics world.
#[derive(Debug)]
pub struct ArcadeWorld {
    config: PhysicsConfig,
    /// Every stored body, simulated or not
    bodies: BTreeMap<BodyHandle, ArcadeBody>,
    /// Handles currently simulated
    active: BTreeSet<BodyHandle>,
    next_id: u32,
    /// Unsimulated wall-clock time carried between steps
    accumulator: f32,
    materials: ContactMaterialTable,
    contacts: ContactQueue,
    /// Total sub-steps run since creation
    substeps_run: u64,
}

impl Default for ArcadeWorld {
    fn default() -> Self {
        Self::new(PhysicsConfig::default())
    }
}

impl ArcadeWorld {
    pub fn new(config: PhysicsConfig) -> Self {
        let contacts = ContactQueue::with_capacity(config.contact_capacity);
        Self {
            config,
            bodies: BTreeMap::new(),
            active: BTreeSet::new(),
            next_id: 1,
            accumulator: 0.0,
            materials: ContactMaterialTable::default(),
            contacts,
            substeps_run: 0,
        }
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Fraction of a sub-step left in the accumulator, for render interpolation.
    pub fn interpolation_alpha(&self) -> f32 {
        let h = self.timestep();
        (self.accumulator / h).clamp(0.0, 1.0)
    }

    pub fn substeps_run(&self) -> u64 {
        self.substeps_run
    }

    /// Number of stored bodies, simulated or not.
    pub fn stored_body_count(&self) -> usize {
        self.bodies.len()
    }

    fn timestep(&self) -> f32 {
        if self.config.fixed_timestep > 0.0 {
            self.config.fixed_timestep
        } else {
            FIXED_TIMESTEP
        }
    }

    fn substep(&mut self, h: f32) {
        self.integrate(h);
        self.resolve_contacts();
        self.substeps_run += 1;
    }

    fn integrate(&mut self, h: f32) {
        let gravity = self.config.gravity;
        let linear_keep = (1.0 - self.config.linear_damping * h).clamp(0.0, 1.0);
        let angular_keep = (1.0 - self.config.angular_damping * h).clamp(0.0, 1.0);

        for handle in &self.active {
            let Some(body) = self.bodies.get_mut(handle) else {
                continue;
            };
            if body.is_static() || body.sleeping {
                body.force = Vec3::ZERO;
                continue;
            }

            let acceleration = gravity + body.force / body.mass;
            body.velocity = (body.velocity + acceleration * h) * linear_keep;
            body.position += body.velocity * h;

            body.angular_velocity *= angular_keep;
            if body.angular_velocity.length_squared() > 1e-12 {
                let delta = Quat::from_scaled_axis(body.angular_velocity * h);
                body.rotation = (delta * body.rotation).normalize();
            }
            body.force = Vec3::ZERO;
        }
    }

    fn resolve_contacts(&mut self) {
        let handles: Vec<BodyHandle> = self.active.iter().copied().collect();

        for (i, &a) in handles.iter().enumerate() {
            for &b in &handles[i + 1..] {
                self.resolve_pair(a, b);
            }
        }
    }

    fn resolve_pair(&mut self, a: BodyHandle, b: BodyHandle) {
        let (Some(body_a), Some(body_b)) = (self.bodies.get(&a), self.bodies.get(&b)) else {
            return;
        };

        let a_moves = !body_a.is_static() && !body_a.sleeping;
        let b_moves = !body_b.is_static() && !body_b.sleeping;
        if !a_moves && !b_moves {
            return;
        }

        let Some(contact) = collide(&body_a.collider(), &body_b.collider()) else {
            return;
        };

        // A moving body touching a sleeping one wakes it
        let wake_a = body_a.sleeping && !body_a.is_static();
        let wake_b = body_b.sleeping && !body_b.is_static();
        let material_a = body_a.material;
        let material_b = body_b.material;
        let surface = self.materials.get(material_a, material_b);

        if wake_a {
            if let Some(body) = self.bodies.get_mut(&a) {
                body.sleeping = false;
            }
        }
        if wake_b {
            if let Some(body) = self.bodies.get_mut(&b) {
                body.sleeping = false;
            }
        }

        let (Some(body_a), Some(body_b)) = (self.bodies.get(&a), self.bodies.get(&b)) else {
            return;
        };
        let inv_a = body_a.inverse_mass();
        let inv_b = body_b.inverse_mass();
        let inv_total = inv_a + inv_b;
        if inv_total <= 0.0 {
            return;
        }

        let n = contact.normal;
        let correction = n * ((contact.depth - PENETRATION_SLOP).max(0.0) * CORRECTION_PERCENT / inv_total);

        // Relative velocity of b with respect to a along the normal; negative = approaching
        let relative = body_b.velocity - body_a.velocity;
        let approach = relative.dot(n);
        let mut impulse_a = Vec3::ZERO;
        let mut impulse_b = Vec3::ZERO;

        if approach < 0.0 {
            let j = -(1.0 + surface.restitution) * approach / inv_total;
            impulse_a -= n * j;
            impulse_b += n * j;

            let tangent = relative - n * approach;
            let tangent_speed = tangent.length();
            if tangent_speed > 1e-6 && surface.friction > 0.0 {
                let jt = (tangent_speed / inv_total).min(surface.friction * j);
                let t = tangent / tangent_speed;
                impulse_a += t * jt;
                impulse_b -= t * jt;
            }
        }

        if let Some(body) = self.bodies.get_mut(&a) {
            body.position -= correction * inv_a;
            body.velocity += impulse_a * inv_a;
        }
        if let Some(body) = self.bodies.get_mut(&b) {
            body.position += correction * inv_b;
            body.velocity += impulse_b * inv_b;
        }

        if inv_a > 0.0 {
            self.contacts.push(ContactEvent {
                body: a,
                other: b,
                other_material: material_b,
                normal: n,
                depth: contact.depth,
            });
        }
        if inv_b > 0.0 {
            self.contacts.push(ContactEvent {
                body: b,
                other: a,
                other_material: material_a,
                normal: -n,
                depth: contact.depth,
            });
        }
    }
}

impl PhysicsWorld for ArcadeWorld {
    type Body = ArcadeBody;

    fn create_body(&mut self, definition: &ShapeDefinition) -> Result<BodyHandle, PhysicsError> {
        if let Some(reason) = definition.shape.degenerate_reason() {
            return Err(PhysicsError::UnsupportedShape(reason));
        }
        if definition.kind() == ShapeKind::Plane && !definition.is_static() {
            return Err(PhysicsError::UnsupportedShape(
                "planes can only be static".to_string(),
            ));
        }

        let handle = BodyHandle::from_raw(self.next_id);
        self.next_id += 1;
        self.bodies.insert(handle, ArcadeBody::from_definition(definition));
        log::trace!(
            "created {} body {} (mass {})",
            definition.kind(),
            handle.id(),
            definition.mass
        );
        Ok(handle)
    }

    fn add_body(&mut self, handle: BodyHandle) -> Result<(), PhysicsError> {
        if !self.bodies.contains_key(&handle) {
            return Err(PhysicsError::UnknownBody(handle.id()));
        }
        self.active.insert(handle);
        Ok(())
    }

    fn remove_body(&mut self, handle: BodyHandle) {
        if self.active.remove(&handle) {
            self.contacts.forget(handle);
        }
    }

    fn destroy_body(&mut self, handle: BodyHandle) {
        self.remove_body(handle);
        self.bodies.remove(&handle);
    }

    fn contains(&self, handle: BodyHandle) -> bool {
        self.active.contains(&handle)
    }

    fn body(&self, handle: BodyHandle) -> Option<&ArcadeBody> {
        self.bodies.get(&handle)
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut ArcadeBody> {
        self.bodies.get_mut(&handle)
    }

    fn body_count(&self) -> usize {
        self.active.len()
    }

    fn gravity(&self) -> Vec3 {
        self.config.gravity
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.config.gravity = gravity;
    }

    fn contact_materials(&self) -> &ContactMaterialTable {
        &self.materials
    }

    fn contact_materials_mut(&mut self) -> &mut ContactMaterialTable {
        &mut self.materials
    }

    fn step(&mut self, dt: f32) -> u32 {
        self.contacts.begin_step();
        if !dt.is_finite() || dt <= 0.0 {
            return 0;
        }

        let h = self.timestep();
        let max_substeps = self.config.max_substeps.max(1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= h && substeps < max_substeps {
            self.substep(h);
            self.accumulator -= h;
            substeps += 1;
        }

        if self.accumulator >= h {
            log::debug!(
                "physics backlog of {:.4}s exceeds {} sub-steps, dropping it",
                self.accumulator,
                max_substeps
            );
            self.accumulator %= h;
        }

        log::trace!(
            "physics step: dt={dt:.4} substeps={substeps} bodies={} contacts={}",
            self.active.len(),
            self.contacts.len()
        );
        substeps
    }

    fn drain_contacts(&mut self, body: BodyHandle) -> Vec<ContactEvent> {
        self.contacts.drain_for(body)
    }
}
