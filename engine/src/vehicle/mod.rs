//! Vehicle Dynamics
//!
//! Arcade driving model for one car. The car is a single dynamic box body in
//! the physics world; everything else (speed, steer, drift, collision
//! cooldown) is scalar state owned by [`Vehicle`].
//!
//! # Per-tick order
//!
//! 1. Drain contacts recorded by the previous physics step
//! 2. Resolve the steering mode, then drift
//! 3. Speed, then steering
//! 4. Collision response (bounce, grounded flag)
//! 5. Integrate and write the body
//!
//! # Modules
//!
//! - `config`: tunables ([`VehicleConfig`])
//! - `input`: [`DriverIntent`] and [`SteeringMode`]
//! - `state`: [`VehicleState`]
//! - `speed`, `steering`, `collision`, `integrate`: the update stages

pub mod collision;
pub mod config;
pub mod input;
pub mod integrate;
pub mod speed;
pub mod state;
pub mod steering;

pub use collision::{BounceFactors, DEFAULT_BOUNCE_FACTOR};
pub use config::{COLLISION_COOLDOWN, MAX_SPEED, MAX_STEER, MIN_SPEED, VehicleConfig};
pub use input::{DriverIntent, SteeringMode};
pub use integrate::Handling;
pub use speed::SpeedLimits;
pub use state::{CollisionState, DriftState, VehicleState};
pub use steering::DriftTransition;

use glam::{Quat, Vec3};

use crate::error::PhysicsError;
use crate::physics::types::yaw_of;
use crate::physics::{BodyHandle, MaterialTag, PhysicsWorld, RigidBody, ShapeDefinition};
use integrate::BodyPose;

/// Per-tick inputs the vehicle reads from the rest of the race.
#[derive(Debug, Clone, Copy)]
pub struct VehicleContext<'a> {
    /// Acceleration is only allowed once the race is running
    pub race_started: bool,
    /// Footprint was inside the track bounds last tick
    pub inside_track: bool,
    /// Surface handling multipliers (hazards)
    pub handling: Handling,
    pub bounce_factors: &'a BounceFactors,
}

/// One drivable car.
#[derive(Debug, Clone)]
pub struct Vehicle {
    body: Option<BodyHandle>,
    state: VehicleState,
    config: VehicleConfig,
}

impl Vehicle {
    /// Create the chassis body and a vehicle occupying it.
    pub fn spawn<W: PhysicsWorld>(
        world: &mut W,
        config: VehicleConfig,
        position: Vec3,
        rotation: Quat,
    ) -> Result<Self, PhysicsError> {
        let definition = ShapeDefinition::cuboid(config.half_extents)
            .with_position(position)
            .with_rotation(rotation)
            .with_mass(config.mass)
            .with_material(MaterialTag::Car);
        let body = world.spawn_body(&definition)?;
        log::debug!("vehicle spawned as body {} at {position}", body.id());

        Ok(Self {
            body: Some(body),
            state: VehicleState::new(position.y),
            config,
        })
    }

    /// A vehicle without a body. Every update is a no-op until respawned
    /// through [`Vehicle::spawn`].
    pub fn detached(config: VehicleConfig) -> Self {
        Self {
            body: None,
            state: VehicleState::default(),
            config,
        }
    }

    /// Advance the driving model by one tick and write the result into the
    /// body. No-op if the body is gone.
    pub fn update<W: PhysicsWorld>(&mut self, world: &mut W, intent: &DriverIntent, ctx: &VehicleContext<'_>, dt: f32) {
        let Some(handle) = self.body else {
            return;
        };
        if !world.contains(handle) {
            return;
        }
        let contacts = world.drain_contacts(handle);
        if !self.state.occupied {
            return;
        }
        if intent.exit {
            self.exit(world);
            return;
        }

        let Some(body) = world.body(handle) else {
            return;
        };
        let mut pose = BodyPose {
            position: body.position(),
            rotation: body.rotation(),
            velocity: body.velocity(),
            angular_velocity: body.angular_velocity(),
        };
        let config = &self.config;
        let state = &mut self.state;

        // Steering mode first: drift depends on it
        let mode = intent.steering_mode();
        state.steering_mode = mode;

        let transition = steering::update_drift(&mut state.drift, mode, state.speed, state.steer, config, dt);
        if let DriftTransition::Ended { yaw_offset } = transition {
            pose.rotation = (Quat::from_rotation_y(yaw_offset) * pose.rotation).normalize();
            log::trace!("drift ended, folding {yaw_offset:.3} rad into body yaw");
        }

        let limits = SpeedLimits::new(config, mode, ctx.inside_track);
        state.speed = speed::update_speed(state.speed, intent, ctx.race_started, &limits, config, dt);

        state.steer = match mode {
            SteeringMode::Absolute => steering::absolute_steer(
                intent.camera_heading,
                yaw_of(pose.rotation),
                config.absolute_steer_gain,
                config.steer_limit(),
            ),
            SteeringMode::Incremental => steering::incremental_steer(state.steer, intent.steer_axis(), config, dt),
        };

        let forward = pose.rotation * Vec3::Z;
        collision::respond(state, &contacts, forward, ctx.bounce_factors, config, dt);

        let mut motion = integrate::integrate(
            &pose,
            state.speed,
            state.steer,
            state.is_airborne(),
            state.start_height,
            state.collision.counter_velocity,
            ctx.handling,
            config,
            dt,
        );
        motion.velocity = collision::strip_contact_velocity(motion.velocity, &contacts, state.is_airborne(), config);

        if let Some(body) = world.body_mut(handle) {
            body.set_position(motion.position);
            body.set_rotation(motion.rotation);
            body.set_velocity(motion.velocity);
            body.set_angular_velocity(motion.angular_velocity);
        }
    }

    /// Put a driver back in the car.
    pub fn enter(&mut self) {
        self.state.occupied = true;
    }

    /// Leave the car: stop driving and kill horizontal motion once.
    pub fn exit<W: PhysicsWorld>(&mut self, world: &mut W) {
        if !self.state.occupied {
            return;
        }
        self.state.occupied = false;
        self.state.speed = 0.0;
        self.state.steer = 0.0;
        self.state.drift.reset();

        if let Some(body) = self.body.and_then(|h| world.body_mut(h)) {
            let v = body.velocity();
            body.set_velocity(Vec3::new(0.0, v.y, 0.0));
        }
        log::debug!("driver left the vehicle");
    }

    /// Teleport to a pose and clear all motion state.
    pub fn respawn<W: PhysicsWorld>(&mut self, world: &mut W, position: Vec3, rotation: Quat) {
        let Some(body) = self.body.and_then(|h| world.body_mut(h)) else {
            return;
        };
        body.set_position(position);
        body.set_rotation(rotation);
        body.set_velocity(Vec3::ZERO);
        body.set_angular_velocity(Vec3::ZERO);
        body.wake_up();

        self.state.reset_motion();
        self.state.start_height = position.y;
        log::debug!("vehicle respawned at {position}");
    }

    /// Destroy the chassis body. The vehicle becomes detached.
    pub fn teardown<W: PhysicsWorld>(&mut self, world: &mut W) {
        if let Some(handle) = self.body.take() {
            world.destroy_body(handle);
        }
    }

    // ========================================================================
    // GETTERS
    // ========================================================================

    pub fn get_body(&self) -> Option<BodyHandle> {
        self.body
    }

    pub fn get_state(&self) -> &VehicleState {
        &self.state
    }

    pub fn get_config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn get_speed(&self) -> f32 {
        self.state.speed
    }

    pub fn get_steer(&self) -> f32 {
        self.state.steer
    }

    pub fn is_occupied(&self) -> bool {
        self.state.occupied
    }

    pub fn is_drifting(&self) -> bool {
        self.state.drift.active
    }

    pub fn get_position<W: PhysicsWorld>(&self, world: &W) -> Option<Vec3> {
        self.body.and_then(|h| world.body(h)).map(|b| b.position())
    }

    pub fn get_rotation<W: PhysicsWorld>(&self, world: &W) -> Option<Quat> {
        self.body.and_then(|h| world.body(h)).map(|b| b.rotation())
    }

    /// Body rotation plus the drift yaw offset, for rendering.
    pub fn get_visual_rotation<W: PhysicsWorld>(&self, world: &W) -> Option<Quat> {
        let rotation = self.get_rotation(world)?;
        if !self.state.drift.active {
            return Some(rotation);
        }
        let offset = self.state.drift.factor * self.config.drift_visual_angle;
        Some((Quat::from_rotation_y(offset) * rotation).normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ArcadeWorld;

    fn setup() -> (ArcadeWorld, Vehicle, BounceFactors) {
        let mut world = ArcadeWorld::default();
        world
            .spawn_body(&ShapeDefinition::ground_plane())
            .unwrap();
        let config = VehicleConfig::default();
        let y = config.half_extents.y;
        let vehicle = Vehicle::spawn(&mut world, config, Vec3::new(0.0, y, 0.0), Quat::IDENTITY).unwrap();
        (world, vehicle, BounceFactors::new())
    }

    fn drive(world: &mut ArcadeWorld, vehicle: &mut Vehicle, factors: &BounceFactors, intent: &DriverIntent, ticks: usize) {
        let ctx = VehicleContext {
            race_started: true,
            inside_track: true,
            handling: Handling::default(),
            bounce_factors: factors,
        };
        for _ in 0..ticks {
            vehicle.update(world, intent, &ctx, 1.0 / 60.0);
            world.step(1.0 / 60.0);
        }
    }

    #[test]
    fn test_throttle_moves_car_forward() {
        let (mut world, mut vehicle, factors) = setup();
        let intent = DriverIntent {
            forward: true,
            ..Default::default()
        };
        drive(&mut world, &mut vehicle, &factors, &intent, 60);
        assert!(vehicle.get_speed() > 10.0);
        let position = vehicle.get_position(&world).unwrap();
        assert!(position.z > 5.0, "car at {position}");
        assert!(position.x.abs() < 1e-3);
    }

    #[test]
    fn test_exit_stops_driving() {
        let (mut world, mut vehicle, factors) = setup();
        let forward = DriverIntent {
            forward: true,
            ..Default::default()
        };
        drive(&mut world, &mut vehicle, &factors, &forward, 30);

        let exit = DriverIntent {
            exit: true,
            ..Default::default()
        };
        drive(&mut world, &mut vehicle, &factors, &exit, 1);
        assert!(!vehicle.is_occupied());
        assert_eq!(vehicle.get_speed(), 0.0);

        // Unoccupied: throttle does nothing
        drive(&mut world, &mut vehicle, &factors, &forward, 10);
        assert_eq!(vehicle.get_speed(), 0.0);

        vehicle.enter();
        drive(&mut world, &mut vehicle, &factors, &forward, 10);
        assert!(vehicle.get_speed() > 0.0);
    }

    #[test]
    fn test_missing_body_is_noop() {
        let mut world = ArcadeWorld::default();
        let mut vehicle = Vehicle::detached(VehicleConfig::default());
        let factors = BounceFactors::new();
        let intent = DriverIntent {
            forward: true,
            ..Default::default()
        };
        drive(&mut world, &mut vehicle, &factors, &intent, 5);
        assert_eq!(vehicle.get_speed(), 0.0);
        assert!(vehicle.get_position(&world).is_none());
    }

    #[test]
    fn test_respawn_resets_motion() {
        let (mut world, mut vehicle, factors) = setup();
        let intent = DriverIntent {
            forward: true,
            left: true,
            ..Default::default()
        };
        drive(&mut world, &mut vehicle, &factors, &intent, 40);

        let target = Vec3::new(10.0, 0.5, -4.0);
        vehicle.respawn(&mut world, target, Quat::from_rotation_y(1.0));
        assert_eq!(vehicle.get_speed(), 0.0);
        assert_eq!(vehicle.get_steer(), 0.0);
        assert_eq!(vehicle.get_position(&world), Some(target));
        assert_eq!(vehicle.get_state().start_height, 0.5);
    }

    #[test]
    fn test_teardown_destroys_body() {
        let (mut world, mut vehicle, _) = setup();
        let handle = vehicle.get_body().unwrap();
        vehicle.teardown(&mut world);
        assert!(world.body(handle).is_none());
        assert!(vehicle.get_body().is_none());
    }
}
