//! Track
//!
//! Static content of one circuit: the ground plane, obstacle bodies, the
//! drivable bounds, hazard zones and the checkpoint ring. Built from a
//! [`TrackDefinition`] by [`Track::load`]; the lap state machine that walks
//! the ring lives in [`lap`].
//!
//! Loading is all-or-nothing. If any obstacle fails to build, the bodies
//! created so far are destroyed before the error is returned.

pub mod checkpoint;
pub mod definition;
pub mod footprint;
pub mod geometry;
pub mod lap;
pub mod zone;

pub use checkpoint::{Checkpoint, CheckpointRing, MIN_GATES};
pub use definition::{CheckpointPoint, HazardZoneDescriptor, ObstacleDescriptor, TrackDefinition};
pub use footprint::VehicleFootprint;
pub use geometry::{distance_point_to_segment, point_in_polygon};
pub use lap::{LapConfig, LapState, RaceEvent, RacePhase};
pub use zone::{HazardZone, Zone};

use glam::{Quat, Vec3};

use crate::error::{ConfigError, PhysicsError, TrackLoadError};
use crate::hazard::HazardKind;
use crate::physics::types::yaw_of;
use crate::physics::{BodyHandle, MaterialTag, PhysicsWorld, Shape, ShapeDefinition, ShapeKind};
use crate::vehicle::BounceFactors;

/// A loaded track.
#[derive(Debug, Clone)]
pub struct Track {
    ground: Option<BodyHandle>,
    obstacles: Vec<BodyHandle>,
    bounce_factors: BounceFactors,
    bounds: Vec<Zone>,
    hazards: Vec<HazardZone>,
    checkpoints: CheckpointRing,
    start_position: Vec3,
    start_rotation: Quat,
    total_laps: Option<u32>,
}

impl Track {
    /// Validate the definition and create its bodies in `world`.
    pub fn load<W: PhysicsWorld>(world: &mut W, definition: &TrackDefinition) -> Result<Self, TrackLoadError> {
        // Validate everything that can fail without touching the world first
        let checkpoints =
            CheckpointRing::from_points(definition.checkpoints.iter().map(|c| (c.index, c.position)))?;
        let hazards = definition
            .hazards
            .iter()
            .map(|h| {
                Ok(HazardZone {
                    kind: h.kind.parse::<HazardKind>()?,
                    zone: Zone::new(&h.points),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        let obstacle_defs = definition
            .obstacles
            .iter()
            .map(obstacle_definition)
            .collect::<Result<Vec<_>, ConfigError>>()?;

        let mut created = Vec::with_capacity(obstacle_defs.len() + 1);
        let (ground, obstacles, bounce_factors) =
            match spawn_bodies(world, definition, &obstacle_defs, &mut created) {
                Ok(parts) => parts,
                Err(e) => {
                    for handle in created {
                        world.destroy_body(handle);
                    }
                    return Err(e.into());
                }
            };

        log::debug!(
            "track loaded: {} obstacles, {} bounds, {} hazards, {} checkpoints",
            obstacles.len(),
            definition.bounds.len(),
            hazards.len(),
            checkpoints.len()
        );

        Ok(Self {
            ground: Some(ground),
            obstacles,
            bounce_factors,
            bounds: definition.bounds.iter().map(|b| Zone::new(b)).collect(),
            hazards,
            checkpoints,
            start_position: definition.start_position,
            start_rotation: definition.start_rotation,
            total_laps: definition.total_laps,
        })
    }

    /// Re-evaluate bounds; the car is on track if inside any bounds polygon.
    /// A track without bounds is all track.
    pub fn evaluate_bounds(&mut self, footprint: &VehicleFootprint) -> bool {
        if self.bounds.is_empty() {
            return true;
        }
        let mut inside = false;
        for zone in &mut self.bounds {
            inside |= zone.evaluate(footprint);
        }
        inside
    }

    /// Re-evaluate hazard zones.
    pub fn evaluate_hazards(&mut self, footprint: &VehicleFootprint) {
        for hazard in &mut self.hazards {
            hazard.zone.evaluate(footprint);
        }
    }

    /// Whether any zone of `kind` reported inside at the last evaluation.
    pub fn is_in_hazard(&self, kind: HazardKind) -> bool {
        self.hazards.iter().any(|h| h.kind == kind && h.zone.is_inside())
    }

    pub fn is_in_any_hazard(&self) -> bool {
        self.hazards.iter().any(|h| h.zone.is_inside())
    }

    /// Respawn pose at a gate: centred on it, facing the next gate.
    pub fn gate_pose(&self, index: usize, height: f32) -> Option<(Vec3, Quat)> {
        let gate = self.checkpoints.get(index)?;
        let next = self.checkpoints.get(self.checkpoints.next_index(index))?;
        let mut position = gate.center();
        position.y += height;

        let direction = next.center() - gate.center();
        let rotation = if direction.x.abs() + direction.z.abs() > f32::EPSILON {
            Quat::from_rotation_y(direction.x.atan2(direction.z))
        } else {
            Quat::from_rotation_y(yaw_of(self.start_rotation))
        };
        Some((position, rotation))
    }

    /// Destroy every body the track created.
    pub fn teardown<W: PhysicsWorld>(&mut self, world: &mut W) {
        for handle in self.obstacles.drain(..).chain(self.ground.take()) {
            world.destroy_body(handle);
        }
    }

    pub fn get_checkpoints(&self) -> &CheckpointRing {
        &self.checkpoints
    }

    pub fn get_bounce_factors(&self) -> &BounceFactors {
        &self.bounce_factors
    }

    pub fn get_obstacles(&self) -> &[BodyHandle] {
        &self.obstacles
    }

    pub fn get_bounds(&self) -> &[Zone] {
        &self.bounds
    }

    pub fn get_hazards(&self) -> &[HazardZone] {
        &self.hazards
    }

    pub fn get_start_pose(&self) -> (Vec3, Quat) {
        (self.start_position, self.start_rotation)
    }

    pub fn get_total_laps(&self) -> Option<u32> {
        self.total_laps
    }
}

/// Create the ground plane and every obstacle. Handles are pushed to
/// `created` as they are made so a failure can be rolled back.
fn spawn_bodies<W: PhysicsWorld>(
    world: &mut W,
    definition: &TrackDefinition,
    obstacle_defs: &[ShapeDefinition],
    created: &mut Vec<BodyHandle>,
) -> Result<(BodyHandle, Vec<BodyHandle>, BounceFactors), PhysicsError> {
    let ground = world.spawn_body(&ShapeDefinition::ground_plane())?;
    created.push(ground);

    let mut obstacles = Vec::with_capacity(obstacle_defs.len());
    let mut bounce_factors = BounceFactors::new();
    for (descriptor, shape) in definition.obstacles.iter().zip(obstacle_defs) {
        let handle = world.spawn_body(shape)?;
        created.push(handle);
        obstacles.push(handle);
        if let Some(factor) = descriptor.bounce_factor {
            bounce_factors.insert(handle, factor);
        }
    }
    Ok((ground, obstacles, bounce_factors))
}

/// Turn an obstacle descriptor into a shape definition.
pub fn obstacle_definition(descriptor: &ObstacleDescriptor) -> Result<ShapeDefinition, ConfigError> {
    let kind: ShapeKind = descriptor.shape.parse()?;
    let material: MaterialTag = descriptor.material.parse()?;
    let scale = descriptor.scale;

    let (shape, body_scale) = match kind {
        ShapeKind::Box => (Shape::Box { half_extents: scale }, Vec3::ONE),
        ShapeKind::Sphere => (Shape::Sphere { radius: scale.x }, Vec3::ONE),
        ShapeKind::Cylinder => (
            Shape::Cylinder {
                radius: scale.x,
                height: scale.y,
            },
            Vec3::ONE,
        ),
        ShapeKind::Plane => (Shape::Plane, Vec3::ONE),
        ShapeKind::Convex => {
            if descriptor.vertices.is_empty() {
                return Err(ConfigError::MissingGeometry(format!(
                    "convex obstacle {:?} has no vertices",
                    descriptor.kind
                )));
            }
            (
                Shape::Convex {
                    vertices: descriptor.vertices.clone(),
                },
                scale,
            )
        }
        ShapeKind::TriMesh => {
            if descriptor.vertices.is_empty() || descriptor.indices.is_empty() {
                return Err(ConfigError::MissingGeometry(format!(
                    "trimesh obstacle {:?} needs vertices and indices",
                    descriptor.kind
                )));
            }
            (
                Shape::TriMesh {
                    vertices: descriptor.vertices.clone(),
                    indices: descriptor.indices.clone(),
                },
                scale,
            )
        }
    };

    Ok(ShapeDefinition::new(shape)
        .with_position(descriptor.position)
        .with_rotation(descriptor.rotation)
        .with_scale(body_scale)
        .with_mass(descriptor.mass)
        .with_material(material))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::ArcadeWorld;

    fn definition() -> TrackDefinition {
        TrackDefinition {
            bounds: vec![vec![
                Vec3::new(-20.0, 0.0, -20.0),
                Vec3::new(20.0, 0.0, -20.0),
                Vec3::new(20.0, 0.0, 20.0),
                Vec3::new(-20.0, 0.0, 20.0),
            ]],
            obstacles: vec![ObstacleDescriptor {
                kind: "wall".to_string(),
                scale: Vec3::new(5.0, 1.0, 0.5),
                position: Vec3::new(0.0, 1.0, 15.0),
                bounce_factor: Some(0.5),
                ..Default::default()
            }],
            hazards: vec![HazardZoneDescriptor {
                kind: "oil".to_string(),
                points: vec![
                    Vec3::new(0.0, 0.0, 0.0),
                    Vec3::new(4.0, 0.0, 0.0),
                    Vec3::new(4.0, 0.0, 4.0),
                ],
            }],
            ..Default::default()
        }
        .with_gate(0, Vec3::new(-5.0, 0.0, 0.0), Vec3::new(5.0, 0.0, 0.0))
        .with_gate(1, Vec3::new(-5.0, 0.0, 10.0), Vec3::new(5.0, 0.0, 10.0))
    }

    #[test]
    fn test_load_creates_bodies_and_zones() {
        let mut world = ArcadeWorld::default();
        let mut track = Track::load(&mut world, &definition()).unwrap();
        assert_eq!(world.body_count(), 2);
        assert_eq!(track.get_checkpoints().len(), 2);
        let wall = track.get_obstacles()[0];
        assert_eq!(track.get_bounce_factors().get(wall), 0.5);

        let footprint = VehicleFootprint::from_point(glam::Vec2::new(3.0, 1.0));
        assert!(track.evaluate_bounds(&footprint));
        track.evaluate_hazards(&footprint);
        assert!(track.is_in_hazard(HazardKind::Oil));
        assert!(!track.is_in_hazard(HazardKind::Ice));

        track.teardown(&mut world);
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.stored_body_count(), 0);
    }

    #[test]
    fn test_unknown_tags_are_config_errors() {
        let mut world = ArcadeWorld::default();
        let mut def = definition();
        def.obstacles[0].material = "rubber".to_string();
        assert!(matches!(
            Track::load(&mut world, &def),
            Err(TrackLoadError::Config(ConfigError::UnknownMaterial(_)))
        ));

        let mut def = definition();
        def.hazards[0].kind = "lava".to_string();
        assert!(matches!(
            Track::load(&mut world, &def),
            Err(TrackLoadError::Config(ConfigError::UnknownHazard(_)))
        ));
        assert_eq!(world.stored_body_count(), 0);
    }

    #[test]
    fn test_failed_load_leaves_world_empty() {
        let mut world = ArcadeWorld::default();
        let mut def = definition();
        def.obstacles.push(ObstacleDescriptor {
            scale: Vec3::new(0.0, 1.0, 1.0),
            ..Default::default()
        });
        assert!(matches!(Track::load(&mut world, &def), Err(TrackLoadError::Physics(_))));
        assert_eq!(world.stored_body_count(), 0);
    }

    #[test]
    fn test_convex_without_vertices_is_missing_geometry() {
        let descriptor = ObstacleDescriptor {
            shape: "convex".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            obstacle_definition(&descriptor),
            Err(ConfigError::MissingGeometry(_))
        ));
    }

    #[test]
    fn test_gate_pose_faces_next_gate() {
        let mut world = ArcadeWorld::default();
        let track = Track::load(&mut world, &definition()).unwrap();
        let (position, rotation) = track.gate_pose(0, 0.5).unwrap();
        assert_eq!(position, Vec3::new(0.0, 0.5, 0.0));
        assert!(yaw_of(rotation).abs() < 1e-6);
        assert!(track.gate_pose(5, 0.5).is_none());
    }
}
