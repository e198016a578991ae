//! Shape Catalog
//!
//! Declarative shape descriptors used to create rigid bodies. A
//! [`ShapeDefinition`] is pure data: geometry, pose, scale, mass and material.
//! Backends turn it into a body with [`PhysicsWorld::create_body`].
//!
//! Mass 0 means static (immovable). Negative masses are coerced to 0.
//!
//! [`PhysicsWorld::create_body`]: super::backend::PhysicsWorld::create_body

use std::fmt;
use std::str::FromStr;

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::material::MaterialTag;
use crate::error::ConfigError;

/// Tag identifying a shape variant, as written in track data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Box,
    Sphere,
    Cylinder,
    Plane,
    Convex,
    TriMesh,
}

impl ShapeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Box => "box",
            ShapeKind::Sphere => "sphere",
            ShapeKind::Cylinder => "cylinder",
            ShapeKind::Plane => "plane",
            ShapeKind::Convex => "convex",
            ShapeKind::TriMesh => "trimesh",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShapeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "box" | "cube" => Ok(ShapeKind::Box),
            "sphere" => Ok(ShapeKind::Sphere),
            "cylinder" => Ok(ShapeKind::Cylinder),
            "plane" => Ok(ShapeKind::Plane),
            "convex" | "convexpolyhedron" => Ok(ShapeKind::Convex),
            "trimesh" | "mesh" => Ok(ShapeKind::TriMesh),
            _ => Err(ConfigError::UnknownShape(s.to_string())),
        }
    }
}

/// Geometry of a shape in its local (unscaled) frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Box centred on the origin
    Box { half_extents: Vec3 },
    /// Sphere centred on the origin
    Sphere { radius: f32 },
    /// Cylinder along local Y, centred on the origin
    Cylinder { radius: f32, height: f32 },
    /// Infinite plane through the origin with normal local +Y
    Plane,
    /// Convex hull of a point cloud
    Convex { vertices: Vec<Vec3> },
    /// Triangle soup; `indices` holds vertex triples
    TriMesh { vertices: Vec<Vec3>, indices: Vec<u32> },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Box { .. } => ShapeKind::Box,
            Shape::Sphere { .. } => ShapeKind::Sphere,
            Shape::Cylinder { .. } => ShapeKind::Cylinder,
            Shape::Plane => ShapeKind::Plane,
            Shape::Convex { .. } => ShapeKind::Convex,
            Shape::TriMesh { .. } => ShapeKind::TriMesh,
        }
    }

    /// Half extents of the local bounding box, or `None` for unbounded shapes.
    pub fn local_half_extents(&self) -> Option<Vec3> {
        match self {
            Shape::Box { half_extents } => Some(half_extents.abs()),
            Shape::Sphere { radius } => Some(Vec3::splat(radius.abs())),
            Shape::Cylinder { radius, height } => {
                Some(Vec3::new(radius.abs(), height.abs() * 0.5, radius.abs()))
            }
            Shape::Plane => None,
            Shape::Convex { vertices } | Shape::TriMesh { vertices, .. } => {
                // Bounds are taken about the origin so the body's position
                // stays its local frame origin.
                vertices
                    .iter()
                    .map(|v| v.abs())
                    .reduce(|a, b| a.max(b))
            }
        }
    }

    /// Why the geometry is unusable, if it is.
    pub fn degenerate_reason(&self) -> Option<String> {
        match self {
            Shape::Box { half_extents } if half_extents.min_element() <= 0.0 => {
                Some(format!("box half extents must be positive, got {half_extents}"))
            }
            Shape::Sphere { radius } if *radius <= 0.0 => {
                Some(format!("sphere radius must be positive, got {radius}"))
            }
            Shape::Cylinder { radius, height } if *radius <= 0.0 || *height <= 0.0 => Some(
                format!("cylinder needs positive radius and height, got {radius} x {height}"),
            ),
            Shape::Convex { vertices } if vertices.len() < 4 => Some(format!(
                "convex hull needs at least 4 vertices, got {}",
                vertices.len()
            )),
            Shape::TriMesh { vertices, indices } => {
                if indices.is_empty() || indices.len() % 3 != 0 {
                    Some(format!(
                        "trimesh index count must be a positive multiple of 3, got {}",
                        indices.len()
                    ))
                } else if indices.iter().any(|&i| i as usize >= vertices.len()) {
                    Some("trimesh index out of range".to_string())
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

/// Everything a backend needs to create one rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeDefinition {
    /// Local geometry
    pub shape: Shape,
    /// World position of the body origin
    pub position: Vec3,
    /// World rotation (normalized on construction)
    pub rotation: Quat,
    /// Per-axis scale applied to the local geometry
    pub scale: Vec3,
    /// Mass in kg; 0 makes the body static
    pub mass: f32,
    /// Surface material
    pub material: MaterialTag,
}

impl ShapeDefinition {
    /// Static body of the given shape at the origin.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            mass: 0.0,
            material: MaterialTag::Default,
        }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::new(Shape::Box { half_extents })
    }

    pub fn sphere(radius: f32) -> Self {
        Self::new(Shape::Sphere { radius })
    }

    pub fn cylinder(radius: f32, height: f32) -> Self {
        Self::new(Shape::Cylinder { radius, height })
    }

    /// Ground plane facing +Y.
    pub fn ground_plane() -> Self {
        Self::new(Shape::Plane)
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation.normalize();
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Set the mass. Negative values are coerced to 0 (static).
    pub fn with_mass(mut self, mass: f32) -> Self {
        self.mass = sanitize_mass(mass);
        self
    }

    pub fn with_material(mut self, material: MaterialTag) -> Self {
        self.material = material;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        self.shape.kind()
    }

    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

/// Coerce a mass into the valid range, logging rejected values.
pub fn sanitize_mass(mass: f32) -> f32 {
    if mass.is_finite() && mass >= 0.0 {
        mass
    } else {
        log::warn!("rejecting invalid mass {mass}, treating body as static");
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_kind_parsing() {
        assert_eq!("Box".parse::<ShapeKind>(), Ok(ShapeKind::Box));
        assert_eq!("trimesh".parse::<ShapeKind>(), Ok(ShapeKind::TriMesh));
        assert_eq!(
            "torus".parse::<ShapeKind>(),
            Err(ConfigError::UnknownShape("torus".to_string()))
        );
    }

    #[test]
    fn test_negative_mass_coerced_to_static() {
        let def = ShapeDefinition::sphere(1.0).with_mass(-5.0);
        assert_eq!(def.mass, 0.0);
        assert!(def.is_static());

        let def = ShapeDefinition::sphere(1.0).with_mass(f32::NAN);
        assert_eq!(def.mass, 0.0);
    }

    #[test]
    fn test_local_half_extents() {
        let cyl = Shape::Cylinder {
            radius: 0.5,
            height: 2.0,
        };
        assert_eq!(cyl.local_half_extents(), Some(Vec3::new(0.5, 1.0, 0.5)));
        assert_eq!(Shape::Plane.local_half_extents(), None);

        let hull = Shape::Convex {
            vertices: vec![
                Vec3::new(-1.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(0.0, 3.0, 0.0),
                Vec3::new(0.0, 0.0, -1.0),
            ],
        };
        assert_eq!(hull.local_half_extents(), Some(Vec3::new(2.0, 3.0, 1.0)));
    }

    #[test]
    fn test_degenerate_geometry() {
        assert!(Shape::Sphere { radius: 0.0 }.degenerate_reason().is_some());
        assert!(
            Shape::TriMesh {
                vertices: vec![Vec3::ZERO; 3],
                indices: vec![0, 1, 5],
            }
            .degenerate_reason()
            .is_some()
        );
        assert!(
            Shape::Box {
                half_extents: Vec3::ONE
            }
            .degenerate_reason()
            .is_none()
        );
    }
}
