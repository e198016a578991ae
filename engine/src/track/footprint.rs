//! Vehicle footprint
//!
//! The four ground-plane corners of the chassis plus its centre. Computed
//! once per tick from the stepped body pose and shared by every bounds,
//! zone and checkpoint test of that tick.

use glam::{Quat, Vec2, Vec3};

use crate::physics::types::ground_xz;

/// Number of sample points in a footprint.
pub const FOOTPRINT_POINTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleFootprint {
    /// Front-left, front-right, rear-right, rear-left, centre
    points: [Vec2; FOOTPRINT_POINTS],
}

impl VehicleFootprint {
    pub fn new(position: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        let corner = |x: f32, z: f32| ground_xz(position + rotation * Vec3::new(x, 0.0, z));
        let (hx, hz) = (half_extents.x.abs(), half_extents.z.abs());
        Self {
            points: [
                corner(hx, hz),
                corner(-hx, hz),
                corner(-hx, -hz),
                corner(hx, -hz),
                ground_xz(position),
            ],
        }
    }

    /// A footprint collapsed onto one point.
    pub fn from_point(point: Vec2) -> Self {
        Self {
            points: [point; FOOTPRINT_POINTS],
        }
    }

    pub fn points(&self) -> &[Vec2; FOOTPRINT_POINTS] {
        &self.points
    }

    pub fn center(&self) -> Vec2 {
        self.points[FOOTPRINT_POINTS - 1]
    }

    /// True if any sample point satisfies `test`.
    pub fn any(&self, test: impl Fn(Vec2) -> bool) -> bool {
        self.points.iter().any(|&p| test(p))
    }
}
