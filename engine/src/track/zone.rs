//! Polygon zones on the ground plane
//!
//! Used for both the drivable track bounds and hazard areas. A zone keeps
//! the result of its last evaluation in `inside`.

use glam::{Vec2, Vec3};

use super::footprint::VehicleFootprint;
use super::geometry::point_in_polygon;
use crate::hazard::HazardKind;
use crate::physics::types::ground_xz;

#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    polygon: Vec<Vec2>,
    inside: bool,
}

impl Zone {
    pub fn new(points: &[Vec3]) -> Self {
        if points.len() < 3 {
            log::warn!("zone polygon has {} points, it will never contain the vehicle", points.len());
        }
        Self {
            polygon: points.iter().copied().map(ground_xz).collect(),
            inside: false,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.polygon.len() < 3
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point_in_polygon(point, &self.polygon)
    }

    /// Re-evaluate against a footprint: inside if any sample point is.
    pub fn evaluate(&mut self, footprint: &VehicleFootprint) -> bool {
        self.inside = !self.is_degenerate() && footprint.any(|p| self.contains(p));
        self.inside
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    pub fn polygon(&self) -> &[Vec2] {
        &self.polygon
    }
}

/// A zone that applies a hazard while the vehicle is in it.
#[derive(Debug, Clone, PartialEq)]
pub struct HazardZone {
    pub kind: HazardKind,
    pub zone: Zone,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(size: f32) -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(size, 0.0, 0.0),
            Vec3::new(size, 0.0, size),
            Vec3::new(0.0, 0.0, size),
        ]
    }

    #[test]
    fn test_any_corner_counts_as_inside() {
        let mut zone = Zone::new(&square(10.0));
        // Centre outside, front corner over the edge
        let footprint = VehicleFootprint::new(
            Vec3::new(-1.0, 0.0, 5.0),
            glam::Quat::IDENTITY,
            Vec3::new(1.5, 0.5, 2.0),
        );
        assert!(!zone.contains(footprint.center()));
        assert!(zone.evaluate(&footprint));
        assert!(zone.is_inside());

        assert!(!zone.evaluate(&VehicleFootprint::from_point(Vec2::new(20.0, 5.0))));
    }

    #[test]
    fn test_degenerate_zone_never_inside() {
        let mut zone = Zone::new(&square(10.0)[..2]);
        assert!(zone.is_degenerate());
        assert!(!zone.evaluate(&VehicleFootprint::from_point(Vec2::new(0.0, 0.0))));
    }
}
