//! Ground-plane geometry helpers
//!
//! Everything here works on the (x, z) projection of world points.

use glam::Vec2;

/// Even-odd point-in-polygon test. Polygons with fewer than 3 points
/// contain nothing.
pub fn point_in_polygon(point: Vec2, polygon: &[Vec2]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (a, b) = (polygon[i], polygon[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x;
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Shortest distance from `point` to the segment `a`-`b`.
pub fn distance_point_to_segment(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_squared();
    if length_sq <= f32::EPSILON {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
