//! Narrow-phase collision detection
//!
//! Every body is reduced to one of three [`Collider`] primitives:
//!
//! - sphere (exact)
//! - oriented box (boxes exactly; cylinders, convex hulls and trimeshes
//!   through their local bounding box)
//! - infinite plane
//!
//! Box-box uses the separating axis test on the six face axes only. Edge-edge
//! axes are skipped, which can report a slightly deeper contact for
//! edge-on-edge cases but never misses an overlap between two boxes.
//!
//! All functions return a [`Contact`] whose normal points from the first
//! collider towards the second.

use glam::{Quat, Vec3};

/// Result of a narrow-phase test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Unit normal pointing from the first collider towards the second
    pub normal: Vec3,
    /// Penetration depth along the normal (meters, >= 0)
    pub depth: f32,
}

impl Contact {
    pub fn new(normal: Vec3, depth: f32) -> Self {
        Self { normal, depth }
    }

    /// Same contact seen from the other collider.
    pub fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
        }
    }
}

/// Oriented bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vec3,
    pub rotation: Quat,
    pub half_extents: Vec3,
}

impl Obb {
    pub fn new(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self {
            center,
            rotation,
            half_extents: half_extents.abs(),
        }
    }

    /// World-space unit axes of the box.
    pub fn axes(&self) -> [Vec3; 3] {
        [
            self.rotation * Vec3::X,
            self.rotation * Vec3::Y,
            self.rotation * Vec3::Z,
        ]
    }

    /// The eight world-space corners.
    pub fn corners(&self) -> [Vec3; 8] {
        let [ax, ay, az] = self.axes();
        let h = self.half_extents;
        let mut out = [Vec3::ZERO; 8];
        for (i, corner) in out.iter_mut().enumerate() {
            let sx = if i & 1 == 0 { -1.0 } else { 1.0 };
            let sy = if i & 2 == 0 { -1.0 } else { 1.0 };
            let sz = if i & 4 == 0 { -1.0 } else { 1.0 };
            *corner = self.center + ax * (sx * h.x) + ay * (sy * h.y) + az * (sz * h.z);
        }
        out
    }

    /// Half-length of the box's projection onto `axis` (unit vector).
    pub fn projected_radius(&self, axis: Vec3) -> f32 {
        let [ax, ay, az] = self.axes();
        self.half_extents.x * ax.dot(axis).abs()
            + self.half_extents.y * ay.dot(axis).abs()
            + self.half_extents.z * az.dot(axis).abs()
    }

    /// Express a world point in the box's local frame.
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.center)
    }

    /// Closest point on (or in) the box to a world point.
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let local = self.to_local(point).clamp(-self.half_extents, self.half_extents);
        self.center + self.rotation * local
    }
}

/// Collision primitive for one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Collider {
    Sphere { center: Vec3, radius: f32 },
    Box(Obb),
    Plane { point: Vec3, normal: Vec3 },
}

/// Test two colliders. The returned normal points from `a` towards `b`.
pub fn collide(a: &Collider, b: &Collider) -> Option<Contact> {
    match (a, b) {
        (Collider::Sphere { center: ca, radius: ra }, Collider::Sphere { center: cb, radius: rb }) => {
            sphere_sphere(*ca, *ra, *cb, *rb)
        }
        (Collider::Sphere { center, radius }, Collider::Box(obb)) => {
            sphere_obb(*center, *radius, obb)
        }
        (Collider::Box(obb), Collider::Sphere { center, radius }) => {
            sphere_obb(*center, *radius, obb).map(Contact::flipped)
        }
        (Collider::Box(a), Collider::Box(b)) => obb_obb(a, b),
        (Collider::Sphere { center, radius }, Collider::Plane { point, normal }) => {
            sphere_plane(*center, *radius, *point, *normal)
        }
        (Collider::Plane { point, normal }, Collider::Sphere { center, radius }) => {
            sphere_plane(*center, *radius, *point, *normal).map(Contact::flipped)
        }
        (Collider::Box(obb), Collider::Plane { point, normal }) => obb_plane(obb, *point, *normal),
        (Collider::Plane { point, normal }, Collider::Box(obb)) => {
            obb_plane(obb, *point, *normal).map(Contact::flipped)
        }
        (Collider::Plane { .. }, Collider::Plane { .. }) => None,
    }
}

pub fn sphere_sphere(ca: Vec3, ra: f32, cb: Vec3, rb: f32) -> Option<Contact> {
    let delta = cb - ca;
    let dist = delta.length();
    let depth = ra + rb - dist;
    if depth <= 0.0 {
        return None;
    }
    let normal = if dist > 1e-6 { delta / dist } else { Vec3::Y };
    Some(Contact::new(normal, depth))
}

/// Sphere against box; normal points from the sphere towards the box.
pub fn sphere_obb(center: Vec3, radius: f32, obb: &Obb) -> Option<Contact> {
    let closest = obb.closest_point(center);
    let delta = closest - center;
    let dist_sq = delta.length_squared();

    if dist_sq > 1e-10 {
        let dist = dist_sq.sqrt();
        let depth = radius - dist;
        return (depth > 0.0).then(|| Contact::new(delta / dist, depth));
    }

    // Centre is inside the box: push out through the nearest face
    let local = obb.to_local(center);
    let normalized = local / obb.half_extents.max(Vec3::splat(1e-6));
    let abs = normalized.abs();
    let (axis_index, sign) = if abs.x >= abs.y && abs.x >= abs.z {
        (0, normalized.x.signum())
    } else if abs.y >= abs.z {
        (1, normalized.y.signum())
    } else {
        (2, normalized.z.signum())
    };
    let face_distance = obb.half_extents[axis_index] - local[axis_index].abs();
    let outward = obb.axes()[axis_index] * sign;
    // Box lies opposite the outward face direction
    Some(Contact::new(-outward, face_distance + radius))
}

pub fn sphere_plane(center: Vec3, radius: f32, point: Vec3, normal: Vec3) -> Option<Contact> {
    let n = normal.normalize_or_zero();
    if n == Vec3::ZERO {
        return None;
    }
    let depth = radius - (center - point).dot(n);
    (depth > 0.0).then(|| Contact::new(-n, depth))
}

/// Box against plane; normal points from the box towards the plane.
pub fn obb_plane(obb: &Obb, point: Vec3, normal: Vec3) -> Option<Contact> {
    let n = normal.normalize_or_zero();
    if n == Vec3::ZERO {
        return None;
    }
    let depth = obb
        .corners()
        .iter()
        .map(|c| -(*c - point).dot(n))
        .fold(f32::NEG_INFINITY, f32::max);
    (depth > 0.0).then(|| Contact::new(-n, depth))
}

/// Separating-axis test over the six face axes.
pub fn obb_obb(a: &Obb, b: &Obb) -> Option<Contact> {
    let delta = b.center - a.center;
    let mut best: Option<Contact> = None;

    for axis in a.axes().into_iter().chain(b.axes()) {
        let overlap = a.projected_radius(axis) + b.projected_radius(axis) - delta.dot(axis).abs();
        if overlap <= 0.0 {
            return None;
        }
        if best.is_none_or(|c| overlap < c.depth) {
            let normal = if delta.dot(axis) >= 0.0 { axis } else { -axis };
            best = Some(Contact::new(normal, overlap));
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(center: Vec3) -> Obb {
        Obb::new(center, Quat::IDENTITY, Vec3::ONE)
    }

    #[test]
    fn test_sphere_sphere_contact() {
        let contact = sphere_sphere(Vec3::ZERO, 1.0, Vec3::new(1.5, 0.0, 0.0), 1.0).unwrap();
        assert!((contact.normal - Vec3::X).length() < 1e-6);
        assert!((contact.depth - 0.5).abs() < 1e-6);
        assert!(sphere_sphere(Vec3::ZERO, 1.0, Vec3::new(3.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_sphere_obb_outside() {
        let obb = unit_box(Vec3::ZERO);
        let contact = sphere_obb(Vec3::new(1.5, 0.0, 0.0), 1.0, &obb).unwrap();
        // From the sphere towards the box
        assert!((contact.normal + Vec3::X).length() < 1e-6);
        assert!((contact.depth - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_sphere_obb_inside_uses_nearest_face() {
        let obb = unit_box(Vec3::ZERO);
        let contact = sphere_obb(Vec3::new(0.0, 0.0, 0.8), 0.5, &obb).unwrap();
        assert!((contact.normal + Vec3::Z).length() < 1e-6);
        assert!((contact.depth - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_obb_plane_contact() {
        let obb = unit_box(Vec3::new(0.0, 0.9, 0.0));
        let contact = obb_plane(&obb, Vec3::ZERO, Vec3::Y).unwrap();
        assert!((contact.normal + Vec3::Y).length() < 1e-6);
        assert!((contact.depth - 0.1).abs() < 1e-5);
        assert!(obb_plane(&unit_box(Vec3::new(0.0, 2.0, 0.0)), Vec3::ZERO, Vec3::Y).is_none());
    }

    #[test]
    fn test_obb_obb_picks_least_penetration_axis() {
        let a = unit_box(Vec3::ZERO);
        let b = unit_box(Vec3::new(1.8, 0.5, 0.0));
        let contact = obb_obb(&a, &b).unwrap();
        assert!((contact.normal - Vec3::X).length() < 1e-6);
        assert!((contact.depth - 0.2).abs() < 1e-5);

        let far = unit_box(Vec3::new(2.5, 0.0, 0.0));
        assert!(obb_obb(&a, &far).is_none());
    }

    #[test]
    fn test_collide_flips_normal_for_swapped_order() {
        let plane = Collider::Plane {
            point: Vec3::ZERO,
            normal: Vec3::Y,
        };
        let sphere = Collider::Sphere {
            center: Vec3::new(0.0, 0.5, 0.0),
            radius: 1.0,
        };
        let ab = collide(&sphere, &plane).unwrap();
        let ba = collide(&plane, &sphere).unwrap();
        assert_eq!(ab.normal, -ba.normal);
        assert!((ab.normal + Vec3::Y).length() < 1e-6);
    }
}
