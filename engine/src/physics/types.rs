//! Physics math types and small angle helpers
//!
//! The core math types are re-exported from glam. World convention:
//! +Y is up, a body's local +Z is its forward direction, and yaw is the
//! rotation about +Y (positive yaw turns +Z towards +X).

pub use glam::{Quat, Vec2, Vec3};

use std::f32::consts::{PI, TAU};

/// Wrap an angle into the range (-PI, PI].
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

/// Heading (yaw) of a rotation, measured from +Z towards +X.
pub fn yaw_of(rotation: Quat) -> f32 {
    let forward = rotation * Vec3::Z;
    forward.x.atan2(forward.z)
}

/// Project a world-space point onto the ground plane (x, z).
#[inline]
pub fn ground_xz(point: Vec3) -> Vec2 {
    Vec2::new(point.x, point.z)
}

/// Sign of `value` that reports 0.0 for zero (unlike `f32::signum`).
#[inline]
pub fn sign_or_zero(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(3.0 * PI) - PI).abs() < 1e-5);
        assert!((wrap_angle(-0.5) + 0.5).abs() < 1e-6);
        assert!((wrap_angle(TAU + 0.25) - 0.25).abs() < 1e-5);
        assert_eq!(wrap_angle(f32::NAN), 0.0);
    }

    #[test]
    fn test_yaw_of_rotation() {
        assert!(yaw_of(Quat::IDENTITY).abs() < 1e-6);
        let q = Quat::from_rotation_y(0.75);
        assert!((yaw_of(q) - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_sign_or_zero() {
        assert_eq!(sign_or_zero(0.0), 0.0);
        assert_eq!(sign_or_zero(-2.0), -1.0);
        assert_eq!(sign_or_zero(0.1), 1.0);
    }
}
