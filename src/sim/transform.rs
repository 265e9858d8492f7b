//! Vector and transform math for the software 3D pipeline
//!
//! World space: +X right, +Y down (screen convention), +Z toward the camera.
//! The camera sits at `(0, 0, CAMERA_DISTANCE)` looking down -Z.

use glam::{Mat3, Vec2, Vec3};

use crate::consts::*;

/// Rotation matrix for Euler angles applied X first, then Y, then Z
#[inline]
pub fn euler_matrix(rotation: Vec3) -> Mat3 {
    Mat3::from_rotation_z(rotation.z) * Mat3::from_rotation_y(rotation.y) * Mat3::from_rotation_x(rotation.x)
}

/// Scale, rotate, then translate a single point
#[inline]
pub fn transform_point(point: Vec3, translation: Vec3, rotation: &Mat3, scale: Vec3) -> Vec3 {
    *rotation * (point * scale) + translation
}

/// Transform `src` into `dst` (which must be the same length)
pub fn transform_points(src: &[Vec3], dst: &mut [Vec3], translation: Vec3, rotation: Vec3, scale: Vec3) {
    let matrix = euler_matrix(rotation);
    for (out, v) in dst.iter_mut().zip(src) {
        *out = transform_point(*v, translation, &matrix, scale);
    }
}

/// Perspective factor for a point at depth `z`
#[inline]
fn perspective(z: f32) -> f32 {
    (CAMERA_DISTANCE * SCENE_SCALE) / (CAMERA_DISTANCE - z)
}

/// Project a world point onto the screen plane (origin at view center)
#[inline]
pub fn project(point: Vec3) -> Vec2 {
    let p = perspective(point.z);
    Vec2::new(point.x * p, point.y * p)
}

/// Project in place, keeping `z` so faces can still be faded by depth
#[inline]
pub fn project_in_place(point: &mut Vec3) {
    let p = perspective(point.z);
    point.x *= p;
    point.y *= p;
}

/// Unit normal of the plane through three points (winding v1 -> v2 -> v3)
#[inline]
pub fn face_normal(v1: Vec3, v2: Vec3, v3: Vec3) -> Vec3 {
    let a = v1 - v2;
    let b = v1 - v3;
    a.cross(b).normalize_or_zero()
}

/// Drop a world point onto the backboard along a 45 degree downward ray
///
/// The point is tilted so the ray lies on -Z, pushed back by its distance
/// to the backboard, then tilted back. A point `d` in front of the board
/// lands on it `d` units lower.
pub fn shadow_point(point: Vec3) -> Vec3 {
    let tilt = Mat3::from_rotation_x(-std::f32::consts::FRAC_PI_4);
    let untilt = Mat3::from_rotation_x(std::f32::consts::FRAC_PI_4);
    let depth = point.z - BACKBOARD_Z;
    let mut tilted = tilt * point;
    tilted.z -= std::f32::consts::SQRT_2 * depth;
    untilt * tilted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn test_euler_order_x_then_y() {
        // +Y rotated 90 deg about X lands on +Z, then 90 deg about Y lands on +X
        let m = euler_matrix(Vec3::new(
            std::f32::consts::FRAC_PI_2,
            std::f32::consts::FRAC_PI_2,
            0.0,
        ));
        assert!(approx(m * Vec3::Y, Vec3::X));
    }

    #[test]
    fn test_transform_scales_before_translating() {
        let src = [Vec3::new(1.0, 2.0, 3.0)];
        let mut dst = [Vec3::ZERO];
        transform_points(&src, &mut dst, Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO, Vec3::splat(2.0));
        assert!(approx(dst[0], Vec3::new(12.0, 4.0, 6.0)));
    }

    #[test]
    fn test_projection() {
        // Points on the z=0 plane are unchanged
        assert_eq!(project(Vec3::new(100.0, -50.0, 0.0)), Vec2::new(100.0, -50.0));
        // Halfway to the camera doubles screen distance
        let p = project(Vec3::new(100.0, 0.0, CAMERA_DISTANCE / 2.0));
        assert!((p.x - 200.0).abs() < 1e-3);
        // Farther away shrinks
        let p = project(Vec3::new(100.0, 0.0, -CAMERA_DISTANCE));
        assert!((p.x - 50.0).abs() < 1e-3);

        let mut v = Vec3::new(100.0, 0.0, CAMERA_DISTANCE / 2.0);
        project_in_place(&mut v);
        assert!((v.x - 200.0).abs() < 1e-3);
        assert_eq!(v.z, CAMERA_DISTANCE / 2.0);
    }

    #[test]
    fn test_face_normal_points_toward_camera() {
        let n = face_normal(Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!(approx(n, Vec3::Z) || approx(n, -Vec3::Z));
        let n = face_normal(Vec3::ZERO, Vec3::Y, Vec3::X);
        assert!(approx(n.abs(), Vec3::Z));
        // Degenerate faces don't produce NaN
        assert_eq!(face_normal(Vec3::ONE, Vec3::ONE, Vec3::ONE), Vec3::ZERO);
    }

    #[test]
    fn test_shadow_lands_on_backboard() {
        let p = Vec3::new(30.0, -100.0, 50.0);
        let s = shadow_point(p);
        let depth = p.z - BACKBOARD_Z;
        assert!(approx(s, Vec3::new(30.0, -100.0 + depth, BACKBOARD_Z)));

        // Already on the board: unchanged
        let on_board = Vec3::new(5.0, 5.0, BACKBOARD_Z);
        assert!(approx(shadow_point(on_board), on_board));
    }
}
