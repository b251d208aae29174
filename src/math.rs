//! Math type aliases and face-orientation helpers.
//!
//! Document geometry uses `f64` throughout (modeling precision, not
//! rendering precision). The only non-trivial operation in this module is
//! the visibility classifier: a face is front-facing when its normal points
//! toward the camera eye.

pub use nalgebra;

/// 3D vector (f64).
pub type Vec3 = nalgebra::Vector3<f64>;

/// 3D point (f64).
pub type Point3 = nalgebra::Point3<f64>;

/// Returns `true` if a face is oriented toward the camera.
///
/// A face with normal `normal` containing the point `point_on_face` is
/// front-facing relative to `camera_eye` iff
/// `dot(normal, camera_eye - point_on_face) >= 0`.
///
/// For a planar face the result does not depend on which point of the face
/// is chosen. Faces lying exactly in the view plane (dot product zero)
/// count as front-facing, so grazing faces are never suppressed.
pub fn is_front_facing(normal: &Vec3, point_on_face: &Point3, camera_eye: &Point3) -> bool {
    normal.dot(&(camera_eye - point_on_face)) >= 0.0
}

/// Computes the normal of a planar polygon via Newell's method.
///
/// Returns `None` for degenerate polygons (fewer than three vertices or
/// zero area). The result is normalized and follows the counter-clockwise
/// winding convention.
pub fn polygon_normal(vertices: &[Point3]) -> Option<Vec3> {
    if vertices.len() < 3 {
        return None;
    }
    let mut n = Vec3::zeros();
    for (i, a) in vertices.iter().enumerate() {
        let b = &vertices[(i + 1) % vertices.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    let len = n.norm();
    if len <= f64::EPSILON {
        return None;
    }
    Some(n / len)
}
