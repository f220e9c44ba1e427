//! Projection and view matrix math.
//!
//! World convention is Z-up, X-forward, right-handed; the rendering
//! convention is Y-up, -Z-forward. The view matrix bridges the two with a
//! fixed axis permutation.
//!
//! Orthographic projection is not computed here.
//! TODO: move the orthographic path in from the view-controller layer once
//! it grows a stable API.

use glam::{Mat3, Mat4, Quat, Vec3, Vec4};
use crate::scene::Pose;

/// Axis permutation mapping Z-up/X-forward world axes onto Y-up/-Z-forward
/// camera axes. Row-major rows: [[0,0,-1],[-1,0,0],[0,1,0]].
const WORLD_TO_CAMERA: Mat3 = Mat3::from_cols(
    Vec3::new(0.0, -1.0, 0.0),
    Vec3::new(0.0, 0.0, 1.0),
    Vec3::new(-1.0, 0.0, 0.0),
);

/// Symmetric-frustum perspective projection.
///
/// The vertical FOV is derived from the horizontal FOV and aspect ratio:
/// `vfov = 2 * atan(tan(hfov / 2) / aspect)`. The resulting column-major
/// matrix has `m[3][2] == -1` and `m[2][3] == -2 * far * near / (far - near)`
/// (row, column indexing).
///
/// # Arguments
///
/// * `hfov` - Horizontal field of view in radians, `0 < hfov < pi`
/// * `aspect` - Width / height aspect ratio, `> 0`
/// * `near` - Near clip distance, `0 < near < far`
/// * `far` - Far clip distance
pub fn perspective_matrix(hfov: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let vfov = 2.0 * ((hfov * 0.5).tan() / aspect).atan();

    let top = near * (vfov * 0.5).tan();
    let height = 2.0 * top;
    let width = aspect * height;
    let left = -0.5 * width;
    let right = left + width;
    let bottom = top - height;

    let x = 2.0 * near / (right - left);
    let y = 2.0 * near / (top - bottom);
    let a = (right + left) / (right - left);
    let b = (top + bottom) / (top - bottom);
    let c = -(far + near) / (far - near);
    let d = -2.0 * far * near / (far - near);

    Mat4::from_cols(
        Vec4::new(x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, y, 0.0, 0.0),
        Vec4::new(a, b, c, -1.0),
        Vec4::new(0.0, 0.0, d, 0.0),
    )
}

/// View matrix for a camera at `pose`.
///
/// Takes the world rotation, applies the [`WORLD_TO_CAMERA`] permutation,
/// transposes (inverting the pure rotation), then translates by
/// `-R * world_position`.
pub fn view_matrix(pose: &Pose) -> Mat4 {
    let rotation = (Mat3::from_quat(pose.rotation) * WORLD_TO_CAMERA).transpose();
    let translation = -(rotation * pose.position);

    let mut view = Mat4::from_mat3(rotation);
    view.w_axis = Vec4::new(translation.x, translation.y, translation.z, 1.0);
    view
}

/// World orientation that points the camera's forward axis (+X) from `eye`
/// at `target`, keeping world +Z as up.
///
/// Degenerate inputs (zero-length direction, looking straight along the up
/// axis) fall back to nearby well-defined frames instead of failing: this
/// runs inside the per-frame tracking loop, where a bad frame must degrade,
/// not abort.
pub fn look_at_rotation(eye: Vec3, target: Vec3) -> Quat {
    let direction = target - eye;
    if direction.length_squared() < f32::EPSILON {
        return Quat::IDENTITY;
    }

    let forward = direction.normalize();
    let mut left = Vec3::Z.cross(forward);
    if left.length_squared() < f32::EPSILON {
        // Looking straight up or down; any horizontal left vector works
        left = Vec3::Y;
    }
    let left = left.normalize();
    let up = forward.cross(left);

    Quat::from_mat3(&Mat3::from_cols(forward, left, up))
}

#[cfg(test)]
#[path = "projection_tests.rs"]
mod tests;
