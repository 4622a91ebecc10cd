//! Math type re-exports and EDM wire-order helpers.
//!
//! Vector, matrix and quaternion arithmetic comes from `glam`; this module
//! only knows how those types are laid out on disk.

pub use glam::{
    // Single precision
    Vec2, Vec3, Mat4, Quat,
    // Double precision
    DVec2, DVec3, DMat4, DQuat,
};

/// Number of scalars in a flattened 4x4 matrix.
pub const MATRIX_ELEMENTS: usize = 16;

/// Flatten a single precision matrix to its on-disk element order.
///
/// osg stores matrices row-major with row vectors, so the translation lands
/// in elements 12..14. That is the same memory order as glam's column-major
/// array, so no transpose happens here.
#[inline]
pub fn matrix_to_sequence(m: &Mat4) -> [f32; MATRIX_ELEMENTS] {
    m.to_cols_array()
}

/// Restore a single precision matrix from its on-disk element order.
#[inline]
pub fn sequence_to_matrix(seq: &[f32; MATRIX_ELEMENTS]) -> Mat4 {
    Mat4::from_cols_array(seq)
}

/// Flatten a double precision matrix to its on-disk element order.
#[inline]
pub fn matrix_to_sequence_d(m: &DMat4) -> [f64; MATRIX_ELEMENTS] {
    m.to_cols_array()
}

/// Restore a double precision matrix from its on-disk element order.
#[inline]
pub fn sequence_to_matrix_d(seq: &[f64; MATRIX_ELEMENTS]) -> DMat4 {
    DMat4::from_cols_array(seq)
}

/// Quaternion components in wire order `(x, y, z, w)`.
#[inline]
pub fn quat_to_wire(q: DQuat) -> [f64; 4] {
    [q.x, q.y, q.z, q.w]
}

/// Build a quaternion from wire order `(x, y, z, w)`.
#[inline]
pub fn quat_from_wire(c: [f64; 4]) -> DQuat {
    DQuat::from_xyzw(c[0], c[1], c[2], c[3])
}

/// Quaternion components in scene order `(w, x, y, z)`.
#[inline]
pub fn quat_to_wxyz(q: DQuat) -> [f64; 4] {
    [q.w, q.x, q.y, q.z]
}

/// Build a quaternion from scene order `(w, x, y, z)`.
///
/// The components are taken as-is; no normalization.
#[inline]
pub fn quat_from_wxyz(c: [f64; 4]) -> DQuat {
    DQuat::from_xyzw(c[1], c[2], c[3], c[0])
}
