//! Math primitives shared by the kinet kinematics crates.
//!
//! Thin aliases over nalgebra plus the handful of rotation utilities the
//! frame and joint layers need: cross-product matrices, Rodrigues rotations,
//! and right-handed orthonormal basis completion.

use nalgebra as na;

/// 3D vector alias.
pub type Vec3 = na::Vector3<f64>;
/// 3x3 matrix alias.
pub type Mat3 = na::Matrix3<f64>;
/// 6D vector alias.
pub type Vec6 = na::Vector6<f64>;
/// 6x6 matrix alias.
pub type Mat6 = na::Matrix6<f64>;
/// Dynamic vector (generalized coordinates).
pub type DVec = na::DVector<f64>;
/// Dynamic matrix.
pub type DMat = na::DMatrix<f64>;

/// Cross-product matrix: [v]× such that [v]× w = v × w.
#[inline]
pub fn skew(v: &Vec3) -> Mat3 {
    Mat3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Rotation of `angle` radians about the unit vector `axis` (Rodrigues).
///
/// This is the active rotation: `axis_angle(a, θ) * v` rotates `v` by θ
/// about `a` following the right-hand rule.
pub fn axis_angle(axis: &Vec3, angle: f64) -> Mat3 {
    let (s, c) = angle.sin_cos();
    let k = skew(axis);
    Mat3::identity() + k * s + k * k * (1.0 - c)
}

/// Completes the unit vector `d` into a right-handed orthonormal triad.
///
/// Returns `(a, b)` such that `(d, a, b)` is cyclic: `d × a = b`,
/// `a × b = d`, `b × d = a`. The choice of `a` is arbitrary but
/// deterministic (seeded from the coordinate axis least aligned with `d`).
pub fn orthonormal_basis(d: &Vec3) -> (Vec3, Vec3) {
    let ax = d.x.abs();
    let ay = d.y.abs();
    let az = d.z.abs();
    let seed = if ax <= ay && ax <= az {
        Vec3::x()
    } else if ay <= az {
        Vec3::y()
    } else {
        Vec3::z()
    };
    let a = d.cross(&seed).normalize();
    let b = d.cross(&a);
    (a, b)
}

/// Angular distance of a rotation matrix from the identity, in radians.
///
/// Computed from the trace; the argument to acos is clamped so that
/// rotations assembled from long composition chains stay in domain.
pub fn rotation_angle(r: &Mat3) -> f64 {
    (((r.trace() - 1.0) * 0.5).clamp(-1.0, 1.0)).acos()
}

/// Determines whether two scalars are relatively equal.
///
/// Scale-aware: the tolerance is measured against the larger magnitude of
/// the operands (with a floor of 1 so values near zero compare absolutely).
#[inline]
pub fn rel_equal(x: f64, y: f64, tol: f64) -> bool {
    (x - y).abs() <= tol * x.abs().max(y.abs()).max(1.0)
}
