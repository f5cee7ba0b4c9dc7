//! Screw types: spatial axes, twists, wrenches, and momenta.
//!
//! All four kinds share the `[angular; linear]` layout and a mandatory
//! frame tag. Motion-type screws (axes, twists) and force-type screws
//! (wrenches, momenta) are duals: their pairing crosses the angular half of
//! one operand against the linear half of the other, which is what makes
//! `twist · wrench` the mechanical power independently of the reference
//! point, as long as both are expressed in the same frame.

use kinet_frame::{FrameArena, FrameRef, KinetError, Result, Transform};
use kinet_math::Vec3;

/// Reciprocal screw pairing: angular-of-a · linear-of-b + linear-of-a ·
/// angular-of-b. Deliberately not the elementwise 6-vector dot.
#[inline]
fn reciprocal(ang_a: &Vec3, lin_a: &Vec3, ang_b: &Vec3, lin_b: &Vec3) -> f64 {
    ang_a.dot(lin_b) + lin_a.dot(ang_b)
}

fn check_same_frame(a: FrameRef, b: FrameRef, op: &str) -> Result<()> {
    if a != b {
        return Err(KinetError::FrameMismatch(format!(
            "{op} requires both operands in one frame: {a:?} vs {b:?}"
        )));
    }
    Ok(())
}

/// Frame change for motion-type screws: `ω' = Rω`, `v' = Rv + x × (Rω)`.
#[inline]
fn motion_change(t: &Transform, ang: &Vec3, lin: &Vec3) -> (Vec3, Vec3) {
    let w = t.rot * ang;
    (w, t.rot * lin + t.x.cross(&w))
}

/// Frame change for force-type screws: `f' = Rf`, `τ' = Rτ + x × (Rf)`.
#[inline]
fn force_change(t: &Transform, ang: &Vec3, lin: &Vec3) -> (Vec3, Vec3) {
    let f = t.rot * lin;
    (t.rot * ang + t.x.cross(&f), f)
}

/// One column of a joint's velocity-mapping Jacobian: a unit screw for a
/// single degree of freedom. Motion type.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpatialAxis {
    pub angular: Vec3,
    pub linear: Vec3,
    pub frame: FrameRef,
}

/// A spatial velocity (angular velocity + linear velocity of the body
/// point at the frame origin). Motion type.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Twist {
    pub angular: Vec3,
    pub linear: Vec3,
    pub frame: FrameRef,
}

/// A spatial force (moment about the frame origin + force). Force type.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wrench {
    pub angular: Vec3,
    pub linear: Vec3,
    pub frame: FrameRef,
}

/// Spatial momentum (angular momentum about the frame origin + linear
/// momentum). Force type.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Momentum {
    pub angular: Vec3,
    pub linear: Vec3,
    pub frame: FrameRef,
}

impl SpatialAxis {
    /// Create an axis; the frame is always required.
    pub fn new(angular: Vec3, linear: Vec3, frame: FrameRef) -> Self {
        Self {
            angular,
            linear,
            frame,
        }
    }

    /// Zero axis in `frame`.
    pub fn zero(frame: FrameRef) -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), frame)
    }

    /// The twist produced by driving this degree of freedom at rate `qd`.
    pub fn velocity(&self, qd: f64) -> Twist {
        Twist::new(self.angular * qd, self.linear * qd, self.frame)
    }

    /// Reciprocal product with a wrench (generalized force on this DOF).
    pub fn dot(&self, f: &Wrench) -> Result<f64> {
        check_same_frame(self.frame, f.frame, "axis · wrench")?;
        Ok(reciprocal(&self.angular, &self.linear, &f.angular, &f.linear))
    }

    /// Reciprocal product with a momentum.
    pub fn dot_momentum(&self, m: &Momentum) -> Result<f64> {
        check_same_frame(self.frame, m.frame, "axis · momentum")?;
        Ok(reciprocal(&self.angular, &self.linear, &m.angular, &m.linear))
    }

    /// Re-express in `target` using the motion-type frame-change rule.
    pub fn transform_to(&self, arena: &FrameArena, target: FrameRef) -> Result<SpatialAxis> {
        let t = arena.transform_between(self.frame, target)?;
        let (ang, lin) = motion_change(&t, &self.angular, &self.linear);
        Ok(SpatialAxis::new(ang, lin, target))
    }
}

impl Twist {
    /// Create a twist; the frame is always required.
    pub fn new(angular: Vec3, linear: Vec3, frame: FrameRef) -> Self {
        Self {
            angular,
            linear,
            frame,
        }
    }

    /// Zero twist in `frame`.
    pub fn zero(frame: FrameRef) -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), frame)
    }

    /// Sum of two twists expressed in the same frame.
    pub fn add(&self, other: &Twist) -> Result<Twist> {
        check_same_frame(self.frame, other.frame, "twist + twist")?;
        Ok(Twist::new(
            self.angular + other.angular,
            self.linear + other.linear,
            self.frame,
        ))
    }

    /// Difference of two twists expressed in the same frame.
    pub fn sub(&self, other: &Twist) -> Result<Twist> {
        check_same_frame(self.frame, other.frame, "twist - twist")?;
        Ok(Twist::new(
            self.angular - other.angular,
            self.linear - other.linear,
            self.frame,
        ))
    }

    /// Reciprocal product with a wrench: the mechanical power.
    pub fn dot(&self, f: &Wrench) -> Result<f64> {
        check_same_frame(self.frame, f.frame, "twist · wrench")?;
        Ok(reciprocal(&self.angular, &self.linear, &f.angular, &f.linear))
    }

    /// Reciprocal product with a momentum (twice the kinetic energy when
    /// the momentum belongs to this twist).
    pub fn dot_momentum(&self, m: &Momentum) -> Result<f64> {
        check_same_frame(self.frame, m.frame, "twist · momentum")?;
        Ok(reciprocal(&self.angular, &self.linear, &m.angular, &m.linear))
    }

    /// Spatial cross product with another motion screw, as used in
    /// velocity propagation.
    pub fn cross_motion(&self, other: &Twist) -> Result<Twist> {
        check_same_frame(self.frame, other.frame, "twist ×ₘ twist")?;
        Ok(Twist::new(
            self.angular.cross(&other.angular),
            self.angular.cross(&other.linear) + self.linear.cross(&other.angular),
            self.frame,
        ))
    }

    /// Spatial cross product with a force screw, as used in bias-force
    /// computation.
    pub fn cross_force(&self, f: &Wrench) -> Result<Wrench> {
        check_same_frame(self.frame, f.frame, "twist ×f wrench")?;
        Ok(Wrench::new(
            self.angular.cross(&f.angular) + self.linear.cross(&f.linear),
            self.angular.cross(&f.linear),
            self.frame,
        ))
    }

    /// Re-express in `target` using the motion-type frame-change rule.
    pub fn transform_to(&self, arena: &FrameArena, target: FrameRef) -> Result<Twist> {
        let t = arena.transform_between(self.frame, target)?;
        let (ang, lin) = motion_change(&t, &self.angular, &self.linear);
        Ok(Twist::new(ang, lin, target))
    }
}

impl Wrench {
    /// Create a wrench; the frame is always required.
    pub fn new(angular: Vec3, linear: Vec3, frame: FrameRef) -> Self {
        Self {
            angular,
            linear,
            frame,
        }
    }

    /// Zero wrench in `frame`.
    pub fn zero(frame: FrameRef) -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), frame)
    }

    /// Sum of two wrenches expressed in the same frame.
    pub fn add(&self, other: &Wrench) -> Result<Wrench> {
        check_same_frame(self.frame, other.frame, "wrench + wrench")?;
        Ok(Wrench::new(
            self.angular + other.angular,
            self.linear + other.linear,
            self.frame,
        ))
    }

    /// Difference of two wrenches expressed in the same frame.
    pub fn sub(&self, other: &Wrench) -> Result<Wrench> {
        check_same_frame(self.frame, other.frame, "wrench - wrench")?;
        Ok(Wrench::new(
            self.angular - other.angular,
            self.linear - other.linear,
            self.frame,
        ))
    }

    /// Reciprocal product with a twist; equal to `twist.dot(wrench)`.
    pub fn dot(&self, v: &Twist) -> Result<f64> {
        v.dot(self)
    }

    /// Re-express in `target` using the force-type frame-change rule.
    pub fn transform_to(&self, arena: &FrameArena, target: FrameRef) -> Result<Wrench> {
        let t = arena.transform_between(self.frame, target)?;
        let (ang, lin) = force_change(&t, &self.angular, &self.linear);
        Ok(Wrench::new(ang, lin, target))
    }
}

impl Momentum {
    /// Create a momentum; the frame is always required.
    pub fn new(angular: Vec3, linear: Vec3, frame: FrameRef) -> Self {
        Self {
            angular,
            linear,
            frame,
        }
    }

    /// Zero momentum in `frame`.
    pub fn zero(frame: FrameRef) -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros(), frame)
    }

    /// Sum of two momenta expressed in the same frame.
    pub fn add(&self, other: &Momentum) -> Result<Momentum> {
        check_same_frame(self.frame, other.frame, "momentum + momentum")?;
        Ok(Momentum::new(
            self.angular + other.angular,
            self.linear + other.linear,
            self.frame,
        ))
    }

    /// Difference of two momenta expressed in the same frame.
    pub fn sub(&self, other: &Momentum) -> Result<Momentum> {
        check_same_frame(self.frame, other.frame, "momentum - momentum")?;
        Ok(Momentum::new(
            self.angular - other.angular,
            self.linear - other.linear,
            self.frame,
        ))
    }

    /// Reciprocal product with a twist; equal to `twist.dot_momentum(m)`.
    pub fn dot(&self, v: &Twist) -> Result<f64> {
        v.dot_momentum(self)
    }

    /// Re-express in `target` using the force-type frame-change rule.
    pub fn transform_to(&self, arena: &FrameArena, target: FrameRef) -> Result<Momentum> {
        let t = arena.transform_between(self.frame, target)?;
        let (ang, lin) = force_change(&t, &self.angular, &self.linear);
        Ok(Momentum::new(ang, lin, target))
    }
}

macro_rules! impl_scaling {
    ($ty:ident) => {
        impl std::ops::Mul<f64> for $ty {
            type Output = $ty;
            /// Scaling is frame-independent.
            fn mul(self, rhs: f64) -> $ty {
                $ty::new(self.angular * rhs, self.linear * rhs, self.frame)
            }
        }

        impl std::ops::Neg for $ty {
            type Output = $ty;
            fn neg(self) -> $ty {
                $ty::new(-self.angular, -self.linear, self.frame)
            }
        }
    };
}

impl_scaling!(SpatialAxis);
impl_scaling!(Twist);
impl_scaling!(Wrench);
impl_scaling!(Momentum);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kinet_frame::Pose;
    use kinet_math::axis_angle;

    #[test]
    fn test_reciprocal_is_cross_paired() {
        let v = Twist::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0), FrameRef::World);
        let f = Wrench::new(Vec3::new(0.0, 3.0, 0.0), Vec3::new(4.0, 0.0, 0.0), FrameRef::World);
        // ang_v · lin_f + lin_v · ang_f = 1*4 + 2*3 = 10; the elementwise
        // 6-dot would be 0.
        assert_relative_eq!(v.dot(&f).unwrap(), 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_dot_symmetry_and_linearity() {
        let v = Twist::new(Vec3::new(0.3, -1.0, 0.2), Vec3::new(1.0, 0.5, -0.7), FrameRef::World);
        let f = Wrench::new(Vec3::new(-0.4, 0.8, 1.2), Vec3::new(0.6, -0.1, 0.9), FrameRef::World);
        assert_relative_eq!(v.dot(&f).unwrap(), f.dot(&v).unwrap(), epsilon = 1e-12);
        assert_relative_eq!(
            (v * 2.5).dot(&f).unwrap(),
            2.5 * v.dot(&f).unwrap(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            v.dot(&(f * -3.0)).unwrap(),
            -3.0 * v.dot(&f).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_mismatched_frames_fail() {
        let mut arena = FrameArena::new();
        let a = arena.insert(Pose::identity(FrameRef::World)).unwrap();
        let v = Twist::zero(FrameRef::World);
        let f = Wrench::zero(FrameRef::Pose(a));
        assert!(matches!(v.dot(&f), Err(KinetError::FrameMismatch(_))));
        let w = Twist::zero(FrameRef::Pose(a));
        assert!(matches!(v.add(&w), Err(KinetError::FrameMismatch(_))));
    }

    #[test]
    fn test_add_sub_same_frame() {
        let a = Twist::new(Vec3::x(), Vec3::y(), FrameRef::World);
        let b = Twist::new(Vec3::y(), Vec3::z(), FrameRef::World);
        let sum = a.add(&b).unwrap();
        assert_relative_eq!(sum.angular, Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-12);
        let diff = sum.sub(&b).unwrap();
        assert_relative_eq!(diff.linear, a.linear, epsilon = 1e-12);
    }

    #[test]
    fn test_cross_motion_matches_angular_cross() {
        let a = Twist::new(Vec3::z(), Vec3::zeros(), FrameRef::World);
        let b = Twist::new(Vec3::x(), Vec3::zeros(), FrameRef::World);
        let c = a.cross_motion(&b).unwrap();
        assert_relative_eq!(c.angular, Vec3::y(), epsilon = 1e-12);
    }

    #[test]
    fn test_pure_rotation_frame_change() {
        let mut arena = FrameArena::new();
        let f = arena
            .insert(Pose::from_rotation(
                axis_angle(&Vec3::z(), std::f64::consts::FRAC_PI_2),
                FrameRef::World,
            ))
            .unwrap();
        // Twist about world X, re-expressed in a frame rotated 90° about Z:
        // world X is the frame's -Y direction.
        let v = Twist::new(Vec3::x(), Vec3::zeros(), FrameRef::World);
        let in_f = v.transform_to(&arena, FrameRef::Pose(f)).unwrap();
        assert_relative_eq!(in_f.angular, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-12);
        assert_relative_eq!(in_f.linear, Vec3::zeros(), epsilon = 1e-12);
    }

    #[test]
    fn test_moment_arm_coupling() {
        let mut arena = FrameArena::new();
        // Frame displaced one unit along world X, no rotation.
        let f = arena
            .insert(Pose::from_translation(Vec3::x(), FrameRef::World))
            .unwrap();
        // Pure rotation about world Z through the world origin: seen from
        // the displaced frame, the origin point sweeps sideways.
        let v = Twist::new(Vec3::z(), Vec3::zeros(), FrameRef::World);
        let in_f = v.transform_to(&arena, FrameRef::Pose(f)).unwrap();
        assert_relative_eq!(in_f.angular, Vec3::z(), epsilon = 1e-12);
        assert_relative_eq!(in_f.linear, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-12);
        // Dual coupling for a force along world X: moment about the
        // displaced origin appears about -Z... r × f with r = -x̂.
        let w = Wrench::new(Vec3::zeros(), Vec3::y(), FrameRef::World);
        let w_f = w.transform_to(&arena, FrameRef::Pose(f)).unwrap();
        assert_relative_eq!(w_f.linear, Vec3::y(), epsilon = 1e-12);
        assert_relative_eq!(w_f.angular, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-12);
    }

    #[test]
    fn test_roundtrip_frame_change() {
        let mut arena = FrameArena::new();
        let f = arena
            .insert(Pose::new(
                axis_angle(&Vec3::new(1.0, 2.0, 3.0).normalize(), 0.6),
                Vec3::new(0.5, -1.5, 2.0),
                FrameRef::World,
            ))
            .unwrap();
        let v = Twist::new(Vec3::new(0.1, 0.2, 0.3), Vec3::new(-0.4, 0.5, -0.6), FrameRef::World);
        let back = v
            .transform_to(&arena, FrameRef::Pose(f))
            .unwrap()
            .transform_to(&arena, FrameRef::World)
            .unwrap();
        assert_relative_eq!(back.angular, v.angular, epsilon = 1e-10);
        assert_relative_eq!(back.linear, v.linear, epsilon = 1e-10);
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use kinet_frame::Pose;
    use proptest::prelude::*;

    fn arb_vec() -> impl Strategy<Value = Vec3> {
        (-5.0..5.0_f64, -5.0..5.0_f64, -5.0..5.0_f64).prop_map(|(x, y, z)| Vec3::new(x, y, z))
    }

    fn arb_pose() -> impl Strategy<Value = Pose> {
        (arb_vec(), -3.0..3.0_f64, arb_vec())
            .prop_filter("non-zero axis", |(a, _, _)| a.norm() > 0.1)
            .prop_map(|(axis, angle, x)| {
                Pose::new(
                    kinet_math::axis_angle(&axis.normalize(), angle),
                    x,
                    FrameRef::World,
                )
            })
    }

    proptest! {
        #[test]
        fn power_is_frame_invariant(
            pose in arb_pose(),
            va in arb_vec(), vl in arb_vec(),
            fa in arb_vec(), fl in arb_vec(),
        ) {
            let mut arena = FrameArena::new();
            let frame = arena.insert(pose).unwrap();
            let v = Twist::new(va, vl, FrameRef::World);
            let f = Wrench::new(fa, fl, FrameRef::World);
            let p_world = v.dot(&f).unwrap();
            let p_local = v
                .transform_to(&arena, FrameRef::Pose(frame)).unwrap()
                .dot(&f.transform_to(&arena, FrameRef::Pose(frame)).unwrap())
                .unwrap();
            prop_assert!((p_world - p_local).abs() < 1e-8 * (1.0 + p_world.abs()));
        }

        #[test]
        fn dot_is_symmetric(
            va in arb_vec(), vl in arb_vec(),
            fa in arb_vec(), fl in arb_vec(),
        ) {
            let v = Twist::new(va, vl, FrameRef::World);
            let f = Wrench::new(fa, fl, FrameRef::World);
            prop_assert!((v.dot(&f).unwrap() - f.dot(&v).unwrap()).abs() < 1e-12);
        }
    }
}
