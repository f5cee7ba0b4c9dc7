//! Joint state and per-kind kinematics.

use kinet_frame::{FrameArena, FrameId, FrameRef, FramedVector, KinetError, Pose, Result};
use kinet_math::{axis_angle, orthonormal_basis, rel_equal, DVec, Mat3, Vec3};
use kinet_spatial::SpatialAxis;

/// Default threshold below which the singularity measure reports a
/// rank-deficient configuration.
pub const SINGULAR_TOL: f64 = 1e-2;

/// An axis with norm below this is treated as "not yet set".
const AXIS_SET_TOL: f64 = 1e-6;

/// Tolerance for the mutual-orthonormality invariant of assigned axes.
const ORTHO_TOL: f64 = 1e-6;

/// Closed set of joint kinematic variants.
///
/// All variants share the same state and contract; only the per-kind
/// kinematics differ, dispatched by matching on this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JointKind {
    /// Single rotational DOF about one axis.
    Revolute,
    /// Single translational DOF along one axis.
    Prismatic,
    /// Two chained rotational DOFs about orthogonal axes.
    Universal,
    /// Three chained rotational DOFs (ball-and-socket).
    Spherical,
}

impl JointKind {
    /// Degrees of freedom for this kind.
    pub fn num_dof(&self) -> usize {
        match self {
            JointKind::Revolute | JointKind::Prismatic => 1,
            JointKind::Universal => 2,
            JointKind::Spherical => 3,
        }
    }
}

/// Staleness tag on the derived spatial axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheState {
    Current,
    Stale,
}

/// A joint connecting an inboard and an outboard body.
///
/// The joint owns its generalized position `q`, velocity `qd`, and a tare
/// offset added to `q` before any kinematic use. Unit axes are stored in
/// the joint's own frame; the spatial axes `s` and their time derivatives
/// are derived state, recomputed by [`Joint::update_spatial_axes`] and
/// explicitly tagged stale by every coordinate mutation. Reading them
/// while stale is an error, not a silent recompute.
#[derive(Debug, Clone)]
pub struct Joint {
    kind: JointKind,
    /// The joint's own pose node in the frame arena.
    frame: FrameId,
    inboard: Option<FrameRef>,
    outboard: Option<FrameRef>,

    q: DVec,
    qd: DVec,
    q_tare: DVec,

    /// Per-DOF unit axes in the joint frame; zero until set or assigned.
    u: Vec<Vec3>,
    s: Vec<SpatialAxis>,
    s_dot: Vec<SpatialAxis>,

    axes_assigned: bool,
    cache: CacheState,
    singular_tol: f64,
}

impl Joint {
    /// Create a joint whose own frame is the pose node `frame`.
    ///
    /// Coordinates start at zero and no axes are set; connect the bodies
    /// with [`Joint::connect`] before querying spatial axes.
    pub fn new(kind: JointKind, frame: FrameId) -> Self {
        let k = kind.num_dof();
        let fr = FrameRef::Pose(frame);
        Self {
            kind,
            frame,
            inboard: None,
            outboard: None,
            q: DVec::zeros(k),
            qd: DVec::zeros(k),
            q_tare: DVec::zeros(k),
            u: vec![Vec3::zeros(); k],
            s: vec![SpatialAxis::zero(fr); k],
            s_dot: vec![SpatialAxis::zero(fr); k],
            axes_assigned: false,
            cache: CacheState::Stale,
            singular_tol: SINGULAR_TOL,
        }
    }

    /// Attach the inboard and outboard bodies.
    pub fn connect(&mut self, inboard: FrameRef, outboard: FrameRef) {
        self.inboard = Some(inboard);
        self.outboard = Some(outboard);
    }

    /// This joint's kinematic variant.
    pub fn kind(&self) -> JointKind {
        self.kind
    }

    /// The joint's own frame.
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    /// Inboard body frame, if connected.
    pub fn inboard(&self) -> Option<FrameRef> {
        self.inboard
    }

    /// Outboard body frame, if connected.
    pub fn outboard(&self) -> Option<FrameRef> {
        self.outboard
    }

    /// Degrees of freedom.
    pub fn num_dof(&self) -> usize {
        self.kind.num_dof()
    }

    /// Generalized position.
    pub fn q(&self) -> &DVec {
        &self.q
    }

    /// Generalized velocity.
    pub fn qd(&self) -> &DVec {
        &self.qd
    }

    /// Tare offset added to `q` before kinematic use.
    pub fn tare(&self) -> &DVec {
        &self.q_tare
    }

    /// Set the generalized position; marks the spatial axes stale.
    pub fn set_q(&mut self, q: &[f64]) -> Result<()> {
        self.check_len(q.len())?;
        self.q = DVec::from_column_slice(q);
        self.cache = CacheState::Stale;
        Ok(())
    }

    /// Set the generalized velocity; marks the spatial axes stale (their
    /// derivatives depend on it).
    pub fn set_qd(&mut self, qd: &[f64]) -> Result<()> {
        self.check_len(qd.len())?;
        self.qd = DVec::from_column_slice(qd);
        self.cache = CacheState::Stale;
        Ok(())
    }

    /// Set the tare offset, calibrating the zero configuration.
    pub fn set_tare(&mut self, tare: &[f64]) -> Result<()> {
        self.check_len(tare.len())?;
        self.q_tare = DVec::from_column_slice(tare);
        self.cache = CacheState::Stale;
        Ok(())
    }

    /// Set the `index`-th joint axis.
    ///
    /// The direction may be expressed in any frame of the arena; it is
    /// normalized and stored in the joint's own frame. Any previously
    /// completed basis is discarded and re-derived lazily.
    pub fn set_axis(&mut self, arena: &FrameArena, index: usize, axis: &FramedVector) -> Result<()> {
        let k = self.num_dof();
        if index >= k {
            return Err(KinetError::InvalidIndex { index, len: k });
        }
        let norm = axis.coords.norm();
        if norm < AXIS_SET_TOL {
            return Err(KinetError::Precondition(
                "joint axis direction is numerically zero".into(),
            ));
        }
        let unit = FramedVector::new(axis.coords / norm, axis.frame);
        let local = arena.transform_vector(&unit, FrameRef::Pose(self.frame))?;
        self.u[index] = local.coords;
        self.axes_assigned = false;
        self.cache = CacheState::Stale;
        Ok(())
    }

    /// Complete the unset axes into a right-handed orthonormal basis.
    ///
    /// With two axes set the third is their cross product; with one set
    /// the remaining pair is an arbitrary orthonormal completion; with
    /// none set nothing can be derived and `false` is returned, leaving
    /// the joint unassigned.
    pub fn assign_axes(&mut self) -> bool {
        match self.kind {
            JointKind::Revolute | JointKind::Prismatic => {
                if !axis_set(&self.u[0]) {
                    return false;
                }
                self.u[0] = self.u[0].normalize();
            }
            JointKind::Universal => match (axis_set(&self.u[0]), axis_set(&self.u[1])) {
                (false, false) => return false,
                (true, false) => {
                    self.u[0] = self.u[0].normalize();
                    let (a, _) = orthonormal_basis(&self.u[0]);
                    self.u[1] = a;
                }
                (false, true) => {
                    self.u[1] = self.u[1].normalize();
                    let (_, b) = orthonormal_basis(&self.u[1]);
                    self.u[0] = b;
                }
                (true, true) => {
                    self.u[0] = self.u[0].normalize();
                    self.u[1] = self.u[1].normalize();
                }
            },
            JointKind::Spherical => {
                if !axis_set(&self.u[0]) {
                    if !axis_set(&self.u[1]) {
                        if !axis_set(&self.u[2]) {
                            return false;
                        }
                        // only axis 3 set
                        self.u[2] = self.u[2].normalize();
                        let (a, b) = orthonormal_basis(&self.u[2]);
                        self.u[0] = a;
                        self.u[1] = b;
                    } else if !axis_set(&self.u[2]) {
                        // only axis 2 set
                        self.u[1] = self.u[1].normalize();
                        let (a, b) = orthonormal_basis(&self.u[1]);
                        self.u[2] = a;
                        self.u[0] = b;
                    } else {
                        // axes 2 and 3 set
                        self.u[1] = self.u[1].normalize();
                        self.u[2] = self.u[2].normalize();
                        self.u[0] = self.u[1].cross(&self.u[2]);
                    }
                } else if !axis_set(&self.u[1]) {
                    if !axis_set(&self.u[2]) {
                        // only axis 1 set
                        self.u[0] = self.u[0].normalize();
                        let (a, b) = orthonormal_basis(&self.u[0]);
                        self.u[1] = a;
                        self.u[2] = b;
                    } else {
                        // axes 1 and 3 set
                        self.u[0] = self.u[0].normalize();
                        self.u[2] = self.u[2].normalize();
                        self.u[1] = self.u[2].cross(&self.u[0]);
                    }
                } else if !axis_set(&self.u[2]) {
                    // axes 1 and 2 set
                    self.u[0] = self.u[0].normalize();
                    self.u[1] = self.u[1].normalize();
                    self.u[2] = self.u[0].cross(&self.u[1]);
                }
            }
        }
        self.axes_assigned = true;
        true
    }

    /// The `index`-th axis in the current configuration, in the joint
    /// frame.
    ///
    /// Axis 0 is the stored direction; each later axis is the stored
    /// direction rotated by the elementary rotations of all lower-indexed
    /// coordinates evaluated at `q + tare`. Requires a completed basis.
    pub fn axis(&self, index: usize) -> Result<FramedVector> {
        let k = self.num_dof();
        if index >= k {
            return Err(KinetError::InvalidIndex { index, len: k });
        }
        self.ensure_assigned()?;
        let eff = self.effective_axes();
        Ok(FramedVector::new(eff[index], FrameRef::Pose(self.frame)))
    }

    /// Recompute the spatial axes and their time derivatives from the
    /// current coordinates, completing the axis basis lazily first.
    ///
    /// Fails with `Precondition` when the bodies are not connected or the
    /// set axes are not mutually orthonormal, and with `Underdetermined`
    /// when too few axes are set to complete a basis. On success the cache
    /// is tagged current.
    pub fn update_spatial_axes(&mut self) -> Result<()> {
        if self.inboard.is_none() || self.outboard.is_none() {
            return Err(KinetError::Precondition(
                "spatial axes requested before inboard/outboard bodies were connected".into(),
            ));
        }
        if !self.axes_assigned && !self.assign_axes() {
            return Err(KinetError::Underdetermined);
        }
        self.verify_axes()?;

        let fr = FrameRef::Pose(self.frame);
        let zero = Vec3::zeros();
        let eff = self.effective_axes();

        match self.kind {
            JointKind::Prismatic => {
                self.s[0] = SpatialAxis::new(zero, eff[0], fr);
                self.s_dot[0] = SpatialAxis::zero(fr);
            }
            JointKind::Revolute => {
                self.s[0] = SpatialAxis::new(eff[0], zero, fr);
                self.s_dot[0] = SpatialAxis::zero(fr);
            }
            JointKind::Universal => {
                self.s[0] = SpatialAxis::new(eff[0], zero, fr);
                self.s[1] = SpatialAxis::new(eff[1], zero, fr);
                // d/dt (R1 u1) = ω0 × (R1 u1), ω0 = u0 q̇0
                let omega0 = self.u[0] * self.qd[0];
                self.s_dot[0] = SpatialAxis::zero(fr);
                self.s_dot[1] = SpatialAxis::new(omega0.cross(&eff[1]), zero, fr);
            }
            JointKind::Spherical => {
                for i in 0..3 {
                    self.s[i] = SpatialAxis::new(eff[i], zero, fr);
                }
                let th0 = self.q[0] + self.q_tare[0];
                let th1 = self.q[1] + self.q_tare[1];
                let r1 = axis_angle(&self.u[0], th0);
                let r2 = axis_angle(&self.u[1], th1);
                let omega0 = self.u[0] * self.qd[0];
                let omega1 = self.u[1] * self.qd[1];
                self.s_dot[0] = SpatialAxis::zero(fr);
                self.s_dot[1] = SpatialAxis::new(omega0.cross(&eff[1]), zero, fr);
                // product rule over R1 R2 u2: the Ṙ1 term swings the whole
                // axis with ω0, the Ṙ2 term swings R2 u2 with ω1 inside the
                // R1-rotated frame.
                let inner = omega1.cross(&(r2 * self.u[2]));
                self.s_dot[2] = SpatialAxis::new(omega0.cross(&eff[2]) + r1 * inner, zero, fr);
            }
        }

        self.cache = CacheState::Current;
        Ok(())
    }

    /// The spatial axes (Jacobian columns), one per DOF, in the joint
    /// frame. Fails while the cache is stale.
    pub fn spatial_axes(&self) -> Result<&[SpatialAxis]> {
        self.ensure_current()?;
        Ok(&self.s)
    }

    /// Time derivatives of the spatial axes. Fails while the cache is
    /// stale.
    pub fn spatial_axes_dot(&self) -> Result<&[SpatialAxis]> {
        self.ensure_current()?;
        Ok(&self.s_dot)
    }

    /// Net rotation induced by the joint at the current coordinates:
    /// the composed elementary axis-angle rotations at `q + tare`.
    pub fn rotation(&self) -> Result<Mat3> {
        self.ensure_assigned()?;
        let th: Vec<f64> = (0..self.num_dof())
            .map(|i| self.q[i] + self.q_tare[i])
            .collect();
        Ok(match self.kind {
            JointKind::Prismatic => Mat3::identity(),
            JointKind::Revolute => axis_angle(&self.u[0], th[0]),
            JointKind::Universal => axis_angle(&self.u[0], th[0]) * axis_angle(&self.u[1], th[1]),
            JointKind::Spherical => {
                axis_angle(&self.u[0], th[0])
                    * axis_angle(&self.u[1], th[1])
                    * axis_angle(&self.u[2], th[2])
            }
        })
    }

    /// The relative pose induced between the attached bodies, expressed
    /// relative to the joint frame. Translation is zero for the rotational
    /// kinds; a prismatic joint translates along its axis.
    pub fn induced_pose(&self) -> Result<Pose> {
        let rot = self.rotation()?;
        let x = match self.kind {
            JointKind::Prismatic => self.u[0] * (self.q[0] + self.q_tare[0]),
            _ => Vec3::zeros(),
        };
        Ok(Pose::new(rot, x, FrameRef::Pose(self.frame)))
    }

    /// Number of constraint equations this joint contributes when used to
    /// close a kinematic loop.
    pub fn num_constraint_eqns(&self) -> usize {
        6 - self.num_dof()
    }

    /// Loop-closure residual between the attachment points.
    ///
    /// Non-functional placeholder: writes a zero residual. Closed chains
    /// are an extension point; evaluating the residual needs the
    /// attachment points computed through both bodies' paths.
    pub fn evaluate_constraints(&self, residual: &mut [f64]) -> Result<()> {
        let n = self.num_constraint_eqns();
        if residual.len() != n {
            return Err(KinetError::SizeMismatch {
                expected: n,
                got: residual.len(),
            });
        }
        residual.fill(0.0);
        Ok(())
    }

    /// Distance from the nearest rank-losing configuration, in [0, 1].
    ///
    /// For the chained-rotation kinds this is `|cos(q₁ + tare₁)|`: the
    /// third effective axis folds onto the first as the middle coordinate
    /// approaches ±π/2. Single-DOF kinds never lose rank. Near-singular
    /// kinematics stay numerically defined; this measure is advisory.
    pub fn singularity_measure(&self) -> f64 {
        match self.kind {
            JointKind::Revolute | JointKind::Prismatic => 1.0,
            JointKind::Universal | JointKind::Spherical => {
                (self.q[1] + self.q_tare[1]).cos().abs()
            }
        }
    }

    /// Whether the current configuration is within the singular tolerance.
    pub fn is_singular(&self) -> bool {
        self.singularity_measure() < self.singular_tol
    }

    /// The configurable singularity threshold.
    pub fn singular_tolerance(&self) -> f64 {
        self.singular_tol
    }

    /// Adjust the singularity threshold.
    pub fn set_singular_tolerance(&mut self, tol: f64) {
        self.singular_tol = tol;
    }

    /// Effective axis directions at the current coordinates, joint frame.
    fn effective_axes(&self) -> Vec<Vec3> {
        match self.kind {
            JointKind::Revolute | JointKind::Prismatic => vec![self.u[0]],
            JointKind::Universal => {
                let r1 = axis_angle(&self.u[0], self.q[0] + self.q_tare[0]);
                vec![self.u[0], r1 * self.u[1]]
            }
            JointKind::Spherical => {
                let r1 = axis_angle(&self.u[0], self.q[0] + self.q_tare[0]);
                let r2 = axis_angle(&self.u[1], self.q[1] + self.q_tare[1]);
                vec![self.u[0], r1 * self.u[1], r1 * (r2 * self.u[2])]
            }
        }
    }

    fn verify_axes(&self) -> Result<()> {
        let k = self.num_dof();
        for i in 0..k {
            if !rel_equal(self.u[i].norm(), 1.0, ORTHO_TOL) {
                return Err(KinetError::Precondition(format!(
                    "joint axis {i} is not unit length"
                )));
            }
            for j in (i + 1)..k {
                if self.u[i].dot(&self.u[j]).abs() > ORTHO_TOL {
                    return Err(KinetError::Precondition(format!(
                        "joint axes {i} and {j} are not orthogonal"
                    )));
                }
            }
        }
        Ok(())
    }

    fn ensure_assigned(&self) -> Result<()> {
        if !self.axes_assigned {
            return Err(KinetError::Underdetermined);
        }
        Ok(())
    }

    fn ensure_current(&self) -> Result<()> {
        if self.cache == CacheState::Stale {
            return Err(KinetError::Precondition(
                "spatial axes are stale; call update_spatial_axes() after mutating coordinates"
                    .into(),
            ));
        }
        Ok(())
    }

    fn check_len(&self, got: usize) -> Result<()> {
        let expected = self.num_dof();
        if got != expected {
            return Err(KinetError::SizeMismatch { expected, got });
        }
        Ok(())
    }
}

fn axis_set(u: &Vec3) -> bool {
    u.norm() > AXIS_SET_TOL
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;

    fn spherical_with_standard_axes() -> (FrameArena, Joint) {
        let mut arena = FrameArena::new();
        let inboard = arena.insert(Pose::identity(FrameRef::World)).unwrap();
        let jf = arena
            .insert(Pose::identity(FrameRef::Pose(inboard)))
            .unwrap();
        let outboard = arena.insert(Pose::identity(FrameRef::Pose(jf))).unwrap();
        let mut joint = Joint::new(JointKind::Spherical, jf);
        joint.connect(FrameRef::Pose(inboard), FrameRef::Pose(outboard));
        let fr = FrameRef::Pose(jf);
        joint.set_axis(&arena, 0, &FramedVector::new(Vec3::x(), fr)).unwrap();
        joint.set_axis(&arena, 1, &FramedVector::new(Vec3::y(), fr)).unwrap();
        joint.set_axis(&arena, 2, &FramedVector::new(Vec3::z(), fr)).unwrap();
        (arena, joint)
    }

    proptest! {
        #[test]
        fn spatial_axes_dot_is_first_order(
            q0 in -1.2..1.2_f64,
            q1 in -1.2..1.2_f64,
            q2 in -1.2..1.2_f64,
            qd0 in -1.0..1.0_f64,
            qd1 in -1.0..1.0_f64,
            qd2 in -1.0..1.0_f64,
        ) {
            let (_arena, mut joint) = spherical_with_standard_axes();
            joint.set_q(&[q0, q1, q2]).unwrap();
            joint.set_qd(&[qd0, qd1, qd2]).unwrap();
            joint.update_spatial_axes().unwrap();
            let s_dot: Vec<_> = joint.spatial_axes_dot().unwrap()
                .iter().map(|s| s.angular).collect();
            let s0: Vec<_> = joint.spatial_axes().unwrap()
                .iter().map(|s| s.angular).collect();

            let eps = 1e-6;
            let mut shifted = joint.clone();
            shifted
                .set_q(&[q0 + qd0 * eps, q1 + qd1 * eps, q2 + qd2 * eps])
                .unwrap();
            shifted.update_spatial_axes().unwrap();
            let s1: Vec<_> = shifted.spatial_axes().unwrap()
                .iter().map(|s| s.angular).collect();

            for i in 0..3 {
                let fd = (s1[i] - s0[i]) / eps;
                prop_assert!((s_dot[i] - fd).norm() < 1e-4,
                    "axis {}: analytic {:?} vs finite difference {:?}", i, s_dot[i], fd);
            }
        }

        #[test]
        fn effective_axes_stay_orthonormal(
            q0 in -3.0..3.0_f64,
            q1 in -3.0..3.0_f64,
            q2 in -3.0..3.0_f64,
        ) {
            let (_arena, mut joint) = spherical_with_standard_axes();
            joint.set_q(&[q0, q1, q2]).unwrap();
            joint.update_spatial_axes().unwrap();
            // Each spatial axis stays unit length under the chained
            // rotations; orthogonality between them is configuration
            // dependent and not expected.
            for s in joint.spatial_axes().unwrap() {
                prop_assert!((s.angular.norm() - 1.0).abs() < 1e-9);
                prop_assert!(s.linear.norm() < 1e-12);
            }
        }
    }
}
