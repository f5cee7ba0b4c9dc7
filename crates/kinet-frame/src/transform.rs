//! Rigid transformations between two named frames.

use kinet_math::{rotation_angle, Mat3, Vec3};

use crate::arena::FrameRef;
use crate::error::{KinetError, Result};
use crate::pose::{FramedPoint, FramedVector, Pose};

/// An explicit rigid mapping from quantities expressed in `source` to
/// quantities expressed in `target`: `p_target = rot * p_source + x`.
///
/// Unlike a [`Pose`], which is a location, a transform is an operator; the
/// source/target tags make composition order checkable.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    /// Rotation part of the mapping.
    pub rot: Mat3,
    /// Translation part of the mapping.
    pub x: Vec3,
    /// Frame the operand must be expressed in.
    pub source: FrameRef,
    /// Frame the result is expressed in.
    pub target: FrameRef,
}

impl Transform {
    /// Create a transform from its parts.
    pub fn new(rot: Mat3, x: Vec3, source: FrameRef, target: FrameRef) -> Self {
        Self {
            rot,
            x,
            source,
            target,
        }
    }

    /// Identity transform within a single frame.
    pub fn identity(frame: FrameRef) -> Self {
        Self {
            rot: Mat3::identity(),
            x: Vec3::zeros(),
            source: frame,
            target: frame,
        }
    }

    /// Compose with a following transform: `self` maps source → target,
    /// `next` maps `self.target` → its own target, and the result maps
    /// `self.source` → `next.target`.
    ///
    /// Fails with [`KinetError::FrameMismatch`] unless
    /// `self.target == next.source`.
    pub fn compose(&self, next: &Transform) -> Result<Transform> {
        if self.target != next.source {
            return Err(KinetError::FrameMismatch(format!(
                "compose requires matching interior frames: {:?} vs {:?}",
                self.target, next.source
            )));
        }
        Ok(Transform {
            rot: next.rot * self.rot,
            x: next.rot * self.x + next.x,
            source: self.source,
            target: next.target,
        })
    }

    /// The inverse mapping: swaps source and target, `R' = Rᵀ`,
    /// `x' = -Rᵀ x`.
    pub fn inverse(&self) -> Transform {
        let rt = self.rot.transpose();
        Transform {
            rot: rt,
            x: -(rt * self.x),
            source: self.target,
            target: self.source,
        }
    }

    /// Map a point from the source frame into the target frame
    /// (rotation + translation).
    pub fn transform_point(&self, p: &FramedPoint) -> Result<FramedPoint> {
        self.check_operand(p.frame, self.source)?;
        Ok(FramedPoint::new(self.rot * p.coords + self.x, self.target))
    }

    /// Map a point from the target frame back into the source frame.
    pub fn inverse_transform_point(&self, p: &FramedPoint) -> Result<FramedPoint> {
        self.check_operand(p.frame, self.target)?;
        Ok(FramedPoint::new(
            self.rot.transpose() * (p.coords - self.x),
            self.source,
        ))
    }

    /// Map a free vector from the source frame into the target frame
    /// (rotation only; free vectors have no position).
    pub fn transform_vector(&self, v: &FramedVector) -> Result<FramedVector> {
        self.check_operand(v.frame, self.source)?;
        Ok(FramedVector::new(self.rot * v.coords, self.target))
    }

    /// Map a free vector from the target frame back into the source frame.
    pub fn inverse_transform_vector(&self, v: &FramedVector) -> Result<FramedVector> {
        self.check_operand(v.frame, self.target)?;
        Ok(FramedVector::new(self.rot.transpose() * v.coords, self.source))
    }

    /// Re-express a pose: a pose whose parent is the source frame becomes
    /// the same rigid placement expressed relative to the target frame.
    pub fn transform_pose(&self, pose: &Pose) -> Result<Pose> {
        self.check_operand(pose.parent, self.source)?;
        Ok(Pose::new(
            self.rot * pose.rot,
            self.rot * pose.x + self.x,
            self.target,
        ))
    }

    /// Approximate equality within `tol`; fails with
    /// [`KinetError::FrameMismatch`] unless both transforms map between the
    /// same pair of frames.
    pub fn rel_equal(&self, other: &Transform, tol: f64) -> Result<bool> {
        if self.source != other.source || self.target != other.target {
            return Err(KinetError::FrameMismatch(format!(
                "cannot compare {:?}→{:?} with {:?}→{:?}",
                self.source, self.target, other.source, other.target
            )));
        }
        let dr = rotation_angle(&(self.rot.transpose() * other.rot));
        let dx = (self.x - other.x).norm();
        Ok(dr <= tol && dx <= tol)
    }

    fn check_operand(&self, declared: FrameRef, expected: FrameRef) -> Result<()> {
        if declared != expected {
            return Err(KinetError::FrameMismatch(format!(
                "operand expressed in {declared:?}, transform expects {expected:?}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use kinet_math::axis_angle;

    #[test]
    fn test_point_roundtrip() {
        let t = Transform::new(
            axis_angle(&Vec3::z(), 0.8),
            Vec3::new(1.0, -2.0, 0.5),
            FrameRef::World,
            FrameRef::World,
        );
        let p = FramedPoint::new(Vec3::new(0.3, 0.7, -1.1), FrameRef::World);
        let forward = t.transform_point(&p).unwrap();
        let back = t.inverse_transform_point(&forward).unwrap();
        assert_relative_eq!(back.coords, p.coords, epsilon = 1e-12);
    }

    #[test]
    fn test_vector_ignores_translation() {
        let t = Transform::new(
            Mat3::identity(),
            Vec3::new(5.0, 5.0, 5.0),
            FrameRef::World,
            FrameRef::World,
        );
        let v = FramedVector::new(Vec3::x(), FrameRef::World);
        let out = t.transform_vector(&v).unwrap();
        assert_relative_eq!(out.coords, Vec3::x(), epsilon = 1e-12);
    }

    #[test]
    fn test_compose_then_inverse_is_identity() {
        let t = Transform::new(
            axis_angle(&Vec3::new(0.2, -1.0, 0.4).normalize(), 1.1),
            Vec3::new(0.1, 0.2, 0.3),
            FrameRef::World,
            FrameRef::World,
        );
        let id = t.compose(&t.inverse()).unwrap();
        assert!(id
            .rel_equal(&Transform::identity(FrameRef::World), 1e-10)
            .unwrap());
    }
}
