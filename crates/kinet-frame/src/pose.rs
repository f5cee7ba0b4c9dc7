//! Rigid poses expressed relative to a parent frame.

use kinet_math::{rotation_angle, Mat3, Vec3};

use crate::arena::FrameRef;
use crate::error::{KinetError, Result};

/// Tolerance for the orthonormal-rotation invariant.
pub const ORTHONORMAL_TOL: f64 = 1e-8;

/// A rigid position + orientation expressed relative to a parent frame.
///
/// A point `p` expressed in this pose's frame maps into the parent frame as
/// `rot * p + x`. A pose whose parent is [`FrameRef::World`] is expressed
/// directly in the global frame; poses therefore form a forest rooted at
/// the world.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// Orientation of this frame, expressed in the parent frame.
    pub rot: Mat3,
    /// Origin of this frame, expressed in the parent frame.
    pub x: Vec3,
    /// The frame this pose is expressed relative to.
    pub parent: FrameRef,
}

impl Pose {
    /// Create a pose from a rotation and translation, trusting the caller
    /// to supply an orthonormal rotation. Use [`Pose::new_checked`] for
    /// untrusted input.
    pub fn new(rot: Mat3, x: Vec3, parent: FrameRef) -> Self {
        Self { rot, x, parent }
    }

    /// Create a pose, verifying that the rotation is orthonormal and
    /// right-handed within [`ORTHONORMAL_TOL`].
    pub fn new_checked(rot: Mat3, x: Vec3, parent: FrameRef) -> Result<Self> {
        let residual = (rot * rot.transpose() - Mat3::identity()).norm();
        if residual > ORTHONORMAL_TOL || rot.determinant() < 0.0 {
            return Err(KinetError::Precondition(format!(
                "rotation is not orthonormal (residual {residual:.3e})"
            )));
        }
        Ok(Self { rot, x, parent })
    }

    /// Identity pose relative to `parent`.
    pub fn identity(parent: FrameRef) -> Self {
        Self {
            rot: Mat3::identity(),
            x: Vec3::zeros(),
            parent,
        }
    }

    /// Pure-rotation pose.
    pub fn from_rotation(rot: Mat3, parent: FrameRef) -> Self {
        Self::new(rot, Vec3::zeros(), parent)
    }

    /// Pure-translation pose.
    pub fn from_translation(x: Vec3, parent: FrameRef) -> Self {
        Self::new(Mat3::identity(), x, parent)
    }

    /// Approximate equality within `tol`: rotations compared by angular
    /// distance, translations by Euclidean distance.
    ///
    /// Fails with [`KinetError::FrameMismatch`] when the poses are not
    /// expressed relative to the same parent; comparing across frames is
    /// meaningless without resolving both first.
    pub fn rel_equal(&self, other: &Pose, tol: f64) -> Result<bool> {
        if self.parent != other.parent {
            return Err(KinetError::FrameMismatch(format!(
                "cannot compare pose relative to {:?} with pose relative to {:?}",
                self.parent, other.parent
            )));
        }
        let dr = rotation_angle(&(self.rot.transpose() * other.rot));
        let dx = (self.x - other.x).norm();
        Ok(dr <= tol && dx <= tol)
    }
}

/// A point tagged with the frame its coordinates are expressed in.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FramedPoint {
    pub coords: Vec3,
    pub frame: FrameRef,
}

impl FramedPoint {
    /// Create a point; the frame is always required.
    pub fn new(coords: Vec3, frame: FrameRef) -> Self {
        Self { coords, frame }
    }
}

/// A free vector (direction, no position) tagged with its frame.
///
/// Free vectors rotate under frame changes but do not translate.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FramedVector {
    pub coords: Vec3,
    pub frame: FrameRef,
}

impl FramedVector {
    /// Create a vector; the frame is always required.
    pub fn new(coords: Vec3, frame: FrameRef) -> Self {
        Self { coords, frame }
    }
}
