//! kinet — spatial algebra and joint kinematics for rigid-body mechanics.
//!
//! This is the umbrella crate re-exporting the core types from the
//! sub-crates:
//!
//! - [`kinet_frame`]: frame-tagged poses and transforms over a pose-tree
//!   arena.
//! - [`kinet_spatial`]: six-dimensional motion/force screws with the
//!   reciprocal (duality) product.
//! - [`kinet_joint`]: generalized-coordinate joint kinematics.
//! - [`kinet_math`]: the underlying math primitives.

pub use kinet_frame::{
    self, FrameArena, FrameId, FrameRef, FramedPoint, FramedVector, KinetError, Pose, Result,
    Transform,
};
pub use kinet_joint::{self, Joint, JointKind};
pub use kinet_math::{self, DVec, Mat3, Vec3};
pub use kinet_spatial::{self, Momentum, SpatialAxis, Twist, Wrench};
