//! Frame-tagged rigid poses and transforms over a pose-tree arena.
//!
//! Every pose is expressed relative to a parent frame (or the world), and
//! every transform names the source and target frames it maps between, so
//! frame-consistency violations fail loudly instead of producing silently
//! wrong kinematics.

pub mod arena;
pub mod error;
pub mod pose;
pub mod transform;

pub use arena::{FrameArena, FrameId, FrameRef};
pub use error::{KinetError, Result};
pub use pose::{FramedPoint, FramedVector, Pose, ORTHONORMAL_TOL};
pub use transform::Transform;
