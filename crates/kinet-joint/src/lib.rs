//! Joint kinematic models mapping generalized coordinates to relative
//! spatial motion between two bodies.
//!
//! A joint owns a small set of unit axes in its own frame; from the
//! current generalized coordinates it derives the per-DOF spatial axes
//! (Jacobian columns), their time derivatives, and the induced relative
//! pose. Axis directions for the higher DOFs chain through the elementary
//! rotations of the lower-indexed coordinates, which is the crux of
//! ball-type joints.

pub mod joint;

pub use joint::{Joint, JointKind, SINGULAR_TOL};
