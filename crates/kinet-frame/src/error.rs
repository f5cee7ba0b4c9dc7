//! Error types shared across the kinet crates.

use thiserror::Error;

/// Errors surfaced by frame, screw, and joint operations.
///
/// Frame and index errors are local-contract violations and are surfaced
/// immediately; silent continuation would propagate wrong kinematics.
#[derive(Debug, Error)]
pub enum KinetError {
    /// Operands declare different or incompatible reference frames.
    #[error("frame mismatch: {0}")]
    FrameMismatch(String),

    /// Out-of-range axis, coordinate, or frame handle.
    #[error("index {index} out of range for length {len}")]
    InvalidIndex { index: usize, len: usize },

    /// Dimension mismatch between a coordinate vector and a declared size.
    #[error("size mismatch: expected {expected}, got {got}")]
    SizeMismatch { expected: usize, got: usize },

    /// A required precondition does not hold (missing body references,
    /// stale derived state, non-orthonormal rotation, cyclic pose chain).
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// Too few axes are set to complete an orthonormal basis.
    #[error("axis assignment underdetermined")]
    Underdetermined,
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, KinetError>;
