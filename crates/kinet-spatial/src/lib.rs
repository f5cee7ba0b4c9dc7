//! Six-dimensional spatial vector (screw) algebra with frame tags.
//!
//! Motion-type screws ([`SpatialAxis`], [`Twist`]) and force-type screws
//! ([`Wrench`], [`Momentum`]) pair through the reciprocal product; every
//! binary operation checks that both operands are expressed in one frame.

pub mod screw;

pub use screw::{Momentum, SpatialAxis, Twist, Wrench};
