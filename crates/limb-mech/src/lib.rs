//! Mechanics primitives over symbolic scalars.
//!
//! A [`Mechanism`] owns reference frames and points. Frames form a tree of
//! simple rotations; points form a tree of position offsets. Vectors carry
//! components in any number of frames and are combined through the mechanism,
//! which knows the direction cosines between frames.

pub mod body;
pub mod error;
pub mod frame;
pub mod mechanism;
pub mod vector;

pub use body::{Body, Inertia, Load, Particle, RigidBody};
pub use error::{MechError, Result};
pub use frame::{Axis, FrameId, PointId};
pub use mechanism::Mechanism;
pub use vector::Vector;
