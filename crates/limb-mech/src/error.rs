//! Error types for limb-mech.

use limb_expr::ExprError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MechError {
    #[error("frames {0} and {1} are not connected by orientations")]
    DisconnectedFrames(String, String),

    #[error("points {0} and {1} are not connected by positions")]
    DisconnectedPoints(String, String),

    #[error("angular velocity of {frame} can only be set relative to its parent {parent}")]
    NotAdjacent { frame: String, parent: String },

    #[error("velocity of point {point} in frame {frame} is undefined")]
    VelocityUndefined { point: String, frame: String },

    #[error("frame #{0} does not belong to this mechanism")]
    UnknownFrame(usize),

    #[error("point #{0} does not belong to this mechanism")]
    UnknownPoint(usize),

    #[error(transparent)]
    Expr(#[from] ExprError),
}

pub type Result<T> = std::result::Result<T, MechError>;
