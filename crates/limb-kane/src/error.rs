//! Error types for limb-kane.

use limb_expr::ExprError;
use limb_mech::MechError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum KaneError {
    #[error("expected {expected} {what}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("{0} must be a function of time")]
    NotDynamic(String),

    #[error("symbol {0} appears more than once among coordinates and speeds")]
    DuplicateSymbol(String),

    #[error("kinematic differential equation is not linear in q' with constant coefficients: {0}")]
    NonlinearKinematics(String),

    #[error("kinematic differential equations cannot be solved for q'")]
    SingularKinematics,

    #[error("Kane's equations have not been formed yet")]
    NotFormed,

    #[error("mass matrix is singular at the requested state")]
    SingularMassMatrix,

    #[error(transparent)]
    Mechanics(#[from] MechError),

    #[error(transparent)]
    Expr(#[from] ExprError),
}

pub type Result<T> = std::result::Result<T, KaneError>;
