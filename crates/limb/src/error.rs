//! Error types for limb.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LimbError {
    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Kane(#[from] limb_kane::KaneError),

    #[error(transparent)]
    Mechanics(#[from] limb_mech::MechError),

    #[error(transparent)]
    Expr(#[from] limb_expr::ExprError),
}

pub type Result<T> = std::result::Result<T, LimbError>;
