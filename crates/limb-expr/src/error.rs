//! Error types for limb-expr.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExprError {
    #[error("trigonometric argument is not a linear combination of symbols: {0}")]
    NonlinearAngle(String),

    #[error("no value bound for symbol {0}")]
    UnboundSymbol(String),

    #[error("symbol {0} is not among the compiled inputs")]
    UnknownInput(String),

    #[error("matrix shape mismatch: {0}")]
    ShapeMismatch(String),
}

pub type Result<T> = std::result::Result<T, ExprError>;
