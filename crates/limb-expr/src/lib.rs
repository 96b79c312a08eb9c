//! Symbolic scalar algebra for rigid multibody formulation.
//!
//! Expressions are kept fully expanded as sums of monomials with exact
//! rational coefficients. Monomials are products of symbols and of `sin`/`cos`
//! of linear combinations of symbols, which is every scalar that appears when
//! positions, velocities and accelerations of planar or spatial chains with
//! revolute joints are written out in an inertial frame.
//!
//! # Pieces
//!
//! - [`Symbol`]: constants and functions of time (with derivative order).
//! - [`Expr`]: the expression type with `+ - *`, [`Expr::diff`],
//!   [`Expr::dt`], [`Expr::subs`] and [`Expr::trigsimp`].
//! - [`Matrix`]: dense symbolic matrices.
//! - [`CompiledExprs`]: evaluation plans for repeated numeric evaluation.

pub mod compile;
pub mod error;
pub mod expr;
pub mod matrix;
pub mod symbol;

mod calculus;
mod trig;

pub use compile::CompiledExprs;
pub use error::{ExprError, Result};
pub use expr::{Angle, Atom, Bindings, Expr, Monomial, Rational};
pub use matrix::Matrix;
pub use symbol::{Symbol, SymbolKind, dynamic_range, dynamic_symbols, symbols};

use nalgebra as na;

/// Dynamic vector alias.
pub type DVec = na::DVector<f64>;
/// Dynamic matrix alias.
pub type DMat = na::DMatrix<f64>;
