//! limb: symbolic equations of motion for a three-link planar leg.
//!
//! This is the umbrella crate: it builds the leg model (lower leg, upper leg,
//! torso) on top of the sub-crates and re-exports them.
//!
//! ```no_run
//! use limb::{LegModel, LegParameters};
//!
//! let eqs = LegModel::new()?.derive()?;
//! let ode = eqs.ode_function()?;
//! let p = LegParameters::default().values();
//! let xdot = ode.rhs(&[0.1, -0.2, 0.05, 0.0, 0.0, 0.0], &[0.0; 3], &p)?;
//! # Ok::<(), limb::LimbError>(())
//! ```

pub mod error;
pub mod leg;
pub mod params;

pub use error::{LimbError, Result};
pub use leg::{LegEquations, LegFrames, LegModel, LegPoints, LegSymbols};
pub use params::LegParameters;

pub use limb_expr::{self, Expr, Matrix, Symbol};
pub use limb_kane::{self, KanesMethod, OdeFunction};
pub use limb_mech::{self, Mechanism};
