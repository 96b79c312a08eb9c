//! Kane's method: equations of motion from frames, points, bodies and loads.
//!
//! Given generalized coordinates `q`, generalized speeds `u` and kinematic
//! differential equations linking them, [`KanesMethod::kanes_equations`]
//! forms the generalized active forces `Fr` and generalized inertia forces
//! `Fr*`, whose sum vanishes along every motion of the system. The mass
//! matrix and forcing vector follow from `Fr*` being linear in `u'`:
//!
//! ```text
//! mass_matrix_full · [q'; u'] = forcing_full
//! ```
//!
//! [`OdeFunction`] compiles those to fast numeric evaluation.

pub mod error;
pub mod kane;
pub mod kinematics;
pub mod ode;

pub use error::{KaneError, Result};
pub use kane::KanesMethod;
pub use kinematics::KinematicMap;
pub use ode::OdeFunction;
