//! Numeric evaluation of the first-order equations of motion.
//!
//! Inputs are laid out as `[x, r, p]`: the state `x = [q; u]`, the specified
//! inputs `r` (e.g. joint torques) and the constants `p`.

use limb_expr::{CompiledExprs, DMat, DVec, Symbol};
use tracing::debug;

use crate::error::{KaneError, Result};
use crate::kane::KanesMethod;

/// Compiled `mass_matrix_full` and `forcing_full`.
#[derive(Debug, Clone)]
pub struct OdeFunction {
    n_states: usize,
    n_specified: usize,
    n_constants: usize,
    mass_matrix: CompiledExprs,
    forcing: CompiledExprs,
}

impl OdeFunction {
    /// Compile the formed equations of `kane`.
    ///
    /// Every symbol in the equations must be a coordinate, a speed, one of
    /// `specified` or one of `constants`.
    pub fn build(kane: &KanesMethod, specified: &[Symbol], constants: &[Symbol]) -> Result<Self> {
        let mut inputs: Vec<Symbol> = kane.coordinates().to_vec();
        inputs.extend_from_slice(kane.speeds());
        let n_states = inputs.len();
        inputs.extend_from_slice(specified);
        inputs.extend_from_slice(constants);

        let mass_matrix = kane.mass_matrix_full()?;
        let mass_matrix = CompiledExprs::build(mass_matrix.as_slice(), &inputs)?;
        let forcing = CompiledExprs::build(&kane.forcing_full()?, &inputs)?;

        debug!(
            states = n_states,
            specified = specified.len(),
            constants = constants.len(),
            "compiled equations of motion"
        );

        Ok(Self {
            n_states,
            n_specified: specified.len(),
            n_constants: constants.len(),
            mass_matrix,
            forcing,
        })
    }

    pub fn num_states(&self) -> usize {
        self.n_states
    }

    fn inputs(&self, x: &[f64], r: &[f64], p: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.n_states, "state length");
        assert_eq!(r.len(), self.n_specified, "specified input length");
        assert_eq!(p.len(), self.n_constants, "constant length");
        let mut inputs = Vec::with_capacity(x.len() + r.len() + p.len());
        inputs.extend_from_slice(x);
        inputs.extend_from_slice(r);
        inputs.extend_from_slice(p);
        inputs
    }

    /// Numeric `mass_matrix_full`.
    pub fn mass_matrix(&self, x: &[f64], r: &[f64], p: &[f64]) -> DMat {
        let values = self.mass_matrix.eval_vec(&self.inputs(x, r, p));
        DMat::from_row_slice(self.n_states, self.n_states, &values)
    }

    /// Numeric `forcing_full`.
    pub fn forcing(&self, x: &[f64], r: &[f64], p: &[f64]) -> DVec {
        DVec::from_vec(self.forcing.eval_vec(&self.inputs(x, r, p)))
    }

    /// State derivative `x' = M⁻¹ f`.
    pub fn rhs(&self, x: &[f64], r: &[f64], p: &[f64]) -> Result<DVec> {
        let inputs = self.inputs(x, r, p);
        let values = self.mass_matrix.eval_vec(&inputs);
        let m = DMat::from_row_slice(self.n_states, self.n_states, &values);
        let f = DVec::from_vec(self.forcing.eval_vec(&inputs));
        m.lu().solve(&f).ok_or(KaneError::SingularMassMatrix)
    }
}
