//! Kinematic differential equations: solving for `q'` in terms of `u`.
//!
//! The equations are written as `K · q' + g(q, u, t) = 0`. `K` must be a
//! constant, non-singular rational matrix; it is inverted exactly so the
//! solution `q' = -K⁻¹ g` stays symbolic.

use std::collections::BTreeMap;

use limb_expr::{Expr, Rational, Symbol};
use num_traits::{One, Zero};

use crate::error::{KaneError, Result};

/// Solved kinematic differential equations.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicMap {
    qdot: Vec<Symbol>,
    solution: Vec<Expr>,
}

impl KinematicMap {
    /// Solve `kd_eqs` for the time derivatives of `coordinates`.
    pub fn solve(coordinates: &[Symbol], kd_eqs: &[Expr]) -> Result<Self> {
        let n = coordinates.len();
        if kd_eqs.len() != n {
            return Err(KaneError::DimensionMismatch {
                what: "kinematic differential equations",
                expected: n,
                found: kd_eqs.len(),
            });
        }

        let qdot = coordinates
            .iter()
            .map(|q| q.diff_t().ok_or_else(|| KaneError::NotDynamic(q.to_string())))
            .collect::<Result<Vec<_>>>()?;

        let mut k = vec![vec![Rational::zero(); n]; n];
        let mut rest = Vec::with_capacity(n);
        for (i, eq) in kd_eqs.iter().enumerate() {
            let mut remainder = eq.clone();
            for (j, qd) in qdot.iter().enumerate() {
                let coeff = eq
                    .diff(qd)
                    .as_rational()
                    .ok_or_else(|| KaneError::NonlinearKinematics(eq.to_string()))?;
                k[i][j] = coeff;
                remainder -= Expr::from(qd).scale(coeff);
            }
            rest.push(remainder);
        }

        let k_inv = invert(k).ok_or(KaneError::SingularKinematics)?;
        let solution = k_inv
            .iter()
            .map(|row| -row.iter().zip(&rest).map(|(c, g)| g.scale(*c)).sum::<Expr>())
            .collect();

        Ok(Self { qdot, solution })
    }

    /// The `q'` symbols, in coordinate order.
    pub fn qdot(&self) -> &[Symbol] {
        &self.qdot
    }

    /// `q'` as functions of `q`, `u` and `t`, in coordinate order.
    pub fn solution(&self) -> &[Expr] {
        &self.solution
    }

    /// Substitution map `q'_i -> solution_i`.
    pub fn as_map(&self) -> BTreeMap<Symbol, Expr> {
        self.qdot
            .iter()
            .cloned()
            .zip(self.solution.iter().cloned())
            .collect()
    }
}

/// Gauss-Jordan inversion over the rationals.
fn invert(mut a: Vec<Vec<Rational>>) -> Option<Vec<Vec<Rational>>> {
    let n = a.len();
    let mut inv: Vec<Vec<Rational>> = (0..n)
        .map(|i| {
            (0..n)
                .map(|j| if i == j { Rational::one() } else { Rational::zero() })
                .collect()
        })
        .collect();

    for col in 0..n {
        let pivot = (col..n).find(|&r| !a[r][col].is_zero())?;
        a.swap(col, pivot);
        inv.swap(col, pivot);

        let p = a[col][col];
        for j in 0..n {
            a[col][j] /= p;
            inv[col][j] /= p;
        }

        for r in 0..n {
            if r == col || a[r][col].is_zero() {
                continue;
            }
            let factor = a[r][col];
            for j in 0..n {
                let (ac, ic) = (a[col][j], inv[col][j]);
                a[r][j] -= factor * ac;
                inv[r][j] -= factor * ic;
            }
        }
    }
    Some(inv)
}
