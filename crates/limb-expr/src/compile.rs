//! Compiled evaluation of many expressions against an ordered input list.
//!
//! Symbols are resolved to input slots once, and every distinct `sin`/`cos`
//! argument is evaluated once per call and shared between all outputs. Build
//! once for a set of expressions, then call [`CompiledExprs::eval`] at as
//! many points as needed.

use std::collections::HashMap;

use crate::error::{ExprError, Result};
use crate::expr::{Angle, Atom, Expr, rational_to_f64};
use crate::symbol::Symbol;

#[derive(Debug, Clone, Copy)]
enum Factor {
    Input(usize),
    Sin(usize),
    Cos(usize),
}

#[derive(Debug, Clone)]
struct Term {
    coeff: f64,
    factors: Vec<(Factor, i32)>,
}

/// Evaluation plan for a list of expressions.
#[derive(Debug, Clone)]
pub struct CompiledExprs {
    num_inputs: usize,
    /// Distinct trig arguments as sparse (slot, coefficient) combinations.
    angles: Vec<Vec<(usize, f64)>>,
    outputs: Vec<Vec<Term>>,
}

impl CompiledExprs {
    /// Compile `exprs` with `inputs` giving the meaning of each input slot.
    ///
    /// Fails with [`ExprError::UnknownInput`] when an expression uses a
    /// symbol not listed in `inputs`.
    pub fn build(exprs: &[Expr], inputs: &[Symbol]) -> Result<Self> {
        let slots: HashMap<&Symbol, usize> =
            inputs.iter().enumerate().map(|(i, s)| (s, i)).collect();
        let slot_of = |s: &Symbol| {
            slots
                .get(s)
                .copied()
                .ok_or_else(|| ExprError::UnknownInput(s.to_string()))
        };

        let mut angle_index: HashMap<Angle, usize> = HashMap::new();
        let mut angles = Vec::new();
        let mut outputs = Vec::with_capacity(exprs.len());

        for expr in exprs {
            let mut terms = Vec::with_capacity(expr.num_terms());
            for (mono, c) in expr.terms() {
                let mut factors = Vec::new();
                for (atom, p) in mono.factors() {
                    let factor = match atom {
                        Atom::Symbol(s) => Factor::Input(slot_of(s)?),
                        Atom::Sin(a) | Atom::Cos(a) => {
                            let idx = match angle_index.get(a) {
                                Some(&idx) => idx,
                                None => {
                                    let plan = a
                                        .terms()
                                        .map(|(s, k)| -> Result<(usize, f64)> {
                                            Ok((slot_of(s)?, rational_to_f64(k)))
                                        })
                                        .collect::<Result<Vec<_>>>()?;
                                    angles.push(plan);
                                    angle_index.insert(a.clone(), angles.len() - 1);
                                    angles.len() - 1
                                }
                            };
                            if matches!(atom, Atom::Sin(_)) {
                                Factor::Sin(idx)
                            } else {
                                Factor::Cos(idx)
                            }
                        }
                    };
                    factors.push((factor, p as i32));
                }
                terms.push(Term {
                    coeff: rational_to_f64(c),
                    factors,
                });
            }
            outputs.push(terms);
        }

        Ok(Self {
            num_inputs: inputs.len(),
            angles,
            outputs,
        })
    }

    pub fn num_inputs(&self) -> usize {
        self.num_inputs
    }

    pub fn num_outputs(&self) -> usize {
        self.outputs.len()
    }

    /// Evaluate every expression at `inputs`, writing into `out`.
    pub fn eval(&self, inputs: &[f64], out: &mut [f64]) {
        assert_eq!(inputs.len(), self.num_inputs);
        assert_eq!(out.len(), self.outputs.len());

        let trig: Vec<(f64, f64)> = self
            .angles
            .iter()
            .map(|plan| plan.iter().map(|&(slot, k)| k * inputs[slot]).sum::<f64>().sin_cos())
            .collect();

        for (value, terms) in out.iter_mut().zip(&self.outputs) {
            *value = terms
                .iter()
                .map(|term| {
                    term.factors.iter().fold(term.coeff, |acc, &(factor, p)| {
                        let x = match factor {
                            Factor::Input(slot) => inputs[slot],
                            Factor::Sin(idx) => trig[idx].0,
                            Factor::Cos(idx) => trig[idx].1,
                        };
                        acc * x.powi(p)
                    })
                })
                .sum();
        }
    }

    /// Convenience wrapper returning a fresh vector.
    pub fn eval_vec(&self, inputs: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.outputs.len()];
        self.eval(inputs, &mut out);
        out
    }
}
