//! Differentiation and substitution.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::expr::{Atom, Expr, Rational};
use crate::symbol::Symbol;

impl Expr {
    /// Apply the product rule with `d_atom` giving the derivative of each atom.
    fn derivative_by(&self, mut d_atom: impl FnMut(&Atom) -> Expr) -> Expr {
        let mut out = Expr::zero();
        for (mono, c) in self.terms() {
            for (atom, p) in mono.factors() {
                let da = d_atom(atom);
                if da.is_zero() {
                    continue;
                }
                let rest = mono.without(atom).with_factor(atom.clone(), p - 1);
                let lowered = Expr::from_monomial(rest, *c * Rational::from_integer(p as i64));
                out += lowered * da;
            }
        }
        out
    }

    /// Partial derivative with respect to `x`.
    ///
    /// `theta1` and `theta1'` are independent here; use [`Expr::dt`] for the
    /// total time derivative.
    pub fn diff(&self, x: &Symbol) -> Expr {
        self.derivative_by(|atom| match atom {
            Atom::Symbol(s) if s == x => Expr::one(),
            Atom::Symbol(_) => Expr::zero(),
            Atom::Sin(a) => Expr::cos_of(a).scale(a.coeff(x)),
            Atom::Cos(a) => -Expr::sin_of(a).scale(a.coeff(x)),
        })
    }

    /// Total time derivative. Constants are time invariant.
    pub fn dt(&self) -> Expr {
        self.derivative_by(|atom| match atom {
            Atom::Symbol(s) => s.diff_t().map(Expr::from).unwrap_or_default(),
            Atom::Sin(a) => Expr::cos_of(a) * a.dt(),
            Atom::Cos(a) => -(Expr::sin_of(a) * a.dt()),
        })
    }

    /// Replace symbols by expressions.
    ///
    /// Replacements that land inside a `sin`/`cos` argument must keep it
    /// linear.
    pub fn subs(&self, map: &BTreeMap<Symbol, Expr>) -> Result<Expr> {
        let mut out = Expr::zero();
        for (mono, c) in self.terms() {
            let mut term = Expr::from_rational(*c);
            for (atom, p) in mono.factors() {
                let value = match atom {
                    Atom::Symbol(s) => match map.get(s) {
                        Some(v) => v.clone(),
                        None => Expr::from(s),
                    },
                    Atom::Sin(a) => Expr::sin_of(&a.subs(map)?),
                    Atom::Cos(a) => Expr::cos_of(&a.subs(map)?),
                };
                term = term * value.pow(p);
            }
            out += term;
        }
        Ok(out)
    }

    /// Replace a single symbol.
    pub fn substitute(&self, symbol: &Symbol, value: &Expr) -> Result<Expr> {
        let mut map = BTreeMap::new();
        map.insert(symbol.clone(), value.clone());
        self.subs(&map)
    }
}
