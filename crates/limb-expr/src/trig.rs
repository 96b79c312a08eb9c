//! Trigonometric simplification by product-to-sum linearisation.
//!
//! Every product of `sin`/`cos` factors inside a monomial is rewritten with
//!
//! ```text
//! sin a sin b = (cos(a - b) - cos(a + b)) / 2
//! cos a cos b = (cos(a - b) + cos(a + b)) / 2
//! sin a cos b = (sin(a + b) + sin(a - b)) / 2
//! ```
//!
//! until each monomial carries at most one trig factor. `1`, `sin(a)` and
//! `cos(a)` over canonical angles are linearly independent, so the result is
//! a normal form: identities such as `sin²a + cos²a = 1` cancel exactly.

use num_traits::One;

use crate::expr::{Angle, Atom, Expr, Monomial, Rational};

#[derive(Debug, Clone)]
enum Harmonic {
    One,
    Sin(Angle),
    Cos(Angle),
}

impl Harmonic {
    fn to_expr(&self) -> Expr {
        match self {
            Harmonic::One => Expr::one(),
            Harmonic::Sin(a) => Expr::sin_of(a),
            Harmonic::Cos(a) => Expr::cos_of(a),
        }
    }
}

/// Multiply a linearised harmonic by one more trig atom.
fn product(lhs: &Harmonic, rhs: &Atom) -> Vec<(Rational, Harmonic)> {
    let half = Rational::new(1, 2);
    match (lhs, rhs) {
        (_, Atom::Symbol(_)) => unreachable!("symbols are split off before linearisation"),
        (Harmonic::One, Atom::Sin(b)) => vec![(Rational::one(), Harmonic::Sin(b.clone()))],
        (Harmonic::One, Atom::Cos(b)) => vec![(Rational::one(), Harmonic::Cos(b.clone()))],
        (Harmonic::Sin(a), Atom::Sin(b)) => vec![
            (half, Harmonic::Cos(a.minus(b))),
            (-half, Harmonic::Cos(a.plus(b))),
        ],
        (Harmonic::Cos(a), Atom::Cos(b)) => vec![
            (half, Harmonic::Cos(a.minus(b))),
            (half, Harmonic::Cos(a.plus(b))),
        ],
        (Harmonic::Sin(a), Atom::Cos(b)) => vec![
            (half, Harmonic::Sin(a.plus(b))),
            (half, Harmonic::Sin(a.minus(b))),
        ],
        (Harmonic::Cos(a), Atom::Sin(b)) => vec![
            (half, Harmonic::Sin(a.plus(b))),
            (-half, Harmonic::Sin(a.minus(b))),
        ],
    }
}

impl Expr {
    /// Trigonometric simplification.
    ///
    /// Returns the linearised normal form; idempotent.
    pub fn trigsimp(&self) -> Expr {
        let mut out = Expr::zero();
        for (mono, c) in self.terms() {
            let mut plain = Monomial::one();
            let mut trig: Vec<&Atom> = Vec::new();
            for (atom, p) in mono.factors() {
                if atom.is_trig() {
                    trig.extend(std::iter::repeat_n(atom, p as usize));
                } else {
                    plain = plain.with_factor(atom.clone(), p);
                }
            }

            if trig.len() < 2 {
                out.add_term(mono.clone(), *c);
                continue;
            }

            let mut acc = vec![(Rational::one(), Harmonic::One)];
            for atom in trig {
                let mut next = Vec::with_capacity(acc.len() * 2);
                for (k, h) in &acc {
                    for (k2, h2) in product(h, atom) {
                        next.push((*k * k2, h2));
                    }
                }
                acc = next;
            }

            let base = Expr::from_monomial(plain, *c);
            for (k, h) in acc {
                out += base.scale(k) * h.to_expr();
            }
        }
        out
    }
}
