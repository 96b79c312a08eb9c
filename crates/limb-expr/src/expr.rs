//! Expanded symbolic expressions.
//!
//! An [`Expr`] is a map from [`Monomial`] to an exact rational coefficient.
//! Zero coefficients are never stored, so the empty map is zero and two
//! expressions built in different orders compare equal once expanded.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use num_rational::Rational64;
use num_traits::{One, Signed, Zero};

use crate::error::{ExprError, Result};
use crate::symbol::Symbol;

/// Exact coefficient type.
pub type Rational = Rational64;

/// Numeric values for symbols, used by [`Expr::evaluate`].
pub type Bindings = HashMap<Symbol, f64>;

pub(crate) fn rational_to_f64(c: &Rational) -> f64 {
    *c.numer() as f64 / *c.denom() as f64
}

fn fmt_rational(c: &Rational) -> String {
    if c.is_integer() {
        c.numer().to_string()
    } else {
        format!("{}/{}", c.numer(), c.denom())
    }
}

// ---------------------------------------------------------------------------
// Angle
// ---------------------------------------------------------------------------

/// Linear combination of symbols: the argument of `sin` and `cos`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Angle {
    terms: BTreeMap<Symbol, Rational>,
}

impl Angle {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn from_symbol(symbol: Symbol) -> Self {
        let mut angle = Self::zero();
        angle.add_term(symbol, Rational::one());
        angle
    }

    /// Interpret an expression as an angle.
    ///
    /// Every monomial must be a single symbol to the first power.
    pub fn from_expr(expr: &Expr) -> Result<Self> {
        let mut angle = Self::zero();
        for (mono, c) in expr.terms() {
            match mono.single_symbol() {
                Some(symbol) => angle.add_term(symbol.clone(), *c),
                None => return Err(ExprError::NonlinearAngle(expr.to_string())),
            }
        }
        Ok(angle)
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Coefficient of `symbol` (zero when absent).
    pub fn coeff(&self, symbol: &Symbol) -> Rational {
        self.terms.get(symbol).copied().unwrap_or_else(Rational::zero)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.terms.contains_key(symbol)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Symbol, &Rational)> {
        self.terms.iter()
    }

    fn add_term(&mut self, symbol: Symbol, coeff: Rational) {
        if coeff.is_zero() {
            return;
        }
        match self.terms.entry(symbol) {
            Entry::Vacant(slot) => {
                slot.insert(coeff);
            }
            Entry::Occupied(mut slot) => {
                let sum = *slot.get() + coeff;
                if sum.is_zero() {
                    slot.remove();
                } else {
                    *slot.get_mut() = sum;
                }
            }
        }
    }

    pub fn plus(&self, other: &Angle) -> Angle {
        let mut out = self.clone();
        for (s, c) in &other.terms {
            out.add_term(s.clone(), *c);
        }
        out
    }

    pub fn minus(&self, other: &Angle) -> Angle {
        let mut out = self.clone();
        for (s, c) in &other.terms {
            out.add_term(s.clone(), -*c);
        }
        out
    }

    pub fn scaled(&self, k: Rational) -> Angle {
        if k.is_zero() {
            return Angle::zero();
        }
        Angle {
            terms: self.terms.iter().map(|(s, c)| (s.clone(), *c * k)).collect(),
        }
    }

    /// Flip the sign so the leading coefficient is positive.
    /// Returns the flipped angle and whether a flip happened.
    pub(crate) fn canonical(self) -> (Angle, bool) {
        let negative = self
            .terms
            .values()
            .next()
            .is_some_and(|c| c.is_negative());
        if negative {
            (self.scaled(-Rational::one()), true)
        } else {
            (self, false)
        }
    }

    pub fn to_expr(&self) -> Expr {
        let mut out = Expr::zero();
        for (s, c) in &self.terms {
            out.add_term(Monomial::from_atom(Atom::Symbol(s.clone())), *c);
        }
        out
    }

    /// Time derivative of the angle.
    pub fn dt(&self) -> Expr {
        let mut out = Expr::zero();
        for (s, c) in &self.terms {
            if let Some(sd) = s.diff_t() {
                out.add_term(Monomial::from_atom(Atom::Symbol(sd)), *c);
            }
        }
        out
    }

    pub(crate) fn subs(&self, map: &BTreeMap<Symbol, Expr>) -> Result<Angle> {
        if !self.terms.keys().any(|s| map.contains_key(s)) {
            return Ok(self.clone());
        }
        let mut replaced = Expr::zero();
        for (s, c) in &self.terms {
            let value = match map.get(s) {
                Some(v) => v.clone(),
                None => Expr::from(s),
            };
            replaced += value.scale(*c);
        }
        Angle::from_expr(&replaced)
    }

    pub fn evaluate(&self, env: &Bindings) -> Result<f64> {
        self.terms.iter().try_fold(0.0, |acc, (s, c)| {
            let value = env
                .get(s)
                .ok_or_else(|| ExprError::UnboundSymbol(s.to_string()))?;
            Ok(acc + rational_to_f64(c) * value)
        })
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (s, c)) in self.terms.iter().enumerate() {
            let negative = c.is_negative();
            if i == 0 {
                if negative {
                    write!(f, "-")?;
                }
            } else {
                write!(f, "{}", if negative { " - " } else { " + " })?;
            }
            let mag = c.abs();
            if mag.is_one() {
                write!(f, "{s}")?;
            } else {
                write!(f, "{}*{s}", fmt_rational(&mag))?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Atom / Monomial
// ---------------------------------------------------------------------------

/// An indivisible factor of a monomial.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Atom {
    Symbol(Symbol),
    Sin(Angle),
    Cos(Angle),
}

impl Atom {
    pub fn is_trig(&self) -> bool {
        !matches!(self, Atom::Symbol(_))
    }

    pub fn evaluate(&self, env: &Bindings) -> Result<f64> {
        match self {
            Atom::Symbol(s) => env
                .get(s)
                .copied()
                .ok_or_else(|| ExprError::UnboundSymbol(s.to_string())),
            Atom::Sin(a) => Ok(a.evaluate(env)?.sin()),
            Atom::Cos(a) => Ok(a.evaluate(env)?.cos()),
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Symbol(s) => write!(f, "{s}"),
            Atom::Sin(a) => write!(f, "sin({a})"),
            Atom::Cos(a) => write!(f, "cos({a})"),
        }
    }
}

/// Product of atoms raised to positive integer powers.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Monomial(BTreeMap<Atom, u32>);

impl Monomial {
    /// The empty product.
    pub fn one() -> Self {
        Self::default()
    }

    pub fn from_atom(atom: Atom) -> Self {
        let mut factors = BTreeMap::new();
        factors.insert(atom, 1);
        Self(factors)
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn factors(&self) -> impl Iterator<Item = (&Atom, u32)> {
        self.0.iter().map(|(a, p)| (a, *p))
    }

    pub fn power_of(&self, atom: &Atom) -> u32 {
        self.0.get(atom).copied().unwrap_or(0)
    }

    pub fn times(&self, other: &Monomial) -> Monomial {
        let mut out = self.0.clone();
        for (atom, p) in &other.0 {
            *out.entry(atom.clone()).or_insert(0) += p;
        }
        Monomial(out)
    }

    /// Multiply by `atom^power`.
    pub(crate) fn with_factor(mut self, atom: Atom, power: u32) -> Monomial {
        if power > 0 {
            *self.0.entry(atom).or_insert(0) += power;
        }
        self
    }

    /// The monomial with `atom` removed entirely.
    pub(crate) fn without(&self, atom: &Atom) -> Monomial {
        let mut out = self.0.clone();
        out.remove(atom);
        Monomial(out)
    }

    fn single_symbol(&self) -> Option<&Symbol> {
        let mut factors = self.0.iter();
        match (factors.next(), factors.next()) {
            (Some((Atom::Symbol(s), 1)), None) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (atom, p)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            if *p == 1 {
                write!(f, "{atom}")?;
            } else {
                write!(f, "{atom}^{p}")?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Expr
// ---------------------------------------------------------------------------

/// Expanded sum of monomials with rational coefficients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Expr {
    terms: BTreeMap<Monomial, Rational>,
}

impl Expr {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::from_rational(Rational::one())
    }

    pub fn integer(n: i64) -> Self {
        Self::from_rational(Rational::from_integer(n))
    }

    /// `numer / denom`.
    ///
    /// # Panics
    ///
    /// If `denom` is zero.
    pub fn rational(numer: i64, denom: i64) -> Self {
        Self::from_rational(Rational::new(numer, denom))
    }

    pub fn from_rational(c: Rational) -> Self {
        Self::from_monomial(Monomial::one(), c)
    }

    pub fn from_monomial(mono: Monomial, c: Rational) -> Self {
        let mut out = Self::zero();
        out.add_term(mono, c);
        out
    }

    /// `sin(angle)` with the sign folded into the coefficient.
    pub fn sin_of(angle: &Angle) -> Self {
        if angle.is_zero() {
            return Self::zero();
        }
        let (canonical, flipped) = angle.clone().canonical();
        let sign = if flipped {
            -Rational::one()
        } else {
            Rational::one()
        };
        Self::from_monomial(Monomial::from_atom(Atom::Sin(canonical)), sign)
    }

    /// `cos(angle)`; cosine is even so the sign is dropped.
    pub fn cos_of(angle: &Angle) -> Self {
        if angle.is_zero() {
            return Self::one();
        }
        let (canonical, _) = angle.clone().canonical();
        Self::from_monomial(Monomial::from_atom(Atom::Cos(canonical)), Rational::one())
    }

    /// Sine of this expression, which must be linear in its symbols.
    pub fn sin(&self) -> Result<Self> {
        Ok(Self::sin_of(&Angle::from_expr(self)?))
    }

    /// Cosine of this expression, which must be linear in its symbols.
    pub fn cos(&self) -> Result<Self> {
        Ok(Self::cos_of(&Angle::from_expr(self)?))
    }

    pub(crate) fn add_term(&mut self, mono: Monomial, coeff: Rational) {
        if coeff.is_zero() {
            return;
        }
        match self.terms.entry(mono) {
            Entry::Vacant(slot) => {
                slot.insert(coeff);
            }
            Entry::Occupied(mut slot) => {
                let sum = *slot.get() + coeff;
                if sum.is_zero() {
                    slot.remove();
                } else {
                    *slot.get_mut() = sum;
                }
            }
        }
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &Rational)> {
        self.terms.iter()
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// The value of a constant expression.
    pub fn as_rational(&self) -> Option<Rational> {
        let mut terms = self.terms.iter();
        match (terms.next(), terms.next()) {
            (None, _) => Some(Rational::zero()),
            (Some((mono, c)), None) if mono.is_one() => Some(*c),
            _ => None,
        }
    }

    pub fn scale(&self, k: Rational) -> Self {
        if k.is_zero() {
            return Self::zero();
        }
        Self {
            terms: self.terms.iter().map(|(m, c)| (m.clone(), *c * k)).collect(),
        }
    }

    pub fn pow(&self, n: u32) -> Self {
        let mut out = Self::one();
        for _ in 0..n {
            out = &out * self;
        }
        out
    }

    /// Every symbol in the expression, including those inside trig arguments.
    pub fn free_symbols(&self) -> BTreeSet<Symbol> {
        let mut out = BTreeSet::new();
        for mono in self.terms.keys() {
            for (atom, _) in mono.factors() {
                match atom {
                    Atom::Symbol(s) => {
                        out.insert(s.clone());
                    }
                    Atom::Sin(a) | Atom::Cos(a) => {
                        out.extend(a.terms().map(|(s, _)| s.clone()));
                    }
                }
            }
        }
        out
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.terms.keys().any(|mono| {
            mono.factors().any(|(atom, _)| match atom {
                Atom::Symbol(s) => s == symbol,
                Atom::Sin(a) | Atom::Cos(a) => a.contains(symbol),
            })
        })
    }

    pub fn evaluate(&self, env: &Bindings) -> Result<f64> {
        let mut total = 0.0;
        for (mono, c) in &self.terms {
            let mut value = rational_to_f64(c);
            for (atom, p) in mono.factors() {
                value *= atom.evaluate(env)?.powi(p as i32);
            }
            total += value;
        }
        Ok(total)
    }
}

impl From<Symbol> for Expr {
    fn from(symbol: Symbol) -> Self {
        Self::from_monomial(Monomial::from_atom(Atom::Symbol(symbol)), Rational::one())
    }
}

impl From<&Symbol> for Expr {
    fn from(symbol: &Symbol) -> Self {
        Self::from(symbol.clone())
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Self::integer(n)
    }
}

impl From<Rational> for Expr {
    fn from(c: Rational) -> Self {
        Self::from_rational(c)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.terms.is_empty() {
            return write!(f, "0");
        }
        for (i, (mono, c)) in self.terms.iter().enumerate() {
            let negative = c.is_negative();
            if i == 0 {
                if negative {
                    write!(f, "-")?;
                }
            } else {
                write!(f, "{}", if negative { " - " } else { " + " })?;
            }
            let mag = c.abs();
            if mono.is_one() {
                write!(f, "{}", fmt_rational(&mag))?;
            } else if mag.is_one() {
                write!(f, "{mono}")?;
            } else {
                write!(f, "{}*{mono}", fmt_rational(&mag))?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

fn add_exprs(lhs: &Expr, rhs: &Expr) -> Expr {
    let mut out = lhs.clone();
    for (m, c) in &rhs.terms {
        out.add_term(m.clone(), *c);
    }
    out
}

fn sub_exprs(lhs: &Expr, rhs: &Expr) -> Expr {
    let mut out = lhs.clone();
    for (m, c) in &rhs.terms {
        out.add_term(m.clone(), -*c);
    }
    out
}

fn mul_exprs(lhs: &Expr, rhs: &Expr) -> Expr {
    let mut out = Expr::zero();
    for (ml, cl) in &lhs.terms {
        for (mr, cr) in &rhs.terms {
            out.add_term(ml.times(mr), *cl * *cr);
        }
    }
    out
}

macro_rules! forward_binop {
    ($trait:ident, $method:ident, $imp:ident) => {
        impl $trait<&Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $imp(self, rhs)
            }
        }

        impl $trait<Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $imp(&self, &rhs)
            }
        }

        impl $trait<&Expr> for Expr {
            type Output = Expr;
            fn $method(self, rhs: &Expr) -> Expr {
                $imp(&self, rhs)
            }
        }

        impl $trait<Expr> for &Expr {
            type Output = Expr;
            fn $method(self, rhs: Expr) -> Expr {
                $imp(self, &rhs)
            }
        }
    };
}

forward_binop!(Add, add, add_exprs);
forward_binop!(Sub, sub, sub_exprs);
forward_binop!(Mul, mul, mul_exprs);

impl AddAssign<&Expr> for Expr {
    fn add_assign(&mut self, rhs: &Expr) {
        for (m, c) in &rhs.terms {
            self.add_term(m.clone(), *c);
        }
    }
}

impl AddAssign<Expr> for Expr {
    fn add_assign(&mut self, rhs: Expr) {
        for (m, c) in rhs.terms {
            self.add_term(m, c);
        }
    }
}

impl SubAssign<&Expr> for Expr {
    fn sub_assign(&mut self, rhs: &Expr) {
        for (m, c) in &rhs.terms {
            self.add_term(m.clone(), -*c);
        }
    }
}

impl SubAssign<Expr> for Expr {
    fn sub_assign(&mut self, rhs: Expr) {
        for (m, c) in rhs.terms {
            self.add_term(m, -c);
        }
    }
}

impl Neg for Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.scale(-Rational::one())
    }
}

impl Neg for &Expr {
    type Output = Expr;
    fn neg(self) -> Expr {
        self.scale(-Rational::one())
    }
}

impl Sum for Expr {
    fn sum<I: Iterator<Item = Expr>>(iter: I) -> Expr {
        iter.fold(Expr::zero(), |mut acc, e| {
            acc += e;
            acc
        })
    }
}

impl<'a> Sum<&'a Expr> for Expr {
    fn sum<I: Iterator<Item = &'a Expr>>(iter: I) -> Expr {
        iter.fold(Expr::zero(), |mut acc, e| {
            acc += e;
            acc
        })
    }
}
