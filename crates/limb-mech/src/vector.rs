//! Vectors with components in one or more frames.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use limb_expr::{Expr, Symbol};

use crate::error::Result;
use crate::frame::{Axis, FrameId};

/// A vector stored as a sum of per-frame components.
///
/// Components in different frames are kept apart until the vector is
/// expressed in a single frame through [`crate::Mechanism::express`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vector {
    parts: BTreeMap<FrameId, [Expr; 3]>,
}

impl Vector {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn new(frame: FrameId, components: [Expr; 3]) -> Self {
        let mut v = Self::zero();
        v.add_part(frame, components);
        v
    }

    /// `magnitude` along one basis direction of `frame`.
    pub fn along(frame: FrameId, axis: Axis, magnitude: Expr) -> Self {
        let mut components: [Expr; 3] = Default::default();
        components[axis.index()] = magnitude;
        Self::new(frame, components)
    }

    pub fn parts(&self) -> impl Iterator<Item = (FrameId, &[Expr; 3])> {
        self.parts.iter().map(|(f, c)| (*f, c))
    }

    /// Components in `frame` as stored, without re-expressing other parts.
    pub fn part(&self, frame: FrameId) -> Option<&[Expr; 3]> {
        self.parts.get(&frame)
    }

    pub fn is_zero(&self) -> bool {
        self.parts.is_empty()
    }

    pub(crate) fn add_part(&mut self, frame: FrameId, components: [Expr; 3]) {
        let slot = self.parts.entry(frame).or_default();
        for (acc, c) in slot.iter_mut().zip(components) {
            *acc += c;
        }
        if slot.iter().all(Expr::is_zero) {
            self.parts.remove(&frame);
        }
    }

    pub fn map(&self, mut f: impl FnMut(&Expr) -> Expr) -> Self {
        let mut out = Self::zero();
        for (frame, c) in &self.parts {
            out.add_part(*frame, [f(&c[0]), f(&c[1]), f(&c[2])]);
        }
        out
    }

    pub fn try_map(&self, mut f: impl FnMut(&Expr) -> Result<Expr>) -> Result<Self> {
        let mut out = Self::zero();
        for (frame, c) in &self.parts {
            out.add_part(*frame, [f(&c[0])?, f(&c[1])?, f(&c[2])?]);
        }
        Ok(out)
    }

    pub fn scale(&self, k: &Expr) -> Self {
        self.map(|c| c * k)
    }

    /// Component-wise partial derivative.
    ///
    /// Frame orientation is held fixed, so this is the partial derivative
    /// only for symbols that do not orient any of the frames involved (for
    /// example generalized speeds).
    pub fn diff(&self, x: &Symbol) -> Self {
        self.map(|c| c.diff(x))
    }

    pub fn subs(&self, map: &BTreeMap<Symbol, Expr>) -> Result<Self> {
        self.try_map(|c| Ok(c.subs(map)?))
    }

    pub fn trigsimp(&self) -> Self {
        self.map(Expr::trigsimp)
    }
}

impl Add<&Vector> for &Vector {
    type Output = Vector;
    fn add(self, rhs: &Vector) -> Vector {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Add for Vector {
    type Output = Vector;
    fn add(mut self, rhs: Vector) -> Vector {
        self += rhs;
        self
    }
}

impl AddAssign<&Vector> for Vector {
    fn add_assign(&mut self, rhs: &Vector) {
        for (frame, c) in &rhs.parts {
            self.add_part(*frame, c.clone());
        }
    }
}

impl AddAssign for Vector {
    fn add_assign(&mut self, rhs: Vector) {
        for (frame, c) in rhs.parts {
            self.add_part(frame, c);
        }
    }
}

impl Neg for &Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        self.map(|c| -c)
    }
}

impl Neg for Vector {
    type Output = Vector;
    fn neg(self) -> Vector {
        -&self
    }
}

impl Sub<&Vector> for &Vector {
    type Output = Vector;
    fn sub(self, rhs: &Vector) -> Vector {
        self + &(-rhs)
    }
}

impl Sub for Vector {
    type Output = Vector;
    fn sub(self, rhs: Vector) -> Vector {
        &self - &rhs
    }
}

impl Mul<&Expr> for &Vector {
    type Output = Vector;
    fn mul(self, k: &Expr) -> Vector {
        self.scale(k)
    }
}

impl Mul<&Expr> for Vector {
    type Output = Vector;
    fn mul(self, k: &Expr) -> Vector {
        self.scale(k)
    }
}
