//! Frame and point handles, rotation axes and direction cosines.

use limb_expr::Expr;

/// Handle to a reference frame inside a [`crate::Mechanism`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameId(pub(crate) usize);

impl FrameId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Handle to a point inside a [`crate::Mechanism`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub(crate) usize);

impl PointId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Basis direction of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Unit components `[1, 0, 0]` and friends.
    pub fn unit(self) -> [Expr; 3] {
        let mut out: [Expr; 3] = Default::default();
        out[self.index()] = Expr::one();
        out
    }
}

/// 3x3 matrix of expressions, row-major.
pub(crate) type Dcm = [[Expr; 3]; 3];

/// Direction cosines mapping child components to parent components for a
/// rotation of `angle` about `axis` (`v_parent = C v_child`).
pub(crate) fn simple_rotation(axis: Axis, c: &Expr, s: &Expr) -> Dcm {
    let zero = Expr::zero;
    let one = Expr::one;
    match axis {
        Axis::X => [
            [one(), zero(), zero()],
            [zero(), c.clone(), -s],
            [zero(), s.clone(), c.clone()],
        ],
        Axis::Y => [
            [c.clone(), zero(), s.clone()],
            [zero(), one(), zero()],
            [-s, zero(), c.clone()],
        ],
        Axis::Z => [
            [c.clone(), -s, zero()],
            [s.clone(), c.clone(), zero()],
            [zero(), zero(), one()],
        ],
    }
}

pub(crate) fn apply(m: &Dcm, v: &[Expr; 3]) -> [Expr; 3] {
    std::array::from_fn(|i| (0..3).map(|k| &m[i][k] * &v[k]).sum())
}

pub(crate) fn apply_transpose(m: &Dcm, v: &[Expr; 3]) -> [Expr; 3] {
    std::array::from_fn(|i| (0..3).map(|k| &m[k][i] * &v[k]).sum())
}
