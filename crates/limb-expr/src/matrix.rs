//! Dense symbolic matrices.

use std::fmt;
use std::ops::{Index, IndexMut};

use crate::DMat;
use crate::error::{ExprError, Result};
use crate::expr::{Bindings, Expr};

/// Row-major matrix of expressions.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<Expr>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![Expr::zero(); rows * cols],
        }
    }

    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = Expr::one();
        }
        m
    }

    /// Build from rows; all rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Expr>>) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
            return Err(ExprError::ShapeMismatch(format!(
                "row {bad} has {} entries, expected {ncols}",
                rows[bad].len()
            )));
        }
        Ok(Self {
            rows: nrows,
            cols: ncols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> Expr) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    /// Block-diagonal matrix `[[a, 0], [0, b]]`.
    pub fn block_diag(a: &Matrix, b: &Matrix) -> Self {
        let rows = a.rows + b.rows;
        let cols = a.cols + b.cols;
        Self::from_fn(rows, cols, |i, j| {
            if i < a.rows && j < a.cols {
                a[(i, j)].clone()
            } else if i >= a.rows && j >= a.cols {
                b[(i - a.rows, j - a.cols)].clone()
            } else {
                Expr::zero()
            }
        })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    /// Entries in row-major order.
    pub fn as_slice(&self) -> &[Expr] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[Expr] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    pub fn transpose(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |i, j| self[(j, i)].clone())
    }

    pub fn map(&self, f: impl FnMut(&Expr) -> Expr) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(f).collect(),
        }
    }

    pub fn trigsimp(&self) -> Self {
        self.map(Expr::trigsimp)
    }

    /// Symmetry up to trigonometric identities.
    pub fn is_symmetric(&self) -> bool {
        self.rows == self.cols
            && (0..self.rows).all(|i| {
                (i + 1..self.cols).all(|j| (&self[(i, j)] - &self[(j, i)]).trigsimp().is_zero())
            })
    }

    pub fn mul_vec(&self, v: &[Expr]) -> Result<Vec<Expr>> {
        if v.len() != self.cols {
            return Err(ExprError::ShapeMismatch(format!(
                "{}x{} matrix times vector of length {}",
                self.rows,
                self.cols,
                v.len()
            )));
        }
        Ok((0..self.rows)
            .map(|i| self.row(i).iter().zip(v).map(|(a, b)| a * b).sum())
            .collect())
    }

    pub fn evaluate(&self, env: &Bindings) -> Result<DMat> {
        let values = self
            .data
            .iter()
            .map(|e| e.evaluate(env))
            .collect::<Result<Vec<f64>>>()?;
        Ok(DMat::from_row_slice(self.rows, self.cols, &values))
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = Expr;

    fn index(&self, (i, j): (usize, usize)) -> &Expr {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &self.data[i * self.cols + j]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut Expr {
        assert!(i < self.rows && j < self.cols, "index ({i}, {j}) out of bounds");
        &mut self.data[i * self.cols + j]
    }
}

impl fmt::Display for Matrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.rows {
            write!(f, "[")?;
            for (j, e) in self.row(i).iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{e}")?;
            }
            writeln!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;
    use approx::assert_relative_eq;

    #[test]
    fn block_diagonal_layout() {
        let a = Matrix::identity(2);
        let m = Expr::from(Symbol::constant("m"));
        let b = Matrix::from_rows(vec![vec![m.clone()]]).unwrap();
        let d = Matrix::block_diag(&a, &b);
        assert_eq!(d.nrows(), 3);
        assert_eq!(d[(2, 2)], m);
        assert_eq!(d[(1, 1)], Expr::one());
        assert!(d[(0, 2)].is_zero());
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = Matrix::from_rows(vec![vec![Expr::one()], vec![]]).unwrap_err();
        assert!(matches!(err, ExprError::ShapeMismatch(_)));
    }

    #[test]
    fn symmetry_modulo_trig() {
        let q = Expr::from(Symbol::dynamic("q"));
        let s = q.sin().unwrap();
        let c = q.cos().unwrap();
        let lhs = s.pow(2) + c.pow(2);
        let m = Matrix::from_rows(vec![vec![Expr::one(), lhs], vec![Expr::one(), Expr::zero()]])
            .unwrap();
        assert!(m.is_symmetric());

        let skew = Matrix::from_rows(vec![
            vec![Expr::zero(), Expr::one()],
            vec![Expr::integer(2), Expr::zero()],
        ])
        .unwrap();
        assert!(!skew.is_symmetric());
        assert!(!Matrix::zeros(2, 3).is_symmetric());
    }

    #[test]
    fn numeric_evaluation_is_row_major() {
        let x = Symbol::constant("x");
        let ex = Expr::from(&x);
        let m = Matrix::from_rows(vec![
            vec![ex.clone(), Expr::integer(2)],
            vec![Expr::integer(3), ex.pow(2)],
        ])
        .unwrap();
        let mut env = Bindings::new();
        env.insert(x, 4.0);
        let n = m.evaluate(&env).unwrap();
        assert_relative_eq!(n[(0, 1)], 2.0);
        assert_relative_eq!(n[(1, 0)], 3.0);
        assert_relative_eq!(n[(1, 1)], 16.0);

        let v = m.mul_vec(&[Expr::one(), Expr::one()]).unwrap();
        assert_eq!(v[0], &ex + Expr::integer(2));
        assert!(m.mul_vec(&[Expr::one()]).is_err());
    }
}
