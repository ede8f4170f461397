//! Private Module

use super::{solve, Vector};
use crate::error::LinalgError;
use approx::AbsDiffEq;
use ndarray::prelude::*;
use ndarray::NdFloat; // includes LinalgScalar and ScalarOperand
use num_traits::Float;
use std::fmt;

/// Dense real matrix
///
/// Shape-sensitive operations fail with [`LinalgError::ShapeMismatch`]
/// and square-only ones with [`LinalgError::NotSquare`]. Like
/// [`Vector`], a matrix is a value: every operation returns a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<A = f64> {
    data: Array2<A>,
}

impl<A: NdFloat> Matrix<A> {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// The `n x n` identity matrix
    pub fn identity(n: usize) -> Self {
        Self {
            data: Array2::eye(n),
        }
    }

    /// Build from a list of rows, all rows must have the same length
    pub fn from_rows(rows: Vec<Vec<A>>) -> Result<Self, LinalgError> {
        let cols = rows.first().map_or(0, Vec::len);
        let mut data = Array2::zeros((rows.len(), cols));
        for (i, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(LinalgError::RaggedRows {
                    row: i,
                    expected: cols,
                    found: row.len(),
                });
            }
            data.row_mut(i).assign(&ArrayView1::from(&row[..]));
        }
        Ok(Self { data })
    }

    /// A `1 x n` matrix holding `v` as its only row
    pub fn row_vector(v: &Vector<A>) -> Self {
        Self::from(v.view().insert_axis(Axis(0)).to_owned())
    }

    /// An `n x 1` matrix holding `v` as its only column
    pub fn column_vector(v: &Vector<A>) -> Self {
        Self::from(v.view().insert_axis(Axis(1)).to_owned())
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows(), self.cols())
    }

    pub fn is_square(&self) -> bool {
        self.rows() == self.cols()
    }

    pub fn get(&self, row: usize, col: usize) -> Option<A> {
        self.data.get((row, col)).copied()
    }

    pub fn row(&self, index: usize) -> Option<Vector<A>> {
        if index < self.rows() {
            Some(Vector::from(self.data.row(index).to_owned()))
        } else {
            None
        }
    }

    pub fn column(&self, index: usize) -> Option<Vector<A>> {
        if index < self.cols() {
            Some(Vector::from(self.data.column(index).to_owned()))
        } else {
            None
        }
    }

    pub fn view(&self) -> ArrayView2<'_, A> {
        self.data.view()
    }

    pub fn into_array(self) -> Array2<A> {
        self.data
    }

    fn check_same_shape(&self, other: &Self) -> Result<(), LinalgError> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(LinalgError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            })
        }
    }

    pub(crate) fn check_square(&self) -> Result<usize, LinalgError> {
        if self.is_square() {
            Ok(self.rows())
        } else {
            Err(LinalgError::NotSquare {
                rows: self.rows(),
                cols: self.cols(),
            })
        }
    }

    pub fn add(&self, other: &Self) -> Result<Self, LinalgError> {
        self.check_same_shape(other)?;
        Ok(Self::from(&self.data + &other.data))
    }

    pub fn sub(&self, other: &Self) -> Result<Self, LinalgError> {
        self.check_same_shape(other)?;
        Ok(Self::from(&self.data - &other.data))
    }

    pub fn scale(&self, k: A) -> Self {
        Self::from(&self.data * k)
    }

    /// Matrix product `self * other`
    pub fn multiply(&self, other: &Self) -> Result<Self, LinalgError> {
        if self.cols() != other.rows() {
            return Err(LinalgError::ShapeMismatch {
                left: self.shape(),
                right: other.shape(),
            });
        }
        Ok(Self::from(self.data.dot(&other.data)))
    }

    /// Matrix-vector product `self * v`
    pub fn multiply_vector(&self, v: &Vector<A>) -> Result<Vector<A>, LinalgError> {
        if self.cols() != v.dimension() {
            return Err(LinalgError::DimensionMismatch {
                expected: self.cols(),
                found: v.dimension(),
            });
        }
        Ok(Vector::from(self.data.dot(&v.view())))
    }

    pub fn transpose(&self) -> Self {
        Self::from(self.data.t().to_owned())
    }

    /// Copy of `self` without the listed rows
    pub fn remove_rows(&self, indices: &[usize]) -> Result<Self, LinalgError> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.rows()) {
            return Err(LinalgError::IndexOutOfBounds {
                index,
                dimension: self.rows(),
            });
        }
        let kept: Vec<usize> = (0..self.rows()).filter(|i| !indices.contains(i)).collect();
        Ok(Self::from(self.data.select(Axis(0), &kept)))
    }

    /// First row whose diagonal entry is smaller in magnitude than the
    /// sum of the other entries of the row
    pub(crate) fn dominance_violation(&self) -> Option<usize> {
        self.data.outer_iter().enumerate().find_map(|(i, row)| {
            let diagonal = Float::abs(row.get(i).copied().unwrap_or_else(A::zero));
            let others = row
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .fold(A::zero(), |acc, (_, &v)| acc + Float::abs(v));
            if diagonal < others {
                Some(i)
            } else {
                None
            }
        })
    }

    /// Whether $`|a_{ii}| \geq \sum_{j \neq i} |a_{ij}|`$ holds in every row
    pub fn is_diagonally_dominant(&self) -> bool {
        self.is_square() && self.dominance_violation().is_none()
    }

    /// Upper-triangular form by forward elimination without pivoting
    ///
    /// Works row-wise on any matrix with at least as many columns as rows,
    /// so an augmented system `[A | b]` can be reduced in place of `A`.
    pub fn triangular(&self) -> Result<Self, LinalgError> {
        let mut data = self.data.clone();
        let pivots = self.rows().min(self.cols());
        for k in 0..pivots {
            let pivot = data[[k, k]];
            if k + 1 < self.rows() && pivot == A::zero() {
                return Err(LinalgError::ZeroPivot { row: k });
            }
            let pivot_row = data.row(k).to_owned();
            for i in (k + 1)..self.rows() {
                let factor = data[[i, k]] / pivot;
                if factor != A::zero() {
                    data.row_mut(i).scaled_add(-factor, &pivot_row);
                }
            }
        }
        Ok(Self { data })
    }

    /// Doolittle LU factorization
    ///
    /// Returns `(L, U)` with `L` unit lower-triangular and `U`
    /// upper-triangular such that `self = L U`. No pivoting is done, so a
    /// zero leading minor fails with [`LinalgError::ZeroPivot`].
    ///
    /// ```math
    /// \begin{aligned}
    /// u_{ik} &= a_{ik} - \sum_{j<i} l_{ij} u_{jk}, \quad k \geq i \\
    /// l_{ki} &= \Big(a_{ki} - \sum_{j<i} l_{kj} u_{ji}\Big) / u_{ii}, \quad k > i
    /// \end{aligned}
    /// ```
    pub fn lu(&self) -> Result<(Self, Self), LinalgError> {
        let n = self.check_square()?;
        let a = &self.data;
        let mut l = Array2::<A>::eye(n);
        let mut u = Array2::<A>::zeros((n, n));
        for i in 0..n {
            for k in i..n {
                let sum = (0..i).fold(A::zero(), |acc, j| acc + l[[i, j]] * u[[j, k]]);
                u[[i, k]] = a[[i, k]] - sum;
            }
            if i + 1 < n && u[[i, i]] == A::zero() {
                return Err(LinalgError::ZeroPivot { row: i });
            }
            for k in (i + 1)..n {
                let sum = (0..i).fold(A::zero(), |acc, j| acc + l[[k, j]] * u[[j, i]]);
                l[[k, i]] = (a[[k, i]] - sum) / u[[i, i]];
            }
        }
        Ok((Self::from(l), Self::from(u)))
    }

    /// The inverse matrix, see [`solve::invert`]
    pub fn inverse(&self) -> Result<Self, LinalgError> {
        solve::invert(self)
    }
}

impl<A> From<Array2<A>> for Matrix<A> {
    fn from(data: Array2<A>) -> Self {
        Self { data }
    }
}

impl<A: NdFloat> fmt::Display for Matrix<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.data)
    }
}

impl<A> AbsDiffEq for Matrix<A>
where
    A: NdFloat + AbsDiffEq<Epsilon = A>,
{
    type Epsilon = A;

    fn default_epsilon() -> A {
        A::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: A) -> bool {
        self.data.abs_diff_eq(&other.data, epsilon)
    }
}
