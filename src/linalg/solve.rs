//! Linear system solvers and matrix inversion

use super::{Matrix, Vector};
use crate::error::LinalgError;
use ndarray::prelude::*;
use ndarray::NdFloat;
use num_traits::Float;
use tracing::trace;

/// Gauss elimination: direct solve of `A x = b`
///
/// The augmented system `[A | b]` is reduced to upper-triangular form by
/// forward elimination (no pivoting), then solved by back-substitution
/// ```math
/// x_i = \Big(b_i - \sum_{j>i} a_{ij} x_j\Big) / a_{ii}
/// ```
/// A zero pivot fails with [`LinalgError::ZeroPivot`].
pub fn solve_triangular<A: NdFloat>(
    a: &Matrix<A>,
    b: &Vector<A>,
) -> Result<Vector<A>, LinalgError> {
    let n = a.check_square()?;
    if b.dimension() != n {
        return Err(LinalgError::DimensionMismatch {
            expected: n,
            found: b.dimension(),
        });
    }

    let mut augmented = Array2::zeros((n, n + 1));
    augmented.slice_mut(s![.., ..n]).assign(&a.view());
    augmented.column_mut(n).assign(&b.view());
    let reduced = Matrix::from(augmented).triangular()?.into_array();

    let mut x = Array1::<A>::zeros(n);
    for i in (0..n).rev() {
        let pivot = reduced[[i, i]];
        if pivot == A::zero() {
            return Err(LinalgError::ZeroPivot { row: i });
        }
        let tail = reduced.slice(s![i, (i + 1)..n]).dot(&x.slice(s![(i + 1)..]));
        x[i] = (reduced[[i, n]] - tail) / pivot;
    }
    Ok(Vector::from(x))
}

/// Gauss-Seidel iteration for `A x = b`
///
/// Starts from $`x_i = b_i / a_{ii}`$ and sweeps
/// ```math
/// x_i \leftarrow \Big(b_i - \sum_{j \neq i} a_{ij} x_j\Big) / a_{ii}
/// ```
/// using the freshest coordinates, until two successive iterates are
/// closer than `precision`.
///
/// Parameters
/// ----------
/// - __precision:__       stop when $`\|x_{k+1} - x_k\|_2 <`$ precision
/// - __min_sweeps:__      sweeps to run before the precision test applies
/// - __max_sweeps:__      give up with [`LinalgError::NotConverged`] after this many sweeps
/// - __check_dominance:__ reject matrices that are not diagonally dominant,
///                        for which the iteration is not guaranteed to converge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussSeidel<A = f64> {
    pub precision: A,
    pub min_sweeps: usize,
    pub max_sweeps: usize,
    pub check_dominance: bool,
}

impl<A: NdFloat> GaussSeidel<A> {
    pub fn new(precision: A) -> Self {
        Self {
            precision,
            min_sweeps: 1,
            max_sweeps: 10_000,
            check_dominance: true,
        }
    }

    /// Skip the diagonal dominance check, e.g. for triangular systems
    /// where the iteration terminates after `n` sweeps regardless.
    pub fn without_dominance_check(self) -> Self {
        Self {
            check_dominance: false,
            ..self
        }
    }

    pub fn solve(&self, a: &Matrix<A>, b: &Vector<A>) -> Result<Vector<A>, LinalgError> {
        let n = a.check_square()?;
        if b.dimension() != n {
            return Err(LinalgError::DimensionMismatch {
                expected: n,
                found: b.dimension(),
            });
        }
        if self.check_dominance {
            if let Some(row) = a.dominance_violation() {
                return Err(LinalgError::NotDiagonallyDominant { row });
            }
        }
        let a = a.view();
        let b = b.view();
        if let Some(row) = (0..n).find(|&i| a[[i, i]] == A::zero()) {
            return Err(LinalgError::ZeroPivot { row });
        }

        let mut x: Array1<A> = (0..n).map(|i| b[i] / a[[i, i]]).collect();
        for sweep in 1..=self.max_sweeps {
            let previous = x.clone();
            for i in 0..n {
                let off_diagonal = (0..n)
                    .filter(|&j| j != i)
                    .fold(A::zero(), |acc, j| acc + a[[i, j]] * x[j]);
                x[i] = (b[i] - off_diagonal) / a[[i, i]];
            }
            let change = &x - &previous;
            if sweep >= self.min_sweeps && Float::sqrt(change.dot(&change)) < self.precision {
                trace!(sweeps = sweep, "Gauss-Seidel converged");
                return Ok(Vector::from(x));
            }
        }
        Err(LinalgError::NotConverged {
            sweeps: self.max_sweeps,
        })
    }
}

impl Default for GaussSeidel<f64> {
    fn default() -> Self {
        Self::new(1e-4)
    }
}

/// Matrix inversion by LU factorization
///
/// Column `i` of the inverse solves $`A x = e_i`$. With $`A = LU`$ this is
/// done in two stages: $`L g = e_i`$ by Gauss elimination, then
/// $`U x = g`$ by Gauss-Seidel iteration. On the triangular factor the
/// iterate is exact after `n` sweeps, which are always run, so the result
/// does not depend on the scale of the entries.
///
/// Fails with [`LinalgError::NotSquare`] or [`LinalgError::ZeroPivot`]
/// for matrices that cannot be inverted this way.
pub fn invert<A: NdFloat>(a: &Matrix<A>) -> Result<Matrix<A>, LinalgError> {
    let n = a.check_square()?;
    let (l, u) = a.lu()?;
    let seidel = GaussSeidel {
        precision: A::epsilon(),
        min_sweeps: n,
        max_sweeps: n + 2,
        check_dominance: false,
    };

    let mut inverse = Array2::zeros((n, n));
    for i in 0..n {
        let e = Vector::unit(n, i)?;
        let g = solve_triangular(&l, &e)?;
        let column = seidel.solve(&u, &g)?;
        inverse.column_mut(i).assign(&column.view());
    }
    Ok(Matrix::from(inverse))
}
