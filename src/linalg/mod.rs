//! Dense Linear Algebra Kernel
//!
//! Small, dense [`Vector`] and [`Matrix`] value types on top of `ndarray`
//! with dimension-checked arithmetic, and the solvers the optimizers need:
//! - Gauss elimination with back-substitution ([`solve_triangular`])
//! - Gauss-Seidel iteration ([`GaussSeidel`])
//! - Doolittle LU factorization ([`Matrix::lu`])
//! - inversion composed from the two solvers ([`invert`])
//!
//! No pivoting is performed anywhere, so systems with a zero leading
//! minor fail with [`LinalgError::ZeroPivot`](crate::LinalgError::ZeroPivot)
//! rather than being reordered.

mod matrix;
pub use matrix::*;
mod vector;
pub use vector::*;
pub mod solve;
pub use solve::{invert, solve_triangular, GaussSeidel};
