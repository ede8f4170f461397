//! The `ndarray-minimize` crate provides the classical methods of unconstrained
//! minimization, built on a small dense linear-algebra kernel over `ndarray`.
//!
//! It includes:
//! - one dimensional searches: Svenn bracketing, bisection, golden section,
//!   Fibonacci, quadratic and cubic interpolation ([`line`])
//! - derivativeless methods: Hooke-Jeeves and Nelder-Mead ([`direct`])
//! - gradient methods: steepest descent, conjugate gradient, DFP and
//!   Levenberg-Marquardt ([`smooth`])
//! - dimension checked vectors and matrices with Gauss elimination, LU
//!   factors, Gauss-Seidel and inversion ([`linalg`])
//!
//! Objectives are plain closures `Fn(&Vector) -> f64`, gradients are given
//! one partial derivative per coordinate. Every optimizer is a value holding
//! only its configuration, with sensible [`Default`]s:
//!
//! ```
//! use ndarray_minimize::direct::NelderMead;
//! use ndarray_minimize::Vector;
//!
//! let f = |x: &Vector| (x[0] - 1.).powi(2) + (x[1] + 2.).powi(2);
//! let solution = NelderMead::default().solve(f, &Vector::zeros(2)).unwrap();
//! assert!(solution.converged);
//! assert!((solution.x[0] - 1.).abs() < 1e-3);
//! ```
//!
//! Progress is reported through [`tracing`] events: `trace` for every
//! iteration, `debug` for resets and the reason a run stopped.

#![cfg_attr(all(rustc_nightly, test), feature(test))]
#[cfg(all(rustc_nightly, test))]
extern crate test;

pub mod direct;
pub mod error;
pub mod linalg;
pub mod line;
pub mod problem;
pub mod smooth;

pub use error::{LinalgError, OptimizeError, Result};
pub use linalg::{Matrix, Vector};
pub use problem::{nop, Gradient, Solution};

#[cfg(all(rustc_nightly, test))]
mod benches {
    use crate::line::{GoldenSectionSearch, LineSearch};
    use crate::linalg::{solve_triangular, Matrix, Vector};
    use test::Bencher;

    #[bench]
    fn golden_section_parabola(b: &mut Bencher) {
        b.iter(|| GoldenSectionSearch::new(-10., 10., 1e-9, |x: f64| (x - 1.).powi(2)).solve());
    }

    #[bench]
    fn gauss_elimination_10x10(b: &mut Bencher) {
        let a = Matrix::from(ndarray::Array2::from_shape_fn((10, 10), |(i, j)| {
            if i == j {
                20.
            } else {
                1. / (1. + i as f64 + j as f64)
            }
        }));
        let rhs = Vector::filled(10, 1.);
        b.iter(|| solve_triangular(&a, &rhs));
    }
}
