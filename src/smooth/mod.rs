//! Gradient Methods for Smooth Unconstrained Minimization
//!
//! For minimizing an objective $`f: \mathbb{R}^n \to \mathbb{R}`$ whose
//! gradient is supplied as one partial derivative per coordinate (a
//! [`Gradient`](crate::problem::Gradient)). Every method follows the same
//! loop
//!
//! ```text
//! gradient -> small? stop -> direction -> line search -> advance -> stable? stop -> ...
//! ```
//!
//! where the step length along the direction $`d`$ minimizes
//! $`\varphi(\alpha) = f(x + \alpha d)`$ with the configured
//! [`LineSearchConfig`] started at $`\alpha = 0`$. Steps are only taken if
//! they do not increase the objective, so the observed values are
//! monotone.
//!
//! - [`SteepestDescent`]
//! - [`ConjugateGradient`] with a choice of [`Gamma`] update
//! - [`Dfp`], the Davidon-Fletcher-Powell quasi-Newton method
//! - [`LevenbergMarquardt`], damped Newton with an analytic Hessian

mod dfp;
pub use dfp::*;
mod gd;
pub use gd::*;
mod lm;
pub use lm::*;
mod pcg;
pub use pcg::*;

use crate::error::{LinalgError, Result};
use crate::line::LineSearchConfig;
use crate::linalg::Vector;

/// An accepted move of a line search
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Step {
    pub x: Vector,
    pub fx: f64,
    pub alpha: f64,
}

/// Halvings of the line search step before giving up on a direction
const MAX_HALVINGS: usize = 64;

/// Line search along `direction` from `x`, with $`f(x) = `$ `fx`
///
/// The step found by the line search is halved toward zero until the
/// objective does not increase. Returns `None` if no such step exists,
/// e.g. when `direction` points uphill.
pub(crate) fn monotone_step(
    f: &impl Fn(&Vector) -> f64,
    x: &Vector,
    fx: f64,
    direction: &Vector,
    line_search: &LineSearchConfig,
) -> Result<Option<Step>> {
    if direction.dimension() != x.dimension() {
        return Err(LinalgError::DimensionMismatch {
            expected: x.dimension(),
            found: direction.dimension(),
        }
        .into());
    }
    // dimensions agree, the offset cannot fail
    let phi = |alpha: f64| x.offset(alpha, direction).map_or(f64::INFINITY, |p| f(&p));
    let mut alpha = line_search.minimize(&phi, 0.)?.x;

    for _ in 0..MAX_HALVINGS {
        let candidate = x.offset(alpha, direction)?;
        let f_candidate = f(&candidate);
        if f_candidate <= fx {
            return Ok(Some(Step {
                x: candidate,
                fx: f_candidate,
                alpha,
            }));
        }
        alpha /= 2.;
    }
    Ok(None)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::linalg::Matrix;
    use crate::problem::Gradient;
    use approx::assert_abs_diff_eq;

    pub const ROSENBROCK_A: f64 = 100.;
    pub const ROSENBROCK_B: f64 = 2.;
    pub const ROSENBROCK_F: f64 = 45.;

    /// $`\sum_i a (x_i^2 - x_{i+1})^2 + b (x_i - 1)^2 + f`$ in three dimensions
    pub fn rosenbrock(x: &Vector) -> f64 {
        let (a, b) = (ROSENBROCK_A, ROSENBROCK_B);
        (0..2)
            .map(|i| a * (x[i].powi(2) - x[i + 1]).powi(2) + b * (x[i] - 1.).powi(2))
            .sum::<f64>()
            + ROSENBROCK_F
    }

    pub fn rosenbrock_gradient() -> Gradient<'static> {
        let (a, b) = (ROSENBROCK_A, ROSENBROCK_B);
        Gradient::new()
            .partial(move |x: &Vector| {
                4. * a * x[0] * (x[0].powi(2) - x[1]) + 2. * b * (x[0] - 1.)
            })
            .partial(move |x: &Vector| {
                -2. * a * (x[0].powi(2) - x[1])
                    + 4. * a * x[1] * (x[1].powi(2) - x[2])
                    + 2. * b * (x[1] - 1.)
            })
            .partial(move |x: &Vector| -2. * a * (x[1].powi(2) - x[2]))
    }

    pub fn rosenbrock_hessian(x: &Vector) -> Matrix {
        let (a, b) = (ROSENBROCK_A, ROSENBROCK_B);
        let h00 = 4. * a * (3. * x[0].powi(2) - x[1]) + 2. * b;
        let h11 = 2. * a + 2. * b + 4. * a * (3. * x[1].powi(2) - x[2]);
        let h01 = -4. * a * x[0];
        let h12 = -4. * a * x[1];
        ndarray::array![[h00, h01, 0.], [h01, h11, h12], [0., h12, 2. * a]].into()
    }

    /// $`(x_0 - 1)^2 + 10 (x_1 + 2)^2`$
    pub fn bowl(x: &Vector) -> f64 {
        (x[0] - 1.).powi(2) + 10. * (x[1] + 2.).powi(2)
    }

    pub fn bowl_gradient() -> Gradient<'static> {
        Gradient::new()
            .partial(|x: &Vector| 2. * (x[0] - 1.))
            .partial(|x: &Vector| 20. * (x[1] + 2.))
    }

    #[test]
    fn rosenbrock_derivatives_at_minimum() {
        let ones = Vector::filled(3, 1.);
        assert_abs_diff_eq!(rosenbrock(&ones), ROSENBROCK_F);
        let g = rosenbrock_gradient().evaluate(&ones).unwrap();
        assert_abs_diff_eq!(g, Vector::zeros(3));
        // Hessian is symmetric positive definite there
        let h = rosenbrock_hessian(&ones);
        assert_abs_diff_eq!(h, h.transpose());
        assert!(h.lu().is_ok());
    }

    #[test]
    fn rosenbrock_gradient_matches_differences() {
        let x = Vector::from(vec![0.3, -0.2, 0.7]);
        let g = rosenbrock_gradient().evaluate(&x).unwrap();
        let h = 1e-6;
        for i in 0..3 {
            let forward = rosenbrock(&x.add_at(i, h).unwrap());
            let backward = rosenbrock(&x.sub_at(i, h).unwrap());
            assert_abs_diff_eq!(g[i], (forward - backward) / (2. * h), epsilon = 1e-4);
        }
    }

    #[test]
    fn monotone_step_descends() {
        let x = Vector::from(vec![0., 0.]);
        let fx = bowl(&x);
        let d = bowl_gradient().evaluate(&x).unwrap().neg();
        let step = monotone_step(&bowl, &x, fx, &d, &LineSearchConfig::default())
            .unwrap()
            .unwrap();
        assert!(step.fx < fx);
        assert!(step.alpha > 0.);
        assert_abs_diff_eq!(step.x, x.offset(step.alpha, &d).unwrap());
    }

    #[test]
    fn monotone_step_dimension_mismatch() {
        let x = Vector::zeros(2);
        let d = Vector::zeros(3);
        assert!(monotone_step(&bowl, &x, 0., &d, &LineSearchConfig::default()).is_err());
    }
}
