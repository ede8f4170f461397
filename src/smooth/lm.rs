//! Private Module

use crate::error::Result;
use crate::linalg::{Matrix, Vector};
use crate::problem::{check_positive, check_start, nop, Gradient, Solution};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Configuration of [`LevenbergMarquardt`]
///
/// Parameters
/// ----------
/// - __initial_damping:__ starting value of the damping $`\mu`$
/// - __eps:__             gradient norm tolerance
/// - __max_iterations:__  number of trial steps, accepted or not
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LevenbergMarquardtConfig {
    pub initial_damping: f64,
    pub eps: f64,
    pub max_iterations: usize,
}

impl Default for LevenbergMarquardtConfig {
    fn default() -> Self {
        Self {
            initial_damping: 1e4,
            eps: 1e-3,
            max_iterations: 100_000,
        }
    }
}

/// Levenberg-Marquardt damped Newton method
///
/// Blends Newton's method (small damping) with gradient descent of step
/// $`1/\mu`$ (large damping). Requires the Hessian of the objective.
///
/// Algorithm
/// ---------
/// ```math
/// \begin{aligned}
/// d_k &= (\nabla^2 f(x_k) + \mu_k I)^{-1} \nabla f(x_k) \\
/// f(x_k - d_k) < f(x_k) &\Rightarrow x_{k+1} = x_k - d_k, \; \mu_{k+1} = \mu_k / 2 \\
/// \text{otherwise} &\Rightarrow x_{k+1} = x_k, \; \mu_{k+1} = 2 \mu_k
/// \end{aligned}
/// ```
///
/// A rejected step is retried with the same gradient and Hessian. Every
/// trial counts as an iteration. Stops when $`\|\nabla f(x_k)\| < \varepsilon`$.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LevenbergMarquardt {
    pub config: LevenbergMarquardtConfig,
}

impl LevenbergMarquardt {
    pub fn new(config: LevenbergMarquardtConfig) -> Self {
        Self { config }
    }

    pub fn solve(
        &self,
        f: impl Fn(&Vector) -> f64,
        gradient: &Gradient<'_>,
        hessian: impl Fn(&Vector) -> Matrix,
        x0: &Vector,
    ) -> Result<Solution> {
        self.solve_with(f, gradient, hessian, x0, nop)
    }

    /// Minimize `f` from `x0`, calling `callback(x, f(x), iter)` after
    /// each accepted step
    pub fn solve_with(
        &self,
        f: impl Fn(&Vector) -> f64,
        gradient: &Gradient<'_>,
        hessian: impl Fn(&Vector) -> Matrix,
        x0: &Vector,
        mut callback: impl FnMut(&Vector, f64, usize),
    ) -> Result<Solution> {
        let config = &self.config;
        check_positive(
            "Levenberg-Marquardt",
            &[
                ("initial_damping", config.initial_damping),
                ("eps", config.eps),
            ],
        )?;
        check_start(gradient, x0)?;

        let n = x0.dimension();
        let identity = Matrix::identity(n);
        let mut x = x0.clone();
        let mut fx = f(&x);
        let mut damping = config.initial_damping;
        let mut iterations = 0;

        'outer: while iterations < config.max_iterations {
            let grad = gradient.evaluate(&x)?;
            if grad.norm() < config.eps {
                debug!(iterations = iterations, fx = fx, "Levenberg-Marquardt: gradient vanished");
                return Ok(Solution {
                    x,
                    fx,
                    iterations,
                    converged: true,
                });
            }
            let hess = hessian(&x);

            while iterations < config.max_iterations {
                iterations += 1;
                let damped = hess.add(&identity.scale(damping))?;
                let step = damped.inverse()?.multiply_vector(&grad)?;
                let candidate = x.sub(&step)?;
                let f_candidate = f(&candidate);
                if f_candidate < fx {
                    damping /= 2.;
                    x = candidate;
                    fx = f_candidate;
                    trace!(iteration = iterations, fx = fx, damping = damping, "Levenberg-Marquardt");
                    callback(&x, fx, iterations);
                    continue 'outer;
                }
                damping *= 2.;
                debug!(iteration = iterations, damping = damping, "Levenberg-Marquardt: step rejected");
                if !damping.is_finite() {
                    break 'outer;
                }
            }
        }
        debug!(iterations = iterations, fx = fx, "Levenberg-Marquardt: stopped without convergence");
        Ok(Solution {
            x,
            fx,
            iterations,
            converged: false,
        })
    }
}
