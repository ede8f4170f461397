//! Private Module

use super::monotone_step;
use crate::error::Result;
use crate::line::LineSearchConfig;
use crate::linalg::Vector;
use crate::problem::{check_positive, check_start, nop, Gradient, Solution};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Configuration of [`SteepestDescent`]
///
/// Parameters
/// ----------
/// - __eps1:__           gradient norm and step length tolerance
/// - __eps2:__           function change tolerance
/// - __max_iterations:__ number of outer iterations
/// - __line_search:__    how step lengths are chosen
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SteepestDescentConfig {
    pub eps1: f64,
    pub eps2: f64,
    pub max_iterations: usize,
    pub line_search: LineSearchConfig,
}

impl Default for SteepestDescentConfig {
    fn default() -> Self {
        Self {
            eps1: 1e-4,
            eps2: 1e-10,
            max_iterations: 100_000,
            line_search: LineSearchConfig::default(),
        }
    }
}

/// Steepest Descent with a line search
///
/// Also known as the fastest gradient descent.
///
/// Algorithm
/// ---------
/// ```math
/// \begin{aligned}
/// d_i &= -\nabla f(x_i) \\
/// \alpha_i &= \mathrm{arg}\!\min_\alpha f(x_i + \alpha d_i ) \\
/// x_{i+1} &= x_i + \alpha_i d_i
/// \end{aligned}
/// ```
///
/// Stops when $`\|\nabla f(x_i)\| < \varepsilon_1`$, or when both
/// $`\|x_{i+1} - x_i\| < \varepsilon_1`$ and
/// $`|f(x_{i+1}) - f(x_i)| < \varepsilon_2`$.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SteepestDescent {
    pub config: SteepestDescentConfig,
}

impl SteepestDescent {
    pub fn new(config: SteepestDescentConfig) -> Self {
        Self { config }
    }

    pub fn solve(
        &self,
        f: impl Fn(&Vector) -> f64,
        gradient: &Gradient<'_>,
        x0: &Vector,
    ) -> Result<Solution> {
        self.solve_with(f, gradient, x0, nop)
    }

    /// Minimize `f` from `x0`
    ///
    /// Parameters
    /// ----------
    /// - __f:__         objective function
    /// - __gradient:__  its partial derivatives
    /// - __x0:__        initial guess
    /// - __callback:__  user-defined function to be evaluated with the
    ///                  accepted iterate, its value and the iteration index
    ///                  after each iteration
    pub fn solve_with(
        &self,
        f: impl Fn(&Vector) -> f64,
        gradient: &Gradient<'_>,
        x0: &Vector,
        mut callback: impl FnMut(&Vector, f64, usize),
    ) -> Result<Solution> {
        let config = &self.config;
        check_positive(
            "steepest descent",
            &[("eps1", config.eps1), ("eps2", config.eps2)],
        )?;
        config.line_search.validate()?;
        check_start(gradient, x0)?;

        let mut x = x0.clone();
        let mut fx = f(&x);
        for iter in 1..=config.max_iterations {
            let grad = gradient.evaluate(&x)?;
            if grad.norm() < config.eps1 {
                debug!(iterations = iter - 1, fx = fx, "steepest descent: gradient vanished");
                return Ok(Solution {
                    x,
                    fx,
                    iterations: iter - 1,
                    converged: true,
                });
            }

            let step = match monotone_step(&f, &x, fx, &grad.neg(), &config.line_search)? {
                Some(step) => step,
                None => {
                    debug!(iterations = iter - 1, fx = fx, "steepest descent: no descent step");
                    return Ok(Solution {
                        x,
                        fx,
                        iterations: iter - 1,
                        converged: false,
                    });
                }
            };
            let moved = step.x.sub(&x)?.norm();
            let change = (fx - step.fx).abs();
            x = step.x;
            fx = step.fx;
            trace!(iteration = iter, fx = fx, alpha = step.alpha, "steepest descent");
            callback(&x, fx, iter);

            if moved < config.eps1 && change < config.eps2 {
                debug!(iterations = iter, fx = fx, "steepest descent: step stalled");
                return Ok(Solution {
                    x,
                    fx,
                    iterations: iter,
                    converged: true,
                });
            }
        }
        debug!(iterations = config.max_iterations, fx = fx, "steepest descent: iteration cap");
        Ok(Solution {
            x,
            fx,
            iterations: config.max_iterations,
            converged: false,
        })
    }
}
