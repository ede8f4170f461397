//! Private Module

use super::monotone_step;
use crate::error::Result;
use crate::line::LineSearchConfig;
use crate::linalg::{Matrix, Vector};
use crate::problem::{check_positive, check_start, nop, Gradient, Solution};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Configuration of [`Dfp`]
///
/// Parameters
/// ----------
/// - __eps1:__           gradient norm tolerance
/// - __eps2:__           function change tolerance
/// - __delta:__          step length tolerance
/// - __max_iterations:__ number of outer iterations
/// - __line_search:__    how step lengths are chosen
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DfpConfig {
    pub eps1: f64,
    pub eps2: f64,
    pub delta: f64,
    pub max_iterations: usize,
    pub line_search: LineSearchConfig,
}

impl Default for DfpConfig {
    fn default() -> Self {
        Self {
            eps1: 1e-4,
            eps2: 1e-10,
            delta: 1e-6,
            max_iterations: 10_000,
            line_search: LineSearchConfig::default(),
        }
    }
}

/// Davidon-Fletcher-Powell quasi-Newton method
///
/// Approximates the inverse Hessian $`G`$ from observed gradient
/// differences, starting from $`G_0 = I`$.
/// See also [Wikipedia](https://en.wikipedia.org/wiki/Davidon%E2%80%93Fletcher%E2%80%93Powell_formula).
///
/// Algorithm
/// ---------
/// ```math
/// \begin{aligned}
/// g_k &= \nabla f(x_k) \\
/// d_k &= -G_k g_k \\
/// \alpha_k &\in \mathrm{arg}\!\min_{\alpha \in \mathbb{R}} f(x_k + \alpha d_k) \\
/// x_{k+1} &= x_k + \alpha_k d_k \\
/// s_k &= x_{k+1} - x_k, \quad y_k = g_{k+1} - g_k \\
/// G_{k+1} &= G_k + \frac{s_k s_k^T}{s_k^T y_k} - \frac{(G_k y_k)(G_k y_k)^T}{y_k^T G_k y_k}
/// \end{aligned}
/// ```
///
/// $`G`$ is reset to the identity when either denominator of the update is
/// not positive, which would break positive definiteness, and when
/// $`d_k`$ is not a descent direction. Stops when
/// $`\|g_k\| < \varepsilon_1`$, or when $`\|s_k\| < \delta`$ and
/// $`|f(x_{k+1}) - f(x_k)| < \varepsilon_2`$ on two consecutive iterations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dfp {
    pub config: DfpConfig,
}

/// Rank-2 DFP update of the inverse Hessian, `None` if it is undefined
fn dfp_update(g: &Matrix, s: &Vector, y: &Vector) -> Result<Option<Matrix>> {
    let s_y = s.dot(y)?;
    let gy = g.multiply_vector(y)?;
    let y_gy = y.dot(&gy)?;
    if !(s_y > 0. && y_gy > 0.) {
        return Ok(None);
    }
    let updated = g
        .add(&s.outer(s).scale(1. / s_y))?
        .sub(&gy.outer(&gy).scale(1. / y_gy))?;
    Ok(Some(updated))
}

impl Dfp {
    pub fn new(config: DfpConfig) -> Self {
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

    /// Minimize `f` from `x0`, calling `callback(x, f(x), iter)` after
    /// each iteration
    pub fn solve_with(
        &self,
        f: impl Fn(&Vector) -> f64,
        gradient: &Gradient<'_>,
        x0: &Vector,
        mut callback: impl FnMut(&Vector, f64, usize),
    ) -> Result<Solution> {
        let config = &self.config;
        check_positive(
            "DFP",
            &[
                ("eps1", config.eps1),
                ("eps2", config.eps2),
                ("delta", config.delta),
            ],
        )?;
        config.line_search.validate()?;
        check_start(gradient, x0)?;

        let n = x0.dimension();
        let mut x = x0.clone();
        let mut fx = f(&x);
        let mut grad = gradient.evaluate(&x)?;
        let mut inv_hessian = Matrix::identity(n);
        let mut stable = false;

        for iter in 1..=config.max_iterations {
            if grad.norm() < config.eps1 {
                debug!(iterations = iter - 1, fx = fx, "DFP: gradient vanished");
                return Ok(Solution {
                    x,
                    fx,
                    iterations: iter - 1,
                    converged: true,
                });
            }

            let mut dir = inv_hessian.multiply_vector(&grad)?.neg();
            if !(grad.dot(&dir)? < 0.) {
                debug!(iteration = iter, "DFP: not a descent direction, inverse Hessian reset");
                inv_hessian = Matrix::identity(n);
                dir = grad.neg();
            }

            let step = match monotone_step(&f, &x, fx, &dir, &config.line_search)? {
                Some(step) => step,
                None => {
                    debug!(iterations = iter - 1, fx = fx, "DFP: no descent step");
                    return Ok(Solution {
                        x,
                        fx,
                        iterations: iter - 1,
                        converged: false,
                    });
                }
            };
            let grad_new = gradient.evaluate(&step.x)?;
            let s = step.x.sub(&x)?;
            let y = grad_new.sub(&grad)?;
            inv_hessian = match dfp_update(&inv_hessian, &s, &y)? {
                Some(updated) => updated,
                None => {
                    debug!(iteration = iter, "DFP: curvature condition failed, inverse Hessian reset");
                    Matrix::identity(n)
                }
            };

            let moved = s.norm();
            let change = (fx - step.fx).abs();
            x = step.x;
            fx = step.fx;
            grad = grad_new;
            trace!(iteration = iter, fx = fx, alpha = step.alpha, "DFP");
            callback(&x, fx, iter);

            if moved < config.delta && change < config.eps2 {
                if stable {
                    debug!(iterations = iter, fx = fx, "DFP: stable");
                    return Ok(Solution {
                        x,
                        fx,
                        iterations: iter,
                        converged: true,
                    });
                }
                stable = true;
            } else {
                stable = false;
            }
        }
        debug!(iterations = config.max_iterations, fx = fx, "DFP: iteration cap");
        Ok(Solution {
            x,
            fx,
            iterations: config.max_iterations,
            converged: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::LineSearchMethod;
    use crate::smooth::tests::{bowl, bowl_gradient, rosenbrock, rosenbrock_gradient};
    use approx::assert_abs_diff_eq;

    #[test]
    fn dfp_update_satisfies_secant_equation() {
        let g = Matrix::identity(2);
        let s = Vector::from(vec![1., 0.5]);
        let y = Vector::from(vec![2., 3.]);
        let updated = dfp_update(&g, &s, &y).unwrap().unwrap();
        // G_{k+1} y_k = s_k
        assert_abs_diff_eq!(updated.multiply_vector(&y).unwrap(), s, epsilon = 1e-12);
        assert_abs_diff_eq!(updated, updated.transpose(), epsilon = 1e-12);
    }

    #[test]
    fn dfp_update_rejects_negative_curvature() {
        let g = Matrix::identity(2);
        let s = Vector::from(vec![1., 0.]);
        let y = Vector::from(vec![-1., 0.]);
        assert_eq!(dfp_update(&g, &s, &y), Ok(None));
    }

    #[test]
    fn dfp_bowl_every_line_search() {
        let x0 = Vector::from(vec![4., 1.]);
        for method in [
            LineSearchMethod::Bisection,
            LineSearchMethod::GoldenSection,
            LineSearchMethod::Fibonacci,
            LineSearchMethod::QuadraticInterpolation,
        ]
        .iter()
        {
            let config = DfpConfig {
                line_search: LineSearchConfig::with_method(*method),
                ..DfpConfig::default()
            };
            let solution = Dfp::new(config)
                .solve(bowl, &bowl_gradient(), &x0)
                .unwrap();
            assert!(solution.converged, "{}", method);
            assert_abs_diff_eq!(solution.x, Vector::from(vec![1., -2.]), epsilon = 1e-3);
            assert_abs_diff_eq!(solution.fx, 0., epsilon = 1e-6);
        }
    }

    #[test]
    fn dfp_rosenbrock_monotone() {
        let mut values = vec![];
        let solution = Dfp::default()
            .solve_with(rosenbrock, &rosenbrock_gradient(), &Vector::zeros(3), |_x, fx, _| {
                values.push(fx)
            })
            .unwrap();
        assert!(values.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(values.len(), solution.iterations);
        assert_abs_diff_eq!(solution.fx, 45., epsilon = 1e-2);
        assert_abs_diff_eq!(solution.x, Vector::filled(3, 1.), epsilon = 0.1);
    }
}
