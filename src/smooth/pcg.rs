//! Private Module

use super::monotone_step;
use crate::error::Result;
use crate::line::LineSearchConfig;
use crate::linalg::Vector;
use crate::problem::{check_positive, check_start, nop, Gradient, Solution};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Choice of update of $`\gamma`$ for conjugate gradient
///
/// All methods are equivalent on a quadratic problem, but
/// represent different relaxations for non-quadratic problems.
/// Below $`y_i = g_i - g_{i-1}`$.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum Gamma {
    /// ```math
    /// \gamma_i = \frac{ \langle y_i, g_i \rangle}{\langle y_i, d_{i-1} \rangle }
    /// ```
    HestenesStiefel,

    /// ```math
    /// \gamma_i = \frac{ \langle y_i, g_i \rangle}{\langle g_{i-1}, g_{i-1} \rangle }
    /// ```
    PolakRibiere,

    /// ```math
    /// \gamma_i = \frac{ \langle g_i, g_i \rangle}{\langle y_i, d_{i-1} \rangle }
    /// ```
    DaiYuan,

    /// ```math
    /// \gamma_i = \frac{ \langle g_i, g_i \rangle}{\langle g_{i-1}, g_{i-1} \rangle }
    /// ```
    FletcherReeves,

    /// ```math
    /// \begin{aligned}
    /// \zeta_i &= 2 \frac{ \langle y_i, y_i \rangle}{\langle y_i, d_{i-1} \rangle } \\
    /// \gamma_i &= \frac{ \langle y_i - \zeta_i d_{i-1}, g_i \rangle}{\langle y_i, d_{i-1} \rangle } \\
    /// \end{aligned}
    /// ```
    HagerZhang,
}

impl Gamma {
    /// $`\gamma_i`$ from the current and previous gradient and the
    /// previous direction, zero where the update is undefined
    pub fn coefficient(&self, grad: &Vector, grad_old: &Vector, dir_old: &Vector) -> Result<f64> {
        let y = grad.sub(grad_old)?;
        let gamma = match self {
            Self::HestenesStiefel => y.dot(grad)? / y.dot(dir_old)?,
            Self::PolakRibiere => y.dot(grad)? / grad_old.dot(grad_old)?,
            Self::DaiYuan => grad.dot(grad)? / y.dot(dir_old)?,
            Self::FletcherReeves => grad.dot(grad)? / grad_old.dot(grad_old)?,
            Self::HagerZhang => {
                let y_d = y.dot(dir_old)?;
                let zeta = 2. * y.dot(&y)? / y_d;
                y.offset(-zeta, dir_old)?.dot(grad)? / y_d
            }
        };
        Ok(if gamma.is_finite() { gamma } else { 0. })
    }
}

/// Configuration of [`ConjugateGradient`]
///
/// Parameters
/// ----------
/// - __eps1:__           gradient norm tolerance
/// - __eps2:__           function change tolerance
/// - __delta:__          step length tolerance
/// - __max_iterations:__ number of outer iterations
/// - __update:__         choice of $`\gamma`$
/// - __line_search:__    how step lengths are chosen
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConjugateGradientConfig {
    pub eps1: f64,
    pub eps2: f64,
    pub delta: f64,
    pub max_iterations: usize,
    pub update: Gamma,
    pub line_search: LineSearchConfig,
}

impl Default for ConjugateGradientConfig {
    fn default() -> Self {
        Self {
            eps1: 1e-4,
            eps2: 1e-10,
            delta: 1e-6,
            max_iterations: 10_000,
            update: Gamma::FletcherReeves,
            line_search: LineSearchConfig::default(),
        }
    }
}

/// Non-linear Conjugate Gradient
///
/// Conjugate-gradient methods modify the search direction to ensure they are
/// conjugate (approximately so for non-quadratics).
///
/// Algorithm
/// ---------
/// ```math
/// \begin{aligned}
/// g_i &= \nabla f(x_{i-1}) \\
/// \gamma_i &= \mathrm{gamma\_update}(g_i, g_{i-1}, d_{i-1})  \\
/// d_i &= -g_i + \gamma_i d_{i-1} \\
/// \alpha_i &\in \mathrm{arg}\!\min_{\alpha \in \mathbb{R}} f(x_{i-1} + \alpha d_i) \\
/// x_i &= x_{i-1} + \alpha_i d_i
/// \end{aligned}
/// ```
/// where the choice of $`\gamma`$ update can be:
/// - [Hestenes-Stiefel ](enum.Gamma.html#variant.HestenesStiefel)
/// - [Polak-Ribiere ](enum.Gamma.html#variant.PolakRibiere)
/// - [Dai-Yuan ](enum.Gamma.html#variant.DaiYuan)
/// - [Fletcher-Reeves ](enum.Gamma.html#variant.FletcherReeves)
/// - [Hager-Zhang ](enum.Gamma.html#variant.HagerZhang)
///
/// $`\gamma`$ is reset to zero every $`n`$ iterations, and $`d_i`$ falls
/// back to $`-g_i`$ whenever it is not a descent direction. Stops when
/// $`\|g_i\| < \varepsilon_1`$, or when $`\|x_i - x_{i-1}\| < \delta`$ and
/// $`|f(x_i) - f(x_{i-1})| < \varepsilon_2`$ on two consecutive iterations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConjugateGradient {
    pub config: ConjugateGradientConfig,
}

impl ConjugateGradient {
    pub fn new(config: ConjugateGradientConfig) -> Self {
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
            "conjugate gradient",
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
        // (g_{i-1}, d_{i-1})
        let mut previous: Option<(Vector, Vector)> = None;
        let mut stable = false;

        for iter in 1..=config.max_iterations {
            if grad.norm() < config.eps1 {
                debug!(iterations = iter - 1, fx = fx, "conjugate gradient: gradient vanished");
                return Ok(Solution {
                    x,
                    fx,
                    iterations: iter - 1,
                    converged: true,
                });
            }

            // Compute conjugate direction
            let steepest = grad.neg();
            let dir = match &previous {
                Some((grad_old, dir_old)) if (iter - 1) % n != 0 => {
                    let gamma = config.update.coefficient(&grad, grad_old, dir_old)?;
                    steepest.offset(gamma, dir_old)?
                }
                _ => steepest.clone(),
            };
            let dir = if grad.dot(&dir)? < 0. {
                dir
            } else {
                trace!(iteration = iter, "conjugate gradient: restart from steepest descent");
                steepest
            };

            let step = match monotone_step(&f, &x, fx, &dir, &config.line_search)? {
                Some(step) => step,
                None => {
                    debug!(iterations = iter - 1, fx = fx, "conjugate gradient: no descent step");
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
            trace!(iteration = iter, fx = fx, alpha = step.alpha, "conjugate gradient");
            callback(&x, fx, iter);

            if moved < config.delta && change < config.eps2 {
                if stable {
                    debug!(iterations = iter, fx = fx, "conjugate gradient: stable");
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

            // update loop state variables
            let grad_new = gradient.evaluate(&x)?;
            previous = Some((grad, dir));
            grad = grad_new;
        }
        debug!(iterations = config.max_iterations, fx = fx, "conjugate gradient: iteration cap");
        Ok(Solution {
            x,
            fx,
            iterations: config.max_iterations,
            converged: false,
        })
    }
}
