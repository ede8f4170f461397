//! Private Module

use crate::error::{OptimizeError, Result};
use crate::line::LineSearchConfig;
use crate::linalg::Vector;
use crate::problem::{check_positive, nop, Solution};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Configuration of [`HookeJeeves`]
///
/// Parameters
/// ----------
/// - __delta:__          initial exploratory step of every coordinate
/// - __lambda:__         acceleration factor, start of the pattern line search
/// - __precision:__      final exploratory and pattern step
/// - __max_iterations:__ number of exploratory phases
/// - __line_search:__    how pattern moves are sized
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HookeJeevesConfig {
    pub delta: f64,
    pub lambda: f64,
    pub precision: f64,
    pub max_iterations: usize,
    pub line_search: LineSearchConfig,
}

impl Default for HookeJeevesConfig {
    fn default() -> Self {
        Self {
            delta: 0.1,
            lambda: 2.,
            precision: 1e-6,
            max_iterations: 100_000,
            line_search: LineSearchConfig::default(),
        }
    }
}

/// The Hooke-Jeeves pattern search
///
/// Alternates an exploratory phase along the coordinate axes with pattern
/// moves along the direction of the last improvement.
///
/// Algorithm
/// ---------
/// 1. exploratory phase: for each coordinate $`i`$ try
///    $`x \pm \delta_i e_i`$ and keep the first that improves
/// 2. on success, with $`d = x_{trial} - x_{base}`$, choose $`\alpha`$ by a
///    line search on $`f(x_{trial} + \alpha d)`$ started at $`\lambda`$ and
///    take the pattern point if it improves on $`x_{trial}`$
/// 3. on failure halve every $`\delta_i`$
///
/// Stops when every $`\delta_i`$ and the last move are below precision.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookeJeeves {
    pub config: HookeJeevesConfig,
}

impl HookeJeeves {
    pub fn new(config: HookeJeevesConfig) -> Self {
        Self { config }
    }

    /// Exploratory moves around `base`, returns the best point and its value
    fn explore(
        f: &impl Fn(&Vector) -> f64,
        base: &Vector,
        f_base: f64,
        delta: &[f64],
    ) -> Result<(Vector, f64)> {
        let mut x = base.clone();
        let mut fx = f_base;
        for (i, &step) in delta.iter().enumerate() {
            let forward = x.add_at(i, step)?;
            let f_forward = f(&forward);
            if f_forward < fx {
                x = forward;
                fx = f_forward;
                continue;
            }
            let backward = x.sub_at(i, step)?;
            let f_backward = f(&backward);
            if f_backward < fx {
                x = backward;
                fx = f_backward;
            }
        }
        Ok((x, fx))
    }

    pub fn solve(&self, f: impl Fn(&Vector) -> f64, x0: &Vector) -> Result<Solution> {
        self.solve_with(f, x0, nop)
    }

    /// Minimize `f` from `x0`, calling `callback(x, f(x), iter)` with the
    /// base point after each iteration
    pub fn solve_with(
        &self,
        f: impl Fn(&Vector) -> f64,
        x0: &Vector,
        mut callback: impl FnMut(&Vector, f64, usize),
    ) -> Result<Solution> {
        let config = &self.config;
        check_positive(
            "Hooke-Jeeves",
            &[
                ("delta", config.delta),
                ("lambda", config.lambda),
                ("precision", config.precision),
            ],
        )?;
        config.line_search.validate()?;

        let mut base = x0.clone();
        let mut f_base = f(&base);
        let mut delta = vec![config.delta; x0.dimension()];
        let largest = |delta: &[f64]| delta.iter().fold(0., |acc: f64, d| acc.max(*d));

        for iter in 1..=config.max_iterations {
            let (trial, f_trial) = Self::explore(&f, &base, f_base, &delta)?;

            let moved = if f_trial < f_base {
                // pattern move
                let dir = trial.sub(&base)?;
                let phi = |alpha: f64| trial.offset(alpha, &dir).map_or(f64::INFINITY, |p| f(&p));
                let pattern = match config.line_search.minimize(&phi, config.lambda) {
                    Ok(min) => Some((trial.offset(min.x, &dir)?, min.fx)),
                    // lambda sits on a local maximum along the pattern, or
                    // the pattern line is flat to rounding
                    Err(OptimizeError::NotUnimodal { .. })
                    | Err(OptimizeError::DegenerateInterpolation { .. }) => None,
                    Err(err) => return Err(err),
                };
                let (next, f_next) = match pattern {
                    Some((pattern, f_pattern)) if f_pattern < f_trial => (pattern, f_pattern),
                    _ => (trial, f_trial),
                };
                let moved = next.sub(&base)?.norm();
                base = next;
                f_base = f_next;
                moved
            } else {
                if largest(&delta) < config.precision {
                    debug!(iterations = iter, fx = f_base, "Hooke-Jeeves: steps below precision");
                    callback(&base, f_base, iter);
                    return Ok(Solution {
                        x: base,
                        fx: f_base,
                        iterations: iter,
                        converged: true,
                    });
                }
                delta.iter_mut().for_each(|d| *d /= 2.);
                0.
            };
            trace!(iteration = iter, fx = f_base, moved = moved, "Hooke-Jeeves");
            callback(&base, f_base, iter);

            if moved > 0. && moved < config.precision && largest(&delta) < config.precision {
                debug!(iterations = iter, fx = f_base, "Hooke-Jeeves: pattern step below precision");
                return Ok(Solution {
                    x: base,
                    fx: f_base,
                    iterations: iter,
                    converged: true,
                });
            }
        }
        debug!(iterations = config.max_iterations, fx = f_base, "Hooke-Jeeves: iteration cap");
        Ok(Solution {
            x: base,
            fx: f_base,
            iterations: config.max_iterations,
            converged: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::line::LineSearchMethod;
    use crate::smooth::tests::{bowl, rosenbrock};
    use approx::assert_abs_diff_eq;

    #[test]
    fn explore_moves_each_coordinate() {
        let base = Vector::from(vec![0., 0.]);
        let (x, fx) = HookeJeeves::explore(&bowl, &base, bowl(&base), &[0.5, 0.5]).unwrap();
        assert_eq!(x, Vector::from(vec![0.5, -0.5]));
        assert_abs_diff_eq!(fx, bowl(&x));
    }

    #[test]
    fn explore_keeps_base_at_minimum() {
        let base = Vector::from(vec![1., -2.]);
        let (x, fx) = HookeJeeves::explore(&bowl, &base, 0., &[0.1, 0.1]).unwrap();
        assert_eq!(x, base);
        assert_eq!(fx, 0.);
    }

    #[test]
    fn hooke_jeeves_bowl_interval_searches() {
        for method in [
            LineSearchMethod::Bisection,
            LineSearchMethod::GoldenSection,
            LineSearchMethod::Fibonacci,
        ]
        .iter()
        {
            let config = HookeJeevesConfig {
                line_search: LineSearchConfig::with_method(*method),
                ..HookeJeevesConfig::default()
            };
            let solution = HookeJeeves::new(config)
                .solve(bowl, &Vector::from(vec![-2., 3.]))
                .unwrap();
            assert!(solution.converged, "{}", method);
            assert_abs_diff_eq!(solution.x, Vector::from(vec![1., -2.]), epsilon = 1e-4);
        }
    }

    #[test]
    fn hooke_jeeves_rosenbrock_monotone() {
        let mut last = f64::INFINITY;
        let solution = HookeJeeves::default()
            .solve_with(rosenbrock, &Vector::zeros(3), |_x, fx, _| {
                assert!(fx <= last);
                last = fx;
            })
            .unwrap();
        assert_abs_diff_eq!(solution.fx, 45., epsilon = 1e-2);
        assert_abs_diff_eq!(solution.x, Vector::filled(3, 1.), epsilon = 0.1);
    }

    #[test]
    fn hooke_jeeves_flat_pattern_line() {
        // zero beyond x[0] = 1, the first pattern line lies on the plateau
        let f = |x: &Vector| (1. - x[0]).max(0.);
        let config = HookeJeevesConfig {
            line_search: LineSearchConfig::with_method(LineSearchMethod::QuadraticInterpolation),
            ..HookeJeevesConfig::default()
        };
        let solution = HookeJeeves::new(config)
            .solve(f, &Vector::from(vec![0.95, 0.]))
            .unwrap();
        assert!(solution.converged);
        assert_eq!(solution.fx, 0.);
        assert_abs_diff_eq!(solution.x, Vector::from(vec![1.05, 0.]), epsilon = 1e-12);
    }

    #[test]
    fn hooke_jeeves_rejects_bad_config() {
        let solver = HookeJeeves::new(HookeJeevesConfig {
            precision: 0.,
            ..HookeJeevesConfig::default()
        });
        assert!(matches!(
            solver.solve(bowl, &Vector::zeros(2)),
            Err(OptimizeError::InvalidConfig(_))
        ));
    }
}
