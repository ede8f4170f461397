//! Private Module

use super::{ordered, LineMinimum, LineSearch};
use crate::error::{OptimizeError, Result};
use tracing::trace;

/// Bisection search, also known as "break in two"
///
/// Each iteration compares the midpoint of $`[a, b]`$ with the two
/// quarter points and keeps the half interval around the smallest of
/// them, so the interval halves with two function evaluations at most.
///
/// Algorithm
/// ---------
/// ```math
/// \begin{aligned}
/// L &= b - a, \quad x_m = (a + b)/2, \quad y = a + L/4, \quad z = b - L/4 \\
/// f(y) < f(x_m) &\Rightarrow b = x_m, \; x_m = y \\
/// f(z) < f(x_m) &\Rightarrow a = x_m, \; x_m = z \\
/// \text{otherwise} &\Rightarrow a = y, \; b = z
/// \end{aligned}
/// ```
/// until $`L \leq`$ precision. After $`k`$ iterations the interval has
/// contracted by $`R = 2^{-k/2}`$ in terms of function evaluations.
pub struct BisectionSearch<F> {
    a: f64,
    b: f64,
    precision: f64,
    f: F,
    iterations: Option<usize>,
}

impl<F> BisectionSearch<F>
where
    F: Fn(f64) -> f64,
{
    pub fn new(a: f64, b: f64, precision: f64, f: F) -> Self {
        let (a, b) = ordered(a, b);
        Self {
            a,
            b,
            precision,
            f,
            iterations: None,
        }
    }
}

impl<F> LineSearch for BisectionSearch<F>
where
    F: Fn(f64) -> f64,
{
    fn solve(&mut self) -> LineMinimum {
        let f = &self.f;
        let (mut a, mut b) = (self.a, self.b);
        let mut mid = (a + b) / 2.;
        let mut f_mid = f(mid);
        let mut length = b - a;
        let mut k = 0;

        while length > self.precision {
            let y = a + length / 4.;
            let f_y = f(y);
            if f_y < f_mid {
                b = mid;
                mid = y;
                f_mid = f_y;
            } else {
                let z = b - length / 4.;
                let f_z = f(z);
                if f_z < f_mid {
                    a = mid;
                    mid = z;
                    f_mid = f_z;
                } else {
                    a = y;
                    b = z;
                }
            }
            k += 1;
            let previous = length;
            length = b - a;
            if length >= previous {
                // interval reached floating point resolution
                break;
            }
        }
        trace!(iterations = k, x = mid, "bisection done");
        self.iterations = Some(k);
        LineMinimum { x: mid, fx: f_mid }
    }

    fn iterations(&self) -> Option<usize> {
        self.iterations
    }

    fn convergence_rate(&self) -> Result<f64> {
        let k = self.iterations.ok_or(OptimizeError::NotYetRun)?;
        Ok(2f64.powf(-(k as f64) / 2.))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn bisection_quadratic() {
        let mut search = BisectionSearch::new(-3., 5., 1e-6, |x: f64| (x - 1.5).powi(2));
        let min = search.solve();
        assert_abs_diff_eq!(min.x, 1.5, epsilon = 1e-6);
        assert_abs_diff_eq!(min.fx, 0., epsilon = 1e-12);
    }

    #[test]
    fn bisection_reversed_interval() {
        let min = BisectionSearch::new(2., -2., 1e-5, |x: f64| x.powi(4) - x).solve();
        // f'(x) = 4x^3 - 1
        assert_abs_diff_eq!(min.x, 0.25f64.cbrt(), epsilon = 1e-5);
    }

    #[test]
    fn bisection_convergence_rate() {
        let mut search = BisectionSearch::new(0., 1., 1e-3, |x: f64| (x - 0.3).abs());
        assert_eq!(search.convergence_rate(), Err(OptimizeError::NotYetRun));
        assert_eq!(search.iterations(), None);
        search.solve();
        // 1 / 2^10 <= 1e-3
        assert_eq!(search.iterations(), Some(10));
        assert_abs_diff_eq!(search.convergence_rate().unwrap(), 2f64.powi(-5));
    }

    #[test]
    fn bisection_already_narrow() {
        let mut search = BisectionSearch::new(1., 1. + 1e-9, 1e-6, |x: f64| x);
        let min = search.solve();
        assert_eq!(search.iterations(), Some(0));
        assert_abs_diff_eq!(min.x, 1., epsilon = 1e-9);
        assert_abs_diff_eq!(search.convergence_rate().unwrap(), 1.);
    }
}
