//! Private Module

use super::{ordered, LineMinimum, LineSearch};
use crate::error::{OptimizeError, Result};
use tracing::trace;

/// Golden Section Search
///
/// Minimizes a scalar function by iteratively dividing an interval
/// $`[a, b]`$ into successively smaller intervals given by the golden
/// ratio. Only one new function evaluation is needed per iteration since
/// one interior point is reused. See
/// [Wikipedia](https://en.wikipedia.org/wiki/Golden-section_search)
/// for more info.
///
/// Stops once $`|b - a| \leq`$ precision and returns the midpoint. After
/// $`k`$ iterations the interval has contracted by $`R = 0.618^{k-1}`$.
pub struct GoldenSectionSearch<F> {
    a: f64,
    b: f64,
    precision: f64,
    f: F,
    iterations: Option<usize>,
}

impl<F> GoldenSectionSearch<F>
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

impl<F> LineSearch for GoldenSectionSearch<F>
where
    F: Fn(f64) -> f64,
{
    fn solve(&mut self) -> LineMinimum {
        // 1 / phi = 0.61803398875 = phi - 1 = (sqrt(5) - 1)/2
        let invphi = (5.0_f64.sqrt() - 1.) / 2.;
        // 1 / phi^2 = 0.38196601125 = 2 - phi = 1 - invphi = (3 - sqrt(5))/2
        let invphi2 = (3. - 5.0_f64.sqrt()) / 2.;

        let f = &self.f;
        let (mut a, mut b) = (self.a, self.b);
        let mut y = a + invphi2 * (b - a);
        let mut z = a + invphi * (b - a);
        let mut f_y = f(y);
        let mut f_z = f(z);
        let mut k = 0;

        while b - a > self.precision {
            let width = b - a;
            if f_z < f_y {
                a = y;
                y = z;
                f_y = f_z;
                z = a + invphi * (b - a);
                f_z = f(z);
            } else {
                b = z;
                z = y;
                f_z = f_y;
                y = a + invphi2 * (b - a);
                f_y = f(y);
            }
            k += 1;
            if b - a >= width {
                break;
            }
        }
        trace!(iterations = k, "golden section done");
        self.iterations = Some(k);
        let mid = (a + b) / 2.;
        LineMinimum { x: mid, fx: f(mid) }
    }

    fn iterations(&self) -> Option<usize> {
        self.iterations
    }

    fn convergence_rate(&self) -> Result<f64> {
        let k = self.iterations.ok_or(OptimizeError::NotYetRun)?;
        let invphi = (5.0_f64.sqrt() - 1.) / 2.;
        // no contraction if the interval was already within precision
        Ok(invphi.powf(k.saturating_sub(1) as f64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn golden_quadratic() {
        let func = |x: f64| x.powi(2);
        let min = GoldenSectionSearch::new(1., 2., 1e-4, func).solve();
        assert_abs_diff_eq!(min.x, 1.0, epsilon = 1e-4);

        let min = GoldenSectionSearch::new(-2., -3., 1e-4, func).solve();
        assert_abs_diff_eq!(min.x, -2.0, epsilon = 1e-4);

        let min = GoldenSectionSearch::new(-2., 3., 1e-4, func).solve();
        assert_abs_diff_eq!(min.x, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn golden_quadratic2() {
        let xtrue = 1.5;
        let func = |x: f64| (x - xtrue).powi(2) - 0.8;
        let min = GoldenSectionSearch::new(-15., 15., 1e-8, func).solve();
        assert_abs_diff_eq!(min.x, xtrue, epsilon = 1e-7);
        assert_abs_diff_eq!(min.fx, -0.8, epsilon = 1e-12);
    }

    #[test]
    fn golden_convergence_rate() {
        let mut search = GoldenSectionSearch::new(0., 1., 1e-3, |x: f64| (x - 0.3).abs());
        assert_eq!(search.convergence_rate(), Err(OptimizeError::NotYetRun));
        search.solve();
        // 0.618^15 = 7.4e-4 is the first power below 1e-3
        assert_eq!(search.iterations(), Some(15));
        let rate = search.convergence_rate().unwrap();
        assert_abs_diff_eq!(rate, 0.618_034f64.powi(14), epsilon = 1e-6);
    }

    #[test]
    fn golden_interval_within_precision() {
        let mut search = GoldenSectionSearch::new(0.5, 0.5 + 1e-9, 1e-4, |x: f64| x.powi(2));
        let min = search.solve();
        assert_eq!(search.iterations(), Some(0));
        assert_abs_diff_eq!(min.x, 0.5, epsilon = 1e-8);
        assert_eq!(search.convergence_rate(), Ok(1.));
    }
}
