//! Private Module

use super::{ordered, LineMinimum, LineSearch};
use crate::error::{OptimizeError, Result};
use tracing::trace;

/// Fibonacci Search
///
/// The optimal interval search for a fixed number of function
/// evaluations. The number of iterations $`n`$ is fixed up front as the
/// smallest index with $`F_n \geq (b - a)/\varepsilon`$, where
/// $`F_0 = F_1 = 1`$, and the interior points divide the interval in
/// ratios of consecutive Fibonacci numbers.
///
/// Algorithm
/// ---------
/// ```math
/// \begin{aligned}
/// y_0 &= a + \frac{F_{n-2}}{F_n}(b - a), \quad z_0 = a + \frac{F_{n-1}}{F_n}(b - a) \\
/// f(z_k) < f(y_k) &\Rightarrow a = y_k, \; y_{k+1} = z_k, \; z_{k+1} = a + \frac{F_{n-k-2}}{F_{n-k-1}}(b - a) \\
/// \text{otherwise} &\Rightarrow b = z_k, \; z_{k+1} = y_k, \; y_{k+1} = a + \frac{F_{n-k-3}}{F_{n-k-1}}(b - a)
/// \end{aligned}
/// ```
/// At $`k = n - 3`$ both interior points coincide, so the last
/// comparison is made between $`z`$ and $`z + \delta`$ for a small offset
/// $`\delta`$ (the precision unless set with [`offset`](Self::offset)).
/// The interval has then contracted by $`R = 1/F_n`$.
pub struct FibonacciSearch<F> {
    a: f64,
    b: f64,
    precision: f64,
    offset: f64,
    f: F,
    iterations: Option<usize>,
    fib_n: Option<f64>,
}

impl<F> FibonacciSearch<F>
where
    F: Fn(f64) -> f64,
{
    pub fn new(a: f64, b: f64, precision: f64, f: F) -> Self {
        let (a, b) = ordered(a, b);
        Self {
            a,
            b,
            precision,
            offset: precision,
            f,
            iterations: None,
            fib_n: None,
        }
    }

    /// Offset of the final comparison point
    pub fn offset(self, offset: f64) -> Self {
        Self { offset, ..self }
    }
}

/// Fibonacci numbers $`F_0 = F_1 = 1`$ up to the first one reaching `bound`
fn fibonacci_up_to(bound: f64) -> Vec<f64> {
    let mut numbers = vec![1.];
    while numbers[numbers.len() - 1] < bound {
        let n = numbers.len();
        let next = if n < 2 {
            1.
        } else {
            numbers[n - 1] + numbers[n - 2]
        };
        numbers.push(next);
    }
    numbers
}

impl<F> LineSearch for FibonacciSearch<F>
where
    F: Fn(f64) -> f64,
{
    fn solve(&mut self) -> LineMinimum {
        let f = &self.f;
        let (mut a, mut b) = (self.a, self.b);
        let numbers = fibonacci_up_to((b - a) / self.precision);
        let n = numbers.len() as isize - 1;
        // indices below zero stand for 1
        let fib = |i: isize| if i < 0 { 1. } else { numbers[i as usize] };

        let mut y = a + (b - a) * fib(n - 2) / fib(n);
        let mut z = a + (b - a) * fib(n - 1) / fib(n);
        let mut f_y = f(y);
        let mut f_z = f(z);
        let mut k: isize = 0;
        loop {
            if f_z < f_y {
                a = y;
                y = z;
                f_y = f_z;
                z = a + (b - a) * fib(n - k - 2) / fib(n - k - 1);
                f_z = f(z);
            } else {
                b = z;
                z = y;
                f_z = f_y;
                y = a + (b - a) * fib(n - k - 3) / fib(n - k - 1);
                f_y = f(y);
            }
            if k >= n - 3 {
                // points coincide: decide the last half with an offset
                y = z;
                f_y = f_z;
                z = y + self.offset;
                f_z = f(z);
                if f_z < f_y {
                    a = y;
                } else {
                    b = z;
                }
                break;
            }
            k += 1;
        }

        trace!(iterations = k, fib_index = n, "fibonacci done");
        self.iterations = Some(k as usize);
        self.fib_n = Some(fib(n));
        let mid = (a + b) / 2.;
        LineMinimum { x: mid, fx: f(mid) }
    }

    fn iterations(&self) -> Option<usize> {
        self.iterations
    }

    fn convergence_rate(&self) -> Result<f64> {
        let fib_n = self.fib_n.ok_or(OptimizeError::NotYetRun)?;
        Ok(1. / fib_n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fibonacci_numbers() {
        assert_eq!(fibonacci_up_to(0.5), vec![1.]);
        assert_eq!(fibonacci_up_to(7.), vec![1., 1., 2., 3., 5., 8.]);
        assert_eq!(fibonacci_up_to(8.), vec![1., 1., 2., 3., 5., 8.]);
    }

    #[test]
    fn fibonacci_quadratic() {
        let mut search = FibonacciSearch::new(-3., 5., 1e-6, |x: f64| (x - 1.5).powi(2));
        let min = search.solve();
        assert_abs_diff_eq!(min.x, 1.5, epsilon = 1e-5);
        assert_abs_diff_eq!(min.fx, 0., epsilon = 1e-10);
    }

    #[test]
    fn fibonacci_asymmetric() {
        let min = FibonacciSearch::new(0., 4., 1e-6, |x: f64| x.exp() - 3. * x)
            .offset(1e-7)
            .solve();
        assert_abs_diff_eq!(min.x, 3f64.ln(), epsilon = 1e-5);
    }

    #[test]
    fn fibonacci_convergence_rate() {
        let mut search = FibonacciSearch::new(0., 1., 0.01, |x: f64| (x - 0.8).powi(2));
        assert_eq!(search.convergence_rate(), Err(OptimizeError::NotYetRun));
        let min = search.solve();
        assert_abs_diff_eq!(min.x, 0.8, epsilon = 0.01);
        // F_11 = 144 is the first Fibonacci number above 100
        assert_abs_diff_eq!(search.convergence_rate().unwrap(), 1. / 144.);
        assert_eq!(search.iterations(), Some(8));
    }
}
