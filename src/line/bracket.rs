//! Private Module

use crate::error::{OptimizeError, Result};
use tracing::trace;

/// Svenn's bracketing method
///
/// Finds an interval $`[a, b]`$ containing a minimum of a unimodal
/// function by walking downhill from a start point with a step that
/// doubles every move.
///
/// Algorithm
/// ---------
/// ```math
/// \begin{aligned}
/// &\text{if } f(x_0 - t) \geq f(x_0) \leq f(x_0 + t): \text{return } [x_0 - t, x_0 + t] \\
/// &\Delta = \pm t \text{ toward the smaller value}, \quad x_1 = x_0 + \Delta \\
/// &x_{k+1} = x_k + 2^k \Delta \quad \text{while } f(x_{k+1}) < f(x_k) \\
/// &\text{return } [x_{k-1}, x_{k+1}]
/// \end{aligned}
/// ```
///
/// Parameters
/// ----------
/// - __start:__          start point $`x_0`$
/// - __step:__           initial step $`t > 0`$
/// - __f:__              function to bracket
/// - __max_expansions:__ number of step doublings before giving up,
///                       for functions unbounded below (default 64)
///
/// If the start point is larger than both neighbours the function is not
/// unimodal around it and [`OptimizeError::NotUnimodal`] is returned.
pub struct Svenn<F> {
    start: f64,
    step: f64,
    max_expansions: usize,
    f: F,
}

impl<F> Svenn<F>
where
    F: Fn(f64) -> f64,
{
    pub fn new(start: f64, step: f64, f: F) -> Self {
        Self {
            start,
            step: step.abs(),
            max_expansions: 64,
            f,
        }
    }

    pub fn max_expansions(self, max_expansions: usize) -> Self {
        Self {
            max_expansions,
            ..self
        }
    }

    /// Run the bracketing, returns `(a, b)` with `a < b`
    pub fn solve(&self) -> Result<(f64, f64)> {
        let f = &self.f;
        let t = self.step;
        let mut x = self.start;
        let mut a = x - t;
        let mut b = x + t;
        let (f1, f2, f3) = (f(a), f(x), f(b));

        if f2 <= f1 && f2 <= f3 {
            return Ok((a, b));
        }
        if f2 >= f1 && f2 >= f3 {
            return Err(OptimizeError::NotUnimodal { start: self.start });
        }

        // walk toward the smaller neighbour
        let (delta, mut fx) = if f3 < f2 {
            a = x;
            x += t;
            (t, f3)
        } else {
            b = x;
            x -= t;
            (-t, f1)
        };

        for k in 1..=self.max_expansions {
            let next = x + 2f64.powi(k as i32) * delta;
            let f_next = f(next);
            if f_next < fx {
                if delta > 0. {
                    a = x;
                } else {
                    b = x;
                }
                x = next;
                fx = f_next;
            } else {
                if delta > 0. {
                    b = next;
                } else {
                    a = next;
                }
                trace!(expansions = k, lower = a, upper = b, "bracket found");
                return Ok((a, b));
            }
        }
        Err(OptimizeError::BracketNotFound {
            start: self.start,
            expansions: self.max_expansions,
        })
    }
}
