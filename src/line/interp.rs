//! Private Module

use super::LineMinimum;
use crate::error::{OptimizeError, Result};
use tracing::trace;

/// Gap between `x` and `reference`, relative once $`|x_{ref}| > 1`$
fn relative_gap(x: f64, reference: f64) -> f64 {
    (x - reference).abs() / reference.abs().max(1.)
}

/// Powell's quadratic interpolation
///
/// Samples three points around a start point, fits a parabola through
/// them and moves toward its vertex until the vertex agrees with the best
/// sampled point.
///
/// Algorithm
/// ---------
/// 1. $`\alpha_2 = \alpha_1 + h`$, $`\alpha_3 = \alpha_1 + 2h`$ if
///    $`f(\alpha_2) < f(\alpha_1)`$ else $`\alpha_1 - 2h`$
/// 2. vertex of the parabola through the three sorted points
///    ```math
///    \bar\alpha = \alpha_2 - \frac{(\alpha_2 - \alpha_1)^2 (f_2 - f_3) - (\alpha_2 - \alpha_3)^2 (f_2 - f_1)}
///                     {2 \big((\alpha_2 - \alpha_1) (f_2 - f_3) - (\alpha_2 - \alpha_3) (f_2 - f_1)\big)}
///    ```
/// 3. stop when both $`|f_{min} - \bar f| / \max(|\bar f|, 1) <`$ eps and
///    $`|\alpha_{min} - \bar\alpha| / \max(|\bar\alpha|, 1) <`$ delta
/// 4. if $`\bar\alpha`$ lies within the sampled points keep the best of the
///    four points with its neighbours and go to 2, else restart at 1 from
///    $`\bar\alpha`$
///
/// A fit that is not convex (three collinear points or a parabola opening
/// downward) restarts sampling from the best point. The search also ends
/// at the best point once the sampled values only differ by rounding, or
/// the samples stop changing. Two collinear fits in a row fail with
/// [`OptimizeError::DegenerateInterpolation`]; running out of
/// `max_iterations` fits fails with
/// [`OptimizeError::LineSearchNotConverged`].
pub struct QuadraticInterpolation<F> {
    start: f64,
    step: f64,
    delta: f64,
    eps: f64,
    max_iterations: usize,
    f: F,
    iterations: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Sample {
    x: f64,
    fx: f64,
}

enum Fit {
    Vertex(f64),
    Concave,
    Collinear,
}

/// Fit a parabola through three samples sorted by abscissa
///
/// The vertex is taken relative to the middle sample so that the values
/// only enter through their differences.
fn fit_parabola(p: &[Sample; 3]) -> Fit {
    let [Sample { x: a1, fx: f1 }, Sample { x: a2, fx: f2 }, Sample { x: a3, fx: f3 }] = *p;
    let (left, right) = (a2 - a1, a2 - a3);
    let (rise_left, rise_right) = (f2 - f1, f2 - f3);
    // negative exactly when the parabola opens upward
    let denominator = left * rise_right - right * rise_left;
    if denominator == 0. {
        return Fit::Collinear;
    }
    if !(denominator < 0.) {
        return Fit::Concave;
    }
    let numerator = left.powi(2) * rise_right - right.powi(2) * rise_left;
    Fit::Vertex(a2 - numerator / (2. * denominator))
}

/// Relative spread of the sampled values within which they cannot be told apart
const RESOLUTION: f64 = 64. * f64::EPSILON;

/// Whether the values only differ by rounding
fn at_resolution(points: &[Sample]) -> bool {
    let (low, high) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), p| {
        (low.min(p.fx), high.max(p.fx))
    });
    high - low <= RESOLUTION * low.abs().max(high.abs())
}

fn best(points: &[Sample]) -> Sample {
    points
        .iter()
        .copied()
        .fold(points[0], |acc, p| if p.fx < acc.fx { p } else { acc })
}

/// The best of the samples and the vertex, with its nearest neighbours
fn around_best(points: &[Sample; 3], vertex: Sample) -> [Sample; 3] {
    let mut candidates = points.to_vec();
    if candidates.iter().all(|p| p.x != vertex.x) {
        candidates.push(vertex);
    }
    candidates.sort_by(|p, q| p.x.total_cmp(&q.x));
    let best_index = (0..candidates.len())
        .fold(0, |acc, i| if candidates[i].fx < candidates[acc].fx { i } else { acc });
    let first = best_index.saturating_sub(1).min(candidates.len() - 3);
    [candidates[first], candidates[first + 1], candidates[first + 2]]
}

impl<F> QuadraticInterpolation<F>
where
    F: Fn(f64) -> f64,
{
    /// Parameters
    /// ----------
    /// - __start:__ first sample point $`\alpha_1`$
    /// - __step:__  sampling step $`h`$
    /// - __delta:__ relative tolerance on the position of the minimum
    /// - __eps:__   relative tolerance on the value of the minimum
    /// - __f:__     function to minimize
    pub fn new(start: f64, step: f64, delta: f64, eps: f64, f: F) -> Self {
        Self {
            start,
            step: step.abs(),
            delta,
            eps,
            max_iterations: 1000,
            f,
            iterations: None,
        }
    }

    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    /// Number of parabola fits of the last run
    pub fn iterations(&self) -> Option<usize> {
        self.iterations
    }

    fn sample(&self, x: f64) -> Sample {
        Sample { x, fx: (self.f)(x) }
    }

    /// Three sorted samples around `start`
    fn bracket(&self, start: f64) -> [Sample; 3] {
        let p1 = self.sample(start);
        let p2 = self.sample(start + self.step);
        let p3 = if p2.fx < p1.fx {
            self.sample(start + 2. * self.step)
        } else {
            self.sample(start - 2. * self.step)
        };
        let mut points = [p1, p2, p3];
        points.sort_by(|p, q| p.x.total_cmp(&q.x));
        points
    }

    fn found(&mut self, fits: usize, found: Sample) -> Result<LineMinimum> {
        trace!(fits = fits, x = found.x, "quadratic interpolation converged");
        self.iterations = Some(fits);
        Ok(LineMinimum {
            x: found.x,
            fx: found.fx,
        })
    }

    pub fn solve(&mut self) -> Result<LineMinimum> {
        let mut points = self.bracket(self.start);
        let mut collinear = false;
        for fit in 1..=self.max_iterations {
            let lowest = best(&points);
            let next = match fit_parabola(&points) {
                Fit::Collinear if collinear => {
                    self.iterations = Some(fit);
                    return Err(OptimizeError::DegenerateInterpolation { at: lowest.x });
                }
                Fit::Collinear => {
                    collinear = true;
                    points = self.bracket(lowest.x);
                    continue;
                }
                Fit::Concave => {
                    collinear = false;
                    if at_resolution(&points) {
                        return self.found(fit, lowest);
                    }
                    self.bracket(lowest.x)
                }
                Fit::Vertex(x) => {
                    collinear = false;
                    let vertex = self.sample(x);
                    let candidate = best(&[lowest, vertex]);
                    if relative_gap(lowest.fx, vertex.fx) < self.eps
                        && relative_gap(lowest.x, vertex.x) < self.delta
                    {
                        return self.found(fit, candidate);
                    }
                    if at_resolution(&[points[0], points[1], points[2], vertex]) {
                        return self.found(fit, candidate);
                    }
                    if points[0].x <= x && x <= points[2].x {
                        around_best(&points, vertex)
                    } else {
                        self.bracket(x)
                    }
                }
            };
            if next == points {
                // rounding keeps reproducing the same samples
                return self.found(fit, best(&points));
            }
            points = next;
        }
        self.iterations = Some(self.max_iterations);
        Err(OptimizeError::LineSearchNotConverged {
            iterations: self.max_iterations,
        })
    }
}

/// Davidon's cubic interpolation
///
/// Uses function values and derivatives. The minimum is first bracketed
/// by a sign change of $`f'`$ walking downhill from the start point with
/// steps $`2^k h`$, then each iteration fits a cubic through the ends
/// $`\alpha_1, \alpha_2`$ of the bracket and takes its stationary point
///
/// ```math
/// \begin{aligned}
/// z &= \frac{3 (f_1 - f_2)}{\alpha_2 - \alpha_1} + f'_1 + f'_2, \quad
/// w = \pm\sqrt{z^2 - f'_1 f'_2} \\
/// \mu &= \frac{f'_2 + w - z}{f'_2 - f'_1 + 2w}, \quad
/// \bar\alpha = \alpha_2 - \mu (\alpha_2 - \alpha_1), \; \mu \in [0, 1]
/// \end{aligned}
/// ```
///
/// halving toward $`\alpha_1`$ while $`f(\bar\alpha) > f_1`$. It stops
/// when $`|f'(\bar\alpha)| \leq`$ eps and
/// $`|\bar\alpha - \alpha_1| / \max(|\bar\alpha|, 1) \leq`$ delta, otherwise the end
/// of the bracket with the same derivative sign is replaced.
pub struct CubicInterpolation<F, D> {
    start: f64,
    step: f64,
    delta: f64,
    eps: f64,
    max_iterations: usize,
    f: F,
    df: D,
    iterations: Option<usize>,
}

impl<F, D> CubicInterpolation<F, D>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    pub fn new(start: f64, step: f64, delta: f64, eps: f64, f: F, df: D) -> Self {
        Self {
            start,
            step: step.abs(),
            delta,
            eps,
            max_iterations: 1000,
            f,
            df,
            iterations: None,
        }
    }

    pub fn max_iterations(self, max_iterations: usize) -> Self {
        Self {
            max_iterations,
            ..self
        }
    }

    pub fn iterations(&self) -> Option<usize> {
        self.iterations
    }

    /// Bracket a sign change of the derivative, returns `(a1, a2)` with
    /// the descent direction at `a1` pointing toward `a2`.
    fn bracket(&self) -> Result<(f64, f64)> {
        const MAX_EXPANSIONS: i32 = 64;
        let df = &self.df;
        let mut previous = self.start;
        let mut d_previous = df(previous);
        let sign = if d_previous < 0. { 1. } else { -1. };
        for k in 0..MAX_EXPANSIONS {
            let next = previous + sign * 2f64.powi(k) * self.step;
            let d_next = df(next);
            if d_previous * d_next <= 0. {
                return Ok((previous, next));
            }
            previous = next;
            d_previous = d_next;
        }
        Err(OptimizeError::BracketNotFound {
            start: self.start,
            expansions: MAX_EXPANSIONS as usize,
        })
    }

    pub fn solve(&mut self) -> Result<LineMinimum> {
        let (f, df) = (&self.f, &self.df);
        let found = |x: f64| LineMinimum { x, fx: f(x) };
        if df(self.start) == 0. {
            self.iterations = Some(0);
            return Ok(found(self.start));
        }
        let (mut a1, mut a2) = self.bracket()?;

        for iter in 1..=self.max_iterations {
            let (f1, f2) = (f(a1), f(a2));
            let (d1, d2) = (df(a1), df(a2));
            if d1 == 0. || a1 == a2 {
                self.iterations = Some(iter);
                return Ok(found(a1));
            }
            if d2 == 0. {
                self.iterations = Some(iter);
                return Ok(found(a2));
            }

            let z = 3. * (f1 - f2) / (a2 - a1) + d1 + d2;
            let mut w = (z.powi(2) - d1 * d2).sqrt();
            if a1 > a2 {
                w = -w;
            }
            let mu = (d2 + w - z) / (d2 - d1 + 2. * w);
            if !mu.is_finite() {
                self.iterations = Some(iter);
                return Err(OptimizeError::DegenerateInterpolation { at: a1 });
            }
            let mut alpha = if mu < 0. {
                a2
            } else if mu <= 1. {
                a2 - mu * (a2 - a1)
            } else {
                a1
            };

            let mut f_alpha = f(alpha);
            let mut halvings = 0;
            while f_alpha > f1 {
                halvings += 1;
                if halvings > 64 {
                    alpha = a1;
                    f_alpha = f1;
                    break;
                }
                alpha -= (alpha - a1) / 2.;
                f_alpha = f(alpha);
            }

            let d = df(alpha);
            if d == 0. || (d.abs() <= self.eps && relative_gap(a1, alpha) <= self.delta) {
                trace!(iterations = iter, x = alpha, "cubic interpolation converged");
                self.iterations = Some(iter);
                return Ok(LineMinimum {
                    x: alpha,
                    fx: f_alpha,
                });
            }
            if d * d1 < 0. {
                a2 = a1;
                a1 = alpha;
            } else if d * d2 < 0. {
                a1 = alpha;
            }
        }
        self.iterations = Some(self.max_iterations);
        Err(OptimizeError::LineSearchNotConverged {
            iterations: self.max_iterations,
        })
    }
}
