//! Objective, gradient and result types shared by the minimizers

use crate::error::{LinalgError, OptimizeError, Result};
use crate::linalg::Vector;
use std::fmt;

/// Gradient of an objective as one partial derivative per coordinate
///
/// ```
/// use ndarray_minimize::problem::Gradient;
/// use ndarray_minimize::linalg::Vector;
///
/// // f(x, y) = x^2 + 3y^2
/// let grad = Gradient::new()
///     .partial(|x: &Vector| 2. * x[0])
///     .partial(|x: &Vector| 6. * x[1]);
/// let g = grad.evaluate(&Vector::from(vec![1., 2.])).unwrap();
/// assert_eq!(g, Vector::from(vec![2., 12.]));
/// ```
pub struct Gradient<'a> {
    partials: Vec<Box<dyn Fn(&Vector) -> f64 + 'a>>,
}

impl<'a> Gradient<'a> {
    pub fn new() -> Self {
        Self {
            partials: Vec::new(),
        }
    }

    /// Append the partial derivative for the next coordinate
    pub fn partial(mut self, partial: impl Fn(&Vector) -> f64 + 'a) -> Self {
        self.partials.push(Box::new(partial));
        self
    }

    pub fn from_partials(partials: Vec<Box<dyn Fn(&Vector) -> f64 + 'a>>) -> Self {
        Self { partials }
    }

    /// Number of partial derivatives, the dimension of the problem
    pub fn dimension(&self) -> usize {
        self.partials.len()
    }

    /// $`\nabla f(x)`$
    pub fn evaluate(&self, x: &Vector) -> Result<Vector, LinalgError> {
        if x.dimension() != self.dimension() {
            return Err(LinalgError::DimensionMismatch {
                expected: self.dimension(),
                found: x.dimension(),
            });
        }
        Ok(self.partials.iter().map(|partial| partial(x)).collect::<Vec<_>>().into())
    }
}

impl Default for Gradient<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Gradient<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gradient")
            .field("dimension", &self.dimension())
            .finish()
    }
}

/// Outcome of a multidimensional minimization
///
/// Running out of iterations is not an error: the best iterate found so
/// far is returned with `converged` set to false.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Best point found
    pub x: Vector,
    /// Objective value at `x`
    pub fx: f64,
    pub iterations: usize,
    /// Whether the stopping test was met, as opposed to the iteration cap
    pub converged: bool,
}

/// Do nothing callback for [`solve_with`](crate::smooth::SteepestDescent::solve_with)
/// style methods
pub fn nop(_x: &Vector, _fx: f64, _iter: usize) {}

/// Reject a start point whose dimension disagrees with the gradient
pub(crate) fn check_start(gradient: &Gradient<'_>, x0: &Vector) -> Result<()> {
    if gradient.dimension() == x0.dimension() {
        Ok(())
    } else {
        Err(OptimizeError::Linalg(LinalgError::DimensionMismatch {
            expected: gradient.dimension(),
            found: x0.dimension(),
        }))
    }
}

/// Reject tolerances that are zero, negative or NaN
pub(crate) fn check_positive(what: &str, values: &[(&str, f64)]) -> Result<()> {
    match values.iter().find(|(_, value)| !(*value > 0.)) {
        Some((name, value)) => Err(OptimizeError::InvalidConfig(format!(
            "{} {} must be positive, got {}",
            what, name, value
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_of_quadratic() {
        let grad = Gradient::new()
            .partial(|x: &Vector| 2. * x[0] + x[1])
            .partial(|x: &Vector| x[0]);
        assert_eq!(grad.dimension(), 2);
        let g = grad.evaluate(&Vector::from(vec![1., -1.])).unwrap();
        assert_eq!(g, Vector::from(vec![1., 1.]));
    }

    #[test]
    fn gradient_from_boxed_partials() {
        let scale = 3.;
        let partials: Vec<Box<dyn Fn(&Vector) -> f64>> =
            vec![Box::new(move |x: &Vector| scale * x[0]), Box::new(|_: &Vector| 1.)];
        let grad = Gradient::from_partials(partials);
        let g = grad.evaluate(&Vector::from(vec![2., 0.])).unwrap();
        assert_eq!(g.to_vec(), vec![6., 1.]);
    }

    #[test]
    fn gradient_dimension_mismatch() {
        let grad = Gradient::new().partial(|x: &Vector| x[0]);
        assert_eq!(
            grad.evaluate(&Vector::zeros(2)),
            Err(LinalgError::DimensionMismatch {
                expected: 1,
                found: 2
            })
        );
        assert!(matches!(
            check_start(&grad, &Vector::zeros(3)),
            Err(OptimizeError::Linalg(LinalgError::DimensionMismatch { .. }))
        ));
    }

    #[test]
    fn positive_tolerances() {
        assert!(check_positive("test", &[("eps", 1e-3)]).is_ok());
        assert_eq!(
            check_positive("test", &[("eps", 1e-3), ("delta", f64::NAN)])
                .unwrap_err()
                .to_string(),
            "invalid configuration: test delta must be positive, got NaN"
        );
    }
}
