//! One Dimensional Minimization
//!
//! Bracketing and line searches for scalar functions $`f: \mathbb{R} \to \mathbb{R}`$.
//!
//! - [`Svenn`] finds an interval containing a minimum
//! - interval searches shrink a given interval, they share the [`LineSearch`] trait:
//!   [`BisectionSearch`], [`GoldenSectionSearch`], [`FibonacciSearch`]
//! - interpolation searches bracket themselves from a start point:
//!   [`QuadraticInterpolation`], [`CubicInterpolation`] (needs $`f'`$)
//!
//! The multidimensional minimizers select one of these through a
//! [`LineSearchConfig`].

mod bisection;
pub use bisection::*;
mod bracket;
pub use bracket::*;
mod fibonacci;
pub use fibonacci::*;
mod golden;
pub use golden::*;
mod interp;
pub use interp::*;

use crate::error::{OptimizeError, Result};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Location and value of a one dimensional minimum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMinimum {
    pub x: f64,
    pub fx: f64,
}

/// Common interface of the interval searches
///
/// A search is built from an interval $`[a, b]`$, a precision and the
/// function, then [`solve`](LineSearch::solve)d once.
pub trait LineSearch {
    /// Shrink the interval until it is no wider than the precision
    fn solve(&mut self) -> LineMinimum;

    /// Number of iterations recorded by the last [`solve`](LineSearch::solve)
    fn iterations(&self) -> Option<usize>;

    /// Theoretical contraction of the interval achieved by the last run
    ///
    /// Fails with [`OptimizeError::NotYetRun`] before the search has run.
    fn convergence_rate(&self) -> Result<f64>;
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Choice of line search for the multidimensional minimizers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum LineSearchMethod {
    /// [`BisectionSearch`] on a [`Svenn`] bracket
    Bisection,
    /// [`GoldenSectionSearch`] on a [`Svenn`] bracket
    GoldenSection,
    /// [`FibonacciSearch`] on a [`Svenn`] bracket
    Fibonacci,
    /// [`QuadraticInterpolation`] from the start point
    QuadraticInterpolation,
}

impl FromStr for LineSearchMethod {
    type Err = OptimizeError;

    /// Accepts e.g. `"bisection"`, `"break in two"`, `"golden-section"`,
    /// `"golden ratio"`, `"fibonacci"`, `"quadratic_interpolation"` or
    /// `"square interpolation"`, ignoring case.
    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim().to_ascii_lowercase().replace(&['-', '_'][..], " ");
        match name.as_str() {
            "bisection" | "break in two" => Ok(Self::Bisection),
            "golden section" | "golden ratio" => Ok(Self::GoldenSection),
            "fibonacci" => Ok(Self::Fibonacci),
            "quadratic interpolation" | "square interpolation" => Ok(Self::QuadraticInterpolation),
            _ => Err(OptimizeError::UnknownLineSearch(s.to_string())),
        }
    }
}

impl fmt::Display for LineSearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bisection => "bisection",
            Self::GoldenSection => "golden-section",
            Self::Fibonacci => "fibonacci",
            Self::QuadraticInterpolation => "quadratic-interpolation",
        };
        f.write_str(name)
    }
}

/// Line search selection and tolerances
///
/// Parameters
/// ----------
/// - __method:__                 which search to run
/// - __bracket_step:__           initial step of [`Svenn`] bracketing
/// - __precision:__              final interval width of the interval searches
/// - __fibonacci_offset:__       offset of the last [`FibonacciSearch`] point
/// - __interpolation_step:__     sampling step of [`QuadraticInterpolation`]
/// - __interpolation_delta:__    relative position tolerance of [`QuadraticInterpolation`]
/// - __interpolation_eps:__      relative value tolerance of [`QuadraticInterpolation`]
/// - __interpolation_max_iterations:__ parabola fits before giving up
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineSearchConfig {
    pub method: LineSearchMethod,
    pub bracket_step: f64,
    pub precision: f64,
    pub fibonacci_offset: f64,
    pub interpolation_step: f64,
    pub interpolation_delta: f64,
    pub interpolation_eps: f64,
    pub interpolation_max_iterations: usize,
}

impl Default for LineSearchConfig {
    fn default() -> Self {
        Self {
            method: LineSearchMethod::GoldenSection,
            bracket_step: 1e-4,
            precision: 1e-7,
            fibonacci_offset: 1e-7,
            interpolation_step: 1e-3,
            interpolation_delta: 1e-4,
            interpolation_eps: 1e-5,
            interpolation_max_iterations: 1000,
        }
    }
}

impl LineSearchConfig {
    /// Default tolerances for the given method
    pub fn with_method(method: LineSearchMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("bracket_step", self.bracket_step),
            ("precision", self.precision),
            ("fibonacci_offset", self.fibonacci_offset),
            ("interpolation_step", self.interpolation_step),
            ("interpolation_delta", self.interpolation_delta),
            ("interpolation_eps", self.interpolation_eps),
        ];
        match positive.iter().find(|(_, value)| !(*value > 0.)) {
            Some((name, value)) => Err(OptimizeError::InvalidConfig(format!(
                "line search {} must be positive, got {}",
                name, value
            ))),
            None => Ok(()),
        }
    }

    /// Minimize `f` starting the search at `start`
    ///
    /// Interval methods first bracket the minimum with [`Svenn`] from
    /// `start`, quadratic interpolation samples around `start` itself.
    pub fn minimize(&self, f: impl Fn(f64) -> f64, start: f64) -> Result<LineMinimum> {
        let bracket = || Svenn::new(start, self.bracket_step, &f).solve();
        let minimum = match self.method {
            LineSearchMethod::Bisection => {
                let (a, b) = bracket()?;
                BisectionSearch::new(a, b, self.precision, &f).solve()
            }
            LineSearchMethod::GoldenSection => {
                let (a, b) = bracket()?;
                GoldenSectionSearch::new(a, b, self.precision, &f).solve()
            }
            LineSearchMethod::Fibonacci => {
                let (a, b) = bracket()?;
                FibonacciSearch::new(a, b, self.precision, &f)
                    .offset(self.fibonacci_offset)
                    .solve()
            }
            LineSearchMethod::QuadraticInterpolation => QuadraticInterpolation::new(
                start,
                self.interpolation_step,
                self.interpolation_delta,
                self.interpolation_eps,
                &f,
            )
            .max_iterations(self.interpolation_max_iterations)
            .solve()?,
        };
        Ok(minimum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// $`100(x^2 - 2)^3 + (x - 1)^2 - |10 + x|`$, minimum near 0.001249
    fn sextic(x: f64) -> f64 {
        100. * (x.powi(2) - 2.).powi(3) + (x - 1.).powi(2) - (10. + x).abs()
    }

    fn sextic_derivative(x: f64) -> f64 {
        600. * x * (x.powi(2) - 2.).powi(2) + 2. * (x - 1.) - (10. + x).signum()
    }

    const SEXTIC_MIN: f64 = 0.001_248_96;

    #[test]
    fn parse_methods() {
        assert_eq!("bisection".parse(), Ok(LineSearchMethod::Bisection));
        assert_eq!("break in two".parse(), Ok(LineSearchMethod::Bisection));
        assert_eq!("Golden Ratio".parse(), Ok(LineSearchMethod::GoldenSection));
        assert_eq!("golden-section".parse(), Ok(LineSearchMethod::GoldenSection));
        assert_eq!("fibonacci".parse(), Ok(LineSearchMethod::Fibonacci));
        assert_eq!(
            "square interpolation".parse(),
            Ok(LineSearchMethod::QuadraticInterpolation)
        );
        assert_eq!(
            "newton".parse::<LineSearchMethod>(),
            Err(OptimizeError::UnknownLineSearch("newton".into()))
        );
        for method in &[
            LineSearchMethod::Bisection,
            LineSearchMethod::GoldenSection,
            LineSearchMethod::Fibonacci,
            LineSearchMethod::QuadraticInterpolation,
        ] {
            assert_eq!(method.to_string().parse(), Ok(*method));
        }
    }

    #[test]
    fn invalid_tolerances() {
        let config = LineSearchConfig {
            precision: 0.,
            ..LineSearchConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(OptimizeError::InvalidConfig(_))
        ));
        assert!(LineSearchConfig::default().validate().is_ok());
    }

    #[test]
    fn sextic_interval_searches_agree() {
        let precision = 1e-6;
        let (a, b) = Svenn::new(-2., 0.005, sextic).solve().unwrap();
        assert!(a < SEXTIC_MIN && SEXTIC_MIN < b);

        let mut searches: Vec<Box<dyn LineSearch>> = vec![
            Box::new(BisectionSearch::new(a, b, precision, sextic)),
            Box::new(GoldenSectionSearch::new(a, b, precision, sextic)),
            Box::new(FibonacciSearch::new(a, b, precision, sextic)),
        ];
        for search in searches.iter_mut() {
            assert_eq!(search.convergence_rate(), Err(OptimizeError::NotYetRun));
            let min = search.solve();
            assert_abs_diff_eq!(min.x, SEXTIC_MIN, epsilon = 1e-4);
            assert_abs_diff_eq!(min.fx, sextic(SEXTIC_MIN), epsilon = 1e-4);
            let rate = search.convergence_rate().unwrap();
            assert!(rate > 0. && rate < 1.);
        }

        let quadratic = QuadraticInterpolation::new(0., 0.005, 1e-6, 1e-6, sextic)
            .solve()
            .unwrap();
        assert_abs_diff_eq!(quadratic.x, SEXTIC_MIN, epsilon = 1e-4);

        let cubic = CubicInterpolation::new(-2., 0.005, 1e-4, 1e-4, sextic, sextic_derivative)
            .solve()
            .unwrap();
        assert_abs_diff_eq!(cubic.x, SEXTIC_MIN, epsilon = 1e-4);
    }

    #[test]
    fn config_minimizes_with_every_method() {
        let f = |x: f64| (x - 0.7).powi(2) + 1.;
        for method in &[
            LineSearchMethod::Bisection,
            LineSearchMethod::GoldenSection,
            LineSearchMethod::Fibonacci,
            LineSearchMethod::QuadraticInterpolation,
        ] {
            let min = LineSearchConfig::with_method(*method).minimize(f, 0.).unwrap();
            assert_abs_diff_eq!(min.x, 0.7, epsilon = 1e-4);
            assert_abs_diff_eq!(min.fx, 1., epsilon = 1e-6);
        }
    }

    #[test]
    fn config_reports_bracketing_failure() {
        let config = LineSearchConfig::with_method(LineSearchMethod::Bisection);
        assert_eq!(
            config.minimize(|x| -x * x, 0.),
            Err(OptimizeError::NotUnimodal { start: 0. })
        );
    }
}
