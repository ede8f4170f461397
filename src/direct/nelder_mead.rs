//! Private Module

use crate::error::{OptimizeError, Result};
use crate::linalg::Vector;
use crate::problem::{check_positive, nop, Solution};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Configuration of [`NelderMead`]
///
/// Parameters
/// ----------
/// - __edge:__           edge length of the initial regular simplex
/// - __precision:__      bound on the best vertex displacement and the
///                       spread of the vertex values
/// - __reflection:__     $`\alpha`$, reflection coefficient
/// - __contraction:__    $`\beta`$, contraction coefficient
/// - __expansion:__      $`\gamma`$, expansion coefficient
/// - __shrink:__         $`m`$, factor of the shrink toward the best vertex
/// - __min_angle:__      $`\theta`$, smallest tolerated angle of the simplex
/// - __restart_period:__ iterations between two degeneracy checks
/// - __max_iterations:__ maximum number of iterations
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NelderMeadConfig {
    pub edge: f64,
    pub precision: f64,
    pub reflection: f64,
    pub contraction: f64,
    pub expansion: f64,
    pub shrink: f64,
    pub min_angle: f64,
    pub restart_period: usize,
    pub max_iterations: usize,
}

impl Default for NelderMeadConfig {
    fn default() -> Self {
        Self {
            edge: 0.5,
            precision: 1e-8,
            reflection: 1.,
            contraction: 0.5,
            expansion: 2.,
            shrink: 0.5,
            min_angle: 0.01,
            restart_period: 10,
            max_iterations: 50_000,
        }
    }
}

/// The Nelder–Mead method
///
/// Also known as the downhill simplex method, amoeba method, or polytope method.
/// This well-known method requires no gradients, but will generally be slower
/// than those methods that do. Note also, that while this method has seen
/// much emprical success in applications, there is not much theory
/// desribing when and if this method will converge to a minima. See
/// [Wikipedia](https://en.wikipedia.org/wiki/Nelder%E2%80%93Mead_method)
/// for more info.
///
/// Algorithm
/// ---------
/// Starts from a regular simplex of $`n + 1`$ vertices with one vertex at
/// $`x_0`$. With $`x_h`$ the worst vertex and $`x_c`$ the centroid of the
/// others, each iteration tries the reflection
/// $`x_r = x_c + \alpha (x_c - x_h)`$ and then
///
/// - $`f(x_r) < f_{best}`$: expansion $`x_c + \gamma (x_c - x_h)`$, kept if it beats $`x_r`$
/// - $`f(x_r) \le f_{second\ worst}`$: accept $`x_r`$
/// - $`f(x_r) \le f(x_h)`$: outside contraction $`x_c + \beta (x_r - x_c)`$
/// - otherwise: inside contraction $`x_c + \beta (x_h - x_c)`$
///
/// and shrinks every vertex toward the best by $`m`$ when a contraction
/// fails. Every `restart_period` iterations a simplex whose smallest angle
/// fell below $`\theta`$ is rebuilt around the best vertex.
///
/// Stops when the best vertex moved by at most `precision` and
/// ```math
/// \sqrt{\frac{1}{n + 1} \sum_{i=0}^{n} (f(x_i) - f_{best})^2} \le \text{precision}
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NelderMead {
    pub config: NelderMeadConfig,
}

/// Vertices of a regular simplex with edge `edge`, the last one is `x0`
fn regular_simplex(x0: &Vector, edge: f64) -> Result<Vec<Vector>> {
    let n = x0.dimension() as f64;
    let delta1 = edge * ((n + 1.).sqrt() + n - 1.) / (n * 2_f64.sqrt());
    let delta2 = edge * ((n + 1.).sqrt() - 1.) / (n * 2_f64.sqrt());
    let shifted = x0.add_scalar(delta2);
    let mut simplex = (0..x0.dimension())
        .map(|i| shifted.add_at(i, delta1 - delta2))
        .collect::<Result<Vec<_>, _>>()?;
    simplex.push(x0.clone());
    Ok(simplex)
}

/// Smallest angle at any vertex between the edges to two other vertices
///
/// A collapsed edge counts as a zero angle.
fn min_angle(simplex: &[Vector]) -> Result<f64> {
    let mut min = std::f64::consts::PI;
    for (k, apex) in simplex.iter().enumerate() {
        for i in 0..simplex.len() {
            for j in (i + 1)..simplex.len() {
                if i == k || j == k {
                    continue;
                }
                let u = simplex[i].sub(apex)?;
                let v = simplex[j].sub(apex)?;
                let lengths = u.norm() * v.norm();
                let angle = if lengths > 0. {
                    (u.dot(&v)? / lengths).abs().min(1.).acos()
                } else {
                    0.
                };
                min = min.min(angle);
            }
        }
    }
    Ok(min)
}

fn rank(values: &[f64]) -> Vec<usize> {
    let mut ranked_indices: Vec<usize> = (0..values.len()).collect();
    ranked_indices.sort_unstable_by(|&x, &y| values[x].total_cmp(&values[y]));
    ranked_indices
}

impl NelderMead {
    pub fn new(config: NelderMeadConfig) -> Self {
        Self { config }
    }

    fn validate(&self) -> Result<()> {
        let config = &self.config;
        check_positive(
            "Nelder-Mead",
            &[
                ("edge", config.edge),
                ("precision", config.precision),
                ("reflection", config.reflection),
                ("contraction", config.contraction),
                ("expansion", config.expansion),
                ("shrink", config.shrink),
                ("min_angle", config.min_angle),
            ],
        )?;
        if config.contraction >= 1. || config.shrink >= 1. {
            return Err(OptimizeError::InvalidConfig(format!(
                "Nelder-Mead contraction and shrink must be below 1, got {} and {}",
                config.contraction, config.shrink
            )));
        }
        if config.restart_period == 0 {
            return Err(OptimizeError::InvalidConfig(
                "Nelder-Mead restart_period must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn solve(&self, f: impl Fn(&Vector) -> f64, x0: &Vector) -> Result<Solution> {
        self.solve_with(f, x0, nop)
    }

    /// Minimize `f` from `x0`, calling `callback(x, f(x), iter)` with the
    /// best vertex after each iteration
    pub fn solve_with(
        &self,
        f: impl Fn(&Vector) -> f64,
        x0: &Vector,
        mut callback: impl FnMut(&Vector, f64, usize),
    ) -> Result<Solution> {
        self.validate()?;
        let config = &self.config;
        let n = x0.dimension();
        if n == 0 {
            return Ok(Solution {
                x: x0.clone(),
                fx: f(x0),
                iterations: 0,
                converged: true,
            });
        }

        let mut simplex = regular_simplex(x0, config.edge)?;
        let mut fvals: Vec<f64> = simplex.iter().map(&f).collect();
        // sort the indices, not the simplex
        let mut ranked_indices = rank(&fvals);

        for iter in 1..=config.max_iterations {
            let low_index = ranked_indices[0];
            let high_index = ranked_indices[n];
            let next_high_index = ranked_indices[n - 1];
            let best_old = simplex[low_index].clone();

            let centroid = ranked_indices[..n]
                .iter()
                .try_fold(Vector::zeros(n), |acc, &ii| acc.add(&simplex[ii]))?
                .scale(1. / n as f64);
            let worst = &simplex[high_index];
            let toward = centroid.sub(worst)?;

            let p_reflect = centroid.offset(config.reflection, &toward)?;
            let f_reflect = f(&p_reflect);

            let replacement = if f_reflect < fvals[low_index] {
                let p_expand = centroid.offset(config.expansion, &toward)?;
                let f_expand = f(&p_expand);
                if f_expand < f_reflect {
                    Some((p_expand, f_expand))
                } else {
                    Some((p_reflect, f_reflect))
                }
            } else if f_reflect <= fvals[next_high_index] {
                Some((p_reflect, f_reflect))
            } else if f_reflect <= fvals[high_index] {
                let outside = p_reflect.sub(&centroid)?;
                let p_contract = centroid.offset(config.contraction, &outside)?;
                let f_contract = f(&p_contract);
                if f_contract < f_reflect {
                    Some((p_contract, f_contract))
                } else {
                    None
                }
            } else {
                let p_contract = centroid.offset(-config.contraction, &toward)?;
                let f_contract = f(&p_contract);
                if f_contract < fvals[high_index] {
                    Some((p_contract, f_contract))
                } else {
                    None
                }
            };

            match replacement {
                Some((point, value)) => {
                    simplex[high_index] = point;
                    fvals[high_index] = value;
                }
                None => {
                    trace!(iteration = iter, "Nelder-Mead: shrink");
                    let best = simplex[low_index].clone();
                    for &ii in ranked_indices[1..].iter() {
                        let vertex = best.offset(config.shrink, &simplex[ii].sub(&best)?)?;
                        fvals[ii] = f(&vertex);
                        simplex[ii] = vertex;
                    }
                }
            }

            ranked_indices = rank(&fvals);
            let low_index = ranked_indices[0];

            if iter % config.restart_period == 0 && n >= 2 {
                let angle = min_angle(&simplex)?;
                if angle <= config.min_angle {
                    let best = simplex[low_index].clone();
                    let edge = simplex[ranked_indices[1]].sub(&best)?.norm();
                    if edge > 0. {
                        debug!(iteration = iter, angle = angle, edge = edge, "Nelder-Mead: degenerate simplex rebuilt");
                        simplex = regular_simplex(&best, edge)?;
                        fvals = simplex.iter().map(&f).collect();
                        ranked_indices = rank(&fvals);
                    }
                }
            }

            let low_index = ranked_indices[0];
            let f_best = fvals[low_index];
            trace!(iteration = iter, fx = f_best, "Nelder-Mead");
            callback(&simplex[low_index], f_best, iter);

            let moved = simplex[low_index].sub(&best_old)?.norm();
            let spread = (fvals.iter().map(|v| (v - f_best).powi(2)).sum::<f64>()
                / (n + 1) as f64)
                .sqrt();
            if moved <= config.precision && spread <= config.precision {
                debug!(iterations = iter, fx = f_best, "Nelder-Mead: simplex collapsed");
                return Ok(Solution {
                    x: simplex[low_index].clone(),
                    fx: f_best,
                    iterations: iter,
                    converged: true,
                });
            }
        }

        let low_index = ranked_indices[0];
        debug!(iterations = config.max_iterations, fx = fvals[low_index], "Nelder-Mead: iteration cap");
        Ok(Solution {
            x: simplex[low_index].clone(),
            fx: fvals[low_index],
            iterations: config.max_iterations,
            converged: false,
        })
    }
}
