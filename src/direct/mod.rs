//! Minimization via Direct Function Comparison, i.e. derivativeless
//!
//! These methods only evaluate the objective $`f: \mathbb{R}^n \to \mathbb{R}`$
//! and compare values, so they need neither gradients nor Hessians. They
//! will generally be slower than the [gradient methods](crate::smooth)
//! when derivatives are available.
//!
//! - [`HookeJeeves`] pattern search, accelerated by a line search
//! - [`NelderMead`] downhill simplex

mod hooke_jeeves;
pub use hooke_jeeves::*;
mod nelder_mead;
pub use nelder_mead::*;

