//! Error types shared by the linear-algebra kernel and the optimizers

use thiserror::Error;

/// Failures of the dense linear-algebra kernel
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LinalgError {
    /// Two vectors (or a vector and a matrix) of different dimension met
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// Two matrices whose shapes are incompatible for the operation
    #[error("shape mismatch: {left:?} is incompatible with {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },

    #[error("matrix must be square, got {rows}x{cols}")]
    NotSquare { rows: usize, cols: usize },

    /// Elimination hit a zero on the diagonal
    #[error("zero pivot in row {row}, system is singular or needs pivoting")]
    ZeroPivot { row: usize },

    #[error("matrix is not diagonally dominant in row {row}")]
    NotDiagonallyDominant { row: usize },

    #[error("Gauss-Seidel iteration did not converge after {sweeps} sweeps")]
    NotConverged { sweeps: usize },

    #[error("index {index} is out of bounds for dimension {dimension}")]
    IndexOutOfBounds { index: usize, dimension: usize },

    #[error("row {row} has {found} entries, expected {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Failures of the line searches and the multidimensional minimizers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OptimizeError {
    #[error(transparent)]
    Linalg(#[from] LinalgError),

    /// Svenn's method found the start point to be a local maximum
    #[error("function is not unimodal around {start}, select another starting point")]
    NotUnimodal { start: f64 },

    #[error("no bracket found from {start} after {expansions} step doublings")]
    BracketNotFound { start: f64, expansions: usize },

    #[error("interpolation degenerated near {at}: the sampled points are collinear")]
    DegenerateInterpolation { at: f64 },

    #[error("line search did not converge after {iterations} iterations")]
    LineSearchNotConverged { iterations: usize },

    #[error("unknown line search method `{0}`")]
    UnknownLineSearch(String),

    /// A convergence rate was requested before the search ran
    #[error("line search has not been run yet")]
    NotYetRun,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = OptimizeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linalg_errors_convert() {
        fn fails() -> Result<()> {
            Err::<(), _>(LinalgError::ZeroPivot { row: 2 })?;
            Ok(())
        }
        assert_eq!(
            fails(),
            Err(OptimizeError::Linalg(LinalgError::ZeroPivot { row: 2 }))
        );
    }

    #[test]
    fn messages_name_the_problem() {
        let err = OptimizeError::UnknownLineSearch("newton".into());
        assert_eq!(err.to_string(), "unknown line search method `newton`");
        let err = OptimizeError::from(LinalgError::DimensionMismatch {
            expected: 3,
            found: 2,
        });
        assert_eq!(err.to_string(), "dimension mismatch: expected 3, found 2");
    }
}
