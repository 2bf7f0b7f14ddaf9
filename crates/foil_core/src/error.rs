//! Error taxonomy shared by every stage of the panel solver.

use thiserror::Error;

/// Failures surfaced by geometry generation, assembly and the linear solve.
///
/// Every variant aborts the whole solve; no partial coefficients are produced.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FoilError {
    /// Rejected caller input (panel count, airfoil digits, non-finite values).
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Two consecutive boundary points coincide.
    #[error("degenerate geometry: panel {panel} has zero length")]
    DegenerateGeometry { panel: usize },
    /// The influence matrix has zero determinant or could not be factorized.
    #[error("singular influence system: the assembled matrix cannot be solved")]
    SingularSystem,
}

impl FoilError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        FoilError::InvalidInput(message.into())
    }
}

pub type Result<T> = std::result::Result<T, FoilError>;
