use crate::error::{FoilError, Result};
use crate::influence::InfluenceSystem;
use crate::traits::LinearSolver;
use nalgebra::linalg::LU;
use nalgebra::{DMatrix, Dyn};

/// LU factorization with partial pivoting.
///
/// Singularity is an exactly zero pivot on the diagonal of `U`. The determinant is not
/// used: for a few thousand panels the product of the pivots underflows to zero.
pub fn factorize(matrix: DMatrix<f64>) -> Result<LU<f64, Dyn, Dyn>> {
    if !matrix.is_square() {
        return Err(FoilError::invalid(format!(
            "cannot factorize a {}x{} matrix",
            matrix.nrows(),
            matrix.ncols()
        )));
    }
    let lu = matrix.lu();
    if !lu.is_invertible() {
        return Err(FoilError::SingularSystem);
    }
    Ok(lu)
}

/// Solves against the factorization stored with the system. All right-hand sides share it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenseLu;

impl LinearSolver for DenseLu {
    fn solve(&self, system: &InfluenceSystem, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if system.matrix.nrows() != rhs.nrows() {
            return Err(FoilError::invalid(format!(
                "right-hand side has {} rows, the system has {}",
                rhs.nrows(),
                system.matrix.nrows()
            )));
        }
        system
            .factorization()
            .solve(rhs)
            .ok_or(FoilError::SingularSystem)
    }
}
