//! Influence-coefficient assembly for the source/vortex panel system.
//!
//! Every panel carries a constant-strength source `λ_j`; all panels share one
//! vortex strength `γ`. Unknowns are ordered `[λ_0, …, λ_{N-1}, γ]`.
//!
//! Assembly runs in two passes. The first evaluates the pairwise kernel for every
//! (control panel `i`, source panel `j`) pair and fills the dense N×N block. The
//! second reduces the same kernel values into the Kutta row `N` and the shared
//! vortex column `N`.

use crate::error::{FoilError, Result};
use crate::geometry::Boundary;
use crate::panels::PanelGeometry;
use crate::solvers::factorize;
use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};
use std::f64::consts::PI;

/// Pairwise velocity kernels, both scaled by `1 / 2π`.
///
/// `normal[(i, j)]` is the normal velocity at control point `i` induced by a unit source
/// on panel `j`; it equals the tangential velocity there induced by a unit vortex on `j`.
/// `tangential[(i, j)]` is the tangential velocity from a unit source on `j`; its negative
/// is the normal velocity from a unit vortex on `j`.
#[derive(Debug, Clone, PartialEq)]
pub struct InfluenceKernel {
    pub normal: DMatrix<f64>,
    pub tangential: DMatrix<f64>,
}

/// The assembled (N+1)×(N+1) system, its LU factorization and the kernel it was built from.
#[derive(Debug, Clone)]
pub struct InfluenceSystem {
    pub matrix: DMatrix<f64>,
    pub kernel: InfluenceKernel,
    factorization: LU<f64, Dyn, Dyn>,
}

/// Angle subtended at `control` by the panel from `start` to `end`, and
/// `ln(|end - control| / |start - control|)`.
///
/// The self-induced pair (`control` on its own panel) uses `β = π` directly.
fn subtended_angle_and_log_ratio(
    control: &nalgebra::Point2<f64>,
    start: &nalgebra::Point2<f64>,
    end: &nalgebra::Point2<f64>,
    self_induced: bool,
) -> (f64, f64) {
    let r_start = start - control;
    let r_end = end - control;
    let beta = if self_induced {
        PI
    } else {
        r_start.perp(&r_end).atan2(r_start.dot(&r_end))
    };
    let log_ratio = (r_end.norm() / r_start.norm()).ln();
    (beta, log_ratio)
}

impl InfluenceKernel {
    pub fn compute(boundary: &Boundary, geometry: &PanelGeometry) -> Result<Self> {
        let n = geometry.len();
        if boundary.panel_count() != n {
            return Err(FoilError::invalid(format!(
                "panel geometry has {} panels but the boundary has {}",
                n,
                boundary.panel_count()
            )));
        }
        let points = boundary.points();

        let sin_theta = DVector::from_column_slice(&geometry.sin_theta);
        let cos_theta = DVector::from_column_slice(&geometry.cos_theta);
        // sin(θ_i − θ_j) and cos(θ_i − θ_j) for every pair at once.
        let sin_ij = &sin_theta * cos_theta.transpose() - &cos_theta * sin_theta.transpose();
        let cos_ij = &cos_theta * cos_theta.transpose() + &sin_theta * sin_theta.transpose();

        let two_pi = 2.0 * PI;
        let mut normal = DMatrix::zeros(n, n);
        let mut tangential = DMatrix::zeros(n, n);
        for i in 0..n {
            let control = &geometry.midpoints[i];
            for j in 0..n {
                let (beta, log_ratio) =
                    subtended_angle_and_log_ratio(control, &points[j], &points[j + 1], i == j);
                if !log_ratio.is_finite() {
                    // Control point i lies on a vertex of panel j.
                    return Err(FoilError::DegenerateGeometry { panel: j });
                }
                let (s, c) = (sin_ij[(i, j)], cos_ij[(i, j)]);
                normal[(i, j)] = (s * log_ratio + c * beta) / two_pi;
                tangential[(i, j)] = (s * beta - c * log_ratio) / two_pi;
            }
        }

        Ok(Self { normal, tangential })
    }

    pub fn panel_count(&self) -> usize {
        self.normal.nrows()
    }
}

impl InfluenceSystem {
    /// Builds the tangency/Kutta matrix and factorizes it once.
    pub fn assemble(boundary: &Boundary, geometry: &PanelGeometry) -> Result<Self> {
        Self::from_kernel(InfluenceKernel::compute(boundary, geometry)?)
    }

    /// Reduction pass: places the kernel block and derives the vortex column and Kutta row.
    ///
    /// Fails with `SingularSystem` when the factorization has an exactly zero pivot.
    pub fn from_kernel(kernel: InfluenceKernel) -> Result<Self> {
        let n = kernel.panel_count();
        if n < 3 {
            return Err(FoilError::invalid(format!(
                "influence system needs at least 3 panels, got {n}"
            )));
        }

        let mut matrix = DMatrix::zeros(n + 1, n + 1);
        matrix.view_mut((0, 0), (n, n)).copy_from(&kernel.normal);

        // Shared vortex column: normal velocity from a unit vortex on every panel.
        for i in 0..n {
            matrix[(i, n)] = -kernel.tangential.row(i).sum();
        }

        // Kutta row: tangential velocities at the two trailing-edge panels cancel.
        for &te in &trailing_edge_panels(n) {
            for j in 0..n {
                matrix[(n, j)] += kernel.tangential[(te, j)];
            }
            matrix[(n, n)] += kernel.normal.row(te).sum();
        }

        let factorization = factorize(matrix.clone())?;
        Ok(Self {
            matrix,
            kernel,
            factorization,
        })
    }

    pub fn factorization(&self) -> &LU<f64, Dyn, Dyn> {
        &self.factorization
    }

    pub fn panel_count(&self) -> usize {
        self.kernel.panel_count()
    }
}

/// The first and last panel, which meet at the trailing edge.
pub(crate) fn trailing_edge_panels(n: usize) -> [usize; 2] {
    [0, n - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PanelingConfig;
    use crate::geometry::generate_boundary;
    use crate::naca::Naca4;

    fn naca_system(digits: [u8; 4], panels: usize) -> (Boundary, PanelGeometry, InfluenceSystem) {
        let foil = Naca4::from_digits(digits).expect("valid section");
        let boundary = generate_boundary(&foil, panels, &PanelingConfig::default()).expect("boundary");
        let geometry = PanelGeometry::from_boundary(&boundary).expect("geometry");
        let system = InfluenceSystem::assemble(&boundary, &geometry).expect("assembly");
        (boundary, geometry, system)
    }

    #[test]
    fn self_term_is_finite_and_one_half() {
        let (_, _, system) = naca_system([2, 4, 1, 2], 80);
        for i in 0..80 {
            // β = π, ln(1) = 0 and cos(0) = 1 give exactly 1/2.
            assert!((system.kernel.normal[(i, i)] - 0.5).abs() < 1e-12);
            assert!(system.kernel.tangential[(i, i)].abs() < 1e-12);
        }
        assert!(system.matrix.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn matrix_has_bordered_shape() {
        let (_, _, system) = naca_system([0, 0, 1, 2], 40);
        assert_eq!(system.matrix.shape(), (41, 41));
        assert_eq!(system.panel_count(), 40);
        assert_eq!(
            system.matrix.view((0, 0), (40, 40)).clone_owned(),
            system.kernel.normal
        );
    }

    #[test]
    fn reduction_pass_matches_direct_accumulation() {
        let (boundary, geometry, system) = naca_system([4, 4, 1, 2], 24);
        let n = 24;
        let pts = boundary.points();
        let two_pi = 2.0 * PI;

        let mut row = vec![0.0; n + 1];
        let mut column = vec![0.0; n];
        for i in 0..n {
            for j in 0..n {
                let r0 = pts[j] - geometry.midpoints[i];
                let r1 = pts[j + 1] - geometry.midpoints[i];
                let beta = if i == j { PI } else { r0.perp(&r1).atan2(r0.dot(&r1)) };
                let ln = (r1.norm() / r0.norm()).ln();
                let s = geometry.sin_theta[i] * geometry.cos_theta[j]
                    - geometry.cos_theta[i] * geometry.sin_theta[j];
                let c = geometry.cos_theta[i] * geometry.cos_theta[j]
                    + geometry.sin_theta[i] * geometry.sin_theta[j];
                let a_ij = s * ln / two_pi + c * beta / two_pi;
                if i == 0 || i == n - 1 {
                    row[j] += (s * beta - c * ln) / two_pi;
                    row[n] += a_ij;
                }
                column[i] += (c * ln - s * beta) / two_pi;
            }
        }

        for j in 0..=n {
            assert!((system.matrix[(n, j)] - row[j]).abs() < 1e-12, "row entry {j}");
        }
        for i in 0..n {
            assert!((system.matrix[(i, n)] - column[i]).abs() < 1e-12, "column entry {i}");
        }
    }

    #[test]
    fn subtended_angles_close_around_a_closed_contour() {
        // Counter-clockwise regular polygon: the own panel subtends π and the rest of the
        // closed contour sweeps the other half turn.
        let sides = 16;
        let angles: Vec<f64> = (0..=sides)
            .map(|k| 2.0 * PI * (k % sides) as f64 / sides as f64)
            .collect();
        let x: Vec<f64> = angles.iter().map(|a| a.cos()).collect();
        let y: Vec<f64> = angles.iter().map(|a| a.sin()).collect();
        let boundary = Boundary::from_coordinates(&x, &y).expect("polygon");
        let geometry = PanelGeometry::from_boundary(&boundary).expect("geometry");
        let kernel = InfluenceKernel::compute(&boundary, &geometry).expect("kernel");

        for i in 0..sides {
            let mut total = 0.0;
            for j in 0..sides {
                let s = geometry.sin_theta[i] * geometry.cos_theta[j]
                    - geometry.cos_theta[i] * geometry.sin_theta[j];
                let c = geometry.cos_theta[i] * geometry.cos_theta[j]
                    + geometry.sin_theta[i] * geometry.sin_theta[j];
                // c·normal + s·tangential recovers β / 2π.
                total += c * kernel.normal[(i, j)] + s * kernel.tangential[(i, j)];
            }
            assert!((total - 1.0).abs() < 1e-12, "panel {i}: {total}");
        }
    }

    #[test]
    fn zero_pivot_is_singular() {
        // A vanishing kernel leaves every pivot of the bordered matrix at exactly zero.
        let n = 6;
        let kernel = InfluenceKernel {
            normal: DMatrix::zeros(n, n),
            tangential: DMatrix::zeros(n, n),
        };
        assert!(matches!(
            InfluenceSystem::from_kernel(kernel),
            Err(FoilError::SingularSystem)
        ));
    }

    #[test]
    fn duplicated_kernel_rows_are_singular() {
        let (_, _, system) = naca_system([0, 0, 1, 2], 20);
        let mut kernel = system.kernel.clone();
        // Two identical control rows make the tangency block rank deficient.
        let row = kernel.normal.row(3).clone_owned();
        kernel.normal.set_row(7, &row);
        let row = kernel.tangential.row(3).clone_owned();
        kernel.tangential.set_row(7, &row);
        assert!(matches!(
            InfluenceSystem::from_kernel(kernel),
            Err(FoilError::SingularSystem)
        ));
    }

    #[test]
    fn assembled_system_keeps_its_factorization() {
        let (_, _, system) = naca_system([2, 4, 1, 2], 30);
        assert!(system.factorization().is_invertible());
        let rhs = DVector::from_element(31, 1.0);
        let x = system.factorization().solve(&rhs).expect("solvable");
        assert!((&system.matrix * x - rhs).amax() < 1e-10);
    }

    #[test]
    fn rejects_mismatched_geometry() {
        let (boundary, _, _) = naca_system([0, 0, 1, 2], 20);
        let (_, other_geometry, _) = naca_system([0, 0, 1, 2], 22);
        assert!(matches!(
            InfluenceSystem::assemble(&boundary, &other_geometry),
            Err(FoilError::InvalidInput(_))
        ));
    }

    #[test]
    fn control_point_on_foreign_vertex_is_degenerate() {
        // The midpoint of panel 0 coincides with the vertex shared by panels 3 and 4.
        let boundary = Boundary::from_coordinates(
            &[0.0, 2.0, 2.0, 1.0, 1.0, 0.0],
            &[0.0, 0.0, 1.0, 1.0, 0.0, 0.0],
        )
        .expect("boundary");
        let geometry = PanelGeometry::from_boundary(&boundary).expect("geometry");
        assert!(matches!(
            InfluenceSystem::assemble(&boundary, &geometry),
            Err(FoilError::DegenerateGeometry { .. })
        ));
    }
}
