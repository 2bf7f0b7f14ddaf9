//! Linear solve, surface velocity reconstruction and force/moment integration.

use crate::config::{MomentReference, SolverSettings};
use crate::error::{FoilError, Result};
use crate::geometry::{generate_boundary, Boundary};
use crate::influence::{trailing_edge_panels, InfluenceSystem};
use crate::panels::PanelGeometry;
use crate::solvers::DenseLu;
use crate::traits::{AirfoilShape, LinearSolver};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Integrated force and moment coefficients at one angle of attack.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AeroCoefficients {
    pub alpha_deg: f64,
    pub cl: f64,
    pub cd: f64,
    pub cm: f64,
}

/// Surface solution of one panel solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub coefficients: AeroCoefficients,
    /// Panel midpoints, in boundary order.
    pub x_mid: Vec<f64>,
    pub y_mid: Vec<f64>,
    /// Tangential surface velocity, normalized by the freestream speed.
    pub vt: Vec<f64>,
    pub cp: Vec<f64>,
    pub source_strengths: Vec<f64>,
    pub circulation: f64,
}

impl Solution {
    /// Panel with the highest pressure coefficient.
    pub fn stagnation_panel(&self) -> usize {
        argmax_by(&self.cp, |a, b| a > b)
    }

    /// Panel with the lowest pressure coefficient.
    pub fn suction_peak(&self) -> usize {
        argmax_by(&self.cp, |a, b| a < b)
    }
}

fn argmax_by(values: &[f64], better: impl Fn(f64, f64) -> bool) -> usize {
    let mut best = 0;
    for (idx, &value) in values.iter().enumerate().skip(1) {
        if better(value, values[best]) {
            best = idx;
        }
    }
    best
}

/// Coefficients over a set of angles of attack, in input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polar {
    pub points: Vec<AeroCoefficients>,
}

impl Polar {
    pub fn alphas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.alpha_deg).collect()
    }

    pub fn cl(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.cl).collect()
    }

    /// Least-squares slope dCl/dα per radian. `None` with fewer than two distinct angles.
    pub fn lift_curve_slope(&self) -> Option<f64> {
        let n = self.points.len() as f64;
        if self.points.len() < 2 {
            return None;
        }
        let alphas: Vec<f64> = self.points.iter().map(|p| p.alpha_deg.to_radians()).collect();
        let mean_a = alphas.iter().sum::<f64>() / n;
        let mean_cl = self.points.iter().map(|p| p.cl).sum::<f64>() / n;
        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for (a, p) in alphas.iter().zip(&self.points) {
            sxy += (a - mean_a) * (p.cl - mean_cl);
            sxx += (a - mean_a) * (a - mean_a);
        }
        if sxx == 0.0 {
            None
        } else {
            Some(sxy / sxx)
        }
    }
}

/// A boundary with its panel geometry and assembled influence system.
///
/// The system depends on geometry only, so one model serves any number of
/// angles of attack.
#[derive(Debug, Clone)]
pub struct PanelModel {
    boundary: Boundary,
    geometry: PanelGeometry,
    system: InfluenceSystem,
}

impl PanelModel {
    pub fn new(boundary: Boundary) -> Result<Self> {
        let geometry = PanelGeometry::from_boundary(&boundary)?;
        let system = InfluenceSystem::assemble(&boundary, &geometry)?;
        Ok(Self {
            boundary,
            geometry,
            system,
        })
    }

    pub fn from_shape<S: AirfoilShape>(
        shape: &S,
        panels: usize,
        settings: &SolverSettings,
    ) -> Result<Self> {
        settings.validate()?;
        Self::new(generate_boundary(shape, panels, &settings.paneling)?)
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn geometry(&self) -> &PanelGeometry {
        &self.geometry
    }

    pub fn system(&self) -> &InfluenceSystem {
        &self.system
    }

    pub fn panel_count(&self) -> usize {
        self.geometry.len()
    }

    /// Right-hand side for `alpha` in radians: the freestream normal residual on every
    /// panel, then the freestream tangential residual of the Kutta row.
    pub fn freestream_rhs(&self, alpha: f64) -> DVector<f64> {
        let n = self.panel_count();
        let (sin_a, cos_a) = alpha.sin_cos();
        let st = &self.geometry.sin_theta;
        let ct = &self.geometry.cos_theta;

        let mut rhs = DVector::zeros(n + 1);
        for i in 0..n {
            rhs[i] = st[i] * cos_a - sin_a * ct[i];
        }
        rhs[n] = -trailing_edge_panels(n)
            .iter()
            .map(|&te| ct[te] * cos_a + st[te] * sin_a)
            .sum::<f64>();
        rhs
    }

    /// Tangential velocity at each control point for the given strengths `[λ_0..λ_{N-1}, γ]`.
    pub fn tangential_velocity(&self, strengths: &DVector<f64>, alpha: f64) -> Vec<f64> {
        let n = self.panel_count();
        let kernel = &self.system.kernel;
        let sources = strengths.rows(0, n);
        let gamma = strengths[n];
        let (sin_a, cos_a) = alpha.sin_cos();

        let induced = &kernel.tangential * sources;
        (0..n)
            .map(|i| {
                let freestream =
                    self.geometry.cos_theta[i] * cos_a + self.geometry.sin_theta[i] * sin_a;
                freestream + induced[i] + gamma * kernel.normal.row(i).sum()
            })
            .collect()
    }

    /// Normal, axial and moment coefficients from panel pressures, rotated into lift and drag.
    pub fn integrate(&self, cp: &[f64], alpha: f64, reference: &MomentReference) -> (f64, f64, f64) {
        let mut cn = 0.0;
        let mut ca = 0.0;
        let mut cm = 0.0;
        for (i, pair) in self.boundary.points().windows(2).enumerate() {
            let dx = pair[1].x - pair[0].x;
            let dy = pair[1].y - pair[0].y;
            let arm_x = self.geometry.midpoints[i].x - reference.x;
            let arm_y = self.geometry.midpoints[i].y - reference.y;

            let dcn = -cp[i] * dx;
            let dca = cp[i] * dy;
            cn += dcn;
            ca += dca;
            cm += -dcn * arm_x + dca * arm_y;
        }
        let (sin_a, cos_a) = alpha.sin_cos();
        (cn * cos_a - ca * sin_a, cn * sin_a + ca * cos_a, cm)
    }

    pub fn solve(&self, alpha_deg: f64, settings: &SolverSettings) -> Result<Solution> {
        self.solve_with(&DenseLu, alpha_deg, &settings.moment_reference)
    }

    pub fn solve_with<L: LinearSolver>(
        &self,
        solver: &L,
        alpha_deg: f64,
        reference: &MomentReference,
    ) -> Result<Solution> {
        check_angles(&[alpha_deg])?;
        let alpha = alpha_deg.to_radians();
        let strengths = self.solve_strengths(solver, &[alpha])?;
        Ok(self.build_solution(
            strengths.column(0).clone_owned(),
            alpha_deg,
            reference,
            self.geometry.midpoint_x(),
            self.geometry.midpoint_y(),
        ))
    }

    /// Solves every angle against the factorization stored with the influence system.
    pub fn sweep_with<L: LinearSolver>(
        &self,
        solver: &L,
        alphas_deg: &[f64],
        reference: &MomentReference,
    ) -> Result<Vec<Solution>> {
        check_angles(alphas_deg)?;
        if alphas_deg.is_empty() {
            return Ok(Vec::new());
        }

        let alphas: Vec<f64> = alphas_deg.iter().map(|a| a.to_radians()).collect();
        let strengths = self.solve_strengths(solver, &alphas)?;

        let x_mid = self.geometry.midpoint_x();
        let y_mid = self.geometry.midpoint_y();
        Ok(alphas_deg
            .iter()
            .enumerate()
            .map(|(col, &alpha_deg)| {
                self.build_solution(
                    strengths.column(col).clone_owned(),
                    alpha_deg,
                    reference,
                    x_mid.clone(),
                    y_mid.clone(),
                )
            })
            .collect())
    }

    /// One column of singularity strengths per angle (radians).
    fn solve_strengths<L: LinearSolver>(&self, solver: &L, alphas: &[f64]) -> Result<DMatrix<f64>> {
        let n = self.panel_count();
        let mut rhs = DMatrix::zeros(n + 1, alphas.len());
        for (col, &alpha) in alphas.iter().enumerate() {
            rhs.set_column(col, &self.freestream_rhs(alpha));
        }
        solver.solve(&self.system, &rhs)
    }

    fn build_solution(
        &self,
        strengths: DVector<f64>,
        alpha_deg: f64,
        reference: &MomentReference,
        x_mid: Vec<f64>,
        y_mid: Vec<f64>,
    ) -> Solution {
        let n = self.panel_count();
        let alpha = alpha_deg.to_radians();
        let vt = self.tangential_velocity(&strengths, alpha);
        let cp: Vec<f64> = vt.iter().map(|v| 1.0 - v * v).collect();
        let (cl, cd, cm) = self.integrate(&cp, alpha, reference);

        Solution {
            coefficients: AeroCoefficients {
                alpha_deg,
                cl,
                cd,
                cm,
            },
            x_mid,
            y_mid,
            vt,
            cp,
            source_strengths: strengths.rows(0, n).iter().copied().collect(),
            circulation: strengths[n],
        }
    }
}

fn check_angles(alphas_deg: &[f64]) -> Result<()> {
    match alphas_deg.iter().find(|a| !a.is_finite()) {
        Some(bad) => Err(FoilError::invalid(format!(
            "angle of attack must be finite, got {bad}"
        ))),
        None => Ok(()),
    }
}

/// Solves a single angle of attack (degrees) on an arbitrary boundary.
pub fn solve(boundary: &Boundary, alpha_deg: f64, settings: &SolverSettings) -> Result<Solution> {
    settings.validate()?;
    PanelModel::new(boundary.clone())?.solve(alpha_deg, settings)
}

/// Generates `panels` panels on `shape` and solves at `alpha_deg`.
pub fn analyze<S: AirfoilShape>(
    shape: &S,
    panels: usize,
    alpha_deg: f64,
    settings: &SolverSettings,
) -> Result<Solution> {
    PanelModel::from_shape(shape, panels, settings)?.solve(alpha_deg, settings)
}

/// Coefficients of `boundary` over several angles, assembling the system once.
pub fn polar_sweep(
    boundary: &Boundary,
    alphas_deg: &[f64],
    settings: &SolverSettings,
) -> Result<Polar> {
    settings.validate()?;
    let model = PanelModel::new(boundary.clone())?;
    let points = model
        .sweep_with(&DenseLu, alphas_deg, &settings.moment_reference)?
        .into_iter()
        .map(|s| s.coefficients)
        .collect();
    Ok(Polar { points })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naca::Naca4;
    use std::f64::consts::PI;

    fn model(digits: [u8; 4], panels: usize) -> PanelModel {
        let foil = Naca4::from_digits(digits).expect("valid section");
        PanelModel::from_shape(&foil, panels, &SolverSettings::default()).expect("model")
    }

    #[test]
    fn solution_satisfies_tangency_and_kutta() {
        let model = model([2, 4, 1, 2], 60);
        let alpha = 3.0_f64.to_radians();
        let rhs = model.freestream_rhs(alpha);
        let strengths = model
            .system()
            .matrix
            .clone()
            .lu()
            .solve(&rhs)
            .expect("solvable");

        let residual = &model.system().matrix * &strengths - &rhs;
        assert!(residual.amax() < 1e-10);

        let vt = model.tangential_velocity(&strengths, alpha);
        assert!((vt[0] + vt[59]).abs() < 1e-10, "Kutta: {} vs {}", vt[0], vt[59]);
    }

    #[test]
    fn symmetric_section_at_zero_incidence_has_no_lift() {
        let model = model([0, 0, 1, 2], 100);
        let solution = model.solve(0.0, &SolverSettings::default()).expect("solve");
        assert!(solution.coefficients.cl.abs() < 1e-3);
        assert!(solution.coefficients.cm.abs() < 1e-3);
        assert!(solution.circulation.abs() < 1e-10);
    }

    #[test]
    fn pressure_follows_bernoulli() {
        let model = model([4, 4, 1, 2], 40);
        let solution = model.solve(2.0, &SolverSettings::default()).expect("solve");
        assert_eq!(solution.cp.len(), 40);
        assert_eq!(solution.x_mid.len(), 40);
        assert_eq!(solution.source_strengths.len(), 40);
        for (cp, vt) in solution.cp.iter().zip(&solution.vt) {
            assert_eq!(*cp, 1.0 - vt * vt);
            assert!(*cp <= 1.0);
        }
    }

    #[test]
    fn integrate_uniform_pressure_gives_no_force() {
        let model = model([2, 4, 1, 2], 40);
        let cp = vec![0.3; 40];
        let (cl, cd, _) = model.integrate(&cp, 0.0, &MomentReference::default());
        // Only the open trailing edge keeps the contour integral from vanishing exactly.
        assert!(cl.abs() < 1e-12);
        assert!(cd.abs() < 1e-3);
    }

    #[test]
    fn moment_reference_shifts_moment_by_lever_arm() {
        let model = model([2, 4, 1, 2], 80);
        let alpha = 4.0;
        let quarter = model
            .solve_with(&DenseLu, alpha, &MomentReference::default())
            .expect("solve");
        let leading = model
            .solve_with(&DenseLu, alpha, &MomentReference { x: 0.0, y: 0.0 })
            .expect("solve");
        let alpha_rad = f64::to_radians(alpha);
        // Cm_le = Cm_qc - 0.25 * Cn, with Cn recovered from Cl and Cd.
        let c = quarter.coefficients;
        let cn = c.cl * alpha_rad.cos() + c.cd * alpha_rad.sin();
        assert!((leading.coefficients.cm - (c.cm - 0.25 * cn)).abs() < 1e-12);
    }

    #[test]
    fn sweep_matches_individual_solves() {
        let model = model([2, 4, 1, 2], 50);
        let reference = MomentReference::default();
        let alphas = [-4.0, 0.0, 2.5, 6.0];
        let swept = model.sweep_with(&DenseLu, &alphas, &reference).expect("sweep");
        assert_eq!(swept.len(), alphas.len());
        for (alpha, batch) in alphas.iter().zip(&swept) {
            let single = model.solve_with(&DenseLu, *alpha, &reference).expect("solve");
            assert_eq!(batch.coefficients.alpha_deg, *alpha);
            assert!((batch.coefficients.cl - single.coefficients.cl).abs() < 1e-12);
            assert!((batch.coefficients.cm - single.coefficients.cm).abs() < 1e-12);
        }
    }

    #[test]
    fn empty_sweep_and_non_finite_angles() {
        let model = model([0, 0, 1, 2], 20);
        let reference = MomentReference::default();
        assert!(model.sweep_with(&DenseLu, &[], &reference).expect("empty").is_empty());
        assert!(matches!(
            model.solve_with(&DenseLu, f64::NAN, &reference),
            Err(FoilError::InvalidInput(_))
        ));
    }

    #[test]
    fn lift_curve_slope_of_linear_polar() {
        let polar = Polar {
            points: [-2.0, 0.0, 2.0]
                .iter()
                .map(|&alpha_deg| AeroCoefficients {
                    alpha_deg,
                    cl: 2.0 * PI * f64::to_radians(alpha_deg) + 0.1,
                    cd: 0.0,
                    cm: 0.0,
                })
                .collect(),
        };
        let slope = polar.lift_curve_slope().expect("slope");
        assert!((slope - 2.0 * PI).abs() < 1e-12);
        assert_eq!(Polar::default().lift_curve_slope(), None);
    }

    #[test]
    fn argmax_helpers_pick_extremes() {
        let solution = Solution {
            coefficients: AeroCoefficients {
                alpha_deg: 0.0,
                cl: 0.0,
                cd: 0.0,
                cm: 0.0,
            },
            x_mid: vec![0.0; 4],
            y_mid: vec![0.0; 4],
            vt: vec![0.0; 4],
            cp: vec![0.1, 0.9, -1.2, 0.4],
            source_strengths: vec![0.0; 4],
            circulation: 0.0,
        };
        assert_eq!(solution.stagnation_panel(), 1);
        assert_eq!(solution.suction_peak(), 2);
    }
}
