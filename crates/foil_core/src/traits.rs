use crate::error::{FoilError, Result};
use crate::geometry::AirfoilProfile;
use crate::influence::InfluenceSystem;
use nalgebra::DMatrix;

/// A parametric airfoil family described by a camber line and a thickness distribution.
/// Both are evaluated on the chord fraction `x` in `[0, 1]`.
pub trait AirfoilShape {
    /// Height of the mean camber line above the chord.
    fn camber(&self, x: f64) -> f64;

    /// Half of the local thickness, measured normal to the chord.
    fn half_thickness(&self, x: f64) -> f64;

    fn upper(&self, x: f64) -> f64 {
        self.camber(x) + self.half_thickness(x)
    }

    fn lower(&self, x: f64) -> f64 {
        self.camber(x) - self.half_thickness(x)
    }

    /// Samples the surfaces and camber line at `samples` uniformly spaced chord stations.
    fn profile(&self, samples: usize) -> Result<AirfoilProfile> {
        if samples < 2 {
            return Err(FoilError::invalid(format!(
                "profile needs at least two samples, got {samples}"
            )));
        }
        let mut profile = AirfoilProfile::with_capacity(samples);
        for k in 0..samples {
            let x = k as f64 / (samples - 1) as f64;
            profile.x.push(x);
            profile.upper.push(self.upper(x));
            profile.lower.push(self.lower(x));
            profile.camber.push(self.camber(x));
        }
        Ok(profile)
    }
}

/// A linear solver backend for the influence system.
///
/// Backends may use the stored factorization or work from `system.matrix` directly.
/// `rhs` holds one right-hand side per column; the result has the same shape.
pub trait LinearSolver {
    fn solve(&self, system: &InfluenceSystem, rhs: &DMatrix<f64>) -> Result<DMatrix<f64>>;
}
