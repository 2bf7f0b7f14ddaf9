//! Algorithmic constants of the solver, exposed as plain settings structs.

use crate::error::{FoilError, Result};
use serde::{Deserialize, Serialize};

/// Chordwise station distribution used when sampling an airfoil family.
///
/// Stations follow `x(f) = 1 - (a+1) f (1-f)^a - (1-f)^(a+1)` with `a = bunching`,
/// which clusters points toward both the leading and trailing edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelingConfig {
    pub bunching: f64,
}

impl Default for PanelingConfig {
    fn default() -> Self {
        Self { bunching: 1.5 }
    }
}

impl PanelingConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.bunching.is_finite() || self.bunching <= 0.0 {
            return Err(FoilError::invalid(format!(
                "bunching parameter must be finite and positive, got {}",
                self.bunching
            )));
        }
        Ok(())
    }

    /// Chord fraction of station `f` in `[0, 1]`.
    pub fn station(&self, f: f64) -> f64 {
        let a = self.bunching;
        1.0 - (a + 1.0) * f * (1.0 - f).powf(a) - (1.0 - f).powf(a + 1.0)
    }
}

/// Point about which the pitching moment coefficient is taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentReference {
    pub x: f64,
    pub y: f64,
}

impl Default for MomentReference {
    /// Quarter chord on the chord line.
    fn default() -> Self {
        Self { x: 0.25, y: 0.0 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverSettings {
    pub paneling: PanelingConfig,
    pub moment_reference: MomentReference,
}

impl SolverSettings {
    pub fn validate(&self) -> Result<()> {
        self.paneling.validate()?;
        if !self.moment_reference.x.is_finite() || !self.moment_reference.y.is_finite() {
            return Err(FoilError::invalid("moment reference must be finite"));
        }
        Ok(())
    }
}
