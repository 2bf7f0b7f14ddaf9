pub mod config;
pub mod error;
pub mod geometry;
pub mod influence;
pub mod naca;
pub mod panels;
pub mod solution;
pub mod solvers;
/// The `foil_core` crate implements the Hess-Smith surface-singularity panel method for
/// two-dimensional, inviscid, incompressible airfoil analysis.
///
/// The solve is a straight pipeline; each stage owns its output:
/// - **Geometry**: `AirfoilShape` families (`Naca4`) are sampled into a closed `Boundary`.
/// - **Panels**: `PanelGeometry` holds per-panel length, midpoint and orientation.
/// - **Influence**: `InfluenceSystem` assembles the dense (N+1)x(N+1) tangency/Kutta matrix.
/// - **Solution**: `solve` / `polar_sweep` produce surface velocity, `cp` and force coefficients.
/// - **Traits**: `AirfoilShape` (geometry families) and `LinearSolver` (dense solve backends).
pub mod traits;

pub use config::{MomentReference, PanelingConfig, SolverSettings};
pub use error::{FoilError, Result};
pub use geometry::Boundary;
pub use naca::Naca4;
pub use solution::{analyze, polar_sweep, solve, AeroCoefficients, Polar, Solution};
