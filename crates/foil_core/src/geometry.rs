//! Closed boundary contours and their generation from airfoil families.

use crate::config::PanelingConfig;
use crate::error::{FoilError, Result};
use crate::traits::AirfoilShape;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Ordered, closed contour of N+1 points bounding N panels.
///
/// Generated contours run from the lower trailing edge, forward along the lower
/// surface to the leading edge, then aft along the upper surface.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    points: Vec<Point2<f64>>,
}

impl Boundary {
    /// Wraps a caller-supplied contour. Zero-length panels are detected later, when the
    /// panel geometry is built.
    pub fn from_points(points: Vec<Point2<f64>>) -> Result<Self> {
        if points.len() < 4 {
            return Err(FoilError::invalid(format!(
                "a boundary needs at least 4 points (3 panels), got {}",
                points.len()
            )));
        }
        if let Some(idx) = points
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite()))
        {
            return Err(FoilError::invalid(format!(
                "boundary point {idx} is not finite"
            )));
        }
        Ok(Self { points })
    }

    /// Builds a contour from separate coordinate slices.
    pub fn from_coordinates(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(FoilError::invalid(format!(
                "coordinate length mismatch: {} x values, {} y values",
                x.len(),
                y.len()
            )));
        }
        Self::from_points(x.iter().zip(y).map(|(&x, &y)| Point2::new(x, y)).collect())
    }

    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    pub fn panel_count(&self) -> usize {
        self.points.len() - 1
    }

    pub fn x(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.x).collect()
    }

    pub fn y(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.y).collect()
    }

    /// Distance between the first and last point; the trailing-edge gap of the contour.
    pub fn closure_gap(&self) -> f64 {
        let first = self.points[0];
        let last = self.points[self.points.len() - 1];
        (last - first).norm()
    }
}

/// Samples `shape` into a closed boundary of `panels` panels.
///
/// `panels` must be even so both surfaces receive `panels / 2` panels over the same
/// `panels / 2 + 1` chordwise stations.
pub fn generate_boundary<S: AirfoilShape>(
    shape: &S,
    panels: usize,
    paneling: &PanelingConfig,
) -> Result<Boundary> {
    if panels < 3 {
        return Err(FoilError::invalid(format!(
            "panel count must be at least 3, got {panels}"
        )));
    }
    if panels % 2 != 0 {
        return Err(FoilError::invalid(format!(
            "panel count must be even, got {panels}"
        )));
    }
    paneling.validate()?;

    let nside = panels / 2 + 1;
    let mut points = vec![Point2::origin(); panels + 1];
    for i in 0..nside {
        let x = paneling.station(i as f64 / (nside - 1) as f64);
        points[nside - 1 - i] = Point2::new(x, shape.lower(x));
        points[nside - 1 + i] = Point2::new(x, shape.upper(x));
    }
    Boundary::from_points(points)
}

/// Uniformly sampled surfaces and camber line, for plotting a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AirfoilProfile {
    pub x: Vec<f64>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
    pub camber: Vec<f64>,
}

impl AirfoilProfile {
    pub(crate) fn with_capacity(samples: usize) -> Self {
        Self {
            x: Vec::with_capacity(samples),
            upper: Vec::with_capacity(samples),
            lower: Vec::with_capacity(samples),
            camber: Vec::with_capacity(samples),
        }
    }
}
