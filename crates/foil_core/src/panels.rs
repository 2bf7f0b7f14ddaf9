use crate::error::{FoilError, Result};
use crate::geometry::Boundary;
use nalgebra::Point2;

/// Per-panel geometric descriptors, index-aligned with the boundary: panel `i`
/// joins point `i` to point `i + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelGeometry {
    pub lengths: Vec<f64>,
    pub sin_theta: Vec<f64>,
    pub cos_theta: Vec<f64>,
    pub midpoints: Vec<Point2<f64>>,
}

impl PanelGeometry {
    pub fn from_boundary(boundary: &Boundary) -> Result<Self> {
        let points = boundary.points();
        let n = boundary.panel_count();
        let mut geometry = Self {
            lengths: Vec::with_capacity(n),
            sin_theta: Vec::with_capacity(n),
            cos_theta: Vec::with_capacity(n),
            midpoints: Vec::with_capacity(n),
        };

        for (panel, pair) in points.windows(2).enumerate() {
            let (start, end) = (pair[0], pair[1]);
            let edge = end - start;
            let length = edge.norm();
            if length == 0.0 {
                return Err(FoilError::DegenerateGeometry { panel });
            }
            geometry.lengths.push(length);
            geometry.sin_theta.push(edge.y / length);
            geometry.cos_theta.push(edge.x / length);
            geometry.midpoints.push(nalgebra::center(&start, &end));
        }
        Ok(geometry)
    }

    pub fn len(&self) -> usize {
        self.lengths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lengths.is_empty()
    }

    pub fn midpoint_x(&self) -> Vec<f64> {
        self.midpoints.iter().map(|p| p.x).collect()
    }

    pub fn midpoint_y(&self) -> Vec<f64> {
        self.midpoints.iter().map(|p| p.y).collect()
    }

    /// Total arc length of the contour.
    pub fn perimeter(&self) -> f64 {
        self.lengths.iter().sum()
    }
}
