//! Least-squares plane fit `z = b0 + b1 x + b2 y`.

use nalgebra::{DMatrix, DVector, Vector3};

use crate::error::{ForceChainError, Result};

/// Singular values below this fraction of the largest one count as zero.
const RANK_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneFit {
    pub intercept: f64,
    pub slope_x: f64,
    pub slope_y: f64,
}

impl PlaneFit {
    /// Fits the plane through `points`, solving the normal problem by SVD.
    ///
    /// Needs at least three points. When the points are collinear in the xy
    /// projection the minimum-norm least-squares solution is returned, which
    /// keeps every slope that the points do determine.
    pub fn fit(points: &[Vector3<f64>]) -> Result<Self> {
        if points.len() < 3 {
            return Err(ForceChainError::Geometry(format!(
                "plane fit needs at least 3 points, got {}",
                points.len()
            )));
        }

        let design = DMatrix::from_fn(points.len(), 3, |row, col| match col {
            0 => 1.0,
            1 => points[row].x,
            _ => points[row].y,
        });
        let z = DVector::from_iterator(points.len(), points.iter().map(|p| p.z));

        let svd = design.svd(true, true);
        let cutoff = svd.singular_values.max() * RANK_TOLERANCE;
        let b = svd
            .solve(&z, cutoff)
            .map_err(|e| ForceChainError::Geometry(format!("plane fit failed: {e}")))?;
        Ok(Self {
            intercept: b[0],
            slope_x: b[1],
            slope_y: b[2],
        })
    }

    /// Upward plane normal `(-b1, -b2, 1)`, not normalised.
    pub fn normal(&self) -> Vector3<f64> {
        Vector3::new(-self.slope_x, -self.slope_y, 1.0)
    }
}
