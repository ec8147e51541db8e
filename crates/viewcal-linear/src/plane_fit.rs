//! Total least-squares plane fit.
//!
//! # Algorithm
//!
//! 1. Compute the centroid of the points
//! 2. Build the 3x3 scatter matrix of the centered points
//! 3. Take the eigenvector of the smallest eigenvalue as the plane normal
//! 4. Offset `D = -n̂ · centroid`, then orient the normal so that `D < 0`
//!    (the eye at the origin is behind the normal)
//!
//! Rank deficiency (collinear or coincident points) is detected from the
//! ratio of the two largest eigenvalues.

use nalgebra::{Matrix3, Vector3};
use thiserror::Error;
use viewcal_core::{Pt3, Real, ScreenPlane};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaneFitError {
    #[error("need at least 3 points for a plane, got {0}")]
    NotEnoughPoints(usize),
    #[error("point {0} is not finite")]
    NonFinitePoint(usize),
    #[error("points are collinear or coincident")]
    Collinear,
    #[error("fitted plane passes through the eye")]
    ThroughOrigin,
}

/// Result of a plane fit.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneFitEstimate {
    /// Fitted plane, oriented away from the origin.
    pub plane: ScreenPlane,
    /// Root mean square point-to-plane distance.
    pub rmse: Real,
}

/// Closed-form screen plane solver.
pub struct ScreenPlaneSolver;

impl ScreenPlaneSolver {
    /// Relative eigenvalue ratio below which the points span only a line.
    const RANK_THRESHOLD: Real = 1e-10;
    /// Relative offset below which the plane passes through the eye.
    const THROUGH_ORIGIN_THRESHOLD: Real = 1e-9;

    /// Fit `Ax + By + Cz + D = 0` to `points`.
    ///
    /// Requires at least 3 finite, non-collinear points.
    pub fn from_points(points: &[Pt3]) -> Result<PlaneFitEstimate, PlaneFitError> {
        if points.len() < 3 {
            return Err(PlaneFitError::NotEnoughPoints(points.len()));
        }
        if let Some(idx) = points
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(PlaneFitError::NonFinitePoint(idx));
        }

        let n = points.len() as Real;
        let centroid = points
            .iter()
            .fold(Vector3::zeros(), |acc, p| acc + p.coords)
            / n;

        let mut scatter = Matrix3::zeros();
        for p in points {
            let centered = p.coords - centroid;
            scatter += centered * centered.transpose();
        }

        let eigen = scatter.symmetric_eigen();
        let mut order = [0usize, 1, 2];
        order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));
        let (min_idx, mid_idx, max_idx) = (order[0], order[1], order[2]);
        let mid_eigenvalue = eigen.eigenvalues[mid_idx];
        let max_eigenvalue = eigen.eigenvalues[max_idx];

        // A plane needs two significant directions of spread.
        if max_eigenvalue <= Real::EPSILON
            || mid_eigenvalue / max_eigenvalue < Self::RANK_THRESHOLD
        {
            return Err(PlaneFitError::Collinear);
        }

        let normal: Vector3<Real> = eigen.eigenvectors.column(min_idx).into_owned();
        let offset = -normal.dot(&centroid);

        let scale = points
            .iter()
            .map(|p| p.coords.norm())
            .fold(0.0, Real::max);
        if offset.abs() <= Self::THROUGH_ORIGIN_THRESHOLD * scale.max(1.0) {
            return Err(PlaneFitError::ThroughOrigin);
        }

        let plane = ScreenPlane::from_normal_and_offset(normal, offset).oriented_away_from_origin();

        let sum_sq: Real = points
            .iter()
            .map(|p| plane.signed_distance(p).powi(2))
            .sum();
        let rmse = (sum_sq / n).sqrt();

        Ok(PlaneFitEstimate { plane, rmse })
    }
}
