use serde::{Deserialize, Serialize};

use crate::{DataOrigin, Pt2, Pt3, Real, ScreenFrame, ScreenPlane, Vec2};

/// User-facing description of one screen's projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionDescription {
    pub h_fov_deg: Real,
    pub v_fov_deg: Real,
    /// Overlap with a neighboring screen; 100 means no neighbor.
    pub overlap_percent: Real,
    /// Center of projection as a fraction of the screen extent.
    pub center_of_projection: Pt2,
}

impl ProjectionDescription {
    pub fn new(h_fov_deg: Real, v_fov_deg: Real) -> Self {
        Self {
            h_fov_deg,
            v_fov_deg,
            overlap_percent: 100.0,
            center_of_projection: Pt2::new(0.5, 0.5),
        }
    }
}

/// Screen geometry produced by screen fitting and consumed as-is by mesh
/// generation and verification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenDetails {
    pub plane: ScreenPlane,
    /// In-plane frame the extents below are expressed in.
    pub frame: ScreenFrame,
    /// Left-most point on the horizontal line through the frame origin.
    pub screen_left: Pt3,
    /// Right-most point on the horizontal line through the frame origin.
    pub screen_right: Pt3,
    /// Maximum absolute vertical in-plane coordinate of any measurement.
    pub max_y: Real,
    /// Measurements that defined the left and right extremes.
    pub left_origin: DataOrigin,
    pub right_origin: DataOrigin,
    /// RMS point-to-plane distance of the fit.
    pub fit_rmse: Real,
}

impl ScreenDetails {
    /// Horizontal in-plane coordinates of the left and right extremes.
    pub fn horizontal_extent(&self) -> (Real, Real) {
        (
            self.frame.coords(&self.screen_left).x,
            self.frame.coords(&self.screen_right).x,
        )
    }

    /// Canonical unit coordinates of an in-plane point: the ideal linear
    /// map of the screen's extents onto `[0, 1]²`.
    pub fn canonical_from_plane(&self, uv: &Vec2) -> Pt2 {
        let (left, right) = self.horizontal_extent();
        Pt2::new(
            (uv.x - left) / (right - left),
            (uv.y + self.max_y) / (2.0 * self.max_y),
        )
    }

    /// Inverse of [`Self::canonical_from_plane`].
    pub fn plane_from_canonical(&self, canonical: &Pt2) -> Vec2 {
        let (left, right) = self.horizontal_extent();
        Vec2::new(
            left + canonical.x * (right - left),
            (2.0 * canonical.y - 1.0) * self.max_y,
        )
    }
}

/// One mesh entry: physical unit coordinate → canonical unit coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshRow {
    pub from: Pt2,
    pub to: Pt2,
}

impl MeshRow {
    pub fn new(from: Pt2, to: Pt2) -> Self {
        Self { from, to }
    }
}

/// Distortion mesh rows in traversal order; topology is implied by order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshDescription {
    pub rows: Vec<MeshRow>,
}

impl MeshDescription {
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, from: Pt2, to: Pt2) {
        self.rows.push(MeshRow::new(from, to));
    }

    pub fn iter(&self) -> impl Iterator<Item = &MeshRow> {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec3;

    fn details() -> ScreenDetails {
        let plane = ScreenPlane::from_normal_and_offset(Vec3::new(0.0, 0.0, -1.0), -2.0);
        let frame = ScreenFrame::from_plane(&plane).unwrap();
        ScreenDetails {
            plane,
            frame,
            screen_left: frame.point(&Vec2::new(-1.0, 0.0)),
            screen_right: frame.point(&Vec2::new(3.0, 0.0)),
            max_y: 0.5,
            left_origin: DataOrigin::unknown(),
            right_origin: DataOrigin::unknown(),
            fit_rmse: 0.0,
        }
    }

    #[test]
    fn canonical_mapping_spans_extents() {
        let d = details();
        assert_eq!(d.horizontal_extent(), (-1.0, 3.0));
        let c = d.canonical_from_plane(&Vec2::new(-1.0, -0.5));
        assert!(c.coords.norm() < 1e-12);
        let c = d.canonical_from_plane(&Vec2::new(1.0, 0.25));
        assert!((c - Pt2::new(0.5, 0.75)).norm() < 1e-12);
        let back = d.plane_from_canonical(&c);
        assert!((back - Vec2::new(1.0, 0.25)).norm() < 1e-12);
    }

    #[test]
    fn projection_defaults() {
        let p = ProjectionDescription::new(60.0, 40.0);
        assert_eq!(p.overlap_percent, 100.0);
        assert_eq!(p.center_of_projection, Pt2::new(0.5, 0.5));
    }
}
