//! Synthetic flat screens seen from the eye.
//!
//! A [`SyntheticScreen`] is a rectangle on a known plane. Sampling it on a
//! regular grid yields raw measurements (screen position in "pixels" plus
//! the exact view angles), ordered deterministically in row-major order
//! (Y major), like the planar target grids of the calibration tests.

use nalgebra::{Rotation3, Vector3};

use super::UniformAngleNoise;
use crate::{
    angle_between, view_angles_of, AngleConvention, InputMeasurement, InputMeasurements,
    ProjectionDescription, Pt2, Pt3, Real, ScreenFrame, ScreenPlane, Vec2, Vec3,
};

/// Rectangle on a plane at `distance` from the eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticScreen {
    pub distance: Real,
    /// Rotation of the screen normal about +Y.
    pub yaw_deg: Real,
    /// Rotation of the screen normal about +X.
    pub pitch_deg: Real,
    /// Screen center in the plane frame, relative to the foot of the
    /// perpendicular from the eye.
    pub center: Vec2,
    pub width: Real,
    pub height: Real,
    /// Raw screen units spanned by the width and height.
    pub resolution: Vec2,
}

impl SyntheticScreen {
    /// Screen facing the eye, centered on the forward axis.
    pub fn frontal(distance: Real, width: Real, height: Real) -> Self {
        Self {
            distance,
            yaw_deg: 0.0,
            pitch_deg: 0.0,
            center: Vec2::zeros(),
            width,
            height,
            resolution: Vec2::new(1920.0, 1080.0),
        }
    }

    pub fn plane(&self) -> ScreenPlane {
        let rot = Rotation3::from_axis_angle(&Vector3::y_axis(), self.yaw_deg.to_radians())
            * Rotation3::from_axis_angle(&Vector3::x_axis(), self.pitch_deg.to_radians());
        let normal: Vec3 = rot * Vec3::new(0.0, 0.0, -1.0);
        ScreenPlane::from_normal_and_offset(normal, -self.distance)
    }

    /// In-plane frame matching the one the screen fit derives.
    ///
    /// # Panics
    ///
    /// Panics if the screen is edge-on to device X (e.g. `yaw_deg` of ±90
    /// with no pitch), where no in-plane horizontal axis exists.
    pub fn frame(&self) -> ScreenFrame {
        ScreenFrame::from_plane(&self.plane()).expect("synthetic screen must not be edge-on")
    }

    /// In-plane coordinates of the unit screen position `unit`.
    pub fn plane_coords(&self, unit: &Pt2) -> Vec2 {
        self.center + Vec2::new((unit.x - 0.5) * self.width, (unit.y - 0.5) * self.height)
    }

    /// Eye-space point at the unit screen position `unit`.
    ///
    /// # Panics
    ///
    /// Panics under the same condition as [`Self::frame`].
    pub fn point_at(&self, unit: &Pt2) -> Pt3 {
        self.frame().point(&self.plane_coords(unit))
    }

    /// Raw screen position (in `resolution` units) of `unit`.
    pub fn raw_position(&self, unit: &Pt2) -> Pt2 {
        Pt2::new(unit.x * self.resolution.x, unit.y * self.resolution.y)
    }

    /// Exact measurements on a `cols × rows` grid, line numbers from 1.
    ///
    /// # Panics
    ///
    /// Panics under the same condition as [`Self::frame`].
    pub fn measurements(
        &self,
        cols: usize,
        rows: usize,
        convention: AngleConvention,
        source: &str,
    ) -> InputMeasurements {
        self.measurements_with_noise(cols, rows, convention, source, &UniformAngleNoise::default())
    }

    /// Grid measurements with deterministic angle noise.
    ///
    /// # Panics
    ///
    /// Panics under the same condition as [`Self::frame`].
    pub fn measurements_with_noise(
        &self,
        cols: usize,
        rows: usize,
        convention: AngleConvention,
        source: &str,
        noise: &UniformAngleNoise,
    ) -> InputMeasurements {
        let mut measurements = Vec::with_capacity(cols.saturating_mul(rows));
        for j in 0..rows {
            for i in 0..cols {
                let unit = Pt2::new(unit_step(i, cols), unit_step(j, rows));
                let idx = measurements.len();
                let angles = noise.apply(idx, view_angles_of(&self.point_at(&unit), convention));
                measurements.push(InputMeasurement::new(
                    self.raw_position(&unit),
                    angles,
                    idx + 1,
                ));
            }
        }
        InputMeasurements::new(source, measurements)
    }

    /// Projection parameters this screen should fit to.
    ///
    /// # Panics
    ///
    /// Panics under the same condition as [`Self::frame`].
    pub fn expected_projection(&self) -> ProjectionDescription {
        let frame = self.frame();
        let left = self.center.x - 0.5 * self.width;
        let right = self.center.x + 0.5 * self.width;
        let max_y = (self.center.y - 0.5 * self.height)
            .abs()
            .max((self.center.y + 0.5 * self.height).abs());
        let h_fov = angle_between(
            &frame.point(&Vec2::new(left, 0.0)),
            &frame.point(&Vec2::new(right, 0.0)),
        );
        let v_fov = 2.0 * (max_y / self.distance).atan();
        ProjectionDescription {
            h_fov_deg: h_fov.to_degrees(),
            v_fov_deg: v_fov.to_degrees(),
            overlap_percent: 100.0,
            center_of_projection: Pt2::new(-left / (right - left), 0.5),
        }
    }
}

fn unit_step(i: usize, n: usize) -> Real {
    if n <= 1 {
        0.5
    } else {
        i as Real / (n - 1) as Real
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_row_major() {
        let screen = SyntheticScreen::frontal(2.0, 2.0, 1.0);
        let set = screen.measurements(3, 2, AngleConvention::FieldAngles, "synthetic");
        assert_eq!(set.len(), 6);
        assert_eq!(set.measurements[1].screen, Pt2::new(960.0, 0.0));
        assert_eq!(set.measurements[3].screen, Pt2::new(0.0, 1080.0));
        assert_eq!(set.measurements[5].line, 6);
    }

    #[test]
    fn frontal_expected_projection() {
        let screen = SyntheticScreen::frontal(2.0, 4.0 * 30f64.to_radians().tan(), 2.0);
        let p = screen.expected_projection();
        assert!((p.h_fov_deg - 60.0).abs() < 1e-9);
        assert!((p.center_of_projection.x - 0.5).abs() < 1e-12);
    }

    #[test]
    fn tilted_plane_keeps_distance() {
        let screen = SyntheticScreen {
            yaw_deg: 15.0,
            pitch_deg: -5.0,
            ..SyntheticScreen::frontal(1.5, 2.0, 1.0)
        };
        let plane = screen.plane();
        assert!((plane.d() + 1.5).abs() < 1e-12);
        let p = screen.point_at(&Pt2::new(0.2, 0.9));
        assert!(plane.signed_distance(&p).abs() < 1e-12);
    }

    #[test]
    #[should_panic(expected = "edge-on")]
    fn edge_on_screen_has_no_frame() {
        let screen = SyntheticScreen {
            yaw_deg: 90.0,
            ..SyntheticScreen::frontal(1.0, 1.0, 1.0)
        };
        let _ = screen.frame();
    }
}
