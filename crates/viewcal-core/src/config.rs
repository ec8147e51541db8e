use serde::{Deserialize, Serialize};

use crate::{CalibrationError, RectBounds, Real, XyInclusiveBounds};

/// How the input angle pair is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleConvention {
    /// Independent horizontal and vertical angles from straight ahead.
    #[default]
    FieldAngles,
    /// Longitude (about +Y, towards −X) and latitude (towards +Y).
    LongitudeLatitude,
}

/// Source of the screen-space normalization rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScreenBoundsMode {
    /// Bounding box of the measured screen positions.
    #[default]
    Compute,
    Supplied(RectBounds),
}

/// Maps a recomputed angle pair into the input's angle axes:
/// `input_h = xx·h + xy·v`, `input_v = yx·h + yy·v`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceAxes {
    pub xx: Real,
    pub xy: Real,
    pub yx: Real,
    pub yy: Real,
}

impl Default for ReferenceAxes {
    fn default() -> Self {
        Self {
            xx: 1.0,
            xy: 0.0,
            yx: 0.0,
            yy: 1.0,
        }
    }
}

impl ReferenceAxes {
    pub fn apply(&self, h: Real, v: Real) -> (Real, Real) {
        (self.xx * h + self.xy * v, self.yx * h + self.yy * v)
    }
}

/// Parameters of the diagnostic angle check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleVerification {
    #[serde(default)]
    pub axes: ReferenceAxes,
    pub max_angle_diff_deg: Real,
}

/// Which physical coordinates the distortion mesh is emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MeshSampling {
    /// One row per measurement, in input order.
    #[default]
    Measured,
    /// Regular `cols × rows` grid over `[0, 1]²`, raster order.
    Grid {
        cols: usize,
        rows: usize,
        /// How far (in unit screen coordinates) a grid point may lie outside
        /// the measured area.
        margin: Real,
    },
}

/// Run-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub screen_bounds: ScreenBoundsMode,
    pub angle_convention: AngleConvention,
    /// Linear scale from measurement units to meters.
    pub to_meters: Real,
    /// Distance from the eye at which view rays are placed.
    pub depth: Real,
    /// Angle check; `None` disables it.
    pub verify_angles: Option<AngleVerification>,
    pub overlap_percent: Real,
    /// Input angles outside this range are flagged during validation.
    pub angle_range: XyInclusiveBounds,
    /// Raw screen positions outside this range are flagged during validation.
    pub screen_range: XyInclusiveBounds,
    pub mesh: MeshSampling,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            screen_bounds: ScreenBoundsMode::Compute,
            angle_convention: AngleConvention::FieldAngles,
            to_meters: 1.0,
            depth: 2.0,
            verify_angles: None,
            overlap_percent: 100.0,
            angle_range: XyInclusiveBounds::default(),
            screen_range: XyInclusiveBounds::default(),
            mesh: MeshSampling::Measured,
        }
    }
}

impl Config {
    #[inline]
    pub fn use_field_angles(&self) -> bool {
        self.angle_convention == AngleConvention::FieldAngles
    }

    #[inline]
    pub fn compute_screen_bounds(&self) -> bool {
        matches!(self.screen_bounds, ScreenBoundsMode::Compute)
    }

    /// Check value ranges that every stage relies on.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        if !(self.depth.is_finite() && self.depth > 0.0) {
            return Err(CalibrationError::invalid_config(format!(
                "depth must be positive and finite, got {}",
                self.depth
            )));
        }
        if !(self.to_meters.is_finite() && self.to_meters > 0.0) {
            return Err(CalibrationError::invalid_config(format!(
                "unit scale must be positive and finite, got {}",
                self.to_meters
            )));
        }
        if !(0.0..=100.0).contains(&self.overlap_percent) {
            return Err(CalibrationError::invalid_config(format!(
                "overlap percent must be within [0, 100], got {}",
                self.overlap_percent
            )));
        }
        if let ScreenBoundsMode::Supplied(bounds) = &self.screen_bounds {
            if bounds.is_degenerate() {
                return Err(CalibrationError::invalid_config(format!(
                    "supplied screen bounds have zero extent: {:?}",
                    bounds
                )));
            }
        }
        if let Some(verify) = &self.verify_angles {
            if !(verify.max_angle_diff_deg.is_finite() && verify.max_angle_diff_deg >= 0.0) {
                return Err(CalibrationError::invalid_config(format!(
                    "angle tolerance must be non-negative, got {}",
                    verify.max_angle_diff_deg
                )));
            }
        }
        if let MeshSampling::Grid { cols, rows, margin } = self.mesh {
            if cols < 2 || rows < 2 {
                return Err(CalibrationError::invalid_config(format!(
                    "mesh grid must be at least 2x2, got {}x{}",
                    cols, rows
                )));
            }
            if !(margin.is_finite() && margin >= 0.0) {
                return Err(CalibrationError::invalid_config(format!(
                    "mesh margin must be non-negative, got {}",
                    margin
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = Config::default();
        assert!(cfg.use_field_angles());
        assert!(cfg.compute_screen_bounds());
        assert_eq!(cfg.depth, 2.0);
        assert_eq!(cfg.to_meters, 1.0);
        assert!(cfg.verify_angles.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let cfg = Config {
            depth: 0.0,
            ..Config::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(CalibrationError::InvalidConfiguration { .. })
        ));

        let cfg = Config {
            screen_bounds: ScreenBoundsMode::Supplied(RectBounds {
                left: 0.0,
                right: 0.0,
                top: 1.0,
                bottom: 0.0,
            }),
            ..Config::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = Config {
            mesh: MeshSampling::Grid {
                cols: 1,
                rows: 5,
                margin: 0.0,
            },
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: Config = serde_json::from_str(
            r#"{
                "angle_convention": "longitude_latitude",
                "verify_angles": { "max_angle_diff_deg": 2.0 }
            }"#,
        )
        .unwrap();
        assert!(!cfg.use_field_angles());
        assert_eq!(cfg.depth, 2.0);
        let verify = cfg.verify_angles.unwrap();
        assert_eq!(verify.axes, ReferenceAxes::default());
    }

    #[test]
    fn reference_axes_apply() {
        let axes = ReferenceAxes {
            xx: -1.0,
            xy: 0.0,
            yx: 0.0,
            yy: 1.0,
        };
        assert_eq!(axes.apply(10.0, 5.0), (-10.0, 5.0));
    }
}
