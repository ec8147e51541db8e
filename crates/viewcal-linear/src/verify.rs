//! Diagnostic checks on a fitted screen.
//!
//! Nothing here feeds back into the geometry or the mesh; every check only
//! produces [`Finding`]s for the caller to report.

use std::fmt;

use log::{debug, warn};
use nalgebra::DMatrix;
use serde::Serialize;
use viewcal_core::{
    project_onto_plane, view_angles_of, AngleVerification, Config, DataOrigin,
    InputMeasurements, NormalizedMeasurements, Pt2, Real, ScreenDetails, Vec2, ViewAngles,
};

/// What a check found wrong with one measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FindingKind {
    /// Angle recomputed from the fitted screen disagrees with the input.
    AngleMismatch {
        measured_deg: ViewAngles,
        recomputed_deg: ViewAngles,
        diff_deg: Real,
    },
    AngleOutOfRange { angles_deg: ViewAngles },
    ScreenOutOfRange { screen: Pt2 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub origin: DataOrigin,
    #[serde(flatten)]
    pub kind: FindingKind,
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            FindingKind::AngleMismatch {
                measured_deg,
                recomputed_deg,
                diff_deg,
            } => write!(
                f,
                "{}: measured angles ({:.3}, {:.3}) differ from fitted ({:.3}, {:.3}) by {:.3} deg",
                self.origin,
                measured_deg.horizontal_deg,
                measured_deg.vertical_deg,
                recomputed_deg.horizontal_deg,
                recomputed_deg.vertical_deg,
                diff_deg
            ),
            FindingKind::AngleOutOfRange { angles_deg } => write!(
                f,
                "{}: angles ({}, {}) outside the accepted range",
                self.origin, angles_deg.horizontal_deg, angles_deg.vertical_deg
            ),
            FindingKind::ScreenOutOfRange { screen } => write!(
                f,
                "{}: screen position ({}, {}) outside the accepted range",
                self.origin, screen.x, screen.y
            ),
        }
    }
}

/// Fewest measurements for which the angle check can single out one bad
/// measurement. The affine model has 3 parameters per axis; with fewer
/// than 2 residual degrees of freedom an error spreads over every point.
pub const MIN_ISOLATING_MEASUREMENTS: usize = 5;

/// `true` if the angle check can attribute a mismatch to a single
/// measurement in a set of `count`.
pub fn angle_check_isolates_measurements(count: usize) -> bool {
    count >= MIN_ISOLATING_MEASUREMENTS
}

/// Run every enabled check for one screen.
///
/// `input` and `normalized` must describe the same measurements in the same
/// order.
pub fn verify_measurements(
    input: &InputMeasurements,
    normalized: &NormalizedMeasurements,
    details: &ScreenDetails,
    config: &Config,
) -> Vec<Finding> {
    let mut findings = range_findings(input, config);
    if let Some(verify) = &config.verify_angles {
        findings.extend(angle_findings(input, normalized, details, config, verify));
    }
    debug!("{}: {} verification findings", input.source, findings.len());
    findings
}

fn range_findings(input: &InputMeasurements, config: &Config) -> Vec<Finding> {
    let mut findings = Vec::new();
    for m in &input.measurements {
        let angles = m.view_angles;
        if config
            .angle_range
            .outside(angles.horizontal_deg, angles.vertical_deg)
        {
            findings.push(Finding {
                origin: m.origin(input),
                kind: FindingKind::AngleOutOfRange { angles_deg: angles },
            });
        }
        if config.screen_range.outside(m.screen.x, m.screen.y) {
            findings.push(Finding {
                origin: m.origin(input),
                kind: FindingKind::ScreenOutOfRange { screen: m.screen },
            });
        }
    }
    findings
}

fn angle_findings(
    input: &InputMeasurements,
    normalized: &NormalizedMeasurements,
    details: &ScreenDetails,
    config: &Config,
    verify: &AngleVerification,
) -> Vec<Finding> {
    if !angle_check_isolates_measurements(normalized.len()) {
        warn!(
            "{}: only {} measurements; angle verification cannot isolate a single \
             bad measurement, need at least {}",
            normalized.source,
            normalized.len(),
            MIN_ISOLATING_MEASUREMENTS
        );
    }
    let uvs: Vec<Vec2> = normalized
        .measurements
        .iter()
        .filter_map(|m| project_onto_plane(&m.point_from_view, &details.plane))
        .map(|p| details.frame.coords(&p))
        .collect();
    if uvs.len() != normalized.len() {
        return Vec::new();
    }
    let screens: Vec<Pt2> = normalized.measurements.iter().map(|m| m.screen).collect();
    let Some(model) = ScreenToPlane::fit(&screens, &uvs) else {
        debug!(
            "{}: screen positions do not support an affine model, angle check skipped",
            normalized.source
        );
        return Vec::new();
    };

    let mut findings = Vec::new();
    for (m, screen) in input.measurements.iter().zip(&screens) {
        let predicted = details.frame.point(&model.apply(screen));
        let recomputed = view_angles_of(&predicted, config.angle_convention);
        let (h, v) = verify
            .axes
            .apply(recomputed.horizontal_deg, recomputed.vertical_deg);
        let recomputed = ViewAngles::new(h, v);
        let measured = m.view_angles;
        let diff = angle_diff(measured.horizontal_deg, recomputed.horizontal_deg)
            .max(angle_diff(measured.vertical_deg, recomputed.vertical_deg));
        if diff > verify.max_angle_diff_deg {
            findings.push(Finding {
                origin: m.origin(input),
                kind: FindingKind::AngleMismatch {
                    measured_deg: measured,
                    recomputed_deg: recomputed,
                    diff_deg: diff,
                },
            });
        }
    }
    findings
}

/// Absolute difference of two angles in degrees, wrapped to `[0, 180]`.
fn angle_diff(a: Real, b: Real) -> Real {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Least-squares affine map from normalized screen position to in-plane
/// coordinates.
struct ScreenToPlane {
    coeffs: DMatrix<Real>,
}

impl ScreenToPlane {
    const SINGULAR_RATIO: Real = 1e-10;

    fn fit(screens: &[Pt2], uvs: &[Vec2]) -> Option<Self> {
        let n = screens.len();
        if n < 3 {
            return None;
        }
        let a = DMatrix::from_fn(n, 3, |r, c| match c {
            0 => 1.0,
            1 => screens[r].x,
            _ => screens[r].y,
        });
        let b = DMatrix::from_fn(n, 2, |r, c| uvs[r][c]);

        let svd = a.svd(true, true);
        let max_sv = svd.singular_values.max();
        let min_sv = svd.singular_values.min();
        if !(max_sv > 0.0) || min_sv / max_sv < Self::SINGULAR_RATIO {
            return None;
        }
        let coeffs = svd.solve(&b, 0.0).ok()?;
        Some(Self { coeffs })
    }

    fn apply(&self, screen: &Pt2) -> Vec2 {
        let c = &self.coeffs;
        Vec2::new(
            c[(0, 0)] + c[(1, 0)] * screen.x + c[(2, 0)] * screen.y,
            c[(0, 1)] + c[(1, 1)] * screen.x + c[(2, 1)] * screen.y,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewcal_core::{InclusiveBounds, InputMeasurement, XyInclusiveBounds};

    #[test]
    fn angle_diff_wraps() {
        assert!((angle_diff(179.0, -179.0) - 2.0).abs() < 1e-12);
        assert!((angle_diff(10.0, 12.5) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn affine_model_reproduces_exact_data() {
        let screens = vec![
            Pt2::new(0.0, 0.0),
            Pt2::new(1.0, 0.0),
            Pt2::new(0.0, 1.0),
            Pt2::new(1.0, 1.0),
        ];
        let uvs: Vec<Vec2> = screens
            .iter()
            .map(|s| Vec2::new(-1.0 + 2.0 * s.x, 0.5 - s.y + 0.1 * s.x))
            .collect();
        let model = ScreenToPlane::fit(&screens, &uvs).unwrap();
        let p = model.apply(&Pt2::new(0.25, 0.75));
        assert!((p - Vec2::new(-0.5, -0.225)).norm() < 1e-12);
    }

    #[test]
    fn range_checks_flag_each_measurement() {
        let input = InputMeasurements::new(
            "r.txt",
            vec![
                InputMeasurement::new(Pt2::new(0.0, 0.0), ViewAngles::new(-10.0, 0.0), 1),
                InputMeasurement::new(Pt2::new(5.0, 0.0), ViewAngles::new(70.0, 0.0), 2),
            ],
        );
        let config = Config {
            angle_range: XyInclusiveBounds::new(
                InclusiveBounds::new(-45.0, 45.0),
                InclusiveBounds::Unbounded,
            ),
            screen_range: XyInclusiveBounds::new(
                InclusiveBounds::new(0.0, 4.0),
                InclusiveBounds::Unbounded,
            ),
            ..Config::default()
        };
        let findings = range_findings(&input, &config);
        assert_eq!(findings.len(), 2);
        assert!(findings
            .iter()
            .all(|f| f.origin == DataOrigin::new("r.txt", 2)));
        assert!(matches!(findings[0].kind, FindingKind::AngleOutOfRange { .. }));
        assert!(findings[1].to_string().starts_with("r.txt:2: screen position"));
    }
}
