//! Screen fitting.
//!
//! Fits the screen plane to the eye-space points of all measurements,
//! expresses every measurement in the plane's own 2D frame, and derives the
//! field of view and center of projection from the resulting extents.
//!
//! The frame's axes follow device +X and +Y, each flipped if needed so that
//! it increases with the measured normalized screen coordinate. This makes
//! the result independent of the sign convention of the input angles.

use log::debug;
use viewcal_core::{
    angle_between, project_onto_plane, CalibrationError, Config, NormalizedMeasurements,
    ProjectionDescription, Pt2, Real, ScreenDetails, ScreenFrame, Vec2,
};

use crate::{PlaneFitError, ScreenPlaneSolver};

/// Minimum in-plane extent (eye-space units) for a usable screen.
const MIN_EXTENT: Real = 1e-9;

/// Output of screen fitting; both parts come from the same fitted plane.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenFit {
    pub projection: ProjectionDescription,
    pub details: ScreenDetails,
}

/// Fit the screen for one measurement set.
pub fn find_screen(
    normalized: &NormalizedMeasurements,
    config: &Config,
) -> Result<ScreenFit, CalibrationError> {
    let origins = normalized.origins();
    let points: Vec<_> = normalized
        .measurements
        .iter()
        .map(|m| m.point_from_view)
        .collect();

    let fit = ScreenPlaneSolver::from_points(&points).map_err(|err| match err {
        PlaneFitError::NonFinitePoint(idx) => {
            CalibrationError::numeric(err.to_string(), normalized.origin_of(idx))
        }
        _ => CalibrationError::degenerate(err.to_string(), origins.clone()),
    })?;
    let plane = fit.plane;
    debug!(
        "{}: screen plane A={:.6} B={:.6} C={:.6} D={:.6}, rmse={:.3e}",
        normalized.source,
        plane.a(),
        plane.b(),
        plane.c(),
        plane.d(),
        fit.rmse
    );

    let frame = ScreenFrame::from_plane(&plane).ok_or_else(|| {
        CalibrationError::degenerate(
            "screen plane is edge-on to the horizontal axis",
            origins.clone(),
        )
    })?;

    let mut on_screen = Vec::with_capacity(points.len());
    for (idx, p) in points.iter().enumerate() {
        let q = project_onto_plane(p, &plane).ok_or_else(|| {
            CalibrationError::numeric(
                "view ray parallel to screen plane",
                normalized.origin_of(idx),
            )
        })?;
        if q.coords.dot(&p.coords) <= 0.0 {
            return Err(CalibrationError::numeric(
                "view ray points away from the screen plane",
                normalized.origin_of(idx),
            ));
        }
        on_screen.push(q);
    }

    let coords: Vec<Vec2> = on_screen.iter().map(|q| frame.coords(q)).collect();
    let screens: Vec<Pt2> = normalized.measurements.iter().map(|m| m.screen).collect();
    let frame = frame.flipped(
        covariance(&coords, &screens, |c| c.x, |s| s.x) < 0.0,
        covariance(&coords, &screens, |c| c.y, |s| s.y) < 0.0,
    );
    let coords: Vec<Vec2> = on_screen.iter().map(|q| frame.coords(q)).collect();
    for (origin, (q, uv)) in origins.iter().zip(on_screen.iter().zip(&coords)) {
        debug!(
            "{origin}: on screen ({:.6}, {:.6}, {:.6}), in-plane ({:.6}, {:.6})",
            q.x, q.y, q.z, uv.x, uv.y
        );
    }

    let (left_idx, right_idx) = horizontal_extremes(&coords);
    let u_left = coords[left_idx].x;
    let u_right = coords[right_idx].x;
    let max_y = coords.iter().map(|c| c.y.abs()).fold(0.0, Real::max);

    if u_right - u_left <= MIN_EXTENT {
        return Err(CalibrationError::degenerate(
            "measurements span no horizontal extent on the screen",
            origins,
        ));
    }
    if max_y <= MIN_EXTENT {
        return Err(CalibrationError::degenerate(
            "measurements span no vertical extent on the screen",
            origins,
        ));
    }

    let screen_left = frame.point(&Vec2::new(u_left, 0.0));
    let screen_right = frame.point(&Vec2::new(u_right, 0.0));
    let distance = plane.distance_from_origin();

    let projection = ProjectionDescription {
        h_fov_deg: angle_between(&screen_left, &screen_right).to_degrees(),
        v_fov_deg: (2.0 * (max_y / distance).atan()).to_degrees(),
        overlap_percent: config.overlap_percent,
        center_of_projection: Pt2::new(-u_left / (u_right - u_left), 0.5),
    };
    debug!(
        "{}: horizontal extent [{:.6}, {:.6}] ({} .. {}), max |y| {:.6}, distance {:.6}",
        normalized.source,
        u_left,
        u_right,
        origins[left_idx],
        origins[right_idx],
        max_y,
        distance
    );

    let details = ScreenDetails {
        plane,
        frame,
        screen_left,
        screen_right,
        max_y,
        left_origin: origins[left_idx].clone(),
        right_origin: origins[right_idx].clone(),
        fit_rmse: fit.rmse,
    };

    Ok(ScreenFit {
        projection,
        details,
    })
}

/// Indices of the smallest and largest horizontal coordinate.
fn horizontal_extremes(coords: &[Vec2]) -> (usize, usize) {
    let mut left = 0;
    let mut right = 0;
    for (i, c) in coords.iter().enumerate() {
        if c.x < coords[left].x {
            left = i;
        }
        if c.x > coords[right].x {
            right = i;
        }
    }
    (left, right)
}

/// Sample covariance between one in-plane axis and one screen axis.
fn covariance(
    coords: &[Vec2],
    screens: &[Pt2],
    plane_axis: impl Fn(&Vec2) -> Real,
    screen_axis: impl Fn(&Pt2) -> Real,
) -> Real {
    let n = coords.len() as Real;
    let mean_c = coords.iter().map(&plane_axis).sum::<Real>() / n;
    let mean_s = screens.iter().map(&screen_axis).sum::<Real>() / n;
    coords
        .iter()
        .zip(screens)
        .map(|(c, s)| (plane_axis(c) - mean_c) * (screen_axis(s) - mean_s))
        .sum()
}
