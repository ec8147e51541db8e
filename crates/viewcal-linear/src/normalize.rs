//! Measurement normalization.
//!
//! Maps each raw measurement's screen position into `[0, 1]²` using the
//! batch extents (or the configured rectangle), and turns its view angles
//! into an eye-space point at the configured working depth, scaled to
//! meters.

use log::debug;
use viewcal_core::{
    view_ray, CalibrationError, Config, DataOrigin, InputMeasurement, InputMeasurements,
    NormalizedMeasurement, NormalizedMeasurements, RectBounds, ScreenBoundsMode,
};

/// Rectangle used as the normalization denominator for `input`.
pub fn resolve_screen_bounds(
    input: &InputMeasurements,
    config: &Config,
) -> Result<RectBounds, CalibrationError> {
    match config.screen_bounds {
        ScreenBoundsMode::Supplied(bounds) => {
            if bounds.is_degenerate() {
                return Err(CalibrationError::invalid_config(format!(
                    "supplied screen bounds have zero extent: {:?}",
                    bounds
                )));
            }
            Ok(bounds)
        }
        ScreenBoundsMode::Compute => {
            let bounds = input.screen_extent().ok_or_else(|| {
                CalibrationError::invalid_config(format!(
                    "no measurements in {} to compute screen bounds from",
                    input.source
                ))
            })?;
            if bounds.is_degenerate() {
                return Err(CalibrationError::invalid_config(format!(
                    "measured screen positions in {} have zero width or height \
                     ({} x {}); supply screen bounds explicitly",
                    input.source,
                    bounds.width(),
                    bounds.height()
                )));
            }
            Ok(bounds)
        }
    }
}

fn check_screen_finite(
    measurement: &InputMeasurement,
    origin: &DataOrigin,
) -> Result<(), CalibrationError> {
    let screen = &measurement.screen;
    if screen.x.is_finite() && screen.y.is_finite() {
        return Ok(());
    }
    Err(CalibrationError::numeric(
        format!("screen position ({}, {}) is not finite", screen.x, screen.y),
        origin.clone(),
    ))
}

/// Normalize one measurement against `bounds`.
pub fn normalize_measurement(
    measurement: &InputMeasurement,
    origin: DataOrigin,
    bounds: &RectBounds,
    config: &Config,
) -> Result<NormalizedMeasurement, CalibrationError> {
    check_screen_finite(measurement, &origin)?;
    let ray = view_ray(&measurement.view_angles, config.angle_convention, config.depth)
        .ok_or_else(|| {
            CalibrationError::numeric(
                format!(
                    "view angles ({}, {}) have no finite ray",
                    measurement.view_angles.horizontal_deg, measurement.view_angles.vertical_deg
                ),
                origin,
            )
        })?;

    Ok(NormalizedMeasurement {
        screen: bounds.normalize(&measurement.screen),
        point_from_view: ray * config.to_meters,
        line: measurement.line,
    })
}

/// Normalize a whole measurement set.
pub fn normalize_measurements(
    input: &InputMeasurements,
    config: &Config,
) -> Result<NormalizedMeasurements, CalibrationError> {
    for m in &input.measurements {
        check_screen_finite(m, &m.origin(input))?;
    }
    let bounds = resolve_screen_bounds(input, config)?;
    debug!(
        "{}: normalizing {} measurements against bounds left={} right={} bottom={} top={}",
        input.source,
        input.len(),
        bounds.left,
        bounds.right,
        bounds.bottom,
        bounds.top
    );

    let measurements = input
        .measurements
        .iter()
        .map(|m| normalize_measurement(m, m.origin(input), &bounds, config))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NormalizedMeasurements {
        source: input.source.clone(),
        measurements,
    })
}
