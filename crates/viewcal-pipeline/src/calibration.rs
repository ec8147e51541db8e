use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;
use viewcal_core::{
    CalibrationError, Config, InputMeasurements, MeshDescription, ProjectionDescription,
    ScreenDetails,
};
use viewcal_linear::{find_mesh, find_screen, normalize_measurements, verify_measurements, Finding};

/// Everything computed for one screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenCalibration {
    /// Name of the measurement source the screen was fitted from.
    pub source: String,
    pub projection: ProjectionDescription,
    pub details: ScreenDetails,
    pub mesh: MeshDescription,
    /// Non-fatal diagnostics; empty when verification is off and no range
    /// constraints are set.
    pub findings: Vec<Finding>,
}

/// Calibrate one screen: normalize, fit the screen, build the mesh, verify.
///
/// Any geometry failure aborts this screen only; verification findings are
/// returned alongside a successful result.
pub fn calibrate_screen(
    input: &InputMeasurements,
    config: &Config,
) -> Result<ScreenCalibration, CalibrationError> {
    config.validate()?;
    if input.len() < 3 {
        return Err(CalibrationError::degenerate(
            format!("need at least 3 measurements, got {}", input.len()),
            input.origins(),
        ));
    }

    let normalized = normalize_measurements(input, config)?;
    let fit = find_screen(&normalized, config)?;
    let mesh = find_mesh(&normalized, &fit.details, &config.mesh)?;
    let findings = verify_measurements(input, &normalized, &fit.details, config);

    for finding in &findings {
        warn!("{finding}");
    }
    info!(
        "{}: hfov {:.3} deg, vfov {:.3} deg, center of projection ({:.4}, {:.4}), {} mesh rows, {} findings",
        input.source,
        fit.projection.h_fov_deg,
        fit.projection.v_fov_deg,
        fit.projection.center_of_projection.x,
        fit.projection.center_of_projection.y,
        mesh.len(),
        findings.len()
    );

    Ok(ScreenCalibration {
        source: input.source.clone(),
        projection: fit.projection,
        details: fit.details,
        mesh,
        findings,
    })
}

/// Calibrate several independent screens in parallel.
///
/// Results are in input order; one screen failing does not affect the others.
pub fn calibrate_screens(
    inputs: &[InputMeasurements],
    config: &Config,
) -> Vec<Result<ScreenCalibration, CalibrationError>> {
    inputs
        .par_iter()
        .map(|input| calibrate_screen(input, config))
        .collect()
}
