//! Distortion mesh generation.
//!
//! Each measurement contributes one sample: its normalized physical screen
//! position paired with the canonical coordinate of its view point on the
//! fitted screen. The mesh is either those samples in input order, or a
//! regular grid resampled from them with a local weighted affine fit.

use log::debug;
use nalgebra::{Matrix3, Vector3};
use viewcal_core::{
    project_onto_plane, CalibrationError, DataOrigin, MeshDescription, MeshSampling,
    NormalizedMeasurements, Pt2, Pt3, Real, ScreenDetails,
};

/// Neighbors used by the local fit.
const NEIGHBORS: usize = 8;
/// Squared distance below which a grid point coincides with a sample.
const EXACT_HIT_SQ: Real = 1e-24;
const WEIGHT_EPS: Real = 1e-12;
/// Relative singular value below which the local system is rank deficient.
const SINGULAR_RATIO: Real = 1e-10;

/// Canonical unit coordinate of the point where the view ray through
/// `point` meets the screen.
///
/// Returns `None` if the ray is parallel to the screen.
pub fn canonical_coordinate(point: &Pt3, details: &ScreenDetails) -> Option<Pt2> {
    let on_screen = project_onto_plane(point, &details.plane)?;
    let uv = details.frame.coords(&on_screen);
    Some(details.canonical_from_plane(&uv))
}

/// Build the distortion mesh for one screen.
pub fn find_mesh(
    normalized: &NormalizedMeasurements,
    details: &ScreenDetails,
    sampling: &MeshSampling,
) -> Result<MeshDescription, CalibrationError> {
    let samples = mesh_samples(normalized, details)?;

    let mesh = match *sampling {
        MeshSampling::Measured => {
            let mut mesh = MeshDescription::default();
            for s in &samples {
                mesh.push(s.from, s.to);
            }
            mesh
        }
        MeshSampling::Grid { cols, rows, margin } => {
            resample_grid(&samples, cols, rows, margin, &normalized.source)?
        }
    };
    debug!("{}: mesh with {} rows", normalized.source, mesh.len());
    Ok(mesh)
}

#[derive(Debug, Clone)]
struct Sample {
    from: Pt2,
    to: Pt2,
    origin: DataOrigin,
}

fn mesh_samples(
    normalized: &NormalizedMeasurements,
    details: &ScreenDetails,
) -> Result<Vec<Sample>, CalibrationError> {
    normalized
        .measurements
        .iter()
        .map(|m| {
            let origin = m.origin(normalized);
            let to = canonical_coordinate(&m.point_from_view, details).ok_or_else(|| {
                CalibrationError::numeric("view ray parallel to screen plane", origin.clone())
            })?;
            Ok(Sample {
                from: m.screen,
                to,
                origin,
            })
        })
        .collect()
}

fn resample_grid(
    samples: &[Sample],
    cols: usize,
    rows: usize,
    margin: Real,
    source: &str,
) -> Result<MeshDescription, CalibrationError> {
    let (min, max) = sample_extent(samples).ok_or_else(|| CalibrationError::InsufficientCoverage {
        reason: format!("{source}: no samples to resample the mesh from"),
        origins: Vec::new(),
    })?;

    let mut mesh = MeshDescription::default();
    for j in 0..rows {
        for i in 0..cols {
            let p = Pt2::new(grid_step(i, cols), grid_step(j, rows));
            let outside = p.x < min.x - margin
                || p.x > max.x + margin
                || p.y < min.y - margin
                || p.y > max.y + margin;
            if outside {
                let nearest = nearest_sample(samples, &p);
                return Err(CalibrationError::InsufficientCoverage {
                    reason: format!(
                        "grid point ({:.4}, {:.4}) lies outside the measured area \
                         [{:.4}, {:.4}] x [{:.4}, {:.4}] by more than {}",
                        p.x, p.y, min.x, max.x, min.y, max.y, margin
                    ),
                    origins: nearest.map(|s| vec![s.origin.clone()]).unwrap_or_default(),
                });
            }
            let to = interpolate(samples, &p).ok_or_else(|| {
                CalibrationError::InsufficientCoverage {
                    reason: format!(
                        "samples around ({:.4}, {:.4}) do not span both screen axes",
                        p.x, p.y
                    ),
                    origins: samples.iter().map(|s| s.origin.clone()).collect(),
                }
            })?;
            mesh.push(p, to);
        }
    }
    Ok(mesh)
}

fn grid_step(i: usize, n: usize) -> Real {
    i as Real / (n - 1).max(1) as Real
}

fn sample_extent(samples: &[Sample]) -> Option<(Pt2, Pt2)> {
    let first = samples.first()?;
    let mut min = first.from;
    let mut max = first.from;
    for s in samples {
        min.x = min.x.min(s.from.x);
        min.y = min.y.min(s.from.y);
        max.x = max.x.max(s.from.x);
        max.y = max.y.max(s.from.y);
    }
    Some((min, max))
}

fn nearest_sample<'a>(samples: &'a [Sample], p: &Pt2) -> Option<&'a Sample> {
    samples
        .iter()
        .min_by(|a, b| (a.from - p).norm_squared().total_cmp(&(b.from - p).norm_squared()))
}

/// Value of the sampled map at `p`.
///
/// Fits `to ≈ c + J·(from − p)` by weighted least squares over the nearest
/// samples, weights `1 / (d² + ε)`, and returns `c`. Falls back to all
/// samples when the neighborhood is rank deficient.
fn interpolate(samples: &[Sample], p: &Pt2) -> Option<Pt2> {
    let mut by_distance: Vec<(Real, &Sample)> = samples
        .iter()
        .map(|s| ((s.from - p).norm_squared(), s))
        .collect();
    by_distance.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (d2, closest) = by_distance.first()?;
    if *d2 <= EXACT_HIT_SQ {
        return Some(closest.to);
    }

    let k = NEIGHBORS.min(by_distance.len());
    local_affine(&by_distance[..k], p).or_else(|| local_affine(&by_distance, p))
}

fn local_affine(neighbors: &[(Real, &Sample)], p: &Pt2) -> Option<Pt2> {
    let mut normal = Matrix3::<Real>::zeros();
    let mut rhs_x = Vector3::<Real>::zeros();
    let mut rhs_y = Vector3::<Real>::zeros();
    for (d2, s) in neighbors {
        let w = 1.0 / (d2 + WEIGHT_EPS);
        let basis = Vector3::new(1.0, s.from.x - p.x, s.from.y - p.y);
        normal += basis * basis.transpose() * w;
        rhs_x += basis * (w * s.to.x);
        rhs_y += basis * (w * s.to.y);
    }

    let svd = normal.svd(true, true);
    let max_sv = svd.singular_values.max();
    let min_sv = svd.singular_values.min();
    if !(max_sv > 0.0) || min_sv / max_sv < SINGULAR_RATIO {
        return None;
    }
    let cx = svd.solve(&rhs_x, 0.0).ok()?;
    let cy = svd.solve(&rhs_y, 0.0).ok()?;
    Some(Pt2::new(cx[0], cy[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn affine_samples() -> Vec<Sample> {
        let mut out = Vec::new();
        for j in 0..4 {
            for i in 0..4 {
                let from = Pt2::new(i as Real / 3.0, j as Real / 3.0);
                out.push(Sample {
                    from,
                    to: Pt2::new(0.1 + 0.8 * from.x + 0.05 * from.y, 0.2 + 0.6 * from.y),
                    origin: DataOrigin::new("grid", out.len() + 1),
                });
            }
        }
        out
    }

    #[test]
    fn exact_hit_returns_sample() {
        let samples = affine_samples();
        let v = interpolate(&samples, &samples[5].from).unwrap();
        assert_eq!(v, samples[5].to);
    }

    #[test]
    fn affine_map_is_reproduced() {
        let samples = affine_samples();
        let p = Pt2::new(0.4, 0.55);
        let v = interpolate(&samples, &p).unwrap();
        let expected = Pt2::new(0.1 + 0.8 * 0.4 + 0.05 * 0.55, 0.2 + 0.6 * 0.55);
        assert!((v - expected).norm() < 1e-9);
    }

    #[test]
    fn collinear_neighbors_fall_back_or_fail() {
        let samples: Vec<Sample> = (0..4)
            .map(|i| Sample {
                from: Pt2::new(i as Real, 0.0),
                to: Pt2::new(i as Real, 0.0),
                origin: DataOrigin::unknown(),
            })
            .collect();
        assert!(interpolate(&samples, &Pt2::new(0.5, 0.5)).is_none());
    }

    #[test]
    fn grid_outside_margin_names_nearest_sample() {
        let samples: Vec<Sample> = affine_samples()
            .into_iter()
            .filter(|s| s.from.x < 0.5)
            .collect();
        let err = resample_grid(&samples, 3, 3, 0.1, "half").unwrap_err();
        match err {
            CalibrationError::InsufficientCoverage { origins, .. } => {
                assert_eq!(origins.len(), 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn grid_is_raster_ordered() {
        let mesh = resample_grid(&affine_samples(), 3, 2, 0.0, "grid").unwrap();
        let froms: Vec<Pt2> = mesh.iter().map(|r| r.from).collect();
        assert_eq!(
            froms,
            vec![
                Pt2::new(0.0, 0.0),
                Pt2::new(0.5, 0.0),
                Pt2::new(1.0, 0.0),
                Pt2::new(0.0, 1.0),
                Pt2::new(0.5, 1.0),
                Pt2::new(1.0, 1.0),
            ]
        );
    }
}
