//! Conversions between view angles and eye-space rays.
//!
//! Field angles place the ray end on the plane `z = −depth`:
//! `(depth·tan h, depth·tan v, −depth)`. Longitude/latitude place it on the
//! sphere of radius `depth`, with longitude measured by [`rotation_about_y`]:
//! `(−depth·sin λ·cos φ, depth·sin φ, −depth·cos λ·cos φ)`.

use crate::{rotation_about_y, AngleConvention, Pt3, Real, ViewAngles};

/// Field angles at or beyond this magnitude (degrees) have no finite ray.
pub const MAX_FIELD_ANGLE_DEG: Real = 90.0;

/// End point of the view ray for `angles` at distance `depth`.
///
/// Returns `None` when the ray cannot be represented, i.e. a field angle of
/// 90° or more.
pub fn view_ray(angles: &ViewAngles, convention: AngleConvention, depth: Real) -> Option<Pt3> {
    let h = angles.horizontal_deg.to_radians();
    let v = angles.vertical_deg.to_radians();
    let p = match convention {
        AngleConvention::FieldAngles => {
            if angles.horizontal_deg.abs() >= MAX_FIELD_ANGLE_DEG
                || angles.vertical_deg.abs() >= MAX_FIELD_ANGLE_DEG
            {
                return None;
            }
            Pt3::new(depth * h.tan(), depth * v.tan(), -depth)
        }
        AngleConvention::LongitudeLatitude => Pt3::new(
            -depth * h.sin() * v.cos(),
            depth * v.sin(),
            -depth * h.cos() * v.cos(),
        ),
    };
    p.coords.iter().all(|c| c.is_finite()).then_some(p)
}

/// Angle pair (degrees) under which the eye sees `p`; inverse of [`view_ray`].
pub fn view_angles_of(p: &Pt3, convention: AngleConvention) -> ViewAngles {
    match convention {
        AngleConvention::FieldAngles => ViewAngles::new(
            p.x.atan2(-p.z).to_degrees(),
            p.y.atan2(-p.z).to_degrees(),
        ),
        AngleConvention::LongitudeLatitude => ViewAngles::new(
            rotation_about_y(p).to_degrees(),
            p.y.atan2(p.x.hypot(p.z)).to_degrees(),
        ),
    }
}
