//! Display configuration document.
//!
//! Serializes calibrated screens into the JSON display descriptor consumed
//! by head-mounted display runtimes: one field of view for the device, one
//! center of projection per eye and the point-sample distortion meshes.

use log::warn;
use serde::{Deserialize, Serialize};
use viewcal_core::Real;

use crate::ScreenCalibration;

/// Largest field of view disagreement between eyes that is accepted silently.
const FOV_TOLERANCE_DEG: Real = 0.5;
const MONO_POINT_SAMPLES: &str = "mono_point_samples";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayDocument {
    pub display: Display,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Display {
    pub hardware: Hardware,
    pub rendering: Rendering,
    pub distortion: Distortion,
    pub eyes: Vec<Eye>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hardware {
    pub field_of_view: FieldOfView,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    pub monocular_horizontal: Real,
    pub monocular_vertical: Real,
    pub overlap_percent: Real,
    pub pitch_tilt: Real,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Rendering {
    pub right_roll: Real,
    pub left_roll: Real,
}

/// Per-eye lists of `[[from_x, from_y], [to_x, to_y]]` samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distortion {
    #[serde(rename = "type")]
    pub kind: String,
    pub mono_point_samples: Vec<Vec<[[Real; 2]; 2]>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Eye {
    pub center_proj_x: Real,
    pub center_proj_y: Real,
    pub rotate_180: u8,
}

impl DisplayDocument {
    /// Document for `screens`, one eye per screen in order.
    ///
    /// The device field of view is taken from the first screen. Returns
    /// `None` for an empty slice.
    pub fn from_screens(screens: &[ScreenCalibration]) -> Option<Self> {
        let first = screens.first()?;
        for other in &screens[1..] {
            let dh = (other.projection.h_fov_deg - first.projection.h_fov_deg).abs();
            let dv = (other.projection.v_fov_deg - first.projection.v_fov_deg).abs();
            if dh > FOV_TOLERANCE_DEG || dv > FOV_TOLERANCE_DEG {
                warn!(
                    "{} field of view ({:.3} x {:.3}) differs from {} ({:.3} x {:.3}); using the latter",
                    other.source,
                    other.projection.h_fov_deg,
                    other.projection.v_fov_deg,
                    first.source,
                    first.projection.h_fov_deg,
                    first.projection.v_fov_deg
                );
            }
        }

        let field_of_view = FieldOfView {
            monocular_horizontal: first.projection.h_fov_deg,
            monocular_vertical: first.projection.v_fov_deg,
            overlap_percent: first.projection.overlap_percent,
            pitch_tilt: 0.0,
        };
        let mono_point_samples = screens
            .iter()
            .map(|s| {
                s.mesh
                    .iter()
                    .map(|row| [[row.from.x, row.from.y], [row.to.x, row.to.y]])
                    .collect()
            })
            .collect();
        let eyes = screens
            .iter()
            .map(|s| Eye {
                center_proj_x: s.projection.center_of_projection.x,
                center_proj_y: s.projection.center_of_projection.y,
                rotate_180: 0,
            })
            .collect();

        Some(Self {
            display: Display {
                hardware: Hardware { field_of_view },
                rendering: Rendering::default(),
                distortion: Distortion {
                    kind: MONO_POINT_SAMPLES.to_string(),
                    mono_point_samples,
                },
                eyes,
            },
        })
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
