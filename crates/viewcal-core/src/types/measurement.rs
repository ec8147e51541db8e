//! Measurement types.
//!
//! Raw measurements pair a screen position (arbitrary units) with the view
//! angle at which that position appears to the eye. Normalized measurements
//! carry the same correspondence in unit screen coordinates and eye space.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Pt2, Pt3, RectBounds, Real};

/// Where a measurement (or a quantity derived from it) came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DataOrigin(Option<SourceLine>);

/// A line within a named input source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLine {
    pub source: String,
    pub line: usize,
}

impl DataOrigin {
    /// Origin at `line` of `source`; an empty source name means unknown.
    pub fn new(source: impl Into<String>, line: usize) -> Self {
        let source = source.into();
        if source.is_empty() {
            Self(None)
        } else {
            Self(Some(SourceLine { source, line }))
        }
    }

    pub fn unknown() -> Self {
        Self(None)
    }

    #[inline]
    pub fn known(&self) -> bool {
        self.0.is_some()
    }

    pub fn location(&self) -> Option<&SourceLine> {
        self.0.as_ref()
    }
}

impl fmt::Display for DataOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(loc) => write!(f, "{}:{}", loc.source, loc.line),
            None => write!(f, "(unknown)"),
        }
    }
}

/// View angle pair in degrees.
///
/// Read either as independent horizontal/vertical field angles or as
/// longitude/latitude, depending on [`crate::AngleConvention`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewAngles {
    /// Horizontal field angle, or longitude.
    pub horizontal_deg: Real,
    /// Vertical field angle, or latitude.
    pub vertical_deg: Real,
}

impl ViewAngles {
    pub fn new(horizontal_deg: Real, vertical_deg: Real) -> Self {
        Self {
            horizontal_deg,
            vertical_deg,
        }
    }

    #[inline]
    pub fn longitude(&self) -> Real {
        self.horizontal_deg
    }

    #[inline]
    pub fn latitude(&self) -> Real {
        self.vertical_deg
    }
}

/// One raw screen-position/view-angle correspondence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputMeasurement {
    /// Screen position in arbitrary units.
    pub screen: Pt2,
    pub view_angles: ViewAngles,
    /// Line number in the source this measurement was loaded from.
    pub line: usize,
}

impl InputMeasurement {
    pub fn new(screen: Pt2, view_angles: ViewAngles, line: usize) -> Self {
        Self {
            screen,
            view_angles,
            line,
        }
    }

    pub fn origin(&self, parent: &InputMeasurements) -> DataOrigin {
        DataOrigin::new(parent.source.clone(), self.line)
    }
}

/// One input source's worth of measurements (one screen).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct InputMeasurements {
    /// Name of the source, typically a file path.
    pub source: String,
    pub measurements: Vec<InputMeasurement>,
}

impl InputMeasurements {
    pub fn new(source: impl Into<String>, measurements: Vec<InputMeasurement>) -> Self {
        Self {
            source: source.into(),
            measurements,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Origins of every measurement, in order.
    pub fn origins(&self) -> Vec<DataOrigin> {
        self.measurements.iter().map(|m| m.origin(self)).collect()
    }

    /// Bounding rectangle of all screen positions.
    pub fn screen_extent(&self) -> Option<RectBounds> {
        RectBounds::enclosing(self.measurements.iter().map(|m| &m.screen))
    }
}

/// A measurement mapped to unit screen coordinates and eye space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMeasurement {
    /// Screen position, in `[0, 1]` on each axis for in-bounds inputs.
    pub screen: Pt2,
    /// Point along the view ray in eye space (eye at origin, looking along −Z).
    pub point_from_view: Pt3,
    pub line: usize,
}

impl NormalizedMeasurement {
    pub fn origin(&self, parent: &NormalizedMeasurements) -> DataOrigin {
        DataOrigin::new(parent.source.clone(), self.line)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedMeasurements {
    pub source: String,
    pub measurements: Vec<NormalizedMeasurement>,
}

impl NormalizedMeasurements {
    #[inline]
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    pub fn origins(&self) -> Vec<DataOrigin> {
        self.measurements.iter().map(|m| m.origin(self)).collect()
    }

    pub fn origin_of(&self, idx: usize) -> DataOrigin {
        self.measurements
            .get(idx)
            .map(|m| m.origin(self))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_display() {
        assert_eq!(DataOrigin::new("left.txt", 12).to_string(), "left.txt:12");
        assert_eq!(DataOrigin::unknown().to_string(), "(unknown)");
        assert!(!DataOrigin::new("", 3).known());
    }

    #[test]
    fn measurement_origin_uses_parent_source() {
        let set = InputMeasurements::new(
            "eye.txt",
            vec![
                InputMeasurement::new(Pt2::new(0.0, 0.0), ViewAngles::new(-10.0, 5.0), 4),
                InputMeasurement::new(Pt2::new(8.0, 2.0), ViewAngles::new(10.0, -5.0), 7),
            ],
        );
        let origins = set.origins();
        assert_eq!(origins[1], DataOrigin::new("eye.txt", 7));
        let extent = set.screen_extent().unwrap();
        assert_eq!((extent.width(), extent.height()), (8.0, 2.0));
    }
}
