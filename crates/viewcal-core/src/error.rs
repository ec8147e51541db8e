use thiserror::Error;

use crate::DataOrigin;

/// Fatal failures of one screen's calibration.
///
/// Geometry failures carry the origins of the measurements involved so they
/// can be traced back to the input table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
    #[error("degenerate geometry: {reason}{}", fmt_origins(.origins))]
    DegenerateGeometry {
        reason: String,
        origins: Vec<DataOrigin>,
    },
    #[error("numeric failure at {origin}: {reason}")]
    NumericFailure { reason: String, origin: DataOrigin },
    #[error("insufficient coverage: {reason}{}", fmt_origins(.origins))]
    InsufficientCoverage {
        reason: String,
        origins: Vec<DataOrigin>,
    },
}

impl CalibrationError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn degenerate(reason: impl Into<String>, origins: Vec<DataOrigin>) -> Self {
        Self::DegenerateGeometry {
            reason: reason.into(),
            origins,
        }
    }

    pub fn numeric(reason: impl Into<String>, origin: DataOrigin) -> Self {
        Self::NumericFailure {
            reason: reason.into(),
            origin,
        }
    }

    /// Origins attached to this error, if any.
    pub fn origins(&self) -> Vec<DataOrigin> {
        match self {
            Self::InvalidConfiguration { .. } => Vec::new(),
            Self::DegenerateGeometry { origins, .. }
            | Self::InsufficientCoverage { origins, .. } => origins.clone(),
            Self::NumericFailure { origin, .. } => vec![origin.clone()],
        }
    }
}

/// Origins listed after the reason; long lists are elided.
fn fmt_origins(origins: &[DataOrigin]) -> String {
    const MAX_LISTED: usize = 8;
    if origins.is_empty() {
        return String::new();
    }
    let listed: Vec<String> = origins
        .iter()
        .take(MAX_LISTED)
        .map(ToString::to_string)
        .collect();
    let more = origins.len().saturating_sub(MAX_LISTED);
    if more > 0 {
        format!(" (at {}, and {} more)", listed.join(", "), more)
    } else {
        format!(" (at {})", listed.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_origins() {
        let err = CalibrationError::degenerate(
            "need at least 3 measurements, got 2",
            vec![DataOrigin::new("eye.txt", 1), DataOrigin::new("eye.txt", 2)],
        );
        assert_eq!(
            err.to_string(),
            "degenerate geometry: need at least 3 measurements, got 2 (at eye.txt:1, eye.txt:2)"
        );

        let err = CalibrationError::numeric("ray parallel to screen plane", DataOrigin::unknown());
        assert_eq!(
            err.to_string(),
            "numeric failure at (unknown): ray parallel to screen plane"
        );
        assert_eq!(err.origins().len(), 1);
    }

    #[test]
    fn long_origin_lists_are_elided() {
        let origins: Vec<_> = (1..=10).map(|l| DataOrigin::new("s", l)).collect();
        let err = CalibrationError::degenerate("collinear", origins);
        assert!(err.to_string().ends_with("s:8, and 2 more)"));
    }
}
