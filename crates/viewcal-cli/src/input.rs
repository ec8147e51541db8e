//! Measurement table reader.
//!
//! One measurement per line: `screen_x screen_y angle_h angle_v`, separated by
//! whitespace and/or commas. Blank lines and `#` comments are skipped; line
//! numbers are kept so results can point back into the file.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use viewcal_core::{InputMeasurement, InputMeasurements, Pt2, ViewAngles};

const FIELDS: usize = 4;

pub fn load_measurements(path: &Path) -> Result<InputMeasurements> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read measurements from {}", path.display()))?;
    parse_measurements(&path.display().to_string(), &text)
}

pub fn parse_measurements(source: &str, text: &str) -> Result<InputMeasurements> {
    let mut measurements = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let content = raw.split('#').next().unwrap_or_default();
        let fields: Vec<&str> = content
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.is_empty() {
            continue;
        }
        if fields.len() != FIELDS {
            bail!(
                "{source}:{line}: expected {FIELDS} values (screen x, screen y, horizontal angle, vertical angle), found {}",
                fields.len()
            );
        }
        let mut values = [0.0_f64; FIELDS];
        for (value, field) in values.iter_mut().zip(&fields) {
            *value = field
                .parse()
                .with_context(|| format!("{source}:{line}: invalid number {field:?}"))?;
            if !value.is_finite() {
                bail!("{source}:{line}: non-finite value {field:?}");
            }
        }
        measurements.push(InputMeasurement::new(
            Pt2::new(values[0], values[1]),
            ViewAngles::new(values[2], values[3]),
            line,
        ));
    }
    Ok(InputMeasurements::new(source, measurements))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_separators_and_comments() {
        let text = "# x y h v\n\n0 0 -30 -20\n1920, 0, 30, -20  # right\n  \n0\t1080\t-30\t20\n";
        let set = parse_measurements("eye.txt", text).unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(set.source, "eye.txt");
        assert_eq!(set.measurements[1].screen, Pt2::new(1920.0, 0.0));
        assert_eq!(set.measurements[1].line, 4);
        assert_eq!(set.measurements[2].view_angles, ViewAngles::new(-30.0, 20.0));
        assert_eq!(set.measurements[2].line, 6);
    }

    #[test]
    fn errors_name_the_line() {
        let err = parse_measurements("eye.txt", "0 0 1 2\n0 0 1\n").unwrap_err();
        assert!(err.to_string().starts_with("eye.txt:2:"), "{err}");

        let err = parse_measurements("eye.txt", "0 0 1 2\n\n0 x 1 2\n").unwrap_err();
        assert!(err.to_string().starts_with("eye.txt:3: invalid number"), "{err}");
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let err = parse_measurements("eye.txt", "0 0 1 2\nnan 0 1 2\n").unwrap_err();
        assert!(err.to_string().starts_with("eye.txt:2: non-finite"), "{err}");

        let err = parse_measurements("eye.txt", "0 0 1 2\n0 0 inf 2\n").unwrap_err();
        assert!(err.to_string().starts_with("eye.txt:2: non-finite"), "{err}");
    }
}
