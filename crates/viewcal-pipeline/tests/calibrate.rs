use viewcal_core::{
    synthetic::SyntheticScreen, AngleConvention, AngleVerification, CalibrationError, Config,
    DataOrigin, InputMeasurement, InputMeasurements, MeshSampling, Pt2, Real, Vec2, ViewAngles,
};
use viewcal_linear::FindingKind;
use viewcal_pipeline::{calibrate_screen, calibrate_screens, document::DisplayDocument};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn assert_close(actual: Real, expected: Real, tol: Real) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual}"
    );
}

fn corners(source: &str) -> InputMeasurements {
    InputMeasurements::new(
        source,
        vec![
            InputMeasurement::new(Pt2::new(0.0, 0.0), ViewAngles::new(-30.0, -20.0), 1),
            InputMeasurement::new(Pt2::new(1.0, 0.0), ViewAngles::new(30.0, -20.0), 2),
            InputMeasurement::new(Pt2::new(0.0, 1.0), ViewAngles::new(-30.0, 20.0), 3),
            InputMeasurement::new(Pt2::new(1.0, 1.0), ViewAngles::new(30.0, 20.0), 4),
        ],
    )
}

#[test]
fn four_corners_end_to_end() {
    init_logger();
    let result = calibrate_screen(&corners("corners.txt"), &Config::default()).unwrap();

    assert_close(result.projection.h_fov_deg, 60.0, 1e-9);
    assert_close(result.projection.v_fov_deg, 40.0, 1e-9);
    assert_close(result.projection.center_of_projection.x, 0.5, 1e-12);
    assert_close(result.projection.center_of_projection.y, 0.5, 1e-12);
    assert_eq!(result.mesh.len(), 4);
    for row in result.mesh.iter() {
        assert!((row.to - row.from).norm() < 1e-9, "{row:?}");
    }
    assert!(result.findings.is_empty());
}

#[test]
fn two_measurements_fail_without_output() {
    init_logger();
    let mut input = corners("two.txt");
    input.measurements.truncate(2);
    let err = calibrate_screen(&input, &Config::default()).unwrap_err();
    match err {
        CalibrationError::DegenerateGeometry { origins, .. } => {
            assert_eq!(
                origins,
                vec![DataOrigin::new("two.txt", 1), DataOrigin::new("two.txt", 2)]
            );
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn offset_measurement_is_reported_once() {
    init_logger();
    let screen = SyntheticScreen::frontal(2.0, 2.0, 1.5);
    let mut input = screen.measurements(5, 5, AngleConvention::FieldAngles, "eye.txt");
    input.measurements[12].view_angles.horizontal_deg += 5.0;
    let config = Config {
        verify_angles: Some(AngleVerification {
            axes: Default::default(),
            max_angle_diff_deg: 2.0,
        }),
        ..Config::default()
    };

    let result = calibrate_screen(&input, &config).unwrap();
    let mismatches: Vec<_> = result
        .findings
        .iter()
        .filter(|f| matches!(f.kind, FindingKind::AngleMismatch { .. }))
        .collect();
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].origin, DataOrigin::new("eye.txt", 13));

    let without_check = calibrate_screen(&input, &Config::default()).unwrap();
    assert_eq!(result.projection, without_check.projection);
    assert_eq!(result.mesh, without_check.mesh);
}

#[test]
fn screens_run_independently_and_in_order() {
    init_logger();
    let left = SyntheticScreen {
        center: Vec2::new(0.2, 0.0),
        ..SyntheticScreen::frontal(1.0, 1.6, 1.0)
    };
    let right = SyntheticScreen {
        center: Vec2::new(-0.2, 0.0),
        ..left
    };
    let mut broken = corners("broken.txt");
    broken.measurements.truncate(2);
    let inputs = vec![
        left.measurements(4, 3, AngleConvention::FieldAngles, "left.txt"),
        broken,
        right.measurements(4, 3, AngleConvention::FieldAngles, "right.txt"),
    ];

    let results = calibrate_screens(&inputs, &Config::default());
    assert_eq!(results.len(), 3);
    let first = results[0].as_ref().unwrap();
    let third = results[2].as_ref().unwrap();
    assert_eq!(first.source, "left.txt");
    assert_eq!(third.source, "right.txt");
    assert!(results[1].is_err());

    // Mirrored screens: same field of view, mirrored center of projection.
    assert_close(first.projection.h_fov_deg, third.projection.h_fov_deg, 1e-9);
    assert_close(
        first.projection.center_of_projection.x,
        1.0 - third.projection.center_of_projection.x,
        1e-9,
    );
    assert_close(first.projection.center_of_projection.x, 0.375, 1e-9);
}

#[test]
fn document_has_one_eye_per_screen() {
    init_logger();
    let config = Config {
        mesh: MeshSampling::Grid {
            cols: 3,
            rows: 3,
            margin: 0.0,
        },
        overlap_percent: 90.0,
        ..Config::default()
    };
    let screens = vec![
        calibrate_screen(&corners("left.txt"), &config).unwrap(),
        calibrate_screen(&corners("right.txt"), &config).unwrap(),
    ];
    let doc = DisplayDocument::from_screens(&screens).unwrap();
    let json: serde_json::Value = serde_json::from_str(&doc.to_json_pretty().unwrap()).unwrap();

    let display = &json["display"];
    assert_eq!(display["hardware"]["field_of_view"]["overlap_percent"], 90.0);
    assert_close(
        display["hardware"]["field_of_view"]["monocular_horizontal"]
            .as_f64()
            .unwrap(),
        60.0,
        1e-9,
    );
    assert_eq!(display["distortion"]["type"], "mono_point_samples");
    let samples = display["distortion"]["mono_point_samples"].as_array().unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].as_array().unwrap().len(), 9);
    assert_eq!(display["eyes"].as_array().unwrap().len(), 2);
    assert_eq!(display["eyes"][1]["rotate_180"], 0);

    assert!(DisplayDocument::from_screens(&[]).is_none());
}
