use boules_core::model::{CALIBRATION_POINTS, fit};
use boules_core::{CalibrationSeries, DistanceMap, ModelKind, ThrowError};
use rstest::rstest;

fn linear_series() -> CalibrationSeries {
    // 10 cm at 0 %, +1.2 cm per percent
    CalibrationSeries::new(
        (0..CALIBRATION_POINTS)
            .map(|i| 10.0 + 1.2 * (i as f64 * 5.0))
            .collect(),
    )
    .unwrap()
}

/// Measurements from the robot's first calibration run.
fn measured_series() -> CalibrationSeries {
    CalibrationSeries::new(vec![
        0.0, 4.0, 11.0, 19.5, 28.0, 37.0, 46.5, 56.0, 66.0, 76.5, 87.0, 98.0, 109.5, 121.0,
        133.0, 145.5, 158.0, 171.0, 184.5, 198.0,
    ])
    .unwrap()
}

#[rstest]
#[case(ModelKind::SplineLinear)]
#[case(ModelKind::SplineCubic)]
#[case(ModelKind::PolyLinear)]
#[case(ModelKind::PolyCubic)]
fn linear_data_inverts_within_half_a_step(#[case] kind: ModelKind) {
    let map = fit(&linear_series(), kind).unwrap();

    assert!((map.start() - 11).abs() <= 1, "start {}", map.start());
    assert!((map.end() - 124).abs() <= 1, "end {}", map.end());
    assert!(map.is_monotonic());
    assert_eq!(map.len() as i32, map.end() - map.start() + 1);
    for (cm, pct) in map.iter() {
        let thrown = 10.0 + 1.2 * pct * 100.0;
        assert!(
            (thrown - f64::from(cm)).abs() <= 0.3 + 1e-6,
            "{kind}: {cm} cm -> {pct}"
        );
    }
}

#[test]
fn linear_spline_of_linear_data_is_exact() {
    let map = DistanceMap::from_calibration(&linear_series(), ModelKind::SplineLinear).unwrap();
    assert_eq!((map.start(), map.end()), (11, 124));
    // 70 cm = 10 + 1.2 * 50
    assert_eq!(map.lookup(70), 0.5);
    assert_eq!(map.lookup(124), 0.95);
}

#[rstest]
#[case(ModelKind::SplineLinear)]
#[case(ModelKind::SplineCubic)]
#[case(ModelKind::PolyLinear)]
#[case(ModelKind::PolyCubic)]
fn fitted_tables_are_contiguous_fractions(#[case] kind: ModelKind) {
    let map = fit(&measured_series(), kind).unwrap();
    let keys: Vec<i32> = map.iter().map(|(d, _)| d).collect();
    assert!(keys.windows(2).all(|w| w[1] == w[0] + 1));
    assert!(map.iter().all(|(_, p)| (0.005..=0.95).contains(&p)));
    assert!(map.end() >= 150);
}

#[rstest]
#[case(0)]
#[case(19)]
#[case(21)]
fn wrong_series_length_is_invalid_calibration_data(#[case] n: usize) {
    let err = CalibrationSeries::new(vec![50.0; n]).unwrap_err();
    assert!(matches!(err, ThrowError::InvalidCalibrationData(_)));
}

#[test]
fn non_finite_measurement_is_rejected() {
    let mut d: Vec<f64> = (0..20).map(f64::from).collect();
    d[7] = f64::NAN;
    let err = CalibrationSeries::new(d).unwrap_err();
    assert!(err.to_string().contains("35"));
}
