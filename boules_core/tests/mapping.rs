use boules_core::DistanceMap;
use boules_core::config::RAMP_ROTATION_LENGTH;
use boules_core::trajectory::distance_to_rotation;
use boules_core::{ModelKind, ThrowParams};
use proptest::prelude::*;
use rstest::rstest;

/// Contiguous table 20..=300 cm with a gently rising percentage.
fn contiguous() -> DistanceMap {
    DistanceMap::new((20..=300).map(|d| (d, f64::from(d - 20) / 300.0))).unwrap()
}

proptest! {
    #[test]
    fn lookup_in_range_is_a_fraction(d in 20i32..=300) {
        let m = contiguous();
        let p = m.lookup(d);
        prop_assert!((0.0..1.0).contains(&p));
        prop_assert_eq!(p, m.lookup(d));
    }

    #[test]
    fn out_of_range_equals_clamped(d in prop_oneof![-10_000i32..0, 1i32..20, 301i32..10_000]) {
        let m = contiguous();
        let v = f64::from(d);
        prop_assert_eq!(
            m.resolve_percentage(v),
            m.resolve_percentage(f64::from(m.clamp(d)))
        );
        prop_assert!(m.resolve(v).clamped);
    }

    #[test]
    fn fractions_bypass_the_table(p in 0.0f64..1.0) {
        let m = contiguous();
        prop_assert_eq!(m.resolve_percentage(p), p);
    }

    #[test]
    fn rotation_is_ramp_times_percentage(v in -500.0f64..500.0) {
        let m = contiguous();
        let params = ThrowParams::default();
        prop_assert_eq!(
            distance_to_rotation(&m, &params, v),
            RAMP_ROTATION_LENGTH * m.resolve_percentage(v)
        );
    }

    #[test]
    fn fractional_distances_floor(d in 20i32..300, frac in 0.0f64..0.99) {
        let m = contiguous();
        prop_assert_eq!(m.resolve_percentage(f64::from(d) + frac), m.lookup(d));
    }
}

#[rstest]
#[case(150.0, 0.95)]
#[case(100.0, 0.95)]
#[case(0.5, 0.5)]
#[case(1.0, 0.0)]
#[case(-3.0, 0.0)]
fn two_point_table(#[case] value: f64, #[case] expected: f64) {
    let m = DistanceMap::new([(0, 0.0), (100, 0.95)]).unwrap();
    assert_eq!(m.resolve_percentage(value), expected);
}

#[test]
fn one_above_range_end_clamps_to_end() {
    let m = DistanceMap::new([(-10, 0.2), (0, 0.3)]).unwrap();
    let r = m.resolve(1.0);
    assert_eq!(r.distance_cm, Some(0));
    assert!(r.clamped);
    assert_eq!(r.percentage, 0.3);
}

#[test]
fn half_resolves_to_half_regardless_of_table() {
    for m in [
        contiguous(),
        DistanceMap::new([(500, 0.9)]).unwrap(),
        DistanceMap::new([(0, 0.0), (100, 0.95)]).unwrap(),
    ] {
        assert_eq!(m.resolve_percentage(0.5), 0.5);
    }
}

#[test]
fn start_and_end_are_min_and_max_keys() {
    let m = DistanceMap::new([(40, 0.4), (12, 0.1), (33, 0.3)]).unwrap();
    assert_eq!((m.start(), m.end()), (12, 40));
    assert_eq!(m.len(), 3);
    assert_eq!(
        m.iter().map(|(d, _)| d).collect::<Vec<_>>(),
        vec![12, 33, 40]
    );
}

#[test]
fn default_model_is_cubic_spline() {
    assert_eq!(ModelKind::default(), ModelKind::SplineCubic);
}
