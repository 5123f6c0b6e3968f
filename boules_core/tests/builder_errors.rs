use std::sync::Arc;
use std::time::Duration;

use boules_core::error::BuildError;
use boules_core::mocks::CommandLog;
use boules_core::{DistanceMap, ThrowParams, ThrowSequencerBuilder};
use rstest::rstest;

#[rstest]
#[case::zero_ramp(ThrowParams { ramp_rotation_deg: 0.0, ..ThrowParams::default() })]
#[case::nan_trigger(ThrowParams { trigger_rotation_deg: f64::NAN, ..ThrowParams::default() })]
#[case::zero_speed(ThrowParams { lift_speed_up: 0, ..ThrowParams::default() })]
#[case::offset_above_one(ThrowParams { lift_down_offset: 1.2, ..ThrowParams::default() })]
#[case::zero_stop_timeout(ThrowParams { stop_timeout: Some(Duration::ZERO), ..ThrowParams::default() })]
fn invalid_params_yield_typed_build_error(#[case] params: ThrowParams) {
    let log = CommandLog::new();
    let err = ThrowSequencerBuilder::new()
        .with_lift(log.actuator("lift"))
        .with_trigger(log.actuator("trigger"))
        .with_map(Arc::new(DistanceMap::new([(10, 0.1)]).unwrap()))
        .with_params(params)
        .build()
        .expect_err("invalid params must not build");

    match err.downcast_ref::<BuildError>() {
        Some(BuildError::InvalidConfig(_)) => {}
        other => panic!("expected InvalidConfig, got: {other:?}"),
    }
}

#[test]
fn setters_can_come_in_any_order() {
    let log = CommandLog::new();
    let seq = ThrowSequencerBuilder::new()
        .with_map(DistanceMap::new([(10, 0.1), (20, 0.2)]).unwrap())
        .with_params(ThrowParams::default())
        .with_trigger(log.actuator("trigger"))
        .with_clock(Arc::new(log.clock()))
        .with_lift(log.actuator("lift"))
        .build()
        .unwrap();
    assert_eq!((seq.map().start(), seq.map().end()), (10, 20));
    assert_eq!(seq.params().dwell, Duration::from_secs(2));
}
