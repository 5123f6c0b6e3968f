use boules_config::{Backend, ModelKind, StopActionCfg, load_toml};
use rstest::rstest;

const FULL: &str = r#"
[throw]
ramp_rotation_deg = 1300.0
trigger_rotation_deg = 95.0
lift_speed_up = 300
lift_speed_down = 450
trigger_speed = 450
lift_down_offset = 0.975
dwell_ms = 2000
stop_action = "hold"

[actuators]
backend = "ev3"
lift_port = "outB"
trigger_port = "outA"
poll_ms = 5
stop_timeout_ms = 8000

[model]
kind = "poly_cubic"

[calibration]
distances_cm = [10.0, 14.0, 18.5, 23.0, 28.0, 33.5, 39.0, 45.0, 51.0, 57.5,
                64.0, 71.0, 78.0, 85.5, 93.0, 101.0, 109.0, 117.5, 126.0, 135.0]

[session]
intro_ms = 0
pause_ms = 0
"#;

#[test]
fn parses_full_config() {
    let cfg = load_toml(FULL).expect("parse TOML");
    cfg.validate().expect("valid config should pass");
    assert_eq!(cfg.actuators.backend, Backend::Ev3);
    assert_eq!(cfg.actuators.stop_timeout_ms, 8000);
    assert_eq!(cfg.throw.stop_action, StopActionCfg::Hold);
    assert_eq!(cfg.model.kind, ModelKind::PolyCubic);
    assert_eq!(cfg.calibration.as_ref().map(|c| c.distances_cm.len()), Some(20));
}

#[test]
fn sim_alias_selects_simulated_backend() {
    let cfg = load_toml("[actuators]\nbackend = \"sim\"\n").expect("parse TOML");
    assert_eq!(cfg.actuators.backend, Backend::Simulated);
}

#[test]
fn unknown_model_kind_is_a_parse_error() {
    assert!(load_toml("[model]\nkind = \"quartic\"\n").is_err());
}

#[rstest]
#[case("[throw]\nramp_rotation_deg = 0.0\n", "ramp_rotation_deg must be > 0")]
#[case("[throw]\ntrigger_rotation_deg = -95.0\n", "trigger_rotation_deg must be > 0")]
#[case("[throw]\nlift_speed_up = 0\n", "lift_speed_up must be > 0")]
#[case("[throw]\nlift_speed_down = 0\n", "lift_speed_down must be > 0")]
#[case("[throw]\ntrigger_speed = 0\n", "trigger_speed must be > 0")]
#[case("[throw]\nlift_down_offset = 1.2\n", "lift_down_offset must be in")]
#[case("[throw]\ndwell_ms = 600000\n", "dwell_ms is unreasonably large")]
#[case("[actuators]\nlift_port = \"outA\"\n", "must differ")]
#[case("[actuators]\npoll_ms = 0\n", "poll_ms must be >= 1")]
#[case("[calibration]\ndistances_cm = [1.0, 2.0, 3.0]\n", "exactly 20 values, got 3")]
#[case("[logging]\nrotation = \"weekly\"\n", "never|daily|hourly")]
fn rejects_invalid_values(#[case] toml: &str, #[case] needle: &str) {
    let cfg = load_toml(toml).expect("parse TOML");
    let err = cfg.validate().expect_err("should be rejected");
    let msg = format!("{err}");
    assert!(msg.contains(needle), "unexpected message: {msg}");
}
