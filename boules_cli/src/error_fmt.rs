//! Human-readable error descriptions and structured JSON error formatting.

use boules_core::error::{BuildError, ThrowError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    // Typed matches first
    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid throw parameters ({msg}).\nLikely causes: Out-of-range values in [throw] or [actuators].\nHow to fix: Edit the config file, then rerun. See etc/boules.toml for a sample."
        );
    }

    if let Some(te) = err.downcast_ref::<ThrowError>() {
        return match te {
            ThrowError::InvalidCalibrationData(msg) => format!(
                "What happened: Calibration data is unusable ({msg}).\nLikely causes: Not exactly 20 measurements (0..95 % in 5 % steps), a non-numeric value, or a flat series.\nHow to fix: Re-measure with `boules calibrate` and fix [calibration].distances_cm or the measurement CSV."
            ),
            ThrowError::InvalidMapping(msg) => format!(
                "What happened: The mapping table is invalid ({msg}).\nLikely causes: Empty table, duplicate distances, or percentages outside [0, 1).\nHow to fix: Regenerate it with `boules fit --out FILE`."
            ),
            ThrowError::ActuatorStall { actuator, timeout_ms } => format!(
                "What happened: The {actuator} motor did not stop within {timeout_ms} ms.\nLikely causes: Cage jammed on the ramp, ball stuck, or motor cable loose.\nHow to fix: Power down, clear the mechanism by hand and restart. Raise actuators.stop_timeout_ms if the motor is just slow."
            ),
            ThrowError::Hardware(msg) | ThrowError::HardwareFault(msg) => format!(
                "What happened: Motor I/O failed ({msg}).\nLikely causes: Motor unplugged, wrong port in [actuators], or ev3dev sysfs not available.\nHow to fix: Check the cables and actuators.lift_port / actuators.trigger_port, then restart."
            ),
            ThrowError::Input(msg) => format!(
                "What happened: No answer from the operator ({msg}).\nLikely causes: Input was closed (EOF) or is not a terminal.\nHow to fix: Run interactively, or use `boules throw --distance CM` for scripted throws."
            ),
            ThrowError::State(msg) => format!(
                "What happened: The machine refused the request ({msg}).\nLikely causes: An earlier throw failed halfway.\nHow to fix: Reset the cage by hand and restart the program."
            ),
            ThrowError::Config(msg) => format!(
                "What happened: Configuration error ({msg}).\nLikely causes: Neither a table nor calibration measurements were given.\nHow to fix: Set [model].table or [calibration].distances_cm, or pass --table / --measurements."
            ),
        };
    }

    // String-based heuristics over the whole context chain
    let msg = err
        .chain()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(": ");
    let lower = msg.to_ascii_lowercase();

    if lower.contains("no tacho motor")
        || lower.contains("open lift motor")
        || lower.contains("open trigger motor")
    {
        return format!(
            "What happened: {msg}.\nLikely causes: Motor not plugged into the configured port, or not running on ev3dev.\nHow to fix: Check actuators.lift_port / actuators.trigger_port, or use backend = \"simulated\"."
        );
    }

    if lower.contains("must have headers") {
        return format!(
            "Invalid CSV headers: {msg}.\nExpected 'percent,distance_cm' for measurements or 'distance_cm,percentage' for tables."
        );
    }

    if lower.contains("read config")
        || lower.contains("parse config")
        || lower.contains("invalid configuration")
    {
        let cause = err.root_cause();
        return format!(
            "What happened: Configuration is invalid or unreadable.\nCause: {cause}\nHow to fix: Edit the TOML config and try again."
        );
    }

    // Generic fallback
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes per error class; anything untyped returns 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<ThrowError>() {
        Some(ThrowError::InvalidCalibrationData(_) | ThrowError::InvalidMapping(_)) => 3,
        Some(ThrowError::ActuatorStall { .. }) => 4,
        Some(ThrowError::Hardware(_) | ThrowError::HardwareFault(_)) => 5,
        Some(ThrowError::Input(_)) => 6,
        Some(ThrowError::State(_)) => 7,
        Some(ThrowError::Config(_)) | None => 1,
    }
}

pub fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<ThrowError>() {
        Some(ThrowError::InvalidCalibrationData(_)) => "InvalidCalibrationData",
        Some(ThrowError::InvalidMapping(_)) => "InvalidMapping",
        Some(ThrowError::ActuatorStall { .. }) => "ActuatorStall",
        Some(ThrowError::Hardware(_)) => "Hardware",
        Some(ThrowError::HardwareFault(_)) => "HardwareFault",
        Some(ThrowError::Input(_)) => "Input",
        Some(ThrowError::State(_)) => "State",
        Some(ThrowError::Config(_)) => "Config",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    use serde_json::json;

    let msg = humanize(err);
    if let Some(ThrowError::ActuatorStall {
        actuator,
        timeout_ms,
    }) = err.downcast_ref::<ThrowError>()
    {
        return json!({
            "reason": reason_name(err),
            "details": { "actuator": actuator.to_string(), "timeout_ms": timeout_ms },
            "message": msg,
        })
        .to_string();
    }

    json!({ "reason": reason_name(err), "message": msg }).to_string()
}
