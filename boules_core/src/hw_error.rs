//! Maps `Box<dyn Error>` from trait boundaries to typed `ThrowError`.
//!
//! The traits in `boules_traits` use `Box<dyn Error + Send + Sync>` so any
//! driver can plug in; this module converts those to our typed error enum,
//! with an optional feature-gated path for `boules_hardware::HwError`.

use std::time::Duration;

use crate::error::{ActuatorRole, ThrowError};

/// Map an actuator error to a typed `ThrowError`.
///
/// `timeout` is the stop timeout that was in force, reported when a stall is
/// only recognisable from the message text.
pub fn map_hw_error(
    actuator: ActuatorRole,
    timeout: Option<Duration>,
    e: &(dyn std::error::Error + 'static),
) -> ThrowError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<boules_hardware::error::HwError>() {
            return match hw {
                boules_hardware::error::HwError::StallTimeout { timeout_ms } => {
                    ThrowError::ActuatorStall {
                        actuator,
                        timeout_ms: *timeout_ms,
                    }
                }
                boules_hardware::error::HwError::Io(_) => {
                    ThrowError::Hardware(format!("{actuator}: {hw}"))
                }
                other => ThrowError::HardwareFault(format!("{actuator}: {other}")),
            };
        }
    }

    let s = e.to_string();
    let lower = s.to_lowercase();
    if lower.contains("stall") || lower.contains("timeout") || lower.contains("timed out") {
        ThrowError::ActuatorStall {
            actuator,
            timeout_ms: timeout.map_or(0, |t| t.as_millis() as u64),
        }
    } else {
        ThrowError::Hardware(format!("{actuator}: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_stall_maps_to_actuator_stall() {
        let e: Box<dyn std::error::Error + Send + Sync> = "motor stalled".into();
        let mapped = map_hw_error(ActuatorRole::Lift, Some(Duration::from_millis(250)), &*e);
        assert_eq!(
            mapped,
            ThrowError::ActuatorStall {
                actuator: ActuatorRole::Lift,
                timeout_ms: 250
            }
        );
    }

    #[test]
    fn other_strings_map_to_hardware() {
        let e: Box<dyn std::error::Error + Send + Sync> = "port unplugged".into();
        let mapped = map_hw_error(ActuatorRole::Trigger, None, &*e);
        assert_eq!(mapped, ThrowError::Hardware("trigger: port unplugged".into()));
    }

    #[cfg(feature = "hardware-errors")]
    #[test]
    fn typed_stall_keeps_driver_timeout() {
        let e: Box<dyn std::error::Error + Send + Sync> =
            Box::new(boules_hardware::error::HwError::StallTimeout { timeout_ms: 40 });
        let mapped = map_hw_error(ActuatorRole::Lift, None, &*e);
        assert_eq!(
            mapped,
            ThrowError::ActuatorStall {
                actuator: ActuatorRole::Lift,
                timeout_ms: 40
            }
        );
    }
}
