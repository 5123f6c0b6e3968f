//! Runtime configuration for the sequencer and session loop.
//!
//! These are separate from the TOML-deserialized config in `boules_config`;
//! see `conversions` for the mapping.

use std::time::Duration;

use boules_traits::StopAction;

use crate::error::BuildError;

/// Ramp length in degrees of lift motor rotation.
pub const RAMP_ROTATION_LENGTH: f64 = 1300.0;
/// Trigger rotation that opens the cage gate.
pub const TRIGGER_ROTATION_DEGREES: f64 = 95.0;
pub const LIFT_SPEED_UP: u32 = 300;
pub const LIFT_SPEED_DOWN: u32 = 450;
pub const TRIGGER_SPEED: u32 = 450;
/// The cage comes back further than it went up for the same rotation.
pub const LIFT_DOWN_OFFSET_PERCENTAGE: f64 = 0.975;
pub const GATE_DWELL: Duration = Duration::from_secs(2);

/// Per-robot throw constants.
#[derive(Debug, Clone, PartialEq)]
pub struct ThrowParams {
    pub ramp_rotation_deg: f64,
    pub trigger_rotation_deg: f64,
    pub lift_speed_up: u32,
    pub lift_speed_down: u32,
    pub trigger_speed: u32,
    /// Down-stroke = up-stroke × this factor.
    pub lift_down_offset: f64,
    /// Time the gate is held open, and again closed, while the ball rolls out.
    pub dwell: Duration,
    pub stop_action: StopAction,
    /// Bound on each wait for the lift to stop. `None` waits forever.
    pub stop_timeout: Option<Duration>,
}

impl Default for ThrowParams {
    fn default() -> Self {
        Self {
            ramp_rotation_deg: RAMP_ROTATION_LENGTH,
            trigger_rotation_deg: TRIGGER_ROTATION_DEGREES,
            lift_speed_up: LIFT_SPEED_UP,
            lift_speed_down: LIFT_SPEED_DOWN,
            trigger_speed: TRIGGER_SPEED,
            lift_down_offset: LIFT_DOWN_OFFSET_PERCENTAGE,
            dwell: GATE_DWELL,
            stop_action: StopAction::Brake,
            stop_timeout: None,
        }
    }
}

impl ThrowParams {
    pub fn validate(&self) -> Result<(), BuildError> {
        if !(self.ramp_rotation_deg.is_finite() && self.ramp_rotation_deg > 0.0) {
            return Err(BuildError::InvalidConfig("ramp rotation must be > 0"));
        }
        if !(self.trigger_rotation_deg.is_finite() && self.trigger_rotation_deg > 0.0) {
            return Err(BuildError::InvalidConfig("trigger rotation must be > 0"));
        }
        if self.lift_speed_up == 0 || self.lift_speed_down == 0 || self.trigger_speed == 0 {
            return Err(BuildError::InvalidConfig("motor speeds must be > 0"));
        }
        if !(self.lift_down_offset > 0.0 && self.lift_down_offset <= 1.0) {
            return Err(BuildError::InvalidConfig(
                "lift down offset must be in (0.0, 1.0]",
            ));
        }
        if self.stop_timeout.is_some_and(|t| t.is_zero()) {
            return Err(BuildError::InvalidConfig(
                "stop timeout must be > 0 when set",
            ));
        }
        Ok(())
    }
}

/// Session loop pacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionCfg {
    /// How long the intro text stays up.
    pub intro: Duration,
    /// Pause before each distance request.
    pub pause: Duration,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            intro: Duration::from_secs(4),
            pause: Duration::from_secs(1),
        }
    }
}
