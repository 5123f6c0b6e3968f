//! Distance → lift rotation.

use boules_traits::StopAction;

use crate::config::ThrowParams;
use crate::mapping::DistanceMap;

/// One actuator move: relative rotation, speed and stop behaviour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuationRequest {
    pub degrees: f64,
    pub speed: u32,
    pub stop: StopAction,
}

/// Everything decided up front for one throw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrowPlan {
    /// Value as requested: centimetres, or a fraction in [0,1).
    pub requested: f64,
    pub percentage: f64,
    /// Table key used, if the request was a distance.
    pub distance_cm: Option<i32>,
    pub clamped: bool,
    pub lift_up: ActuationRequest,
    pub lift_down: ActuationRequest,
}

impl ThrowPlan {
    /// Lift rotation of the up-stroke.
    pub fn angle(&self) -> f64 {
        self.lift_up.degrees
    }
}

/// `ramp_rotation_deg × resolve_percentage(value)`.
pub fn distance_to_rotation(map: &DistanceMap, params: &ThrowParams, value: f64) -> f64 {
    params.ramp_rotation_deg * map.resolve_percentage(value)
}

pub fn plan_throw(map: &DistanceMap, params: &ThrowParams, value: f64) -> ThrowPlan {
    let resolved = map.resolve(value);
    if resolved.clamped {
        tracing::warn!(
            requested = value,
            used_cm = resolved.distance_cm,
            start = map.start(),
            end = map.end(),
            "distance outside table range; clamped"
        );
    }
    let angle = params.ramp_rotation_deg * resolved.percentage;
    ThrowPlan {
        requested: value,
        percentage: resolved.percentage,
        distance_cm: resolved.distance_cm,
        clamped: resolved.clamped,
        lift_up: ActuationRequest {
            degrees: angle,
            speed: params.lift_speed_up,
            stop: params.stop_action,
        },
        lift_down: ActuationRequest {
            degrees: -angle * params.lift_down_offset,
            speed: params.lift_speed_down,
            stop: params.stop_action,
        },
    }
}

/// Trigger moves that open and then close the gate.
pub fn gate_moves(params: &ThrowParams) -> [ActuationRequest; 2] {
    let open = ActuationRequest {
        degrees: params.trigger_rotation_deg,
        speed: params.trigger_speed,
        stop: params.stop_action,
    };
    let close = ActuationRequest {
        degrees: -params.trigger_rotation_deg,
        ..open
    };
    [open, close]
}
