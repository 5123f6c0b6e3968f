//! `From` implementations bridging `boules_config` types to `boules_core` types.

use std::time::Duration;

use boules_traits::StopAction;

use crate::config::{SessionCfg, ThrowParams};
use crate::model::ModelKind;

// ── StopAction ───────────────────────────────────────────────────────────────

pub fn stop_action(s: boules_config::StopActionCfg) -> StopAction {
    match s {
        boules_config::StopActionCfg::Brake => StopAction::Brake,
        boules_config::StopActionCfg::Coast => StopAction::Coast,
        boules_config::StopActionCfg::Hold => StopAction::Hold,
    }
}

// ── ThrowParams ──────────────────────────────────────────────────────────────

impl From<&boules_config::Config> for ThrowParams {
    fn from(c: &boules_config::Config) -> Self {
        let t = &c.throw;
        Self {
            ramp_rotation_deg: t.ramp_rotation_deg,
            trigger_rotation_deg: t.trigger_rotation_deg,
            lift_speed_up: t.lift_speed_up,
            lift_speed_down: t.lift_speed_down,
            trigger_speed: t.trigger_speed,
            lift_down_offset: t.lift_down_offset,
            dwell: Duration::from_millis(t.dwell_ms),
            stop_action: stop_action(t.stop_action),
            stop_timeout: match c.actuators.stop_timeout_ms {
                0 => None,
                ms => Some(Duration::from_millis(ms)),
            },
        }
    }
}

// ── SessionCfg ───────────────────────────────────────────────────────────────

impl From<&boules_config::SessionCfg> for SessionCfg {
    fn from(c: &boules_config::SessionCfg) -> Self {
        Self {
            intro: Duration::from_millis(c.intro_ms),
            pause: Duration::from_millis(c.pause_ms),
        }
    }
}

// ── ModelKind ────────────────────────────────────────────────────────────────

impl From<boules_config::ModelKind> for ModelKind {
    fn from(k: boules_config::ModelKind) -> Self {
        match k {
            boules_config::ModelKind::SplineLinear => ModelKind::SplineLinear,
            boules_config::ModelKind::SplineCubic => ModelKind::SplineCubic,
            boules_config::ModelKind::PolyLinear => ModelKind::PolyLinear,
            boules_config::ModelKind::PolyCubic => ModelKind::PolyCubic,
        }
    }
}
