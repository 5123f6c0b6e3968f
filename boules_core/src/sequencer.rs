//! The throw state machine (`ThrowSequencer`).
//!
//! `Idle → LiftingUp → GateOpening → GateClosing → LiftingDown → Idle`.
//! Each `step()` performs exactly one transition. Lift moves block until the
//! motor reports stopped; trigger moves are followed by a fixed dwell on the
//! clock instead, giving the ball time to roll out. Nothing runs in parallel.

use std::sync::Arc;
use std::time::Instant;

use boules_traits::Actuator;
use boules_traits::clock::Clock;
use eyre::WrapErr;
use tracing::{debug, error, info};

use crate::config::ThrowParams;
use crate::error::{ActuatorRole, Result, ThrowError};
use crate::hw_error::map_hw_error;
use crate::mapping::DistanceMap;
use crate::status::{ThrowPhase, ThrowReport, ThrowStatus};
use crate::trajectory::{ActuationRequest, ThrowPlan, distance_to_rotation, gate_moves, plan_throw};

pub struct ThrowSequencer<L: Actuator, T: Actuator> {
    pub(crate) lift: L,
    pub(crate) trigger: T,
    pub(crate) map: Arc<DistanceMap>,
    pub(crate) params: ThrowParams,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) phase: ThrowPhase,
    pub(crate) armed: Option<ThrowPlan>,
    pub(crate) started_at: Option<Instant>,
    pub(crate) fault: Option<String>,
    pub(crate) throws: u64,
}

/// Sequencer over boxed actuators, chosen at runtime.
pub type DynSequencer = ThrowSequencer<Box<dyn Actuator>, Box<dyn Actuator>>;

impl<L: Actuator, T: Actuator> core::fmt::Debug for ThrowSequencer<L, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ThrowSequencer")
            .field("phase", &self.phase)
            .field("armed", &self.armed.map(|p| p.requested))
            .field("range_cm", &(self.map.start(), self.map.end()))
            .field("throws", &self.throws)
            .field("fault", &self.fault)
            .finish()
    }
}

impl<L: Actuator, T: Actuator> ThrowSequencer<L, T> {
    pub fn phase(&self) -> ThrowPhase {
        self.phase
    }

    pub fn map(&self) -> &Arc<DistanceMap> {
        &self.map
    }

    pub fn params(&self) -> &ThrowParams {
        &self.params
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    /// Number of throws that ran to completion.
    pub fn throws_completed(&self) -> u64 {
        self.throws
    }

    /// Set once an actuator failed mid-cycle; cleared only by a restart.
    pub fn fault(&self) -> Option<&str> {
        self.fault.as_deref()
    }

    pub fn distance_to_rotation(&self, value: f64) -> f64 {
        distance_to_rotation(&self.map, &self.params, value)
    }

    /// Plan a throw without moving anything.
    pub fn plan(&self, value: f64) -> ThrowPlan {
        plan_throw(&self.map, &self.params, value)
    }

    /// Arm a throw for `value` (cm, or a fraction in [0,1)). Call `step()` to run it.
    pub fn begin(&mut self, value: f64) -> Result<ThrowPlan> {
        self.ensure_ready()?;
        let plan = self.plan(value);
        info!(
            requested = value,
            percentage = plan.percentage,
            distance_cm = plan.distance_cm,
            lift_deg = plan.angle(),
            "throw start"
        );
        self.armed = Some(plan);
        self.started_at = Some(self.clock.now());
        Ok(plan)
    }

    /// Perform the next transition of the armed throw.
    pub fn step(&mut self) -> Result<ThrowStatus> {
        let Some(plan) = self.armed else {
            return Err(eyre::Report::new(ThrowError::State(
                "no throw armed; call begin() first".into(),
            )));
        };
        if let Some(msg) = &self.fault {
            return Err(eyre::Report::new(ThrowError::State(format!(
                "sequencer faulted: {msg}"
            ))));
        }

        let next = match self.phase {
            ThrowPhase::Idle => ThrowPhase::LiftingUp,
            ThrowPhase::LiftingUp => ThrowPhase::GateOpening,
            ThrowPhase::GateOpening => ThrowPhase::GateClosing,
            ThrowPhase::GateClosing => ThrowPhase::LiftingDown,
            ThrowPhase::LiftingDown => return Ok(ThrowStatus::Complete(self.finish(plan))),
        };
        self.phase = next;
        let [open, close] = gate_moves(&self.params);
        let result = match next {
            ThrowPhase::LiftingUp => self.move_lift(plan.lift_up, "lift up"),
            ThrowPhase::GateOpening => self.move_trigger(open, "open gate"),
            ThrowPhase::GateClosing => self.move_trigger(close, "close gate"),
            ThrowPhase::LiftingDown => self.move_lift(plan.lift_down, "lift down"),
            ThrowPhase::Idle => Ok(()),
        };
        if let Err(e) = result {
            self.record_fault(&e);
            return Err(e);
        }
        Ok(ThrowStatus::Running(next))
    }

    /// Run a full throw for `value` and return its report.
    pub fn throw(&mut self, value: f64) -> Result<ThrowReport> {
        self.begin(value)?;
        loop {
            if let ThrowStatus::Complete(report) = self.step()? {
                return Ok(report);
            }
        }
    }

    /// Open and close the trigger gate once without moving the lift.
    ///
    /// Used to prime the cage before a calibration series.
    pub fn open_trigger_gate(&mut self) -> Result<()> {
        self.ensure_ready()?;
        let [open, close] = gate_moves(&self.params);
        info!("priming trigger gate");
        self.phase = ThrowPhase::GateOpening;
        let result = self
            .move_trigger(open, "open gate")
            .and_then(|()| {
                self.phase = ThrowPhase::GateClosing;
                self.move_trigger(close, "close gate")
            });
        if let Err(e) = result {
            self.record_fault(&e);
            return Err(e);
        }
        self.phase = ThrowPhase::Idle;
        Ok(())
    }

    fn ensure_ready(&self) -> Result<()> {
        if let Some(msg) = &self.fault {
            return Err(eyre::Report::new(ThrowError::State(format!(
                "sequencer faulted during {}: {msg}; manual intervention required",
                self.phase
            ))));
        }
        if self.armed.is_some() || self.phase != ThrowPhase::Idle {
            return Err(eyre::Report::new(ThrowError::State(format!(
                "throw already in progress ({})",
                self.phase
            ))));
        }
        Ok(())
    }

    fn finish(&mut self, plan: ThrowPlan) -> ThrowReport {
        self.phase = ThrowPhase::Idle;
        self.armed = None;
        self.throws += 1;
        let elapsed_ms = self
            .started_at
            .take()
            .map_or(0, |t| self.clock.ms_since(t));
        info!(
            requested = plan.requested,
            lift_deg = plan.angle(),
            elapsed_ms,
            "throw complete"
        );
        ThrowReport { plan, elapsed_ms }
    }

    fn record_fault(&mut self, e: &eyre::Report) {
        error!(phase = %self.phase, error = %e, "throw aborted; actuator fault");
        self.fault = Some(format!("{e:#}"));
    }

    fn move_lift(&mut self, req: ActuationRequest, what: &'static str) -> Result<()> {
        let timeout = self.params.stop_timeout;
        debug!(phase = %self.phase, degrees = req.degrees, speed = req.speed, "{what}");
        self.lift
            .rotate_relative(req.degrees, req.speed, req.stop)
            .map_err(|e| eyre::Report::new(map_hw_error(ActuatorRole::Lift, timeout, &*e)))
            .wrap_err(what)?;
        self.lift
            .wait_until_stopped(timeout)
            .map_err(|e| eyre::Report::new(map_hw_error(ActuatorRole::Lift, timeout, &*e)))
            .wrap_err_with(|| format!("{what}: waiting for lift to stop"))
    }

    fn move_trigger(&mut self, req: ActuationRequest, what: &'static str) -> Result<()> {
        debug!(phase = %self.phase, degrees = req.degrees, speed = req.speed, "{what}");
        self.trigger
            .rotate_relative(req.degrees, req.speed, req.stop)
            .map_err(|e| {
                eyre::Report::new(map_hw_error(
                    ActuatorRole::Trigger,
                    self.params.stop_timeout,
                    &*e,
                ))
            })
            .wrap_err(what)?;
        self.clock.sleep(self.params.dwell);
        Ok(())
    }
}
