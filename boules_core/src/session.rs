//! Operator-driven loops on top of the sequencer.

use std::sync::atomic::{AtomicBool, Ordering};

use boules_traits::{Actuator, Operator};
use eyre::WrapErr;
use tracing::info;

use crate::config::SessionCfg;
use crate::error::{Result, ThrowError};
use crate::model::{CALIBRATION_POINTS, CALIBRATION_STEP_PERCENT};
use crate::sequencer::ThrowSequencer;
use crate::status::ThrowReport;

const INTRO: [&str; 3] = ["Please enter", "a distance", "in cm"];

/// Outcome of a session, for reporting.
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub throws: u64,
    pub reports: Vec<ThrowReport>,
}

fn input_err(e: boules_traits::BoxError) -> eyre::Report {
    eyre::Report::new(ThrowError::Input(e.to_string()))
}

fn stop_requested(shutdown: Option<&AtomicBool>) -> bool {
    shutdown.is_some_and(|f| f.load(Ordering::Relaxed))
}

/// Interactive loop: ask for a distance, throw, ask whether to go again.
///
/// `shutdown` is checked before and after each distance request, so no new
/// throw starts once it is set; a running throw always completes.
pub fn run_session<L, T, O>(
    seq: &mut ThrowSequencer<L, T>,
    operator: &mut O,
    cfg: &SessionCfg,
    shutdown: Option<&AtomicBool>,
) -> Result<SessionSummary>
where
    L: Actuator,
    T: Actuator,
    O: Operator + ?Sized,
{
    let mut summary = SessionSummary::default();
    let (start, end) = (seq.map().start(), seq.map().end());
    info!(start_cm = start, end_cm = end, "session start");

    operator.display(&INTRO);
    seq.clock().sleep(cfg.intro);

    loop {
        if stop_requested(shutdown) {
            info!("shutdown requested; ending session");
            break;
        }
        seq.clock().sleep(cfg.pause);
        let distance = operator
            .request_integer(start, end, None)
            .map_err(input_err)
            .wrap_err("distance request")?;
        if stop_requested(shutdown) {
            info!(distance, "shutdown requested at the prompt; not throwing");
            break;
        }
        let report = seq
            .throw(f64::from(distance))
            .wrap_err_with(|| format!("throw #{} ({distance} cm)", summary.throws + 1))?;
        summary.throws += 1;
        summary.reports.push(report);

        let again = operator
            .request_boolean("Again?")
            .map_err(input_err)
            .wrap_err("continue prompt")?;
        if !again {
            break;
        }
    }
    info!(throws = summary.throws, "session end");
    Ok(summary)
}

/// Measurement series: prime the gate, then throw once per 5 % step from 5 to 95.
///
/// The operator confirms (or adjusts) each percentage; the engineer measures
/// where the ball lands to produce a new calibration series.
pub fn run_calibration_series<L, T, O>(
    seq: &mut ThrowSequencer<L, T>,
    operator: &mut O,
    shutdown: Option<&AtomicBool>,
) -> Result<Vec<ThrowReport>>
where
    L: Actuator,
    T: Actuator,
    O: Operator + ?Sized,
{
    seq.open_trigger_gate().wrap_err("priming trigger gate")?;
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    let (step, points) = (CALIBRATION_STEP_PERCENT as i32, CALIBRATION_POINTS as i32);
    let mut reports = Vec::new();
    for p in (1..points).map(|i| i * step) {
        if stop_requested(shutdown) {
            info!(percent = p, "shutdown requested; calibration series cut short");
            break;
        }
        let percent = operator
            .request_integer(1, 95, Some(p))
            .map_err(input_err)
            .wrap_err_with(|| format!("percentage for step {p}"))?;
        if stop_requested(shutdown) {
            info!(percent, "shutdown requested at the prompt; calibration series cut short");
            break;
        }
        info!(percent, "calibration throw");
        let report = seq
            .throw(f64::from(percent) / 100.0)
            .wrap_err_with(|| format!("calibration throw at {percent} %"))?;
        reports.push(report);
    }
    Ok(reports)
}
