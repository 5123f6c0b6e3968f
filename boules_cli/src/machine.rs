//! Assembly of the mapping table and actuators, and the command handlers.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use boules_config::{Backend, Config, TableRow};
use boules_core::{
    CalibrationSeries, DistanceMap, DynSequencer, ModelKind, SessionCfg, ThrowError, ThrowParams,
    ThrowReport, ThrowSequencerBuilder,
};
use boules_hardware::{Ev3TachoMotor, SimulatedActuator};
use boules_traits::Actuator;
use eyre::{Result, WrapErr};
use serde_json::json;

use crate::cli::{Cli, JSON_MODE};

/// Makes the simulated lift jam, to exercise stall handling end to end.
const SIM_STALL_ENV: &str = "BOULES_TEST_SIM_STALL";

/// Where the mapping table came from.
#[derive(Debug, Clone)]
pub enum MapSource {
    Table(String),
    Fitted { model: ModelKind, from: String },
}

impl std::fmt::Display for MapSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapSource::Table(path) => write!(f, "table {path}"),
            MapSource::Fitted { model, from } => write!(f, "{model} fit of {from}"),
        }
    }
}

fn json_mode() -> bool {
    JSON_MODE.get().copied().unwrap_or(false)
}

fn table_from_csv(path: &Path) -> Result<DistanceMap> {
    let rows = boules_config::load_table_csv(path)
        .wrap_err_with(|| format!("load mapping table {}", path.display()))?;
    DistanceMap::new(rows.iter().map(|r| (r.distance_cm, r.percentage))).map_err(eyre::Report::new)
}

fn fit_series(distances: Vec<f64>, model: ModelKind) -> Result<DistanceMap> {
    let series = CalibrationSeries::new(distances).map_err(eyre::Report::new)?;
    DistanceMap::from_calibration(&series, model).map_err(eyre::Report::new)
}

/// Build the mapping table. CLI flags win over the config file; a stored
/// table wins over fitting measurements.
pub fn build_map(cli: &Cli, cfg: &Config) -> Result<(DistanceMap, MapSource)> {
    let model: ModelKind = cli
        .model
        .map_or_else(|| cfg.model.kind.into(), Into::into);

    if let Some(path) = &cli.table {
        let map = table_from_csv(path)?;
        return Ok((map, MapSource::Table(path.display().to_string())));
    }
    if let Some(path) = &cli.measurements {
        let distances = boules_config::load_measurements_csv(path)
            .wrap_err_with(|| format!("load measurements {}", path.display()))?;
        let map = fit_series(distances, model)
            .wrap_err_with(|| format!("fit {model} to {}", path.display()))?;
        let from = path.display().to_string();
        return Ok((map, MapSource::Fitted { model, from }));
    }
    if let Some(path) = &cfg.model.table {
        let map = table_from_csv(Path::new(path))?;
        return Ok((map, MapSource::Table(path.clone())));
    }
    if let Some(cal) = &cfg.calibration {
        let map = fit_series(cal.distances_cm.clone(), model)
            .wrap_err_with(|| format!("fit {model} to calibration.distances_cm"))?;
        let from = "calibration.distances_cm".to_string();
        return Ok((map, MapSource::Fitted { model, from }));
    }
    Err(eyre::Report::new(ThrowError::Config(
        "no mapping table or calibration measurements configured".into(),
    )))
}

pub fn build_actuators(cfg: &Config) -> Result<(Box<dyn Actuator>, Box<dyn Actuator>)> {
    let a = &cfg.actuators;
    match a.backend {
        Backend::Simulated => {
            let lift = if std::env::var_os(SIM_STALL_ENV).is_some() {
                tracing::warn!("simulated lift will stall");
                SimulatedActuator::stalled("lift")
            } else {
                SimulatedActuator::new("lift")
            };
            Ok((Box::new(lift), Box::new(SimulatedActuator::new("trigger"))))
        }
        Backend::Ev3 => {
            let root = Path::new(&a.sysfs_root);
            let poll = Duration::from_millis(a.poll_ms);
            let lift = Ev3TachoMotor::open_in(root, &a.lift_port, poll)
                .wrap_err_with(|| format!("open lift motor on {}", a.lift_port))?;
            let trigger = Ev3TachoMotor::open_in(root, &a.trigger_port, poll)
                .wrap_err_with(|| format!("open trigger motor on {}", a.trigger_port))?;
            Ok((Box::new(lift), Box::new(trigger)))
        }
    }
}

pub fn build_sequencer(map: DistanceMap, cfg: &Config) -> Result<DynSequencer> {
    let (lift, trigger) = build_actuators(cfg)?;
    ThrowSequencerBuilder::new()
        .with_lift(lift)
        .with_trigger(trigger)
        .with_map(Arc::new(map))
        .with_params(ThrowParams::from(cfg))
        .build()
}

fn report_json(r: &ThrowReport) -> serde_json::Value {
    json!({
        "requested": r.plan.requested,
        "distance_cm": r.plan.distance_cm,
        "clamped": r.plan.clamped,
        "percentage": r.plan.percentage,
        "lift_deg": r.plan.angle(),
        "elapsed_ms": r.elapsed_ms,
    })
}

fn print_report(r: &ThrowReport) {
    if json_mode() {
        println!("{}", json!({ "throw": report_json(r) }));
    } else {
        let target = r
            .plan
            .distance_cm
            .map_or_else(|| "fraction".to_string(), |d| format!("{d} cm"));
        let clamped = if r.plan.clamped { " (clamped)" } else { "" };
        println!(
            "throw complete: {target}{clamped}, lift {:.1}% = {:.1} deg, {} ms",
            r.plan.percentage * 100.0,
            r.plan.angle(),
            r.elapsed_ms
        );
    }
}

pub fn run_throw(seq: &mut DynSequencer, distance: f64) -> Result<()> {
    let report = seq.throw(distance)?;
    print_report(&report);
    Ok(())
}

pub fn run_prime(seq: &mut DynSequencer) -> Result<()> {
    seq.open_trigger_gate()?;
    if json_mode() {
        println!("{}", json!({ "primed": true }));
    } else {
        println!("trigger gate primed");
    }
    Ok(())
}

pub fn run_play(seq: &mut DynSequencer, cfg: &Config, shutdown: &AtomicBool) -> Result<()> {
    let mut operator = boules_ui::TerminalOperator::stdio();
    let session = SessionCfg::from(&cfg.session);
    let summary = boules_core::run_session(seq, &mut operator, &session, Some(shutdown))?;
    if json_mode() {
        let reports: Vec<_> = summary.reports.iter().map(report_json).collect();
        println!("{}", json!({ "throws": summary.throws, "reports": reports }));
    } else {
        println!("session finished after {} throw(s)", summary.throws);
    }
    Ok(())
}

pub fn run_calibrate(seq: &mut DynSequencer, shutdown: &AtomicBool) -> Result<()> {
    let mut operator = boules_ui::TerminalOperator::stdio();
    let reports = boules_core::run_calibration_series(seq, &mut operator, Some(shutdown))?;
    if json_mode() {
        let percents: Vec<f64> = reports.iter().map(|r| r.plan.percentage).collect();
        println!("{}", json!({ "calibration_throws": reports.len(), "percentages": percents }));
    } else {
        println!(
            "{} calibration throws done; measure each landing spot and record percent,distance_cm",
            reports.len()
        );
    }
    Ok(())
}

pub fn run_fit(map: &DistanceMap, out: Option<&Path>) -> Result<()> {
    let rows: Vec<TableRow> = map
        .iter()
        .map(|(distance_cm, percentage)| TableRow {
            distance_cm,
            percentage,
        })
        .collect();
    match out {
        Some(path) => {
            boules_config::save_table_csv(path, &rows)?;
            tracing::info!(path = %path.display(), rows = rows.len(), "mapping table written");
            if json_mode() {
                println!(
                    "{}",
                    json!({ "written": path.display().to_string(), "rows": rows.len() })
                );
            } else {
                println!("wrote {} rows to {}", rows.len(), path.display());
            }
        }
        None => {
            let bytes = boules_config::table_to_csv(&rows)?;
            print!("{}", String::from_utf8_lossy(&bytes));
        }
    }
    Ok(())
}

pub fn run_self_check(cli: &Cli, cfg: &Config) -> Result<()> {
    let (map, source) = build_map(cli, cfg)?;
    let (start, end, entries, monotonic) = (map.start(), map.end(), map.len(), map.is_monotonic());
    build_sequencer(map, cfg)?;
    let backend = match cfg.actuators.backend {
        Backend::Simulated => "simulated",
        Backend::Ev3 => "ev3",
    };
    if json_mode() {
        println!(
            "{}",
            json!({
                "ok": true,
                "backend": backend,
                "source": source.to_string(),
                "start_cm": start,
                "end_cm": end,
                "entries": entries,
                "monotonic": monotonic,
            })
        );
    } else {
        println!("OK: {backend} actuators, {source}");
        println!("range {start}..{end} cm, {entries} entries, monotonic: {monotonic}");
    }
    Ok(())
}
