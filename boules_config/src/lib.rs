#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schemas and calibration file parsing for the boules machine.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Measurement CSV loader enforces headers and the fixed 0..95 % grid.
//! - Mapping table CSV can be loaded, or written atomically after a fit.
pub mod atomic;

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub use atomic::write_atomic;

/// Number of calibration measurements: one per lift percentage 0, 5, ..., 95.
pub const CALIBRATION_POINTS: usize = 20;
/// Spacing of the calibration grid in percent.
pub const CALIBRATION_STEP_PERCENT: u32 = 5;

/// Calibration measurement CSV schema.
///
/// Expected headers:
/// percent,distance_cm
///
/// Example:
/// percent,distance_cm
/// 0,12.5
/// 5,19.0
#[derive(Debug, Deserialize, Clone, Copy)]
pub struct MeasurementRow {
    pub percent: u32,
    pub distance_cm: f64,
}

/// Mapping table CSV schema (`distance_cm,percentage`), percentage in [0,1).
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct TableRow {
    pub distance_cm: i32,
    pub percentage: f64,
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StopActionCfg {
    #[default]
    Brake,
    Coast,
    Hold,
}

/// Robot-specific throw constants.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Throw {
    /// Length of the ramp in degrees of lift motor rotation
    pub ramp_rotation_deg: f64,
    /// Trigger rotation needed to open the gate
    pub trigger_rotation_deg: f64,
    pub lift_speed_up: u32,
    pub lift_speed_down: u32,
    pub trigger_speed: u32,
    /// Fraction of the up-stroke used for the down-stroke (mechanical slack)
    pub lift_down_offset: f64,
    /// Time the gate stays open/closed for the ball to roll out (ms)
    pub dwell_ms: u64,
    pub stop_action: StopActionCfg,
}

impl Default for Throw {
    fn default() -> Self {
        Self {
            ramp_rotation_deg: 1300.0,
            trigger_rotation_deg: 95.0,
            lift_speed_up: 300,
            lift_speed_down: 450,
            trigger_speed: 450,
            lift_down_offset: 0.975,
            dwell_ms: 2000,
            stop_action: StopActionCfg::Brake,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    #[serde(alias = "sim")]
    Simulated,
    Ev3,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Actuators {
    pub backend: Backend,
    /// Port of the lift motor (pulls the cage up the ramp)
    pub lift_port: String,
    /// Port of the trigger motor (opens the cage gate)
    pub trigger_port: String,
    /// Directory holding the tacho-motor class devices
    pub sysfs_root: String,
    /// Poll interval while waiting for a motor to stop
    pub poll_ms: u64,
    /// Give up waiting for a motor after this many ms (0 waits forever)
    pub stop_timeout_ms: u64,
}

impl Default for Actuators {
    fn default() -> Self {
        Self {
            backend: Backend::Simulated,
            lift_port: "outB".to_string(),
            trigger_port: "outA".to_string(),
            sysfs_root: "/sys/class/tacho-motor".to_string(),
            poll_ms: 10,
            stop_timeout_ms: 0,
        }
    }
}

/// Regression model used to turn measurements into a mapping table.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    SplineLinear,
    #[default]
    SplineCubic,
    PolyLinear,
    PolyCubic,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Model {
    pub kind: ModelKind,
    /// Precomputed table CSV; preferred over fitting when present.
    pub table: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CalibrationCfg {
    /// Measured distances for lift percentages 0, 5, ..., 95
    pub distances_cm: Vec<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionCfg {
    /// How long the intro text stays up before the first question (ms)
    pub intro_ms: u64,
    /// Pause before each distance request (ms)
    pub pause_ms: u64,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            intro_ms: 4000,
            pause_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub throw: Throw,
    #[serde(default)]
    pub actuators: Actuators,
    #[serde(default)]
    pub model: Model,
    /// Measured calibration series; used when no table is configured.
    #[serde(default)]
    pub calibration: Option<CalibrationCfg>,
    #[serde(default)]
    pub session: SessionCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Turn measurement rows into distances ordered by percent.
///
/// Rows may come in any order but must hit every grid point 0, 5, ..., 95
/// exactly once.
pub fn measurements_from_rows(mut rows: Vec<MeasurementRow>) -> eyre::Result<Vec<f64>> {
    if rows.len() != CALIBRATION_POINTS {
        eyre::bail!(
            "calibration requires exactly {} measurements (0..95 % in {} % steps), got {}",
            CALIBRATION_POINTS,
            CALIBRATION_STEP_PERCENT,
            rows.len()
        );
    }
    rows.sort_by_key(|r| r.percent);
    for (i, row) in rows.iter().enumerate() {
        let expected = i as u32 * CALIBRATION_STEP_PERCENT;
        if row.percent != expected {
            eyre::bail!(
                "calibration percent grid broken: expected {} %, got {} %",
                expected,
                row.percent
            );
        }
        if !row.distance_cm.is_finite() {
            eyre::bail!("calibration distance at {} % is not a number", row.percent);
        }
    }
    Ok(rows.into_iter().map(|r| r.distance_cm).collect())
}

pub fn load_measurements_csv(path: &Path) -> eyre::Result<Vec<f64>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open measurement CSV {:?}: {}", path, e))?;

    check_headers(&mut rdr, path, &["percent", "distance_cm"], "measurement")?;

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<MeasurementRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    measurements_from_rows(rows)
}

/// Check table rows: non-empty, unique distances, percentages in [0,1).
pub fn validate_table(rows: &[TableRow]) -> eyre::Result<()> {
    if rows.is_empty() {
        eyre::bail!("mapping table is empty");
    }
    let mut seen = BTreeSet::new();
    for row in rows {
        if !seen.insert(row.distance_cm) {
            eyre::bail!("mapping table has duplicate distance {} cm", row.distance_cm);
        }
        if !(row.percentage.is_finite() && (0.0..1.0).contains(&row.percentage)) {
            eyre::bail!(
                "mapping table percentage for {} cm must be in [0, 1), got {}",
                row.distance_cm,
                row.percentage
            );
        }
    }
    Ok(())
}

pub fn load_table_csv(path: &Path) -> eyre::Result<Vec<TableRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open table CSV {:?}: {}", path, e))?;

    check_headers(&mut rdr, path, &["distance_cm", "percentage"], "table")?;

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<TableRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    validate_table(&rows)?;
    Ok(rows)
}

/// Render table rows as CSV with the `distance_cm,percentage` header.
pub fn table_to_csv(rows: &[TableRow]) -> eyre::Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| eyre::eyre!("serialize table row {}: {}", row.distance_cm, e))?;
    }
    wtr.into_inner()
        .map_err(|e| eyre::eyre!("flush table CSV: {}", e))
}

pub fn save_table_csv(path: &Path, rows: &[TableRow]) -> eyre::Result<()> {
    validate_table(rows)?;
    let bytes = table_to_csv(rows)?;
    write_atomic(path, &bytes).map_err(|e| eyre::eyre!("write table CSV {:?}: {}", path, e))
}

fn check_headers<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    path: &Path,
    expected: &[&str],
    what: &str,
) -> eyre::Result<()> {
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "{} CSV must have headers '{}', got: {}",
            what,
            expected.join(","),
            actual.join(",")
        );
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Throw
        let t = &self.throw;
        if !(t.ramp_rotation_deg.is_finite() && t.ramp_rotation_deg > 0.0) {
            eyre::bail!("throw.ramp_rotation_deg must be > 0");
        }
        if !(t.trigger_rotation_deg.is_finite() && t.trigger_rotation_deg > 0.0) {
            eyre::bail!("throw.trigger_rotation_deg must be > 0");
        }
        if t.lift_speed_up == 0 {
            eyre::bail!("throw.lift_speed_up must be > 0");
        }
        if t.lift_speed_down == 0 {
            eyre::bail!("throw.lift_speed_down must be > 0");
        }
        if t.trigger_speed == 0 {
            eyre::bail!("throw.trigger_speed must be > 0");
        }
        if !(t.lift_down_offset > 0.0 && t.lift_down_offset <= 1.0) {
            eyre::bail!("throw.lift_down_offset must be in (0.0, 1.0]");
        }
        if t.dwell_ms > 60 * 1000 {
            eyre::bail!("throw.dwell_ms is unreasonably large (>60s)");
        }

        // Actuators
        let a = &self.actuators;
        if a.lift_port.trim().is_empty() || a.trigger_port.trim().is_empty() {
            eyre::bail!("actuators.lift_port and actuators.trigger_port must be set");
        }
        if a.lift_port == a.trigger_port {
            eyre::bail!("actuators.lift_port and actuators.trigger_port must differ");
        }
        if a.poll_ms == 0 {
            eyre::bail!("actuators.poll_ms must be >= 1");
        }
        if a.stop_timeout_ms > 10 * 60 * 1000 {
            eyre::bail!("actuators.stop_timeout_ms is unreasonably large (>10min)");
        }

        // Calibration
        if let Some(cal) = &self.calibration {
            if cal.distances_cm.len() != CALIBRATION_POINTS {
                eyre::bail!(
                    "calibration.distances_cm must have exactly {} values, got {}",
                    CALIBRATION_POINTS,
                    cal.distances_cm.len()
                );
            }
            if cal.distances_cm.iter().any(|d| !d.is_finite()) {
                eyre::bail!("calibration.distances_cm must be finite numbers");
            }
        }

        // Session
        if self.session.intro_ms > 60 * 1000 || self.session.pause_ms > 60 * 1000 {
            eyre::bail!("session.intro_ms / session.pause_ms are unreasonably large (>60s)");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_original_robot_defaults() {
        let cfg = load_toml("").expect("empty config parses");
        assert_eq!(cfg.throw.ramp_rotation_deg, 1300.0);
        assert_eq!(cfg.throw.trigger_rotation_deg, 95.0);
        assert_eq!(cfg.throw.lift_speed_up, 300);
        assert_eq!(cfg.throw.lift_speed_down, 450);
        assert_eq!(cfg.throw.trigger_speed, 450);
        assert_eq!(cfg.throw.lift_down_offset, 0.975);
        assert_eq!(cfg.throw.dwell_ms, 2000);
        assert_eq!(cfg.model.kind, ModelKind::SplineCubic);
        assert_eq!(cfg.actuators.backend, Backend::Simulated);
        assert!(cfg.calibration.is_none());
        cfg.validate().expect("defaults are valid");
    }

    #[test]
    fn table_csv_has_header() {
        let rows = [TableRow {
            distance_cm: 10,
            percentage: 0.25,
        }];
        let bytes = table_to_csv(&rows).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("distance_cm,percentage\n"));
        assert!(text.contains("10,0.25"));
    }
}
