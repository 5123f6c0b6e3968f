//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "boules", version, about = "Boules throwing machine")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/boules.toml")]
    pub config: PathBuf,

    /// Model used to fit calibration measurements (overrides [model].kind)
    #[arg(long, value_enum, value_name = "KIND")]
    pub model: Option<ModelArg>,

    /// Calibration measurement CSV (strict header: percent,distance_cm)
    #[arg(long, value_name = "FILE", conflicts_with = "table")]
    pub measurements: Option<PathBuf>,

    /// Precomputed mapping table CSV (strict header: distance_cm,percentage)
    #[arg(long, value_name = "FILE")]
    pub table: Option<PathBuf>,

    /// Log and report as JSON lines instead of pretty
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

/// Same names as `[model].kind`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum ModelArg {
    /// Piecewise linear interpolation
    SplineLinear,
    /// Not-a-knot cubic spline
    SplineCubic,
    /// Least-squares line
    PolyLinear,
    /// Least-squares cubic
    PolyCubic,
}

impl From<ModelArg> for boules_core::ModelKind {
    fn from(m: ModelArg) -> Self {
        match m {
            ModelArg::SplineLinear => Self::SplineLinear,
            ModelArg::SplineCubic => Self::SplineCubic,
            ModelArg::PolyLinear => Self::PolyLinear,
            ModelArg::PolyCubic => Self::PolyCubic,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive session: ask for a distance, throw, ask to go again
    Play,
    /// Throw once, without prompting
    Throw {
        /// Distance in cm, or a lift fraction in [0, 1)
        #[arg(long, allow_negative_numbers = true)]
        distance: f64,
    },
    /// Open and close the trigger gate once
    Prime,
    /// Throw the 5..95 % measurement series for a new calibration
    Calibrate,
    /// Print the fitted mapping table as CSV, or write it atomically
    Fit {
        /// Write the table here instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Quick health check (table and actuators come up)
    SelfCheck,
}
