#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core throwing logic (hardware-agnostic).
//!
//! All motor access goes through `boules_traits::Actuator`, all operator
//! interaction through `boules_traits::Operator`, and all waiting through
//! `boules_traits::Clock`.
//!
//! ## Architecture
//!
//! - **Mapping**: distance (cm) → lift percentage table (`mapping` module)
//! - **Model**: calibration series → fitted table (`model` module)
//! - **Trajectory**: percentage → lift rotation and the per-throw plan
//! - **Sequencer**: lift up, gate open, gate close, lift down (`sequencer`)
//! - **Session**: interactive throw loop and the calibration series
//!
//! A request value in `[0, 1)` is a lift fraction and bypasses the table;
//! anything else is a distance in centimetres, clamped into the table range.

pub mod builder;
pub mod config;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mapping;
pub mod mocks;
pub mod model;
pub mod sequencer;
pub mod session;
pub mod status;
pub mod trajectory;

pub use builder::{Missing, ThrowSequencerBuilder};
pub use config::{SessionCfg, ThrowParams};
pub use error::{ActuatorRole, BuildError, Report, Result, ThrowError};
pub use mapping::{DistanceMap, Resolved};
pub use model::{CalibrationSeries, ModelKind};
pub use sequencer::{DynSequencer, ThrowSequencer};
pub use session::{SessionSummary, run_calibration_series, run_session};
pub use status::{ThrowPhase, ThrowReport, ThrowStatus};
pub use trajectory::{ActuationRequest, ThrowPlan};
