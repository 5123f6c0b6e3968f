use thiserror::Error;

/// Which of the two motors an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuatorRole {
    Lift,
    Trigger,
}

impl std::fmt::Display for ActuatorRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ActuatorRole::Lift => "lift",
            ActuatorRole::Trigger => "trigger",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ThrowError {
    #[error("invalid calibration data: {0}")]
    InvalidCalibrationData(String),
    #[error("invalid mapping table: {0}")]
    InvalidMapping(String),
    #[error("{actuator} actuator stalled: not stopped after {timeout_ms} ms")]
    ActuatorStall {
        actuator: ActuatorRole,
        timeout_ms: u64,
    },
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("hardware fault: {0}")]
    HardwareFault(String),
    #[error("operator input failed: {0}")]
    Input(String),
    #[error("invalid state: {0}")]
    State(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
