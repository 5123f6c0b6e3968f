use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("no tacho motor found on port {0}")]
    MotorNotFound(String),
    #[error("motor did not stop within {timeout_ms} ms (stall)")]
    StallTimeout { timeout_ms: u64 },
    #[error("motor reported fault state: {0}")]
    Fault(String),
    #[error("invalid motor command: {0}")]
    InvalidCommand(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
