pub mod error;
pub mod ev3;
pub mod util;

use std::time::Duration;

use boules_traits::{Actuator, BoxError, StopAction};

pub use ev3::Ev3TachoMotor;

/// Simulated actuator: tracks position and completes every move instantly.
pub struct SimulatedActuator {
    name: String,
    position_deg: f64,
    moves: u64,
    stalled: bool,
    poll: Duration,
}

impl SimulatedActuator {
    pub fn new(name: impl Into<String>) -> Self {
        SimulatedActuator {
            name: name.into(),
            position_deg: 0.0,
            moves: 0,
            stalled: false,
            poll: Duration::from_millis(1),
        }
    }

    /// An actuator that never reports stopped, as if jammed.
    pub fn stalled(name: impl Into<String>) -> Self {
        SimulatedActuator {
            stalled: true,
            ..Self::new(name)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accumulated relative rotation since construction.
    pub fn position_deg(&self) -> f64 {
        self.position_deg
    }

    pub fn moves(&self) -> u64 {
        self.moves
    }
}

impl Actuator for SimulatedActuator {
    fn rotate_relative(
        &mut self,
        degrees: f64,
        speed: u32,
        stop: StopAction,
    ) -> Result<(), BoxError> {
        if !degrees.is_finite() {
            return Err(Box::new(error::HwError::InvalidCommand(format!(
                "non-finite rotation {degrees}"
            ))));
        }
        self.position_deg += degrees;
        self.moves += 1;
        tracing::debug!(
            actuator = %self.name,
            degrees,
            speed,
            stop = stop.as_str(),
            position_deg = self.position_deg,
            "simulated move"
        );
        Ok(())
    }

    fn wait_until_stopped(&mut self, timeout: Option<Duration>) -> Result<(), BoxError> {
        if self.stalled {
            util::wait_while_running(|| Ok(true), timeout, self.poll)?;
        }
        Ok(())
    }
}
