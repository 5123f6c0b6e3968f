pub mod clock;

pub use clock::{Clock, ManualClock, MonotonicClock};

use std::time::Duration;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// What a motor does once it reaches its position setpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopAction {
    /// Short the windings; the shaft stops quickly but can be turned by hand.
    #[default]
    Brake,
    /// Remove power and let the shaft spin down.
    Coast,
    /// Actively hold the position.
    Hold,
}

impl StopAction {
    /// Name used by motor drivers (ev3dev `stop_action` values).
    pub fn as_str(self) -> &'static str {
        match self {
            StopAction::Brake => "brake",
            StopAction::Coast => "coast",
            StopAction::Hold => "hold",
        }
    }
}

/// A rotary actuator that moves by a relative angle.
pub trait Actuator {
    /// Start a move of `degrees` (signed) relative to the current position.
    /// Returns as soon as the command is issued.
    fn rotate_relative(
        &mut self,
        degrees: f64,
        speed: u32,
        stop: StopAction,
    ) -> Result<(), BoxError>;

    /// Block until the actuator is no longer moving. `None` waits forever.
    fn wait_until_stopped(&mut self, timeout: Option<Duration>) -> Result<(), BoxError>;
}

impl<A: Actuator + ?Sized> Actuator for Box<A> {
    fn rotate_relative(
        &mut self,
        degrees: f64,
        speed: u32,
        stop: StopAction,
    ) -> Result<(), BoxError> {
        (**self).rotate_relative(degrees, speed, stop)
    }

    fn wait_until_stopped(&mut self, timeout: Option<Duration>) -> Result<(), BoxError> {
        (**self).wait_until_stopped(timeout)
    }
}

/// The person at the machine: answers questions and reads the display.
pub trait Operator {
    /// Ask for an integer in `[min, max]`; `default` is the preselected value.
    fn request_integer(&mut self, min: i32, max: i32, default: Option<i32>)
    -> Result<i32, BoxError>;

    /// Ask a yes/no question.
    fn request_boolean(&mut self, prompt: &str) -> Result<bool, BoxError>;

    /// Show some lines. Best effort.
    fn display(&mut self, lines: &[&str]);
}

impl<O: Operator + ?Sized> Operator for Box<O> {
    fn request_integer(
        &mut self,
        min: i32,
        max: i32,
        default: Option<i32>,
    ) -> Result<i32, BoxError> {
        (**self).request_integer(min, max, default)
    }

    fn request_boolean(&mut self, prompt: &str) -> Result<bool, BoxError> {
        (**self).request_boolean(prompt)
    }

    fn display(&mut self, lines: &[&str]) {
        (**self).display(lines)
    }
}
