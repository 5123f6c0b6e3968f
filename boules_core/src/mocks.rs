//! Test and helper mocks for boules_core.
//!
//! `RecordingActuator`s and a `RecordingClock` built from the same
//! `CommandLog` write into one shared, ordered log, so tests can assert the
//! exact interleaving of motor moves, waits and dwell sleeps.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use boules_traits::clock::{Clock, ManualClock};
use boules_traits::{Actuator, BoxError, Operator, StopAction};

/// One observable side effect.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Rotate {
        actuator: String,
        degrees: f64,
        speed: u32,
        stop: StopAction,
    },
    WaitStopped {
        actuator: String,
    },
    Sleep(Duration),
}

#[derive(Debug, Clone, Default)]
pub struct CommandLog {
    entries: Arc<Mutex<Vec<Command>>>,
}

impl CommandLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Command>> {
        // a panicking test thread must not hide the log from the others
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn push(&self, cmd: Command) {
        self.lock().push(cmd);
    }

    pub fn entries(&self) -> Vec<Command> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Actuator that records into this log under `name`.
    pub fn actuator(&self, name: &str) -> RecordingActuator {
        RecordingActuator {
            name: name.to_string(),
            log: self.clone(),
            fail_on_rotate: None,
        }
    }

    /// Clock that records every sleep into this log.
    pub fn clock(&self) -> RecordingClock {
        RecordingClock {
            inner: ManualClock::new(),
            log: self.clone(),
        }
    }
}

/// Actuator that completes instantly and records what it was asked to do.
#[derive(Debug, Clone)]
pub struct RecordingActuator {
    name: String,
    log: CommandLog,
    fail_on_rotate: Option<usize>,
}

impl RecordingActuator {
    /// Make the n-th (0-based) `rotate_relative` call fail with an I/O error.
    pub fn failing_on_rotate(mut self, n: usize) -> Self {
        self.fail_on_rotate = Some(n);
        self
    }

    fn rotations(&self) -> usize {
        self.log
            .entries()
            .iter()
            .filter(|c| matches!(c, Command::Rotate { actuator, .. } if *actuator == self.name))
            .count()
    }
}

impl Actuator for RecordingActuator {
    fn rotate_relative(
        &mut self,
        degrees: f64,
        speed: u32,
        stop: StopAction,
    ) -> Result<(), BoxError> {
        if self.fail_on_rotate == Some(self.rotations()) {
            return Err(Box::new(std::io::Error::other(format!(
                "{} motor unplugged",
                self.name
            ))));
        }
        self.log.push(Command::Rotate {
            actuator: self.name.clone(),
            degrees,
            speed,
            stop,
        });
        Ok(())
    }

    fn wait_until_stopped(&mut self, _timeout: Option<Duration>) -> Result<(), BoxError> {
        self.log.push(Command::WaitStopped {
            actuator: self.name.clone(),
        });
        Ok(())
    }
}

/// `ManualClock` that also appends each sleep to a `CommandLog`.
#[derive(Debug, Clone)]
pub struct RecordingClock {
    inner: ManualClock,
    log: CommandLog,
}

impl RecordingClock {
    pub fn elapsed(&self) -> Duration {
        self.inner.elapsed()
    }
}

impl Clock for RecordingClock {
    fn now(&self) -> Instant {
        self.inner.now()
    }

    fn sleep(&self, d: Duration) {
        self.log.push(Command::Sleep(d));
        self.inner.sleep(d);
    }
}

/// Operator answering from a fixed script; errors once a script runs dry.
#[derive(Debug, Default)]
pub struct ScriptedOperator {
    integers: VecDeque<i32>,
    booleans: VecDeque<bool>,
    /// Every `(min, max, default)` passed to `request_integer`.
    pub integer_requests: Vec<(i32, i32, Option<i32>)>,
    pub prompts: Vec<String>,
    pub displayed: Vec<String>,
}

impl ScriptedOperator {
    pub fn new(
        integers: impl IntoIterator<Item = i32>,
        booleans: impl IntoIterator<Item = bool>,
    ) -> Self {
        Self {
            integers: integers.into_iter().collect(),
            booleans: booleans.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl Operator for ScriptedOperator {
    fn request_integer(
        &mut self,
        min: i32,
        max: i32,
        default: Option<i32>,
    ) -> Result<i32, BoxError> {
        self.integer_requests.push((min, max, default));
        self.integers
            .pop_front()
            .ok_or_else(|| "no scripted integer left".into())
    }

    fn request_boolean(&mut self, prompt: &str) -> Result<bool, BoxError> {
        self.prompts.push(prompt.to_string());
        self.booleans
            .pop_front()
            .ok_or_else(|| "no scripted answer left".into())
    }

    fn display(&mut self, lines: &[&str]) {
        self.displayed.extend(lines.iter().map(|l| l.to_string()));
    }
}
