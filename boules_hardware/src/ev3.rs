//! ev3dev tacho-motor driver over the sysfs class interface.
//!
//! Each motor is a directory under `/sys/class/tacho-motor/` whose `address`
//! attribute names the output port (`ev3-ports:outA`, ...). A relative move is
//! `stop_action`, `speed_sp`, `position_sp`, then `command = run-to-rel-pos`;
//! the motor is moving while its `state` contains `running`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use boules_traits::{Actuator, BoxError, StopAction};
use tracing::{debug, trace};

use crate::error::{HwError, Result};
use crate::util::wait_while_running;

pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/tacho-motor";

/// Tacho counts per revolution of the EV3 large motor.
const DEFAULT_COUNTS_PER_ROT: u32 = 360;

#[derive(Debug)]
pub struct Ev3TachoMotor {
    dir: PathBuf,
    port: String,
    poll: Duration,
    counts_per_rot: u32,
}

impl Ev3TachoMotor {
    /// Find the motor plugged into `port` (e.g. `outB`) under `root`.
    pub fn open_in(root: &Path, port: &str, poll: Duration) -> Result<Self> {
        let entries = fs::read_dir(root)?;
        for entry in entries {
            let dir = entry?.path();
            let Ok(address) = fs::read_to_string(dir.join("address")) else {
                continue;
            };
            let address = address.trim();
            if address == port || address.ends_with(&format!(":{port}")) {
                let counts_per_rot = fs::read_to_string(dir.join("count_per_rot"))
                    .ok()
                    .and_then(|s| s.trim().parse::<u32>().ok())
                    .filter(|c| *c > 0)
                    .unwrap_or(DEFAULT_COUNTS_PER_ROT);
                debug!(port, dir = %dir.display(), counts_per_rot, "tacho motor found");
                return Ok(Self {
                    dir,
                    port: port.to_string(),
                    poll,
                    counts_per_rot,
                });
            }
        }
        Err(HwError::MotorNotFound(port.to_string()))
    }

    pub fn open(port: &str, poll: Duration) -> Result<Self> {
        Self::open_in(Path::new(DEFAULT_SYSFS_ROOT), port, poll)
    }

    pub fn port(&self) -> &str {
        &self.port
    }

    /// Current tacho position in counts.
    pub fn position(&self) -> Result<i64> {
        let raw = self.read_attr("position")?;
        raw.parse::<i64>()
            .map_err(|_| HwError::Fault(format!("unreadable position '{raw}'")))
    }

    pub fn is_running(&self) -> Result<bool> {
        let state = self.read_attr("state")?;
        Ok(state.split_whitespace().any(|flag| flag == "running"))
    }

    fn degrees_to_counts(&self, degrees: f64) -> i64 {
        (degrees * f64::from(self.counts_per_rot) / 360.0).round() as i64
    }

    fn read_attr(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(self.dir.join(name))?.trim().to_string())
    }

    fn write_attr(&self, name: &str, value: &str) -> Result<()> {
        trace!(port = %self.port, attr = name, value, "sysfs write");
        fs::write(self.dir.join(name), value)?;
        Ok(())
    }

    fn run_to_rel_pos(&mut self, degrees: f64, speed: u32, stop: StopAction) -> Result<()> {
        if !degrees.is_finite() {
            return Err(HwError::InvalidCommand(format!(
                "non-finite rotation {degrees}"
            )));
        }
        let counts = self.degrees_to_counts(degrees);
        self.write_attr("stop_action", stop.as_str())?;
        self.write_attr("speed_sp", &speed.to_string())?;
        self.write_attr("position_sp", &counts.to_string())?;
        self.write_attr("command", "run-to-rel-pos")
    }
}

impl Actuator for Ev3TachoMotor {
    fn rotate_relative(
        &mut self,
        degrees: f64,
        speed: u32,
        stop: StopAction,
    ) -> std::result::Result<(), BoxError> {
        Ok(self.run_to_rel_pos(degrees, speed, stop)?)
    }

    fn wait_until_stopped(&mut self, timeout: Option<Duration>) -> std::result::Result<(), BoxError> {
        let poll = self.poll;
        Ok(wait_while_running(|| self.is_running(), timeout, poll)?)
    }
}
