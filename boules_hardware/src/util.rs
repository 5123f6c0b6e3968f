use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Poll `is_running` until it reports false, sleeping `poll_interval` between
/// polls. With `timeout = None` this waits forever; otherwise it fails with
/// `HwError::StallTimeout` once the deadline passes.
pub fn wait_while_running(
    mut is_running: impl FnMut() -> Result<bool>,
    timeout: Option<Duration>,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = timeout.map(|t| Instant::now() + t);
    while is_running()? {
        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            return Err(HwError::StallTimeout {
                timeout_ms: timeout.map_or(0, |t| t.as_millis() as u64),
            });
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}
