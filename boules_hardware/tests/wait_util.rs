use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};
use std::thread;
use std::time::Duration;

use boules_hardware::error::HwError;
use boules_hardware::util::wait_while_running;

#[test]
fn wait_returns_once_motion_stops() {
    let running = Arc::new(AtomicBool::new(true));
    let running_bg = running.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_millis(3));
        running_bg.store(false, Ordering::Relaxed);
    });

    let res = wait_while_running(
        || Ok(running.load(Ordering::Relaxed)),
        Some(Duration::from_millis(500)),
        Duration::from_micros(200),
    );
    assert!(res.is_ok(), "expected success, got {res:?}");
}

#[test]
fn wait_without_timeout_still_returns_when_stopped() {
    let mut polls = 0;
    let res = wait_while_running(
        || {
            polls += 1;
            Ok(polls < 3)
        },
        None,
        Duration::from_micros(100),
    );
    assert!(res.is_ok());
    assert_eq!(polls, 3);
}

#[test]
fn wait_times_out_as_stall() {
    let err = wait_while_running(|| Ok(true), Some(Duration::from_millis(5)), Duration::from_micros(200))
        .expect_err("expected stall");

    match err {
        HwError::StallTimeout { timeout_ms } => assert_eq!(timeout_ms, 5),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn poll_errors_propagate() {
    let err = wait_while_running(
        || Err(HwError::Fault("overloaded".into())),
        None,
        Duration::from_micros(100),
    )
    .expect_err("expected fault");
    assert!(matches!(err, HwError::Fault(_)));
}
