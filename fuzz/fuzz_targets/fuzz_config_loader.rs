#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse errors and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<boules_config::Config>(data) {
        if cfg.validate().is_ok()
            && let Some(cal) = &cfg.calibration
        {
            // a validated series must always be accepted by the core
            boules_core::CalibrationSeries::new(cal.distances_cm.clone())
                .expect("validated calibration rejected");
        }
    }
});
