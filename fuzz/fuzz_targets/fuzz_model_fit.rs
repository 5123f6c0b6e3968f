#![no_main]
use boules_core::{CalibrationSeries, ModelKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: ([f64; 20], u8)| {
    let (distances, kind) = input;
    let Ok(series) = CalibrationSeries::new(distances.to_vec()) else {
        return;
    };
    let kind = ModelKind::ALL[usize::from(kind) % ModelKind::ALL.len()];
    if let Ok(map) = boules_core::model::fit(&series, kind) {
        assert!(map.start() <= map.end());
        for (_, pct) in map.iter() {
            assert!((0.0..1.0).contains(&pct));
        }
        let _ = map.resolve_percentage(f64::NAN);
    }
});
