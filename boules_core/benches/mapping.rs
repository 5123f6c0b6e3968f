use boules_core::model::fit;
use boules_core::{CalibrationSeries, ModelKind};
use criterion::{Criterion, black_box, criterion_group, criterion_main};

fn series() -> CalibrationSeries {
    // slightly convex, like a real ramp
    CalibrationSeries::new(
        (0..20)
            .map(|i| {
                let p = f64::from(i) * 5.0;
                2.0 + 1.4 * p + 0.006 * p * p
            })
            .collect(),
    )
    .unwrap_or_else(|e| panic!("bench series: {e}"))
}

fn bench_fit(c: &mut Criterion) {
    let s = series();
    let mut group = c.benchmark_group("fit");
    for kind in ModelKind::ALL {
        group.bench_function(kind.as_str(), |b| {
            b.iter(|| fit(black_box(&s), kind).map(|m| m.len()))
        });
    }
    group.finish();
}

fn bench_resolve(c: &mut Criterion) {
    let map = match fit(&series(), ModelKind::SplineCubic) {
        Ok(m) => m,
        Err(e) => panic!("bench map: {e}"),
    };
    c.bench_function("resolve_sweep", |b| {
        b.iter(|| {
            let mut acc = 0.0;
            for d in -50..250 {
                acc += map.resolve_percentage(black_box(f64::from(d) + 0.25));
            }
            acc
        })
    });
}

criterion_group!(benches, bench_fit, bench_resolve);
criterion_main!(benches);
