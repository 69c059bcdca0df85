use std::hint::black_box;

use contagion::prelude::*;
use criterion::{criterion_group, criterion_main, Criterion};

pub fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulator");

    for model in [ModelKind::Sir, ModelKind::Sis] {
        let params = SimulationParameters::presentation_default(model);
        group.bench_function(format!("{model} 100 days dt=0.1"), |bencher| {
            bencher.iter_with_large_drop(|| run(black_box(&params)))
        });
    }

    let fine = SimulationParameters {
        step_size: 0.001,
        ..SimulationParameters::default()
    };
    group.bench_function("SIR 100 days dt=0.001", |bencher| {
        bencher.iter_with_large_drop(|| run(black_box(&fine)))
    });

    let params = SimulationParameters::default();
    group.bench_function("derived metrics", |bencher| {
        bencher.iter(|| DerivedMetrics::from_parameters(black_box(&params)))
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
