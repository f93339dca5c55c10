//! Criterion benchmarks for the coupled temperature/oxygen model.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use limnos_bench::{reference_profile, stress_profile};
use limnos_engine::{Model, ModelConfig, Overrides};

fn initialized(config: ModelConfig) -> Model {
    let mut model = Model::new(config).unwrap();
    model.initialize().unwrap();
    // Warm up: one step so first-write allocation is done.
    model.step(&Overrides::new()).unwrap();
    model
}

fn bench_step_10k(c: &mut Criterion) {
    c.bench_function("step_10k", |b| {
        b.iter_batched_ref(
            || initialized(reference_profile(42)),
            |model| {
                let metrics = model.step(&Overrides::new()).unwrap();
                black_box(metrics);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_step_100k(c: &mut Criterion) {
    c.bench_function("step_100k", |b| {
        b.iter_batched_ref(
            || initialized(stress_profile(42)),
            |model| {
                let metrics = model.step(&Overrides::new()).unwrap();
                black_box(metrics);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_forced_step_10k(c: &mut Criterion) {
    let forcing = Overrides::new().with("net_heat_flux", -150.0).with("depth", 3.0);
    c.bench_function("forced_step_10k", |b| {
        b.iter_batched_ref(
            || initialized(reference_profile(42)),
            |model| {
                let metrics = model.step(&forcing).unwrap();
                black_box(metrics);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_100_steps_10k(c: &mut Criterion) {
    c.bench_function("100_steps_10k", |b| {
        b.iter(|| {
            let mut model = Model::new(reference_profile(42)).unwrap();
            model.initialize().unwrap();
            model.run(100).unwrap();
            black_box(model.dataset().unwrap().len_time());
        });
    });
}

criterion_group!(
    benches,
    bench_step_10k,
    bench_step_100k,
    bench_forced_step_10k,
    bench_100_steps_10k
);
criterion_main!(benches);
