//! Criterion micro-benchmarks for store writes, commits and fingerprints.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use limnos_core::{Role, Value, VariableMeta};
use limnos_grid::Rect2D;
use limnos_store::{GridStore, StoreVariable};

/// A 10K-cell store with one static, two dynamics and two states.
fn make_store_10k() -> GridStore {
    let grid = Rect2D::new(100, 100).unwrap();
    let vars = vec![
        StoreVariable::new(VariableMeta::named("k"), Role::Static),
        StoreVariable::new(VariableMeta::named("d1"), Role::Dynamic),
        StoreVariable::new(VariableMeta::named("d2"), Role::Dynamic),
        StoreVariable::new(VariableMeta::named("T"), Role::State),
        StoreVariable::new(VariableMeta::named("DO"), Role::State),
    ];
    let mut store = GridStore::new(&grid, vars, false).unwrap();
    store.bind_static("k", &Value::scalar(0.5)).unwrap();
    store.set_initial_state("T", &Value::scalar(20.0)).unwrap();
    store.set_initial_state("DO", &Value::scalar(8.0)).unwrap();
    store.record_initial(0.0);
    store
}

fn bench_write_commit_10k(c: &mut Criterion) {
    let field = Value::cells(vec![1.0; 10_000]);
    c.bench_function("write_commit_10k", |b| {
        b.iter_batched_ref(
            make_store_10k,
            |store| {
                for name in ["d1", "d2", "T", "DO"] {
                    store.write(name, &field).unwrap();
                }
                store.commit_step(1.0);
            },
            BatchSize::LargeInput,
        );
    });
}

fn bench_abandoned_step_10k(c: &mut Criterion) {
    let field = Value::cells(vec![1.0; 10_000]);
    let mut store = make_store_10k();
    c.bench_function("abandoned_step_10k", |b| {
        b.iter(|| {
            let mut txn = store.begin_step();
            txn.write("T", &field).unwrap();
            txn.write("DO", &field).unwrap();
        });
    });
    black_box(store.read("T").unwrap());
}

fn bench_fingerprint_100_slices(c: &mut Criterion) {
    let mut store = make_store_10k();
    let field = Value::scalar(21.0);
    for i in 0..100 {
        store.write("T", &field).unwrap();
        store.write("DO", &field).unwrap();
        store.commit_step(f64::from(i + 1));
    }
    c.bench_function("fingerprint_100_slices", |b| {
        b.iter(|| black_box(store.snapshot().fingerprint()));
    });
}

criterion_group!(
    benches,
    bench_write_commit_10k,
    bench_abandoned_step_10k,
    bench_fingerprint_100_slices
);
criterion_main!(benches);
