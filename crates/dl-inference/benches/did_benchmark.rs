use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dl_inference::{SimulationConfig, estimate_did, placebo_test, simulate};
use std::hint::black_box;

fn bench_simulate(c: &mut Criterion) {
    let mut group = c.benchmark_group("simulate");
    for n_units in [200usize, 2_000, 20_000] {
        let cfg = SimulationConfig { n_units, ..SimulationConfig::default() };
        group.bench_with_input(BenchmarkId::from_parameter(n_units), &cfg, |b, cfg| {
            b.iter(|| black_box(simulate(black_box(cfg), 42)).unwrap())
        });
    }
    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("estimate");
    for n_units in [200usize, 2_000, 20_000] {
        let cfg = SimulationConfig { n_units, ..SimulationConfig::default() };
        let panel = simulate(&cfg, 42).unwrap();
        group.bench_with_input(BenchmarkId::new("did_hc2", n_units), &panel, |b, panel| {
            b.iter(|| black_box(estimate_did(black_box(panel))).unwrap())
        });
        group.bench_with_input(BenchmarkId::new("placebo_hc2", n_units), &panel, |b, panel| {
            b.iter(|| black_box(placebo_test(black_box(panel))).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_simulate, bench_estimate);
criterion_main!(benches);
