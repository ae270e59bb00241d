//! # Inference Benchmarks
//!
//! Measures firing strengths, Sugeno weighted average and Mamdani
//! aggregation + defuzzification over the traffic rule bases.
//!
//! Run: `cargo bench --bench inference_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sinal_control::presets;
use sinal_fuzzy::prelude::*;

fn snapshot(vehicles: f64, waiting: f64) -> Snapshot {
    Snapshot::new()
        .with(presets::VEHICLES, vehicles)
        .with(presets::WAITING, waiting)
        .with(presets::PEAK, vehicles * 3.0)
}

/// Benchmark membership evaluation
fn bench_membership(c: &mut Criterion) {
    let mut group = c.benchmark_group("membership");
    let base = presets::sugeno_traffic().unwrap();
    let vehicles = base.antecedent(presets::VEHICLES).unwrap();

    group.bench_function("degree", |b| {
        b.iter(|| black_box(vehicles.degree("medium", black_box(17.5))))
    });

    group.bench_function("fuzzify", |b| {
        b.iter(|| black_box(vehicles.fuzzify(black_box(33.0))))
    });

    group.finish();
}

/// Benchmark Sugeno inference
fn bench_sugeno(c: &mut Criterion) {
    let mut group = c.benchmark_group("sugeno");
    let base = presets::sugeno_traffic().unwrap();
    let engine = SugenoEngine::default();

    for (vehicles, waiting) in [(5.0, 5.0), (25.0, 50.0), (37.0, 71.0)] {
        let input = snapshot(vehicles, waiting);
        group.bench_with_input(
            BenchmarkId::new("infer", format!("{}v_{}s", vehicles, waiting)),
            &input,
            |b, input| b.iter(|| black_box(engine.infer(&base, input))),
        );
    }

    group.bench_function("firing_strengths", |b| {
        let input = snapshot(25.0, 50.0);
        b.iter(|| black_box(base.firing_strengths(&input)))
    });

    group.finish();
}

/// Benchmark Mamdani inference per defuzzifier
fn bench_mamdani(c: &mut Criterion) {
    let mut group = c.benchmark_group("mamdani");
    let base = presets::mamdani_traffic().unwrap();
    let peak_base = presets::mamdani_peak_traffic().unwrap();
    let input = snapshot(30.0, 60.0);

    for defuzzifier in [
        Defuzzifier::Centroid,
        Defuzzifier::Bisector,
        Defuzzifier::MeanOfMaximum,
    ] {
        let engine = MamdaniEngine::new(defuzzifier);
        group.bench_with_input(BenchmarkId::new("infer", defuzzifier.name()), &input, |b, input| {
            b.iter(|| black_box(engine.infer(&base, input)))
        });
    }

    group.bench_function("infer_with_peak", |b| {
        let engine = MamdaniEngine::default();
        b.iter(|| black_box(engine.infer(&peak_base, &input)))
    });

    group.finish();
}

criterion_group!(benches, bench_membership, bench_sugeno, bench_mamdani);
criterion_main!(benches);
