//! # Control Loop Benchmarks
//!
//! Measures complete runs of the control loop over scripted frames:
//! sensor aggregation, policy decision, hysteresis and telemetry.
//!
//! Run: `cargo bench --bench loop_bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sinal_control::*;

fn frames(steps: usize) -> Vec<Frame> {
    let lanes: Vec<&str> = presets::INCOMING_LANES.to_vec();
    (0..steps)
        .map(|i| {
            let vehicles = (i % 9) as f64;
            Frame::uniform(&lanes, vehicles, vehicles / 2.0, (i % 40) as f64)
        })
        .collect()
}

/// Benchmark control ticks per policy
fn bench_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("control_loop");
    let script = frames(360);

    for kind in [PolicyKind::Sugeno, PolicyKind::Mamdani, PolicyKind::Linear, PolicyKind::Fixed] {
        let mut scenario = Scenario::for_policy(kind);
        scenario.control.active_window = None;

        group.bench_with_input(BenchmarkId::new("run_360", kind.as_str()), &script, |b, script| {
            b.iter(|| {
                let mut control = scenario.build_loop().unwrap();
                let sim = ScriptedSimulation::new(script.clone());
                black_box(control.run_on(sim, &mut NullSink))
            })
        });
    }

    group.finish();
}

/// Benchmark the synthetic simulation itself
fn bench_synthetic(c: &mut Criterion) {
    let lanes = presets::incoming_lanes();

    c.bench_function("synthetic_step_3600", |b| {
        b.iter(|| {
            let mut sim = SyntheticSimulation::new(&lanes, DemandProfile::default(), 3600).unwrap();
            for _ in 0..3600 {
                sim.step().unwrap();
            }
            black_box(sim.queued())
        })
    });
}

criterion_group!(benches, bench_loop, bench_synthetic);
criterion_main!(benches);
