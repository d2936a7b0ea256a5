//! Simulation benchmarks.
//!
//! Run with: cargo bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use double_pendulum::engine::integrator::{advance_one_step, angular_accelerations};
use double_pendulum::prelude::*;

/// Cost of evaluating both accelerations once.
fn bench_accelerations(c: &mut Criterion) {
    let params = PhysicalParameters::default();
    let state = DynamicState::new(2.1, 2.0, 2.0, 2.0);

    c.bench_function("angular_accelerations", |b| {
        b.iter(|| angular_accelerations(black_box(&state), black_box(&params)));
    });
}

/// Single step, both schemes.
fn bench_single_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_step");
    group.sample_size(100);
    group.confidence_level(0.95);

    let params = PhysicalParameters::default();
    let state = DynamicState::new(2.1, 2.0, 2.0, 2.0);
    let dt = 0.02 / 32.0;

    group.bench_function("free_function", |b| {
        b.iter(|| advance_one_step(black_box(&state), black_box(&params), black_box(dt)));
    });

    for integrator in [IntegratorType::SymplecticEuler, IntegratorType::ExplicitEuler] {
        let stepper = integrator.build();
        group.bench_function(stepper.name(), |b| {
            b.iter(|| stepper.step(black_box(&state), black_box(&params), black_box(dt)));
        });
    }

    group.finish();
}

/// Whole frames, including time-series bookkeeping.
fn bench_frames(c: &mut Criterion) {
    let mut group = c.benchmark_group("frames");

    for steps in [16usize, 32, 128] {
        group.bench_with_input(BenchmarkId::new("advance_frame", steps), &steps, |b, &steps| {
            let config = SimConfig::builder().steps_per_frame(steps).build();
            b.iter_batched(
                || PendulumSim::new(config.clone()).unwrap(),
                |mut sim| {
                    for _ in 0..10 {
                        sim.advance_frame();
                    }
                    black_box(sim.step_count())
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Coordinate extraction from a long history.
fn bench_coordinate_series(c: &mut Criterion) {
    let mut sim = PendulumSim::new(SimConfig::default()).unwrap();
    for _ in 0..100 {
        sim.advance_frame();
    }

    c.bench_function("coordinate_series_3200", |b| {
        b.iter(|| black_box(sim.coordinate_series(Bob::Lower, Axis::X)));
    });
}

criterion_group!(
    benches,
    bench_accelerations,
    bench_single_step,
    bench_frames,
    bench_coordinate_series
);
criterion_main!(benches);
