//! Performance benchmarks for the phase scheduler
//!
//! Compares the adaptive Dormand-Prince integrator with fixed-step RK4 on
//! the same multi-phase runs, and measures how a run scales with the
//! sample grid and the number of boundaries.
//!
//! # What We're Measuring
//!
//! 1. **Integrators** on one Haber phase:
//!    - Dormand-Prince 5(4): 6 evaluations per accepted step, step size
//!      chosen by the error estimate and cut at every sample time
//!    - RK4: 4 evaluations per substep, fixed substeps between samples
//!
//! 2. **Sample grid**: the adaptive integrator truncates its steps at every
//!    sample, so denser grids cost more steps even when the error allows
//!    large ones
//!
//! 3. **Boundaries**: time should grow linearly with the number of phases
//!
//! 4. **Batch**: the six catalog reactions, sequential vs `run_batch`
//!
//! # Running Benchmarks
//!
//! ```bash
//! # Run all scheduler benchmarks
//! cargo bench --bench scheduler_performance
//!
//! # Only the integrator comparison
//! cargo bench --bench scheduler_performance integrators
//!
//! # Without rayon
//! cargo bench --bench scheduler_performance --no-default-features
//! ```

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use equil_rs::config::SimulationConfig;
use equil_rs::models::{catalog, RateConstants, ReactionSpec, ReversibleReaction};
use equil_rs::physics::{ConcentrationState, Species};
use equil_rs::solver::{
    DormandPrinceSolver, Integrator, Perturbation, PhaseScheduler, RK4Solver, RunSchedule,
    Scenario, SolverType, TimeSpan,
};

// =================================================================================================
// Setup
// =================================================================================================

fn haber() -> ReactionSpec {
    ReactionSpec::new(1, 3, 2, 0, -92.0).unwrap()
}

/// Boundaries cycling through the three kinds
fn cycling_events(count: usize) -> Vec<Perturbation> {
    (0..count)
        .map(|i| match i % 3 {
            0 => Perturbation::Temperature { effect: 0.2 },
            1 => Perturbation::VolumePressure { effect: -0.2 },
            _ => Perturbation::addition_of(Species::A, 0.5),
        })
        .collect()
}

// =================================================================================================
// Benchmark Functions
// =================================================================================================

/// One phase, reference grid, both integrators
fn benchmark_integrators(c: &mut Criterion) {
    let mut group = c.benchmark_group("integrators");

    let model = ReversibleReaction::new(haber(), RateConstants::REFERENCE);
    let initial = ConcentrationState::new(1.0, 1.0, 0.0, 0.0);
    let span = TimeSpan::new(0.0, 200.0);

    let solvers: Vec<(&str, Box<dyn Integrator>)> = vec![
        ("Dormand-Prince 5(4)", Box::new(DormandPrinceSolver::default())),
        ("RK4, 1 substep", Box::new(RK4Solver::new(1))),
        ("RK4, 4 substeps", Box::new(RK4Solver::default())),
    ];

    group.throughput(Throughput::Elements(1000));
    for (label, solver) in &solvers {
        group.bench_function(*label, |b| {
            b.iter(|| {
                solver
                    .integrate(black_box(&model), black_box(&initial), span, 1000)
                    .unwrap()
            });
        });
    }

    group.finish();
}

/// Adaptive integrator on a growing sample grid
fn benchmark_sample_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("sample grid");

    let scenario = Scenario::new(haber(), RunSchedule::new(cycling_events(3)));

    for samples in [100, 1000, 5000] {
        let config = SimulationConfig::default().with_samples_per_phase(samples);
        let scheduler = PhaseScheduler::new(config).unwrap();

        group.throughput(Throughput::Elements((samples * 4) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(samples), &samples, |b, _| {
            b.iter(|| scheduler.run(black_box(&scenario)).unwrap());
        });
    }

    group.finish();
}

/// Run time against the number of boundaries
fn benchmark_boundaries(c: &mut Criterion) {
    let mut group = c.benchmark_group("boundaries");

    for solver in [SolverType::default(), SolverType::FixedStep { substeps: 4 }] {
        let name = solver.name().to_string();
        let config = SimulationConfig::default()
            .with_samples_per_phase(200)
            .with_solver(solver);
        let scheduler = PhaseScheduler::new(config).unwrap();

        for count in [1, 3, 9] {
            let scenario = Scenario::new(haber(), RunSchedule::new(cycling_events(count)));
            group.bench_with_input(
                BenchmarkId::new(name.as_str(), count),
                &scenario,
                |b, scenario| {
                    b.iter(|| scheduler.run(black_box(scenario)).unwrap());
                },
            );
        }
    }

    group.finish();
}

/// The catalog reactions, one after the other or through `run_batch`
fn benchmark_batch(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch");

    let scenarios: Vec<Scenario> = catalog::presets()
        .into_iter()
        .map(|preset| Scenario::new(preset.spec, RunSchedule::new(cycling_events(3))))
        .collect();
    let scheduler =
        PhaseScheduler::new(SimulationConfig::default().with_samples_per_phase(500)).unwrap();

    group.bench_function("sequential", |b| {
        b.iter(|| {
            scenarios
                .iter()
                .map(|s| scheduler.run(black_box(s)).unwrap())
                .collect::<Vec<_>>()
        });
    });

    group.bench_function("run_batch", |b| {
        b.iter(|| scheduler.run_batch(black_box(&scenarios)));
    });

    group.finish();
}

// =================================================================================================
// Criterion Configuration
// =================================================================================================

criterion_group!(
    benches,
    benchmark_integrators,
    benchmark_sample_grid,
    benchmark_boundaries,
    benchmark_batch,
);
criterion_main!(benches);
