//! Integration tests: integrator accuracy against exact solutions

use approx::assert_relative_eq;

use equil_rs::models::{RateConstants, ReversibleReaction};
use equil_rs::physics::{ConcentrationState, Species};
use equil_rs::solver::{DormandPrinceSolver, Integrator, RK4Solver, SolverType, TimeSpan};

mod common;
use common::{assert_states_close, haber, relative_error, FirstOrderIsomerization};

fn isomerization() -> (ReversibleReaction, FirstOrderIsomerization) {
    let constants = RateConstants::REFERENCE;
    (
        ReversibleReaction::new(FirstOrderIsomerization::spec(), constants),
        FirstOrderIsomerization::new(constants),
    )
}

fn reference_start() -> ConcentrationState {
    ConcentrationState::new(1.0, 1.0, 0.0, 0.0)
}

// =================================================================================================
// Isomerization: A <-> C
// =================================================================================================

#[test]
fn test_dopri_matches_isomerization() {
    let (model, exact) = isomerization();
    let span = TimeSpan::new(0.0, 200.0);

    let trajectory = DormandPrinceSolver::default()
        .integrate(&model, &reference_start(), span, 1000)
        .unwrap();

    // A(200) = 1/3 + 2/3 · e^-6
    let expected = 1.0 / 3.0 + 2.0 / 3.0 * (-6.0_f64).exp();
    assert_relative_eq!(exact.analytical_a(200.0, 1.0, 0.0), expected, epsilon = 1e-15);

    for (t, state) in trajectory.samples().step_by(50) {
        let a = exact.analytical_a(t, 1.0, 0.0);
        assert!(
            relative_error(state.get(Species::A), a) < 1e-6,
            "A({t}) = {} vs {a}",
            state.get(Species::A)
        );
        // A + C conserved
        assert_relative_eq!(state.get(Species::A) + state.get(Species::C), 1.0, epsilon = 1e-10);
    }

    assert!(relative_error(trajectory.final_state().get(Species::A), expected) < 1e-6);
}

#[test]
fn test_rk4_matches_isomerization() {
    let (model, exact) = isomerization();
    let span = TimeSpan::new(0.0, 200.0);

    let trajectory = RK4Solver::default()
        .integrate(&model, &reference_start(), span, 1000)
        .unwrap();

    let final_a = trajectory.final_state().get(Species::A);
    assert!(relative_error(final_a, exact.analytical_a(200.0, 1.0, 0.0)) < 1e-8);
}

#[test]
fn test_non_participating_species_untouched() {
    let (model, _) = isomerization();
    let start = ConcentrationState::new(0.7, 0.4, 0.1, 0.25);

    for integrator in [
        Box::new(DormandPrinceSolver::default()) as Box<dyn Integrator>,
        Box::new(RK4Solver::default()),
    ] {
        let trajectory = integrator
            .integrate(&model, &start, TimeSpan::new(0.0, 200.0), 101)
            .unwrap();
        for state in trajectory.states() {
            assert_eq!(state.get(Species::B), 0.4, "{}", integrator.name());
            assert_eq!(state.get(Species::D), 0.25, "{}", integrator.name());
        }
    }
}

#[test]
fn test_rk4_fourth_order_convergence() {
    let (model, exact) = isomerization();
    let span = TimeSpan::new(0.0, 200.0);
    let expected = exact.analytical_a(200.0, 1.0, 0.0);

    // 21 samples: h = 10 with one substep, 5 with two
    let coarse = RK4Solver::new(1)
        .integrate(&model, &reference_start(), span, 21)
        .unwrap();
    let fine = RK4Solver::new(2)
        .integrate(&model, &reference_start(), span, 21)
        .unwrap();

    let coarse_error = (coarse.final_state().get(Species::A) - expected).abs();
    let fine_error = (fine.final_state().get(Species::A) - expected).abs();
    let ratio = coarse_error / fine_error;

    assert!(
        ratio > 12.0 && ratio < 20.0,
        "error ratio {ratio} is not consistent with fourth order"
    );
}

#[test]
fn test_tighter_tolerance_costs_more_steps() {
    let (model, exact) = isomerization();
    let span = TimeSpan::new(0.0, 200.0);
    let expected = exact.analytical_a(200.0, 1.0, 0.0);

    let loose = DormandPrinceSolver::new(1e-4, 1e-4, 10_000)
        .integrate(&model, &reference_start(), span, 11)
        .unwrap();
    let tight = DormandPrinceSolver::new(1e-11, 1e-11, 100_000)
        .integrate(&model, &reference_start(), span, 11)
        .unwrap();

    let steps = |t: &equil_rs::solver::Trajectory| -> usize {
        t.metadata()["accepted steps"].parse().unwrap()
    };
    assert!(steps(&tight) > steps(&loose));

    let tight_error = relative_error(tight.final_state().get(Species::A), expected);
    assert!(tight_error < 1e-9, "tight error {tight_error}");
}

// =================================================================================================
// Sampling
// =================================================================================================

#[test]
fn test_samples_land_on_grid() {
    let model = ReversibleReaction::new(haber(), RateConstants::REFERENCE);
    let span = TimeSpan::new(400.0, 600.0);
    let grid = span.linspace(1000);

    for solver in [SolverType::default(), SolverType::FixedStep { substeps: 4 }] {
        let integrator = solver.build().unwrap();
        let trajectory = integrator
            .integrate(&model, &reference_start(), span, 1000)
            .unwrap();

        assert_eq!(trajectory.time_points(), grid.as_slice());
        assert_eq!(trajectory.start_time(), 400.0);
        assert_eq!(trajectory.end_time(), 600.0);
        assert_eq!(trajectory.initial_state(), reference_start());
    }
}

#[test]
fn test_solvers_agree_on_haber() {
    let model = ReversibleReaction::new(haber(), RateConstants::REFERENCE);
    let span = TimeSpan::new(0.0, 200.0);

    let adaptive = DormandPrinceSolver::default()
        .integrate(&model, &reference_start(), span, 1000)
        .unwrap();
    let fixed = RK4Solver::default()
        .integrate(&model, &reference_start(), span, 1000)
        .unwrap();

    for (a, f) in adaptive.states().iter().zip(fixed.states()).step_by(100) {
        assert_states_close(a, f, 1e-6, "adaptive vs fixed step");
    }

    // Forward reaction dominates from a product-free start
    let end = adaptive.final_state();
    assert!(end.get(Species::A) < 1.0);
    assert!(end.get(Species::C) > 0.0);
    assert_eq!(end.get(Species::D), 0.0);
}
