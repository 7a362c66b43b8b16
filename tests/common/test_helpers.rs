//! Helper functions for integration tests

use equil_rs::config::SimulationConfig;
use equil_rs::models::{catalog, ReactionSpec};
use equil_rs::physics::{ConcentrationState, Species};
use equil_rs::solver::{Perturbation, RunSchedule, Scenario};

/// Assert that two states are close (within tolerance)
pub fn assert_states_close(
    state1: &ConcentrationState,
    state2: &ConcentrationState,
    tolerance: f64,
    message: &str,
) {
    for species in Species::ALL {
        let diff = (state1.get(species) - state2.get(species)).abs();
        assert!(
            diff < tolerance,
            "{}: [{}] differs by {} (tolerance {})",
            message,
            species,
            diff,
            tolerance
        );
    }
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}

/// The Haber process from the catalog
pub fn haber() -> ReactionSpec {
    catalog::haber_process().expect("Haber preset").spec
}

/// Reference settings with a lighter sample grid
pub fn quick_config() -> SimulationConfig {
    SimulationConfig::default().with_samples_per_phase(200)
}

pub fn scenario_with(reaction: ReactionSpec, events: Vec<Perturbation>) -> Scenario {
    Scenario::new(reaction, RunSchedule::new(events))
}
