//! Phase integration and scheduling
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! 1. **Scenario** (`Scenario`) - WHAT to simulate
//!    - Reaction (stoichiometry and ΔH)
//!    - Run schedule (one perturbation per boundary)
//!
//! 2. **Configuration** (`SimulationConfig`, `SolverType`) - HOW to simulate
//!    - Base rate constants and initial state
//!    - Phase length and samples per phase
//!    - Numerical method and its parameters
//!
//! 3. **Integrator** (`Integrator` trait) - The numerical method
//!    - Advances one phase, returns a sampled trajectory
//!    - Independent of the reaction and of the schedule
//!
//! 4. **Scheduler** (`PhaseScheduler`) - Chains the phases
//!    - Applies perturbations at boundaries
//!    - Enforces the negative-concentration policy
//!    - Records everything in a `SimulationRun`
//!
//! # Module Organization
//!
//! - **`traits`**: `Integrator`, `SolverType`, `TimeSpan`
//! - **`trajectory`**: sampled solution of one phase
//! - **`methods`**: `DormandPrinceSolver` (adaptive, default), `RK4Solver`
//! - **`boundary`**: `Perturbation`, `BoundaryKind`, `BoundaryRecord`
//! - **`scenario`**: `Scenario`, `RunSchedule`, tagged JSON form
//! - **`scheduler`**: `PhaseScheduler`, `SimulationRun`, `Phase`
//!
//! # Quick Start Example
//!
//! ```rust
//! use equil_rs::config::SimulationConfig;
//! use equil_rs::models::ReactionSpec;
//! use equil_rs::physics::Species;
//! use equil_rs::solver::{simulate, Perturbation, RunSchedule, Scenario};
//!
//! // 1. Scenario (WHAT to simulate)
//! let haber = ReactionSpec::new(1, 3, 2, 0, -92.0).unwrap();
//! let schedule = RunSchedule::new(vec![
//!     Perturbation::Temperature { effect: 0.2 },
//!     Perturbation::VolumePressure { effect: -0.2 },
//!     Perturbation::addition_of(Species::A, 0.5),
//! ]);
//! let scenario = Scenario::new(haber, schedule);
//!
//! // 2. Configuration (HOW to simulate)
//! let config = SimulationConfig::default().with_samples_per_phase(200);
//!
//! // 3. Run
//! let run = simulate(&scenario, config).unwrap();
//! assert_eq!(run.phase_count(), 4);
//! assert_eq!(run.concentration_array().nrows(), 4 * 200);
//! ```
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌──────────────┐   ┌──────────────────┐
//! │ Scenario     │   │ SimulationConfig │
//! │ (reaction +  │   │ (constants, grid,│
//! │  schedule)   │   │  policy, solver) │
//! └──────┬───────┘   └────────┬─────────┘
//!        │                    │
//!        └─────────┬──────────┘
//!                  │
//!         ┌────────▼────────┐
//!         │ PhaseScheduler  │──── per phase ───► Integrator
//!         │                 │◄─── Trajectory ───
//!         │                 │──── per boundary ─► Perturbation
//!         └────────┬────────┘
//!                  │
//!         ┌────────▼────────┐
//!         │ SimulationRun   │ ← phases, boundary records
//!         └─────────────────┘
//! ```
//!
//! # Error Handling
//!
//! Everything returns [`crate::error::Result`]:
//!
//! - `Configuration`: invalid settings or events, raised before integration
//! - `NegativeConcentration`: a boundary drove a species below zero
//! - `NumericalDivergence`: the integrator could not produce finite values

use crate::error::{Result, SimulationError};
use crate::physics::{ConcentrationState, Species};

// =================================================================================================
// Module Declarations
// =================================================================================================

mod boundary;
pub mod methods;
mod scenario;
mod scheduler;
mod traits;
mod trajectory;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use boundary::{
    BoundaryKind, BoundaryRecord, Perturbation, CONCENTRATION_NOMINAL_RANGE,
    TEMPERATURE_NOMINAL_RANGE,
};
pub use methods::{DormandPrinceSolver, RK4Solver};
pub use scenario::{BoundaryEffects, RunSchedule, Scenario, TaggedScenario};
pub use scheduler::{simulate, Phase, PhaseScheduler, SimulationRun};
pub use traits::{
    Integrator, SolverType, TimeSpan, DEFAULT_MAX_STEPS, DEFAULT_SUBSTEPS, DEFAULT_TOLERANCE,
};
pub use trajectory::Trajectory;

// =================================================================================================
// Internal helpers
// =================================================================================================

/// Check that a state is finite
///
/// Called by the integrators after every sample, so that divergence is
/// reported at the time it happens instead of surfacing as NaN in the
/// output.
///
/// # Arguments
///
/// * `state` - State to validate
/// * `time` - Current time (for error reporting)
pub(crate) fn validate_state(state: &ConcentrationState, time: f64) -> Result<()> {
    for species in Species::ALL {
        let value = state.get(species);

        if value.is_nan() {
            return Err(SimulationError::divergence(
                time,
                format!("NaN detected in [{species}]; the step size or tolerance is too loose"),
            ));
        }

        if value.is_infinite() {
            return Err(SimulationError::divergence(
                time,
                format!("infinity detected in [{species}]; the concentrations overflowed"),
            ));
        }
    }

    Ok(())
}

// =================================================================================================
// Tests
// =================================================================================================
