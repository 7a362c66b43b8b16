//! equil-rs: Le Chatelier phase simulator
//!
//! Simulates a reversible reaction aA + bB <-> cC + dD through a sequence of
//! phases. Between two phases the system is disturbed (temperature, volume,
//! addition or removal of a species) and the next phase integrates the
//! rate equations from the disturbed state, showing how the equilibrium
//! shifts.
//!
//! # Architecture
//!
//! equil-rs is built on two core principles:
//!
//! 1. **Separation of Chemistry and Numerics**
//!    - Kinetic models define the rate law (what to integrate)
//!    - Integrators provide the method (how to integrate)
//!
//! 2. **Explicit, validated inputs**
//!    - Reactions, schedules and settings are checked before any work
//!    - Every failure is a typed [`SimulationError`](error::SimulationError)
//!
//! # Quick Start
//!
//! ```rust
//! use equil_rs::prelude::*;
//!
//! # fn main() -> equil_rs::error::Result<()> {
//! // 1. Reaction and schedule
//! let haber = catalog::haber_process()?;
//! let scenario = Scenario::new(
//!     haber.spec,
//!     RunSchedule::new(vec![
//!         Perturbation::Temperature { effect: 0.2 },
//!         Perturbation::VolumePressure { effect: -0.2 },
//!         Perturbation::addition_of(Species::A, 0.5),
//!     ]),
//! );
//!
//! // 2. Settings
//! let config = SimulationConfig::default().with_samples_per_phase(100);
//!
//! // 3. Run
//! let run = PhaseScheduler::new(config)?.run(&scenario)?;
//!
//! // 4. Results
//! assert_eq!(run.phase_count(), 4);
//! assert_eq!(run.rate_constant_history()[1].k2, 0.012);
//!
//! let key = AnswerKey::from_run(&run, Some(&haber.reagents));
//! assert_eq!(key.answer(3).unwrap().label, "Addition of N₂");
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`physics`]: species, concentration state, kinetic model trait
//! - [`models`]: the reversible reaction and the reaction catalog
//! - [`solver`]: integrators, perturbations, scenario and phase scheduler
//! - [`output`]: CSV export and quiz answer key
//! - [`config`]: simulation settings
//! - [`error`]: error type

pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod physics;
pub mod solver;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use equil_rs::prelude::*;
    //! ```
    pub use crate::config::{NegativeConcentrationPolicy, SimulationConfig};
    pub use crate::error::SimulationError;
    pub use crate::models::{
        catalog, RateConstants, ReactionPreset, ReactionSpec, ReagentNames, ReversibleReaction,
    };
    pub use crate::output::{AnswerKey, CsvConfig, CsvExporter, Exporter};
    pub use crate::physics::{ConcentrationState, KineticModel, Species};
    pub use crate::solver::{
        simulate, DormandPrinceSolver, Integrator, Perturbation, PhaseScheduler, RK4Solver,
        RunSchedule, Scenario, SimulationRun, SolverType,
    };
}
