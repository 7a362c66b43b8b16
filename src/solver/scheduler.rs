//! Phase scheduler
//!
//! Runs a [`Scenario`] phase by phase:
//!
//! ```text
//! state ← initial, (k1, k2) ← base
//! for i in 0..N:
//!     integrate over [i·L, (i+1)·L] with (k1, k2)
//!     if i < N-1: (state, k1, k2) ← boundary_i(last sample, k1, k2)
//! ```
//!
//! Each phase starts from the perturbed final state of the previous one and
//! carries its rate constants forward; only a temperature boundary changes
//! them. The scheduler is pure: identical inputs give bit-identical runs.

use log::{debug, info, warn};
use ndarray::Array2;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{NegativeConcentrationPolicy, SimulationConfig};
use crate::error::{Result, SimulationError};
use crate::models::{RateConstants, ReactionSpec, ReversibleReaction};
use crate::physics::{ConcentrationState, Species};
use crate::solver::boundary::BoundaryRecord;
use crate::solver::scenario::Scenario;
use crate::solver::trajectory::Trajectory;
use crate::solver::traits::{Integrator, TimeSpan};

// =================================================================================================
// Phase and run records
// =================================================================================================

/// One integrated phase
#[derive(Debug, Clone, PartialEq)]
pub struct Phase {
    pub index: usize,
    pub span: TimeSpan,

    /// State after the previous boundary (or the run's initial state)
    pub initial_state: ConcentrationState,

    /// Rate constants active during the phase
    pub constants: RateConstants,

    pub trajectory: Trajectory,
}

impl Phase {
    pub fn final_state(&self) -> ConcentrationState {
        self.trajectory.final_state()
    }
}

/// A finished run: every phase and every boundary, in order
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    reaction: ReactionSpec,
    solver: String,
    phases: Vec<Phase>,
    boundaries: Vec<BoundaryRecord>,
}

impl SimulationRun {
    pub fn reaction(&self) -> &ReactionSpec {
        &self.reaction
    }

    /// Name of the integrator that produced the run
    pub fn solver_name(&self) -> &str {
        &self.solver
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn phase(&self, index: usize) -> Option<&Phase> {
        self.phases.get(index)
    }

    pub fn phase_count(&self) -> usize {
        self.phases.len()
    }

    pub fn boundaries(&self) -> &[BoundaryRecord] {
        &self.boundaries
    }

    pub fn boundary(&self, index: usize) -> Option<&BoundaryRecord> {
        self.boundaries.get(index)
    }

    /// Last sample of every phase
    pub fn final_states(&self) -> Vec<ConcentrationState> {
        self.phases.iter().map(Phase::final_state).collect()
    }

    /// Last sample of the last phase
    pub fn final_state(&self) -> Option<ConcentrationState> {
        self.phases.last().map(Phase::final_state)
    }

    /// Rate constants of every phase
    pub fn rate_constant_history(&self) -> Vec<RateConstants> {
        self.phases.iter().map(|p| p.constants).collect()
    }

    /// Total number of samples over all phases
    pub fn sample_count(&self) -> usize {
        self.phases.iter().map(|p| p.trajectory.len()).sum()
    }

    /// Time points of all phases, concatenated
    ///
    /// Boundary times appear twice: once as the last sample of a phase and
    /// once as the first sample of the next one.
    pub fn time_points(&self) -> Vec<f64> {
        self.phases
            .iter()
            .flat_map(|p| p.trajectory.time_points().iter().copied())
            .collect()
    }

    /// Concentrations of one species over the whole run
    pub fn species_series(&self, species: Species) -> Vec<f64> {
        self.phases
            .iter()
            .flat_map(|p| p.trajectory.states().iter().map(move |s| s.get(species)))
            .collect()
    }

    /// Concentrations of all phases as a (samples × 4) array
    pub fn concentration_array(&self) -> Array2<f64> {
        let mut array = Array2::zeros((self.sample_count(), 4));
        let states = self.phases.iter().flat_map(|p| p.trajectory.states().iter());
        for (mut row, state) in array.rows_mut().into_iter().zip(states) {
            for species in Species::ALL {
                row[species.index()] = state.get(species);
            }
        }
        array
    }

    /// True when every sample of every phase is finite
    pub fn is_finite(&self) -> bool {
        self.phases.iter().all(|p| p.trajectory.is_finite())
    }
}

// =================================================================================================
// Scheduler
// =================================================================================================

/// Drives the phase integrator across the boundaries of a scenario
///
/// # Examples
///
/// ```rust
/// use equil_rs::config::SimulationConfig;
/// use equil_rs::models::ReactionSpec;
/// use equil_rs::solver::{Perturbation, PhaseScheduler, RunSchedule, Scenario};
///
/// let haber = ReactionSpec::new(1, 3, 2, 0, -92.0).unwrap();
/// let scenario = Scenario::new(
///     haber,
///     RunSchedule::new(vec![Perturbation::Temperature { effect: 0.2 }]),
/// );
///
/// let config = SimulationConfig::default().with_samples_per_phase(100);
/// let scheduler = PhaseScheduler::new(config).unwrap();
/// let run = scheduler.run(&scenario).unwrap();
///
/// assert_eq!(run.phase_count(), 2);
/// assert_eq!(run.rate_constant_history()[1].k2, 0.012);
/// ```
pub struct PhaseScheduler {
    config: SimulationConfig,
    integrator: Box<dyn Integrator>,
}

impl PhaseScheduler {
    /// Validate the settings and build the configured integrator
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let integrator = config.solver.build()?;
        Ok(Self { config, integrator })
    }

    /// Use a custom integrator instead of `config.solver`
    pub fn with_integrator(config: SimulationConfig, integrator: Box<dyn Integrator>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, integrator })
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn integrator_name(&self) -> &str {
        self.integrator.name()
    }

    /// Simulate every phase of `scenario`
    ///
    /// # Errors
    ///
    /// - `Configuration` for invalid boundary events, before any integration
    /// - `NegativeConcentration` when a boundary drives a species below zero
    ///   under the `Reject` policy
    /// - `NumericalDivergence` from the integrator
    pub fn run(&self, scenario: &Scenario) -> Result<SimulationRun> {
        scenario.validate()?;

        let reaction = scenario.reaction;
        let base = self.config.base_constants;
        let phase_count = scenario.phase_count();

        let mut state = self.config.initial_state;
        let mut constants = base;
        let mut phases = Vec::with_capacity(phase_count);
        let mut boundaries = Vec::with_capacity(phase_count - 1);

        for index in 0..phase_count {
            let span = TimeSpan::phase(index, self.config.phase_length);
            debug!(
                "phase {index}: t = [{}, {}], {constants}, initial {state}",
                span.start, span.end
            );

            let model = ReversibleReaction::new(reaction, constants);
            let trajectory =
                self.integrator
                    .integrate(&model, &state, span, self.config.samples_per_phase)?;
            let final_state = trajectory.final_state();

            phases.push(Phase {
                index,
                span,
                initial_state: state,
                constants,
                trajectory,
            });

            let Some(event) = scenario.schedule.event(index) else {
                break;
            };

            let (perturbed, next_constants) = event.apply(&reaction, base, constants, &final_state);
            let (post_state, clamped) = self.enforce_policy(index, perturbed)?;

            debug!("boundary {index} at t = {}: {event}, {final_state} -> {post_state}", span.end);

            boundaries.push(BoundaryRecord {
                index,
                time: span.end,
                event: *event,
                pre_state: final_state,
                post_state,
                constants_before: constants,
                constants_after: next_constants,
                clamped,
            });

            state = post_state;
            constants = next_constants;
        }

        info!(
            "simulated {} phases of {reaction} with {}",
            phases.len(),
            self.integrator.name()
        );

        Ok(SimulationRun {
            reaction,
            solver: self.integrator.name().to_string(),
            phases,
            boundaries,
        })
    }

    /// Simulate independent scenarios
    ///
    /// Results come back in input order, each identical to a standalone
    /// [`run`](Self::run). Uses rayon when the `parallel` feature is on.
    pub fn run_batch(&self, scenarios: &[Scenario]) -> Vec<Result<SimulationRun>> {
        #[cfg(feature = "parallel")]
        {
            scenarios.par_iter().map(|s| self.run(s)).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            scenarios.iter().map(|s| self.run(s)).collect()
        }
    }

    fn enforce_policy(
        &self,
        boundary: usize,
        state: ConcentrationState,
    ) -> Result<(ConcentrationState, bool)> {
        let Some((species, value)) = state.first_negative() else {
            return Ok((state, false));
        };

        match self.config.negative_policy {
            NegativeConcentrationPolicy::Reject => Err(SimulationError::NegativeConcentration {
                boundary,
                species,
                value,
            }),
            NegativeConcentrationPolicy::Clamp => {
                warn!("boundary {boundary}: [{species}] = {value} clamped to zero");
                Ok((state.clamp_non_negative(), true))
            }
        }
    }
}

impl std::fmt::Debug for PhaseScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhaseScheduler")
            .field("integrator", &self.integrator.name())
            .field("config", &self.config)
            .finish()
    }
}

/// Run one scenario with the given settings
pub fn simulate(scenario: &Scenario, config: SimulationConfig) -> Result<SimulationRun> {
    PhaseScheduler::new(config)?.run(scenario)
}

// =================================================================================================
// Tests
// =================================================================================================
