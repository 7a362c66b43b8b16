//! Runge-Kutta 4 (RK4) fixed-step integrator
//!
//! # Mathematical Background
//!
//! The classical fourth-order Runge-Kutta method uses a weighted average of
//! four slope estimates:
//!
//! ```text
//! k₁ = f(yₙ)
//! k₂ = f(yₙ + h/2 · k₁)
//! k₃ = f(yₙ + h/2 · k₂)
//! k₄ = f(yₙ + h · k₃)
//!
//! yₙ₊₁ = yₙ + h/6 · (k₁ + 2k₂ + 2k₃ + k₄)
//! ```
//!
//! The kinetic systems integrated here are autonomous, so the stages do not
//! depend on t.
//!
//! # Sampling
//!
//! The integrator walks the sample grid of the requested span and takes
//! `substeps` equal RK4 steps between two consecutive samples. Accuracy is
//! therefore controlled by `substeps` and by the sample spacing together:
//!
//! | Phase length | Samples | Substeps | h      | Global error |
//! |--------------|---------|----------|--------|--------------|
//! | 200          | 1000    | 1        | ≈ 0.2  | ~ 1e-8       |
//! | 200          | 1000    | 4        | ≈ 0.05 | ~ 1e-11      |
//!
//! # When to Use
//!
//! - Reproducing a run bit-for-bit with a fixed amount of work
//! - Benchmarks and convergence studies
//!
//! The adaptive [`DormandPrinceSolver`](super::DormandPrinceSolver) is the
//! default for production runs.

use crate::error::Result;
use crate::physics::{ConcentrationState, KineticModel};
use crate::solver::trajectory::Trajectory;
use crate::solver::traits::{validate_request, Integrator, TimeSpan, DEFAULT_SUBSTEPS};
use crate::solver::validate_state;

// =================================================================================================
// RK4 Solver
// =================================================================================================

/// Classical fourth-order Runge-Kutta integrator
///
/// # Example
///
/// ```rust
/// use equil_rs::models::{RateConstants, ReactionSpec, ReversibleReaction};
/// use equil_rs::physics::ConcentrationState;
/// use equil_rs::solver::{Integrator, RK4Solver, TimeSpan};
///
/// let spec = ReactionSpec::new(1, 3, 2, 0, -92.0).unwrap();
/// let model = ReversibleReaction::new(spec, RateConstants::REFERENCE);
///
/// let solver = RK4Solver::new(4);
/// let initial = ConcentrationState::new(1.0, 1.0, 0.0, 0.0);
/// let trajectory = solver
///     .integrate(&model, &initial, TimeSpan::new(0.0, 200.0), 1000)
///     .unwrap();
///
/// assert_eq!(trajectory.len(), 1000);
/// assert_eq!(trajectory.metadata()["function evaluations"], "15984");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RK4Solver {
    substeps: usize,
}

impl RK4Solver {
    /// Create a new RK4 solver taking `substeps` steps between samples
    ///
    /// A value of 0 is raised to 1.
    pub fn new(substeps: usize) -> Self {
        Self {
            substeps: substeps.max(1),
        }
    }

    pub fn substeps(&self) -> usize {
        self.substeps
    }

    /// One RK4 step of size `h`
    fn step(model: &dyn KineticModel, state: &ConcentrationState, h: f64) -> ConcentrationState {
        // Stage 1: slope at the beginning of the interval
        let k1 = model.derivatives(state);

        // Stages 2 and 3: slopes at the midpoint
        let k2 = model.derivatives(&(*state + k1 * (h / 2.0)));
        let k3 = model.derivatives(&(*state + k2 * (h / 2.0)));

        // Stage 4: slope at the end
        let k4 = model.derivatives(&(*state + k3 * h));

        // Simpson weights 1/6, 1/3, 1/3, 1/6
        let weighted_slope = k1 + k2 * 2.0 + k3 * 2.0 + k4;
        *state + weighted_slope * (h / 6.0)
    }
}

impl Default for RK4Solver {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSTEPS)
    }
}

impl Integrator for RK4Solver {
    fn integrate(
        &self,
        model: &dyn KineticModel,
        initial: &ConcentrationState,
        span: TimeSpan,
        samples: usize,
    ) -> Result<Trajectory> {
        // ====== Step 1: Validation ======

        validate_request(&span, samples)?;
        validate_state(initial, span.start)?;

        // ====== Step 2: Setup ======

        let time_points = span.linspace(samples);
        let mut states = Vec::with_capacity(samples);
        let mut state = *initial;
        states.push(state);

        // ====== Step 3: Time Integration ======

        for window in time_points.windows(2) {
            let (t0, t1) = (window[0], window[1]);
            let h = (t1 - t0) / self.substeps as f64;

            for _ in 0..self.substeps {
                state = Self::step(model, &state, h);
            }

            validate_state(&state, t1)?;
            states.push(state);
        }

        // ====== Step 4: Build Result ======

        let steps = (samples - 1) * self.substeps;
        let mut trajectory = Trajectory::new(time_points, states)?;
        trajectory.add_metadata("solver", self.name());
        trajectory.add_metadata("steps", &steps.to_string());
        trajectory.add_metadata("substeps", &self.substeps.to_string());
        trajectory.add_metadata("function evaluations", &(4 * steps).to_string());

        Ok(trajectory)
    }

    fn name(&self) -> &str {
        "Runge Kutta (RK4)"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
