//! Dormand–Prince 5(4) adaptive integrator
//!
//! # Mathematical Background
//!
//! An explicit embedded Runge-Kutta pair: seven stages produce a fifth-order
//! solution and a fourth-order companion. Their difference estimates the
//! local error, which drives the step size:
//!
//! ```text
//! err = ‖ (y₅ - y₄) / (atol + rtol · max(|yₙ|, |yₙ₊₁|)) ‖_rms
//!
//! accept when err ≤ 1
//! h_next = h · clamp(0.9 · err^(-1/5), 0.2, 5)
//! ```
//!
//! The last stage is evaluated at the new solution, so an accepted step
//! hands its final slope to the next one (first same as last) and costs six
//! evaluations instead of seven.
//!
//! # Sampling
//!
//! Steps are truncated so that every sample time is hit exactly; the
//! returned trajectory holds the accepted solution at each grid point
//! without interpolation.
//!
//! # Failure Modes
//!
//! A `NumericalDivergence` error is returned when the state becomes
//! non-finite, when the step size underflows, or when `max_steps` is
//! exhausted within one span.

use crate::error::{Result, SimulationError};
use crate::physics::{ConcentrationState, KineticModel};
use crate::solver::trajectory::Trajectory;
use crate::solver::traits::{
    validate_request, Integrator, TimeSpan, DEFAULT_MAX_STEPS, DEFAULT_TOLERANCE,
};
use crate::solver::validate_state;

// =================================================================================================
// Butcher tableau
// =================================================================================================

const A21: f64 = 1.0 / 5.0;

const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;

const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;

const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;

const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights (also the seventh stage row)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Fifth minus fourth order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

// Step size controller
const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

// Below this relative size the step cannot advance t any more
const MIN_RELATIVE_STEP: f64 = 1e-12;

// =================================================================================================
// Dormand–Prince solver
// =================================================================================================

/// Adaptive Dormand–Prince 5(4) integrator
///
/// # Example
///
/// ```rust
/// use equil_rs::models::{RateConstants, ReactionSpec, ReversibleReaction};
/// use equil_rs::physics::ConcentrationState;
/// use equil_rs::solver::{DormandPrinceSolver, Integrator, TimeSpan};
///
/// let spec = ReactionSpec::new(1, 3, 2, 0, -92.0).unwrap();
/// let model = ReversibleReaction::new(spec, RateConstants::REFERENCE);
///
/// let solver = DormandPrinceSolver::default();
/// let initial = ConcentrationState::new(1.0, 1.0, 0.0, 0.0);
/// let trajectory = solver
///     .integrate(&model, &initial, TimeSpan::new(0.0, 200.0), 1000)
///     .unwrap();
///
/// assert!(trajectory.final_state().get(equil_rs::physics::Species::C) > 0.0);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct DormandPrinceSolver {
    relative_tolerance: f64,
    absolute_tolerance: f64,
    max_steps: usize,
}

/// Outcome of one attempted step
struct StepAttempt {
    state: ConcentrationState,
    last_slope: ConcentrationState,
    error_norm: f64,
}

impl DormandPrinceSolver {
    pub fn new(relative_tolerance: f64, absolute_tolerance: f64, max_steps: usize) -> Self {
        Self {
            relative_tolerance,
            absolute_tolerance,
            max_steps,
        }
    }

    pub fn relative_tolerance(&self) -> f64 {
        self.relative_tolerance
    }

    pub fn absolute_tolerance(&self) -> f64 {
        self.absolute_tolerance
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Seven-stage step of size `h` from `state`, whose slope is `k1`
    fn attempt(
        &self,
        model: &dyn KineticModel,
        state: &ConcentrationState,
        k1: &ConcentrationState,
        h: f64,
    ) -> StepAttempt {
        let y = *state;
        let k1 = *k1;

        let k2 = model.derivatives(&(y + k1 * (h * A21)));
        let k3 = model.derivatives(&(y + (k1 * A31 + k2 * A32) * h));
        let k4 = model.derivatives(&(y + (k1 * A41 + k2 * A42 + k3 * A43) * h));
        let k5 = model.derivatives(&(y + (k1 * A51 + k2 * A52 + k3 * A53 + k4 * A54) * h));
        let k6 = model
            .derivatives(&(y + (k1 * A61 + k2 * A62 + k3 * A63 + k4 * A64 + k5 * A65) * h));

        let next = y + (k1 * B1 + k3 * B3 + k4 * B4 + k5 * B5 + k6 * B6) * h;
        let k7 = model.derivatives(&next);

        let error = (k1 * E1 + k3 * E3 + k4 * E4 + k5 * E5 + k6 * E6 + k7 * E7) * h;

        StepAttempt {
            state: next,
            last_slope: k7,
            error_norm: self.error_norm(&y, &next, &error),
        }
    }

    /// Root mean square of the scaled local error
    fn error_norm(
        &self,
        previous: &ConcentrationState,
        next: &ConcentrationState,
        error: &ConcentrationState,
    ) -> f64 {
        let sum: f64 = (0..4)
            .map(|i| {
                let scale = self.absolute_tolerance
                    + self.relative_tolerance
                        * previous.as_vector()[i].abs().max(next.as_vector()[i].abs());
                (error.as_vector()[i] / scale).powi(2)
            })
            .sum();
        (sum / 4.0).sqrt()
    }

    fn step_factor(error_norm: f64) -> f64 {
        if error_norm == 0.0 {
            MAX_FACTOR
        } else {
            (SAFETY * error_norm.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
        }
    }
}

impl Default for DormandPrinceSolver {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE, DEFAULT_TOLERANCE, DEFAULT_MAX_STEPS)
    }
}

impl Integrator for DormandPrinceSolver {
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

        let mut t = span.start;
        let mut state = *initial;
        let mut slope = model.derivatives(&state);
        states.push(state);

        // First guess: one sample spacing, the controller adapts from there
        let mut h = span.duration() / (samples - 1) as f64;

        let mut accepted = 0usize;
        let mut rejected = 0usize;
        let mut evaluations = 1usize;

        // ====== Step 3: Time Integration ======

        for &target in &time_points[1..] {
            while t < target {
                if accepted + rejected >= self.max_steps {
                    return Err(SimulationError::divergence(
                        t,
                        format!("maximum number of steps ({}) exceeded", self.max_steps),
                    ));
                }

                let remaining = target - t;
                let reaches_target = h >= remaining;
                let step = if reaches_target { remaining } else { h };

                let attempt = self.attempt(model, &state, &slope, step);
                evaluations += 6;

                let finite = attempt.state.is_finite() && attempt.error_norm.is_finite();

                if finite && attempt.error_norm <= 1.0 {
                    t = if reaches_target { target } else { t + step };
                    state = attempt.state;
                    slope = attempt.last_slope;
                    accepted += 1;

                    // A step truncated to reach a sample says little about
                    // the natural step size, so never shrink h because of it
                    let proposal = step * Self::step_factor(attempt.error_norm);
                    h = if reaches_target { h.max(proposal) } else { proposal };
                } else {
                    rejected += 1;
                    h = if finite {
                        step * Self::step_factor(attempt.error_norm)
                    } else {
                        step * MIN_FACTOR
                    };
                }

                if h < MIN_RELATIVE_STEP * t.abs().max(1.0) {
                    return Err(SimulationError::divergence(
                        t,
                        format!("step size underflow (h = {h:e})"),
                    ));
                }
            }

            validate_state(&state, t)?;
            states.push(state);
        }

        // ====== Step 4: Build Result ======

        let mut trajectory = Trajectory::new(time_points, states)?;
        trajectory.add_metadata("solver", self.name());
        trajectory.add_metadata("accepted steps", &accepted.to_string());
        trajectory.add_metadata("rejected steps", &rejected.to_string());
        trajectory.add_metadata("function evaluations", &evaluations.to_string());
        trajectory.add_metadata("relative tolerance", &self.relative_tolerance.to_string());
        trajectory.add_metadata("absolute tolerance", &self.absolute_tolerance.to_string());

        Ok(trajectory)
    }

    fn name(&self) -> &str {
        "Dormand-Prince 5(4)"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
