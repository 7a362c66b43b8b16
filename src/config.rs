//! Simulation settings
//!
//! [`SimulationConfig`] gathers everything that is fixed for a whole run and
//! is not part of the scenario: base rate constants, the initial state, the
//! phase grid, the negative-concentration policy and the integrator.
//!
//! The defaults reproduce the reference setup: k1 = 0.02, k2 = 0.01,
//! [A, B, C, D] = [1, 1, 0, 0], phases of 200 time units sampled 1000 times,
//! adaptive Dormand–Prince integration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::models::RateConstants;
use crate::physics::ConcentrationState;
use crate::solver::SolverType;

/// Default duration of one phase
pub const DEFAULT_PHASE_LENGTH: f64 = 200.0;

/// Default number of samples per phase, both ends included
pub const DEFAULT_SAMPLES_PER_PHASE: usize = 1000;

/// Initial state of every run unless configured otherwise
pub const REFERENCE_INITIAL_STATE: [f64; 4] = [1.0, 1.0, 0.0, 0.0];

/// What to do when a perturbation leaves a concentration below zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NegativeConcentrationPolicy {
    /// Fail with `NegativeConcentration` before the next phase integrates
    #[default]
    Reject,

    /// Set negative entries to zero and log a warning
    Clamp,
}

/// Settings shared by every phase of a run
///
/// # Examples
///
/// ```rust
/// use equil_rs::config::{NegativeConcentrationPolicy, SimulationConfig};
/// use equil_rs::solver::SolverType;
///
/// let config = SimulationConfig::default()
///     .with_samples_per_phase(200)
///     .with_negative_policy(NegativeConcentrationPolicy::Clamp)
///     .with_solver(SolverType::FixedStep { substeps: 4 });
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.phase_length, 200.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Rate constants of phase 0, and reference for temperature changes
    pub base_constants: RateConstants,

    pub initial_state: ConcentrationState,

    pub phase_length: f64,

    pub samples_per_phase: usize,

    pub negative_policy: NegativeConcentrationPolicy,

    pub solver: SolverType,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            base_constants: RateConstants::REFERENCE,
            initial_state: ConcentrationState::from(REFERENCE_INITIAL_STATE),
            phase_length: DEFAULT_PHASE_LENGTH,
            samples_per_phase: DEFAULT_SAMPLES_PER_PHASE,
            negative_policy: NegativeConcentrationPolicy::default(),
            solver: SolverType::default(),
        }
    }
}

impl SimulationConfig {
    pub fn with_base_constants(mut self, constants: RateConstants) -> Self {
        self.base_constants = constants;
        self
    }

    pub fn with_initial_state(mut self, state: ConcentrationState) -> Self {
        self.initial_state = state;
        self
    }

    pub fn with_phase_length(mut self, phase_length: f64) -> Self {
        self.phase_length = phase_length;
        self
    }

    pub fn with_samples_per_phase(mut self, samples: usize) -> Self {
        self.samples_per_phase = samples;
        self
    }

    pub fn with_negative_policy(mut self, policy: NegativeConcentrationPolicy) -> Self {
        self.negative_policy = policy;
        self
    }

    pub fn with_solver(mut self, solver: SolverType) -> Self {
        self.solver = solver;
        self
    }

    /// Check every setting
    ///
    /// # Errors
    ///
    /// `Configuration` naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        self.base_constants.validate()?;

        if !self.initial_state.is_finite() {
            return Err(SimulationError::config(format!(
                "initial state must be finite, got {}",
                self.initial_state
            )));
        }
        if let Some((species, value)) = self.initial_state.first_negative() {
            return Err(SimulationError::config(format!(
                "initial [{species}] must be non-negative, got {value}"
            )));
        }
        if !(self.phase_length > 0.0 && self.phase_length.is_finite()) {
            return Err(SimulationError::config(format!(
                "phase length must be positive, got {}",
                self.phase_length
            )));
        }
        if self.samples_per_phase < 2 {
            return Err(SimulationError::config(format!(
                "samples per phase must be at least 2, got {}",
                self.samples_per_phase
            )));
        }

        self.solver.validate()
    }

    /// Load settings from JSON; missing fields take their default
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SimulationError::config(format!("invalid simulation config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_reference_setup() {
        let config = SimulationConfig::default();

        assert_eq!(config.base_constants.k1, 0.02);
        assert_eq!(config.base_constants.k2, 0.01);
        assert_eq!(config.initial_state.to_array(), [1.0, 1.0, 0.0, 0.0]);
        assert_eq!(config.phase_length, 200.0);
        assert_eq!(config.samples_per_phase, 1000);
        assert_eq!(config.negative_policy, NegativeConcentrationPolicy::Reject);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_settings() {
        let base = SimulationConfig::default();

        assert!(base.clone().with_phase_length(0.0).validate().is_err());
        assert!(base.clone().with_phase_length(f64::INFINITY).validate().is_err());
        assert!(base.clone().with_samples_per_phase(1).validate().is_err());
        assert!(base
            .clone()
            .with_initial_state(ConcentrationState::new(1.0, -0.1, 0.0, 0.0))
            .validate()
            .is_err());
        assert!(base
            .clone()
            .with_base_constants(RateConstants::new(-0.02, 0.01))
            .validate()
            .is_err());
        assert!(base
            .with_solver(SolverType::FixedStep { substeps: 0 })
            .validate()
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn test_from_json_partial() {
        let config = SimulationConfig::from_json(
            r#"{ "samples_per_phase": 250, "negative_policy": "Clamp" }"#,
        )
        .unwrap();

        assert_eq!(config.samples_per_phase, 250);
        assert_eq!(config.negative_policy, NegativeConcentrationPolicy::Clamp);
        assert_eq!(config.phase_length, DEFAULT_PHASE_LENGTH);
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(SimulationConfig::from_json(r#"{ "phase_length": -5.0 }"#).is_err());
        assert!(SimulationConfig::from_json("not json").is_err());
    }
}
