//! Integrator traits and types
//!
//! # Design Philosophy
//!
//! - `Integrator` trait: advances a kinetic model over one time span and
//!   returns a dense, evenly sampled trajectory
//! - `SolverType` enum: selects the numerical method and carries its
//!   parameters, so a whole simulation can be configured from data
//! - `TimeSpan`: the closed interval of one phase
//!
//! Sampling resolution and integration accuracy are separate concerns: the
//! number of samples fixes the plotting grid, the method takes whatever
//! internal steps it needs between two samples.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::physics::{ConcentrationState, KineticModel};
use crate::solver::methods::{DormandPrinceSolver, RK4Solver};
use crate::solver::trajectory::Trajectory;

// =================================================================================================
// Time span
// =================================================================================================

/// Closed time interval [start, end]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// Interval of phase `index` for phases of length `phase_length`
    pub fn phase(index: usize, phase_length: f64) -> Self {
        Self {
            start: index as f64 * phase_length,
            end: (index + 1) as f64 * phase_length,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// `samples` evenly spaced points including both ends
    ///
    /// Each point is computed from its index rather than by accumulating
    /// the spacing, and the last point is exactly `end`.
    pub fn linspace(&self, samples: usize) -> Vec<f64> {
        match samples {
            0 => Vec::new(),
            1 => vec![self.start],
            _ => {
                let spacing = self.duration() / (samples - 1) as f64;
                let mut points: Vec<f64> = (0..samples)
                    .map(|i| self.start + i as f64 * spacing)
                    .collect();
                points[samples - 1] = self.end;
                points
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(SimulationError::config("time span bounds must be finite"));
        }
        if self.end <= self.start {
            return Err(SimulationError::config(format!(
                "time span must be increasing, got [{}, {}]",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

// =================================================================================================
// Integrator trait
// =================================================================================================

/// Numerical time integrator for a kinetic model
///
/// Implementations are stateless: the same value can integrate any number
/// of phases, from any number of threads.
pub trait Integrator: Send + Sync {
    /// Integrate `model` from `initial` over `span`
    ///
    /// Returns `samples` evenly spaced states (see [`TimeSpan::linspace`]),
    /// the first one being `initial` itself.
    ///
    /// # Errors
    ///
    /// - `Configuration` for an invalid span or fewer than 2 samples
    /// - `NumericalDivergence` when the state stops being finite or the
    ///   method cannot make progress
    fn integrate(
        &self,
        model: &dyn KineticModel,
        initial: &ConcentrationState,
        span: TimeSpan,
        samples: usize,
    ) -> Result<Trajectory>;

    /// Name of the method
    fn name(&self) -> &str;
}

/// Shared argument checks of every integrator
pub(crate) fn validate_request(span: &TimeSpan, samples: usize) -> Result<()> {
    span.validate()?;
    if samples < 2 {
        return Err(SimulationError::config(format!(
            "at least 2 samples are needed to cover a time span, got {samples}"
        )));
    }
    Ok(())
}

// =================================================================================================
// Solver type
// =================================================================================================

/// Default relative and absolute tolerance of the adaptive method
pub const DEFAULT_TOLERANCE: f64 = 1.49012e-8;

/// Default cap on accepted + rejected steps per phase
pub const DEFAULT_MAX_STEPS: usize = 500_000;

/// Default number of RK4 steps between two samples
pub const DEFAULT_SUBSTEPS: usize = 4;

/// Numerical method used for every phase
///
/// # Examples
///
/// ```rust
/// use equil_rs::solver::SolverType;
///
/// let adaptive = SolverType::default();
/// assert_eq!(adaptive.name(), "Adaptive");
///
/// let fixed = SolverType::FixedStep { substeps: 8 };
/// assert!(fixed.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SolverType {
    /// Dormand–Prince 5(4) with local error control
    Adaptive {
        relative_tolerance: f64,
        absolute_tolerance: f64,
        max_steps: usize,
    },

    /// Classical RK4 with `substeps` equal steps between two samples
    FixedStep { substeps: usize },
}

impl SolverType {
    /// Get name identifier
    pub fn name(&self) -> &str {
        match self {
            SolverType::Adaptive { .. } => "Adaptive",
            SolverType::FixedStep { .. } => "FixedStep",
        }
    }

    /// Validate that parameters are numerically meaningful
    pub fn validate(&self) -> Result<()> {
        match self {
            SolverType::Adaptive {
                relative_tolerance,
                absolute_tolerance,
                max_steps,
            } => {
                if !(*relative_tolerance > 0.0 && relative_tolerance.is_finite()) {
                    return Err(SimulationError::config("relative tolerance must be positive"));
                }
                if !(*absolute_tolerance > 0.0 && absolute_tolerance.is_finite()) {
                    return Err(SimulationError::config("absolute tolerance must be positive"));
                }
                if *max_steps == 0 {
                    return Err(SimulationError::config("max_steps must be greater than 0"));
                }
                Ok(())
            }
            SolverType::FixedStep { substeps } => {
                if *substeps == 0 {
                    return Err(SimulationError::config("substeps must be greater than 0"));
                }
                Ok(())
            }
        }
    }

    /// Instantiate the configured integrator
    pub fn build(&self) -> Result<Box<dyn Integrator>> {
        self.validate()?;
        Ok(match self {
            SolverType::Adaptive {
                relative_tolerance,
                absolute_tolerance,
                max_steps,
            } => Box::new(DormandPrinceSolver::new(
                *relative_tolerance,
                *absolute_tolerance,
                *max_steps,
            )),
            SolverType::FixedStep { substeps } => Box::new(RK4Solver::new(*substeps)),
        })
    }
}

impl Default for SolverType {
    fn default() -> Self {
        SolverType::Adaptive {
            relative_tolerance: DEFAULT_TOLERANCE,
            absolute_tolerance: DEFAULT_TOLERANCE,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_includes_both_ends() {
        let points = TimeSpan::new(200.0, 400.0).linspace(1000);

        assert_eq!(points.len(), 1000);
        assert_eq!(points[0], 200.0);
        assert_eq!(points[999], 400.0);
        assert!(points.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn test_phase_span() {
        let span = TimeSpan::phase(3, 200.0);
        assert_eq!(span.start, 600.0);
        assert_eq!(span.end, 800.0);
        assert_eq!(span.duration(), 200.0);
    }

    #[test]
    fn test_span_validation() {
        assert!(TimeSpan::new(0.0, 1.0).validate().is_ok());
        assert!(TimeSpan::new(1.0, 1.0).validate().is_err());
        assert!(TimeSpan::new(0.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_request_needs_two_samples() {
        let span = TimeSpan::new(0.0, 1.0);
        assert!(validate_request(&span, 2).is_ok());
        assert!(validate_request(&span, 1).is_err());
    }

    #[test]
    fn test_solver_type_validation() {
        assert!(SolverType::default().validate().is_ok());
        assert!(SolverType::FixedStep { substeps: 0 }.validate().is_err());

        let loose = SolverType::Adaptive {
            relative_tolerance: -1.0,
            absolute_tolerance: 1e-8,
            max_steps: 10,
        };
        assert!(loose.validate().is_err());
    }

    #[test]
    fn test_build_selects_method() {
        let adaptive = SolverType::default().build().unwrap();
        assert_eq!(adaptive.name(), "Dormand-Prince 5(4)");

        let fixed = SolverType::FixedStep { substeps: 2 }.build().unwrap();
        assert_eq!(fixed.name(), "Runge Kutta (RK4)");
    }
}
