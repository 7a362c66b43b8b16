//! Models and integrators with known behavior
//!
//! Used to check the integrators against exact solutions and to test the
//! scheduler without numerical noise.

use equil_rs::error::Result;
use equil_rs::models::{RateConstants, ReactionSpec};
use equil_rs::physics::ConcentrationState;
use equil_rs::solver::{Integrator, TimeSpan, Trajectory};

// =================================================================================================
// First-order isomerization: A <-> C
// =================================================================================================

/// A <-> C with first-order kinetics (a = c = 1, b = d = 0)
///
/// With A + C = S constant and K = k1 / k2:
///
/// ```text
/// A(t) = S / (1 + K) + (A₀ - S / (1 + K)) · exp(-(k1 + k2) t)
/// ```
pub struct FirstOrderIsomerization {
    pub constants: RateConstants,
}

impl FirstOrderIsomerization {
    pub fn new(constants: RateConstants) -> Self {
        Self { constants }
    }

    pub fn spec() -> ReactionSpec {
        ReactionSpec::new(1, 0, 1, 0, -10.0).expect("valid isomerization")
    }

    /// Exact A at time t from [A₀, C₀] at t = 0
    pub fn analytical_a(&self, t: f64, a0: f64, c0: f64) -> f64 {
        let total = a0 + c0;
        let k = self.constants.equilibrium_constant();
        let a_eq = total / (1.0 + k);
        a_eq + (a0 - a_eq) * (-(self.constants.k1 + self.constants.k2) * t).exp()
    }
}

// =================================================================================================
// Frozen integrator
// =================================================================================================

/// Integrator that holds the initial state for the whole span
///
/// Lets scheduler tests control the exact state seen at every boundary.
pub struct Frozen;

impl Integrator for Frozen {
    fn integrate(
        &self,
        _model: &dyn equil_rs::physics::KineticModel,
        initial: &ConcentrationState,
        span: TimeSpan,
        samples: usize,
    ) -> Result<Trajectory> {
        Trajectory::new(span.linspace(samples), vec![*initial; samples])
    }

    fn name(&self) -> &str {
        "Frozen"
    }
}
