//! Phase boundaries and the perturbations applied at them
//!
//! # Design Philosophy
//!
//! A run is a line of phases separated by boundaries. At each boundary the
//! scheduler takes the last sample of the finished phase and applies one
//! [`Perturbation`]:
//!
//! - `Temperature`: rescales one rate constant, concentrations untouched
//! - `VolumePressure`: dilutes or concentrates every species
//! - `Addition`: scales each species by its own factor
//!
//! Temperature always rescales from the *base* rate constants, never from
//! the running ones, so two successive +20 % boundaries leave the constant
//! at 1.2 × base rather than 1.44 × base. Only the constant selected by the
//! sign of ΔH changes; the other one keeps its current value.
//!
//! Everything that happened at a boundary is kept in a [`BoundaryRecord`],
//! which is the ground truth used by the answer key.

use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SimulationError};
use crate::models::{RateConstants, ReactionSpec, Thermicity};
use crate::physics::{ConcentrationState, Species};

/// Nominal magnitude of a temperature effect
pub const TEMPERATURE_NOMINAL_RANGE: f64 = 1.0;

/// Nominal magnitude of volume and addition effects
pub const CONCENTRATION_NOMINAL_RANGE: f64 = 0.5;

// =================================================================================================
// Boundary kind
// =================================================================================================

/// Tag of a boundary, as found in schedule files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryKind {
    Temperature,
    #[serde(rename = "Volume/Pressure")]
    VolumePressure,
    Addition,
}

impl BoundaryKind {
    pub const ALL: [BoundaryKind; 3] = [
        BoundaryKind::Temperature,
        BoundaryKind::VolumePressure,
        BoundaryKind::Addition,
    ];

    /// Tag string used by schedule files
    pub fn tag(self) -> &'static str {
        match self {
            BoundaryKind::Temperature => "Temperature",
            BoundaryKind::VolumePressure => "Volume/Pressure",
            BoundaryKind::Addition => "Addition",
        }
    }
}

impl fmt::Display for BoundaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for BoundaryKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self> {
        BoundaryKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == s.trim())
            .ok_or_else(|| SimulationError::config(format!("unknown boundary tag '{s}'")))
    }
}

// =================================================================================================
// Perturbation
// =================================================================================================

/// Change applied to the system at a phase boundary
///
/// # Examples
///
/// ```rust
/// use equil_rs::models::{RateConstants, ReactionSpec};
/// use equil_rs::physics::ConcentrationState;
/// use equil_rs::solver::Perturbation;
///
/// let haber = ReactionSpec::new(1, 3, 2, 0, -92.0).unwrap();
/// let base = RateConstants::REFERENCE;
/// let state = ConcentrationState::new(0.6, 0.4, 0.3, 0.1);
///
/// // Exothermic: heating speeds up the reverse reaction
/// let (_, constants) = Perturbation::Temperature { effect: 0.2 }.apply(&haber, base, base, &state);
/// assert_eq!(constants.k1, 0.02);
/// assert_eq!(constants.k2, 0.012);
///
/// // Expanding by 25 % dilutes every species
/// let (diluted, _) = Perturbation::VolumePressure { effect: 0.25 }.apply(&haber, base, base, &state);
/// assert_eq!(diluted.to_array(), [0.48, 0.32, 0.24, 0.08]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Perturbation {
    /// Relative change of the temperature-sensitive rate constant
    Temperature { effect: f64 },

    /// Relative change of the volume; concentrations are divided by (1 + effect)
    #[serde(rename = "Volume/Pressure")]
    VolumePressure { effect: f64 },

    /// Relative change of each species, in A, B, C, D order
    Addition { perturb: [f64; 4] },
}

impl Perturbation {
    /// Addition touching a single species
    pub fn addition_of(species: Species, amount: f64) -> Self {
        let mut perturb = [0.0; 4];
        perturb[species.index()] = amount;
        Perturbation::Addition { perturb }
    }

    pub fn kind(&self) -> BoundaryKind {
        match self {
            Perturbation::Temperature { .. } => BoundaryKind::Temperature,
            Perturbation::VolumePressure { .. } => BoundaryKind::VolumePressure,
            Perturbation::Addition { .. } => BoundaryKind::Addition,
        }
    }

    /// Check hard limits, warn about values outside the nominal ranges
    ///
    /// # Errors
    ///
    /// `Configuration` when an effect is not finite, when a volume change
    /// would make the volume vanish (1 + effect ≤ 0), or when a temperature
    /// change would make a rate constant negative (1 + effect < 0).
    pub fn validate(&self, boundary: usize) -> Result<()> {
        match *self {
            Perturbation::Temperature { effect } => {
                check_finite(boundary, "temperature effect", effect)?;
                if 1.0 + effect < 0.0 {
                    return Err(SimulationError::config(format!(
                        "boundary {boundary}: temperature effect {effect} would make a rate constant negative"
                    )));
                }
                warn_out_of_range(boundary, "temperature effect", effect, TEMPERATURE_NOMINAL_RANGE);
            }
            Perturbation::VolumePressure { effect } => {
                check_finite(boundary, "volume effect", effect)?;
                if 1.0 + effect <= 0.0 {
                    return Err(SimulationError::config(format!(
                        "boundary {boundary}: volume effect {effect} leaves no volume"
                    )));
                }
                warn_out_of_range(boundary, "volume effect", effect, CONCENTRATION_NOMINAL_RANGE);
            }
            Perturbation::Addition { perturb } => {
                for species in Species::ALL {
                    let amount = perturb[species.index()];
                    let what = format!("{species} perturbation");
                    check_finite(boundary, &what, amount)?;
                    warn_out_of_range(boundary, &what, amount, CONCENTRATION_NOMINAL_RANGE);
                }
            }
        }
        Ok(())
    }

    /// Apply the perturbation to the state and rate constants
    ///
    /// `base` are the run's base constants, `current` the ones active in the
    /// phase that just ended. Returns the next phase's initial state and
    /// constants. Negative results are not filtered here; the scheduler
    /// applies its policy.
    pub fn apply(
        &self,
        spec: &ReactionSpec,
        base: RateConstants,
        current: RateConstants,
        state: &ConcentrationState,
    ) -> (ConcentrationState, RateConstants) {
        match *self {
            Perturbation::Temperature { effect } => {
                let constants = match spec.thermicity() {
                    Thermicity::Exothermic => RateConstants {
                        k1: current.k1,
                        k2: base.k2 * (1.0 + effect),
                    },
                    Thermicity::Endothermic => RateConstants {
                        k1: base.k1 * (1.0 + effect),
                        k2: current.k2,
                    },
                };
                (*state, constants)
            }
            Perturbation::VolumePressure { effect } => (*state / (1.0 + effect), current),
            Perturbation::Addition { perturb } => {
                let factors = perturb.map(|p| 1.0 + p);
                (state.component_mul(&factors), current)
            }
        }
    }
}

impl fmt::Display for Perturbation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Perturbation::Temperature { effect } => write!(f, "Temperature({effect:+})"),
            Perturbation::VolumePressure { effect } => write!(f, "Volume/Pressure({effect:+})"),
            Perturbation::Addition { perturb } => write!(
                f,
                "Addition(A{:+}, B{:+}, C{:+}, D{:+})",
                perturb[0], perturb[1], perturb[2], perturb[3]
            ),
        }
    }
}

fn check_finite(boundary: usize, what: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SimulationError::config(format!(
            "boundary {boundary}: {what} must be finite, got {value}"
        )))
    }
}

fn warn_out_of_range(boundary: usize, what: &str, value: f64, range: f64) {
    if value.abs() > range {
        warn!("boundary {boundary}: {what} {value} is outside the nominal range [-{range}, {range}]");
    }
}

// =================================================================================================
// Boundary record
// =================================================================================================

/// What happened at one boundary of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryRecord {
    /// Boundary index, 0 for the boundary between phase 0 and phase 1
    pub index: usize,

    /// Time of the boundary (end of phase `index`)
    pub time: f64,

    pub event: Perturbation,

    /// Last sample of phase `index`
    pub pre_state: ConcentrationState,

    /// First sample of phase `index + 1`, after the negative policy
    pub post_state: ConcentrationState,

    pub constants_before: RateConstants,
    pub constants_after: RateConstants,

    /// True when negative entries were zeroed by the clamp policy
    pub clamped: bool,
}

impl BoundaryRecord {
    pub fn kind(&self) -> BoundaryKind {
        self.event.kind()
    }

    /// Relative change of one species across the boundary
    ///
    /// `None` when the species was absent before the boundary.
    pub fn relative_change(&self, species: Species) -> Option<f64> {
        let before = self.pre_state.get(species);
        if before == 0.0 {
            None
        } else {
            Some(self.post_state.get(species) / before - 1.0)
        }
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn haber() -> ReactionSpec {
        ReactionSpec::new(1, 3, 2, 0, -92.0).unwrap()
    }

    fn calcium_carbonate() -> ReactionSpec {
        ReactionSpec::new(1, 0, 1, 1, 178.0).unwrap()
    }

    #[test]
    fn test_boundary_kind_tags() {
        assert_eq!("Temperature".parse::<BoundaryKind>().unwrap(), BoundaryKind::Temperature);
        assert_eq!(
            "Volume/Pressure".parse::<BoundaryKind>().unwrap(),
            BoundaryKind::VolumePressure
        );
        assert_eq!(BoundaryKind::Addition.to_string(), "Addition");
        assert!("Pressure".parse::<BoundaryKind>().unwrap_err().is_configuration());
    }

    #[test]
    fn test_temperature_exothermic_changes_k2() {
        let base = RateConstants::REFERENCE;
        let state = ConcentrationState::new(1.0, 1.0, 0.0, 0.0);

        let (next, constants) =
            Perturbation::Temperature { effect: 0.2 }.apply(&haber(), base, base, &state);

        assert_eq!(next, state);
        assert_eq!(constants.k1, 0.02);
        assert_eq!(constants.k2, 0.012);
    }

    #[test]
    fn test_temperature_endothermic_changes_k1() {
        let base = RateConstants::REFERENCE;
        let state = ConcentrationState::new(1.0, 1.0, 0.0, 0.0);

        let (_, constants) =
            Perturbation::Temperature { effect: -0.5 }.apply(&calcium_carbonate(), base, base, &state);

        assert_eq!(constants.k1, 0.01);
        assert_eq!(constants.k2, 0.01);
    }

    #[test]
    fn test_temperature_reads_base_not_current() {
        let base = RateConstants::REFERENCE;
        let state = ConcentrationState::new(1.0, 1.0, 0.0, 0.0);
        let event = Perturbation::Temperature { effect: 0.2 };

        let (_, first) = event.apply(&haber(), base, base, &state);
        let (_, second) = event.apply(&haber(), base, first, &state);

        assert_eq!(second, first);
    }

    #[test]
    fn test_temperature_keeps_other_current_constant() {
        let base = RateConstants::REFERENCE;
        let current = RateConstants::new(0.03, 0.015);
        let state = ConcentrationState::zeros();

        let (_, constants) =
            Perturbation::Temperature { effect: 0.1 }.apply(&haber(), base, current, &state);

        assert_eq!(constants.k1, 0.03);
        assert_relative_eq!(constants.k2, 0.011, epsilon = 1e-15);
    }

    #[test]
    fn test_volume_divides_every_species() {
        let base = RateConstants::REFERENCE;
        let state = ConcentrationState::new(0.6, 0.4, 0.3, 0.1);

        let (next, constants) =
            Perturbation::VolumePressure { effect: 0.25 }.apply(&haber(), base, base, &state);

        assert_eq!(next.to_array(), [0.48, 0.32, 0.24, 0.08]);
        assert_eq!(constants, base);
    }

    #[test]
    fn test_addition_scales_each_species() {
        let base = RateConstants::REFERENCE;
        let state = ConcentrationState::new(0.5, 0.5, 0.2, 0.1);

        let (next, _) = Perturbation::addition_of(Species::A, 0.5).apply(&haber(), base, base, &state);

        assert_eq!(next.to_array(), [0.75, 0.5, 0.2, 0.1]);
    }

    #[test]
    fn test_addition_applies_even_to_absent_species() {
        // Unconditional: a zero stays zero, a nonzero D would still be scaled
        let base = RateConstants::REFERENCE;
        let state = ConcentrationState::new(0.5, 0.5, 0.2, 0.0);
        let event = Perturbation::Addition {
            perturb: [0.0, 0.0, 0.0, 0.5],
        };

        let (next, _) = event.apply(&haber(), base, base, &state);
        assert_eq!(next, state);
    }

    #[test]
    fn test_validation_hard_limits() {
        assert!(Perturbation::Temperature { effect: 0.2 }.validate(0).is_ok());
        assert!(Perturbation::Temperature { effect: -1.0 }.validate(0).is_ok());
        assert!(Perturbation::Temperature { effect: -1.5 }.validate(0).is_err());
        assert!(Perturbation::Temperature { effect: f64::NAN }.validate(0).is_err());

        assert!(Perturbation::VolumePressure { effect: -0.5 }.validate(1).is_ok());
        assert!(Perturbation::VolumePressure { effect: -1.0 }.validate(1).is_err());

        let infinite = Perturbation::Addition {
            perturb: [0.0, f64::INFINITY, 0.0, 0.0],
        };
        assert!(infinite.validate(2).unwrap_err().is_configuration());
    }

    #[test]
    fn test_out_of_nominal_range_is_accepted() {
        assert!(Perturbation::VolumePressure { effect: 2.0 }.validate(0).is_ok());
        assert!(Perturbation::addition_of(Species::B, -0.9).validate(0).is_ok());
    }

    #[test]
    fn test_perturbation_serde_shape() {
        let event = Perturbation::VolumePressure { effect: 0.2 };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"kind":"Volume/Pressure","effect":0.2}"#);

        let back: Perturbation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_record_relative_change() {
        let record = BoundaryRecord {
            index: 0,
            time: 200.0,
            event: Perturbation::addition_of(Species::A, 0.5),
            pre_state: ConcentrationState::new(0.5, 0.5, 0.2, 0.0),
            post_state: ConcentrationState::new(0.75, 0.5, 0.2, 0.0),
            constants_before: RateConstants::REFERENCE,
            constants_after: RateConstants::REFERENCE,
            clamped: false,
        };

        assert_eq!(record.kind(), BoundaryKind::Addition);
        assert_eq!(record.relative_change(Species::A), Some(0.5));
        assert_eq!(record.relative_change(Species::B), Some(0.0));
        assert_eq!(record.relative_change(Species::D), None);
    }
}
