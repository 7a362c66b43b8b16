//! Reversible power-law reaction aA + bB <-> cC + dD
//!
//! # Rate Law
//!
//! ```text
//! r_forward = k1 · A^a · B^b
//! r_reverse = k2 · C^c · D^d
//! r         = r_forward − r_reverse
//!
//! dA/dt = −a·r    dB/dt = −b·r    dC/dt = c·r    dD/dt = d·r
//! ```
//!
//! All four species are coupled through the single scalar `r`, so the
//! instantaneous changes are always in ratio −a : −b : c : d. A species whose
//! coefficient is zero has a derivative of exactly zero and keeps its value.
//!
//! # Example
//!
//! ```rust
//! use equil_rs::models::{RateConstants, ReactionSpec, ReversibleReaction};
//! use equil_rs::physics::{ConcentrationState, KineticModel};
//!
//! let haber = ReactionSpec::new(1, 3, 2, 0, -92.0)?;
//! let model = ReversibleReaction::new(haber, RateConstants::REFERENCE);
//!
//! let slope = model.derivatives(&ConcentrationState::new(1.0, 1.0, 0.0, 0.0));
//! assert_eq!(slope.to_array(), [-0.02, -0.06, 0.04, 0.0]);
//! # Ok::<(), equil_rs::error::SimulationError>(())
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SimulationError};
use crate::physics::{ConcentrationState, KineticModel, Species};

// =================================================================================================
// Reaction specification
// =================================================================================================

/// Sign class of the reaction enthalpy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Thermicity {
    /// ΔH < 0: heating favours the reverse reaction
    Exothermic,
    /// ΔH ≥ 0: heating favours the forward reaction
    Endothermic,
}

impl fmt::Display for Thermicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Thermicity::Exothermic => f.write_str("Exothermic"),
            Thermicity::Endothermic => f.write_str("Endothermic"),
        }
    }
}

/// Stoichiometry and enthalpy of aA + bB <-> cC + dD
///
/// Immutable once built: every constructor validates, so a `ReactionSpec`
/// in hand always has non-negative exponents with at least one nonzero
/// exponent per side and a finite ΔH.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawReactionSpec", into = "RawReactionSpec")]
pub struct ReactionSpec {
    a: u32,
    b: u32,
    c: u32,
    d: u32,
    delta_h: f64,
}

/// Wire shape of [`ReactionSpec`]: signed integers so that a negative
/// exponent reaches validation instead of failing as a type error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct RawReactionSpec {
    a: i64,
    b: i64,
    c: i64,
    d: i64,
    #[serde(rename = "delta_H")]
    delta_h: f64,
}

impl TryFrom<RawReactionSpec> for ReactionSpec {
    type Error = SimulationError;

    fn try_from(raw: RawReactionSpec) -> Result<Self> {
        ReactionSpec::new(raw.a, raw.b, raw.c, raw.d, raw.delta_h)
    }
}

impl From<ReactionSpec> for RawReactionSpec {
    fn from(spec: ReactionSpec) -> Self {
        Self {
            a: i64::from(spec.a),
            b: i64::from(spec.b),
            c: i64::from(spec.c),
            d: i64::from(spec.d),
            delta_h: spec.delta_h,
        }
    }
}

impl ReactionSpec {
    /// Build and validate a reaction specification
    ///
    /// # Errors
    ///
    /// `Configuration` when an exponent is negative or too large, when a
    /// side has only zero exponents, or when `delta_h` is not finite.
    pub fn new(a: i64, b: i64, c: i64, d: i64, delta_h: f64) -> Result<Self> {
        let checked = |name: &str, value: i64| -> Result<u32> {
            if value < 0 {
                return Err(SimulationError::config(format!(
                    "stoichiometric exponent {name} must be non-negative, got {value}"
                )));
            }
            if value > i64::from(i32::MAX) {
                return Err(SimulationError::config(format!(
                    "stoichiometric exponent {name} is too large: {value}"
                )));
            }
            Ok(value as u32)
        };

        let a = checked("a", a)?;
        let b = checked("b", b)?;
        let c = checked("c", c)?;
        let d = checked("d", d)?;

        if a == 0 && b == 0 {
            return Err(SimulationError::config(
                "reactant side has no species: a and b are both zero",
            ));
        }
        if c == 0 && d == 0 {
            return Err(SimulationError::config(
                "product side has no species: c and d are both zero",
            ));
        }
        if !delta_h.is_finite() {
            return Err(SimulationError::config(format!(
                "delta_H must be finite, got {delta_h}"
            )));
        }

        Ok(Self { a, b, c, d, delta_h })
    }

    /// Stoichiometric coefficient (and rate-law exponent) of one species
    pub fn coefficient(&self, species: Species) -> u32 {
        match species {
            Species::A => self.a,
            Species::B => self.b,
            Species::C => self.c,
            Species::D => self.d,
        }
    }

    /// Coefficients in column order
    pub fn coefficients(&self) -> [u32; 4] {
        [self.a, self.b, self.c, self.d]
    }

    /// Signed coefficients −a, −b, c, d: dy/dt = r · stoichiometry
    pub fn stoichiometry(&self) -> [f64; 4] {
        [
            -f64::from(self.a),
            -f64::from(self.b),
            f64::from(self.c),
            f64::from(self.d),
        ]
    }

    /// Whether a species takes part in the reaction
    pub fn participates(&self, species: Species) -> bool {
        self.coefficient(species) != 0
    }

    /// Reaction enthalpy ΔH (kJ/mol)
    pub fn delta_h(&self) -> f64 {
        self.delta_h
    }

    /// Exothermic when ΔH < 0, endothermic otherwise (including ΔH = 0)
    pub fn thermicity(&self) -> Thermicity {
        if self.delta_h < 0.0 {
            Thermicity::Exothermic
        } else {
            Thermicity::Endothermic
        }
    }
}

impl fmt::Display for ReactionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}A + {}B <-> {}C + {}D (ΔH = {} kJ/mol)",
            self.a, self.b, self.c, self.d, self.delta_h
        )
    }
}

// =================================================================================================
// Rate constants
// =================================================================================================

/// Forward (k1) and reverse (k2) rate constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateConstants {
    pub k1: f64,
    pub k2: f64,
}

impl RateConstants {
    /// Base constants of the teaching model: k1 = 0.02, k2 = 0.01
    pub const REFERENCE: RateConstants = RateConstants { k1: 0.02, k2: 0.01 };

    pub fn new(k1: f64, k2: f64) -> Self {
        Self { k1, k2 }
    }

    /// Equilibrium constant K = k1 / k2
    pub fn equilibrium_constant(&self) -> f64 {
        self.k1 / self.k2
    }

    /// Both constants finite and non-negative
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("k1", self.k1), ("k2", self.k2)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimulationError::config(format!(
                    "rate constant {name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for RateConstants {
    fn default() -> Self {
        Self::REFERENCE
    }
}

impl fmt::Display for RateConstants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k1 = {}, k2 = {}", self.k1, self.k2)
    }
}

// =================================================================================================
// Reversible reaction model
// =================================================================================================

/// Kinetic model of one phase: a reaction with fixed rate constants
#[derive(Debug, Clone, Copy)]
pub struct ReversibleReaction {
    spec: ReactionSpec,
    constants: RateConstants,
}

impl ReversibleReaction {
    pub fn new(spec: ReactionSpec, constants: RateConstants) -> Self {
        Self { spec, constants }
    }

    pub fn spec(&self) -> &ReactionSpec {
        &self.spec
    }

    pub fn constants(&self) -> RateConstants {
        self.constants
    }

    /// k1 · A^a · B^b
    pub fn forward_rate(&self, state: &ConcentrationState) -> f64 {
        self.constants.k1
            * state.get(Species::A).powi(self.spec.a as i32)
            * state.get(Species::B).powi(self.spec.b as i32)
    }

    /// k2 · C^c · D^d
    pub fn reverse_rate(&self, state: &ConcentrationState) -> f64 {
        self.constants.k2
            * state.get(Species::C).powi(self.spec.c as i32)
            * state.get(Species::D).powi(self.spec.d as i32)
    }

    /// Net rate r = forward − reverse
    pub fn net_rate(&self, state: &ConcentrationState) -> f64 {
        self.forward_rate(state) - self.reverse_rate(state)
    }

    /// Reaction quotient Q = C^c · D^d / (A^a · B^b)
    ///
    /// Tends to k1 / k2 as the phase approaches equilibrium.
    pub fn reaction_quotient(&self, state: &ConcentrationState) -> f64 {
        let products = state.get(Species::C).powi(self.spec.c as i32)
            * state.get(Species::D).powi(self.spec.d as i32);
        let reactants = state.get(Species::A).powi(self.spec.a as i32)
            * state.get(Species::B).powi(self.spec.b as i32);
        products / reactants
    }
}

impl KineticModel for ReversibleReaction {
    fn derivatives(&self, state: &ConcentrationState) -> ConcentrationState {
        let r = self.net_rate(state);
        let [sa, sb, sc, sd] = self.spec.stoichiometry();
        ConcentrationState::new(sa * r, sb * r, sc * r, sd * r)
    }

    fn name(&self) -> &str {
        "Reversible power-law reaction"
    }
}

// =================================================================================================
// Tests
// =================================================================================================
