//! Kinetic model traits and types
//!
//! This module defines the core API for reaction models:
//! - `Species`: type-safe identifier of the four reacting species
//! - `ConcentrationState`: the concentration vector [A, B, C, D]
//! - `KineticModel`: trait for anything that yields dy/dt at a given state

use nalgebra::Vector4;
use serde::{Deserialize, Serialize};
use std::fmt;

// =================================================================================================
// Species (Type-safe Identifiers)
// =================================================================================================

/// The four species of A + B <-> C + D
///
/// A and B are reactants (left side), C and D are products (right side).
/// The discriminant is the column index used everywhere a state is laid out
/// as a 4-vector or a 4-column array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    A,
    B,
    C,
    D,
}

impl Species {
    /// All species in column order
    pub const ALL: [Species; 4] = [Species::A, Species::B, Species::C, Species::D];

    /// Column index in a state vector
    pub fn index(self) -> usize {
        match self {
            Species::A => 0,
            Species::B => 1,
            Species::C => 2,
            Species::D => 3,
        }
    }

    /// True for A and B
    pub fn is_reactant(self) -> bool {
        matches!(self, Species::A | Species::B)
    }

    /// Single-letter label
    pub fn label(self) -> &'static str {
        match self {
            Species::A => "A",
            Species::B => "B",
            Species::C => "C",
            Species::D => "D",
        }
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =================================================================================================
// Concentration State
// =================================================================================================

/// Concentrations of the four species at one instant
///
/// Also used for derivatives (dA/dt, dB/dt, dC/dt, dD/dt): the integrators
/// combine states and slopes with `+` and `* f64` exactly like the stage
/// formulas are written.
///
/// # Example
///
/// ```rust
/// use equil_rs::physics::{ConcentrationState, Species};
///
/// let state = ConcentrationState::new(1.0, 1.0, 0.0, 0.0);
/// let halved = state * 0.5;
/// assert_eq!(halved.get(Species::A), 0.5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct ConcentrationState {
    values: Vector4<f64>,
}

impl ConcentrationState {
    /// Create a state from the four concentrations
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            values: Vector4::new(a, b, c, d),
        }
    }

    /// All-zero state
    pub fn zeros() -> Self {
        Self {
            values: Vector4::zeros(),
        }
    }

    /// Create from a nalgebra vector
    pub fn from_vector(values: Vector4<f64>) -> Self {
        Self { values }
    }

    /// Underlying nalgebra vector
    pub fn as_vector(&self) -> &Vector4<f64> {
        &self.values
    }

    /// Copy out as a plain array in column order
    pub fn to_array(&self) -> [f64; 4] {
        [self.values[0], self.values[1], self.values[2], self.values[3]]
    }

    /// Concentration of one species
    pub fn get(&self, species: Species) -> f64 {
        self.values[species.index()]
    }

    /// Set the concentration of one species
    pub fn set(&mut self, species: Species, value: f64) {
        self.values[species.index()] = value;
    }

    /// Apply `f` to every concentration
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            values: self.values.map(f),
        }
    }

    /// Multiply each species by its own factor
    pub fn component_mul(&self, factors: &[f64; 4]) -> Self {
        Self {
            values: self.values.component_mul(&Vector4::from_column_slice(factors)),
        }
    }

    /// True when no component is NaN or infinite
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|x| x.is_finite())
    }

    /// First species (in column order) whose concentration is below zero
    pub fn first_negative(&self) -> Option<(Species, f64)> {
        Species::ALL
            .into_iter()
            .map(|s| (s, self.get(s)))
            .find(|(_, value)| *value < 0.0)
    }

    /// Replace negative concentrations by zero
    pub fn clamp_non_negative(&self) -> Self {
        self.map(|x| x.max(0.0))
    }

    /// Largest absolute component
    pub fn max_abs(&self) -> f64 {
        self.values.amax()
    }
}

impl Default for ConcentrationState {
    fn default() -> Self {
        Self::zeros()
    }
}

impl From<[f64; 4]> for ConcentrationState {
    fn from(values: [f64; 4]) -> Self {
        Self::new(values[0], values[1], values[2], values[3])
    }
}

impl From<ConcentrationState> for [f64; 4] {
    fn from(state: ConcentrationState) -> Self {
        state.to_array()
    }
}

// Operator overloading for numerical operations

impl std::ops::Add for ConcentrationState {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            values: self.values + rhs.values,
        }
    }
}

impl std::ops::Sub for ConcentrationState {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            values: self.values - rhs.values,
        }
    }
}

impl std::ops::Mul<f64> for ConcentrationState {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self {
            values: self.values * scalar,
        }
    }
}

impl std::ops::Div<f64> for ConcentrationState {
    type Output = Self;

    fn div(self, scalar: f64) -> Self::Output {
        Self {
            values: self.values / scalar,
        }
    }
}

impl fmt::Display for ConcentrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[A={:.6}, B={:.6}, C={:.6}, D={:.6}]",
            self.values[0], self.values[1], self.values[2], self.values[3]
        )
    }
}

// =================================================================================================
// Kinetic Model Trait
// =================================================================================================

/// Trait for kinetic models
///
/// # Responsibility
/// Computes the right-hand side f(y) of dy/dt = f(y) at a given state.
/// Does NOT integrate it (that's the integrator's job).
///
/// The model provides the "chemistry" (rate law), the integrator provides
/// the "numerics" (method to advance it in time).
pub trait KineticModel: Send + Sync {
    /// Time derivative of every concentration at `state`
    fn derivatives(&self, state: &ConcentrationState) -> ConcentrationState;

    /// Name of the model (used to display and logging)
    fn name(&self) -> &str;

    /// Description of the model (optional)
    fn description(&self) -> Option<&str> {
        None
    }
}

// =================================================================================================
// Tests
// =================================================================================================
