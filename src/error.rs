//! Error types for equil-rs.
//!
//! Configuration problems are reported before any integration starts.
//! Negative concentrations and numerical divergence are reported as soon as
//! they are detected, with the boundary or time at which they occurred.

use thiserror::Error;

use crate::physics::Species;

/// Unified error type for all simulation operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Invalid reaction, schedule, or simulation settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A perturbation left a species below zero (policy `Reject`)
    #[error(
        "Negative concentration after boundary {boundary}: [{species}] = {value} \
         (the perturbation removes more than the species holds; use the Clamp policy to floor it at zero)"
    )]
    NegativeConcentration {
        boundary: usize,
        species: Species,
        value: f64,
    },

    /// Non-finite values, step-size underflow or exhausted step budget
    #[error("Numerical divergence at t = {time}: {message}")]
    NumericalDivergence { time: f64, message: String },
}

impl SimulationError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        SimulationError::Configuration(message.into())
    }

    /// Creates a divergence error at a given time.
    pub fn divergence(time: f64, message: impl Into<String>) -> Self {
        SimulationError::NumericalDivergence {
            time,
            message: message.into(),
        }
    }

    /// True for errors raised before any integration work.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SimulationError::Configuration(_))
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SimulationError>;
