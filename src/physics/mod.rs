//! Kinetic models
//!
//! This module provides the traits and types shared by every reaction model.
//! A kinetic model encapsulates the rate law of a system: given the current
//! concentrations it returns their time derivatives.
//!
//! # Core Concepts
//!
//! - **Kinetic Model**: Computes dy/dt at a given state
//! - **Concentration State**: The four concentrations [A, B, C, D]
//! - **Species**: Type-safe identifier for one of A, B, C, D
//!
//! # Architecture
//!
//! Kinetic models are **separate from numerical integrators**:
//! - The model provides the **equations** (chemistry)
//! - The integrator provides the **method** to advance them (numerics)
//!
//! The same reaction can therefore be integrated with the adaptive
//! Dormand–Prince method or with fixed-step RK4 without touching the model.
//!
//! # Example
//!
//! ```rust
//! use equil_rs::physics::{ConcentrationState, KineticModel};
//!
//! struct Decay;
//!
//! impl KineticModel for Decay {
//!     fn derivatives(&self, state: &ConcentrationState) -> ConcentrationState {
//!         *state * -0.1
//!     }
//!     fn name(&self) -> &str { "Decay" }
//! }
//!
//! let slope = Decay.derivatives(&ConcentrationState::new(1.0, 0.0, 0.0, 0.0));
//! assert_eq!(slope.to_array()[0], -0.1);
//! ```

pub mod traits;

pub use traits::{ConcentrationState, KineticModel, Species};
