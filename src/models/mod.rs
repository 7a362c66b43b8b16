//! Reaction models
//!
//! The only kinetic model of the crate is the reversible power-law reaction
//! aA + bB <-> cC + dD ([`ReversibleReaction`]). The integrators call
//! `derivatives` at every stage; the model owns the rate law, the integrator
//! the time stepping.
//!
//! [`catalog`] provides named textbook reactions with reagent names, used by
//! the demos and by the answer key to phrase questions.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod catalog;
pub mod reaction;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use catalog::{ReactionPreset, ReagentNames};
pub use reaction::{RateConstants, ReactionSpec, ReversibleReaction, Thermicity};
