//! Dense trajectory of one phase
//!
//! A trajectory is built once by an integrator and never mutated afterward
//! (apart from descriptive metadata). Time points are strictly increasing.

use ndarray::Array2;
use std::collections::BTreeMap;

use crate::error::{Result, SimulationError};
use crate::physics::{ConcentrationState, Species};

/// Sampled solution (t, [A, B, C, D]) over one time span
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    time_points: Vec<f64>,
    states: Vec<ConcentrationState>,
    metadata: BTreeMap<String, String>,
}

impl Trajectory {
    /// Build a trajectory from matching time and state series
    ///
    /// # Errors
    ///
    /// `Configuration` when the series are empty, differ in length, or the
    /// time points are not strictly increasing.
    pub fn new(time_points: Vec<f64>, states: Vec<ConcentrationState>) -> Result<Self> {
        if time_points.is_empty() {
            return Err(SimulationError::config("trajectory must contain at least one sample"));
        }
        if time_points.len() != states.len() {
            return Err(SimulationError::config(format!(
                "trajectory length mismatch: {} time points versus {} states",
                time_points.len(),
                states.len()
            )));
        }
        if time_points.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SimulationError::config(
                "trajectory time points must be strictly increasing",
            ));
        }

        Ok(Self {
            time_points,
            states,
            metadata: BTreeMap::new(),
        })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    /// Always false: a trajectory holds at least one sample
    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    pub fn time_points(&self) -> &[f64] {
        &self.time_points
    }

    pub fn states(&self) -> &[ConcentrationState] {
        &self.states
    }

    pub fn start_time(&self) -> f64 {
        self.time_points[0]
    }

    pub fn end_time(&self) -> f64 {
        self.time_points[self.time_points.len() - 1]
    }

    pub fn initial_state(&self) -> ConcentrationState {
        self.states[0]
    }

    /// Last sample: the authoritative end-of-phase state
    pub fn final_state(&self) -> ConcentrationState {
        self.states[self.states.len() - 1]
    }

    /// Iterate over (t, state) pairs
    pub fn samples(&self) -> impl Iterator<Item = (f64, &ConcentrationState)> {
        self.time_points.iter().copied().zip(self.states.iter())
    }

    /// Time series of one species
    pub fn species_series(&self, species: Species) -> Vec<f64> {
        self.states.iter().map(|s| s.get(species)).collect()
    }

    /// Concentrations as a (samples × 4) array, columns A, B, C, D
    pub fn concentration_array(&self) -> Array2<f64> {
        let mut array = Array2::zeros((self.states.len(), 4));
        for (mut row, state) in array.rows_mut().into_iter().zip(self.states.iter()) {
            for species in Species::ALL {
                row[species.index()] = state.get(species);
            }
        }
        array
    }

    /// True when every sample is finite
    pub fn is_finite(&self) -> bool {
        self.states.iter().all(ConcentrationState::is_finite)
    }

    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }
}
