//! Simulation scenario definition
//!
//! A scenario combines a reaction with the schedule of boundary events.
//! It is the "WHAT to simulate"; [`SimulationConfig`](crate::config::SimulationConfig)
//! is the "HOW".
//!
//! Two JSON shapes are understood:
//!
//! - the native serde form of [`Scenario`], events as tagged objects
//! - the tagged form of [`TaggedScenario`]: a list of boundary tags plus one
//!   effect array per parameter, indexed by boundary
//!
//! ```json
//! {
//!   "reaction": { "a": 1, "b": 3, "c": 2, "d": 0, "delta_H": -92 },
//!   "phase_changes": ["Temperature", "Volume/Pressure", "Addition"],
//!   "temp_effects": [0.2, 0.0, 0.0],
//!   "vol_effects": [0.0, 0.25, 0.0],
//!   "A_perturb_list": [0.0, 0.0, 0.5],
//!   "B_perturb_list": [0.0, 0.0, 0.0],
//!   "C_perturb_list": [0.0, 0.0, 0.0],
//!   "D_perturb_list": [0.0, 0.0, 0.0]
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::models::ReactionSpec;
use crate::solver::boundary::{BoundaryKind, Perturbation};

// =================================================================================================
// Run schedule
// =================================================================================================

/// Ordered boundary events of a run: N events make N + 1 phases
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunSchedule {
    events: Vec<Perturbation>,
}

impl RunSchedule {
    pub fn new(events: Vec<Perturbation>) -> Self {
        Self { events }
    }

    /// Schedule with a single phase and no boundary
    pub fn single_phase() -> Self {
        Self::default()
    }

    /// Schedule for an explicit number of phases
    ///
    /// # Errors
    ///
    /// `Configuration` when `phases` is zero or `events.len() != phases - 1`.
    pub fn with_phase_count(phases: usize, events: Vec<Perturbation>) -> Result<Self> {
        if phases == 0 {
            return Err(SimulationError::config("a run needs at least one phase"));
        }
        if events.len() != phases - 1 {
            return Err(SimulationError::config(format!(
                "{phases} phases need {} boundary events, got {}",
                phases - 1,
                events.len()
            )));
        }
        Ok(Self { events })
    }

    /// Build from boundary tags and per-parameter effect arrays
    ///
    /// # Errors
    ///
    /// `Configuration` for an unknown tag, or when an effect array needed by
    /// some boundary does not have exactly one entry per boundary.
    pub fn from_tagged<S: AsRef<str>>(tags: &[S], effects: &BoundaryEffects) -> Result<Self> {
        let boundaries = tags.len();
        effects.check_lengths(boundaries)?;

        let events = tags
            .iter()
            .enumerate()
            .map(|(i, tag)| {
                let kind: BoundaryKind = tag.as_ref().parse()?;
                effects.event(kind, i, boundaries)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { events })
    }

    pub fn events(&self) -> &[Perturbation] {
        &self.events
    }

    /// Event of boundary `index`, `None` past the last boundary
    pub fn event(&self, index: usize) -> Option<&Perturbation> {
        self.events.get(index)
    }

    pub fn boundary_count(&self) -> usize {
        self.events.len()
    }

    pub fn phase_count(&self) -> usize {
        self.events.len() + 1
    }

    /// Boundary tags, in order
    pub fn tags(&self) -> Vec<&'static str> {
        self.events.iter().map(|e| e.kind().tag()).collect()
    }

    /// Validate every event (hard limits, nominal-range warnings)
    pub fn validate(&self) -> Result<()> {
        self.events
            .iter()
            .enumerate()
            .try_for_each(|(i, event)| event.validate(i))
    }

    /// Parallel effect arrays describing this schedule
    pub fn to_effects(&self) -> BoundaryEffects {
        let n = self.events.len();
        let mut effects = BoundaryEffects::zeros(n);
        for (i, event) in self.events.iter().enumerate() {
            match *event {
                Perturbation::Temperature { effect } => effects.temp_effects[i] = effect,
                Perturbation::VolumePressure { effect } => effects.vol_effects[i] = effect,
                Perturbation::Addition { perturb } => {
                    effects.a_perturb[i] = perturb[0];
                    effects.b_perturb[i] = perturb[1];
                    effects.c_perturb[i] = perturb[2];
                    effects.d_perturb[i] = perturb[3];
                }
            }
        }
        effects
    }
}

// =================================================================================================
// Boundary effects
// =================================================================================================

/// Effect parameters of a tagged schedule, one entry per boundary
///
/// Arrays that no boundary reads may be left empty.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundaryEffects {
    #[serde(default)]
    pub temp_effects: Vec<f64>,
    #[serde(default)]
    pub vol_effects: Vec<f64>,
    #[serde(default, rename = "A_perturb_list")]
    pub a_perturb: Vec<f64>,
    #[serde(default, rename = "B_perturb_list")]
    pub b_perturb: Vec<f64>,
    #[serde(default, rename = "C_perturb_list")]
    pub c_perturb: Vec<f64>,
    #[serde(default, rename = "D_perturb_list")]
    pub d_perturb: Vec<f64>,
}

impl BoundaryEffects {
    /// All arrays of length `boundaries`, filled with zeros
    pub fn zeros(boundaries: usize) -> Self {
        Self {
            temp_effects: vec![0.0; boundaries],
            vol_effects: vec![0.0; boundaries],
            a_perturb: vec![0.0; boundaries],
            b_perturb: vec![0.0; boundaries],
            c_perturb: vec![0.0; boundaries],
            d_perturb: vec![0.0; boundaries],
        }
    }

    fn named_arrays(&self) -> [(&'static str, &[f64]); 6] {
        [
            ("temp_effects", &self.temp_effects),
            ("vol_effects", &self.vol_effects),
            ("A_perturb_list", &self.a_perturb),
            ("B_perturb_list", &self.b_perturb),
            ("C_perturb_list", &self.c_perturb),
            ("D_perturb_list", &self.d_perturb),
        ]
    }

    /// Non-empty arrays must cover every boundary
    fn check_lengths(&self, boundaries: usize) -> Result<()> {
        for (name, values) in self.named_arrays() {
            if !values.is_empty() && values.len() != boundaries {
                return Err(SimulationError::config(format!(
                    "{name} has {} entries for {boundaries} boundaries",
                    values.len()
                )));
            }
        }
        Ok(())
    }

    fn value(values: &[f64], name: &str, index: usize, boundaries: usize) -> Result<f64> {
        values.get(index).copied().ok_or_else(|| {
            SimulationError::config(format!(
                "{name} is missing but boundary {index} of {boundaries} needs it"
            ))
        })
    }

    fn event(&self, kind: BoundaryKind, index: usize, boundaries: usize) -> Result<Perturbation> {
        Ok(match kind {
            BoundaryKind::Temperature => Perturbation::Temperature {
                effect: Self::value(&self.temp_effects, "temp_effects", index, boundaries)?,
            },
            BoundaryKind::VolumePressure => Perturbation::VolumePressure {
                effect: Self::value(&self.vol_effects, "vol_effects", index, boundaries)?,
            },
            BoundaryKind::Addition => Perturbation::Addition {
                perturb: [
                    Self::value(&self.a_perturb, "A_perturb_list", index, boundaries)?,
                    Self::value(&self.b_perturb, "B_perturb_list", index, boundaries)?,
                    Self::value(&self.c_perturb, "C_perturb_list", index, boundaries)?,
                    Self::value(&self.d_perturb, "D_perturb_list", index, boundaries)?,
                ],
            },
        })
    }
}

// =================================================================================================
// Scenario
// =================================================================================================

/// Simulation scenario: a reaction and its boundary schedule
///
/// # Examples
///
/// ```rust
/// use equil_rs::models::ReactionSpec;
/// use equil_rs::physics::Species;
/// use equil_rs::solver::{Perturbation, RunSchedule, Scenario};
///
/// let haber = ReactionSpec::new(1, 3, 2, 0, -92.0).unwrap();
/// let schedule = RunSchedule::new(vec![
///     Perturbation::Temperature { effect: 0.2 },
///     Perturbation::VolumePressure { effect: -0.2 },
///     Perturbation::addition_of(Species::A, 0.5),
/// ]);
///
/// let scenario = Scenario::new(haber, schedule);
/// assert_eq!(scenario.phase_count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub reaction: ReactionSpec,
    #[serde(default)]
    pub schedule: RunSchedule,
}

impl Scenario {
    pub fn new(reaction: ReactionSpec, schedule: RunSchedule) -> Self {
        Self { reaction, schedule }
    }

    pub fn phase_count(&self) -> usize {
        self.schedule.phase_count()
    }

    pub fn validate(&self) -> Result<()> {
        self.schedule.validate()
    }

    /// Load the tagged JSON form (boundary tags and effect arrays)
    pub fn from_json(json: &str) -> Result<Self> {
        let tagged: TaggedScenario = serde_json::from_str(json)
            .map_err(|e| SimulationError::config(format!("invalid scenario file: {e}")))?;
        tagged.into_scenario()
    }

    /// Render to the tagged JSON form
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&TaggedScenario::from(self))
            .map_err(|e| SimulationError::config(format!("cannot serialize scenario: {e}")))
    }
}

/// On-disk tagged scenario form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedScenario {
    pub reaction: ReactionSpec,
    #[serde(default)]
    pub phase_changes: Vec<String>,
    #[serde(flatten)]
    pub effects: BoundaryEffects,
}

impl TaggedScenario {
    pub fn into_scenario(self) -> Result<Scenario> {
        let schedule = RunSchedule::from_tagged(&self.phase_changes, &self.effects)?;
        Ok(Scenario::new(self.reaction, schedule))
    }
}

impl From<&Scenario> for TaggedScenario {
    fn from(scenario: &Scenario) -> Self {
        Self {
            reaction: scenario.reaction,
            phase_changes: scenario
                .schedule
                .tags()
                .into_iter()
                .map(str::to_string)
                .collect(),
            effects: scenario.schedule.to_effects(),
        }
    }
}

// ================================================================================================
// Tests
// ================================================================================================
