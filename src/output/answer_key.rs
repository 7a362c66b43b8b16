//! Quiz answer key
//!
//! For every boundary of a finished run, the correct answer to "what change
//! occurred here?" together with three distractors. Answers are derived from
//! the recorded [`BoundaryRecord`]s, so they hold for any schedule, not only
//! for the ones generated by a quiz.
//!
//! | Boundary kind   | Correct label                              |
//! |-----------------|--------------------------------------------|
//! | Temperature     | "Increase in Temperature" / "Decrease in Temperature" |
//! | Volume/Pressure | "Increase in Volume" / "Decrease in Volume" |
//! | Addition        | "Addition of N₂", "Removal of H₂", ...      |
//!
//! Boundaries are numbered from 1 in labels and lookups, like in the quiz.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::ReagentNames;
use crate::physics::Species;
use crate::solver::{BoundaryKind, BoundaryRecord, Perturbation, SimulationRun};

/// Direction of a boundary change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Increase,
    Decrease,
    /// Addition raising some species and lowering others
    Mixed,
    Unchanged,
}

impl Direction {
    fn of(value: f64) -> Self {
        if value > 0.0 {
            Direction::Increase
        } else if value < 0.0 {
            Direction::Decrease
        } else {
            Direction::Unchanged
        }
    }
}

/// Correct answer and distractors of one boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryAnswer {
    /// Boundary number, starting at 1
    pub boundary: usize,
    pub kind: BoundaryKind,
    pub direction: Direction,

    /// Species changed by an addition, empty for the other kinds
    pub species: Vec<Species>,

    pub label: String,
    pub distractors: Vec<String>,
}

impl BoundaryAnswer {
    /// Build the answer of one recorded boundary
    pub fn from_record(record: &BoundaryRecord, reagents: Option<&ReagentNames>) -> Self {
        let first_reactant = format!("Addition of {}", species_name(Species::A, reagents));

        let (direction, species, label, distractors) = match record.event {
            Perturbation::Temperature { effect } => {
                let direction = Direction::of(effect);
                (
                    direction,
                    Vec::new(),
                    change_label(direction, "Temperature"),
                    vec![
                        change_label(opposite(direction), "Temperature"),
                        "Increase in Volume".to_string(),
                        first_reactant,
                    ],
                )
            }
            Perturbation::VolumePressure { effect } => {
                let direction = Direction::of(effect);
                (
                    direction,
                    Vec::new(),
                    change_label(direction, "Volume"),
                    vec![
                        change_label(opposite(direction), "Volume"),
                        "Increase in Temperature".to_string(),
                        first_reactant,
                    ],
                )
            }
            Perturbation::Addition { perturb } => {
                let changed: Vec<Species> = Species::ALL
                    .into_iter()
                    .filter(|s| perturb[s.index()] != 0.0)
                    .collect();
                let direction = addition_direction(&changed, &perturb);
                let label = addition_label(&changed, &perturb, reagents);

                let other = Species::ALL
                    .into_iter()
                    .find(|s| !changed.contains(s) && record_participates(record, *s));
                let first = match other {
                    Some(s) => format!("Addition of {}", species_name(s, reagents)),
                    None => "Decrease in Volume".to_string(),
                };

                (
                    direction,
                    changed,
                    label,
                    vec![
                        first,
                        "Increase in Temperature".to_string(),
                        "Decrease in Temperature".to_string(),
                    ],
                )
            }
        };

        Self {
            boundary: record.index + 1,
            kind: record.kind(),
            direction,
            species,
            label,
            distractors,
        }
    }

    /// Correct label first, then the distractors
    ///
    /// Presentation order (shuffling) is left to the caller.
    pub fn options(&self) -> Vec<String> {
        std::iter::once(self.label.clone())
            .chain(self.distractors.iter().cloned())
            .collect()
    }

    pub fn is_correct(&self, submitted: &str) -> bool {
        submitted.trim() == self.label
    }
}

/// Answers of every boundary of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerKey {
    answers: Vec<BoundaryAnswer>,
}

impl AnswerKey {
    /// Derive the key from a finished run
    ///
    /// Without reagent names, species are called R1, R2, P1 and P2.
    pub fn from_run(run: &SimulationRun, reagents: Option<&ReagentNames>) -> Self {
        Self {
            answers: run
                .boundaries()
                .iter()
                .map(|record| BoundaryAnswer::from_record(record, reagents))
                .collect(),
        }
    }

    pub fn answers(&self) -> &[BoundaryAnswer] {
        &self.answers
    }

    /// Answer of boundary `number`, counting from 1
    pub fn answer(&self, number: usize) -> Option<&BoundaryAnswer> {
        number.checked_sub(1).and_then(|i| self.answers.get(i))
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }

    /// Grade one submission per boundary, in boundary order
    ///
    /// Missing submissions count as wrong; extra ones are ignored.
    pub fn grade<S: AsRef<str>>(&self, submissions: &[S]) -> QuizScore {
        let results: Vec<bool> = self
            .answers
            .iter()
            .enumerate()
            .map(|(i, answer)| {
                submissions
                    .get(i)
                    .is_some_and(|s| answer.is_correct(s.as_ref()))
            })
            .collect();

        QuizScore {
            correct: results.iter().filter(|ok| **ok).count(),
            total: results.len(),
            results,
        }
    }
}

/// Outcome of grading a quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizScore {
    pub correct: usize,
    pub total: usize,

    /// Per boundary, in order
    pub results: Vec<bool>,
}

impl fmt::Display for QuizScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "You got {} out of {} correct.", self.correct, self.total)
    }
}

// =================================================================================================
// Labels
// =================================================================================================

fn species_name(species: Species, reagents: Option<&ReagentNames>) -> String {
    reagents
        .and_then(|r| r.name_of(species))
        .map(str::to_string)
        .unwrap_or_else(|| {
            match species {
                Species::A => "R1",
                Species::B => "R2",
                Species::C => "P1",
                Species::D => "P2",
            }
            .to_string()
        })
}

fn change_label(direction: Direction, quantity: &str) -> String {
    match direction {
        Direction::Increase => format!("Increase in {quantity}"),
        Direction::Decrease => format!("Decrease in {quantity}"),
        Direction::Mixed | Direction::Unchanged => format!("No change in {quantity}"),
    }
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::Increase => Direction::Decrease,
        Direction::Decrease => Direction::Increase,
        // "No change" has no opposite; offer an increase instead
        Direction::Mixed | Direction::Unchanged => Direction::Increase,
    }
}

fn addition_direction(changed: &[Species], perturb: &[f64; 4]) -> Direction {
    let raised = changed.iter().any(|s| perturb[s.index()] > 0.0);
    let lowered = changed.iter().any(|s| perturb[s.index()] < 0.0);
    match (raised, lowered) {
        (true, true) => Direction::Mixed,
        (true, false) => Direction::Increase,
        (false, true) => Direction::Decrease,
        (false, false) => Direction::Unchanged,
    }
}

fn addition_label(changed: &[Species], perturb: &[f64; 4], reagents: Option<&ReagentNames>) -> String {
    if changed.is_empty() {
        return "No change".to_string();
    }

    changed
        .iter()
        .map(|s| {
            let verb = if perturb[s.index()] > 0.0 { "Addition" } else { "Removal" };
            format!("{verb} of {}", species_name(*s, reagents))
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

/// A species takes part when it was present before or after the boundary
fn record_participates(record: &BoundaryRecord, species: Species) -> bool {
    record.pre_state.get(species) != 0.0 || record.post_state.get(species) != 0.0
}

// =================================================================================================
// Tests
// =================================================================================================
