//! Catalog of textbook equilibria
//!
//! Six reactions used for Le Chatelier exercises, mapped onto the fixed
//! form aA + bB <-> cC + dD. Species that do not take part carry a zero
//! coefficient and an empty reagent name.
//!
//! | Reaction                         | a | b | c | d | ΔH (kJ/mol) |
//! |----------------------------------|---|---|---|---|-------------|
//! | Haber process                    | 1 | 3 | 2 | 0 | −92         |
//! | Contact process                  | 2 | 1 | 2 | 0 | −197        |
//! | Ethanol fermentation             | 1 | 0 | 2 | 2 | −218        |
//! | Calcium carbonate decomposition  | 1 | 0 | 1 | 1 | +178        |
//! | Ammonium chloride dissolution    | 1 | 0 | 1 | 1 | +15         |
//! | Ammonium nitrate dissolution     | 1 | 0 | 1 | 1 | +25         |

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::models::reaction::ReactionSpec;
use crate::physics::Species;

/// Display names of the four species of a preset
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReagentNames {
    pub reactant1: String,
    pub reactant2: String,
    pub product1: String,
    pub product2: String,
}

impl ReagentNames {
    pub fn new(reactant1: &str, reactant2: &str, product1: &str, product2: &str) -> Self {
        Self {
            reactant1: reactant1.to_string(),
            reactant2: reactant2.to_string(),
            product1: product1.to_string(),
            product2: product2.to_string(),
        }
    }

    /// Name of a species, `None` when the preset leaves it blank
    pub fn name_of(&self, species: Species) -> Option<&str> {
        let name = match species {
            Species::A => &self.reactant1,
            Species::B => &self.reactant2,
            Species::C => &self.product1,
            Species::D => &self.product2,
        };
        if name.is_empty() { None } else { Some(name.as_str()) }
    }

    /// Name of a species, falling back to its letter
    pub fn display_name(&self, species: Species) -> String {
        self.name_of(species)
            .map(str::to_string)
            .unwrap_or_else(|| species.label().to_string())
    }
}

/// A named reaction ready to be simulated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionPreset {
    pub name: String,
    pub spec: ReactionSpec,
    pub reagents: ReagentNames,
}

fn preset(
    name: &str,
    coefficients: [i64; 4],
    delta_h: f64,
    reagents: [&str; 4],
) -> Result<ReactionPreset> {
    let [a, b, c, d] = coefficients;
    Ok(ReactionPreset {
        name: name.to_string(),
        spec: ReactionSpec::new(a, b, c, d, delta_h)?,
        reagents: ReagentNames::new(reagents[0], reagents[1], reagents[2], reagents[3]),
    })
}

/// All catalog reactions, exothermic ones first
pub fn presets() -> Vec<ReactionPreset> {
    let entries = [
        preset("Haber Process (N₂ + 3H₂ ↔ 2NH₃)", [1, 3, 2, 0], -92.0, ["N₂", "H₂", "NH₃", ""]),
        preset("Contact Reaction (2SO₂ + O₂ ↔ 2SO₃)", [2, 1, 2, 0], -197.0, ["SO₂", "O₂", "SO₃", ""]),
        preset(
            "Ethanol Production (C₆H₁₂O₆ ↔ 2C₂H₅OH + 2CO₂)",
            [1, 0, 2, 2],
            -218.0,
            ["C₆H₁₂O₆", "", "C₂H₅OH", "CO₂"],
        ),
        preset(
            "Calcium Carbonate Decomposition (CaCO₃ ↔ CaO + CO₂)",
            [1, 0, 1, 1],
            178.0,
            ["CaCO₃", "", "CaO", "CO₂"],
        ),
        preset(
            "Dissolution of Ammonium Chloride (NH₄Cl ↔ NH₄⁺ + Cl⁻)",
            [1, 0, 1, 1],
            15.0,
            ["NH₄Cl", "", "NH₄⁺", "Cl⁻"],
        ),
        preset(
            "Dissolution of Ammonium Nitrate (NH₄NO₃ ↔ NH₄⁺ + NO₃⁻)",
            [1, 0, 1, 1],
            25.0,
            ["NH₄NO₃", "", "NH₄⁺", "NO₃⁻"],
        ),
    ];

    // Every entry is a valid literal; a failure here is a typo in the table.
    entries.into_iter().filter_map(|entry| entry.ok()).collect()
}

/// Look up a preset by full name or by a case-insensitive prefix
/// ("haber", "contact", ...)
pub fn find(name: &str) -> Result<ReactionPreset> {
    let needle = name.trim().to_lowercase();
    presets()
        .into_iter()
        .find(|p| p.name == name || p.name.to_lowercase().starts_with(&needle))
        .ok_or_else(|| SimulationError::config(format!("unknown reaction preset '{name}'")))
}

/// The Haber process, the running example of the quiz
pub fn haber_process() -> Result<ReactionPreset> {
    find("Haber")
}
