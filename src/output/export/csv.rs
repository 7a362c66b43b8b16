//! CSV export of simulation runs
//!
//! One row per sample: phase index, time, then the four concentrations.
//! The file opens in Excel, pandas, MATLAB and most data analysis tools.
//!
//! # Features
//!
//! - **Metadata support**: optional `#` header with reaction, solver and
//!   rate constants
//! - **Customizable**: delimiter, decimal separator, precision, column names
//! - **Downsampling**: keep `n` samples per phase, first and last included
//! - **Validation**: refuses empty runs and non-finite values
//!
//! # Example
//!
//! ```rust,ignore
//! use equil_rs::output::export::{export_run_csv, CsvConfig, CsvMetadata};
//!
//! let metadata = CsvMetadata::from_run(&run, &config);
//! let csv = CsvConfig::default().with_metadata(metadata);
//!
//! export_run_csv(&run, "haber.csv", Some(&csv))?;
//! ```
//!
//! **Output** (`haber.csv`):
//! ```csv
//! # Equilibrium Simulation Data
//! # Generated: 2026-02-11T15:30:00+00:00
//! # Reaction: 1A + 3B <-> 2C + 0D (ΔH = -92 kJ/mol)
//! # Solver: Dormand-Prince 5(4)
//! # Phase Length: 200
//! # Samples Per Phase: 1000
//! # Base Rate Constants: k1 = 0.02, k2 = 0.01
//! #
//! Phase,Time,A,B,C,D
//! 0,0.000000,1.000000,1.000000,0.000000,0.000000
//! ...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::config::SimulationConfig;
use crate::models::ReagentNames;
use crate::physics::Species;
use crate::solver::SimulationRun;

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while writing CSV files
#[derive(Error, Debug)]
pub enum CsvError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Empty data: the run contains no samples")]
    EmptyRun,

    #[error("Invalid data: NaN or Inf detected in phase {phase} at t = {time}")]
    NonFinite { phase: usize, time: f64 },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// # Example
///
/// ```rust
/// use equil_rs::output::export::CsvConfig;
///
/// let config = CsvConfig {
///     delimiter: ';',
///     precision: 10,
///     ..Default::default()
/// };
/// assert!(!config.include_metadata);
/// ```
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: char,

    /// Decimal separator (default: '.')
    pub decimal_separator: char,

    /// Number of decimal places for floating-point values (default: 6)
    pub precision: usize,

    /// Include metadata header comments (default: false)
    pub include_metadata: bool,

    /// Metadata to include in header
    pub metadata: Option<CsvMetadata>,

    /// Leading phase index column (default: true)
    pub include_phase: bool,

    /// Header of the time column (default: "Time")
    pub time_header: String,

    /// Species names for the concentration headers (default: A, B, C, D)
    pub reagents: Option<ReagentNames>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            include_metadata: false,
            metadata: None,
            include_phase: true,
            time_header: "Time".to_string(),
            reagents: None,
        }
    }
}

impl CsvConfig {
    /// European CSV format (semicolon, comma for decimal)
    pub fn european() -> Self {
        Self {
            delimiter: ';',
            decimal_separator: ',',
            ..Default::default()
        }
    }

    /// High precision (12 decimal places)
    pub fn high_precision() -> Self {
        Self {
            precision: 12,
            ..Default::default()
        }
    }

    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Builder pattern: enable metadata
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = Some(metadata);
        self
    }

    /// Builder pattern: name the concentration columns after the reagents
    pub fn with_reagents(mut self, reagents: ReagentNames) -> Self {
        self.reagents = Some(reagents);
        self
    }

    fn validate(&self) -> Result<(), CsvError> {
        if self.delimiter == self.decimal_separator {
            return Err(CsvError::InvalidConfig(format!(
                "delimiter and decimal separator are both '{}'",
                self.delimiter
            )));
        }
        Ok(())
    }

    fn species_header(&self, species: Species) -> String {
        match &self.reagents {
            Some(reagents) => reagents.display_name(species),
            None => species.label().to_string(),
        }
    }
}

/// Metadata for CSV header comments
///
/// Only fields that are set are written.
#[derive(Debug, Clone, Default)]
pub struct CsvMetadata {
    /// Reaction, e.g. "1A + 3B <-> 2C + 0D (ΔH = -92 kJ/mol)"
    pub reaction: Option<String>,

    /// Integrator name
    pub solver_name: Option<String>,

    pub phase_length: Option<f64>,

    pub samples_per_phase: Option<usize>,

    /// Base rate constants, preformatted
    pub base_constants: Option<String>,

    /// Additional custom parameters
    pub custom: Vec<(String, String)>,
}

impl CsvMetadata {
    /// Collect metadata from a finished run and its settings
    pub fn from_run(run: &SimulationRun, config: &SimulationConfig) -> Self {
        Self {
            reaction: Some(run.reaction().to_string()),
            solver_name: Some(run.solver_name().to_string()),
            phase_length: Some(config.phase_length),
            samples_per_phase: Some(config.samples_per_phase),
            base_constants: Some(config.base_constants.to_string()),
            custom: Vec::new(),
        }
    }

    /// Add custom parameter
    pub fn add_custom(&mut self, key: &str, value: &str) {
        self.custom.push((key.to_string(), value.to_string()));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Write metadata header comments
fn write_metadata_header<W: Write>(writer: &mut W, metadata: &CsvMetadata) -> Result<(), CsvError> {
    writeln!(writer, "# Equilibrium Simulation Data")?;
    writeln!(writer, "# Generated: {}", chrono::Utc::now().to_rfc3339())?;

    if let Some(reaction) = &metadata.reaction {
        writeln!(writer, "# Reaction: {}", reaction)?;
    }
    if let Some(solver) = &metadata.solver_name {
        writeln!(writer, "# Solver: {}", solver)?;
    }
    if let Some(length) = metadata.phase_length {
        writeln!(writer, "# Phase Length: {}", length)?;
    }
    if let Some(samples) = metadata.samples_per_phase {
        writeln!(writer, "# Samples Per Phase: {}", samples)?;
    }
    if let Some(constants) = &metadata.base_constants {
        writeln!(writer, "# Base Rate Constants: {}", constants)?;
    }
    for (key, value) in &metadata.custom {
        writeln!(writer, "# {}: {}", key, value)?;
    }

    writeln!(writer, "#")?;
    Ok(())
}

/// Format number with configured precision and decimal separator
fn format_number(value: f64, config: &CsvConfig) -> String {
    let formatted = format!("{:.prec$}", value, prec = config.precision);

    if config.decimal_separator != '.' {
        formatted.replace('.', &config.decimal_separator.to_string())
    } else {
        formatted
    }
}

/// Quote a header cell holding the delimiter, a quote or a line break
///
/// Inner quotes are doubled (RFC 4180).
fn quote_cell(cell: &str, delimiter: char) -> String {
    if cell.contains(delimiter) || cell.contains('"') || cell.contains('\n') {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Indices of `n` samples spread evenly over `len`, first and last included
pub(crate) fn downsample_indices(len: usize, n: Option<usize>) -> Vec<usize> {
    match n {
        Some(n) if n >= 2 && n < len => {
            let stride = (len - 1) as f64 / (n - 1) as f64;
            let mut indices: Vec<usize> = (0..n).map(|i| (i as f64 * stride).round() as usize).collect();
            indices.dedup();
            indices
        }
        _ => (0..len).collect(),
    }
}

// =============================================================================
// Export Functions
// =============================================================================

/// Write a run as CSV to any writer
///
/// # Errors
///
/// - `EmptyRun` when the run has no phase
/// - `NonFinite` on the first NaN or Inf sample
/// - `InvalidConfig` when delimiter and decimal separator collide
/// - `Io` from the writer
pub fn write_run_csv<W: Write>(
    run: &SimulationRun,
    writer: &mut W,
    n_points: Option<usize>,
    configuration: &CsvConfig,
) -> Result<(), CsvError> {
    // ============================= Validation =============================

    configuration.validate()?;

    if run.phases().is_empty() {
        return Err(CsvError::EmptyRun);
    }

    for phase in run.phases() {
        if let Some((time, _)) = phase.trajectory.samples().find(|(_, s)| !s.is_finite()) {
            return Err(CsvError::NonFinite {
                phase: phase.index,
                time,
            });
        }
    }

    // ============================= Write Metadata =========================

    if configuration.include_metadata {
        if let Some(metadata) = &configuration.metadata {
            write_metadata_header(writer, metadata)?;
        }
    }

    // ============================= Write Header ===========================

    let delimiter = configuration.delimiter.to_string();
    let mut header = Vec::with_capacity(6);
    if configuration.include_phase {
        header.push("Phase".to_string());
    }
    header.push(configuration.time_header.clone());
    header.extend(Species::ALL.map(|s| configuration.species_header(s)));
    let header: Vec<String> = header
        .iter()
        .map(|cell| quote_cell(cell, configuration.delimiter))
        .collect();
    writeln!(writer, "{}", header.join(&delimiter))?;

    // ============================= Write Data =============================

    for phase in run.phases() {
        let times = phase.trajectory.time_points();
        let states = phase.trajectory.states();

        for i in downsample_indices(times.len(), n_points) {
            if configuration.include_phase {
                write!(writer, "{}{}", phase.index, delimiter)?;
            }
            write!(writer, "{}", format_number(times[i], configuration))?;
            for species in Species::ALL {
                write!(
                    writer,
                    "{}{}",
                    delimiter,
                    format_number(states[i].get(species), configuration)
                )?;
            }
            writeln!(writer)?;
        }
    }

    Ok(())
}

/// Export a run to a CSV file
///
/// Uses `CsvConfig::default()` when `configuration` is `None`.
pub fn export_run_csv<P: AsRef<Path>>(
    run: &SimulationRun,
    output_path: P,
    configuration: Option<&CsvConfig>,
) -> Result<(), CsvError> {
    let binding = CsvConfig::default();
    let configuration = configuration.unwrap_or(&binding);

    let mut writer = BufWriter::new(File::create(output_path)?);
    write_run_csv(run, &mut writer, None, configuration)?;
    writer.flush()?;

    Ok(())
}

// =============================================================================
// Exporter
// =============================================================================

/// CSV implementation of [`Exporter`](super::Exporter)
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    pub config: CsvConfig,
}

impl CsvExporter {
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }
}

impl super::Exporter for CsvExporter {
    type Error = CsvError;

    fn export(
        &self,
        run: &SimulationRun,
        n_points: Option<usize>,
        path: &Path,
    ) -> Result<(), CsvError> {
        let mut writer = BufWriter::new(File::create(path)?);
        write_run_csv(run, &mut writer, n_points, &self.config)?;
        writer.flush()?;
        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
