//! Export module for simulation runs.
//!
//! # Architecture
//!
//! This module defines the [`Exporter`] trait that abstracts the export format.
//! Each format is an independent implementation in its own sub-module, so
//! adding a format means adding a file.
//!
//! # Available formats
//!
//! | Format  | Module    |
//! |---------|-----------|
//! | CSV     | [`csv`]   |
//!
//! # Usage example
//!
//! ```rust,ignore
//! use equil_rs::output::export::{CsvExporter, Exporter};
//!
//! let exporter = CsvExporter::default();
//!
//! // Full export (all samples)
//! exporter.export(&run, None, Path::new("haber.csv"))?;
//!
//! // 100 samples per phase
//! exporter.export(&run, Some(100), Path::new("haber_light.csv"))?;
//! ```

pub mod csv;

pub use csv::{export_run_csv, write_run_csv, CsvConfig, CsvError, CsvExporter, CsvMetadata};

use std::path::Path;

use crate::solver::SimulationRun;

/// Abstraction trait for all export formats.
///
/// # Associated type `Error`
///
/// Each format manages its own errors via the associated type, so the
/// caller can react precisely based on the error type.
///
/// # Parameter `n_points`
///
/// - `None`: exports every sample
/// - `Some(n)`: keeps `n` evenly spread samples per phase, always including
///   the first and the last one (the boundary values)
pub trait Exporter {
    /// Error type specific to this export format.
    type Error: std::error::Error;

    /// Exports every phase of a run.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is invalid, or if the run is empty or
    /// holds non-finite values.
    fn export(
        &self,
        run: &SimulationRun,
        n_points: Option<usize>,
        path: &Path,
    ) -> Result<(), Self::Error>;
}
