//! Output module for simulation runs
//!
//! - **Export**: CSV data export for external analysis
//! - **Answer key**: ground-truth quiz answers derived from a run
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← This file
//! ├── answer_key.rs       ← Quiz labels per boundary
//! └── export/             ← Data export
//!     ├── mod.rs
//!     └── csv.rs
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use equil_rs::output::{export_run_csv, AnswerKey};
//!
//! export_run_csv(&run, "haber.csv", None)?;
//!
//! let key = AnswerKey::from_run(&run, Some(&preset.reagents));
//! println!("{}", key.grade(&["Increase in Temperature"]));
//! ```

pub mod answer_key;
pub mod export;

pub use answer_key::{AnswerKey, BoundaryAnswer, Direction, QuizScore};
pub use export::{export_run_csv, CsvConfig, CsvError, CsvExporter, CsvMetadata, Exporter};
