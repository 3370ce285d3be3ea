//! Export module for simulation results.
//!
//! # Architecture
//!
//! This module defines the [`Exporter`] trait that abstracts the export format.
//! Each format is an independent implementation in its own sub-module.
//!
//! # Available formats
//!
//! | Format  | Module          |
//! |---------|-----------------|
//! | CSV     | [`csv`]         |
//!
//! # Usage example
//!
//! ```rust,ignore
//! use plume_rs::output::export::{CsvExporter, CsvConfig, Exporter};
//! use std::path::Path;
//!
//! let exporter = CsvExporter::new(CsvConfig::default().max_lines(500));
//!
//! exporter.export_history(&result, Path::new("history.csv"))?;
//! exporter.export_profile(&x, &c, Path::new("final.csv"))?;
//! ```

pub mod csv;

pub use csv::{
    CsvConfig, CsvError, CsvExporter, CsvMetadata, export_analytic_csv, export_history_csv,
    export_profile_csv,
};

use std::path::Path;

use crate::solver::SimulationResult;

/// Abstraction trait for all export formats.
///
/// # Associated type `Error`
///
/// Each format manages its own errors via the associated type.
/// This avoids systematic boxing (`Box<dyn Error>`) and allows
/// the caller to react precisely based on the error type.
pub trait Exporter {
    /// Error type specific to this export format.
    type Error: std::error::Error;

    /// Exports the numeric history: one row per stored step, one column per
    /// grid point.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the path is invalid or the directory does not exist
    /// - `result` contains no data or non-finite values
    fn export_history(&self, result: &SimulationResult, path: &Path) -> Result<(), Self::Error>;

    /// Exports one profile `c(x)`.
    fn export_profile(&self, x: &[f64], values: &[f64], path: &Path) -> Result<(), Self::Error>;
}
