//! CSV export of concentration histories and profiles
//!
//! The produced files are read by external plotting tools (gnuplot,
//! pandas, spreadsheets). One row per stored time step, one column per grid
//! point.
//!
//! # Quick Examples
//!
//! ## History Export
//!
//! ```rust,ignore
//! use plume_rs::output::export::export_history_csv;
//!
//! export_history_csv(&result, "upstream.csv", None)?;
//! ```
//!
//! **Output** (`upstream.csv`, N = 7):
//! ```csv
//! Step,Time (s),c[0],c[1],c[2],c[3],c[4],c[5],c[6]
//! 0,0.000000,0.000000,0.000000,600.000000,0.000000,0.000000,0.000000,0.000000
//! 1,30.000000,...
//! ...
//! ```
//!
//! ## With Metadata and Downsampling
//!
//! ```rust,ignore
//! use plume_rs::output::export::{export_history_csv, CsvConfig, CsvMetadata};
//!
//! let config = CsvConfig::default()
//!     .with_metadata(CsvMetadata::from_result(&result))
//!     .max_lines(500);
//!
//! export_history_csv(&result, "upstream.csv", Some(&config))?;
//! ```
//!
//! **Output**:
//! ```csv
//! # Advection-Diffusion Simulation Data
//! # Generated: 2026-10-19T15:30:00+00:00
//! # dt: 30
//! # scheme: Upstream
//! # time steps: 50
//! #
//! Step,Time (s),c[0],...
//! ```

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::Array2;
use thiserror::Error;

use crate::output::export::Exporter;
use crate::physics::PhysicalParameters;
use crate::solver::SimulationResult;

// =============================================================================
// Errors
// =============================================================================

/// Failure while writing a CSV file
#[derive(Debug, Error)]
pub enum CsvError {
    /// File creation or write failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing to write
    #[error("empty data: {0}")]
    EmptyData(String),

    /// NaN/Inf values or inconsistent lengths
    #[error("invalid data: {0}")]
    InvalidData(String),
}

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// # Fields
///
/// - `delimiter`: Column separator (default: ',')
/// - `decimal_separator`: Decimal point character (default: '.')
/// - `precision`: Number of decimal places (default: 6)
/// - `include_metadata`: Add header comments with simulation info
/// - `metadata`: Simulation metadata to include
/// - `max_lines`: Keep at most this many time steps (default: all)
///
/// # Example
///
/// ```rust
/// use plume_rs::output::export::CsvConfig;
///
/// let config = CsvConfig {
///     delimiter: ';',
///     precision: 10,
///     ..Default::default()
/// };
/// assert!(config.max_lines.is_none());
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

    /// Downsample histories to at most this many rows
    pub max_lines: Option<usize>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            decimal_separator: '.',
            precision: 6,
            include_metadata: false,
            metadata: None,
            max_lines: None,
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

    /// Builder pattern: enable metadata
    pub fn with_metadata(mut self, metadata: CsvMetadata) -> Self {
        self.include_metadata = true;
        self.metadata = Some(metadata);
        self
    }

    /// Builder pattern: limit the number of history rows
    pub fn max_lines(mut self, max_lines: usize) -> Self {
        self.max_lines = Some(max_lines);
        self
    }
}

/// Metadata for CSV header comments
///
/// Entries are written as `# key: value` lines, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvMetadata {
    pub entries: Vec<(String, String)>,
}

impl CsvMetadata {
    /// Metadata of a completed run, sorted by key
    pub fn from_result(result: &SimulationResult) -> Self {
        let mut entries: Vec<(String, String)> = result
            .metadata
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        entries.sort();
        Self { entries }
    }

    /// Append the physical constants of the run
    pub fn with_parameters(mut self, parameters: &PhysicalParameters) -> Self {
        self.add("velocity (m/s)", &parameters.velocity.to_string());
        self.add("diffusivity (m2/s)", &parameters.diffusivity.to_string());
        self.add("source strength", &parameters.source_strength.to_string());
        self.add("dx (m)", &parameters.dx.to_string());
        self
    }

    /// Add custom entry
    pub fn add(&mut self, key: &str, value: &str) {
        self.entries.push((key.to_string(), value.to_string()));
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Write metadata header comments
fn write_metadata_header<W: Write>(out: &mut W, metadata: &CsvMetadata) -> Result<(), CsvError> {
    writeln!(out, "# Advection-Diffusion Simulation Data")?;

    let now = chrono::Utc::now();
    writeln!(out, "# Generated: {}", now.to_rfc3339())?;

    for (key, value) in &metadata.entries {
        writeln!(out, "# {}: {}", key, value)?;
    }

    writeln!(out, "#")?;
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

fn create(path: &Path, config: &CsvConfig) -> Result<BufWriter<File>, CsvError> {
    let mut out = BufWriter::new(File::create(path)?);
    if config.include_metadata {
        if let Some(metadata) = &config.metadata {
            write_metadata_header(&mut out, metadata)?;
        }
    }
    Ok(out)
}

/// Rows kept for `len` steps: every step, or `ceil(len / max_lines)` apart
///
/// Same selection as [`SimulationResult::sampled_steps`].
fn selected_steps(len: usize, max_lines: Option<usize>) -> Vec<usize> {
    match max_lines {
        Some(max_lines) if max_lines > 0 => {
            let stride = len.div_ceil(max_lines).max(1);
            (0..len).step_by(stride).collect()
        }
        _ => (0..len).collect(),
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// CSV implementation of [`Exporter`]
#[derive(Debug, Clone, Default)]
pub struct CsvExporter {
    pub config: CsvConfig,
}

impl CsvExporter {
    /// Exporter with the given configuration
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Write any `(grid points × time steps)` table, one row per kept step
    ///
    /// # Errors
    ///
    /// - Empty table
    /// - `time_points` not matching the number of columns
    /// - NaN or Inf values
    /// - File creation errors
    pub fn export_table(
        &self,
        table: &Array2<f64>,
        time_points: &[f64],
        path: &Path,
    ) -> Result<(), CsvError> {
        // ============================= Validation =============================

        if table.is_empty() {
            return Err(CsvError::EmptyData("history table has no values".to_string()));
        }
        if time_points.len() != table.ncols() {
            return Err(CsvError::InvalidData(format!(
                "{} time points for {} stored steps",
                time_points.len(),
                table.ncols()
            )));
        }
        if let Some(((i, step), _)) = table.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(CsvError::InvalidData(format!(
                "NaN or Inf at grid point {i}, step {step}"
            )));
        }

        let config = &self.config;
        let d = config.delimiter;
        let mut out = create(path, config)?;

        // ============================= Write Header ===========================

        write!(out, "Step{d}Time (s)")?;
        for i in 0..table.nrows() {
            write!(out, "{d}c[{i}]")?;
        }
        writeln!(out)?;

        // ============================= Write Data =============================

        for step in selected_steps(table.ncols(), config.max_lines) {
            write!(out, "{step}{d}{}", format_number(time_points[step], config))?;
            for value in table.column(step) {
                write!(out, "{d}{}", format_number(*value, config))?;
            }
            writeln!(out)?;
        }

        out.flush()?;
        Ok(())
    }
}

impl Exporter for CsvExporter {
    type Error = CsvError;

    fn export_history(&self, result: &SimulationResult, path: &Path) -> Result<(), CsvError> {
        self.export_table(&result.numeric, &result.time_points, path)
    }

    fn export_profile(&self, x: &[f64], values: &[f64], path: &Path) -> Result<(), CsvError> {
        // ============================= Validation =============================

        if x.is_empty() || values.is_empty() {
            return Err(CsvError::EmptyData(
                "coordinates and values must not be empty".to_string(),
            ));
        }
        if x.len() != values.len() {
            return Err(CsvError::InvalidData(format!(
                "{} coordinates versus {} values",
                x.len(),
                values.len()
            )));
        }
        if x.iter().chain(values).any(|v| !v.is_finite()) {
            return Err(CsvError::InvalidData("NaN or Inf detected in profile".to_string()));
        }

        let config = &self.config;
        let d = config.delimiter;
        let mut out = create(path, config)?;

        writeln!(out, "x (m){d}c")?;
        for (xi, ci) in x.iter().zip(values) {
            writeln!(out, "{}{d}{}", format_number(*xi, config), format_number(*ci, config))?;
        }

        out.flush()?;
        Ok(())
    }
}

// =============================================================================
// Export Functions
// =============================================================================

/// Export the numeric history of a run
///
/// # Example
///
/// ```rust,ignore
/// export_history_csv(&result, "upstream.csv", None)?;
/// ```
pub fn export_history_csv(
    result: &SimulationResult,
    output_path: impl AsRef<Path>,
    configuration: Option<&CsvConfig>,
) -> Result<(), CsvError> {
    CsvExporter::new(configuration.cloned().unwrap_or_default())
        .export_history(result, output_path.as_ref())
}

/// Export the analytic history of a run, when it was tracked
pub fn export_analytic_csv(
    result: &SimulationResult,
    output_path: impl AsRef<Path>,
    configuration: Option<&CsvConfig>,
) -> Result<(), CsvError> {
    let analytic = result.analytic.as_ref().ok_or_else(|| {
        CsvError::EmptyData("the run did not track the analytic solution".to_string())
    })?;
    CsvExporter::new(configuration.cloned().unwrap_or_default()).export_table(
        analytic,
        &result.time_points,
        output_path.as_ref(),
    )
}

/// Export a single profile `c(x)`
pub fn export_profile_csv(
    x: &[f64],
    values: &[f64],
    output_path: impl AsRef<Path>,
    configuration: Option<&CsvConfig>,
) -> Result<(), CsvError> {
    CsvExporter::new(configuration.cloned().unwrap_or_default()).export_profile(
        x,
        values,
        output_path.as_ref(),
    )
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicalParameters;
    use crate::solver::{Scenario, SchemeKind, Simulation, SolverConfiguration};
    use nalgebra::DVector;
    use std::fs;
    use tempfile::NamedTempFile;

    fn run(time_steps: usize, analytic: bool) -> SimulationResult {
        let mut scenario = Scenario::new(SchemeKind::Upstream.build(), PhysicalParameters::default());
        scenario.track_analytic = analytic;
        Simulation::run(&scenario, &SolverConfiguration::new(7, time_steps, 30.0)).unwrap()
    }

    fn data_lines(content: &str) -> Vec<&str> {
        content.lines().filter(|l| !l.starts_with('#')).collect()
    }

    #[test]
    fn test_history_layout() {
        let file = NamedTempFile::new().unwrap();
        export_history_csv(&run(3, false), file.path(), None).unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        let lines = data_lines(&content);

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Step,Time (s),c[0],c[1],c[2],c[3],c[4],c[5],c[6]");
        assert_eq!(
            lines[1],
            "0,0.000000,0.000000,0.000000,600.000000,0.000000,0.000000,0.000000,0.000000"
        );
        assert!(lines[3].starts_with("2,60.000000,"));
    }

    #[test]
    fn test_downsampling() {
        let file = NamedTempFile::new().unwrap();
        let config = CsvConfig::default().max_lines(4);
        export_history_csv(&run(10, false), file.path(), Some(&config)).unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        let steps: Vec<&str> = data_lines(&content)[1..]
            .iter()
            .map(|l| l.split(',').next().unwrap())
            .collect();

        // ceil(10 / 4) = 3
        assert_eq!(steps, vec!["0", "3", "6", "9"]);
    }

    #[test]
    fn test_metadata_header() {
        let result = run(2, false);
        let file = NamedTempFile::new().unwrap();
        let config = CsvConfig::default().with_metadata(
            CsvMetadata::from_result(&result).with_parameters(&PhysicalParameters::default()),
        );
        export_history_csv(&result, file.path(), Some(&config)).unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        assert!(content.starts_with("# Advection-Diffusion Simulation Data\n# Generated: "));
        assert!(content.contains("# scheme: Upstream"));
        assert!(content.contains("# velocity (m/s): 3.39"));
        assert_eq!(data_lines(&content).len(), 3);
    }

    #[test]
    fn test_european_format() {
        let file = NamedTempFile::new().unwrap();
        export_profile_csv(&[0.0, 1000.0], &[1.5, 0.25], file.path(), Some(&CsvConfig::european()))
            .unwrap();

        let content = fs::read_to_string(file.path()).unwrap();
        assert_eq!(content, "x (m);c\n0,000000;1,500000\n1000,000000;0,250000\n");
    }

    #[test]
    fn test_analytic_export() {
        let file = NamedTempFile::new().unwrap();
        export_analytic_csv(&run(3, true), file.path(), None).unwrap();
        assert_eq!(data_lines(&fs::read_to_string(file.path()).unwrap()).len(), 4);

        assert!(matches!(
            export_analytic_csv(&run(3, false), file.path(), None),
            Err(CsvError::EmptyData(_))
        ));
    }

    #[test]
    fn test_invalid_data_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let mut result = run(2, false);
        result.numeric[[1, 1]] = f64::NAN;

        assert!(matches!(
            export_history_csv(&result, file.path(), None),
            Err(CsvError::InvalidData(_))
        ));
        assert!(matches!(
            export_profile_csv(&[0.0, 1.0], &[1.0], file.path(), None),
            Err(CsvError::InvalidData(_))
        ));
        assert!(matches!(
            export_profile_csv(&[], &[], file.path(), None),
            Err(CsvError::EmptyData(_))
        ));
    }

    #[test]
    fn test_empty_history_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        let empty = SimulationResult::new(Array2::zeros((3, 0)), None, vec![], DVector::zeros(3));

        assert!(matches!(
            export_history_csv(&empty, file.path(), None),
            Err(CsvError::EmptyData(_))
        ));
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.csv");

        assert!(matches!(
            export_history_csv(&run(2, false), &path, None),
            Err(CsvError::Io(_))
        ));
    }
}
