//! Output module for simulation results
//!
//! Plotting is left to external tools; this module hands them the
//! histories as plain data files.
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← This file
//! └── export/             ← Data export
//!     ├── mod.rs          ← Exporter trait
//!     └── csv.rs
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use plume_rs::output::{export_history_csv, CsvConfig};
//!
//! // At most 500 rows, the same budget a line plot would draw
//! export_history_csv(&result, "history.csv", Some(&CsvConfig::default().max_lines(500)))?;
//! ```

pub mod export;

pub use export::{
    CsvConfig, CsvError, CsvMetadata, Exporter, export_analytic_csv, export_history_csv,
    export_profile_csv,
};
