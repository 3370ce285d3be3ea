//! Run configuration files
//!
//! A JSON file bundles the physical parameters with the resolution of a run.
//! Every field is optional; missing ones take the documented defaults.
//!
//! ```json
//! {
//!   "parameters": { "velocity": 3.39, "diffusivity": 2.0 },
//!   "grid_points": 15,
//!   "time_steps": 100,
//!   "dt": 60.0
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::physics::PhysicalParameters;
use crate::solver::{SolverConfiguration, SolverError};

/// Default number of stored time steps
pub const DEFAULT_TIME_STEPS: usize = 50;

/// Default number of grid points
pub const DEFAULT_GRID_POINTS: usize = 9;

/// Default time step \[s\]
pub const DEFAULT_DT: f64 = 30.0;

/// Failure while loading a run configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Invalid(#[from] SolverError),
}

/// Physical parameters plus resolution of one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfiguration {
    pub parameters: PhysicalParameters,
    pub grid_points: usize,
    pub time_steps: usize,
    pub dt: f64,
}

impl Default for RunConfiguration {
    fn default() -> Self {
        Self {
            parameters: PhysicalParameters::default(),
            grid_points: DEFAULT_GRID_POINTS,
            time_steps: DEFAULT_TIME_STEPS,
            dt: DEFAULT_DT,
        }
    }
}

impl RunConfiguration {
    /// Parse a JSON document and validate it
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let configuration: RunConfiguration = serde_json::from_str(text)?;
        configuration.validate()?;
        Ok(configuration)
    }

    /// Read and validate a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Grid and time-stepping part
    pub fn solver_configuration(&self) -> SolverConfiguration {
        SolverConfiguration::new(self.grid_points, self.time_steps, self.dt)
    }

    /// Validate parameters and resolution
    pub fn validate(&self) -> Result<(), SolverError> {
        self.parameters.validate()?;
        self.solver_configuration().validate()
    }
}
