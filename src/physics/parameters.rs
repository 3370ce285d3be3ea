//! Physical parameters of the advection-diffusion problem
//!
//! ```text
//! ∂c/∂t + u·∂c/∂x = k·∂²c/∂x²
//! ```
//!
//! These values are immutable for the duration of a run. Time-stepping
//! parameters (`dt`, grid and step counts) live in
//! [`SolverConfiguration`](crate::solver::SolverConfiguration).

use serde::{Deserialize, Serialize};

use crate::solver::SolverError;

/// Default advective (wind) velocity `u` \[m/s\]
pub const DEFAULT_VELOCITY: f64 = 3.39;

/// Default eddy diffusivity `k` \[m²/s\]
pub const DEFAULT_DIFFUSIVITY: f64 = 2.0;

/// Default point-source magnitude `c1` \[mg/m³\]
pub const DEFAULT_SOURCE_STRENGTH: f64 = 600.0;

/// Default grid spacing `dx` \[m\]
pub const DEFAULT_DX: f64 = 1000.0;

/// Physical constants of one run
///
/// # Example
///
/// ```rust
/// use plume_rs::physics::PhysicalParameters;
///
/// let params = PhysicalParameters::default();
/// assert_eq!(params.velocity, 3.39);
/// assert!(params.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalParameters {
    /// Advective velocity `u` \[m/s\]
    pub velocity: f64,

    /// Diffusivity `k` \[m²/s\]
    pub diffusivity: f64,

    /// Source magnitude `c1`
    pub source_strength: f64,

    /// Grid spacing `dx` \[m\]
    pub dx: f64,
}

impl Default for PhysicalParameters {
    fn default() -> Self {
        Self {
            velocity: DEFAULT_VELOCITY,
            diffusivity: DEFAULT_DIFFUSIVITY,
            source_strength: DEFAULT_SOURCE_STRENGTH,
            dx: DEFAULT_DX,
        }
    }
}

impl PhysicalParameters {
    /// Create parameters from explicit values
    pub fn new(velocity: f64, diffusivity: f64, source_strength: f64, dx: f64) -> Self {
        Self {
            velocity,
            diffusivity,
            source_strength,
            dx,
        }
    }

    /// Same parameters with another velocity
    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    /// Same parameters with another diffusivity
    pub fn with_diffusivity(mut self, diffusivity: f64) -> Self {
        self.diffusivity = diffusivity;
        self
    }

    /// Validate that parameters are physically meaningful
    pub fn validate(&self) -> Result<(), SolverError> {
        let fields = [
            ("velocity", self.velocity),
            ("diffusivity", self.diffusivity),
            ("source strength", self.source_strength),
            ("dx", self.dx),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(SolverError::invalid(format!("{name} is not finite")));
            }
        }

        if self.dx <= 0.0 {
            return Err(SolverError::invalid("grid spacing dx must be positive"));
        }
        if self.diffusivity < 0.0 {
            return Err(SolverError::invalid("diffusivity cannot be negative"));
        }

        Ok(())
    }
}
