//! Simulation scenario definition
//!
//! A scenario combines physical parameters with the scheme that advances
//! them.
use crate::physics::PhysicalParameters;
use crate::solver::traits::check_grid;
use crate::solver::{Scheme, SolverConfiguration, SolverError};

/// Simulation scenario
///
/// Defines a specific case to simulate:
/// - Physical parameters (`u`, `k`, `c1`, `dx`)
/// - Finite-difference scheme
/// - Whether the analytic erfc reference is computed alongside
///
/// # Design
///
/// The same scenario can be run at several resolutions.
/// This is the "WHAT to solve" (not "HOW finely to solve").
///
/// # Examples
///
/// ```rust
/// use plume_rs::physics::PhysicalParameters;
/// use plume_rs::solver::{Scenario, SolverConfiguration, UpstreamScheme};
///
/// let scenario = Scenario::new(Box::new(UpstreamScheme::new()), PhysicalParameters::default())
///     .with_analytic();
///
/// assert_eq!(scenario.scheme_name(), "Upstream");
/// assert!(scenario.validate(&SolverConfiguration::new(9, 50, 30.0)).is_ok());
/// ```
pub struct Scenario {
    /// Update rule
    pub scheme: Box<dyn Scheme>,

    /// Physical parameters
    pub parameters: PhysicalParameters,

    /// Compute the analytic history in lockstep with the numeric one
    pub track_analytic: bool,
}

impl Scenario {
    /// Create a scenario without analytic tracking
    pub fn new(scheme: Box<dyn Scheme>, parameters: PhysicalParameters) -> Self {
        Self {
            scheme,
            parameters,
            track_analytic: false,
        }
    }

    /// Also compute the analytic reference
    pub fn with_analytic(mut self) -> Self {
        self.track_analytic = true;
        self
    }

    /// Check the parameters, the configuration and that the stencil fits
    pub fn validate(&self, configuration: &SolverConfiguration) -> Result<(), SolverError> {
        self.parameters.validate()?;
        configuration.validate()?;

        check_grid(self.scheme.as_ref(), configuration)
    }

    /// Get scheme name
    pub fn scheme_name(&self) -> &str {
        self.scheme.name()
    }
}

impl std::fmt::Debug for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scenario")
            .field("scheme", &self.scheme_name())
            .field("source policy", &self.scheme.source_policy())
            .field("parameters", &self.parameters)
            .field("track analytic", &self.track_analytic)
            .finish()
    }
}
