//! Numerical scheme traits and types
//!
//! # Design Philosophy
//!
//! - `Scheme` trait: one finite-difference update rule, `current → next`
//! - `SourcePolicy`: whether the point source keeps emitting after step 0
//! - `SolverConfiguration`: grid and time-step counts, `dt`
//! - `SimulationResult`: history tables plus metadata for reproducibility
//!
//! Schemes are stateless with respect to the run: the same instance can be
//! reused for several runs and resolutions.

use std::collections::HashMap;

use nalgebra::DVector;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::physics::PhysicalParameters;
use crate::solver::SolverError;

// =================================================================================================
// Source Policy
// =================================================================================================

/// How the point source behaves after the initial pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourcePolicy {
    /// `c1` is written back at `floor(N/3)` after every step (continuous emission)
    Continuous,

    /// The source only exists in the initial condition (one-shot pulse)
    Instantaneous,
}

// =================================================================================================
// Scheme Trait
// =================================================================================================

/// A finite-difference update rule advancing the field by one time step
///
/// # Responsibility
///
/// Read `current` and write the interior of `next`. Edge points
/// (`0` and `N-1`) are overwritten by the boundary conditions afterwards, and
/// source reinjection is applied by the driver according to
/// [`Scheme::source_policy`].
///
/// Implementations must never read `next`: its content is stale until the
/// scheme has written it.
pub trait Scheme: Send + Sync {
    /// Compute the next time level from the current one
    fn advance(
        &self,
        current: &DVector<f64>,
        next: &mut DVector<f64>,
        parameters: &PhysicalParameters,
        configuration: &SolverConfiguration,
    ) -> Result<(), SolverError>;

    /// Name of the scheme (used for display and logging)
    fn name(&self) -> &str;

    /// Smallest grid on which the stencil has at least one interior point
    fn min_grid_points(&self) -> usize {
        3
    }

    /// Source behaviour after step 0
    fn source_policy(&self) -> SourcePolicy;

    /// `true` when the update requires a linear solve
    fn is_implicit(&self) -> bool {
        false
    }

    /// `true` when the explicit limits `Cr <= 1` and `D <= 1/2` apply
    fn is_conditionally_stable(&self) -> bool {
        !self.is_implicit()
    }

    /// `true` when no time step keeps advection stable
    fn is_unconditionally_unstable(&self) -> bool {
        false
    }
}

/// Check that the scheme stencil has interior points on the configured grid
pub(crate) fn check_grid<S: Scheme + ?Sized>(
    scheme: &S,
    configuration: &SolverConfiguration,
) -> Result<(), SolverError> {
    let required = scheme.min_grid_points();
    if configuration.grid_points < required {
        return Err(SolverError::GridTooSmall {
            scheme: scheme.name().to_string(),
            required,
            actual: configuration.grid_points,
        });
    }
    Ok(())
}

/// Check that `current` and `next` both live on the configured grid
pub(crate) fn check_lengths(
    current: &DVector<f64>,
    next: &DVector<f64>,
    configuration: &SolverConfiguration,
) -> Result<(), SolverError> {
    let expected = configuration.grid_points;
    for actual in [current.len(), next.len()] {
        if actual != expected {
            return Err(SolverError::LengthMismatch { expected, actual });
        }
    }
    Ok(())
}

// =================================================================================================
// Solver Configuration
// =================================================================================================

/// Grid and time-stepping configuration of one run
///
/// # Example
///
/// ```rust
/// use plume_rs::solver::SolverConfiguration;
///
/// let config = SolverConfiguration::new(9, 50, 30.0);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.time_of(2), 60.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverConfiguration {
    /// Number of grid points `N`
    pub grid_points: usize,

    /// Number of stored time steps `T` (including the seeded step 0)
    pub time_steps: usize,

    /// Time step `dt` \[s\]
    pub dt: f64,
}

impl SolverConfiguration {
    /// Create a configuration
    pub fn new(grid_points: usize, time_steps: usize, dt: f64) -> Self {
        Self {
            grid_points,
            time_steps,
            dt,
        }
    }

    /// Physical time of step `step`
    pub fn time_of(&self, step: usize) -> f64 {
        // Computed from the index to avoid accumulating rounding error
        step as f64 * self.dt
    }

    /// Physical time of the last stored column
    pub fn total_time(&self) -> f64 {
        self.time_of(self.time_steps.saturating_sub(1))
    }

    /// Validate counts and time step
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.grid_points < 3 {
            return Err(SolverError::invalid(format!(
                "grid needs at least 3 points (one interior point), got {}",
                self.grid_points
            )));
        }
        if self.time_steps == 0 {
            return Err(SolverError::invalid("time steps must be greater than 0"));
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SolverError::invalid(format!(
                "time step dt must be positive and finite, got {}",
                self.dt
            )));
        }
        Ok(())
    }
}

// =================================================================================================
// Simulation Result
// =================================================================================================

/// Output of a completed run
///
/// History tables have shape (grid points, time steps); column `t` is the
/// field stored at step `t`, i.e. at physical time `t·dt`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    /// Numeric history
    pub numeric: Array2<f64>,

    /// Analytic history, when requested by the scenario
    pub analytic: Option<Array2<f64>>,

    /// Physical time of each column \[s\]
    pub time_points: Vec<f64>,

    /// Last computed numeric level
    pub final_state: DVector<f64>,

    /// Free-form metadata (scheme, dt, stability numbers...)
    pub metadata: HashMap<String, String>,
}

impl SimulationResult {
    /// Create a result without metadata
    pub fn new(
        numeric: Array2<f64>,
        analytic: Option<Array2<f64>>,
        time_points: Vec<f64>,
        final_state: DVector<f64>,
    ) -> Self {
        Self {
            numeric,
            analytic,
            time_points,
            final_state,
            metadata: HashMap::new(),
        }
    }

    /// Number of stored time steps
    pub fn len(&self) -> usize {
        self.time_points.len()
    }

    /// `true` if nothing was stored
    pub fn is_empty(&self) -> bool {
        self.time_points.is_empty()
    }

    /// Number of grid points
    pub fn grid_points(&self) -> usize {
        self.numeric.nrows()
    }

    /// Numeric profile stored at `step`
    pub fn column(&self, step: usize) -> Option<ArrayView1<'_, f64>> {
        (step < self.numeric.ncols()).then(|| self.numeric.column(step))
    }

    /// Stride between rendered lines so that at most `max_lines` are drawn
    ///
    /// `ceil(T / max_lines)`, never less than 1.
    pub fn sample_interval(&self, max_lines: usize) -> usize {
        if max_lines == 0 {
            return 1;
        }
        self.len().div_ceil(max_lines).max(1)
    }

    /// Steps selected for rendering with [`sample_interval`](Self::sample_interval)
    pub fn sampled_steps(&self, max_lines: usize) -> Vec<usize> {
        (0..self.len())
            .step_by(self.sample_interval(max_lines))
            .collect()
    }

    /// Attach a metadata entry
    pub fn add_metadata(&mut self, key: &str, value: &str) {
        self.metadata.insert(key.to_string(), value.to_string());
    }

    /// Read a metadata entry
    pub fn get_metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
