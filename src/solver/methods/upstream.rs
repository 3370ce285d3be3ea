//! Upstream (upwind) scheme
//!
//! # Mathematical Background
//!
//! First-order upwind differencing for advection, centred second difference
//! for diffusion, forward Euler in time:
//!
//! ```text
//! cⁿ⁺¹ᵢ = cⁿᵢ - u·(dt/dx)·(cⁿᵢ - cⁿᵢ₋₁) + k·(dt/dx²)·(cⁿᵢ₊₁ - 2cⁿᵢ + cⁿᵢ₋₁)
//! ```
//!
//! # Characteristics
//!
//! - **Order**: first order in space and time
//! - **Stability**: requires `Cr + 2·D <= 1` with `Cr = u·dt/dx`, `D = k·dt/dx²`
//! - **Behaviour**: strong numerical diffusion, but monotone inside its
//!   stability region (no spurious oscillations behind the front)
//! - **Stencil**: `i-1, i, i+1`
//!
//! The upwind direction assumes `u > 0` (flow towards increasing index).

use nalgebra::DVector;

use crate::physics::PhysicalParameters;
use crate::solver::methods::fill_interior;
use crate::solver::traits::{check_grid, check_lengths};
use crate::solver::{Scheme, SolverConfiguration, SolverError, SourcePolicy};

/// Upwind advection + centred diffusion
///
/// Emits continuously at the source by default.
///
/// # Example
///
/// ```rust
/// use plume_rs::solver::{Scheme, SourcePolicy, UpstreamScheme};
///
/// let scheme = UpstreamScheme::new();
/// assert_eq!(scheme.name(), "Upstream");
/// assert_eq!(scheme.source_policy(), SourcePolicy::Continuous);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpstreamScheme {
    source: SourcePolicy,
}

impl Default for UpstreamScheme {
    fn default() -> Self {
        Self {
            source: SourcePolicy::Continuous,
        }
    }
}

impl UpstreamScheme {
    /// Create an upstream scheme with a continuous source
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the source behaviour
    pub fn with_source_policy(mut self, source: SourcePolicy) -> Self {
        self.source = source;
        self
    }
}

impl Scheme for UpstreamScheme {
    fn advance(
        &self,
        current: &DVector<f64>,
        next: &mut DVector<f64>,
        parameters: &PhysicalParameters,
        configuration: &SolverConfiguration,
    ) -> Result<(), SolverError> {
        check_grid(self, configuration)?;
        check_lengths(current, next, configuration)?;

        let n = configuration.grid_points;
        let dt = configuration.dt;
        let dx = parameters.dx;

        let courant = parameters.velocity * dt / dx;
        let diffusion = parameters.diffusivity * dt / (dx * dx);
        let c = current;

        fill_interior(next, 1..n - 1, |i| {
            c[i] - courant * (c[i] - c[i - 1]) + diffusion * (c[i + 1] - 2.0 * c[i] + c[i - 1])
        });

        Ok(())
    }

    fn name(&self) -> &str {
        "Upstream"
    }

    fn source_policy(&self) -> SourcePolicy {
        self.source
    }
}

// =================================================================================================
// Tests
// =================================================================================================
