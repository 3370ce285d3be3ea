//! Non-standard finite-difference scheme
//!
//! Three-point explicit scheme from Appadu (2013, doi:10.1155/2013/734374),
//! where the classical `dt` and `dx` are replaced by denominator functions.
//! The method uses two fixed auxiliary steps, `τ = 5` and `h = 20`,
//! chosen in the paper as the most accurate pair:
//!
//! ```text
//! a₁ = τ / h
//! b₁ = a₁ / (exp(h / k) - 1)
//!
//! cⁿ⁺¹ᵢ = b₁·cⁿᵢ₊₁ + (1 - a₁·u - 2b₁)·cⁿᵢ + (a₁·u + b₁)·cⁿᵢ₋₁
//! ```
//!
//! The three weights sum to one, so a uniform field is a fixed point.
//! The run's `dt` and `dx` do not enter the update.

use nalgebra::DVector;

use crate::physics::PhysicalParameters;
use crate::solver::methods::fill_interior;
use crate::solver::traits::{check_grid, check_lengths};
use crate::solver::{Scheme, SolverConfiguration, SolverError, SourcePolicy};

/// Auxiliary time step `τ` of the denominator functions
pub const AUXILIARY_TIME_STEP: f64 = 5.0;

/// Auxiliary spatial step `h` of the denominator functions
pub const AUXILIARY_SPACE_STEP: f64 = 20.0;

/// Stencil weights `(upstream, centre, downstream)` of the scheme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NsfdWeights {
    pub upstream: f64,
    pub centre: f64,
    pub downstream: f64,
}

impl NsfdWeights {
    /// Weights for velocity `u` and diffusivity `k`
    pub fn new(velocity: f64, diffusivity: f64) -> Self {
        let a1 = AUXILIARY_TIME_STEP / AUXILIARY_SPACE_STEP;
        // k = 0 gives exp(∞) and b₁ = 0, i.e. pure upwind advection
        let b1 = a1 / ((AUXILIARY_SPACE_STEP / diffusivity).exp() - 1.0);

        Self {
            upstream: a1 * velocity + b1,
            centre: 1.0 - a1 * velocity - 2.0 * b1,
            downstream: b1,
        }
    }

    /// Sum of the three weights (one by construction)
    pub fn sum(&self) -> f64 {
        self.upstream + self.centre + self.downstream
    }
}

/// Appadu non-standard finite-difference scheme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NsfdScheme {
    source: SourcePolicy,
}

impl Default for NsfdScheme {
    fn default() -> Self {
        Self {
            source: SourcePolicy::Continuous,
        }
    }
}

impl NsfdScheme {
    /// Create the scheme with a continuous source
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the source behaviour
    pub fn with_source_policy(mut self, source: SourcePolicy) -> Self {
        self.source = source;
        self
    }
}

impl Scheme for NsfdScheme {
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
        let weights = NsfdWeights::new(parameters.velocity, parameters.diffusivity);
        let c = current;

        fill_interior(next, 1..n - 1, |i| {
            weights.downstream * c[i + 1] + weights.centre * c[i] + weights.upstream * c[i - 1]
        });

        Ok(())
    }

    fn name(&self) -> &str {
        "Non-standard FD"
    }

    fn source_policy(&self) -> SourcePolicy {
        self.source
    }

    fn is_conditionally_stable(&self) -> bool {
        false
    }
}
