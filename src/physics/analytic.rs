//! Closed-form reference solution
//!
//! The reference profile is an error-function front leaving the source:
//!
//! ```text
//! c(x, t) = 0                                   for i < floor(N/3)
//! c(x, t) = (c1 / 2) · erfc((x - u·t) / (2·k·t)) otherwise
//! ```
//!
//! with `x` measured from the source point, not from the domain origin:
//! `x[i] = 0` for `i <= floor(N/3)` and grows by `dx` per point downstream.
//!
//! The expression divides by `t`, so it is only defined for `t > 0`. The
//! driver never evaluates it at step 0; the initial condition is injected
//! directly instead.

use nalgebra::DVector;
use statrs::function::erf::erfc;

use crate::physics::{PhysicalParameters, conditions::source_index};
use crate::solver::SolverError;

/// Analytic erfc solution sampled on the simulation grid
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyticSolution {
    parameters: PhysicalParameters,

    /// Source-anchored coordinates \[m\]
    x: DVector<f64>,
}

impl AnalyticSolution {
    /// Precompute the source-anchored coordinates for `grid_points` points
    pub fn new(parameters: PhysicalParameters, grid_points: usize) -> Self {
        Self {
            parameters,
            x: source_coordinates(grid_points, parameters.dx),
        }
    }

    /// Source-anchored coordinates
    pub fn coordinates(&self) -> &DVector<f64> {
        &self.x
    }

    /// Reference value at grid index `i` and time `t`
    ///
    /// `t` must be strictly positive.
    pub fn value_at(&self, i: usize, t: f64) -> f64 {
        if i < source_index(self.x.len()) {
            return 0.0;
        }

        let PhysicalParameters {
            velocity,
            diffusivity,
            source_strength,
            ..
        } = self.parameters;

        0.5 * source_strength * erfc((self.x[i] - velocity * t) / (2.0 * diffusivity * t))
    }

    /// Fill `field` with the reference profile at time `t`
    ///
    /// # Errors
    ///
    /// - [`SolverError::AnalyticUndefined`] when `t <= 0`
    /// - [`SolverError::LengthMismatch`] when `field` is not on this grid
    pub fn evaluate_into(&self, field: &mut DVector<f64>, t: f64) -> Result<(), SolverError> {
        if t <= 0.0 || !t.is_finite() {
            return Err(SolverError::AnalyticUndefined { time: t });
        }
        if field.len() != self.x.len() {
            return Err(SolverError::LengthMismatch {
                expected: self.x.len(),
                actual: field.len(),
            });
        }

        for (i, value) in field.iter_mut().enumerate() {
            *value = self.value_at(i, t);
        }

        Ok(())
    }
}

/// Coordinates anchored at the source point
///
/// Zero up to and including `floor(N/3)`, then `dx`, `2·dx`, ... downstream.
pub fn source_coordinates(grid_points: usize, dx: f64) -> DVector<f64> {
    let source = source_index(grid_points);
    DVector::from_fn(grid_points, |i, _| {
        if i < source {
            0.0
        } else {
            (i - source) as f64 * dx
        }
    })
}
