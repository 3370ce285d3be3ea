//! Stability numbers and error norms
//!
//! The explicit schemes are only conditionally stable. The two
//! dimensionless groups that govern them are
//!
//! ```text
//! Cr = u·dt/dx      (Courant number)
//! D  = k·dt/dx²     (diffusion number)
//! ```
//!
//! [`stability_report`] evaluates the textbook limits for a scheme; the
//! driver logs a warning when one is exceeded but never refuses to run.

use nalgebra::DVector;
use ndarray::{Array2, Zip};

use crate::physics::PhysicalParameters;
use crate::solver::{Scheme, SchemeKind, SolverConfiguration, SolverError};

/// Courant number `u·dt/dx`
pub fn courant_number(parameters: &PhysicalParameters, configuration: &SolverConfiguration) -> f64 {
    parameters.velocity * configuration.dt / parameters.dx
}

/// Diffusion number `k·dt/dx²`
pub fn diffusion_number(
    parameters: &PhysicalParameters,
    configuration: &SolverConfiguration,
) -> f64 {
    parameters.diffusivity * configuration.dt / (parameters.dx * parameters.dx)
}

// =================================================================================================
// Stability Report
// =================================================================================================

/// Stability numbers of a run and the limits that apply to its scheme
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityReport {
    /// `u·dt/dx`
    pub courant: f64,

    /// `k·dt/dx²`
    pub diffusion: f64,

    /// Courant number above 1 for an explicit scheme
    pub courant_exceeded: bool,

    /// Diffusion number above 1/2 for an explicit scheme
    pub diffusion_exceeded: bool,

    /// Centred advection with forward Euler (FTCS): unstable for any `dt`
    pub unconditionally_unstable: bool,
}

impl StabilityReport {
    /// `true` when no limit is violated
    pub fn is_stable(&self) -> bool {
        !(self.courant_exceeded || self.diffusion_exceeded || self.unconditionally_unstable)
    }

    /// Evaluate the stability limits of a configured scheme
    pub fn for_scheme(
        scheme: &dyn Scheme,
        parameters: &PhysicalParameters,
        configuration: &SolverConfiguration,
    ) -> Self {
        let courant = courant_number(parameters, configuration);
        let diffusion = diffusion_number(parameters, configuration);
        let limited = scheme.is_conditionally_stable();

        Self {
            courant,
            diffusion,
            courant_exceeded: limited && courant > 1.0,
            diffusion_exceeded: limited && diffusion > 0.5,
            unconditionally_unstable: scheme.is_unconditionally_unstable()
                && parameters.velocity != 0.0,
        }
    }
}

/// Evaluate the stability limits of `kind` (default build) for this run
///
/// Crank-Nicolson is unconditionally stable and the non-standard scheme
/// ignores `dt` and `dx` in its update, so only their numbers are filled.
pub fn stability_report(
    kind: SchemeKind,
    parameters: &PhysicalParameters,
    configuration: &SolverConfiguration,
) -> StabilityReport {
    StabilityReport::for_scheme(kind.build().as_ref(), parameters, configuration)
}

// =================================================================================================
// Error Norms
// =================================================================================================

/// Difference between two histories of identical shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonErrors {
    /// Root mean square difference over every stored value
    pub l2: f64,

    /// Largest absolute difference
    pub max_abs: f64,
}

/// Compare a numeric history against a reference (typically the analytic one)
///
/// Column 0 is included; it holds the seeded initial condition in both
/// tables.
pub fn compare_histories(
    numeric: &Array2<f64>,
    reference: &Array2<f64>,
) -> Result<ComparisonErrors, SolverError> {
    if numeric.dim() != reference.dim() {
        return Err(SolverError::LengthMismatch {
            expected: reference.len(),
            actual: numeric.len(),
        });
    }
    if numeric.is_empty() {
        return Err(SolverError::invalid("cannot compare empty histories"));
    }

    let mut sum_squares = 0.0;
    let mut max_abs: f64 = 0.0;
    Zip::from(numeric).and(reference).for_each(|&a, &b| {
        let diff = (a - b).abs();
        sum_squares += diff * diff;
        max_abs = max_abs.max(diff);
    });

    Ok(ComparisonErrors {
        l2: (sum_squares / numeric.len() as f64).sqrt(),
        max_abs,
    })
}

/// Largest absolute difference between two profiles of equal length
pub fn profile_distance(a: &DVector<f64>, b: &DVector<f64>) -> Result<f64, SolverError> {
    if a.len() != b.len() {
        return Err(SolverError::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok((a - b).amax())
}
