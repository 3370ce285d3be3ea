//! Forward-Time Centred-Space scheme
//!
//! ```text
//! cⁿ⁺¹ᵢ = cⁿᵢ - u·(dt/2dx)·(cⁿᵢ₊₁ - cⁿᵢ₋₁) [+ k·(dt/dx²)·(cⁿᵢ₊₁ - 2cⁿᵢ + cⁿᵢ₋₁)]
//! ```
//!
//! Centred advection with a forward Euler step is unconditionally unstable
//! for pure advection: every Fourier mode is amplified by
//! `|g|² = 1 + Cr²·sin²θ`. The diffusion term is therefore optional and
//! **off by default**; with it the scheme is stable only when `Cr² <= 2·D`
//! and `D <= 1/2`.
//!
//! The source is a one-shot pulse by default (no reinjection).

use nalgebra::DVector;

use crate::physics::PhysicalParameters;
use crate::solver::methods::fill_interior;
use crate::solver::traits::{check_grid, check_lengths};
use crate::solver::{Scheme, SolverConfiguration, SolverError, SourcePolicy};

/// Centred advection, optionally with centred diffusion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FtcsScheme {
    include_diffusion: bool,
    source: SourcePolicy,
}

impl Default for FtcsScheme {
    fn default() -> Self {
        Self {
            include_diffusion: false,
            source: SourcePolicy::Instantaneous,
        }
    }
}

impl FtcsScheme {
    /// Advection-only FTCS with an instantaneous source
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the centred diffusion term `k·(dt/dx²)·δ²c`
    pub fn with_diffusion(mut self) -> Self {
        self.include_diffusion = true;
        self
    }

    /// Override the source behaviour
    pub fn with_source_policy(mut self, source: SourcePolicy) -> Self {
        self.source = source;
        self
    }

    /// Whether the diffusion term is applied
    pub fn includes_diffusion(&self) -> bool {
        self.include_diffusion
    }
}

impl Scheme for FtcsScheme {
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

        let half_courant = parameters.velocity * dt / (2.0 * dx);
        let diffusion = if self.include_diffusion {
            parameters.diffusivity * dt / (dx * dx)
        } else {
            0.0
        };
        let c = current;

        fill_interior(next, 1..n - 1, |i| {
            c[i] - half_courant * (c[i + 1] - c[i - 1])
                + diffusion * (c[i + 1] - 2.0 * c[i] + c[i - 1])
        });

        Ok(())
    }

    fn name(&self) -> &str {
        "FTCS"
    }

    fn source_policy(&self) -> SourcePolicy {
        self.source
    }

    fn is_unconditionally_unstable(&self) -> bool {
        !self.include_diffusion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_advection_only() {
        let scheme = FtcsScheme::new();
        assert!(!scheme.includes_diffusion());
        assert_eq!(scheme.source_policy(), SourcePolicy::Instantaneous);
        assert!(FtcsScheme::new().with_diffusion().includes_diffusion());
        assert!(scheme.is_unconditionally_unstable());
        assert!(!FtcsScheme::new().with_diffusion().is_unconditionally_unstable());
    }

    #[test]
    fn test_centred_advection_stencil() {
        let params = PhysicalParameters::default();
        let config = SolverConfiguration::new(5, 2, 30.0);
        let current = DVector::from_vec(vec![0.0, 0.0, 600.0, 0.0, 0.0]);
        let mut next = DVector::zeros(5);

        FtcsScheme::new().advance(&current, &mut next, &params, &config).unwrap();

        let half_courant = 3.39 * 30.0 / 2000.0;
        // The peak itself is untouched by centred advection
        assert_relative_eq!(next[2], 600.0, epsilon = 1e-12);
        assert_relative_eq!(next[1], half_courant * 600.0, epsilon = 1e-9);
        assert_relative_eq!(next[3], -half_courant * 600.0, epsilon = 1e-9);
    }

    #[test]
    fn test_diffusion_term_when_enabled() {
        let params = PhysicalParameters::new(0.0, 2.0, 600.0, 1000.0);
        let config = SolverConfiguration::new(5, 2, 30.0);
        let current = DVector::from_vec(vec![0.0, 0.0, 600.0, 0.0, 0.0]);

        let mut without = DVector::zeros(5);
        FtcsScheme::new().advance(&current, &mut without, &params, &config).unwrap();
        assert_relative_eq!(without[2], 600.0, epsilon = 1e-12);

        let mut with = DVector::zeros(5);
        FtcsScheme::new()
            .with_diffusion()
            .advance(&current, &mut with, &params, &config)
            .unwrap();
        let diffusion = 2.0 * 30.0 / 1.0e6;
        assert_relative_eq!(with[2], 600.0 * (1.0 - 2.0 * diffusion), epsilon = 1e-9);
    }
}
