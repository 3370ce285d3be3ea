//! Finite-difference schemes for the advection-diffusion equation
//!
//! This module contains concrete implementations of the [`Scheme`](crate::solver::Scheme) trait.
//!
//! # Available Schemes
//!
//! ## Explicit Schemes
//!
//! - **[`UpstreamScheme`]**: upwind advection + centred diffusion
//!   - Order: first order
//!   - Stability: `Cr + 2D <= 1`
//!
//! - **[`FtcsScheme`]**: forward time, centred space
//!   - Order: first order in time, second in space
//!   - Stability: unstable for pure advection; diffusion optional
//!
//! - **[`LaxWendroffScheme`]**: second-order Taylor scheme with a mixed
//!   third-difference correction
//!   - Five-point stencil, needs `N >= 5`
//!
//! - **[`NsfdScheme`]**: non-standard finite differences (Appadu)
//!   - Fixed denominator functions, independent of `dt` and `dx`
//!
//! ## Implicit Schemes
//!
//! - **[`CrankNicolsonScheme`]**: trapezoidal rule, tridiagonal solve per step
//!   - Order: second order
//!   - Stability: unconditional
//!
//! # Example
//!
//! ```rust
//! use plume_rs::solver::SchemeKind;
//!
//! let kind: SchemeKind = "lax-wendroff".parse().unwrap();
//! let scheme = kind.build();
//! assert_eq!(scheme.name(), "Lax-Wendroff");
//! assert_eq!(scheme.min_grid_points(), 5);
//! ```
//!
//! # Performance Considerations
//!
//! Explicit interior updates go through [`fill_interior`]: with the
//! `parallel` feature and an interior larger than
//! [`parallel_threshold()`](crate::solver::parallel_threshold) the indices
//! are processed by Rayon. Each index only writes its own slot, so both
//! paths give bit-identical results.

pub mod crank_nicolson;
pub mod ftcs;
pub mod lax_wendroff;
pub mod nsfd;
pub mod upstream;

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use nalgebra::DVector;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::solver::{parallel_threshold, Scheme, SolverError};

// Re-exports for convenience
pub use crank_nicolson::{CrankNicolsonScheme, LinearSolver, TridiagonalSystem};
pub use ftcs::FtcsScheme;
pub use lax_wendroff::LaxWendroffScheme;
pub use nsfd::{NsfdScheme, NsfdWeights};
pub use upstream::UpstreamScheme;

// =================================================================================================
// Interior Update
// =================================================================================================

/// Write `next[i] = update(i)` for every `i` in `range`
///
/// `update` only reads the current level, so indices are independent.
pub(crate) fn fill_interior<F>(next: &mut DVector<f64>, range: Range<usize>, update: F)
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    if range.is_empty() {
        return;
    }

    let offset = range.start;
    let slots = &mut next.as_mut_slice()[range];

    if slots.len() > parallel_threshold() {
        #[cfg(feature = "parallel")]
        slots
            .par_iter_mut()
            .enumerate()
            .for_each(|(j, x)| *x = update(offset + j));
        #[cfg(not(feature = "parallel"))]
        slots
            .iter_mut()
            .enumerate()
            .for_each(|(j, x)| *x = update(offset + j));
    } else {
        slots
            .iter_mut()
            .enumerate()
            .for_each(|(j, x)| *x = update(offset + j));
    }
}

// =================================================================================================
// Scheme Selection
// =================================================================================================

/// The five available schemes, selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SchemeKind {
    Upstream,
    Ftcs,
    LaxWendroff,
    #[serde(rename = "nsfd")]
    NonStandard,
    CrankNicolson,
}

impl SchemeKind {
    /// Every scheme, in presentation order
    pub const ALL: [SchemeKind; 5] = [
        SchemeKind::Upstream,
        SchemeKind::Ftcs,
        SchemeKind::LaxWendroff,
        SchemeKind::NonStandard,
        SchemeKind::CrankNicolson,
    ];

    /// Command-line name
    pub fn name(&self) -> &'static str {
        match self {
            SchemeKind::Upstream => "upstream",
            SchemeKind::Ftcs => "ftcs",
            SchemeKind::LaxWendroff => "lax-wendroff",
            SchemeKind::NonStandard => "nsfd",
            SchemeKind::CrankNicolson => "crank-nicolson",
        }
    }

    /// `true` for schemes without a linear solve
    pub fn is_explicit(&self) -> bool {
        !matches!(self, SchemeKind::CrankNicolson)
    }

    /// Build the scheme with its default settings
    pub fn build(&self) -> Box<dyn Scheme> {
        match self {
            SchemeKind::Upstream => Box::new(UpstreamScheme::new()),
            SchemeKind::Ftcs => Box::new(FtcsScheme::new()),
            SchemeKind::LaxWendroff => Box::new(LaxWendroffScheme::new()),
            SchemeKind::NonStandard => Box::new(NsfdScheme::new()),
            SchemeKind::CrankNicolson => Box::new(CrankNicolsonScheme::new()),
        }
    }
}

impl fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemeKind {
    type Err = SolverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        SchemeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = SchemeKind::ALL.iter().map(|k| k.name()).collect();
                SolverError::invalid(format!(
                    "unknown scheme '{}', expected one of: {}",
                    s,
                    known.join(", ")
                ))
            })
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::PhysicalParameters;
    use crate::solver::{SolverConfiguration, SourcePolicy, ThresholdGuard};

    #[test]
    fn test_parse_names() {
        for kind in SchemeKind::ALL {
            assert_eq!(kind.name().parse::<SchemeKind>(), Ok(kind));
        }
        assert_eq!("Crank-Nicolson".parse::<SchemeKind>(), Ok(SchemeKind::CrankNicolson));
        assert!("euler".parse::<SchemeKind>().is_err());
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(SchemeKind::NonStandard.to_string(), "nsfd");
    }

    #[test]
    fn test_default_source_policies() {
        let continuous: Vec<bool> = SchemeKind::ALL
            .iter()
            .map(|k| k.build().source_policy() == SourcePolicy::Continuous)
            .collect();
        assert_eq!(continuous, vec![true, false, true, true, true]);
    }

    #[test]
    fn test_only_crank_nicolson_is_implicit() {
        for kind in SchemeKind::ALL {
            assert_eq!(kind.build().is_implicit(), !kind.is_explicit());
        }
    }

    #[test]
    fn test_grids_below_the_stencil_are_rejected() {
        let params = PhysicalParameters::default();

        for kind in SchemeKind::ALL {
            let scheme = kind.build();
            for n in 0..scheme.min_grid_points() {
                let config = SolverConfiguration::new(n, 2, 30.0);
                let current = DVector::zeros(n);
                let mut next = DVector::zeros(n);

                let result = scheme.advance(&current, &mut next, &params, &config);
                assert_eq!(
                    result,
                    Err(SolverError::GridTooSmall {
                        scheme: scheme.name().to_string(),
                        required: scheme.min_grid_points(),
                        actual: n,
                    }),
                    "{kind} on {n} points"
                );
            }
        }
    }

    #[test]
    fn test_fill_interior_leaves_edges() {
        let mut next = DVector::from_element(6, -1.0);
        fill_interior(&mut next, 1..5, |i| i as f64);

        assert_eq!(next.as_slice(), &[-1.0, 1.0, 2.0, 3.0, 4.0, -1.0]);
    }

    #[test]
    fn test_fill_interior_empty_range() {
        let mut next = DVector::from_element(3, 2.0);
        fill_interior(&mut next, 1..1, |_| 0.0);
        assert_eq!(next, DVector::from_element(3, 2.0));
    }

    #[test]
    fn test_results_independent_of_threshold() {
        let params = PhysicalParameters::default();
        let config = SolverConfiguration::new(64, 2, 30.0);
        let current = DVector::from_fn(64, |i, _| ((i as f64) * 0.3).cos().abs() * 100.0);

        let mut sequential = DVector::zeros(64);
        let mut low_threshold = DVector::zeros(64);

        UpstreamScheme::new()
            .advance(&current, &mut sequential, &params, &config)
            .unwrap();
        {
            let _guard = ThresholdGuard::save(1);
            UpstreamScheme::new()
                .advance(&current, &mut low_threshold, &params, &config)
                .unwrap();
        }

        assert_eq!(sequential, low_threshold);
    }
}
