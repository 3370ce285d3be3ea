//! Numerical solvers
//!
//! This module turns a physical setup into concentration histories by
//! applying a finite-difference scheme step by step.
//!
//! # Core Concepts
//!
//! ## The Architecture (WHAT vs HOW)
//!
//! The solver architecture separates concerns into three layers:
//!
//! 1. **Scenario** (`Scenario`) - WHAT to solve
//!    - Physical parameters (`u`, `k`, `c1`, `dx`)
//!    - The scheme to apply
//!    - Whether the analytic reference is tracked
//!
//! 2. **Configuration** (`SolverConfiguration`) - HOW finely to solve
//!    - Grid points `N`
//!    - Stored time steps `T`
//!    - Time step `dt`
//!
//! 3. **Driver** (`TimeStepDriver`) - The time loop
//!    - Seeds the initial condition
//!    - Advances, reinjects, applies boundaries, stores
//!    - Returns the `SimulationResult`
//!
//! # Module Organization
//!
//! - **`traits`**: `Scheme` trait, `SourcePolicy`, `SolverConfiguration`,
//!   `SimulationResult`
//! - **`methods`**: the five schemes and `SchemeKind`
//! - **`scenario`**: problem definition
//! - **`driver`**: `TimeStepDriver`, `Simulation`, multi-resolution sweep
//! - **`diagnostics`**: Courant/diffusion numbers, error norms
//! - **`error`**: `SolverError`
//!
//! # Quick Start Example
//!
//! ```rust
//! use plume_rs::physics::PhysicalParameters;
//! use plume_rs::solver::{Scenario, SchemeKind, Simulation, SolverConfiguration};
//!
//! let scenario = Scenario::new(SchemeKind::Upstream.build(), PhysicalParameters::default());
//! let config = SolverConfiguration::new(9, 50, 30.0);
//!
//! let result = Simulation::run(&scenario, &config)?;
//! assert_eq!(result.numeric.dim(), (9, 50));
//! # Ok::<(), plume_rs::solver::SolverError>(())
//! ```
//!
//! # Workflow Diagram
//!
//! ```text
//! ┌─────────────────────┐   ┌──────────────────────┐
//! │ PhysicalParameters  │   │ Scheme (SchemeKind)  │
//! └──────────┬──────────┘   └───────────┬──────────┘
//!            └─────────────┬────────────┘
//!                 ┌────────▼────────┐
//!                 │    Scenario     │ ← WHAT to solve
//!                 └────────┬────────┘
//!                 ┌────────▼─────────────┐
//!                 │ SolverConfiguration  │ ← HOW finely
//!                 └────────┬─────────────┘
//!                 ┌────────▼────────┐
//!                 │ TimeStepDriver  │ ← seed, advance × (T-1), finish
//!                 └────────┬────────┘
//!                 ┌────────▼────────────┐
//!                 │ SimulationResult    │ ← histories + metadata
//!                 └─────────────────────┘
//! ```
//!
//! # Error Handling
//!
//! Every fallible operation returns `Result<T, SolverError>`. Common errors:
//! - Invalid configuration (`N < 3`, `T == 0`, `dt <= 0`)
//! - Grid too small for the stencil (Lax-Wendroff needs 5 points)
//! - Numerical instability (NaN or Inf in a new level)
//! - Singular implicit system

// =================================================================================================
// Module Declarations
// =================================================================================================
mod driver;
mod error;
mod scenario;
mod traits;

pub mod diagnostics;
pub mod methods;

// =================================================================================================
// Parallel Execution Threshold
// =================================================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

/// Default interior size above which explicit schemes switch to parallel
/// iteration.
///
/// Below roughly a thousand points the Rayon dispatch costs more than the
/// three-point stencil it distributes.
const DEFAULT_PARALLEL_THRESHOLD: usize = 999;

/// Relaxed loads are enough: the value only picks a loop, never orders memory
static PARALLEL_THRESHOLD: AtomicUsize = AtomicUsize::new(DEFAULT_PARALLEL_THRESHOLD);

/// Return the current parallel-execution threshold.
///
/// Interior updates run sequentially when the interior holds fewer points
/// than this value, and switch to Rayon above it, but only when the crate is
/// compiled with the `parallel` feature.
///
/// # Example
///
/// ```rust
/// use plume_rs::solver::parallel_threshold;
///
/// assert!(parallel_threshold() > 0);
/// ```
pub fn parallel_threshold() -> usize {
    PARALLEL_THRESHOLD.load(Ordering::Relaxed)
}

/// Set the parallel-execution threshold to a new value.
///
/// # Panics
///
/// Panics when `threshold == 0`.
///
/// # Example
///
/// ```rust
/// use plume_rs::solver::{parallel_threshold, set_parallel_threshold};
///
/// let previous = parallel_threshold();
/// set_parallel_threshold(2048);
/// assert_eq!(parallel_threshold(), 2048);
///
/// // Restore so other tests are not affected.
/// set_parallel_threshold(previous);
/// ```
pub fn set_parallel_threshold(threshold: usize) {
    assert!(threshold > 0, "parallel threshold must be at least 1");
    PARALLEL_THRESHOLD.store(threshold, Ordering::Relaxed);
}

/// Serialises tests that modify the threshold.
#[cfg(test)]
static THRESHOLD_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// RAII guard that saves the current threshold on construction and restores
/// it on drop.
///
/// Only compiled in test builds. Holds a lock for its lifetime so that two
/// tests never modify the threshold at the same time.
///
/// ```rust,ignore
/// let _guard = crate::solver::ThresholdGuard::save(50);
/// // threshold is now 50 …
/// // … and is automatically restored when _guard is dropped.
/// ```
#[cfg(test)]
pub(crate) struct ThresholdGuard {
    previous: usize,
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[cfg(test)]
impl ThresholdGuard {
    /// Set the threshold to `new_value` and return a guard that will
    /// restore the previous value on drop.
    pub(crate) fn save(new_value: usize) -> Self {
        let lock = THRESHOLD_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = parallel_threshold();
        set_parallel_threshold(new_value);
        Self {
            previous,
            _lock: lock,
        }
    }
}

#[cfg(test)]
impl Drop for ThresholdGuard {
    fn drop(&mut self) {
        // Bypass the public setter so that restoring never panics.
        PARALLEL_THRESHOLD.store(self.previous, Ordering::Relaxed);
    }
}

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use traits::{Scheme, SimulationResult, SolverConfiguration, SourcePolicy};

pub use diagnostics::{
    ComparisonErrors, StabilityReport, compare_histories, courant_number, diffusion_number,
    profile_distance, stability_report,
};
pub use driver::{
    DriverState, Simulation, SweepRun, SWEEP_TIME_STEPS, TimeStepDriver, multi_resolution_sweep,
};
pub use error::SolverError;
pub use methods::{
    CrankNicolsonScheme, FtcsScheme, LaxWendroffScheme, LinearSolver, NsfdScheme, SchemeKind,
    TridiagonalSystem, UpstreamScheme,
};
pub use scenario::Scenario;

// =================================================================================================
// Helper Functions
// =================================================================================================

use nalgebra::DVector;

/// Check a freshly computed level for NaN or Inf values
///
/// Either indicates numerical instability (typically a time step far beyond
/// the stability limit of an explicit scheme).
///
/// # Arguments
///
/// * `field` - Level to validate
/// * `step` - Time step being computed (for error reporting)
pub(crate) fn validate_field(field: &DVector<f64>, step: usize) -> Result<(), SolverError> {
    match field.iter().position(|value| !value.is_finite()) {
        Some(index) => Err(SolverError::NumericalInstability {
            step,
            index,
            value: field[index],
        }),
        None => Ok(()),
    }
}

// =================================================================================================
// Tests
// =================================================================================================
