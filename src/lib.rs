//! plume-rs: Finite-difference schemes for 1D advection-diffusion
//!
//! Simulates a pollutant released at a point source and carried by a
//! uniform flow while it diffuses, on a fixed one-dimensional grid. Five
//! schemes can be compared against each other and against the closed-form
//! erfc solution.
//!
//! # Architecture
//!
//! plume-rs is built on two core principles:
//!
//! 1. **Separation of Physics and Numerics**
//!    - Physics defines the parameters, the state and the conditions
//!      (what is solved)
//!    - Schemes and the driver provide the update rules and the time loop
//!      (how it is solved)
//!
//! 2. **Interchangeable Schemes**
//!    - Every scheme implements the same [`Scheme`](solver::Scheme) trait
//!    - The same scenario runs with any scheme and at any resolution
//!
//! # Quick Start
//!
//! ```rust
//! use plume_rs::prelude::*;
//!
//! # fn main() -> Result<(), SolverError> {
//! // 1. Physical setup and scheme
//! let scenario = Scenario::new(SchemeKind::LaxWendroff.build(), PhysicalParameters::default())
//!     .with_analytic();
//!
//! // 2. Resolution: 9 grid points, 50 stored steps of 30 s
//! let config = SolverConfiguration::new(9, 50, 30.0);
//!
//! // 3. Run simulation
//! let result = Simulation::run(&scenario, &config)?;
//!
//! // 4. Compare with the analytic solution
//! let errors = compare_histories(&result.numeric, result.analytic.as_ref().unwrap())?;
//! println!("RMS error: {:.3}", errors.l2);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`physics`]: parameters, three-level state, conditions, analytic solution
//! - [`solver`]: schemes, time-step driver, diagnostics
//! - [`config`]: JSON run configuration
//! - [`output`]: CSV export for external plotting

// Core modules
pub mod physics;
pub mod solver;

pub mod config;
pub mod output;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //! use plume_rs::prelude::*;
    //! ```
    pub use crate::physics::{AnalyticSolution, PhysicalParameters, Quantity, TimeLevel};
    pub use crate::solver::{
        Scenario, Scheme, SchemeKind, SimulationResult, Simulation, SolverConfiguration,
        SolverError, SourcePolicy, TimeStepDriver, compare_histories, multi_resolution_sweep,
    };
}
