//! Physical model of the plume
//!
//! This module describes WHAT is simulated, independently of the numerical
//! scheme used to advance it:
//!
//! - [`PhysicalParameters`]: velocity, diffusivity, source magnitude, spacing
//! - [`Quantity`]: the field at three time levels plus its history table
//! - [`conditions`]: point-source initial condition, zero-gradient edges,
//!   continuous source reinjection
//! - [`AnalyticSolution`]: the erfc reference profile used for validation
//!
//! # Architecture
//!
//! Physics is **separate from numerics**:
//! - physics provides the state, the parameters and the conditions
//! - [`solver`](crate::solver) provides the schemes and the stepping loop
//!
//! This separation allows the same seeded [`Quantity`] to be advanced by any
//! of the five schemes and compared against the same reference.
//!
//! # Example
//!
//! ```rust
//! use plume_rs::physics::{conditions, PhysicalParameters, Quantity, TimeLevel};
//!
//! let params = PhysicalParameters::default();
//! let mut c = Quantity::new(9, 5);
//!
//! conditions::initial_conditions(params.source_strength, &mut c);
//! conditions::boundary_conditions(c.level_mut(TimeLevel::Current));
//! c.store_timestep(0, TimeLevel::Current).unwrap();
//!
//! assert_eq!(c.history()[[3, 0]], 600.0);
//! ```

pub mod analytic;
pub mod conditions;
pub mod parameters;
pub mod quantity;

pub use analytic::AnalyticSolution;
pub use parameters::PhysicalParameters;
pub use quantity::{Quantity, TimeLevel};
