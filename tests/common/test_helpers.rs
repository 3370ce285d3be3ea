//! Helper functions for integration tests

#![allow(dead_code)]

use nalgebra::DVector;
use ndarray::Array2;

use plume_rs::physics::PhysicalParameters;
use plume_rs::solver::{Scenario, SchemeKind, Simulation, SimulationResult, SolverConfiguration};

/// Assert that two fields are close (within tolerance)
pub fn assert_fields_close(
    field1: &DVector<f64>,
    field2: &DVector<f64>,
    tolerance: f64,
    message: &str,
) {
    assert_eq!(field1.len(), field2.len(), "{}: Dimension mismatch", message);

    for (i, (&v1, &v2)) in field1.iter().zip(field2.iter()).enumerate() {
        let diff = (v1 - v2).abs();
        assert!(
            diff <= tolerance,
            "{}: Element {} differs by {} (tolerance {})",
            message, i, diff, tolerance
        );
    }
}

/// Every stored column satisfies the zero-gradient edges exactly
pub fn assert_boundaries_hold(history: &Array2<f64>, message: &str) {
    let n = history.nrows();
    for (step, column) in history.columns().into_iter().enumerate() {
        assert_eq!(column[0], column[1], "{}: left edge at step {}", message, step);
        assert_eq!(column[n - 1], column[n - 2], "{}: right edge at step {}", message, step);
    }
}

/// Field of `n` points all equal to `value`
pub fn uniform_field(n: usize, value: f64) -> DVector<f64> {
    DVector::from_element(n, value)
}

/// The reference run: 9 grid points, 50 steps of 30 s
pub fn default_configuration() -> SolverConfiguration {
    SolverConfiguration::new(9, 50, 30.0)
}

/// Run a scheme with default parameters
pub fn run_scheme(
    kind: SchemeKind,
    configuration: &SolverConfiguration,
    analytic: bool,
) -> SimulationResult {
    let mut scenario = Scenario::new(kind.build(), PhysicalParameters::default());
    scenario.track_analytic = analytic;
    Simulation::run(&scenario, configuration).unwrap()
}
