//! Common utilities for integration tests

pub mod test_helpers;

// Re-export commonly used items
pub use test_helpers::{
    assert_boundaries_hold,
    assert_fields_close,
    default_configuration,
    run_scheme,
    uniform_field,
};
