//! Initial and boundary conditions
//!
//! - **Initial condition**: an instantaneous point source of magnitude `c1`
//!   at grid index `floor(N/3)`, zero everywhere else.
//! - **Boundary condition**: zero gradient (Neumann) at both edges, enforced
//!   by copying the adjacent interior value onto the edge point. Applied
//!   after every step, to numeric and analytic fields alike.
//! - **Source reinjection**: for a continuous source the value `c1` is
//!   written back at the source index after each scheme update.

use nalgebra::DVector;

use crate::physics::{Quantity, TimeLevel};

/// Index of the point source, `floor(N/3)`
#[inline]
pub fn source_index(grid_points: usize) -> usize {
    grid_points / 3
}

/// Seed the current level with the point-source initial condition
///
/// Every grid point is zeroed, then `current[floor(N/3)] = c1`.
pub fn initial_conditions(source_strength: f64, quantity: &mut Quantity) {
    let n = quantity.grid_points();
    let current = quantity.level_mut(TimeLevel::Current);

    current.fill(0.0);
    if n > 0 {
        current[source_index(n)] = source_strength;
    }
}

/// Apply the zero-gradient condition on both edges
///
/// `field[0] := field[1]` and `field[N-1] := field[N-2]`. Fields shorter than
/// two points have no interior to copy from and are left untouched.
pub fn boundary_conditions(field: &mut DVector<f64>) {
    let n = field.len();
    if n < 2 {
        return;
    }

    field[0] = field[1];
    field[n - 1] = field[n - 2];
}

/// Write the source magnitude back at `floor(N/3)`
pub fn reinject_source(field: &mut DVector<f64>, source_strength: f64) {
    let n = field.len();
    if n > 0 {
        field[source_index(n)] = source_strength;
    }
}
