//! Crank-Nicolson implicit scheme
//!
//! # Mathematical Background
//!
//! Trapezoidal rule in time, centred differences in space. With
//! `a = u·dt/(4dx)` and `b = k·dt/(2dx²)` each interior row reads
//!
//! ```text
//! (-a-b)·xᵢ₋₁ + (1+2b)·xᵢ + (a-b)·xᵢ₊₁  =  (a+b)·cᵢ₋₁ + (1-2b)·cᵢ + (b-a)·cᵢ₊₁
//! └────────────── M_implicit · x ─────┘    └──────── M_explicit · c ─────────┘
//! ```
//!
//! The first and last rows close the system with the zero-gradient
//! condition: `x₀ - x₁ = 0` and `x_{N-1} - x_{N-2} = 0` on the implicit side,
//! zero rows on the explicit side.
//!
//! # Solving
//!
//! Both matrices are tridiagonal, so they are stored as three bands and the
//! system is solved with the Thomas algorithm in O(N). A dense LU path
//! ([`LinearSolver::DenseLu`]) builds the full `N × N` matrix instead; it
//! gives the same answer on small grids and is kept for cross-checking.
//!
//! # Characteristics
//!
//! - **Order**: second order in space and time
//! - **Stability**: unconditionally stable (von Neumann)
//! - **Behaviour**: oscillates behind sharp fronts at large `dt`; interior
//!   results are clamped to be non-negative

use nalgebra::{DMatrix, DVector};

use crate::physics::PhysicalParameters;
use crate::solver::traits::{check_grid, check_lengths};
use crate::solver::{Scheme, SolverConfiguration, SolverError, SourcePolicy};

// =================================================================================================
// Tridiagonal System
// =================================================================================================

/// Square tridiagonal matrix stored by bands
///
/// Row `i` is `lower[i]·x[i-1] + diagonal[i]·x[i] + upper[i]·x[i+1]`;
/// `lower[0]` and `upper[N-1]` are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalSystem {
    pub lower: Vec<f64>,
    pub diagonal: Vec<f64>,
    pub upper: Vec<f64>,
}

impl TridiagonalSystem {
    /// Build a system from its three bands
    ///
    /// # Panics
    ///
    /// Panics if the bands do not have the same length.
    pub fn new(lower: Vec<f64>, diagonal: Vec<f64>, upper: Vec<f64>) -> Self {
        assert_eq!(lower.len(), diagonal.len(), "lower band length");
        assert_eq!(upper.len(), diagonal.len(), "upper band length");
        Self {
            lower,
            diagonal,
            upper,
        }
    }

    /// All-zero system of size `n`
    pub fn zeros(n: usize) -> Self {
        Self::new(vec![0.0; n], vec![0.0; n], vec![0.0; n])
    }

    /// Matrix size
    pub fn len(&self) -> usize {
        self.diagonal.len()
    }

    /// `true` for a 0 × 0 system
    pub fn is_empty(&self) -> bool {
        self.diagonal.is_empty()
    }

    /// Set row `i` to `(lower, diagonal, upper)`
    pub fn set_row(&mut self, i: usize, lower: f64, diagonal: f64, upper: f64) {
        self.lower[i] = lower;
        self.diagonal[i] = diagonal;
        self.upper[i] = upper;
    }

    /// Matrix-vector product `M·x`
    pub fn multiply(&self, x: &DVector<f64>) -> DVector<f64> {
        let n = self.len();
        DVector::from_fn(n, |i, _| {
            let mut value = self.diagonal[i] * x[i];
            if i > 0 {
                value += self.lower[i] * x[i - 1];
            }
            if i + 1 < n {
                value += self.upper[i] * x[i + 1];
            }
            value
        })
    }

    /// Solve `M·x = rhs` with the Thomas algorithm
    ///
    /// # Errors
    ///
    /// [`SolverError::SingularMatrix`] when a pivot vanishes.
    pub fn solve(&self, rhs: &DVector<f64>) -> Result<DVector<f64>, SolverError> {
        let n = self.len();
        if rhs.len() != n {
            return Err(SolverError::LengthMismatch {
                expected: n,
                actual: rhs.len(),
            });
        }
        if n == 0 {
            return Ok(DVector::zeros(0));
        }

        // Forward sweep: eliminate the lower band
        let mut upper_prime = vec![0.0; n];
        let mut rhs_prime = vec![0.0; n];

        for i in 0..n {
            let (pivot, carried_rhs) = if i == 0 {
                (self.diagonal[0], rhs[0])
            } else {
                (
                    self.diagonal[i] - self.lower[i] * upper_prime[i - 1],
                    rhs[i] - self.lower[i] * rhs_prime[i - 1],
                )
            };

            let scale = self.diagonal[i]
                .abs()
                .max(self.lower[i].abs())
                .max(self.upper[i].abs());
            if !pivot.is_finite() || pivot.abs() <= f64::EPSILON * scale || scale == 0.0 {
                return Err(SolverError::SingularMatrix { row: i });
            }

            upper_prime[i] = self.upper[i] / pivot;
            rhs_prime[i] = carried_rhs / pivot;
        }

        // Back substitution
        let mut x = DVector::zeros(n);
        x[n - 1] = rhs_prime[n - 1];
        for i in (0..n - 1).rev() {
            x[i] = rhs_prime[i] - upper_prime[i] * x[i + 1];
        }

        Ok(x)
    }

    /// Dense `N × N` copy of the matrix
    pub fn to_dense(&self) -> DMatrix<f64> {
        let n = self.len();
        let mut dense = DMatrix::zeros(n, n);
        for i in 0..n {
            dense[(i, i)] = self.diagonal[i];
            if i > 0 {
                dense[(i, i - 1)] = self.lower[i];
            }
            if i + 1 < n {
                dense[(i, i + 1)] = self.upper[i];
            }
        }
        dense
    }
}

/// Solve `M·x = rhs` through a dense LU decomposition with partial pivoting
pub fn solve_dense(matrix: DMatrix<f64>, rhs: &DVector<f64>) -> Result<DVector<f64>, SolverError> {
    let lu = matrix.lu();
    lu.solve(rhs).ok_or_else(|| {
        let row = lu
            .u()
            .diagonal()
            .iter()
            .position(|pivot| *pivot == 0.0)
            .unwrap_or(0);
        SolverError::SingularMatrix { row }
    })
}

// =================================================================================================
// Crank-Nicolson Scheme
// =================================================================================================

/// Linear solver used for the implicit step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinearSolver {
    /// Thomas algorithm on the three bands, O(N)
    #[default]
    Tridiagonal,

    /// Dense LU on the full matrix, O(N³)
    DenseLu,
}

/// Crank-Nicolson scheme with zero-gradient closure rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrankNicolsonScheme {
    solver: LinearSolver,
    source: SourcePolicy,
}

impl Default for CrankNicolsonScheme {
    fn default() -> Self {
        Self {
            solver: LinearSolver::Tridiagonal,
            source: SourcePolicy::Continuous,
        }
    }
}

impl CrankNicolsonScheme {
    /// Create a Crank-Nicolson scheme using the tridiagonal solver
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the linear solver
    pub fn with_solver(mut self, solver: LinearSolver) -> Self {
        self.solver = solver;
        self
    }

    /// Override the source behaviour
    pub fn with_source_policy(mut self, source: SourcePolicy) -> Self {
        self.source = source;
        self
    }

    /// Assemble `(M_implicit, M_explicit)` for `n` grid points
    pub fn assemble(
        parameters: &PhysicalParameters,
        configuration: &SolverConfiguration,
        n: usize,
    ) -> (TridiagonalSystem, TridiagonalSystem) {
        let dt = configuration.dt;
        let dx = parameters.dx;
        let a = parameters.velocity * dt / (4.0 * dx);
        let b = parameters.diffusivity * dt / (2.0 * dx * dx);

        let mut implicit = TridiagonalSystem::zeros(n);
        let mut explicit = TridiagonalSystem::zeros(n);

        for i in 1..n.saturating_sub(1) {
            implicit.set_row(i, -a - b, 1.0 + 2.0 * b, a - b);
            explicit.set_row(i, a + b, 1.0 - 2.0 * b, b - a);
        }

        // Zero-gradient closure: x₀ = x₁ and x_{N-1} = x_{N-2}
        if n >= 2 {
            implicit.set_row(0, 0.0, 1.0, -1.0);
            implicit.set_row(n - 1, -1.0, 1.0, 0.0);
        }

        (implicit, explicit)
    }

    /// Solve `M_implicit·x = rhs` with the configured solver
    ///
    /// The Thomas algorithm does not pivot, so a vanishing pivot does not
    /// prove the matrix singular (row 1 hits `1 + b - a = 0` when `a = 1 + b`).
    /// Those systems are handed to the pivoting dense LU, and only its
    /// failure is reported as [`SolverError::SingularMatrix`].
    pub fn solve_system(
        &self,
        implicit: &TridiagonalSystem,
        rhs: &DVector<f64>,
    ) -> Result<DVector<f64>, SolverError> {
        match self.solver {
            LinearSolver::Tridiagonal => match implicit.solve(rhs) {
                Err(SolverError::SingularMatrix { row }) => {
                    log::debug!("Thomas pivot vanished at row {row}, retrying with dense LU");
                    solve_dense(implicit.to_dense(), rhs)
                }
                other => other,
            },
            LinearSolver::DenseLu => solve_dense(implicit.to_dense(), rhs),
        }
    }
}

impl Scheme for CrankNicolsonScheme {
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
        let (implicit, explicit) = Self::assemble(parameters, configuration, n);

        let rhs = explicit.multiply(current);
        let solution = self.solve_system(&implicit, &rhs)?;

        for i in 1..n - 1 {
            next[i] = solution[i].max(0.0);
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "Crank-Nicolson"
    }

    fn source_policy(&self) -> SourcePolicy {
        self.source
    }

    fn is_implicit(&self) -> bool {
        true
    }
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn sample_field(n: usize) -> DVector<f64> {
        DVector::from_fn(n, |i, _| 50.0 + 30.0 * (i as f64 * 0.7).sin())
    }

    #[test]
    fn test_assembly_rows() {
        let params = PhysicalParameters::default();
        let (implicit, explicit) = CrankNicolsonScheme::assemble(&params, &SolverConfiguration::new(6, 2, 30.0), 6);

        let a = 3.39 * 30.0 / 4000.0;
        let b = 2.0 * 30.0 / 2.0e6;

        assert_eq!((implicit.diagonal[0], implicit.upper[0]), (1.0, -1.0));
        assert_eq!((implicit.lower[5], implicit.diagonal[5]), (-1.0, 1.0));
        assert_relative_eq!(implicit.lower[2], -a - b);
        assert_relative_eq!(implicit.diagonal[2], 1.0 + 2.0 * b);
        assert_relative_eq!(implicit.upper[2], a - b);
        assert_relative_eq!(explicit.lower[2], a + b);
        assert_relative_eq!(explicit.diagonal[2], 1.0 - 2.0 * b);
        assert_relative_eq!(explicit.upper[2], b - a);

        // Explicit closure rows are zero
        assert_eq!(explicit.diagonal[0], 0.0);
        assert_eq!(explicit.diagonal[5], 0.0);
    }

    #[test]
    fn test_identity_case_reproduces_interior() {
        // u = 0, k = 0: interior rows are the identity on both sides
        let params = PhysicalParameters::new(0.0, 0.0, 600.0, 1000.0);
        let config = SolverConfiguration::new(8, 2, 30.0);
        let current = sample_field(8);
        let mut next = DVector::zeros(8);

        CrankNicolsonScheme::new()
            .advance(&current, &mut next, &params, &config)
            .unwrap();

        for i in 1..7 {
            assert_relative_eq!(next[i], current[i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_round_trip_through_implicit_matrix() {
        let params = PhysicalParameters::default();
        let (implicit, _) = CrankNicolsonScheme::assemble(&params, &SolverConfiguration::new(15, 2, 180.0), 15);
        let field = sample_field(15);

        let rhs = implicit.multiply(&field);
        let recovered = implicit.solve(&rhs).unwrap();

        for i in 0..15 {
            assert_relative_eq!(recovered[i], field[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_tridiagonal_matches_dense_lu() {
        let params = PhysicalParameters::default();
        let config = SolverConfiguration::new(9, 2, 360.0);
        let mut current = DVector::zeros(9);
        current[3] = 600.0;

        let mut banded = DVector::zeros(9);
        let mut dense = DVector::zeros(9);
        CrankNicolsonScheme::new()
            .advance(&current, &mut banded, &params, &config)
            .unwrap();
        CrankNicolsonScheme::new()
            .with_solver(LinearSolver::DenseLu)
            .advance(&current, &mut dense, &params, &config)
            .unwrap();

        for i in 0..9 {
            assert_relative_eq!(banded[i], dense[i], epsilon = 1e-10);
        }
    }

    #[test]
    fn test_dense_matrix_layout() {
        let system = TridiagonalSystem::new(
            vec![0.0, 1.0, 2.0],
            vec![4.0, 5.0, 6.0],
            vec![7.0, 8.0, 0.0],
        );
        let dense = system.to_dense();

        assert_eq!(dense[(0, 0)], 4.0);
        assert_eq!(dense[(0, 1)], 7.0);
        assert_eq!(dense[(1, 0)], 1.0);
        assert_eq!(dense[(2, 1)], 2.0);
        assert_eq!(dense[(0, 2)], 0.0);

        let x = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(system.multiply(&x), &dense * &x);
    }

    #[test]
    fn test_singular_system_is_reported() {
        // [[1, 1], [1, 1]]
        let system = TridiagonalSystem::new(vec![0.0, 1.0], vec![1.0, 1.0], vec![1.0, 0.0]);
        let rhs = DVector::from_vec(vec![1.0, 2.0]);

        assert_eq!(system.solve(&rhs), Err(SolverError::SingularMatrix { row: 1 }));
        assert!(matches!(
            solve_dense(system.to_dense(), &rhs),
            Err(SolverError::SingularMatrix { .. })
        ));
    }

    #[test]
    fn test_vanishing_thomas_pivot_falls_back_to_lu() {
        // a = u·dt/(4dx) = 1 and b = 0: the unpivoted row-1 pivot is exactly zero
        let params = PhysicalParameters::new(4.0, 0.0, 600.0, 1000.0);
        let config = SolverConfiguration::new(9, 2, 1000.0);
        let mut current = DVector::zeros(9);
        current[3] = 600.0;

        let (implicit, explicit) = CrankNicolsonScheme::assemble(&params, &config, 9);
        let rhs = explicit.multiply(&current);
        assert_eq!(implicit.solve(&rhs), Err(SolverError::SingularMatrix { row: 1 }));

        let mut banded = DVector::zeros(9);
        let mut dense = DVector::zeros(9);
        CrankNicolsonScheme::new()
            .advance(&current, &mut banded, &params, &config)
            .unwrap();
        CrankNicolsonScheme::new()
            .with_solver(LinearSolver::DenseLu)
            .advance(&current, &mut dense, &params, &config)
            .unwrap();

        for i in 0..9 {
            assert_relative_eq!(banded[i], dense[i], epsilon = 1e-9);
        }
        assert_relative_eq!(banded[1], 9600.0 / 13.0, epsilon = 1e-6);
        assert_relative_eq!(banded[4], 6000.0 / 13.0, epsilon = 1e-6);
    }

    #[test]
    fn test_too_small_grid_is_an_error() {
        let params = PhysicalParameters::default();
        let config = SolverConfiguration::new(0, 2, 30.0);
        let empty = DVector::zeros(0);

        let result = CrankNicolsonScheme::new().advance(&empty, &mut DVector::zeros(0), &params, &config);
        assert!(matches!(result, Err(SolverError::GridTooSmall { required: 3, actual: 0, .. })));
    }

    #[test]
    fn test_interior_is_non_negative() {
        // Large dt makes Crank-Nicolson ring behind the pulse
        let params = PhysicalParameters::new(3.39, 0.0, 600.0, 1000.0);
        let config = SolverConfiguration::new(12, 2, 2000.0);
        let mut current = DVector::zeros(12);
        current[4] = 600.0;
        let mut next = DVector::zeros(12);

        CrankNicolsonScheme::new()
            .advance(&current, &mut next, &params, &config)
            .unwrap();

        assert!(next.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn test_is_implicit() {
        assert!(CrankNicolsonScheme::new().is_implicit());
    }
}
