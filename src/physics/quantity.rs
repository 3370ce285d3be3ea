//! Three-level state container with a full history table
//!
//! A [`Quantity`] holds the field at the previous, current and next time
//! levels, plus an `N × T` history whose column `t` is the field stored at
//! step `t`.
//!
//! # Level protocol
//!
//! ```text
//!  scheme writes      store_timestep(t, Next)      shift()
//!  ─────────────▶ next ───────────────────▶ history ───────▶ previous := current
//!                                                           current  := next
//! ```
//!
//! The three levels are independent allocations. [`Quantity::shift`] copies
//! values, so after a shift `current` and `next` hold equal numbers but never
//! share storage. `next` keeps its stale content until a scheme overwrites it.

use nalgebra::DVector;
use ndarray::Array2;

use crate::solver::SolverError;

/// Selects one of the three time levels of a [`Quantity`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeLevel {
    /// Level `n - 1`
    Previous,

    /// Level `n`
    Current,

    /// Level `n + 1`, the one being computed
    Next,
}

/// Field values over the grid at three time levels, plus stored history
#[derive(Debug, Clone, PartialEq)]
pub struct Quantity {
    previous: DVector<f64>,
    current: DVector<f64>,
    next: DVector<f64>,

    /// Shape (grid points, time steps)
    history: Array2<f64>,
}

impl Quantity {
    /// Allocate a zeroed quantity for `grid_points` points and `time_steps` columns
    pub fn new(grid_points: usize, time_steps: usize) -> Self {
        Self {
            previous: DVector::zeros(grid_points),
            current: DVector::zeros(grid_points),
            next: DVector::zeros(grid_points),
            history: Array2::zeros((grid_points, time_steps)),
        }
    }

    /// Number of grid points `N`
    pub fn grid_points(&self) -> usize {
        self.current.len()
    }

    /// Number of history columns `T`
    pub fn time_steps(&self) -> usize {
        self.history.ncols()
    }

    /// Read a time level
    pub fn level(&self, level: TimeLevel) -> &DVector<f64> {
        match level {
            TimeLevel::Previous => &self.previous,
            TimeLevel::Current => &self.current,
            TimeLevel::Next => &self.next,
        }
    }

    /// Mutable access to a time level
    pub fn level_mut(&mut self, level: TimeLevel) -> &mut DVector<f64> {
        match level {
            TimeLevel::Previous => &mut self.previous,
            TimeLevel::Current => &mut self.current,
            TimeLevel::Next => &mut self.next,
        }
    }

    /// Current level (read) and next level (write) at the same time
    ///
    /// This is the borrow a scheme needs: it reads `current` and writes `next`.
    pub fn current_and_next_mut(&mut self) -> (&DVector<f64>, &mut DVector<f64>) {
        (&self.current, &mut self.next)
    }

    /// Copy a level into history column `index`
    ///
    /// # Errors
    ///
    /// [`SolverError::HistoryIndexOutOfRange`] when `index >= time_steps()`.
    pub fn store_timestep(&mut self, index: usize, level: TimeLevel) -> Result<(), SolverError> {
        let capacity = self.time_steps();
        if index >= capacity {
            return Err(SolverError::HistoryIndexOutOfRange { index, capacity });
        }

        let source = match level {
            TimeLevel::Previous => &self.previous,
            TimeLevel::Current => &self.current,
            TimeLevel::Next => &self.next,
        };

        self.history
            .column_mut(index)
            .iter_mut()
            .zip(source.iter())
            .for_each(|(stored, value)| *stored = *value);

        Ok(())
    }

    /// Move `current → previous` and `next → current` by value
    pub fn shift(&mut self) {
        self.previous.copy_from(&self.current);
        self.current.copy_from(&self.next);
    }

    /// Stored history, shape (grid points, time steps)
    pub fn history(&self) -> &Array2<f64> {
        &self.history
    }

    /// Consume the quantity, keeping only its history table
    pub fn into_history(self) -> Array2<f64> {
        self.history
    }
}
