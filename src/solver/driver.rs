//! Time-stepping driver
//!
//! # State Machine
//!
//! ```text
//!  Init ──seed()──▶ Seeded ──advance()──▶ Stepping(1) ──advance()──▶ … ──▶ Done
//!                     │                                                    ▲
//!                     └──────────────── (T == 1) ──────────────────────────┘
//! ```
//!
//! Each `advance()` computes one step `s` in `1..T`:
//!
//! 1. the scheme writes the interior of `next` from `current`
//! 2. the source is reinjected when the scheme emits continuously
//! 3. zero-gradient boundary conditions are applied to `next`
//! 4. `next` is checked for NaN/Inf and stored in history column `s`
//! 5. the levels are shifted
//!
//! When the scenario tracks the analytic solution, a second [`Quantity`]
//! follows the same protocol with the erfc profile at `t = s·dt`.
//!
//! [`Simulation::run`] drives a scenario from `Init` to `Done` in one call;
//! [`multi_resolution_sweep`] repeats a run at four time resolutions that
//! cover the same physical time.

use nalgebra::DVector;

use crate::physics::conditions::{boundary_conditions, initial_conditions, reinject_source};
use crate::physics::{AnalyticSolution, PhysicalParameters, Quantity, TimeLevel};
use crate::solver::{
    Scenario, SchemeKind, SimulationResult, SolverConfiguration, SolverError, SourcePolicy,
    StabilityReport, validate_field,
};

// =================================================================================================
// Driver
// =================================================================================================

/// Lifecycle of a [`TimeStepDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Allocated, nothing computed yet
    Init,

    /// Step 0 holds the initial condition
    Seeded,

    /// The given step is the last one computed
    Stepping(usize),

    /// Every column of the history has been written
    Done,
}

/// Analytic reference advanced in lockstep with the numeric field
#[derive(Debug, Clone)]
struct AnalyticTrack {
    solution: AnalyticSolution,
    quantity: Quantity,
}

/// Runs one scenario at one resolution
///
/// # Example
///
/// ```rust
/// use plume_rs::physics::PhysicalParameters;
/// use plume_rs::solver::{DriverState, Scenario, SchemeKind, SolverConfiguration, TimeStepDriver};
///
/// let scenario = Scenario::new(SchemeKind::CrankNicolson.build(), PhysicalParameters::default());
/// let mut driver = TimeStepDriver::new(&scenario, SolverConfiguration::new(9, 3, 30.0))?;
///
/// driver.seed()?;
/// driver.advance()?;
/// assert_eq!(driver.state(), DriverState::Stepping(1));
/// driver.advance()?;
/// assert_eq!(driver.state(), DriverState::Done);
///
/// let result = driver.finish()?;
/// assert_eq!(result.len(), 3);
/// # Ok::<(), plume_rs::solver::SolverError>(())
/// ```
pub struct TimeStepDriver<'a> {
    scenario: &'a Scenario,
    configuration: SolverConfiguration,
    stability: StabilityReport,
    state: DriverState,
    concentration: Quantity,
    analytic: Option<AnalyticTrack>,
}

impl<'a> TimeStepDriver<'a> {
    /// Validate the run and allocate its storage
    ///
    /// # Errors
    ///
    /// Invalid parameters or configuration, or a grid smaller than the
    /// scheme stencil. Nothing is allocated in that case.
    pub fn new(
        scenario: &'a Scenario,
        configuration: SolverConfiguration,
    ) -> Result<Self, SolverError> {
        scenario.validate(&configuration)?;

        let n = configuration.grid_points;
        let t = configuration.time_steps;
        let stability =
            StabilityReport::for_scheme(scenario.scheme.as_ref(), &scenario.parameters, &configuration);

        let analytic = scenario.track_analytic.then(|| AnalyticTrack {
            solution: AnalyticSolution::new(scenario.parameters, n),
            quantity: Quantity::new(n, t),
        });

        Ok(Self {
            scenario,
            configuration,
            stability,
            state: DriverState::Init,
            concentration: Quantity::new(n, t),
            analytic,
        })
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Write the initial condition into step 0
    pub fn seed(&mut self) -> Result<(), SolverError> {
        if self.state != DriverState::Init {
            return Err(self.out_of_order("seed"));
        }

        let scheme = self.scenario.scheme.name();
        let c1 = self.scenario.parameters.source_strength;

        log::info!(
            "{}: N = {}, T = {}, dt = {} s, Courant = {:.4}, diffusion number = {:.3e}",
            scheme,
            self.configuration.grid_points,
            self.configuration.time_steps,
            self.configuration.dt,
            self.stability.courant,
            self.stability.diffusion
        );
        self.warn_on_stability();

        initial_conditions(c1, &mut self.concentration);
        boundary_conditions(self.concentration.level_mut(TimeLevel::Current));
        self.concentration.store_timestep(0, TimeLevel::Current)?;

        // The erfc profile is undefined at t = 0: seed it with the same pulse
        if let Some(track) = self.analytic.as_mut() {
            initial_conditions(c1, &mut track.quantity);
            boundary_conditions(track.quantity.level_mut(TimeLevel::Current));
            track.quantity.store_timestep(0, TimeLevel::Current)?;
        }

        self.state = if self.configuration.time_steps == 1 {
            DriverState::Done
        } else {
            DriverState::Seeded
        };
        Ok(())
    }

    /// Compute the next step
    pub fn advance(&mut self) -> Result<(), SolverError> {
        let step = match self.state {
            DriverState::Seeded => 1,
            DriverState::Stepping(last) => last + 1,
            DriverState::Init | DriverState::Done => return Err(self.out_of_order("advance")),
        };

        let scheme = self.scenario.scheme.as_ref();
        let parameters = &self.scenario.parameters;

        {
            let (current, next) = self.concentration.current_and_next_mut();
            scheme.advance(current, next, parameters, &self.configuration)?;
        }

        let next = self.concentration.level_mut(TimeLevel::Next);
        if scheme.source_policy() == SourcePolicy::Continuous {
            reinject_source(next, parameters.source_strength);
        }
        boundary_conditions(next);
        validate_field(next, step)?;

        self.concentration.store_timestep(step, TimeLevel::Next)?;
        self.concentration.shift();

        if let Some(track) = self.analytic.as_mut() {
            let time = self.configuration.time_of(step);
            let reference = track.quantity.level_mut(TimeLevel::Next);
            track.solution.evaluate_into(reference, time)?;
            boundary_conditions(reference);
            track.quantity.store_timestep(step, TimeLevel::Next)?;
            track.quantity.shift();
        }

        log::trace!(
            "{}: step {} (t = {} s) stored",
            scheme.name(),
            step,
            self.configuration.time_of(step)
        );

        self.state = if step + 1 == self.configuration.time_steps {
            DriverState::Done
        } else {
            DriverState::Stepping(step)
        };
        Ok(())
    }

    /// Seed if needed and advance until every step is stored
    pub fn run_to_completion(&mut self) -> Result<(), SolverError> {
        if self.state == DriverState::Init {
            self.seed()?;
        }
        while self.state != DriverState::Done {
            self.advance()?;
        }
        Ok(())
    }

    /// Hand over the completed histories
    pub fn finish(self) -> Result<SimulationResult, SolverError> {
        if self.state != DriverState::Done {
            return Err(self.out_of_order("finish"));
        }

        let configuration = self.configuration;
        let time_points = (0..configuration.time_steps)
            .map(|step| configuration.time_of(step))
            .collect();
        let final_state: DVector<f64> = self.concentration.level(TimeLevel::Current).clone();

        let mut result = SimulationResult::new(
            self.concentration.into_history(),
            self.analytic.map(|track| track.quantity.into_history()),
            time_points,
            final_state,
        );

        result.add_metadata("scheme", self.scenario.scheme.name());
        result.add_metadata("grid points", &configuration.grid_points.to_string());
        result.add_metadata("time steps", &configuration.time_steps.to_string());
        result.add_metadata("dt", &configuration.dt.to_string());
        result.add_metadata("total time", &configuration.total_time().to_string());
        result.add_metadata("courant", &self.stability.courant.to_string());
        result.add_metadata("diffusion number", &self.stability.diffusion.to_string());

        log::info!(
            "{}: completed {} steps ({} s simulated)",
            self.scenario.scheme.name(),
            configuration.time_steps,
            configuration.total_time()
        );

        Ok(result)
    }

    fn warn_on_stability(&self) {
        let scheme = self.scenario.scheme.name();
        if self.stability.unconditionally_unstable {
            log::warn!(
                "{}: centred advection without diffusion is unstable for any dt",
                scheme
            );
        }
        if self.stability.courant_exceeded {
            log::warn!(
                "{}: Courant number {:.3} exceeds 1, expect growing oscillations",
                scheme,
                self.stability.courant
            );
        }
        if self.stability.diffusion_exceeded {
            log::warn!(
                "{}: diffusion number {:.3} exceeds 1/2",
                scheme,
                self.stability.diffusion
            );
        }
    }

    fn out_of_order(&self, operation: &str) -> SolverError {
        SolverError::invalid(format!(
            "cannot {} a driver in state {:?}",
            operation, self.state
        ))
    }
}

impl std::fmt::Debug for TimeStepDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeStepDriver")
            .field("scenario", self.scenario)
            .field("configuration", &self.configuration)
            .field("state", &self.state)
            .finish()
    }
}

// =================================================================================================
// One-shot Run
// =================================================================================================

/// Runs a scenario from start to finish
pub struct Simulation;

impl Simulation {
    /// Seed, advance `T - 1` times and return the result
    pub fn run(
        scenario: &Scenario,
        configuration: &SolverConfiguration,
    ) -> Result<SimulationResult, SolverError> {
        let mut driver = TimeStepDriver::new(scenario, *configuration)?;
        driver.run_to_completion()?;
        driver.finish()
    }
}

// =================================================================================================
// Multi-resolution Sweep
// =================================================================================================

/// Time-step sizes \[s\] of the multi-resolution sweep, finest first
pub const SWEEP_TIME_STEPS: [f64; 4] = [30.0, 60.0, 180.0, 360.0];

/// One resolution of a sweep
#[derive(Debug, Clone)]
pub struct SweepRun {
    pub dt: f64,
    pub time_steps: usize,
    pub result: SimulationResult,
}

/// Run `kind` at every `dt` of [`SWEEP_TIME_STEPS`] over the same physical time
///
/// `base_steps` is the step count at the coarsest `dt`; finer runs use
/// `base_steps · (360 / dt)` steps (12, 6, 2 and 1 times as many).
pub fn multi_resolution_sweep(
    kind: SchemeKind,
    parameters: &PhysicalParameters,
    base_steps: usize,
    grid_points: usize,
) -> Result<Vec<SweepRun>, SolverError> {
    let coarsest = SWEEP_TIME_STEPS[SWEEP_TIME_STEPS.len() - 1];
    let scenario = Scenario::new(kind.build(), *parameters);

    SWEEP_TIME_STEPS
        .iter()
        .map(|&dt| {
            let multiplier = (coarsest / dt).round() as usize;
            let time_steps = base_steps * multiplier;
            log::debug!(
                "sweep {}: dt = {} s, {} steps",
                kind,
                dt,
                time_steps
            );

            let configuration = SolverConfiguration::new(grid_points, time_steps, dt);
            let result = Simulation::run(&scenario, &configuration)?;
            Ok(SweepRun {
                dt,
                time_steps,
                result,
            })
        })
        .collect()
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{FtcsScheme, UpstreamScheme};
    use approx::assert_relative_eq;

    fn upstream_scenario() -> Scenario {
        Scenario::new(Box::new(UpstreamScheme::new()), PhysicalParameters::default())
    }

    #[test]
    fn test_state_transitions() {
        let scenario = upstream_scenario();
        let mut driver = TimeStepDriver::new(&scenario, SolverConfiguration::new(9, 3, 30.0)).unwrap();

        assert_eq!(driver.state(), DriverState::Init);
        driver.seed().unwrap();
        assert_eq!(driver.state(), DriverState::Seeded);
        driver.advance().unwrap();
        assert_eq!(driver.state(), DriverState::Stepping(1));
        driver.advance().unwrap();
        assert_eq!(driver.state(), DriverState::Done);
    }

    #[test]
    fn test_out_of_order_calls_are_rejected() {
        let scenario = upstream_scenario();
        let mut driver = TimeStepDriver::new(&scenario, SolverConfiguration::new(9, 2, 30.0)).unwrap();

        assert!(matches!(driver.advance(), Err(SolverError::InvalidConfiguration(_))));
        driver.seed().unwrap();
        assert!(matches!(driver.seed(), Err(SolverError::InvalidConfiguration(_))));
        driver.advance().unwrap();
        assert!(matches!(driver.advance(), Err(SolverError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_finish_before_done_is_rejected() {
        let scenario = upstream_scenario();
        let mut driver = TimeStepDriver::new(&scenario, SolverConfiguration::new(9, 4, 30.0)).unwrap();
        driver.seed().unwrap();

        assert!(matches!(driver.finish(), Err(SolverError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_single_step_run_is_done_after_seed() {
        let scenario = upstream_scenario();
        let result = Simulation::run(&scenario, &SolverConfiguration::new(9, 1, 30.0)).unwrap();

        assert_eq!(result.numeric.dim(), (9, 1));
        assert_eq!(result.numeric[[3, 0]], 600.0);
    }

    #[test]
    fn test_seeded_column() {
        let scenario = upstream_scenario();
        let result = Simulation::run(&scenario, &SolverConfiguration::new(9, 5, 30.0)).unwrap();

        for i in 0..9 {
            let expected = if i == 3 { 600.0 } else { 0.0 };
            assert_eq!(result.numeric[[i, 0]], expected);
        }
    }

    #[test]
    fn test_continuous_source_is_reinjected() {
        let scenario = upstream_scenario();
        let result = Simulation::run(&scenario, &SolverConfiguration::new(9, 6, 30.0)).unwrap();

        for step in 0..6 {
            assert_eq!(result.numeric[[3, step]], 600.0);
        }
    }

    #[test]
    fn test_instantaneous_source_decays() {
        let scenario = Scenario::new(
            Box::new(UpstreamScheme::new().with_source_policy(SourcePolicy::Instantaneous)),
            PhysicalParameters::default(),
        );
        let result = Simulation::run(&scenario, &SolverConfiguration::new(9, 3, 30.0)).unwrap();

        assert!(result.numeric[[3, 1]] < 600.0);
        assert!(result.numeric[[4, 1]] > 0.0);
    }

    #[test]
    fn test_boundaries_hold_at_every_step() {
        let scenario = Scenario::new(Box::new(FtcsScheme::new()), PhysicalParameters::default());
        let result = Simulation::run(&scenario, &SolverConfiguration::new(9, 10, 30.0)).unwrap();

        for step in 0..10 {
            assert_eq!(result.numeric[[0, step]], result.numeric[[1, step]]);
            assert_eq!(result.numeric[[8, step]], result.numeric[[7, step]]);
        }
    }

    #[test]
    fn test_time_points_and_metadata() {
        let scenario = upstream_scenario();
        let result = Simulation::run(&scenario, &SolverConfiguration::new(9, 4, 60.0)).unwrap();

        assert_eq!(result.time_points, vec![0.0, 60.0, 120.0, 180.0]);
        assert_eq!(result.get_metadata("scheme"), Some("Upstream"));
        assert_eq!(result.get_metadata("time steps"), Some("4"));
        assert_eq!(result.get_metadata("dt"), Some("60"));
        assert_eq!(result.final_state.as_slice(), result.numeric.column(3).to_vec().as_slice());
    }

    #[test]
    fn test_analytic_is_tracked_in_lockstep() {
        let scenario = upstream_scenario().with_analytic();
        let config = SolverConfiguration::new(9, 4, 30.0);
        let result = Simulation::run(&scenario, &config).unwrap();

        let analytic = result.analytic.as_ref().unwrap();
        assert_eq!(analytic.dim(), (9, 4));
        assert_eq!(analytic[[3, 0]], 600.0);

        let reference = AnalyticSolution::new(PhysicalParameters::default(), 9);
        for step in 1..4 {
            for i in 1..8 {
                let expected = reference.value_at(i, config.time_of(step));
                assert_relative_eq!(analytic[[i, step]], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_analytic_edges_are_zero_gradient() {
        let scenario = upstream_scenario().with_analytic();
        let result = Simulation::run(&scenario, &SolverConfiguration::new(9, 5, 30.0)).unwrap();
        let analytic = result.analytic.as_ref().unwrap();

        // The raw erfc tail differs between x[7] and x[8] from step 2 on
        for step in 0..5 {
            assert_eq!(analytic[[0, step]], analytic[[1, step]]);
            assert_eq!(analytic[[8, step]], analytic[[7, step]]);
        }
    }

    #[test]
    fn test_analytic_absent_by_default() {
        let scenario = upstream_scenario();
        let result = Simulation::run(&scenario, &SolverConfiguration::new(9, 2, 30.0)).unwrap();
        assert!(result.analytic.is_none());
    }

    #[test]
    fn test_grid_too_small_fails_before_stepping() {
        let scenario = Scenario::new(SchemeKind::LaxWendroff.build(), PhysicalParameters::default());
        let err = TimeStepDriver::new(&scenario, SolverConfiguration::new(4, 10, 30.0)).unwrap_err();
        assert!(matches!(err, SolverError::GridTooSmall { .. }));
    }

    #[test]
    fn test_instability_is_reported() {
        // Cr = 30: FTCS blows up to Inf within a few hundred steps
        let params = PhysicalParameters::default().with_velocity(1000.0);
        let scenario = Scenario::new(Box::new(FtcsScheme::new()), params);
        let err = Simulation::run(&scenario, &SolverConfiguration::new(9, 2000, 30.0)).unwrap_err();

        assert!(matches!(err, SolverError::NumericalInstability { .. }));
    }

    #[test]
    fn test_sweep_covers_same_physical_time() {
        let runs = multi_resolution_sweep(
            SchemeKind::CrankNicolson,
            &PhysicalParameters::default(),
            3,
            9,
        )
        .unwrap();

        let steps: Vec<usize> = runs.iter().map(|run| run.time_steps).collect();
        assert_eq!(steps, vec![36, 18, 6, 3]);

        for run in &runs {
            assert_relative_eq!(run.result.time_points[0], 0.0);
            assert_eq!(run.result.len(), run.time_steps);
            assert_relative_eq!(run.dt * run.time_steps as f64, 1080.0);
        }
    }
}
