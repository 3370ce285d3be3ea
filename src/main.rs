//! plume command-line interface
//!
//! Runs one scheme (or a multi-resolution sweep) and prints the final
//! profile. Histories can be written to CSV for external plotting.
//!
//! ```text
//! plume                      # 50 steps, 9 grid points, Upstream
//! plume 200 31 --scheme crank-nicolson --analytic --output cn.csv
//! plume 50 9 --scheme lax-wendroff --sweep
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;

use plume_rs::config::RunConfiguration;
use plume_rs::output::{CsvConfig, CsvMetadata, export_analytic_csv, export_history_csv};
use plume_rs::physics::analytic::source_coordinates;
use plume_rs::solver::{
    Scenario, SchemeKind, Simulation, compare_histories, multi_resolution_sweep, profile_distance,
};

/// Rows kept in exported histories, the budget of a line plot
const MAX_EXPORTED_LINES: usize = 500;

/// 1D advection-diffusion of a point-source release
#[derive(Parser, Debug)]
#[command(name = "plume")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Finite-difference advection-diffusion solver", long_about = None)]
struct Cli {
    /// Number of stored time steps (default 50)
    #[arg(requires = "grid_points")]
    time_steps: Option<usize>,

    /// Number of grid points (default 9)
    grid_points: Option<usize>,

    /// Scheme: upstream, ftcs, lax-wendroff, nsfd, crank-nicolson
    #[arg(short, long, default_value_t = SchemeKind::Upstream)]
    scheme: SchemeKind,

    /// Time step [s] (overrides the configuration file)
    #[arg(long)]
    dt: Option<f64>,

    /// Also compute the analytic erfc solution and report the error
    #[arg(short, long)]
    analytic: bool,

    /// Run at dt = 30, 60, 180 and 360 s over the same physical time
    #[arg(long)]
    sweep: bool,

    /// JSON run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the history to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(short, long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();

    let mut run = match &cli.config {
        Some(path) => RunConfiguration::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => RunConfiguration::default(),
    };
    if let (Some(time_steps), Some(grid_points)) = (cli.time_steps, cli.grid_points) {
        run.time_steps = time_steps;
        run.grid_points = grid_points;
    }
    if let Some(dt) = cli.dt {
        run.dt = dt;
    }
    run.validate().context("invalid run configuration")?;

    if cli.sweep {
        sweep(&cli, &run)
    } else {
        single(&cli, &run)
    }
}

/// One scheme at one resolution
fn single(cli: &Cli, run: &RunConfiguration) -> Result<()> {
    let mut scenario = Scenario::new(cli.scheme.build(), run.parameters);
    scenario.track_analytic = cli.analytic;

    let configuration = run.solver_configuration();
    let result = Simulation::run(&scenario, &configuration)
        .with_context(|| format!("{} run failed", scenario.scheme_name()))?;

    println!(
        "{} | N = {} | T = {} | dt = {} s | t_end = {} s",
        scenario.scheme_name(),
        configuration.grid_points,
        configuration.time_steps,
        configuration.dt,
        configuration.total_time()
    );
    print_profile(
        source_coordinates(configuration.grid_points, run.parameters.dx).as_slice(),
        result.final_state.as_slice(),
    );

    if let Some(analytic) = &result.analytic {
        let errors = compare_histories(&result.numeric, analytic)?;
        println!(
            "analytic comparison: RMS = {:.4}, max |error| = {:.4}",
            errors.l2, errors.max_abs
        );
    }

    if let Some(path) = &cli.output {
        let csv = CsvConfig::default().max_lines(MAX_EXPORTED_LINES).with_metadata(
            CsvMetadata::from_result(&result).with_parameters(&run.parameters),
        );
        export_history_csv(&result, path, Some(&csv))
            .with_context(|| format!("writing {}", path.display()))?;
        log::info!("history written to {}", path.display());

        if result.analytic.is_some() {
            let analytic_path = suffixed(path, "analytic");
            export_analytic_csv(&result, &analytic_path, Some(&csv))
                .with_context(|| format!("writing {}", analytic_path.display()))?;
            log::info!("analytic history written to {}", analytic_path.display());
        }
    }

    Ok(())
}

/// One scheme at the four sweep resolutions
fn sweep(cli: &Cli, run: &RunConfiguration) -> Result<()> {
    let runs = multi_resolution_sweep(cli.scheme, &run.parameters, run.time_steps, run.grid_points)
        .with_context(|| format!("{} sweep failed", cli.scheme))?;

    let x = source_coordinates(run.grid_points, run.parameters.dx);
    let Some(finest) = runs.first() else {
        return Ok(());
    };

    for sweep_run in &runs {
        let distance = profile_distance(&sweep_run.result.final_state, &finest.result.final_state)?;
        println!(
            "{} | dt = {} s | T = {} | max |c - c(dt=30)| = {:.4}",
            cli.scheme, sweep_run.dt, sweep_run.time_steps, distance
        );
        print_profile(x.as_slice(), sweep_run.result.final_state.as_slice());

        if let Some(path) = &cli.output {
            let target = suffixed(path, &format!("dt{}", sweep_run.dt));
            let csv = CsvConfig::default()
                .max_lines(MAX_EXPORTED_LINES)
                .with_metadata(CsvMetadata::from_result(&sweep_run.result));
            export_history_csv(&sweep_run.result, &target, Some(&csv))
                .with_context(|| format!("writing {}", target.display()))?;
        }
    }

    Ok(())
}

fn print_profile(x: &[f64], values: &[f64]) {
    for (xi, ci) in x.iter().zip(values) {
        println!("  x = {:>8.1} m   c = {:>12.6}", xi, ci);
    }
}

/// `out.csv` + `analytic` → `out_analytic.csv`
fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "history".to_string());
    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    path.with_file_name(format!("{stem}_{suffix}.{extension}"))
}
