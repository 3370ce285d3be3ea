//! Multi-resolution comparison of every scheme
//!
//! Runs each scheme at dt = 30, 60, 180 and 360 s over the same physical
//! time, prints how far each final profile lies from the dt = 30 s run and
//! writes the histories to `target/multi_resolution/`.
//!
//! ```bash
//! cargo run --example multi_resolution
//! RUST_LOG=debug cargo run --example multi_resolution
//! ```

use std::error::Error;
use std::fs;
use std::path::Path;

use plume_rs::output::{CsvConfig, CsvMetadata, export_history_csv};
use plume_rs::physics::PhysicalParameters;
use plume_rs::solver::{
    SchemeKind, SolverConfiguration, multi_resolution_sweep, profile_distance, stability_report,
};

const BASE_STEPS: usize = 50;
const GRID_POINTS: usize = 9;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let parameters = PhysicalParameters::default();
    let output_dir = Path::new("target/multi_resolution");
    fs::create_dir_all(output_dir)?;

    println!("=== Multi-resolution sweep: {GRID_POINTS} points, {BASE_STEPS} steps at dt = 360 s ===\n");

    for kind in SchemeKind::ALL {
        let runs = multi_resolution_sweep(kind, &parameters, BASE_STEPS, GRID_POINTS)?;
        let Some(finest) = runs.first() else {
            continue;
        };

        println!("{kind}");
        for run in &runs {
            let config = SolverConfiguration::new(GRID_POINTS, run.time_steps, run.dt);
            let report = stability_report(kind, &parameters, &config);
            let distance = profile_distance(&run.result.final_state, &finest.result.final_state)?;

            println!(
                "  dt = {:>5} s  T = {:>4}  Cr = {:.3}  stable = {:<5}  max |c - c(dt=30)| = {:.4}",
                run.dt,
                run.time_steps,
                report.courant,
                report.is_stable(),
                distance
            );

            let path = output_dir.join(format!("{}_dt{}.csv", kind.name(), run.dt));
            let csv = CsvConfig::default()
                .max_lines(500)
                .with_metadata(CsvMetadata::from_result(&run.result).with_parameters(&parameters));
            export_history_csv(&run.result, &path, Some(&csv))?;
        }
        println!();
    }

    println!("Histories written to {}", output_dir.display());
    Ok(())
}
