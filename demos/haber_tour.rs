//! Example: Haber Process - Le Chatelier Tour
//!
//! Runs the Haber process (N₂ + 3H₂ ↔ 2NH₃, ΔH = -92 kJ/mol) through three
//! disturbances and reports how the equilibrium answers each one:
//!
//! - Heating: exothermic, so the reverse constant k2 grows and NH₃ drops
//! - Compression (volume -20 %): every concentration rises, the side with
//!   fewer moles (NH₃) is favored
//! - Adding N₂ (+50 %): the forward reaction consumes the excess
//!
//! Both integrators are run and compared, and the run is written to CSV.
//!
//! Set `RUST_LOG=debug` to see every phase and boundary.

use equil_rs::prelude::*;
use equil_rs::output::export::{export_run_csv, CsvMetadata};

use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("═══════════════════════════════════════════════════════");
    println!("  Haber Process - Le Chatelier Tour");
    println!("═══════════════════════════════════════════════════════\n");

    // ====== Reaction and schedule ======

    let haber = catalog::haber_process()?;
    let scenario = Scenario::new(
        haber.spec,
        RunSchedule::new(vec![
            Perturbation::Temperature { effect: 0.2 },
            Perturbation::VolumePressure { effect: -0.2 },
            Perturbation::addition_of(Species::A, 0.5),
        ]),
    );

    println!("Reaction : {}", haber.name);
    println!("Kinetics : {}", haber.spec);
    println!("Phases   : {}\n", scenario.phase_count());

    // ====== Simulation ======

    let config = SimulationConfig::default();
    println!("Simulation:");
    println!("  Phase length      : {}", config.phase_length);
    println!("  Samples per phase : {}", config.samples_per_phase);
    println!("  Base constants    : {}\n", config.base_constants);

    let start = Instant::now();
    let run = PhaseScheduler::new(config.clone())?.run(&scenario)?;
    let adaptive_time = start.elapsed();

    let fixed_config = config.clone().with_solver(SolverType::FixedStep { substeps: 4 });
    let start = Instant::now();
    let fixed = PhaseScheduler::new(fixed_config)?.run(&scenario)?;
    let fixed_time = start.elapsed();

    // ====== Phase summary ======

    let names = &haber.reagents;
    println!(
        "{:<7} {:<24} {:>10} {:>10} {:>10}",
        "Phase", "Rate constants", names.display_name(Species::A),
        names.display_name(Species::B), names.display_name(Species::C)
    );
    for phase in run.phases() {
        let end = phase.final_state();
        println!(
            "{:<7} {:<24} {:>10.5} {:>10.5} {:>10.5}",
            phase.index,
            phase.constants.to_string(),
            end.get(Species::A),
            end.get(Species::B),
            end.get(Species::C)
        );
    }

    // ====== Boundaries ======

    println!("\nBoundaries:");
    for record in run.boundaries() {
        let shift = record
            .relative_change(Species::C)
            .map(|c| format!("{:+.2} %", 100.0 * c))
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "  t = {:>5} : {:<30} NH₃ jump {}",
            record.time,
            record.event.to_string(),
            shift
        );
    }

    // ====== Integrator comparison ======

    let worst = run
        .final_states()
        .iter()
        .zip(fixed.final_states())
        .map(|(a, f)| (*a - f).max_abs())
        .fold(0.0_f64, f64::max);

    println!("\nIntegrators:");
    println!("  {:<22} {:>10.2?}", run.solver_name(), adaptive_time);
    println!("  {:<22} {:>10.2?}", fixed.solver_name(), fixed_time);
    println!("  Largest final-state difference: {:.3e}", worst);

    // ====== Export ======

    let path = std::env::temp_dir().join("haber_tour.csv");
    let csv = CsvConfig::default()
        .with_metadata(CsvMetadata::from_run(&run, &config))
        .with_reagents(haber.reagents.clone());
    export_run_csv(&run, &path, Some(&csv))?;
    println!("\nData saved to {}", path.display());

    Ok(())
}
