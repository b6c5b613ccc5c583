// Runs the built-in integration check battery and a convergence table.
// Exits non-zero if any check fails.

use colored::Colorize;
use precip_ionization_rust::convergence::ConvergenceStudy;
use precip_ionization_rust::validation::{IntegrationCheckParams, run_integration_checks};
use std::process::ExitCode;

fn main() -> ExitCode {
    let params = IntegrationCheckParams::default();

    println!("🔬 Top-down cumulative integration validation");
    println!(
        "   Exponential reference: A = {:.1e}, H = {} km, seed {}",
        params.amplitude, params.scale_height_km, params.seed
    );
    println!();

    let suite = run_integration_checks(params, true);

    println!("\n📉 Grid refinement, 80 to 500 km");
    match ConvergenceStudy::run(80.0, 500.0, 20.0, 4, params.amplitude, params.scale_height_km) {
        Ok(study) => {
            println!("   {:>8} {:>8} {:>14} {:>8}", "dz (km)", "samples", "max rel err", "order");
            let orders = study.observed_orders();
            for (level, sample) in study.samples.iter().enumerate() {
                let order = match level.checked_sub(1).and_then(|i| orders.get(i)) {
                    Some(order) => format!("{order:.3}"),
                    None => "-".to_string(),
                };
                println!(
                    "   {:>8.3} {:>8} {:>14.4e} {:>8}",
                    sample.step, sample.samples, sample.max_relative_error, order
                );
            }
        }
        Err(err) => println!("   {} {err}", "convergence study failed:".red()),
    }

    suite.print_summary();

    if suite.all_passed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
