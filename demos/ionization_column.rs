// Ionization profiles for a handful of energy channels on a 500 -> 80 km grid.
//
// The dissipation profiles are Gaussians standing in for Fang (2010) Eq. 4-6
// output; harder channels peak lower in the atmosphere.

use colored::Colorize;
use precip_ionization_rust::constants::{BOTTOM_OF_GRID_KM, TOP_OF_ATMOSPHERE_KM};
use precip_ionization_rust::constants_parser::ConstantsParser;
use precip_ionization_rust::{AltitudeGrid, Result, calc_ionization};

const SAMPLES: usize = 421;
const SCALE_HEIGHT_CM: f64 = 5.0e6;

/// (label, incident flux keV cm^-2 s^-1, peak altitude km, width km)
const CHANNELS: [(&str, f64, f64, f64); 4] = [
    ("1 keV", 1.0e7, 150.0, 25.0),
    ("10 keV", 5.0e6, 110.0, 12.0),
    ("100 keV", 1.0e6, 90.0, 6.0),
    ("clamped", -2.0e6, 120.0, 15.0),
];

fn main() -> Result<()> {
    let constants = ConstantsParser::embedded();
    let grid = AltitudeGrid::uniform(TOP_OF_ATMOSPHERE_KM, BOTTOM_OF_GRID_KM, SAMPLES)?;
    let scale_height = vec![SCALE_HEIGHT_CM; grid.len()];

    println!("⚡ Ionization column, {} samples from {} to {} km", grid.len(), TOP_OF_ATMOSPHERE_KM, BOTTOM_OF_GRID_KM);
    println!("   Energy per ion pair: {} eV", constants.ionization_energy_ev());

    let fluxes: Vec<f64> = CHANNELS.iter().map(|c| c.1).collect();
    let dissipation: Vec<Vec<f64>> = CHANNELS
        .iter()
        .map(|&(_, _, peak, width)| gaussian(&grid, peak, width))
        .collect();

    let columns = calc_ionization(&fluxes, &grid, &dissipation, &scale_height, &constants)?;

    println!();
    println!(
        "   {:<8} {:>12} {:>14} {:>14} {:>10} {:>10}",
        "channel", "Qe", "column ion.", "column energy", "ratio", "peak (km)"
    );
    for ((label, ..), column) in CHANNELS.iter().zip(&columns) {
        let peak_km = column
            .q_tot
            .iter()
            .zip(grid.values())
            .fold((f64::MIN, f64::NAN), |best, (&q, &z)| if q > best.0 { (q, z) } else { best })
            .1;
        let ratio = column.deposition_ratio(&constants);
        let ratio_text = if ratio.is_nan() {
            "-".dimmed().to_string()
        } else {
            format!("{ratio:.4}")
        };
        println!(
            "   {:<8} {:>12.3e} {:>14.4e} {:>14.4e} {:>10} {:>10.1}",
            label,
            column.energy_flux_kev,
            column.column_ionization(),
            column.column_energy(&constants),
            ratio_text,
            peak_km
        );
    }

    let total_energy: f64 = columns.iter().map(|c| c.column_energy(&constants)).sum();
    println!();
    println!("{} {:.4e} keV/cm²/s deposited across all channels", "✓".green(), total_energy);

    Ok(())
}

fn gaussian(grid: &AltitudeGrid, peak_km: f64, width_km: f64) -> Vec<f64> {
    grid.values()
        .iter()
        .map(|z| 0.8 * (-(z - peak_km).powi(2) / (2.0 * width_km * width_km)).exp())
        .collect()
}
