//! Ionization rates from precipitating electron energy flux.
//!
//! Local rate follows Fang et al. (2010) Eq. 2,
//! `q_tot = Qe * f / (eps * H)`, with `eps` the mean energy per ion pair
//! (Rees 1989). The cumulative ionization `q_cum` is the top-down integral
//! of `q_tot` over altitude in centimetres.

use crate::altitude_grid::AltitudeGrid;
use crate::constants::PhysicalConstants;
use crate::cumulative_integration::integrate_grid_from_top;
use crate::error::{IntegrationError, Result};
use crate::math_utils::clamp_non_negative;
use rayon::prelude::*;

/// Local ionization rate (cm^-3 s^-1).
///
/// * `energy_flux_kev` - incident energy flux, keV cm^-2 s^-1
/// * `dissipation` - dimensionless energy dissipation `f`
/// * `scale_height_cm` - atmospheric scale height `H`, cm
pub fn ionization_rate(
    energy_flux_kev: f64,
    dissipation: f64,
    scale_height_cm: f64,
    constants: &PhysicalConstants,
) -> f64 {
    (energy_flux_kev / constants.ionization_energy_kev) * dissipation / scale_height_cm
}

/// Ionization profiles for one energy channel.
#[derive(Debug, Clone, PartialEq)]
pub struct IonizationColumn {
    /// Incident energy flux after clamping, keV cm^-2 s^-1
    pub energy_flux_kev: f64,
    /// Local rate, cm^-3 s^-1
    pub q_tot: Vec<f64>,
    /// Cumulative from the top, cm^-2 s^-1
    pub q_cum: Vec<f64>,
    bottom_index: Option<usize>,
}

impl IonizationColumn {
    /// Total ionization through the column: `q_cum` at the lowest altitude.
    pub fn column_ionization(&self) -> f64 {
        self.bottom_index.map_or(0.0, |i| self.q_cum[i])
    }

    /// Energy deposited in the column, keV cm^-2 s^-1.
    pub fn column_energy(&self, constants: &PhysicalConstants) -> f64 {
        self.column_ionization() * constants.ionization_energy_kev
    }

    /// Energy deposited above each altitude, keV cm^-2 s^-1.
    pub fn energy_deposition_profile(&self, constants: &PhysicalConstants) -> Vec<f64> {
        self.q_cum
            .iter()
            .map(|q| q * constants.ionization_energy_kev)
            .collect()
    }

    /// Column energy as a fraction of the incident flux; NaN with no flux.
    pub fn deposition_ratio(&self, constants: &PhysicalConstants) -> f64 {
        if self.energy_flux_kev == 0.0 {
            f64::NAN
        } else {
            self.column_energy(constants) / self.energy_flux_kev
        }
    }
}

/// Ionization for every energy channel over one altitude grid.
///
/// * `energy_flux_kev` - one incident flux per channel; negative values are
///   clamped to zero before use
/// * `altitude_km` - grid in km, either storage order
/// * `dissipation` - one `f` profile per channel, aligned with the grid
/// * `scale_height_cm` - `H` on the grid
///
/// Channels are independent and computed in parallel.
pub fn calc_ionization(
    energy_flux_kev: &[f64],
    altitude_km: &AltitudeGrid,
    dissipation: &[Vec<f64>],
    scale_height_cm: &[f64],
    constants: &PhysicalConstants,
) -> Result<Vec<IonizationColumn>> {
    let nz = altitude_km.len();
    if scale_height_cm.len() != nz {
        return Err(IntegrationError::ShapeMismatch {
            altitude: nz,
            rate: scale_height_cm.len(),
        });
    }
    if dissipation.len() != energy_flux_kev.len() {
        return Err(IntegrationError::ChannelCount {
            fluxes: energy_flux_kev.len(),
            channels: dissipation.len(),
        });
    }
    if let Some((channel, f)) = dissipation.iter().enumerate().find(|(_, f)| f.len() != nz) {
        return Err(IntegrationError::ChannelShape {
            channel,
            expected: nz,
            found: f.len(),
        });
    }

    let fluxes = clamp_non_negative(energy_flux_kev);
    let clamped = energy_flux_kev.iter().filter(|&&raw| raw < 0.0).count();
    if clamped > 0 {
        log::warn!("clamped {clamped} negative energy flux value(s) to zero");
    }

    let altitude_cm = altitude_km.to_centimetres_from_km(constants)?;
    let bottom_index = altitude_cm.bottom_index();

    fluxes
        .par_iter()
        .zip(dissipation.par_iter())
        .map(|(&qe, f)| -> Result<IonizationColumn> {
            let q_tot: Vec<f64> = f
                .iter()
                .zip(scale_height_cm)
                .map(|(&f_z, &h)| ionization_rate(qe, f_z, h, constants))
                .collect();
            let q_cum = integrate_grid_from_top(&altitude_cm, &q_tot)?;
            Ok(IonizationColumn {
                energy_flux_kev: qe,
                q_tot,
                q_cum,
                bottom_index,
            })
        })
        .collect()
}
