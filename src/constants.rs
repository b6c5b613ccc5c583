use serde::{Deserialize, Serialize};

// Unit conversions
pub const KM_TO_CM: f64 = 1.0e5;

/// Mean energy lost per ion pair produced in air (Rees 1989), keV.
pub const IONIZATION_ENERGY_KEV: f64 = 0.035;

// Default grid used by the ionization model: 500 km down to 80 km
pub const TOP_OF_ATMOSPHERE_KM: f64 = 500.0;
pub const BOTTOM_OF_GRID_KM: f64 = 80.0;

/// Immutable bundle of the constants the ionization code needs.
///
/// Passed by reference into every calculation instead of being read from
/// process-wide state, so alternative values can be tested side by side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    pub ionization_energy_kev: f64,
    pub km_to_cm: f64,
}

impl PhysicalConstants {
    pub const fn standard() -> Self {
        Self {
            ionization_energy_kev: IONIZATION_ENERGY_KEV,
            km_to_cm: KM_TO_CM,
        }
    }

    /// Ionization energy per ion pair in eV.
    pub fn ionization_energy_ev(&self) -> f64 {
        self.ionization_energy_kev * 1000.0
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::standard()
    }
}
